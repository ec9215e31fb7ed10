// @generated by analogy with Diesel CLI's `diesel print-schema`.

diesel::table! {
    bookmarks (id) {
        id -> Integer,
        url -> Text,
        title -> Text,
        desc -> Text,
        created_at -> Text,
        last_visit -> Text,
        updated_at -> Text,
        visit_count -> Integer,
        favorite -> Bool,
        checksum -> Text,
        http_status_code -> Nullable<Integer>,
        http_status_text -> Nullable<Text>,
        is_active -> Nullable<Bool>,
        last_status_checked -> Nullable<Text>,
    }
}

diesel::table! {
    tags (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    bookmark_tags (bookmark_url, tag_id) {
        bookmark_url -> Text,
        tag_id -> Integer,
    }
}

diesel::joinable!(bookmark_tags -> tags (tag_id));
diesel::allow_tables_to_appear_in_same_query!(bookmarks, tags, bookmark_tags);
