// src/domain/tag.rs
//
// Tag normalization (§4.B). Unlike the plain value object the teacher
// crate carries, this spec's normalized form is a single sentinel-bearing
// string (`"t1,t2,t3,"`, or the literal `"notag"`), because that is the
// exact form persisted in `bookmarks.tags`' denormalized convenience
// column and exchanged with the mirror's JSON list form.

/// Sentinel used when a bookmark has no tags.
pub const NOTAG: &str = "notag";

/// Normalize a raw, user-supplied tag string into the canonical form:
/// sorted ascending, deduplicated, comma-joined, trailing comma; or the
/// literal `"notag"` if there are no tags at all.
///
/// Splits on any run of commas or spaces, so `" go , rust "` and
/// `"go rust"` both normalize to `"go,rust,"`.
pub fn parse_tags(raw: &str) -> String {
    if raw.trim().is_empty() {
        return NOTAG.to_string();
    }

    let mut tags: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if tags.is_empty() {
        return NOTAG.to_string();
    }

    tags.sort_unstable();
    tags.dedup();

    let mut joined = tags.join(",");
    joined.push(',');
    joined
}

/// Split a normalized tag string back into its component tags, discarding
/// empties. `"notag"` round-trips to an empty list.
pub fn split_tags(normalized: &str) -> Vec<String> {
    if normalized == NOTAG {
        return Vec::new();
    }
    normalized
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize a `Vec<String>` (e.g. the mirror's JSON tag list) the same
/// way `parse_tags` normalizes a raw string.
pub fn format_tag_list(tags: &[String]) -> String {
    parse_tags(&tags.join(","))
}
