// src/domain/hasher.rs
//
// Pure hashing helpers for the content-addressed mirror (§4.A). Every
// function here is a pure function of its input: same url in, same hash
// out, forever. Encoding is base64url (`-_` alphabet) without padding,
// matching what the mirror's filenames can contain unescaped.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use url::Url;

use super::error::{DomainError, DomainResult};

/// First 12 chars of base64url(SHA-256(url)).
pub fn hash_url(url: &str) -> String {
    encode_prefix(url.as_bytes(), 12)
}

/// Hostname of `url`, lowercased, with a leading `www.` stripped.
pub fn domain(url: &str) -> DomainResult<String> {
    let parsed = Url::parse(url).map_err(|e| DomainError::InvalidUrl(e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| DomainError::InvalidUrl(format!("no host in url: {}", url)))?;
    let host = host.to_lowercase();
    Ok(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// 12-char hash of the normalized hostname (see [`domain`]).
pub fn hash_domain(url: &str) -> DomainResult<String> {
    let host = domain(url)?;
    Ok(encode_prefix(host.as_bytes(), 12))
}

/// 8-char hash of the canonical bookmark string
/// `"u:<url>|t:<title>|d:<desc>|tags:<tags>"`.
pub fn checksum(url: &str, title: &str, desc: &str, tags: &str) -> String {
    let canonical = format!("u:{}|t:{}|d:{}|tags:{}", url, title, desc, tags);
    encode_prefix(canonical.as_bytes(), 8)
}

fn encode_prefix(data: &[u8], len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.chars().take(len).collect()
}
