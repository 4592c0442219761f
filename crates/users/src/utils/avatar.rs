//! Gravatar identicon URLs.

/// Deterministic avatar URL for an email: md5 of the lowercased,
/// trimmed address, at the requested pixel size. Pure function, no
/// local state.
pub fn avatar_url(email: &str, size: u32) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?d=identicon&s={size}")
}
