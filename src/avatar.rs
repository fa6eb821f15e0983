use url::form_urlencoded::byte_serialize;

const AVATAR_BASE: &str = "https://ui-avatars.com/api/";
const PALETTE: [&str; 6] = ["6366f1", "8b5cf6", "ec4899", "f59e0b", "10b981", "ef4444"];

/// Placeholder avatar for `name`. The background colour is picked from the name, so the same
/// student always gets the same avatar.
pub fn generate_avatar(name: &str) -> String {
    let name = name.trim();
    let encoded: String = byte_serialize(name.as_bytes()).collect();

    format!(
        "{AVATAR_BASE}?name={encoded}&background={}&color=fff&size=128&bold=true",
        background_for(name)
    )
}

fn background_for(name: &str) -> &'static str {
    let sum = name.bytes().map(usize::from).sum::<usize>();
    PALETTE[sum % PALETTE.len()]
}

/// The image to store for a student: the supplied URL, or a generated avatar when there isn't one.
pub fn profile_image_or_avatar(supplied: &str, name: &str) -> String {
    let supplied = supplied.trim();
    if supplied.is_empty() {
        generate_avatar(name)
    } else {
        supplied.to_string()
    }
}
