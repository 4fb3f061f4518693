//! Cookie lookup for the anti-forgery token.

/// Cookie the server sets with the anti-forgery token
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header the session endpoint expects the token in
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Looks up `name` in a `document.cookie` style string.
///
/// Entries are split on `"; "` and then on `=`. The value is the segment
/// between the first and second `=`, so values that themselves contain `=`
/// come back truncated. When a name appears twice the later entry wins. An
/// entry without `=` has no value.
pub fn get_cookie(cookie_string: &str, name: &str) -> Option<String> {
    cookie_string
        .split("; ")
        .filter_map(|cookie| {
            let mut parts = cookie.split('=');
            (parts.next()? == name).then(|| parts.next())
        })
        .last()
        .flatten()
        .map(str::to_owned)
}
