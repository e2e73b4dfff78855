use biblio_shared::const_config::client::CLIENT_PLACEHOLDER_COVER_URL;

/// Turns a cover path as stored by the backend into a URL a view can load
///
/// - missing or blank: the placeholder cover
/// - already absolute (starts with `http`): returned unchanged
/// - otherwise: joined to `base_url` with exactly one `/`
pub fn resolve_image_url(base_url: &str, path: Option<&str>) -> String {
    let Some(path) = path.map(str::trim).filter(|path| !path.is_empty()) else {
        return CLIENT_PLACEHOLDER_COVER_URL.to_string();
    };
    if path.starts_with("http") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
