//! File-name synthesis for resources that do not declare one.

/// Content type → extension, used only when a part declares no filename.
const EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/webp", ".webp"),
    ("image/gif", ".gif"),
    ("text/css", ".css"),
    ("text/javascript", ".js"),
    ("application/javascript", ".js"),
    ("application/json", ".json"),
    ("font/ttf", ".ttf"),
    ("font/otf", ".otf"),
    ("font/woff", ".woff"),
    ("font/woff2", ".woff2"),
    ("text/plain", ".txt"),
    ("text/html", ".html"),
];

/// Extension (with leading dot) for a content type; `.bin` when unmapped.
pub fn extension_for(content_type: &str) -> &'static str {
    EXTENSIONS
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
        .unwrap_or(".bin")
}

/// Random 8-hex-character token.
pub fn random_token() -> String {
    let mut hex = uuid::Uuid::new_v4().simple().to_string();
    hex.truncate(8);
    hex
}

/// `resource_<token><ext>` for an embedded part without a filename.
pub fn resource_name(content_type: &str) -> String {
    format!("resource_{}{}", random_token(), extension_for(content_type))
}

/// `page_<token>.html` for an HTML part.
pub fn page_name() -> String {
    format!("page_{}.html", random_token())
}

/// `inline_script_<token>.js` for an inline `<script>` body.
pub fn inline_script_name() -> String {
    format!("inline_script_{}.js", random_token())
}

/// File name for a downloaded script: the URL path basename, or
/// `script_<token>.js` when the path ends in `/` or is empty.
pub fn external_script_name(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or("");
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    // Only the path part counts; a bare host has no basename.
    let basename = after_scheme
        .split_once('/')
        .map(|(_, path)| path.rsplit('/').next().unwrap_or(""))
        .unwrap_or("");

    if basename.is_empty() {
        format!("script_{}.js", random_token())
    } else {
        basename.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_token(s: &str) -> bool {
        s.len() == 8 && s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(extension_for("image/jpeg"), ".jpg");
        assert_eq!(extension_for("application/javascript"), ".js");
        assert_eq!(extension_for("font/woff2"), ".woff2");
        assert_eq!(extension_for("text/html"), ".html");
    }

    #[test]
    fn test_unmapped_type_is_bin() {
        assert_eq!(extension_for("image/svg+xml"), ".bin");
        assert_eq!(extension_for("application/octet-stream"), ".bin");
    }

    #[test]
    fn test_random_token_shape() {
        let a = random_token();
        let b = random_token();
        assert!(is_token(&a), "bad token: {a}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_resource_name_for_gif() {
        let name = resource_name("image/gif");
        let token = name
            .strip_prefix("resource_")
            .and_then(|s| s.strip_suffix(".gif"))
            .expect("resource_<token>.gif");
        assert!(is_token(token));
    }

    #[test]
    fn test_external_name_uses_basename() {
        assert_eq!(
            external_script_name("https://cdn.example.com/lib/jquery.min.js?v=3#x"),
            "jquery.min.js"
        );
        assert_eq!(external_script_name("http://example.com/app.js"), "app.js");
    }

    #[test]
    fn test_external_name_strips_only_query() {
        assert_eq!(external_script_name("https://a.test/app.js#main"), "app.js#main");
        assert_eq!(external_script_name("https://a.test/app.js?x=1#main"), "app.js");
    }

    #[test]
    fn test_external_name_falls_back_to_token() {
        for url in ["https://example.com/", "https://example.com", "https://example.com/?q=1"] {
            let name = external_script_name(url);
            assert!(name.starts_with("script_") && name.ends_with(".js"), "{url} -> {name}");
        }
    }
}
