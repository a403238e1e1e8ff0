//! Markup documents returned to the control plane's fetches.

/// Body returned by the plain OK responders unless overridden.
pub const DEFAULT_OK_BODY: &str = "<response>OK</response>";

/// Content type for all markup responses.
pub const MARKUP_CONTENT_TYPE: &str = "application/xml";

/// The minimal OK document, or the configured override when present.
pub fn ok_document(override_body: Option<&str>) -> String {
    match override_body {
        Some(body) if !body.trim().is_empty() => body.to_string(),
        _ => DEFAULT_OK_BODY.to_string(),
    }
}

/// A document instructing the control plane to play the given media URL.
pub fn play_document(media_url: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n    <Play>{media_url}</Play>\n</Response>"
    )
}

/// Host-qualified URL back into this harness's media responder.
pub fn media_url(hostname: &str, port: u16, label: &str) -> String {
    format!("http://{hostname}:{port}/endpoints/media/{label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_document_defaults_and_overrides() {
        assert_eq!(ok_document(None), DEFAULT_OK_BODY);
        assert_eq!(ok_document(Some("  ")), DEFAULT_OK_BODY);
        assert_eq!(ok_document(Some("<response>custom</response>")), "<response>custom</response>");
    }

    #[test]
    fn play_document_embeds_media_url() {
        let url = media_url("fetch.example.com", 80, "mp3");
        let doc = play_document(&url);
        assert!(doc.contains("<Play>http://fetch.example.com:80/endpoints/media/mp3</Play>"));
        assert!(doc.starts_with("<?xml"));
    }
}
