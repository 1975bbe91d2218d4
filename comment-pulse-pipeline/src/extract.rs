use {
    regex::Regex,
    once_cell::sync::Lazy,
    comment_pulse_core::error::PipelineError,
};

/// Recognition patterns tried in order; the first capture wins. The capture
/// stops at the first delimiter (`&`, newline, `?`, `#`).
static VIDEO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| vec![
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)").unwrap(),
    Regex::new(r"youtube\.com/watch\?.*v=([^&\n?#]+)").unwrap(),
]);

pub fn extract_video_id(reference: &str) -> Result<String, PipelineError> {
    for pattern in VIDEO_ID_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(reference) {
            return Ok(captures[1].to_owned());
        }
    }

    Err(PipelineError::InvalidReference(reference.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=ABC123&t=5").unwrap();
        assert_eq!(id, "ABC123");
    }

    #[test]
    fn extracts_id_from_short_url() {
        let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn extracts_id_from_embed_url() {
        let id = extract_video_id("https://www.youtube.com/embed/xyz-78_9#start").unwrap();
        assert_eq!(id, "xyz-78_9");
    }

    #[test]
    fn extracts_id_when_v_is_not_first_parameter() {
        let id = extract_video_id("https://www.youtube.com/watch?list=PL123&v=QQQ111").unwrap();
        assert_eq!(id, "QQQ111");
    }

    #[test]
    fn rejects_unrecognized_reference() {
        let err = extract_video_id("https://example.com/video/123").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidReference(_)));
    }
}
