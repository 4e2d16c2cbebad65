//! Attribute scanning over raw playlist lines. The rewriting stages must
//! preserve unrecognized tags byte-for-byte, so lines are never parsed into
//! a playlist AST; values are cut straight out of the text.

/// Value of an unquoted attribute, from `prefix` up to the next comma.
/// `prefix` includes the `=`, e.g. `BANDWIDTH=`.
pub(crate) fn attr<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let (_, rest) = line.split_once(prefix)?;
    rest.split(',').next()
}

/// Value of a quoted attribute, from `prefix` up to the closing quote.
/// `prefix` includes the opening quote, e.g. `URI="`.
pub(crate) fn quoted_attr<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let (_, rest) = line.split_once(prefix)?;
    rest.split('"').next()
}

/// Base of `url` with the query string and the last path segment removed.
pub(crate) fn base_uri(url: &str) -> &str {
    let url = url.split('?').next().unwrap_or(url);
    url.rsplit_once('/').map(|(base, _)| base).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr() {
        let line = "#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=3000000,RESOLUTION=1920x1080";
        assert_eq!(attr(line, "BANDWIDTH="), Some("3000000"));
        assert_eq!(attr(line, "RESOLUTION="), Some("1920x1080"));
        assert_eq!(attr(line, "FRAME-RATE="), None);
    }

    #[test]
    fn test_attr_at_end_of_line() {
        assert_eq!(attr("#EXT-X-STREAM-INF:BANDWIDTH=128000", "BANDWIDTH="), Some("128000"));
    }

    #[test]
    fn test_quoted_attr() {
        let line = r#"#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="AAC_192",NAME="English",URI="audio/192/index.m3u8""#;
        assert_eq!(quoted_attr(line, "GROUP-ID=\""), Some("AAC_192"));
        assert_eq!(quoted_attr(line, "URI=\""), Some("audio/192/index.m3u8"));
        assert_eq!(quoted_attr(line, "LANGUAGE=\""), None);
    }

    #[test]
    fn test_base_uri_strips_query_and_last_segment() {
        assert_eq!(
            base_uri("https://cdn.example.com/hls/1080/index.m3u8?token=abc"),
            "https://cdn.example.com/hls/1080"
        );
        assert_eq!(base_uri("https://cdn.example.com/index.m3u8"), "https://cdn.example.com");
    }
}
