//! RFC 5988 `Link` header handling for paginated GitHub responses.

/// Page numbers advertised by a `Link` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkPagination {
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Parse a `Link` header into the `next` and `last` page numbers.
///
/// Entries that are malformed or have no numeric `page` parameter are
/// skipped.
///
/// ```text
/// <https://api.github.com/repos/o/r/issues?page=2>; rel="next",
/// <https://api.github.com/repos/o/r/issues?page=7>; rel="last"
/// ```
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.trim().split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') && segment.len() >= 2 {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        if let (Some(url), Some(rel)) = (url, rel) {
            if let Some(page) = extract_page_from_url(url) {
                match rel {
                    "last" => info.last_page = Some(page),
                    "next" => info.next_page = Some(page),
                    _ => {}
                }
            }
        }
    }

    info
}

/// Last page to report to a caller.
///
/// The `rel="last"` link wins. GitHub omits it on the final page, so the
/// requested page (default 1) stands in when it is missing.
pub fn last_page(link_header: Option<&str>, requested_page: Option<u32>) -> u32 {
    link_header
        .and_then(|h| parse_link_header(h).last_page)
        .or(requested_page)
        .unwrap_or(1)
}

fn extract_page_from_url(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_header_full() {
        let header = r#"<https://api.github.com/repos/acme/web/issues?state=open&page=2>; rel="next", <https://api.github.com/repos/acme/web/issues?state=open&page=7>; rel="last""#;
        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.last_page, Some(7));
    }

    #[test]
    fn test_parse_link_header_ignores_per_page() {
        let header = r#"<https://api.github.com/issues?per_page=6&page=4>; rel="last""#;
        assert_eq!(parse_link_header(header).last_page, Some(4));
    }

    #[test]
    fn test_parse_link_header_garbage() {
        assert_eq!(parse_link_header("not a link"), LinkPagination::default());
        assert_eq!(parse_link_header(""), LinkPagination::default());
        assert_eq!(
            parse_link_header(r#"<https://x/issues?page=abc>; rel="last""#),
            LinkPagination::default()
        );
    }

    #[test]
    fn test_last_page_prefers_last_link() {
        let header = r#"<https://api.github.com/issues?page=7>; rel="last""#;
        assert_eq!(last_page(Some(header), None), 7);
        assert_eq!(last_page(Some(header), Some(3)), 7);
    }

    #[test]
    fn test_last_page_falls_back_to_requested_page() {
        assert_eq!(last_page(None, Some(3)), 3);
        assert_eq!(last_page(None, None), 1);

        let only_prev = r#"<https://api.github.com/issues?page=2>; rel="prev""#;
        assert_eq!(last_page(Some(only_prev), Some(3)), 3);
    }
}
