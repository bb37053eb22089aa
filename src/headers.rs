//! Browser header presets for HTTP requests.
//!
//! Ordered to match what Chrome sends on page navigation; apply them before
//! any caller-specific headers so overrides land later in the list.

/// Chrome 131 headers for page navigation.
pub fn chrome_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("User-Agent", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"),
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Sec-Ch-Ua", r#""Chromium";v="131", "Google Chrome";v="131", "Not_A Brand";v="24""#),
        ("Sec-Ch-Ua-Mobile", "?0"),
        ("Sec-Ch-Ua-Platform", r#""macOS""#),
        ("Upgrade-Insecure-Requests", "1"),
        ("Connection", "keep-alive"),
    ]
}

/// Chrome 131 headers for AJAX/API requests.
pub fn chrome_ajax_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("User-Agent", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"),
        ("Accept", "application/json, text/plain, */*"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Sec-Fetch-Dest", "empty"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-Ch-Ua", r#""Chromium";v="131", "Google Chrome";v="131", "Not_A Brand";v="24""#),
        ("Sec-Ch-Ua-Mobile", "?0"),
        ("Sec-Ch-Ua-Platform", r#""macOS""#),
        ("Connection", "keep-alive"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_preset_shape() {
        let headers = chrome_headers();
        assert_eq!(headers[0].0, "User-Agent");
        assert!(headers.iter().any(|(k, _)| *k == "Sec-Fetch-Mode"));
        assert!(headers
            .iter()
            .any(|(k, v)| *k == "Accept-Encoding" && *v == "gzip, deflate, br"));
    }

    #[test]
    fn test_ajax_preset_targets_json() {
        let headers = chrome_ajax_headers();
        let accept = headers.iter().find(|(k, _)| *k == "Accept").unwrap().1;
        assert!(accept.starts_with("application/json"));
    }
}
