#[cfg(test)]
mod link_tests {
    use plainqr::{format_host, is_valid_url, is_valid_url_with, SchemeMatch};
    use test_case::test_case;

    #[test_case("https://example.com/path", true; "https with path")]
    #[test_case("http://example.com", true; "bare http")]
    #[test_case("http://example.com:8080/a?b=c#d", true; "port query fragment")]
    #[test_case("https://user:pw@example.com/", true; "userinfo")]
    #[test_case("http://192.168.0.1/", true; "ipv4 host")]
    #[test_case("http://[2001:db8::1]/", true; "ipv6 host")]
    #[test_case("ftp://example.com", false; "ftp")]
    #[test_case("not a url", false; "plain text")]
    #[test_case("http://", false; "no host")]
    #[test_case("https://", false; "https without host")]
    #[test_case("example.com/path", false; "relative")]
    #[test_case("mailto:someone@example.com", false; "mailto")]
    #[test_case("WIFI:S:home;T:WPA;P:secret;;", false; "wifi config")]
    #[test_case("httpfoo://example.com", false; "loose scheme")]
    #[test_case("", false; "empty")]
    #[test_case("HTTP://example.com", false; "uppercase scheme")]
    #[test_case("Https://example.com/x", false; "mixed case scheme")]
    #[test_case("https:example.com", false; "missing slashes")]
    #[test_case("https:///example.com", false; "empty authority")]
    #[test_case("https:\\\\example.com", false; "backslashes")]
    #[test_case("  https://example.com  ", false; "surrounding spaces")]
    #[test_case("https://example.com/a b", false; "raw space")]
    #[test_case("https://example.com/a%20b", true; "escaped space")]
    #[test_case("https://example.com/100%", false; "dangling escape")]
    fn test_is_valid_url(text: &str, expected: bool) {
        assert_eq!(is_valid_url(text), expected);
    }

    #[test_case("httpfoo://example.com", true; "loose scheme")]
    #[test_case("https://example.com", true; "https")]
    #[test_case("ftp://example.com", false; "ftp")]
    #[test_case("httpx:///path", false; "loose scheme without host")]
    #[test_case("HTTP://example.com", false; "uppercase scheme")]
    #[test_case("httpS://example.com", true; "loose suffix case")]
    fn test_is_valid_url_prefix(text: &str, expected: bool) {
        assert_eq!(is_valid_url_with(text, SchemeMatch::Prefix), expected);
    }

    #[test_case("https://example.com/page?x=1", "example.com"; "https with query")]
    #[test_case("http://sub.example.org:8080/", "sub.example.org"; "port dropped")]
    #[test_case("ftp://files.example.com/pub", "files.example.com"; "any scheme with host")]
    #[test_case("not a url", "not a url"; "plain text")]
    #[test_case("http://", "http://"; "no host")]
    #[test_case("mailto:someone@example.com", "mailto:someone@example.com"; "hostless")]
    #[test_case("", ""; "empty")]
    #[test_case("https://例え.jp/", "例え.jp"; "unicode host")]
    #[test_case("https://xn--r8jz45g.jp/page", "例え.jp"; "punycode host")]
    #[test_case("https:example.com", "https:example.com"; "missing slashes")]
    fn test_format_host(text: &str, expected: &str) {
        assert_eq!(format_host(text), expected);
    }
}

#[cfg(test)]
mod link_proptests {
    use plainqr::{format_host, is_valid_url, is_valid_url_with, SchemeMatch};
    use proptest::prelude::*;

    fn host_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-z0-9]{0,10}", 1..4)
            .prop_map(|labels| format!("{}.com", labels.join(".")))
    }

    proptest! {
        #[test]
        fn proptest_total_on_any_text(text in any::<String>()) {
            let host = format_host(&text);
            let _ = is_valid_url(&text);
            let _ = is_valid_url_with(&text, SchemeMatch::Prefix);
            prop_assert!(text.is_empty() || !host.is_empty());
        }

        #[test]
        fn proptest_total_on_control_chars(text in "[\\x00-\\x1f\\x7f:/?#@\\[\\]%]{0,64}") {
            let _ = is_valid_url(&text);
            let _ = format_host(&text);
        }

        #[test]
        fn proptest_total_on_long_urls(path in "[a-zA-Z0-9/._~-]{4096,8192}") {
            let text = format!("https://example.com/{path}");
            prop_assert!(is_valid_url(&text));
            prop_assert_eq!(format_host(&text), "example.com");
        }

        #[test]
        fn proptest_links_with_host_are_valid(host in host_strategy(), path in "[a-z0-9/]{0,20}") {
            for scheme in ["http", "https"] {
                let text = format!("{scheme}://{host}/{path}");
                prop_assert!(is_valid_url(&text));
                prop_assert_eq!(format_host(&text), host.clone());
            }
        }

        #[test]
        fn proptest_format_host_idempotent(host in host_strategy(), path in "[a-z0-9/]{0,20}") {
            let once = format_host(&format!("https://{host}/{path}"));
            prop_assert_eq!(format_host(&once), once.clone());
        }

        #[test]
        fn proptest_exact_implies_prefix(text in "(https?|httpx|ftp)://[a-z.]{0,12}(/[a-z]{0,5})?") {
            if is_valid_url_with(&text, SchemeMatch::Exact) {
                prop_assert!(is_valid_url_with(&text, SchemeMatch::Prefix));
            }
        }
    }
}
