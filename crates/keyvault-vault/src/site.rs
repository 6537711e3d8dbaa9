// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Site identifiers: URL normalization and host matching.

use url::{Host, Url};

/// Reduce a URL or bare host to lower-case `host[:port]`.
///
/// Inputs without a scheme are read as `https://` URLs, so only the text
/// before the first `/`, `?` or `#` can name the host. Credentials, the
/// path, the query, the fragment, a default port, and a trailing root dot
/// are dropped. Input that names no host normalizes to an empty string,
/// which never matches a stored site.
///
/// ```
/// use keyvault_vault::site::normalize_url;
///
/// assert_eq!(normalize_url("https://Login.Example.com/path?q=1"), "login.example.com");
/// assert_eq!(normalize_url("example.com:8443"), "example.com:8443");
/// assert_eq!(normalize_url("bank.com/login?next=https://evil.com/"), "bank.com");
/// ```
pub fn normalize_url(input: &str) -> String {
    match parse_site(input) {
        Some(url) => authority(&url),
        None => String::new(),
    }
}

/// Hosts to look up for a page, most specific first: the host itself, then its
/// registrable root (last two labels) when it has more than two labels.
///
/// IP addresses never get a root candidate.
pub fn candidate_hosts(host: &str) -> Vec<String> {
    let Some(url) = parse_site(host) else {
        return vec![String::new()];
    };

    let mut candidates = vec![authority(&url)];
    let Some(Host::Domain(name)) = url.host() else {
        return candidates;
    };

    let name = name.trim_end_matches('.').to_lowercase();
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() > 2 {
        let root = labels[labels.len() - 2..].join(".");
        candidates.push(with_port(root, url.port()));
    }
    candidates
}

/// Whether a page on `page_host` may use a credential saved for
/// `stored_host`: exact match, or the page is a proper subdomain.
pub fn host_matches(page_host: &str, stored_host: &str) -> bool {
    if stored_host.is_empty() {
        return false;
    }
    page_host == stored_host
        || page_host
            .strip_suffix(stored_host)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Parse `input` as an absolute URL with a host, retrying as `https://`
/// when it carries no scheme of its own.
///
/// `example.com:8443` parses as scheme `example.com` with no host, so a
/// parse is only accepted once it yields a non-empty host.
fn parse_site(input: &str) -> Option<Url> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let has_host = |url: &Url| url.host_str().is_some_and(|host| !host.is_empty());
    Url::parse(input)
        .ok()
        .filter(has_host)
        .or_else(|| Url::parse(&format!("https://{input}")).ok())
        .filter(has_host)
}

fn authority(url: &Url) -> String {
    let host = url
        .host_str()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_lowercase();
    with_port(host, url.port())
}

fn with_port(host: String, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_scheme_case_and_path() {
        assert_eq!(normalize_url("https://Login.Example.com/path"), "login.example.com");
        assert_eq!(normalize_url("login.example.com"), "login.example.com");
        assert_eq!(normalize_url("  HTTP://site.com?x=1#frag "), "site.com");
        assert_eq!(normalize_url("https://user:pw@bank.com/login"), "bank.com");
        assert_eq!(normalize_url("example.com."), "example.com");
        assert_eq!(normalize_url("http://localhost:3000/app"), "localhost:3000");
        assert_eq!(normalize_url("localhost:3000"), "localhost:3000");
    }

    #[test]
    fn embedded_urls_in_query_or_fragment_do_not_become_the_host() {
        assert_eq!(normalize_url("bank.com/login?next=https://evil.com/x"), "bank.com");
        assert_eq!(normalize_url("bank.com/signin?r=http://evil.com"), "bank.com");
        assert_eq!(normalize_url("bank.com#https://evil.com"), "bank.com");
        assert_eq!(normalize_url("bank.com:8443/a?u=ftp://evil.com"), "bank.com:8443");
        assert_eq!(
            normalize_url("https://bank.com/login?next=https://evil.com/"),
            "bank.com"
        );
    }

    #[test]
    fn default_ports_are_dropped() {
        assert_eq!(normalize_url("https://example.com:443/"), "example.com");
        assert_eq!(normalize_url("example.com:443"), "example.com");
        assert_eq!(normalize_url("http://example.com:8080"), "example.com:8080");
    }

    #[test]
    fn input_without_a_host_normalizes_to_empty() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("   "), "");
        assert_eq!(normalize_url("not a host"), "");
        assert!(!host_matches(&normalize_url("not a host"), &normalize_url("")));
    }

    #[test]
    fn candidates_add_root_only_for_deep_hosts() {
        assert_eq!(
            candidate_hosts("login.example.com"),
            vec!["login.example.com", "example.com"]
        );
        assert_eq!(candidate_hosts("example.com"), vec!["example.com"]);
        assert_eq!(candidate_hosts("a.b.example.com:8080"), vec![
            "a.b.example.com:8080",
            "example.com:8080"
        ]);
        assert_eq!(candidate_hosts("192.168.1.10"), vec!["192.168.1.10"]);
        assert_eq!(candidate_hosts("[::1]:8080"), vec!["[::1]:8080"]);
    }

    #[test]
    fn matching_is_exact_or_proper_subdomain() {
        assert!(host_matches("example.com", "example.com"));
        assert!(host_matches("login.example.com", "example.com"));
        assert!(!host_matches("badexample.com", "example.com"));
        assert!(!host_matches("example.com", "login.example.com"));
        assert!(!host_matches("example.com", ""));
    }
}
