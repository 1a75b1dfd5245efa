use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons an article link is rejected before it reaches the snapshot.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The link could not be parsed as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The link uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The link has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// The link points at localhost or a private/internal address.
    #[error("Non-public host not allowed: {0}")]
    NonPublicHost(String),
}

/// Validates an article link for publication on the public site.
///
/// Links must be absolute `http`/`https` URLs with a public host. Feeds
/// occasionally carry relative links, `mailto:` links or links into the
/// publisher's intranet; none of those are useful to a site visitor.
///
/// Returns the trimmed link in its original spelling (not re-serialized),
/// so that deduplication compares exactly what the publisher wrote.
///
/// # Examples
///
/// ```
/// use franchise_feeds::util::validate_link;
///
/// assert!(validate_link("https://example.com/story").is_ok());
/// assert!(validate_link("/relative/story").is_err());
/// assert!(validate_link("http://192.168.1.1/story").is_err());
/// ```
pub fn validate_link(link: &str) -> Result<&str, LinkError> {
    let trimmed = link.trim();
    let url = Url::parse(trimmed)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(LinkError::UnsupportedScheme(scheme.to_owned())),
    }

    let host = url.host_str().ok_or(LinkError::MissingHost)?;
    if host.is_empty() {
        return Err(LinkError::MissingHost);
    }
    if host == "localhost" {
        return Err(LinkError::NonPublicHost(host.to_owned()));
    }

    // IPv6 hosts come back bracketed
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(ip) = host_for_parse.parse::<IpAddr>() {
        if !is_public_ip(&ip) {
            return Err(LinkError::NonPublicHost(ip.to_string()));
        }
    }

    Ok(trimmed)
}

fn is_public_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified())
        }
        IpAddr::V6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return false;
            }
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link local
            (first & 0xfe00) != 0xfc00 && (first & 0xffc0) != 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_links_accepted() {
        assert_eq!(
            validate_link("https://www.qsrmagazine.com/story/1").unwrap(),
            "https://www.qsrmagazine.com/story/1"
        );
        assert!(validate_link("http://1851franchise.com/a?b=c").is_ok());
    }

    #[test]
    fn test_link_is_trimmed_not_reserialized() {
        // Url::to_string would append a trailing slash here
        assert_eq!(
            validate_link("  https://example.com  ").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_relative_link_rejected() {
        assert!(matches!(
            validate_link("/news/story"),
            Err(LinkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(matches!(
            validate_link("mailto:editor@example.com"),
            Err(LinkError::UnsupportedScheme(_))
        ));
        assert!(validate_link("ftp://example.com/file").is_err());
    }

    #[test]
    fn test_internal_hosts_rejected() {
        assert!(validate_link("http://localhost/story").is_err());
        assert!(validate_link("http://127.0.0.1/story").is_err());
        assert!(validate_link("http://10.0.0.1/story").is_err());
        assert!(validate_link("http://172.16.0.1:8080/story").is_err());
        assert!(validate_link("http://[::1]/story").is_err());
        assert!(validate_link("http://[fe80::1]/story").is_err());
    }
}
