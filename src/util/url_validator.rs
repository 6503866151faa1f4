use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a feed URL looks unfetchable.
///
/// These never stop a run; the pipeline logs them so a typo in the feed
/// list is noticed before the manifest reaches a fetcher.
#[derive(Error, Debug)]
pub enum UrlCheckError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (expected http/https)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// The URL points at localhost or a private network address.
    #[error("URL points to a local or private address: {0}")]
    LocalAddress(String),
}

/// Checks that a feed URL is an absolute http(s) URL on a public host.
///
/// # Examples
///
/// ```
/// use fetchlist::util::check_url;
///
/// let url = check_url("https://example.com/feed.xml").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(check_url("file:///etc/passwd").is_err());
/// assert!(check_url("http://192.168.1.1/feed").is_err());
/// ```
pub fn check_url(url_str: &str) -> Result<Url, UrlCheckError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlCheckError::UnsupportedScheme(scheme.to_owned())),
    }

    let host = url.host_str().ok_or(UrlCheckError::MissingHost)?;
    if host == "localhost" {
        return Err(UrlCheckError::LocalAddress(host.to_owned()));
    }

    // IPv6 hosts come back bracketed
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_local_ip(&ip) {
            return Err(UrlCheckError::LocalAddress(ip.to_string()));
        }
    }

    Ok(url)
}

fn is_local_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80 // link local
        }
    }
}
