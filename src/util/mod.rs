use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid URL: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validate a URL string for use as a feed source: it must parse and use an
/// http(s) scheme. Local and intranet hosts are allowed; a personal
/// aggregator legitimately polls them.
pub fn validate_feed_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_owned())),
    }
}
