use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibgenError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with {status}")]
    Status { url: String, status: StatusCode },

    #[error("no download link found for {md5:?}")]
    NotFound { md5: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl LibgenError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            LibgenError::Timeout {
                url: url.to_string(),
            }
        } else {
            LibgenError::Network {
                url: url.to_string(),
                source,
            }
        }
    }

    /// True when the site could not be reached in time or at all.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LibgenError::Timeout { .. } | LibgenError::Network { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LibgenError>;
