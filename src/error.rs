use std::time::Duration;
use thiserror::Error;

/// Feed endpoint unreachable or returned something we cannot decode.
/// Fatal to the scan that triggered the fetch, never to the session.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("chain tag must not be empty")]
    EmptyChain,

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("feed body is not a JSON array of profiles: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

/// Failures of the browser capability itself.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("could not open a WebDriver session at {url}: {detail}")]
    Connect { url: String, detail: String },

    #[error("navigation to {url} failed: {detail}")]
    Navigate { url: String, detail: String },

    #[error("`{selector}` not visible after {waited:?}")]
    Timeout { selector: String, waited: Duration },

    #[error("webdriver command failed: {0}")]
    Command(String),
}

/// Why a single token could not be scraped.
#[derive(Debug, Error)]
pub enum ScrapeCause {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("no element matches `{0}`")]
    MissingElement(String),

    #[error("organic score `{0}` is not a number")]
    InvalidScore(String),

    #[error("expected 4 stat blocks, found {found}")]
    MissingStats { found: usize },

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("no live browser session left to scan it")]
    NoSession,
}

/// One token's page failed; local to that token.
#[derive(Debug, Error)]
#[error("{address}: {cause}")]
pub struct ScrapeError {
    pub address: String,
    #[source]
    pub cause: ScrapeCause,
}

impl ScrapeError {
    pub fn new(address: impl Into<String>, cause: impl Into<ScrapeCause>) -> Self {
        Self {
            address: address.into(),
            cause: cause.into(),
        }
    }
}

/// A line of input that does not name a runnable command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid command: {0}")]
    UnknownCommand(String),

    #[error("`{command}` takes {expected} argument(s), got {got}")]
    Arity {
        command: &'static str,
        expected: usize,
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_error_display_names_address() {
        let err = ScrapeError::new("So1abc", ScrapeCause::InvalidScore("n/a".into()));
        assert_eq!(err.to_string(), "So1abc: organic score `n/a` is not a number");
    }

    #[test]
    fn test_browser_error_converts_into_cause() {
        let err = ScrapeError::new(
            "So1abc",
            BrowserError::Timeout {
                selector: ".score".into(),
                waited: Duration::from_secs(5),
            },
        );
        assert!(matches!(err.cause, ScrapeCause::Browser(BrowserError::Timeout { .. })));
        assert!(err.to_string().contains("`.score` not visible after 5s"));
    }

    #[test]
    fn test_dispatch_error_messages() {
        assert_eq!(
            DispatchError::UnknownCommand("bogus".into()).to_string(),
            "Invalid command: bogus"
        );
        let arity = DispatchError::Arity {
            command: "scan",
            expected: 1,
            got: 0,
        };
        assert_eq!(arity.to_string(), "`scan` takes 1 argument(s), got 0");
    }
}
