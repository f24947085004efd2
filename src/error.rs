//! Error taxonomy for the poll loop and startup configuration.
//!
//! Every way an iteration can fail is a variant of [`PollError`]; the loop
//! matches on it exhaustively. An empty submission list is not an error and
//! lives in [`crate::poller::PollOutcome`] instead.

use std::fmt;

/// Request details attached to fetch errors.
///
/// The authorization header is stored already redacted, so this value is
/// safe to log and to send to chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Endpoint URL the request was sent to.
    pub url: String,
    /// Request headers as `(name, value)` pairs, secrets redacted.
    pub headers: Vec<(String, String)>,
    /// Query parameters as `(name, value)` pairs.
    pub params: Vec<(String, String)>,
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "url={}, headers={{", self.url)?;
        write_pairs(f, &self.headers)?;
        write!(f, "}}, params={{")?;
        write_pairs(f, &self.params)?;
        write!(f, "}}")
    }
}

fn write_pairs(f: &mut fmt::Formatter<'_>, pairs: &[(String, String)]) -> fmt::Result {
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{name}: {value}")?;
    }
    Ok(())
}

/// The response body parsed but did not have the expected structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// Top-level body is not a JSON object.
    #[error("API response is not an object, got {found}")]
    ResponseNotObject {
        /// JSON type that was found instead.
        found: &'static str,
    },
    /// `homeworks` is present but is not an array.
    #[error("API response field \"homeworks\" is not an array, got {found}")]
    HomeworksNotArray {
        /// JSON type that was found instead.
        found: &'static str,
    },
    /// The latest homework record is not a JSON object.
    #[error("homework record is not an object, got {found}")]
    HomeworkNotObject {
        /// JSON type that was found instead.
        found: &'static str,
    },
    /// A required key is absent.
    #[error("missing key \"{0}\"")]
    MissingKey(&'static str),
}

/// Failure of a single poll iteration.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The request never produced a response (connect error, timeout, reset).
    #[error("request to homework API failed: {message}; {context}")]
    Transport {
        /// Underlying transport error text.
        message: String,
        /// What was being requested.
        context: RequestContext,
    },
    /// The endpoint answered with a status other than 200.
    #[error("homework API returned status {status}; {context}")]
    BadEndpoint {
        /// HTTP status code.
        status: u16,
        /// What was being requested.
        context: RequestContext,
    },
    /// The body could not be parsed as JSON.
    #[error("homework API response is not valid JSON: {0}")]
    MalformedResponse(String),
    /// The body parsed but has the wrong structure.
    #[error(transparent)]
    BadShape(#[from] ShapeError),
    /// The homework status is not in the verdict table.
    #[error("unknown homework status: {status}")]
    UnknownStatus {
        /// Status value as received, or `<missing>`.
        status: String,
    },
}

/// Fatal startup configuration failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("required configuration variable {0} is not set")]
    Missing(&'static str),
    /// A required variable is set but blank.
    #[error("required configuration variable {0} is empty")]
    Empty(&'static str),
    /// A value is present but unusable.
    #[error("invalid configuration value for {name}: {reason}")]
    Invalid {
        /// Variable or setting name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
