//! Result classification
//!
//! Every response collapses into exactly one [`Outcome`]. This is the only
//! place that decides whether the projector accepted a command.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FAILURE_SENTINEL, SUCCESS_PREFIX, SUCCESS_SENTINEL};

/// Why an exchange did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The projector answered with its failure sentinel
    Rejected,
    /// Nothing arrived within the poll budget
    NoResponse,
    /// Something arrived but it matches no known response shape
    Unrecognized(String),
}

/// Classified response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Bare acknowledgement, no payload
    Success,
    /// Success prefix followed by a (possibly empty) payload
    Data(String),
    /// Anything else, including silence
    Failure(FailureReason),
}

impl Outcome {
    /// Classify a stripped response string
    pub fn classify(response: &str) -> Self {
        if response == SUCCESS_SENTINEL {
            Outcome::Success
        } else if let Some(payload) = response.strip_prefix(SUCCESS_PREFIX) {
            Outcome::Data(payload.to_string())
        } else if response.is_empty() {
            Outcome::Failure(FailureReason::NoResponse)
        } else if response == FAILURE_SENTINEL {
            Outcome::Failure(FailureReason::Rejected)
        } else {
            Outcome::Failure(FailureReason::Unrecognized(response.to_string()))
        }
    }

    /// Success check used by every setter
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::Data(_))
    }

    /// Payload of a `Data` outcome
    pub fn payload(&self) -> Option<&str> {
        match self {
            Outcome::Data(payload) => Some(payload),
            _ => None,
        }
    }

    /// Owned payload of a `Data` outcome
    pub fn into_payload(self) -> Option<String> {
        match self {
            Outcome::Data(payload) => Some(payload),
            _ => None,
        }
    }

    /// Why the exchange failed, if it did
    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            Outcome::Failure(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Data(payload) => write!(f, "data {:?}", payload),
            Outcome::Failure(FailureReason::Rejected) => write!(f, "rejected"),
            Outcome::Failure(FailureReason::NoResponse) => write!(f, "no response"),
            Outcome::Failure(FailureReason::Unrecognized(raw)) => {
                write!(f, "unrecognized response {:?}", raw)
            }
        }
    }
}
