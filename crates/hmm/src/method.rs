//! Smoothing method selector.

use std::fmt;
use std::str::FromStr;

use crate::error::HmmError;

/// Which recursion the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Causal filtering: each step only sees past and present observations.
    Forward,
    /// Full smoothing: forward messages combined with backward messages.
    #[default]
    ForwardBackward,
}

impl Method {
    /// Both methods, causal first.
    pub const ALL: [Method; 2] = [Self::Forward, Self::ForwardBackward];

    /// Canonical configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::ForwardBackward => "forward-backward",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = HmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "forward-backward" | "forward_backward" => Ok(Self::ForwardBackward),
            _ => Err(HmmError::UnknownMethod {
                name: s.to_string(),
            }),
        }
    }
}
