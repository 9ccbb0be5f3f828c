//! Policy seam between the batch driver and the overlay policies.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::distancing::{FootPointMode, ProximityRiskScorer};
use crate::object::Frame;
use crate::redact::RedactionOverlay;

/// Per-frame overlay policy.
///
/// Implementations rewrite `OverlayStyle` only and keep nothing from the
/// frame once `apply` returns. Policies hold compiled-in constants and mode
/// flags, so one instance can serve any number of frames.
pub trait OverlayPolicy: Send + Sync {
    /// Policy identifier used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite overlay styles of every object in `frame` in place.
    fn apply(&self, frame: &mut Frame);
}

/// Selectable policies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolicyKind {
    #[default]
    Redact,
    Distance,
}

impl PolicyKind {
    pub fn build(self, foot_point: FootPointMode) -> Box<dyn OverlayPolicy> {
        match self {
            PolicyKind::Redact => Box::new(RedactionOverlay::new()),
            PolicyKind::Distance => Box::new(ProximityRiskScorer::new(foot_point)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Redact => "redact",
            PolicyKind::Distance => "distance",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redact" | "redaction" => Ok(PolicyKind::Redact),
            "distance" | "distancing" | "proximity" => Ok(PolicyKind::Distance),
            other => Err(anyhow!(
                "unknown policy '{}' (expected redact|distance)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_aliases() {
        assert_eq!("redact".parse::<PolicyKind>().unwrap(), PolicyKind::Redact);
        assert_eq!(" Distancing ".parse::<PolicyKind>().unwrap(), PolicyKind::Distance);
        assert!("blur".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn build_returns_matching_policy() {
        let redact = PolicyKind::Redact.build(FootPointMode::Truncated);
        assert_eq!(redact.name(), "redact");
        let distance = PolicyKind::Distance.build(FootPointMode::Subpixel);
        assert_eq!(distance.name(), "distance");
    }
}
