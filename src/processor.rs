//! Batch driver.
//!
//! The host hands over one buffer's worth of frames. Each present frame goes
//! through the active policy. An absent frame (the host could not resolve
//! its metadata) is a non-fatal fault: it is logged, reported, and the batch
//! still completes with `ProbeStatus::Continue`.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use thiserror::Error;

use crate::distancing::FootPointMode;
use crate::object::Frame;
use crate::policy::{OverlayPolicy, PolicyKind};

/// Completion signal returned to the host pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Forward the buffer normally.
    Continue,
}

/// Faults recognized while walking a batch.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameFault {
    #[error("frame {index} of batch has no metadata")]
    MissingFrameMetadata { index: usize },
}

/// What to do with the rest of a batch after an absent frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingFramePolicy {
    /// Stop at the absent frame; later frames are left untouched.
    #[default]
    SkipRemaining,
    /// Skip only the absent frame.
    SkipFrame,
}

impl MissingFramePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingFramePolicy::SkipRemaining => "skip-remaining",
            MissingFramePolicy::SkipFrame => "skip-frame",
        }
    }
}

impl fmt::Display for MissingFramePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingFramePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "skip-remaining" => Ok(MissingFramePolicy::SkipRemaining),
            "skip-frame" => Ok(MissingFramePolicy::SkipFrame),
            other => Err(anyhow!(
                "unknown missing frame policy '{}' (expected skip-remaining|skip-frame)",
                other
            )),
        }
    }
}

/// Outcome of one `process` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    pub status: ProbeStatus,
    /// Frames the policy ran on.
    pub frames_processed: usize,
    /// Absent frames plus frames never reached.
    pub frames_skipped: usize,
    /// First fault seen, if any.
    pub fault: Option<FrameFault>,
}

/// Applies one overlay policy to every frame of a batch.
pub struct FrameProcessor {
    policy: Box<dyn OverlayPolicy>,
    missing_frame: MissingFramePolicy,
}

impl FrameProcessor {
    pub fn new(policy: Box<dyn OverlayPolicy>) -> Self {
        Self {
            policy,
            missing_frame: MissingFramePolicy::default(),
        }
    }

    pub fn for_kind(kind: PolicyKind, foot_point: FootPointMode) -> Self {
        Self::new(kind.build(foot_point))
    }

    pub fn with_missing_frame_policy(mut self, missing_frame: MissingFramePolicy) -> Self {
        self.missing_frame = missing_frame;
        self
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn missing_frame_policy(&self) -> MissingFramePolicy {
        self.missing_frame
    }

    /// Run the policy over `batch` in order. `None` entries are absent frames.
    pub fn process(&self, batch: &mut [Option<Frame>]) -> BatchReport {
        let mut report = BatchReport {
            status: ProbeStatus::Continue,
            frames_processed: 0,
            frames_skipped: 0,
            fault: None,
        };

        let total = batch.len();
        for (index, slot) in batch.iter_mut().enumerate() {
            let Some(frame) = slot.as_mut() else {
                let fault = FrameFault::MissingFrameMetadata { index };
                log::warn!("{}; policy {}", fault, self.missing_frame);
                report.fault.get_or_insert(fault);
                match self.missing_frame {
                    MissingFramePolicy::SkipRemaining => {
                        report.frames_skipped += total - index;
                        break;
                    }
                    MissingFramePolicy::SkipFrame => {
                        report.frames_skipped += 1;
                        continue;
                    }
                }
            };

            self.policy.apply(frame);
            report.frames_processed += 1;
            log::debug!(
                "{} applied to frame {} ({} objects)",
                self.policy.name(),
                index,
                frame.len()
            );
        }

        report
    }
}
