//! Overlay Kernel
//!
//! Per-frame overlay policies over detector output. The host pipeline hands
//! over a batch of frames once per video buffer; the active policy rewrites
//! each object's overlay style in place and the host renders the result.
//!
//! # Policies
//!
//! - **Redaction**: faces and license plates are covered by opaque patches,
//!   captions are hidden on every object.
//! - **Distancing**: every person is scored by how far other persons intrude
//!   into a radius equal to its own box height; the score tints the box red.
//!
//! # Module Structure
//!
//! - `object`: Frame, DetectedObject, BBox, OverlayStyle, class ids
//! - `redact`: RedactionOverlay
//! - `distancing`: foot-point distance, danger score, color law
//! - `policy`: OverlayPolicy trait and policy selection
//! - `processor`: FrameProcessor batch driver and missing-frame handling
//! - `config`: host-side configuration loader
//!
//! Nothing here keeps state between calls. Policies only write
//! `OverlayStyle`; class ids and boxes are read-only.

pub mod config;
pub mod distancing;
pub mod object;
pub mod policy;
pub mod processor;
pub mod redact;

pub use config::OverlayConfig;
pub use distancing::{
    danger_color, distance_between, how_dangerous, FootPointMode, PersonScore,
    ProximityRiskScorer,
};
pub use object::{
    BBox, DetectedObject, Frame, OverlayStyle, Rgba, FACE_CLASS_ID, LICENSE_PLATE_CLASS_ID,
    PERSON_CLASS_ID,
};
pub use policy::{OverlayPolicy, PolicyKind};
pub use processor::{BatchReport, FrameFault, FrameProcessor, MissingFramePolicy, ProbeStatus};
pub use redact::{RedactionOverlay, FACE_PATCH, PLATE_PATCH};
