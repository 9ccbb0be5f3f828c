//! Redaction overlay.
//!
//! Faces get a skin-tone patch, license plates a black one. Captions are
//! hidden for every object so class labels never reach the rendered frame.

use crate::object::{DetectedObject, Frame, Rgba, FACE_CLASS_ID, LICENSE_PLATE_CLASS_ID};
use crate::policy::OverlayPolicy;

/// Opaque skin-tone patch drawn over faces.
pub const FACE_PATCH: Rgba = Rgba::new(0.92, 0.75, 0.56, 1.0);

/// Opaque black patch drawn over license plates.
pub const PLATE_PATCH: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

/// Conceals faces and plates. O(n) per frame, no cross-object state.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedactionOverlay;

impl RedactionOverlay {
    pub fn new() -> Self {
        Self
    }

    /// Patch color for a class, if the class is redacted.
    pub fn patch_for(class_id: i32) -> Option<Rgba> {
        match class_id {
            LICENSE_PLATE_CLASS_ID => Some(PLATE_PATCH),
            FACE_CLASS_ID => Some(FACE_PATCH),
            _ => None,
        }
    }

    pub fn redact_object(&self, object: &mut DetectedObject) {
        let patch = Self::patch_for(object.class_id());
        let style = object.overlay_style_mut();
        style.hide_caption();
        if let Some(color) = patch {
            style.fill(color);
        }
    }
}

impl OverlayPolicy for RedactionOverlay {
    fn name(&self) -> &'static str {
        "redact"
    }

    fn apply(&self, frame: &mut Frame) {
        for object in frame.objects_mut() {
            self.redact_object(object);
        }
    }
}
