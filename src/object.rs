//! Detection metadata shared by every overlay policy.
//!
//! A `Frame` is borrowed mutably from the host for one call. Policies may only
//! rewrite an object's `OverlayStyle`:
//!
//! - `class_id` and `bbox` have getters but no setters.
//! - `Frame` exposes its objects as a slice, so objects cannot be added or removed.
//!
//! Nothing here is cached between calls.

use serde::{Deserialize, Serialize};

/// Class id assigned to persons by the upstream detector.
pub const PERSON_CLASS_ID: i32 = 2;

/// Class id assigned to faces by the upstream detector.
pub const FACE_CLASS_ID: i32 = 0;

/// Class id assigned to license plates by the upstream detector.
pub const LICENSE_PLATE_CLASS_ID: i32 = 1;

// ----------------------------------------------------------------------------
// Geometry
// ----------------------------------------------------------------------------

/// Axis-aligned bounding box in pixel coordinates.
///
/// `width` and `height` are expected to be non-negative but are not checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Horizontal center of the bottom edge.
    pub fn foot_point(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height)
    }
}

// ----------------------------------------------------------------------------
// Overlay style
// ----------------------------------------------------------------------------

/// RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Visual attributes a downstream renderer draws over an object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub border_width: u32,
    pub has_background: bool,
    pub background_color: Rgba,
    pub text_visible: bool,
    pub text_size: u32,
}

impl Default for OverlayStyle {
    /// Outlined box with a visible caption and no fill.
    fn default() -> Self {
        Self {
            border_width: 3,
            has_background: false,
            background_color: Rgba::default(),
            text_visible: true,
            text_size: 12,
        }
    }
}

impl OverlayStyle {
    /// Replace the outline with a solid fill.
    pub fn fill(&mut self, color: Rgba) {
        self.border_width = 0;
        self.has_background = true;
        self.background_color = color;
    }

    pub fn hide_caption(&mut self) {
        self.text_visible = false;
        self.text_size = 0;
    }
}

// ----------------------------------------------------------------------------
// Objects and frames
// ----------------------------------------------------------------------------

/// One detected entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    class_id: i32,
    bbox: BBox,
    #[serde(default)]
    overlay_style: OverlayStyle,
}

impl DetectedObject {
    pub fn new(class_id: i32, bbox: BBox) -> Self {
        Self {
            class_id,
            bbox,
            overlay_style: OverlayStyle::default(),
        }
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    pub fn is_person(&self) -> bool {
        self.class_id == PERSON_CLASS_ID
    }

    pub fn overlay_style(&self) -> &OverlayStyle {
        &self.overlay_style
    }

    /// The only write access policies get.
    pub fn overlay_style_mut(&mut self) -> &mut OverlayStyle {
        &mut self.overlay_style
    }
}

/// One video buffer's detections, in detector order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    objects: Vec<DetectedObject>,
}

impl Frame {
    pub fn new(objects: Vec<DetectedObject>) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &[DetectedObject] {
        &self.objects
    }

    /// Mutable view with a fixed length.
    pub fn objects_mut(&mut self) -> &mut [DetectedObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<DetectedObject> for Frame {
    fn from_iter<I: IntoIterator<Item = DetectedObject>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
