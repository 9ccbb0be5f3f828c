//! Proximity risk scoring for persons.
//!
//! Each person's own box height is its danger distance. For every other
//! person in the same frame closer than that (foot point to foot point), the
//! shortfall normalized by the danger distance is added to the person's score.
//! Scores are unbounded above; the color law clamps them.
//!
//! Cost is O(p^2) over the persons of a frame.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::object::{BBox, Frame, Rgba};
use crate::policy::OverlayPolicy;

/// Weight applied to the danger score before clamping.
pub const DANGER_GAIN: f32 = 0.6;

/// Upper bound of the color offset.
pub const DANGER_COLOR_MAX: f32 = 0.6;

/// Channel value of the zero-danger color.
pub const BASELINE_CHANNEL: f32 = 0.2;

/// How foot-point coordinates enter the distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FootPointMode {
    /// Coordinates are truncated toward zero to whole pixels before
    /// differencing. Sub-pixel offsets between boxes are lost.
    #[default]
    Truncated,
    /// Full floating-point coordinates.
    Subpixel,
}

impl FootPointMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FootPointMode::Truncated => "truncated",
            FootPointMode::Subpixel => "subpixel",
        }
    }
}

impl fmt::Display for FootPointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FootPointMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truncated" | "integer" => Ok(FootPointMode::Truncated),
            "subpixel" | "float" => Ok(FootPointMode::Subpixel),
            other => Err(anyhow!(
                "unknown foot point mode '{}' (expected truncated|subpixel)",
                other
            )),
        }
    }
}

/// Euclidean distance between the foot points of two boxes.
pub fn distance_between(a: &BBox, b: &BBox, mode: FootPointMode) -> f32 {
    let (ax, ay) = a.foot_point();
    let (bx, by) = b.foot_point();
    let (dx, dy) = match mode {
        FootPointMode::Truncated => (
            f64::from(ax.trunc()) - f64::from(bx.trunc()),
            f64::from(ay.trunc()) - f64::from(by.trunc()),
        ),
        FootPointMode::Subpixel => (f64::from(ax - bx), f64::from(ay - by)),
    };
    (dx * dx + dy * dy).sqrt() as f32
}

/// Sum of normalized threshold violations of `person` against `others`.
///
/// `others` must not contain `person` itself. A non-positive (or NaN) height
/// gives no usable threshold and scores zero.
pub fn how_dangerous<'a, I>(person: &BBox, others: I, mode: FootPointMode) -> f32
where
    I: IntoIterator<Item = &'a BBox>,
{
    let danger_distance = person.height;
    if danger_distance.is_nan() || danger_distance <= 0.0 {
        return 0.0;
    }
    others
        .into_iter()
        .map(|other| {
            let violation = danger_distance - distance_between(person, other, mode);
            violation.max(0.0) / danger_distance
        })
        .sum()
}

/// Background color for a danger score.
///
/// Red and alpha rise from 0.2 to at most 0.8; green and blue stay at 0.2.
pub fn danger_color(how_dangerous: f32) -> Rgba {
    let color_val = (how_dangerous * DANGER_GAIN).clamp(0.0, DANGER_COLOR_MAX);
    Rgba::new(
        BASELINE_CHANNEL + color_val,
        BASELINE_CHANNEL,
        BASELINE_CHANNEL,
        BASELINE_CHANNEL + color_val,
    )
}

/// Score of one person, keyed by its position in the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersonScore {
    pub index: usize,
    pub score: f32,
}

/// Recolors persons by proximity to other persons in the same frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProximityRiskScorer {
    mode: FootPointMode,
}

impl ProximityRiskScorer {
    pub fn new(mode: FootPointMode) -> Self {
        Self { mode }
    }

    /// Score every person of `frame` without touching styles.
    ///
    /// Results are in frame order. Non-person objects are absent.
    pub fn score_frame(&self, frame: &Frame) -> Vec<PersonScore> {
        let persons: Vec<(usize, BBox)> = frame
            .objects()
            .iter()
            .enumerate()
            .filter(|(_, obj)| obj.is_person())
            .map(|(index, obj)| (index, *obj.bbox()))
            .collect();

        persons
            .iter()
            .enumerate()
            .map(|(slot, (index, bbox))| {
                let others = persons
                    .iter()
                    .enumerate()
                    .filter(|(other_slot, _)| *other_slot != slot)
                    .map(|(_, (_, other))| other);
                PersonScore {
                    index: *index,
                    score: how_dangerous(bbox, others, self.mode),
                }
            })
            .collect()
    }
}

impl OverlayPolicy for ProximityRiskScorer {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn apply(&self, frame: &mut Frame) {
        let scores = self.score_frame(frame);
        let objects = frame.objects_mut();
        for PersonScore { index, score } in scores {
            log::trace!("person {} danger {:.3}", index, score);
            objects[index].overlay_style_mut().fill(danger_color(score));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{DetectedObject, PERSON_CLASS_ID};

    const EPS: f32 = 1e-5;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn person(left: f32, top: f32, width: f32, height: f32) -> DetectedObject {
        DetectedObject::new(PERSON_CLASS_ID, BBox::new(left, top, width, height))
    }

    #[test]
    fn distance_is_symmetric() {
        let boxes = [
            BBox::new(0.0, 0.0, 10.0, 20.0),
            BBox::new(3.7, 11.2, 5.5, 8.9),
            BBox::new(-4.0, 2.5, 1.0, 0.0),
            BBox::new(640.0, 480.0, 33.3, 77.7),
        ];
        for mode in [FootPointMode::Truncated, FootPointMode::Subpixel] {
            for a in &boxes {
                for b in &boxes {
                    assert_eq!(distance_between(a, b, mode), distance_between(b, a, mode));
                }
            }
        }
    }

    #[test]
    fn distance_uses_foot_points() {
        // feet at (5, 20) and (8, 24)
        let a = BBox::new(0.0, 0.0, 10.0, 20.0);
        let b = BBox::new(3.0, 4.0, 10.0, 20.0);
        assert_close(distance_between(&a, &b, FootPointMode::Subpixel), 5.0);
        assert_close(distance_between(&a, &b, FootPointMode::Truncated), 5.0);
    }

    #[test]
    fn truncation_drops_subpixel_offsets() {
        // feet at (2.5, 10) and (2.0, 10)
        let a = BBox::new(0.0, 0.0, 5.0, 10.0);
        let b = BBox::new(0.0, 0.0, 4.0, 10.0);
        assert_eq!(distance_between(&a, &b, FootPointMode::Truncated), 0.0);
        assert_close(distance_between(&a, &b, FootPointMode::Subpixel), 0.5);
    }

    #[test]
    fn truncation_rounds_toward_zero() {
        // feet at (-2.5, 0) and (2.5, 0) truncate to -2 and 2
        let a = BBox::new(-5.0, -1.0, 5.0, 1.0);
        let b = BBox::new(0.0, -1.0, 5.0, 1.0);
        assert_close(distance_between(&a, &b, FootPointMode::Truncated), 4.0);
        assert_close(distance_between(&a, &b, FootPointMode::Subpixel), 5.0);
    }

    #[test]
    fn negative_width_puts_feet_left_of_left_edge() {
        // foot at (10 - 5, 20), same as the regular box's (0 + 5, 20)
        let mirrored = BBox::new(10.0, 0.0, -10.0, 20.0);
        let regular = BBox::new(0.0, 0.0, 10.0, 20.0);
        assert_eq!(mirrored.foot_point(), (5.0, 20.0));
        for mode in [FootPointMode::Truncated, FootPointMode::Subpixel] {
            assert_eq!(distance_between(&mirrored, &regular, mode), 0.0);
            assert_close(how_dangerous(&regular, [&mirrored], mode), 1.0);
        }
    }

    #[test]
    fn lone_person_is_safe() {
        let bbox = BBox::new(0.0, 0.0, 10.0, 20.0);
        let nobody: [&BBox; 0] = [];
        assert_eq!(how_dangerous(&bbox, nobody, FootPointMode::Truncated), 0.0);
        assert_eq!(danger_color(0.0), Rgba::new(0.2, 0.2, 0.2, 0.2));
    }

    #[test]
    fn far_neighbors_contribute_nothing() {
        let bbox = BBox::new(0.0, 0.0, 10.0, 20.0);
        let far = BBox::new(100.0, 0.0, 10.0, 20.0);
        assert_eq!(how_dangerous(&bbox, [&far], FootPointMode::Truncated), 0.0);
    }

    #[test]
    fn scores_add_up_across_neighbors() {
        let bbox = BBox::new(0.0, 0.0, 10.0, 20.0);
        let same = bbox;
        let near = BBox::new(10.0, 0.0, 10.0, 20.0); // 10px away
        let score = how_dangerous(&bbox, [&same, &near], FootPointMode::Truncated);
        assert_close(score, 1.5);
    }

    #[test]
    fn threshold_is_the_subject_height() {
        // same foot points, different heights: 10px apart horizontally
        let short = BBox::new(0.0, 10.0, 10.0, 10.0);
        let tall = BBox::new(10.0, 0.0, 10.0, 20.0);
        assert_eq!(how_dangerous(&short, [&tall], FootPointMode::Truncated), 0.0);
        assert_close(how_dangerous(&tall, [&short], FootPointMode::Truncated), 0.5);
    }

    #[test]
    fn zero_height_scores_zero() {
        let flat = BBox::new(0.0, 0.0, 10.0, 0.0);
        let other = BBox::new(0.0, -20.0, 10.0, 20.0);
        let score = how_dangerous(&flat, [&other], FootPointMode::Subpixel);
        assert_eq!(score, 0.0);
        assert!(danger_color(score).r.is_finite());
    }

    #[test]
    fn negative_height_scores_zero() {
        let inverted = BBox::new(0.0, 0.0, 10.0, -5.0);
        let other = inverted;
        assert_eq!(how_dangerous(&inverted, [&other], FootPointMode::Truncated), 0.0);
    }

    #[test]
    fn color_law_is_clamped() {
        let max = Rgba::new(0.8, 0.2, 0.2, 0.8);
        for score in [1.0, 2.0, 3.0, 50.0] {
            let color = danger_color(score);
            assert_close(color.r, max.r);
            assert_close(color.a, max.a);
            assert_close(color.g, max.g);
            assert_close(color.b, max.b);
        }
        let half = danger_color(0.5);
        assert_close(half.r, 0.5);
        assert_close(half.a, 0.5);
    }

    #[test]
    fn score_frame_skips_non_persons() {
        let frame: Frame = vec![
            person(0.0, 0.0, 10.0, 20.0),
            DetectedObject::new(5, BBox::new(0.0, 0.0, 10.0, 20.0)),
            person(0.0, 0.0, 10.0, 20.0),
        ]
        .into_iter()
        .collect();

        let scores = ProximityRiskScorer::default().score_frame(&frame);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].index, 0);
        assert_eq!(scores[1].index, 2);
        assert_close(scores[0].score, 1.0);
        assert_close(scores[1].score, 1.0);
    }

    #[test]
    fn apply_recolors_persons() {
        let mut frame: Frame = vec![person(0.0, 0.0, 10.0, 20.0), person(0.0, 0.0, 10.0, 20.0)]
            .into_iter()
            .collect();
        ProximityRiskScorer::default().apply(&mut frame);

        for obj in frame.objects() {
            let style = obj.overlay_style();
            assert_eq!(style.border_width, 0);
            assert!(style.has_background);
            assert_close(style.background_color.r, 0.8);
            assert_close(style.background_color.g, 0.2);
            assert_close(style.background_color.b, 0.2);
            assert_close(style.background_color.a, 0.8);
        }
    }

    #[test]
    fn parses_foot_point_modes() {
        assert_eq!(
            "Subpixel".parse::<FootPointMode>().unwrap(),
            FootPointMode::Subpixel
        );
        assert_eq!(
            "truncated".parse::<FootPointMode>().unwrap(),
            FootPointMode::Truncated
        );
        assert!("rounded".parse::<FootPointMode>().is_err());
    }
}
