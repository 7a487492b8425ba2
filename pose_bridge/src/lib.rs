//! # pose_bridge
//!
//! Boundary to the external pose-estimation collaborator. The detector
//! (any model that emits COCO's 17-keypoint topology) runs as a separate
//! process and streams one JSON record per video frame, newline-delimited:
//!
//! ```text
//! {"width":640,"height":480,"keypoints":[{"x":311.2,"y":203.6,"confidence":0.93}, …]}
//! {"width":640,"height":480,"keypoints":[]}
//! ```
//!
//! An empty (or absent) `keypoints` array means no person was detected in
//! that frame. The drive pipeline only ever reads one keypoint — a wrist —
//! plus the frame size; everything model-related stays on the far side of
//! this schema.
//!
//! COCO keypoint order:
//!
//! | index | name          | index | name         |
//! |-------|---------------|-------|--------------|
//! | 0     | nose          | 9     | left wrist   |
//! | 1–2   | eyes          | 10    | right wrist  |
//! | 3–4   | ears          | 11–12 | hips         |
//! | 5–6   | shoulders     | 13–14 | knees        |
//! | 7–8   | elbows        | 15–16 | ankles       |
//!
//! Detectors that report only positions put `(0, 0)` at joints they did not
//! see; such placeholders never count as detections.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// COCO topology constants
// ════════════════════════════════════════════════════════════════════════════

/// Keypoints per person in the COCO pose topology.
pub const KEYPOINT_COUNT: usize = 17;

/// Keypoint names in COCO order.
pub const KEYPOINT_NAMES: [&str; KEYPOINT_COUNT] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// Bone segments the cockpit draws: face chain, both arms across the
/// shoulders, torso box, and both legs.
pub const SKELETON_BONES: [(usize, usize); 17] = [
    (6, 4), (4, 2), (2, 0), (0, 1), (1, 3),      // face
    (10, 8), (8, 6), (6, 5), (5, 7), (7, 9),     // arms via shoulders
    (6, 12), (11, 5), (11, 12),                  // torso
    (11, 13), (13, 15), (12, 14), (14, 16),      // legs
];

// ════════════════════════════════════════════════════════════════════════════
// WristSide — which hand steers
// ════════════════════════════════════════════════════════════════════════════

/// The hand used as the virtual joystick cursor.
///
/// Note on mirrored video: when the camera feed is flipped for display, the
/// operator's right hand appears on the screen's right but the *detector*
/// still labels it anatomically. The original rig steered with index 9.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WristSide {
    Left,
    Right,
}

impl WristSide {
    /// COCO keypoint index for this wrist.
    pub const fn index(self) -> usize {
        match self {
            WristSide::Left  => 9,
            WristSide::Right => 10,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            WristSide::Left  => "left",
            WristSide::Right => "right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Keypoint
// ════════════════════════════════════════════════════════════════════════════

/// One detected joint in pixel coordinates, with the detector's confidence
/// in [0, 1].
///
/// Records may omit `confidence`; it then defaults to 1.0 so that
/// position-only detectors keep working.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

impl Keypoint {
    pub const fn new(x: f32, y: f32, confidence: f32) -> Self {
        Keypoint { x, y, confidence }
    }

    /// The `(0, 0)` marker detectors emit for joints they did not see.
    pub fn is_placeholder(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// True when this joint counts as detected: not a placeholder and at
    /// least `min_confidence` sure.
    pub fn is_visible(&self, min_confidence: f32) -> bool {
        !self.is_placeholder() && self.confidence >= min_confidence
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseFrame — one frame's worth of detection
// ════════════════════════════════════════════════════════════════════════════

/// One video frame's detection result: frame size plus the first person's
/// keypoints (empty when nobody was detected).
///
/// ```rust
/// use pose_bridge::{PoseFrame, WristSide};
///
/// let line = r#"{"width":640,"height":480,"keypoints":[]}"#;
/// let frame = PoseFrame::from_json_line(line).unwrap();
/// assert_eq!(frame.wrist(WristSide::Left, 0.25), None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub width:  u32,
    pub height: u32,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl PoseFrame {
    /// A frame with no detection.
    pub fn empty(width: u32, height: u32) -> Self {
        PoseFrame { width, height, keypoints: Vec::new() }
    }

    /// Decode one NDJSON record.
    pub fn from_json_line(line: &str) -> Result<Self, FrameError> {
        let frame: PoseFrame = serde_json::from_str(line)?;
        if frame.width == 0 || frame.height == 0 {
            return Err(FrameError::ZeroDimension {
                width:  frame.width,
                height: frame.height,
            });
        }
        Ok(frame)
    }

    pub fn keypoint(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index)
    }

    /// Look up the steering wrist.
    ///
    /// `None` covers every way a wrist can be missing: nobody in frame, a
    /// truncated keypoint array, a `(0, 0)` placeholder, or confidence
    /// below `min_confidence`. The caller never sees a stale or fabricated
    /// point.
    pub fn wrist(&self, side: WristSide, min_confidence: f32) -> Option<Keypoint> {
        let kp = self.keypoints.get(side.index())?;
        if kp.is_visible(min_confidence) {
            Some(*kp)
        } else {
            None
        }
    }

    /// The frame flipped horizontally, for mirror-style operation (moving
    /// the hand left moves the on-screen cursor left). Placeholders stay
    /// at `(0, 0)` so they keep reading as not detected.
    pub fn mirrored(&self) -> PoseFrame {
        let w = self.width as f32;
        let keypoints = self
            .keypoints
            .iter()
            .map(|kp| {
                if kp.is_placeholder() {
                    *kp
                } else {
                    Keypoint::new(w - kp.x, kp.y, kp.confidence)
                }
            })
            .collect();
        PoseFrame { width: self.width, height: self.height, keypoints }
    }

    /// Drawable skeleton segments: every bone from [`SKELETON_BONES`] whose
    /// endpoints both exist and are not placeholders.
    pub fn bone_segments(&self) -> impl Iterator<Item = ((f32, f32), (f32, f32))> + '_ {
        SKELETON_BONES.iter().filter_map(move |&(a, b)| {
            let ka = self.keypoint(a)?;
            let kb = self.keypoint(b)?;
            if ka.is_placeholder() || kb.is_placeholder() {
                None
            } else {
                Some((ka.position(), kb.position()))
            }
        })
    }
}

/// Reasons a frame record is unusable.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame has zero dimension {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// A full 17-point frame with the left wrist at `(wx, wy)`.
    fn frame_with_wrist(wx: f32, wy: f32, confidence: f32) -> PoseFrame {
        let mut keypoints = vec![Keypoint::new(100.0, 100.0, 0.9); KEYPOINT_COUNT];
        keypoints[WristSide::Left.index()] = Keypoint::new(wx, wy, confidence);
        PoseFrame { width: 640, height: 480, keypoints }
    }

    // ── decoding ─────────────────────────────────────────────────────────
    #[test]
    fn decodes_full_record() {
        let kps: Vec<String> = (0..KEYPOINT_COUNT)
            .map(|i| format!(r#"{{"x":{}.5,"y":{}.5,"confidence":0.8}}"#, i, i * 2))
            .collect();
        let line = format!(
            r#"{{"width":640,"height":480,"keypoints":[{}]}}"#,
            kps.join(",")
        );
        let frame = PoseFrame::from_json_line(&line).unwrap();
        assert_eq!(frame.keypoints.len(), KEYPOINT_COUNT);
        assert_eq!(frame.keypoint(9).unwrap().x, 9.5);
    }

    #[test]
    fn confidence_defaults_to_one() {
        let line = r#"{"width":64,"height":48,"keypoints":[{"x":1.0,"y":2.0}]}"#;
        let frame = PoseFrame::from_json_line(line).unwrap();
        assert_eq!(frame.keypoint(0).unwrap().confidence, 1.0);
    }

    #[test]
    fn keypoints_default_to_empty() {
        let frame = PoseFrame::from_json_line(r#"{"width":640,"height":480}"#).unwrap();
        assert!(frame.keypoints.is_empty());
    }

    #[test]
    fn zero_dimension_rejected() {
        let err = PoseFrame::from_json_line(r#"{"width":0,"height":480}"#).unwrap_err();
        assert!(matches!(err, FrameError::ZeroDimension { width: 0, .. }));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            PoseFrame::from_json_line("not json"),
            Err(FrameError::Json(_))
        ));
    }

    #[test]
    fn round_trips_through_serde() {
        let frame = frame_with_wrist(320.0, 120.0, 0.7);
        let line = serde_json::to_string(&frame).unwrap();
        assert_eq!(PoseFrame::from_json_line(&line).unwrap(), frame);
    }

    // ── wrist lookup ─────────────────────────────────────────────────────
    #[test]
    fn wrist_found_when_confident() {
        let frame = frame_with_wrist(311.0, 205.0, 0.93);
        let wrist = frame.wrist(WristSide::Left, 0.25).unwrap();
        assert_eq!(wrist.position(), (311.0, 205.0));
    }

    #[test]
    fn low_confidence_wrist_is_not_detected() {
        let frame = frame_with_wrist(311.0, 205.0, 0.1);
        assert_eq!(frame.wrist(WristSide::Left, 0.25), None);
    }

    #[test]
    fn placeholder_wrist_is_not_detected() {
        let frame = frame_with_wrist(0.0, 0.0, 0.99);
        assert_eq!(frame.wrist(WristSide::Left, 0.25), None);
    }

    #[test]
    fn empty_frame_has_no_wrist() {
        let frame = PoseFrame::empty(640, 480);
        assert_eq!(frame.wrist(WristSide::Left, 0.25), None);
        assert_eq!(frame.wrist(WristSide::Right, 0.25), None);
    }

    #[test]
    fn truncated_keypoint_array_has_no_wrist() {
        let frame = PoseFrame {
            width:  640,
            height: 480,
            keypoints: vec![Keypoint::new(5.0, 5.0, 0.9); 4],
        };
        assert_eq!(frame.wrist(WristSide::Left, 0.25), None);
    }

    #[test]
    fn wrist_sides_use_coco_indices() {
        assert_eq!(WristSide::Left.index(), 9);
        assert_eq!(WristSide::Right.index(), 10);
        assert_eq!(KEYPOINT_NAMES[WristSide::Left.index()], "left_wrist");
        assert_eq!(KEYPOINT_NAMES[WristSide::Right.index()], "right_wrist");
    }

    // ── skeleton ─────────────────────────────────────────────────────────
    #[test]
    fn bone_table_indices_in_range() {
        for &(a, b) in &SKELETON_BONES {
            assert!(a < KEYPOINT_COUNT && b < KEYPOINT_COUNT);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn bone_segments_skip_placeholders() {
        let mut frame = frame_with_wrist(311.0, 205.0, 0.9);
        let full = frame.bone_segments().count();
        assert_eq!(full, SKELETON_BONES.len());

        // Knock out one shoulder: every bone touching index 6 disappears.
        frame.keypoints[6] = Keypoint::new(0.0, 0.0, 0.0);
        let trimmed = frame.bone_segments().count();
        let touching = SKELETON_BONES.iter().filter(|&&(a, b)| a == 6 || b == 6).count();
        assert_eq!(trimmed, full - touching);
    }

    #[test]
    fn bone_segments_empty_without_detection() {
        assert_eq!(PoseFrame::empty(640, 480).bone_segments().count(), 0);
    }

    // ── mirroring ────────────────────────────────────────────────────────
    #[test]
    fn mirror_flips_x_keeps_y() {
        let frame = frame_with_wrist(470.0, 205.0, 0.9);
        let flipped = frame.mirrored();
        let wrist = flipped.wrist(WristSide::Left, 0.25).unwrap();
        assert_eq!(wrist.position(), (170.0, 205.0));
        assert_eq!(flipped.width, frame.width);
    }

    #[test]
    fn mirror_leaves_placeholders_alone() {
        let mut frame = frame_with_wrist(470.0, 205.0, 0.9);
        frame.keypoints[3] = Keypoint::new(0.0, 0.0, 0.0);
        let flipped = frame.mirrored();
        assert!(flipped.keypoints[3].is_placeholder());
        // A mirrored frame mirrors back to itself.
        assert_eq!(flipped.mirrored(), frame);
    }
}
