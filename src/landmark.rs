// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose landmark schema and landmark containers.
//!
//! The pose model predicts 33 body landmarks with a fixed anatomical meaning.
//! [`PoseLandmarks`] holds one frame's prediction in normalized frame coordinates,
//! [`LandmarkPoint`] is a single landmark denormalized to pixels.

use std::fmt;
use std::ops::Index;

/// Number of landmarks in the pose schema.
pub const NUM_LANDMARKS: usize = 33;

/// Named landmarks of the 33-point pose schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    /// All landmarks in index order.
    pub const ALL: [Self; NUM_LANDMARKS] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Index of this landmark in the model output.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Landmark for a model output index, if the index is part of the schema.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < NUM_LANDMARKS {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Snake-case landmark name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for PoseLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Anatomically adjacent landmark pairs forming the pose skeleton.
pub const POSE_CONNECTIONS: [[usize; 2]; 35] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 7],
    [0, 4],
    [4, 5],
    [5, 6],
    [6, 8],
    [9, 10],
    [11, 12], // shoulders
    [11, 13],
    [13, 15],
    [15, 17],
    [15, 19],
    [15, 21],
    [17, 19],
    [12, 14],
    [14, 16],
    [16, 18],
    [16, 20],
    [16, 22],
    [18, 20],
    [11, 23], // torso
    [12, 24],
    [23, 24],
    [23, 25], // legs
    [24, 26],
    [25, 27],
    [26, 28],
    [27, 29],
    [28, 30],
    [29, 31],
    [30, 32],
    [27, 31],
    [28, 32],
];

/// Landmarks skipped when drawing the skeleton: face points and finger tips.
pub const HIDDEN_LANDMARKS: [usize; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 17, 18, 19, 20];

/// Highest face landmark index. Connections touching it or anything below are not drawn.
pub const LAST_FACE_LANDMARK: usize = 10;

/// Joint triples (first, vertex, last) annotated with their angle.
pub const ANGLE_JOINTS: [[usize; 3]; 10] = [
    [23, 11, 13], // left shoulder
    [24, 12, 14], // right shoulder
    [11, 13, 15], // left elbow
    [12, 14, 16], // right elbow
    [13, 15, 19], // left wrist
    [14, 16, 20], // right wrist
    [23, 25, 27], // left knee
    [24, 26, 28], // right knee
    [31, 27, 25], // left ankle
    [32, 28, 26], // right ankle
];

/// Whether a landmark is drawn as a skeleton point.
#[must_use]
pub fn is_drawn(index: usize) -> bool {
    !HIDDEN_LANDMARKS.contains(&index)
}

/// Whether a connection is drawn as a skeleton line.
#[must_use]
pub const fn is_body_connection(connection: [usize; 2]) -> bool {
    connection[0] > LAST_FACE_LANDMARK && connection[1] > LAST_FACE_LANDMARK
}

/// A single landmark in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    /// Horizontal position as a fraction of frame width.
    pub x: f32,
    /// Vertical position as a fraction of frame height.
    pub y: f32,
    /// Depth relative to the hips, roughly in the same scale as `x`.
    pub z: f32,
    /// Likelihood (0.0 to 1.0) that the landmark is visible.
    pub visibility: f32,
}

impl Landmark {
    /// Create a landmark at a normalized position with full visibility.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    /// Pixel position on a frame of the given size.
    #[must_use]
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        denormalize(self, width, height)
    }
}

/// Denormalize a landmark against frame dimensions.
///
/// Coordinates are truncated toward zero, so a landmark slightly outside the
/// frame keeps its (possibly negative) pixel position.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn denormalize(landmark: &Landmark, width: u32, height: u32) -> (i32, i32) {
    let x = f64::from(landmark.x) * f64::from(width);
    let y = f64::from(landmark.y) * f64::from(height);
    (x as i32, y as i32)
}

/// The landmarks of one detected pose.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarks {
    landmarks: Vec<Landmark>,
    /// Pose presence score reported by the model (0.0 to 1.0).
    pub presence: f32,
}

impl PoseLandmarks {
    /// Create a pose from its landmarks in schema order.
    #[must_use]
    pub const fn new(landmarks: Vec<Landmark>, presence: f32) -> Self {
        Self {
            landmarks,
            presence,
        }
    }

    /// Number of landmarks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// Check if the pose has no landmarks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Landmark by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Landmarks in schema order.
    #[must_use]
    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Iterate over landmarks in schema order.
    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.landmarks.iter()
    }

    /// Denormalize every landmark to `(index, x, y)` pixel triples.
    #[must_use]
    pub fn to_points(&self, width: u32, height: u32) -> Vec<LandmarkPoint> {
        self.landmarks
            .iter()
            .enumerate()
            .map(|(id, lm)| {
                let (x, y) = lm.to_pixel(width, height);
                LandmarkPoint { id, x, y }
            })
            .collect()
    }
}

impl Index<usize> for PoseLandmarks {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.landmarks[index]
    }
}

impl Index<PoseLandmark> for PoseLandmarks {
    type Output = Landmark;

    fn index(&self, landmark: PoseLandmark) -> &Self::Output {
        &self.landmarks[landmark.index()]
    }
}

impl<'a> IntoIterator for &'a PoseLandmarks {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.landmarks.iter()
    }
}

/// A landmark denormalized to pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LandmarkPoint {
    /// Landmark index in the pose schema.
    pub id: usize,
    /// Pixel column.
    pub x: i32,
    /// Pixel row.
    pub y: i32,
}

impl LandmarkPoint {
    /// Pixel position as a tuple.
    #[must_use]
    pub const fn xy(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl fmt::Display for LandmarkPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.id, self.x, self.y)
    }
}
