// REFLEX Viz - Displayed Signal Lists
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Which Hume scores and body joints make it onto the screen. Trim or extend
// these to change what is plotted.

pub const POSITIVE_EMOTIONS: [&str; 4] = ["Admiration", "Adoration", "Aesthetic Appreciation", "Amusement"];

pub const NEGATIVE_EMOTIONS: [&str; 6] = ["Anger", "Anxiety", "Awkwardness", "Boredom", "Confusion", "Contempt"];

pub const ACTION_UNITS: [&str; 9] = [
    "AU1 Inner Brow Raise",
    "AU2 Outer Brow Raise",
    "AU4 Brow Lowerer",
    "AU5 Upper Lid Raise",
    "AU6 Cheek Raise",
    "AU7 Lids Tight",
    "AU9 Nose Wrinkle",
    "AU10 Upper Lip Raiser",
    "AU12 Lip Corner Puller",
];

pub const SPEECH_EMOTIONS: [&str; 8] = [
    "Admiration",
    "Adoration",
    "Amusement",
    "Anger",
    "Anxiety",
    "Awe",
    "Awkwardness",
    "Boredom",
];

/// Upper-body pose landmarks (MediaPipe numbering) drawn on the video.
pub const BODY_LANDMARKS: [(u16, &str); 14] = [
    (11, "LEFT_SHOULDER"),
    (12, "RIGHT_SHOULDER"),
    (13, "LEFT_ELBOW"),
    (14, "RIGHT_ELBOW"),
    (15, "LEFT_WRIST"),
    (16, "RIGHT_WRIST"),
    (17, "LEFT_PINKY"),
    (18, "RIGHT_PINKY"),
    (19, "LEFT_INDEX"),
    (20, "RIGHT_INDEX"),
    (21, "LEFT_THUMB"),
    (22, "RIGHT_THUMB"),
    (23, "LEFT_HIP"),
    (24, "RIGHT_HIP"),
];

/// Full MediaPipe pose skeleton.
pub const POSE_CONNECTIONS: [(u16, u16); 35] = [
    (0, 1), (1, 2), (2, 3), (3, 7), (0, 4), (4, 5),
    (5, 6), (6, 8), (9, 10), (11, 12), (11, 13),
    (13, 15), (15, 17), (15, 19), (15, 21), (17, 19),
    (12, 14), (14, 16), (16, 18), (16, 20), (16, 22),
    (18, 20), (11, 23), (12, 24), (23, 24), (23, 25),
    (24, 26), (25, 27), (26, 28), (27, 29), (28, 30),
    (29, 31), (30, 32), (27, 31), (28, 32),
];

/// Class id carried by body keypoints so the viewer can draw the skeleton.
pub const BODY_CLASS_ID: u16 = 1;

/// Skeleton edges whose endpoints are both drawn body landmarks.
pub fn body_connections() -> Vec<(u16, u16)> {
    let drawn = |id: u16| BODY_LANDMARKS.iter().any(|&(landmark, _)| landmark == id);
    POSE_CONNECTIONS
        .iter()
        .copied()
        .filter(|&(a, b)| drawn(a) && drawn(b))
        .collect()
}

/// Entity name for an action unit (`AU1 Inner Brow Raise` -> `AU1InnerBrowRaise`).
pub fn au_entity_name(au: &str) -> String {
    au.replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_connections_stay_within_upper_body() {
        let connections = body_connections();
        assert!(!connections.is_empty());
        assert!(connections.iter().all(|&(a, b)| (11..=24).contains(&a) && (11..=24).contains(&b)));
        assert!(connections.contains(&(11, 12)));
        assert!(!connections.contains(&(23, 25)));
    }

    #[test]
    fn test_au_entity_name() {
        assert_eq!(au_entity_name("AU12 Lip Corner Puller"), "AU12LipCornerPuller");
    }
}
