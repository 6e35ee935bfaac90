use serde::{Deserialize, Serialize};

/// Hand signs an obstacle can demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Gesture {
    #[strum(to_string = "Open Hand")]
    OpenHand,
    Peace,
    Metal,
    Fist,
    Pointing,
}

impl Gesture {
    pub const ALL: [Gesture; 5] = [
        Gesture::OpenHand,
        Gesture::Peace,
        Gesture::Metal,
        Gesture::Fist,
        Gesture::Pointing,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            Gesture::OpenHand => "🖐",
            Gesture::Peace => "✌",
            Gesture::Metal => "🤘",
            Gesture::Fist => "✊",
            Gesture::Pointing => "👆",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized gesture name: {0}")]
pub struct ParseGestureError(pub String);

impl std::str::FromStr for Gesture {
    type Err = ParseGestureError;

    /// Accepts the display names and the usual spelling variants ("open_hand", "OPEN-HAND").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "openhand" | "open" => Ok(Gesture::OpenHand),
            "peace" => Ok(Gesture::Peace),
            "metal" => Ok(Gesture::Metal),
            "fist" => Ok(Gesture::Fist),
            "pointing" | "point" => Ok(Gesture::Pointing),
            _ => Err(ParseGestureError(s.to_string())),
        }
    }
}

/// Display label for a classifier result, `None` being the unknown pose.
pub fn label(gesture: Option<Gesture>) -> String {
    gesture.map_or_else(|| "Unknown".to_string(), |g| g.to_string())
}

/// Indices into the 21-point hand skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

pub const LANDMARK_COUNT: usize = 21;

/// One landmark in normalized image coordinates (0..1, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Snapshot of a fully visible hand as delivered by the tracker
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Point; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Builds from a tracker slice; a partially visible hand yields `None`.
    pub fn from_slice(points: &[Point]) -> Option<Self> {
        let points: [Point; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    pub fn get(&self, lm: Landmark) -> Point {
        self.points[lm as usize]
    }

    pub fn set(&mut self, lm: Landmark, p: Point) {
        self.points[lm as usize] = p;
    }
}

#[derive(Debug, Clone, Copy)]
enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    fn tip_pip(self) -> (Landmark, Landmark) {
        match self {
            Finger::Index => (Landmark::IndexTip, Landmark::IndexPip),
            Finger::Middle => (Landmark::MiddleTip, Landmark::MiddlePip),
            Finger::Ring => (Landmark::RingTip, Landmark::RingPip),
            Finger::Pinky => (Landmark::PinkyTip, Landmark::PinkyPip),
        }
    }
}

const EXTEND_SLACK: f64 = 0.02;
const THUMB_SPREAD: f64 = 0.005;
const THUMB_RAISE_SLACK: f64 = 0.03;
const POINTING_THUMB_REACH: f64 = 0.2;

fn extended(h: &HandLandmarks, f: Finger) -> bool {
    let (tip, pip) = f.tip_pip();
    h.get(tip).y < h.get(pip).y + EXTEND_SLACK
}

fn bent(h: &HandLandmarks, f: Finger) -> bool {
    let (tip, pip) = f.tip_pip();
    h.get(tip).y > h.get(pip).y - EXTEND_SLACK
}

fn thumb_open(h: &HandLandmarks) -> bool {
    let tip = h.get(Landmark::ThumbTip);
    (tip.x - h.get(Landmark::ThumbMcp).x).abs() > THUMB_SPREAD
        && tip.y < h.get(Landmark::ThumbIp).y + THUMB_RAISE_SLACK
}

fn is_pointing(h: &HandLandmarks) -> bool {
    let index_up = h.get(Landmark::IndexTip).y < h.get(Landmark::IndexPip).y
        && h.get(Landmark::IndexPip).y < h.get(Landmark::IndexMcp).y;
    let thumb_tucked = (h.get(Landmark::ThumbTip).x - h.get(Landmark::IndexMcp).x).abs()
        < POINTING_THUMB_REACH;
    index_up
        && bent(h, Finger::Middle)
        && bent(h, Finger::Ring)
        && bent(h, Finger::Pinky)
        && thumb_tucked
}

fn is_peace(h: &HandLandmarks) -> bool {
    let thumb_apart =
        (h.get(Landmark::ThumbTip).x - h.get(Landmark::ThumbIp).x).abs() > THUMB_SPREAD;
    extended(h, Finger::Index)
        && extended(h, Finger::Middle)
        && bent(h, Finger::Ring)
        && bent(h, Finger::Pinky)
        && thumb_apart
}

fn is_metal(h: &HandLandmarks) -> bool {
    extended(h, Finger::Index)
        && bent(h, Finger::Middle)
        && bent(h, Finger::Ring)
        && extended(h, Finger::Pinky)
        && thumb_open(h)
}

fn is_open_hand(h: &HandLandmarks) -> bool {
    extended(h, Finger::Index)
        && extended(h, Finger::Middle)
        && extended(h, Finger::Ring)
        && extended(h, Finger::Pinky)
        && thumb_open(h)
}

fn is_fist(h: &HandLandmarks) -> bool {
    bent(h, Finger::Index)
        && bent(h, Finger::Middle)
        && bent(h, Finger::Ring)
        && bent(h, Finger::Pinky)
        && !thumb_open(h)
}

type Rule = (Gesture, fn(&HandLandmarks) -> bool);

/// Evaluation order. A pose satisfying several rules resolves to the earliest.
pub const RULES: [Rule; 5] = [
    (Gesture::Pointing, is_pointing),
    (Gesture::Peace, is_peace),
    (Gesture::Metal, is_metal),
    (Gesture::OpenHand, is_open_hand),
    (Gesture::Fist, is_fist),
];

/// Classifies a hand pose; `None` is the unknown pose.
pub fn classify(hand: &HandLandmarks) -> Option<Gesture> {
    RULES
        .iter()
        .find(|(_, matches)| matches(hand))
        .map(|(gesture, _)| *gesture)
}


#[cfg(test)]
mod tests {
    use super::fixtures::hand;
    use super::*;

    #[test]
    fn classifies_each_sign() {
        assert_eq!(classify(&hand([true, true, true, true], true)), Some(Gesture::OpenHand));
        assert_eq!(classify(&hand([true, true, false, false], true)), Some(Gesture::Peace));
        assert_eq!(classify(&hand([true, false, false, true], true)), Some(Gesture::Metal));
        assert_eq!(classify(&hand([false, false, false, false], false)), Some(Gesture::Fist));
        assert_eq!(classify(&hand([true, false, false, false], false)), Some(Gesture::Pointing));
    }

    #[test]
    fn unmatched_pose_is_unknown() {
        // ring finger alone is not a sign
        assert_eq!(classify(&hand([false, false, true, false], true)), None);
    }

    #[test]
    fn pointing_wins_over_later_rules() {
        let h = hand([true, false, false, false], false);
        assert!(is_pointing(&h));
        // the same pose must never fall through to Fist
        assert_eq!(classify(&h), Some(Gesture::Pointing));
        assert_eq!(RULES[0].0, Gesture::Pointing);
        assert_eq!(RULES[4].0, Gesture::Fist);
    }

    #[test]
    fn partial_hand_is_rejected() {
        let points = vec![Point::default(); 12];
        assert!(HandLandmarks::from_slice(&points).is_none());
        let points = vec![Point::default(); LANDMARK_COUNT];
        assert!(HandLandmarks::from_slice(&points).is_some());
    }

    #[test]
    fn labels_and_emoji() {
        assert_eq!(label(Some(Gesture::OpenHand)), "Open Hand");
        assert_eq!(label(Some(Gesture::Fist)), "Fist");
        assert_eq!(label(None), "Unknown");
        assert_eq!(Gesture::Peace.emoji(), "✌");
        assert_eq!(Gesture::ALL.len(), 5);
    }

    #[test]
    fn parses_names_loosely() {
        assert_eq!("Open Hand".parse::<Gesture>(), Ok(Gesture::OpenHand));
        assert_eq!("open_hand".parse::<Gesture>(), Ok(Gesture::OpenHand));
        assert_eq!("FIST".parse::<Gesture>(), Ok(Gesture::Fist));
        assert_eq!("pointing".parse::<Gesture>(), Ok(Gesture::Pointing));
        assert!("thumbs up".parse::<Gesture>().is_err());
        for g in Gesture::ALL {
            assert_eq!(g.to_string().parse::<Gesture>(), Ok(g));
        }
    }
}
