use serde::{Deserialize, Serialize};

/// Pair of field-space floats, used for positions and per-frame displacements
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from(v: (f64, f64)) -> Self {
        Vec2 { x: v.0, y: v.1 }
    }
}

impl From<Vec2> for (f64, f64) {
    fn from(p: Vec2) -> Self {
        (p.x, p.y)
    }
}

/// Axis-aligned rectangle in field pixels, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x_start <= x && x <= self.x_end && self.y_start <= y && y <= self.y_end
    }
}

/// Dimensions of the camera field the obstacles travel across
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f64,
    pub height: f64,
}

impl Field {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    /// Whether a square of `size` at top-left `pos` lies entirely outside the field.
    pub fn is_off_field(&self, pos: Vec2, size: f64) -> bool {
        pos.x + size < 0.0 || pos.y + size < 0.0 || pos.x > self.width || pos.y > self.height
    }

    /// Off the player side: obstacles travel up-left, so that is the left or top edge.
    pub fn is_past_leading_edge(&self, pos: Vec2, size: f64) -> bool {
        pos.x + size < 0.0 || pos.y + size < 0.0
    }

    pub fn is_past_trailing_edge(&self, pos: Vec2) -> bool {
        pos.x > self.width || pos.y > self.height
    }
}

/// The fixed rectangle in which gestures are evaluated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionZone {
    pub rect: Rect,
}

impl DetectionZone {
    pub fn from_ratios(field: Field, x_start: f64, x_end: f64, y_start: f64, y_end: f64) -> Self {
        Self {
            rect: Rect {
                x_start: field.width * x_start,
                x_end: field.width * x_end,
                y_start: field.height * y_start,
                y_end: field.height * y_end,
            },
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.rect.contains(point.x, point.y)
    }

    pub fn contains_hand(&self, hand_x: i32, hand_y: i32) -> bool {
        self.rect.contains(hand_x as f64, hand_y as f64)
    }

    /// Centre of the zone, handy for placing obstacles in tests and demos.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.rect.x_start + self.rect.x_end) / 2.0,
            (self.rect.y_start + self.rect.y_end) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Field {
        Field::new(1280, 720)
    }

    #[test]
    fn zone_from_ratios_scales_to_field() {
        let zone = DetectionZone::from_ratios(field(), 0.3, 0.7, 0.2, 0.8);
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(zone.rect.x_start, 384.0));
        assert!(close(zone.rect.x_end, 896.0));
        assert!(close(zone.rect.y_start, 144.0));
        assert!(close(zone.rect.y_end, 576.0));
        assert!(close(zone.center().x, 640.0));
        assert!(close(zone.center().y, 360.0));
    }

    #[test]
    fn zone_edges_are_inclusive() {
        let zone = DetectionZone::from_ratios(field(), 0.3, 0.7, 0.2, 0.8);
        assert!(zone.contains(Vec2::new(384.5, 144.5)));
        assert!(zone.contains(Vec2::new(895.5, 575.5)));
        let rect = Rect {
            x_start: 0.0,
            x_end: 10.0,
            y_start: 0.0,
            y_end: 10.0,
        };
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(10.0, 10.0));
        assert!(!zone.contains(Vec2::new(383.9, 300.0)));
        assert!(zone.contains_hand(640, 360));
        assert!(!zone.contains_hand(100, 360));
    }

    #[test]
    fn off_field_needs_whole_square_outside() {
        let f = field();
        assert!(!f.is_off_field(Vec2::new(-99.0, 10.0), 100.0));
        assert!(f.is_off_field(Vec2::new(-101.0, 10.0), 100.0));
        assert!(f.is_off_field(Vec2::new(10.0, -100.5), 100.0));
        assert!(f.is_off_field(Vec2::new(1281.0, 10.0), 100.0));
        assert!(f.is_past_leading_edge(Vec2::new(-101.0, 10.0), 100.0));
        assert!(!f.is_past_leading_edge(Vec2::new(1281.0, 10.0), 100.0));
        assert!(f.is_past_trailing_edge(Vec2::new(1281.0, 10.0)));
    }

    #[test]
    fn vec2_tuple_conversions() {
        let v: Vec2 = (1.5, -2.0).into();
        assert_eq!(v, Vec2::new(1.5, -2.0));
        let t: (f64, f64) = v.into();
        assert_eq!(t, (1.5, -2.0));
    }
}
