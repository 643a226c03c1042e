use super::Point2D;

/// An axis-aligned bounding box in map units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> BoundingBox {
        BoundingBox {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        BoundingBox { min_x, max_x, min_y, max_y }
    }

    pub fn from_points(points: &[Point2D]) -> BoundingBox {
        let mut bb = BoundingBox::default();
        for p in points {
            if p.x < bb.min_x { bb.min_x = p.x; }
            if p.x > bb.max_x { bb.max_x = p.x; }
            if p.y < bb.min_y { bb.min_y = p.y; }
            if p.y > bb.max_y { bb.max_y = p.y; }
        }
        bb
    }

    pub fn expand_to(&mut self, other: BoundingBox) {
        if other.min_x < self.min_x { self.min_x = other.min_x; }
        if other.max_x > self.max_x { self.max_x = other.max_x; }
        if other.min_y < self.min_y { self.min_y = other.min_y; }
        if other.max_y > self.max_y { self.max_y = other.max_y; }
    }

    pub fn overlaps(&self, other: BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}
