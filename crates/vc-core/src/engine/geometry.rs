//! Point-in-polygon containment for the local engine.
//!
//! Even-odd rule over every ring of a polygon, so holes fall out naturally.
//! Points exactly on an edge are unspecified.

use super::feature::{Geometry, Position, Ring};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bbox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bbox {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn extend(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// A polygon or multipolygon prepared for repeated containment tests.
#[derive(Debug, Clone)]
pub struct Area {
    parts: Vec<Vec<Ring>>,
    bbox: Bbox,
}

impl Area {
    /// Prepare an area geometry. Points and empty geometries yield `None`.
    pub fn from_geometry(geometry: &Geometry) -> Option<Self> {
        let parts = match geometry {
            Geometry::Polygon(rings) => vec![rings.clone()],
            Geometry::MultiPolygon(polys) => polys.clone(),
            Geometry::Point(_) | Geometry::MultiPoint(_) => return None,
        };
        let mut bbox = Bbox::empty();
        for (x, y) in parts.iter().flatten().flatten().filter_map(xy) {
            bbox.extend(x, y);
        }
        if bbox.min_x > bbox.max_x {
            return None;
        }
        Some(Self { parts, bbox })
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.bbox.contains(x, y)
            && self
                .parts
                .iter()
                .any(|rings| rings.iter().filter(|r| crosses_odd(r, x, y)).count() % 2 == 1)
    }

    /// True when any position of a point geometry lies inside the area.
    pub fn contains_geometry(&self, geometry: &Geometry) -> bool {
        match geometry {
            Geometry::Point(p) => xy(p).is_some_and(|(x, y)| self.contains(x, y)),
            Geometry::MultiPoint(ps) => ps
                .iter()
                .filter_map(xy)
                .any(|(x, y)| self.contains(x, y)),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => false,
        }
    }
}

fn xy(p: &Position) -> Option<(f64, f64)> {
    match p.as_slice() {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    }
}

/// Ray cast to +x: does the ray cross this ring an odd number of times?
fn crosses_odd(ring: &Ring, x: f64, y: f64) -> bool {
    let pts: Vec<(f64, f64)> = ring.iter().filter_map(xy).collect();
    if pts.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = pts.len() - 1;
    for i in 0..pts.len() {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
