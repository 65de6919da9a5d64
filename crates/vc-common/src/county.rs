//! County reference table.
//!
//! Maps each Utah county name to the numeric `COUNTY_ID` used by the voter
//! point source. The ids must match the remote schema exactly.

use serde::Serialize;
use std::fmt;

/// Name and id of every county, ordered by id.
const COUNTIES: [(&str, u8); 29] = [
    ("Beaver", 1),
    ("Box Elder", 2),
    ("Cache", 3),
    ("Carbon", 4),
    ("Daggett", 5),
    ("Davis", 6),
    ("Duchesne", 7),
    ("Emery", 8),
    ("Garfield", 9),
    ("Grand", 10),
    ("Iron", 11),
    ("Juab", 12),
    ("Kane", 13),
    ("Millard", 14),
    ("Morgan", 15),
    ("Piute", 16),
    ("Rich", 17),
    ("Salt Lake", 18),
    ("San Juan", 19),
    ("Sanpete", 20),
    ("Sevier", 21),
    ("Summit", 22),
    ("Tooele", 23),
    ("Uintah", 24),
    ("Utah", 25),
    ("Wasatch", 26),
    ("Washington", 27),
    ("Wayne", 28),
    ("Weber", 29),
];

/// A county from the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct County {
    pub name: &'static str,
    pub id: u8,
}

impl County {
    /// Look up a county by its exact name.
    ///
    /// Matching is case-sensitive and does not trim; callers normalize first.
    pub fn lookup(name: &str) -> Option<County> {
        COUNTIES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(name, id)| County { name, id })
    }

    /// Look up a county by its numeric id.
    pub fn from_id(id: u8) -> Option<County> {
        COUNTIES
            .iter()
            .find(|(_, i)| *i == id)
            .map(|&(name, id)| County { name, id })
    }

    /// All counties, ordered by id.
    pub fn all() -> impl Iterator<Item = County> {
        COUNTIES.iter().map(|&(name, id)| County { name, id })
    }
}

impl fmt::Display for County {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
