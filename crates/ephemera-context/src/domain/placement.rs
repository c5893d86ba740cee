//! Where fragments land on the context layer.
//!
//! Fragments keep out of the central area where moment text is shown. A
//! random position is drawn from one of four peripheral zones.

use ephemera_core::presentation::FragmentPosition;
use ephemera_core::rng::RandomSource;

/// A rectangular region of the context layer, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementZone {
    /// Left edge.
    pub x_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Top edge.
    pub y_min: f64,
    /// Bottom edge.
    pub y_max: f64,
}

impl PlacementZone {
    /// Whether `position` lies inside this zone (edges included).
    #[must_use]
    pub fn contains(&self, position: FragmentPosition) -> bool {
        (self.x_min..=self.x_max).contains(&position.x)
            && (self.y_min..=self.y_max).contains(&position.y)
    }
}

/// Left, right, top and bottom bands around the central content.
pub const PERIPHERAL_ZONES: [PlacementZone; 4] = [
    PlacementZone {
        x_min: 5.0,
        x_max: 25.0,
        y_min: 10.0,
        y_max: 90.0,
    },
    PlacementZone {
        x_min: 75.0,
        x_max: 95.0,
        y_min: 10.0,
        y_max: 90.0,
    },
    PlacementZone {
        x_min: 25.0,
        x_max: 75.0,
        y_min: 5.0,
        y_max: 20.0,
    },
    PlacementZone {
        x_min: 25.0,
        x_max: 75.0,
        y_min: 80.0,
        y_max: 95.0,
    },
];

/// Spread, in percentage points, of the jitter applied around a cluster's
/// base position.
pub const CLUSTER_SPREAD: f64 = 10.0;

/// Draws a random position in one of the peripheral zones.
pub fn random_position(rng: &mut dyn RandomSource) -> FragmentPosition {
    let zone = PERIPHERAL_ZONES[rng.next_index(PERIPHERAL_ZONES.len())];
    FragmentPosition {
        x: rng.next_between(zone.x_min, zone.x_max),
        y: rng.next_between(zone.y_min, zone.y_max),
    }
}

/// Offsets `base` by up to half of `spread` in each direction on both axes.
pub fn jitter(base: FragmentPosition, spread: f64, rng: &mut dyn RandomSource) -> FragmentPosition {
    FragmentPosition {
        x: base.x + (rng.next_f64() - 0.5) * spread,
        y: base.y + (rng.next_f64() - 0.5) * spread,
    }
}
