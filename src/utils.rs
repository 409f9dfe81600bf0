//! Scale and geometry helpers shared by the layout engine and timeline.
//!
//! Conventions:
//! - World space: simulation coordinates, +Y down.
//! - Viewport space: pixels inside the margins, +Y down.
//!
//! Scales map world to viewport; `LinearScale::zoom` nudges the mapping for
//! the layout engine's auto-fit without touching node positions.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Linear mapping between a domain and a range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Identity mapping over [0, extent].
    pub fn identity(extent: f64) -> Self {
        Self::new((0.0, extent), (0.0, extent))
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (v - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Contract (`amount` > 0) or expand (`amount` < 0) the output range
    /// about its center. `amount` is a fraction, e.g. 0.05 for 5%.
    pub fn zoom(&mut self, amount: f64) {
        let (r0, r1) = self.range;
        let center = (r0 + r1) / 2.0;
        let factor = 1.0 - amount;
        self.range = (
            center + (r0 - center) * factor,
            center + (r1 - center) * factor,
        );
    }
}

/// Log-domain linear-range mapping. Domain values must be positive.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LogScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let l0 = d0.max(f64::MIN_POSITIVE).ln();
        let l1 = d1.max(f64::MIN_POSITIVE).ln();
        if l1 == l0 {
            return (r0 + r1) / 2.0;
        }
        let t = (v.max(f64::MIN_POSITIVE).ln() - l0) / (l1 - l0);
        r0 + t * (r1 - r0)
    }

    /// Position of `v` in [0, 1] along the log domain, clamped.
    pub fn normalized(&self, v: f64) -> f64 {
        LogScale {
            domain: self.domain,
            range: (0.0, 1.0),
        }
        .apply(v)
        .clamp(0.0, 1.0)
    }
}

/// Axis-aligned bounding box of a point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// None for an empty point set.
    pub fn of(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Bounds { min: first, max: first };
        for p in iter {
            b.min = b.min.min(p);
            b.max = b.max.max(p);
        }
        Some(b)
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }
}

/// Map a pointer x-position to the nearest step index, clamped to the valid
/// step range. Ordinary nearest-integer rounding.
pub fn nearest_step(scale: &LinearScale, x: f64, step_count: usize) -> usize {
    if step_count == 0 {
        return 0;
    }
    let raw = scale.invert(x).round();
    (raw.max(0.0) as usize).min(step_count - 1)
}
