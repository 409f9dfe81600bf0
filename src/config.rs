//! Recognized configuration options.
//!
//! Everything has a sensible default; hosts typically override the
//! viewport size and occasionally pin a node of interest.

use serde::{Deserialize, Serialize};

/// Per-side viewport padding in pixels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 15.0,
            right: 35.0,
            top: 20.0,
            bottom: 10.0,
        }
    }
}

/// Options for one explorer instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerOptions {
    /// Initial pinned step; when absent the timeline picks the most
    /// fragmented step.
    pub default_step: Option<usize>,
    /// Node id to visually emphasize regardless of interaction state
    /// (double radius, full opacity).
    pub pinned_node: Option<String>,
    /// Total viewport size in pixels.
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            default_step: None,
            pinned_node: None,
            width: 800.0,
            height: 600.0,
            margins: Margins::default(),
        }
    }
}

impl ExplorerOptions {
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margins.left - self.margins.right).max(1.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margins.top - self.margins.bottom).max(1.0)
    }

    /// Vertical split of the viewport into the three stacked sections
    /// (network : summary chart : timeline = 4 : 2 : 3), with a fixed
    /// padding strip between sections.
    pub fn section_heights(&self) -> (f64, f64, f64) {
        const UNITS: (f64, f64, f64) = (4.0, 2.0, 3.0);
        const PAD: f64 = 10.0;
        let usable = (self.inner_height() - 2.0 * PAD).max(3.0);
        let unit = usable / (UNITS.0 + UNITS.1 + UNITS.2);
        (UNITS.0 * unit, UNITS.1 * unit, UNITS.2 * unit)
    }
}
