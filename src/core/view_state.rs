//! Interaction state machine shared by the network and summary views.
//!
//! States: `Overview`, `Highlighted(subgraph)`, `Focused(subgraph)` with an
//! orthogonal node-highlight substate valid only while focused. The old
//! implementation this replaces tracked "is focused" / "is zooming" through
//! loose booleans; here every transition goes through a guarded method that
//! either applies or drops the request, so invalid flag combinations cannot
//! exist.
//!
//! Guarantees:
//! - at most one focus at any time
//! - starting a focus clears any prior node highlight
//! - focus/reset/pin requests during an in-flight zoom animation are
//!   dropped, never queued (the animation always runs to completion)
//!
//! The machine holds no rendering logic. It answers queries (phase,
//! interpolated transform, node magnification) that the render pass turns
//! into primitive requests.

use glam::DVec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::entities::SubgraphId;
use crate::utils::Bounds;

/// Instruction line shown in overview.
pub const OVERVIEW_INSTRUCTIONS: &str = "Click a subgraph in network chart to see details";
/// Instruction line shown while focused.
pub const FOCUS_INSTRUCTIONS: &str = "Click anywhere outside of subgraph to reset zoom";

/// Affine viewport transform: screen = point * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, k: 1.0 };

    pub fn apply(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    fn lerp(a: Self, b: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            k: a.k + (b.k - a.k) * t,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Interaction phase. `node` is the orthogonal highlight substate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Overview,
    Highlighted(SubgraphId),
    Focused {
        subgraph: SubgraphId,
        node: Option<usize>,
    },
}

/// Exclusive, time-bounded zoom between two transforms.
#[derive(Clone, Copy, Debug)]
struct ZoomAnimation {
    from: ViewTransform,
    to: ViewTransform,
    started: f64,
    duration: f64,
}

/// Tuning for focus zooming.
#[derive(Clone, Copy, Debug)]
pub struct ViewConfig {
    /// Zoom animation length in caller time units.
    pub zoom_duration: f64,
    /// Upper bound on the focus zoom factor.
    pub max_zoom: f64,
    /// Fraction of the viewport the focused subgraph should fill.
    pub fill_fraction: f64,
    /// Cap on node radius magnification under focus.
    pub max_node_magnification: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom_duration: 750.0,
            max_zoom: 8.0,
            fill_fraction: 0.7,
            max_node_magnification: 3.0,
        }
    }
}

/// The shared interaction state machine.
pub struct ViewState {
    cfg: ViewConfig,
    view: DVec2,
    phase: Phase,
    zoom: Option<ZoomAnimation>,
    /// Transform in effect outside of animation.
    transform: ViewTransform,
}

impl ViewState {
    pub fn new(cfg: ViewConfig, view_width: f64, view_height: f64) -> Self {
        Self {
            cfg,
            view: DVec2::new(view_width, view_height),
            phase: Phase::Overview,
            zoom: None,
            transform: ViewTransform::IDENTITY,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The focused subgraph, animation in flight or not.
    pub fn focused(&self) -> Option<SubgraphId> {
        match self.phase {
            Phase::Focused { subgraph, .. } => Some(subgraph),
            _ => None,
        }
    }

    pub fn highlighted_node(&self) -> Option<usize> {
        match self.phase {
            Phase::Focused { node, .. } => node,
            _ => None,
        }
    }

    pub fn zoom_in_flight(&self) -> bool {
        self.zoom.is_some()
    }

    /// True while auto-fit may run: no focus and no animation.
    pub fn fit_allowed(&self) -> bool {
        self.focused().is_none() && self.zoom.is_none()
    }

    pub fn instructions(&self) -> &'static str {
        if self.focused().is_some() {
            FOCUS_INSTRUCTIONS
        } else {
            OVERVIEW_INSTRUCTIONS
        }
    }

    /// Transform to draw with at `now`, interpolating any animation.
    pub fn transform_at(&self, now: f64) -> ViewTransform {
        match self.zoom {
            Some(z) => ViewTransform::lerp(z.from, z.to, (now - z.started) / z.duration),
            None => self.transform,
        }
    }

    /// Node radius factor under the current phase, capped so tiny
    /// subgraphs don't render comically large marks.
    pub fn node_magnification(&self) -> f64 {
        match self.phase {
            Phase::Focused { .. } => {
                let target = self.zoom.map(|z| z.to.k).unwrap_or(self.transform.k);
                target.min(self.cfg.max_node_magnification).max(1.0)
            }
            _ => 1.0,
        }
    }

    /// Settle a finished animation. Returns true on the completing call.
    pub fn tick(&mut self, now: f64) -> bool {
        if let Some(z) = self.zoom {
            if now - z.started >= z.duration {
                self.transform = z.to;
                self.zoom = None;
                return true;
            }
        }
        false
    }

    // ========== Guarded transitions ==========

    /// Unconditional return to overview, used by the step-commit protocol.
    /// A committed step invalidates whatever focus/highlight the previous
    /// step's snapshot was about, so this bypasses the animation guard and
    /// drops any in-flight zoom.
    pub fn reset_to_overview(&mut self) {
        self.phase = Phase::Overview;
        self.zoom = None;
        self.transform = ViewTransform::IDENTITY;
    }

    /// Pointer entered a subgraph region (network or summary view).
    pub fn hover_subgraph(&mut self, id: SubgraphId) -> bool {
        if self.focused().is_some() || self.zoom.is_some() {
            return false;
        }
        self.phase = Phase::Highlighted(id);
        true
    }

    /// Pointer left the hovered subgraph region.
    pub fn unhover_subgraph(&mut self) -> bool {
        match self.phase {
            Phase::Highlighted(_) => {
                self.phase = Phase::Overview;
                true
            }
            _ => false,
        }
    }

    /// Click on a subgraph: start the exclusive zoom-in and open the detail
    /// panel. Dropped if an animation is in flight or a focus already
    /// exists (for any id), per the no-queueing policy.
    pub fn focus(&mut self, id: SubgraphId, bounds: Bounds, now: f64) -> bool {
        if self.zoom.is_some() {
            debug!("focus on {id} ignored: zoom animation in flight");
            return false;
        }
        if let Some(current) = self.focused() {
            debug!("focus on {id} ignored: already focused on {current}");
            return false;
        }
        let to = self.focus_transform(bounds);
        self.zoom = Some(ZoomAnimation {
            from: self.transform,
            to,
            started: now,
            duration: self.cfg.zoom_duration,
        });
        // Entering focus implicitly clears any node highlight.
        self.phase = Phase::Focused {
            subgraph: id,
            node: None,
        };
        true
    }

    /// Background click or explicit reset: reverse zoom back to overview.
    /// Dropped outside focus or while an animation is in flight.
    pub fn reset(&mut self, now: f64) -> bool {
        if self.zoom.is_some() {
            debug!("reset ignored: zoom animation in flight");
            return false;
        }
        if self.focused().is_none() {
            return false;
        }
        self.zoom = Some(ZoomAnimation {
            from: self.transform,
            to: ViewTransform::IDENTITY,
            started: now,
            duration: self.cfg.zoom_duration,
        });
        self.phase = Phase::Overview;
        true
    }

    /// Pointer entered a node (network mark or detail-table row). Valid
    /// only while focused with the zoom settled.
    pub fn hover_node(&mut self, node: usize) -> bool {
        if self.zoom.is_some() {
            return false;
        }
        match &mut self.phase {
            Phase::Focused { node: slot, .. } => {
                *slot = Some(node);
                true
            }
            _ => false,
        }
    }

    pub fn unhover_node(&mut self) -> bool {
        match &mut self.phase {
            Phase::Focused { node: slot, .. } if slot.is_some() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Transform that centers `bounds` and scales it to the fill fraction,
    /// capped at the max zoom (a singleton's zero-size box would otherwise
    /// zoom without bound).
    fn focus_transform(&self, bounds: Bounds) -> ViewTransform {
        let size = bounds.size();
        let frac = (size.x / self.view.x).max(size.y / self.view.y);
        let k = if frac > 0.0 {
            (self.cfg.fill_fraction / frac).min(self.cfg.max_zoom)
        } else {
            self.cfg.max_zoom
        };
        let center = bounds.center();
        ViewTransform {
            x: self.view.x / 2.0 - k * center.x,
            y: self.view.y / 2.0 - k * center.y,
            k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: (f64, f64), max: (f64, f64)) -> Bounds {
        Bounds {
            min: DVec2::new(min.0, min.1),
            max: DVec2::new(max.0, max.1),
        }
    }

    fn view() -> ViewState {
        ViewState::new(ViewConfig::default(), 400.0, 300.0)
    }

    const A: SubgraphId = SubgraphId(0);
    const B: SubgraphId = SubgraphId(7);

    #[test]
    fn hover_toggles_between_overview_and_highlight() {
        let mut v = view();
        assert!(v.hover_subgraph(A));
        assert_eq!(v.phase(), Phase::Highlighted(A));
        assert!(v.unhover_subgraph());
        assert_eq!(v.phase(), Phase::Overview);
    }

    #[test]
    fn focus_from_highlight_starts_exclusive_zoom() {
        let mut v = view();
        v.hover_subgraph(A);
        assert!(v.focus(A, bounds((100.0, 100.0), (200.0, 150.0)), 0.0));
        assert_eq!(v.focused(), Some(A));
        assert!(v.zoom_in_flight());
        assert!(!v.fit_allowed());
        assert_eq!(v.instructions(), FOCUS_INSTRUCTIONS);
    }

    #[test]
    fn competing_focus_during_animation_is_dropped() {
        let mut v = view();
        v.focus(A, bounds((0.0, 0.0), (100.0, 100.0)), 0.0);
        // Mid-animation request for a different subgraph: no-op.
        assert!(!v.focus(B, bounds((0.0, 0.0), (10.0, 10.0)), 100.0));
        assert_eq!(v.focused(), Some(A));
        // Still dropped after the animation settles - focus already exists.
        assert!(v.tick(750.0));
        assert!(!v.focus(B, bounds((0.0, 0.0), (10.0, 10.0)), 800.0));
        assert_eq!(v.focused(), Some(A));
    }

    #[test]
    fn background_click_returns_to_overview() {
        let mut v = view();
        v.focus(A, bounds((0.0, 0.0), (100.0, 100.0)), 0.0);
        v.tick(750.0);
        assert!(v.reset(800.0));
        assert_eq!(v.phase(), Phase::Overview);
        assert!(v.zoom_in_flight(), "reverse animation runs");
        v.tick(1550.0);
        assert_eq!(v.transform_at(1550.0), ViewTransform::IDENTITY);
    }

    #[test]
    fn reset_during_animation_is_dropped() {
        let mut v = view();
        v.focus(A, bounds((0.0, 0.0), (100.0, 100.0)), 0.0);
        assert!(!v.reset(100.0));
        assert_eq!(v.focused(), Some(A));
    }

    #[test]
    fn node_highlight_only_under_settled_focus() {
        let mut v = view();
        assert!(!v.hover_node(3), "no highlight in overview");
        v.focus(A, bounds((0.0, 0.0), (100.0, 100.0)), 0.0);
        assert!(!v.hover_node(3), "no highlight mid-zoom");
        v.tick(750.0);
        assert!(v.hover_node(3));
        assert_eq!(v.highlighted_node(), Some(3));
        assert!(v.unhover_node());
        assert_eq!(v.highlighted_node(), None);
    }

    #[test]
    fn reset_clears_node_highlight() {
        let mut v = view();
        v.focus(A, bounds((0.0, 0.0), (100.0, 100.0)), 0.0);
        v.tick(750.0);
        v.hover_node(2);
        v.reset(800.0);
        assert_eq!(v.highlighted_node(), None);
    }

    #[test]
    fn transform_interpolates_over_duration() {
        let mut v = view();
        v.focus(A, bounds((100.0, 50.0), (300.0, 250.0)), 0.0);
        let start = v.transform_at(0.0);
        let mid = v.transform_at(375.0);
        let end = v.transform_at(750.0);
        assert_eq!(start, ViewTransform::IDENTITY);
        assert!(mid.k > start.k && mid.k < end.k);
        // Target: 200x200 box in a 400x300 view -> frac 2/3, k = 0.7/(2/3).
        assert!((end.k - 1.05).abs() < 1e-9);
    }

    #[test]
    fn singleton_bounds_zoom_caps_at_max() {
        let mut v = view();
        v.focus(A, bounds((50.0, 50.0), (50.0, 50.0)), 0.0);
        v.tick(750.0);
        assert!((v.transform_at(800.0).k - 8.0).abs() < 1e-9);
        assert!((v.node_magnification() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn hover_ignored_while_focused_or_zooming() {
        let mut v = view();
        v.focus(A, bounds((0.0, 0.0), (100.0, 100.0)), 0.0);
        assert!(!v.hover_subgraph(B));
        v.tick(750.0);
        assert!(!v.hover_subgraph(B));
        assert_eq!(v.focused(), Some(A));
    }
}
