//! Continuity-preserving force layout engine.
//!
//! **Architecture**: the engine does NOT own snapshots. `set_snapshot()`
//! replaces the simulation inputs wholesale (there is only ever one active
//! run); `advance()` is one bounded tick; `positions()` maps world
//! coordinates through the engine-owned viewport scales.
//!
//! # Physics
//!
//! Three forces per tick, scaled by a decaying alpha:
//! - pairwise many-body repulsion between all nodes
//! - spring attraction along active edges, rest length from a log scale of
//!   edge strength (strong edges pull tight)
//! - per-axis pull toward the node's subgraph anchor at fixed relative
//!   strength
//!
//! The run settles when alpha sinks below `alpha_min`; a snapshot swap
//! reheats it to 1.
//!
//! # Continuity
//!
//! On a swap, an id -> {position, velocity} map is built from the outgoing
//! state and applied to matching nodes of the incoming snapshot. Nodes not
//! in the map seed at their subgraph anchor (with a deterministic jitter to
//! break exact overlap), never at an arbitrary default, so nothing flies
//! across the screen on a step change.
//!
//! # Auto-fit
//!
//! After a warm-up tick count, while the caller reports no focus and no
//! zoom animation in flight, the mapped bounding box is checked against the
//! viewport each tick; spilling or under-filling past the tolerance band
//! nudges the coordinate scales by a fixed increment. The check is
//! per-tick, not one-shot - repeated violations keep nudging.

use std::collections::HashMap;

use glam::DVec2;
use log::{debug, trace};

use crate::entities::Snapshot;
use crate::utils::{Bounds, LinearScale, LogScale};

/// Golden angle, used for deterministic seed jitter.
const SEED_ANGLE: f64 = 2.399963229728653;

/// Tuning knobs for the simulation. Defaults mirror the behavior the
/// exploration views were designed around.
#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    /// Per-tick relaxation of alpha toward zero.
    pub alpha_decay: f64,
    /// Run is settled once alpha falls below this.
    pub alpha_min: f64,
    /// Fraction of velocity removed each tick.
    pub velocity_decay: f64,
    /// Many-body strength; negative repels.
    pub charge: f64,
    /// Spring constant along active edges.
    pub spring_stiffness: f64,
    /// Relative pull toward the subgraph anchor, per axis.
    pub anchor_strength: f64,
    /// Rest length range mapped over the strength extent (strongest edge
    /// gets the second value).
    pub rest_length: (f64, f64),
    /// Ticks before auto-fit may engage after a swap.
    pub warmup_ticks: u32,
    /// Margin tolerance band as a fraction of each viewport dimension.
    pub fit_tolerance: f64,
    /// Scale nudge per violating tick (fraction).
    pub fit_increment: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            alpha_decay: 0.01,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            charge: -30.0,
            spring_stiffness: 1.0,
            anchor_strength: 0.25,
            rest_length: (10.0, 1.0),
            warmup_ticks: 20,
            fit_tolerance: 0.10,
            fit_increment: 0.05,
        }
    }
}

#[derive(Clone, Debug)]
struct SimNode {
    pos: DVec2,
    vel: DVec2,
    anchor: DVec2,
    /// Pinned nodes hold this position; integration skips them.
    pinned: Option<DVec2>,
}

#[derive(Clone, Debug)]
struct Spring {
    a: usize,
    b: usize,
    rest: f64,
}

/// Iterative 2D force layout over one snapshot at a time.
pub struct LayoutEngine {
    cfg: LayoutConfig,
    /// Viewport interior extent; world coordinates start out congruent.
    view: DVec2,
    nodes: Vec<SimNode>,
    springs: Vec<Spring>,
    alpha: f64,
    ticks_since_swap: u32,
    x_scale: LinearScale,
    y_scale: LinearScale,
}

impl LayoutEngine {
    pub fn new(cfg: LayoutConfig, view_width: f64, view_height: f64) -> Self {
        Self {
            cfg,
            view: DVec2::new(view_width, view_height),
            nodes: Vec::new(),
            springs: Vec::new(),
            alpha: 0.0,
            ticks_since_swap: 0,
            x_scale: LinearScale::identity(view_width),
            y_scale: LinearScale::identity(view_height),
        }
    }

    /// Replace simulation inputs with a new snapshot, carrying position and
    /// velocity over for nodes present in the outgoing state. Reheats alpha
    /// and restarts the warm-up window; any in-flight run is replaced.
    pub fn set_snapshot(&mut self, snapshot: &Snapshot) {
        // Momentum carryover map, built BEFORE the node list is replaced.
        let carryover: HashMap<usize, (DVec2, DVec2)> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (i, (n.pos, n.vel)))
            .collect();

        self.nodes = snapshot
            .nodes
            .iter()
            .map(|member| match carryover.get(&member.index) {
                Some(&(pos, vel)) => SimNode {
                    pos,
                    vel,
                    anchor: member.anchor,
                    pinned: None,
                },
                None => SimNode {
                    pos: member.anchor + seed_jitter(member.index),
                    vel: DVec2::ZERO,
                    anchor: member.anchor,
                    pinned: None,
                },
            })
            .collect();

        let rest_scale = snapshot
            .strength_extent()
            .map(|extent| LogScale::new(extent, self.cfg.rest_length));
        self.springs = snapshot
            .edges
            .iter()
            .map(|e| Spring {
                a: e.source,
                b: e.target,
                rest: rest_scale
                    .map(|s| s.apply(e.strength))
                    .unwrap_or(self.cfg.rest_length.0),
            })
            .collect();

        self.alpha = 1.0;
        self.ticks_since_swap = 0;
        debug!(
            "layout swap: {} nodes, {} springs (step {})",
            self.nodes.len(),
            self.springs.len(),
            snapshot.step_index
        );
    }

    /// One tick: apply forces, integrate, then (under the caller's guard)
    /// re-check viewport fit. Returns false without doing work once the run
    /// has settled.
    pub fn advance(&mut self, fit_allowed: bool) -> bool {
        if self.alpha < self.cfg.alpha_min || self.nodes.is_empty() {
            return false;
        }
        self.alpha += (0.0 - self.alpha) * self.cfg.alpha_decay;
        self.ticks_since_swap += 1;

        self.apply_charge();
        self.apply_springs();
        self.apply_anchor_pull();
        self.integrate();

        if fit_allowed && self.ticks_since_swap > self.cfg.warmup_ticks {
            self.auto_fit();
        }
        trace!("tick {}: alpha {:.4}", self.ticks_since_swap, self.alpha);
        true
    }

    /// Current positions in viewport coordinates.
    pub fn positions(&self) -> Vec<DVec2> {
        self.nodes
            .iter()
            .map(|n| {
                DVec2::new(
                    self.x_scale.apply(n.pos.x),
                    self.y_scale.apply(n.pos.y),
                )
            })
            .collect()
    }

    /// World-space position and velocity of one node.
    pub fn state_of(&self, node: usize) -> Option<(DVec2, DVec2)> {
        self.nodes.get(node).map(|n| (n.pos, n.vel))
    }

    /// Hold a node at a fixed world position until unpinned.
    pub fn pin(&mut self, node: usize, pos: DVec2) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.pos = pos;
            n.vel = DVec2::ZERO;
            n.pinned = Some(pos);
        }
    }

    pub fn unpin(&mut self, node: usize) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.pinned = None;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.cfg.alpha_min
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn scales(&self) -> (&LinearScale, &LinearScale) {
        (&self.x_scale, &self.y_scale)
    }

    fn apply_charge(&mut self) {
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.nodes[j].pos - self.nodes[i].pos;
                let d2 = delta.length_squared().max(1e-4);
                let w = self.cfg.charge * self.alpha / d2;
                self.nodes[i].vel += delta * w;
                self.nodes[j].vel -= delta * w;
            }
        }
    }

    fn apply_springs(&mut self) {
        for spring in &self.springs {
            let delta = self.nodes[spring.b].pos - self.nodes[spring.a].pos;
            let dist = delta.length().max(1e-3);
            let stretch = (dist - spring.rest) / dist;
            let f = delta * (stretch * self.cfg.spring_stiffness * self.alpha * 0.5);
            self.nodes[spring.a].vel += f;
            self.nodes[spring.b].vel -= f;
        }
    }

    fn apply_anchor_pull(&mut self) {
        for node in &mut self.nodes {
            node.vel += (node.anchor - node.pos) * self.cfg.anchor_strength * self.alpha;
        }
    }

    fn integrate(&mut self) {
        let retain = 1.0 - self.cfg.velocity_decay;
        for node in &mut self.nodes {
            if let Some(pin) = node.pinned {
                node.pos = pin;
                node.vel = DVec2::ZERO;
                continue;
            }
            node.vel *= retain;
            node.pos += node.vel;
        }
    }

    /// Nudge the coordinate mapping when the node cloud spills outside the
    /// viewport or huddles well inside the tolerance band.
    fn auto_fit(&mut self) {
        let Some(bounds) = Bounds::of(self.positions()) else {
            return;
        };
        let tol = self.view * self.cfg.fit_tolerance;

        let too_large = bounds.min.x < 0.0
            || bounds.min.y < 0.0
            || bounds.max.x > self.view.x
            || bounds.max.y > self.view.y;
        let too_small = bounds.min.x > tol.x
            && bounds.min.y > tol.y
            && self.view.x - bounds.max.x > tol.x
            && self.view.y - bounds.max.y > tol.y;

        if too_large || too_small {
            let amount = if too_large {
                self.cfg.fit_increment
            } else {
                -self.cfg.fit_increment
            };
            self.x_scale.zoom(amount);
            self.y_scale.zoom(amount);
            trace!("auto-fit: {}", if too_large { "pull in" } else { "spread out" });
        }
    }
}

/// Deterministic offset so coincident anchor seeds don't sit exactly on
/// top of each other (exact overlap stalls the repulsion force).
fn seed_jitter(index: usize) -> DVec2 {
    let angle = index as f64 * SEED_ANGLE;
    let radius = 2.0 + (index % 16) as f64 * 0.5;
    DVec2::new(angle.cos(), angle.sin()) * radius
}
