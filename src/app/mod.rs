//! Application module - the `Explorer` composition root.
//!
//! This module organizes the coordination logic into focused submodules:
//! - `events` - input dispatch behind the error boundary
//! - `render` - the per-update primitive pass to the rendering collaborator
//!
//! The explorer owns the four core components and is the only place the
//! step-commit protocol lives. It is single-threaded and cooperative: the
//! host calls `update(now, renderer)` once per scheduling slot (one bounded
//! simulation tick, animation upkeep, one render pass) and feeds pointer
//! events through `handle_input` between slots.

mod events;
mod render;

use std::sync::Arc;

use anyhow::Context;
use log::{debug, info};

use crate::config::ExplorerOptions;
use crate::core::event_bus::EventBus;
use crate::core::events::SnapshotCommitted;
use crate::core::harmonizer::Harmonizer;
use crate::core::simulation::{LayoutConfig, LayoutEngine};
use crate::core::timeline::TimelineController;
use crate::core::view_state::{ViewConfig, ViewState};
use crate::entities::{GraphData, Snapshot, Step, StepRecord};
use crate::error::DataError;
use crate::render::Renderer;

/// Coordinates the network, summary and timeline views against the
/// swapping per-step dataset.
pub struct Explorer {
    options: ExplorerOptions,
    data: GraphData,
    steps: Vec<Step>,
    harmonizer: Harmonizer,
    engine: LayoutEngine,
    view: ViewState,
    timeline: TimelineController,
    bus: EventBus,
    /// Snapshot of the pinned step. Shared read-only; replaced wholesale
    /// by the next commit.
    snapshot: Arc<Snapshot>,
}

impl Explorer {
    /// Build the explorer and commit the initial step (configured default
    /// or the most fragmented one).
    pub fn new(
        data: GraphData,
        steps: Vec<Step>,
        records: &[StepRecord],
        options: ExplorerOptions,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            steps.len() == records.len(),
            "step structure and metric records disagree: {} vs {} steps",
            steps.len(),
            records.len()
        );

        let (network_h, _, _) = options.section_heights();
        let inner_w = options.inner_width();

        let harmonizer = Harmonizer::new(inner_w, network_h);
        let mut engine = LayoutEngine::new(LayoutConfig::default(), inner_w, network_h);
        let view = ViewState::new(ViewConfig::default(), inner_w, network_h);
        let timeline = TimelineController::new(records, options.default_step, inner_w)
            .context("building timeline controller")?;

        let pinned = timeline.pinned();
        let step = steps
            .get(pinned)
            .ok_or(DataError::StepOutOfRange {
                step: pinned,
                step_count: steps.len(),
            })?;
        let snapshot = Arc::new(
            harmonizer
                .harmonize(&data, step)
                .context("harmonizing the initial step")?,
        );
        engine.set_snapshot(&snapshot);
        info!(
            "explorer ready: {} nodes, {} steps, initial step {}",
            data.node_count(),
            steps.len(),
            pinned
        );

        Ok(Self {
            options,
            data,
            steps,
            harmonizer,
            engine,
            view,
            timeline,
            bus: EventBus::new(),
            snapshot,
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn options(&self) -> &ExplorerOptions {
        &self.options
    }

    pub fn timeline(&self) -> &TimelineController {
        &self.timeline
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// One cooperative unit of work: advance the simulation by at most one
    /// tick (auto-fit guarded by the view state), settle any finished zoom
    /// animation, then notify the rendering collaborator.
    pub fn update(&mut self, now: f64, renderer: &mut dyn Renderer) {
        let fit_allowed = self.view.fit_allowed();
        self.engine.advance(fit_allowed);
        if self.view.tick(now) {
            debug!("zoom animation settled");
        }
        self.render_pass(now, renderer);
    }

    /// Pin a step and run the commit protocol, in order: harmonize the new
    /// snapshot, swap it into the layout engine (continuity-preserving),
    /// reset the view to overview, notify subscribers.
    ///
    /// Dropped (Ok, state unchanged) while a zoom animation is in flight;
    /// harmonization failures abort before any component mutates.
    pub fn pin_step(&mut self, step: usize) -> Result<(), DataError> {
        if self.view.zoom_in_flight() {
            debug!("pin of step {step} dropped: zoom animation in flight");
            return Ok(());
        }
        let target = self
            .steps
            .get(step)
            .ok_or(DataError::StepOutOfRange {
                step,
                step_count: self.steps.len(),
            })?;

        // Harmonize first: a failure here must leave every component
        // untouched.
        let snapshot = Arc::new(self.harmonizer.harmonize(&self.data, target)?);

        self.timeline.pin(step)?;
        self.engine.set_snapshot(&snapshot);
        self.view.reset_to_overview();
        self.snapshot = Arc::clone(&snapshot);
        self.bus.emit(SnapshotCommitted { step, snapshot });
        Ok(())
    }
}
