//! SUBSWEEP - Subgraph-structure exploration core
//!
//! Coordinates three interdependent views (force-directed network, subgraph
//! summary chart, timeline scrubber) over a precomputed sequence of
//! edge-inclusion steps, preserving visual and interaction continuity as
//! the dataset swaps. Rendering is an external collaborator behind the
//! [`render::Renderer`] trait; the host owns the event loop and feeds
//! pointer events back through [`app::Explorer::handle_input`].

// Core engine (harmonizer, simulation, view state, timeline, events)
pub mod core;

// App modules
pub mod app;
pub mod config;
pub mod entities;
pub mod error;
pub mod render;
pub mod utils;

// Re-export commonly used types from core
pub use core::event_bus::{downcast_event, BoxedEvent, EventBus};
pub use core::events::{FocusChanged, NodeHighlightChanged, SnapshotCommitted};
pub use core::{Harmonizer, LayoutConfig, LayoutEngine, MetricSeries, Phase, TimelineController, ViewState, ViewTransform};

// Re-export entities and the host-facing surface
pub use app::Explorer;
pub use config::{ExplorerOptions, Margins};
pub use entities::{Edge, GraphData, Node, Snapshot, Step, StepRecord, SubgraphId};
pub use error::DataError;
pub use render::{InputEvent, Renderer};
