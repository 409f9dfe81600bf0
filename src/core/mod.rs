//! Core engine modules - harmonization, layout simulation, interaction
//! state, timeline control, events
//!
//! These modules coordinate the three views, independent of any rendering
//! technology.

pub mod event_bus;
pub mod events;
pub mod harmonizer;
pub mod simulation;
pub mod timeline;
pub mod view_state;

// Re-exports for convenience
pub use event_bus::{downcast_event, BoxedEvent, EventBus};
pub use harmonizer::Harmonizer;
pub use simulation::{LayoutConfig, LayoutEngine};
pub use timeline::{MetricSeries, TimelineController};
pub use view_state::{Phase, ViewState, ViewTransform};
