//! The rendering collaborator seam.
//!
//! The core issues primitive requests through [`Renderer`] and receives
//! [`InputEvent`]s back; it makes no assumption about the technology behind
//! the trait (canvas, SVG, immediate-mode GUI, a test recorder). Axes,
//! shapes and label formatting stay on the host side - the core only says
//! what to mark, where, and how prominently.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::core::view_state::ViewTransform;
use crate::entities::SubgraphId;

/// Which view an input event happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Network,
    SummaryChart,
    Timeline,
    DetailTable,
}

/// What an input event is tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Subgraph(SubgraphId),
    /// Universe node index.
    Node(usize),
    Background,
}

/// Pointer/click vocabulary the host feeds into `Explorer::handle_input`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMove {
        surface: Surface,
        x: f64,
        y: f64,
    },
    PointerEnter {
        surface: Surface,
        entity: EntityRef,
    },
    PointerLeave {
        surface: Surface,
        entity: EntityRef,
    },
    Click {
        surface: Surface,
        entity: EntityRef,
        x: f64,
        y: f64,
    },
}

/// Stable identity of a drawn mark, so retained-mode hosts can update in
/// place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkId {
    Node(usize),
    /// Position into the active edge prefix.
    Edge(usize),
    PreviewCursor,
    PinnedCursor,
}

/// A marked point (network node, callout dot).
#[derive(Clone, Debug, PartialEq)]
pub struct PointSpec {
    pub pos: DVec2,
    pub radius: f64,
    /// Upstream color string; None leaves the host default.
    pub color: Option<String>,
    pub opacity: f64,
}

/// A line segment (network edge, timeline cursor).
#[derive(Clone, Debug, PartialEq)]
pub struct LineSpec {
    pub from: DVec2,
    pub to: DVec2,
    pub width: f64,
    /// Normalized strength in [0, 1] for hosts that color edges by
    /// strength; None draws the neutral stroke.
    pub strength_t: Option<f64>,
    pub opacity: f64,
}

/// Panels the core shows and hides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Panel {
    /// Focused-subgraph statistics header.
    DetailStats,
    /// Focused-subgraph member table.
    DetailMembers,
    /// Hover glimpse of a highlighted subgraph's members.
    MemberGlimpse,
    /// Neighbors of the highlighted node, strongest first.
    Neighbors,
    /// Per-metric values at the timeline preview cursor.
    StepCallout,
}

/// Tabular payload for panel rendering. The first row of `rows` is the
/// most prominent (tables arrive pre-sorted).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Primitive requests the core issues each update pass.
///
/// `begin_frame` lets retained-mode hosts drop marks not re-issued this
/// pass (the active edge prefix shrinks on some step changes); immediate
///-mode hosts can ignore it.
pub trait Renderer {
    fn begin_frame(&mut self) {}
    fn upsert_point(&mut self, id: MarkId, spec: PointSpec);
    fn upsert_line(&mut self, id: MarkId, spec: LineSpec);
    fn set_panel(&mut self, panel: Panel, visible: bool);
    fn render_table(&mut self, panel: Panel, table: &Table);
    /// Outline a table row and scroll it into view; None clears.
    fn highlight_table_row(&mut self, panel: Panel, row: Option<usize>);
    fn set_view_transform(&mut self, transform: ViewTransform);
    fn set_instruction_text(&mut self, text: &str);
    /// Mark a subgraph across the network and summary views; None clears.
    fn set_subgraph_highlight(&mut self, subgraph: Option<SubgraphId>);
}
