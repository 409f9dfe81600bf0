//! The per-update primitive pass to the rendering collaborator.
//!
//! Everything is derived from current state on every pass - the core keeps
//! no retained scene. Hosts that do retain marks key them by `MarkId` and
//! drop whatever a `begin_frame` pass does not re-issue.

use glam::DVec2;

use super::Explorer;
use crate::core::view_state::Phase;
use crate::entities::{SubgraphGroup, SubgraphId};
use crate::render::{LineSpec, MarkId, Panel, PointSpec, Renderer, Table};
use crate::utils::LogScale;

/// Base node radius in pixels.
const NODE_R: f64 = 3.0;
/// Radius multiplier for the highlighted node.
const NODE_HIGHLIGHT_R: f64 = 1.5;

impl Explorer {
    pub(super) fn render_pass(&self, now: f64, renderer: &mut dyn Renderer) {
        renderer.begin_frame();
        renderer.set_view_transform(self.view.transform_at(now));
        renderer.set_instruction_text(self.view.instructions());
        self.draw_network(renderer);
        self.draw_panels(renderer);
        self.draw_timeline(renderer);
    }

    fn draw_network(&self, renderer: &mut dyn Renderer) {
        let positions = self.engine.positions();
        let focused = self.view.focused();

        // Edges: zoomed in, only the focused subgraph's edges and colored
        // by strength; otherwise the whole prefix as a faint backdrop.
        let strength_scale = self
            .snapshot
            .strength_extent()
            .map(|extent| LogScale::new(extent, (0.0, 1.0)));
        match focused.and_then(|id| self.snapshot.groups.get(&id)) {
            Some(group) => {
                for &ei in &group.edges {
                    let edge = &self.snapshot.edges[ei];
                    renderer.upsert_line(
                        MarkId::Edge(ei),
                        LineSpec {
                            from: positions[edge.source],
                            to: positions[edge.target],
                            width: 2.5,
                            strength_t: strength_scale.map(|s| s.normalized(edge.strength)),
                            opacity: 1.0,
                        },
                    );
                }
            }
            None => {
                for (ei, edge) in self.snapshot.edges.iter().enumerate() {
                    renderer.upsert_line(
                        MarkId::Edge(ei),
                        LineSpec {
                            from: positions[edge.source],
                            to: positions[edge.target],
                            width: 1.0,
                            strength_t: None,
                            opacity: 0.5,
                        },
                    );
                }
            }
        }

        let magnification = self.view.node_magnification();
        let highlighted = self.view.highlighted_node();
        for (i, member) in self.snapshot.nodes.iter().enumerate() {
            let pinned = self
                .options
                .pinned_node
                .as_deref()
                .is_some_and(|id| id == member.id);

            let mut radius = if pinned { 2.0 * NODE_R } else { NODE_R };
            let mut opacity = match self.options.pinned_node {
                Some(_) if pinned => 1.0,
                Some(_) => 0.5,
                None => 0.9,
            };
            if let Some(focus) = focused {
                if member.subgraph == focus {
                    radius *= magnification;
                    if highlighted == Some(i) {
                        radius *= NODE_HIGHLIGHT_R;
                    }
                } else {
                    opacity = 0.0;
                }
            }

            renderer.upsert_point(
                MarkId::Node(i),
                PointSpec {
                    pos: positions[i],
                    radius,
                    color: member.color.clone(),
                    opacity,
                },
            );
        }
    }

    fn draw_panels(&self, renderer: &mut dyn Renderer) {
        match self.view.phase() {
            Phase::Overview => {
                renderer.set_subgraph_highlight(None);
                for panel in [
                    Panel::MemberGlimpse,
                    Panel::DetailStats,
                    Panel::DetailMembers,
                    Panel::Neighbors,
                ] {
                    renderer.set_panel(panel, false);
                }
            }
            Phase::Highlighted(id) => {
                renderer.set_subgraph_highlight(Some(id));
                if let Some(group) = self.snapshot.groups.get(&id) {
                    renderer.render_table(Panel::MemberGlimpse, &self.member_table(id, group));
                    renderer.set_panel(Panel::MemberGlimpse, true);
                }
                for panel in [Panel::DetailStats, Panel::DetailMembers, Panel::Neighbors] {
                    renderer.set_panel(panel, false);
                }
            }
            Phase::Focused { subgraph, node } => {
                renderer.set_subgraph_highlight(None);
                renderer.set_panel(Panel::MemberGlimpse, false);
                self.draw_detail(subgraph, node, renderer);
            }
        }
    }

    fn draw_detail(&self, subgraph: SubgraphId, node: Option<usize>, renderer: &mut dyn Renderer) {
        // Singleton components carry no upstream summary row; the stats
        // header just stays hidden for them.
        match self.snapshot.subgraphs.iter().find(|s| s.id == subgraph) {
            Some(stats) => {
                renderer.render_table(
                    Panel::DetailStats,
                    &Table {
                        title: format!("Subgraph {subgraph} statistics"),
                        columns: vec!["density".into(), "strength".into(), "size".into()],
                        rows: vec![vec![
                            format!("{:.3}", stats.density),
                            format!("{:.3}", stats.strength),
                            stats.size.to_string(),
                        ]],
                    },
                );
                renderer.set_panel(Panel::DetailStats, true);
            }
            None => renderer.set_panel(Panel::DetailStats, false),
        }

        let Some(group) = self.snapshot.groups.get(&subgraph) else {
            return;
        };
        renderer.render_table(
            Panel::DetailMembers,
            &Table {
                title: "Nodes in subgraph (hover to highlight in network plot)".into(),
                columns: vec!["members".into()],
                rows: group
                    .nodes
                    .iter()
                    .map(|&n| vec![self.snapshot.nodes[n].id.clone()])
                    .collect(),
            },
        );
        renderer.set_panel(Panel::DetailMembers, true);

        match node {
            Some(n) => {
                let row = group.nodes.iter().position(|&m| m == n);
                renderer.highlight_table_row(Panel::DetailMembers, row);

                let neighbors = self.snapshot.neighbors_of(n);
                renderer.render_table(
                    Panel::Neighbors,
                    &Table {
                        title: format!("{} Neighbors", neighbors.len()),
                        columns: vec!["neighbor".into(), "strength".into()],
                        rows: neighbors
                            .iter()
                            .map(|&(m, strength)| {
                                vec![self.snapshot.nodes[m].id.clone(), format!("{strength:.3}")]
                            })
                            .collect(),
                    },
                );
                renderer.set_panel(Panel::Neighbors, true);
            }
            None => {
                renderer.highlight_table_row(Panel::DetailMembers, None);
                renderer.set_panel(Panel::Neighbors, false);
            }
        }
    }

    fn draw_timeline(&self, renderer: &mut dyn Renderer) {
        let (_, _, timeline_h) = self.options.section_heights();
        let cursor = |x: f64, width: f64| LineSpec {
            from: DVec2::new(x, 0.0),
            to: DVec2::new(x, timeline_h),
            width,
            strength_t: None,
            opacity: 0.5,
        };

        renderer.upsert_line(
            MarkId::PinnedCursor,
            cursor(self.timeline.cursor_x(self.timeline.pinned()), 1.0),
        );
        renderer.upsert_line(
            MarkId::PreviewCursor,
            cursor(self.timeline.cursor_x(self.timeline.preview()), 1.0),
        );

        // Transient per-metric callouts follow the preview cursor.
        if self.timeline.preview() != self.timeline.pinned() {
            renderer.render_table(
                Panel::StepCallout,
                &Table {
                    title: format!("step {}", self.timeline.preview()),
                    columns: vec!["metric".into(), "value".into()],
                    rows: self
                        .timeline
                        .callouts()
                        .into_iter()
                        .map(|c| vec![c.metric, c.label])
                        .collect(),
                },
            );
            renderer.set_panel(Panel::StepCallout, true);
        } else {
            renderer.set_panel(Panel::StepCallout, false);
        }
    }

    fn member_table(&self, id: SubgraphId, group: &SubgraphGroup) -> Table {
        Table {
            title: format!("Subgraph {id} members"),
            columns: vec!["members".into(), "color".into()],
            rows: group
                .nodes
                .iter()
                .map(|&n| {
                    let member = &self.snapshot.nodes[n];
                    vec![
                        member.id.clone(),
                        member.color.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::super::tests::{fixture, focus_and_settle};
    use crate::core::view_state::ViewTransform;
    use crate::entities::SubgraphId;
    use crate::render::{
        EntityRef, InputEvent, LineSpec, MarkId, Panel, PointSpec, Renderer, Surface, Table,
    };

    /// Records every primitive request of the latest frame.
    #[derive(Default)]
    pub(crate) struct RecordingRenderer {
        pub points: HashMap<MarkId, PointSpec>,
        pub lines: HashMap<MarkId, LineSpec>,
        pub panels: HashMap<Panel, bool>,
        pub tables: HashMap<Panel, Table>,
        pub row_highlight: HashMap<Panel, Option<usize>>,
        pub transform: Option<ViewTransform>,
        pub instructions: String,
        pub subgraph_highlight: Option<SubgraphId>,
    }

    impl Renderer for RecordingRenderer {
        fn begin_frame(&mut self) {
            self.points.clear();
            self.lines.clear();
        }
        fn upsert_point(&mut self, id: MarkId, spec: PointSpec) {
            self.points.insert(id, spec);
        }
        fn upsert_line(&mut self, id: MarkId, spec: LineSpec) {
            self.lines.insert(id, spec);
        }
        fn set_panel(&mut self, panel: Panel, visible: bool) {
            self.panels.insert(panel, visible);
        }
        fn render_table(&mut self, panel: Panel, table: &Table) {
            self.tables.insert(panel, table.clone());
        }
        fn highlight_table_row(&mut self, panel: Panel, row: Option<usize>) {
            self.row_highlight.insert(panel, row);
        }
        fn set_view_transform(&mut self, transform: ViewTransform) {
            self.transform = Some(transform);
        }
        fn set_instruction_text(&mut self, text: &str) {
            self.instructions = text.to_string();
        }
        fn set_subgraph_highlight(&mut self, subgraph: Option<SubgraphId>) {
            self.subgraph_highlight = subgraph;
        }
    }

    #[test]
    fn overview_pass_draws_every_node_and_edge() {
        let mut explorer = fixture();
        let mut r = RecordingRenderer::default();
        explorer.update(0.0, &mut r);

        assert_eq!(r.points.len(), 6);
        let edge_marks = r
            .lines
            .keys()
            .filter(|id| matches!(id, MarkId::Edge(_)))
            .count();
        assert_eq!(edge_marks, 4, "whole active prefix in overview");
        assert!(r.lines.contains_key(&MarkId::PinnedCursor));
        assert!(r.lines.contains_key(&MarkId::PreviewCursor));
        assert_eq!(r.transform, Some(ViewTransform::IDENTITY));
        assert_eq!(
            r.instructions,
            crate::core::view_state::OVERVIEW_INSTRUCTIONS
        );
        assert_eq!(r.panels.get(&Panel::DetailMembers), Some(&false));
    }

    #[test]
    fn focused_pass_restricts_edges_and_hides_strangers() {
        let mut explorer = fixture();
        let now = focus_and_settle(&mut explorer, SubgraphId(0));
        let mut r = RecordingRenderer::default();
        explorer.update(now, &mut r);

        // Only the focused component's edges survive the pass.
        let edge_marks: Vec<_> = r
            .lines
            .keys()
            .filter(|id| matches!(id, MarkId::Edge(_)))
            .collect();
        assert_eq!(edge_marks.len(), 2);

        // Members keep their opacity, strangers vanish.
        assert!(r.points[&MarkId::Node(0)].opacity > 0.0);
        assert_eq!(r.points[&MarkId::Node(4)].opacity, 0.0);

        assert_eq!(r.panels.get(&Panel::DetailMembers), Some(&true));
        let members = &r.tables[&Panel::DetailMembers];
        assert_eq!(members.rows.len(), 3);
        assert_eq!(members.rows[0][0], "n0");
        assert!(r.transform.unwrap().k > 1.0);
    }

    #[test]
    fn node_highlight_outlines_row_and_lists_neighbors_strongest_first() {
        let mut explorer = fixture();
        let now = focus_and_settle(&mut explorer, SubgraphId(0));
        explorer.handle_input(
            InputEvent::PointerEnter {
                surface: Surface::DetailTable,
                entity: EntityRef::Node(1),
            },
            now,
        );
        let mut r = RecordingRenderer::default();
        explorer.update(now, &mut r);

        assert_eq!(r.row_highlight.get(&Panel::DetailMembers), Some(&Some(1)));
        let neighbors = &r.tables[&Panel::Neighbors];
        assert_eq!(neighbors.title, "2 Neighbors");
        // n1 touches n0 (9.0) and n2 (7.0): descending strength.
        assert_eq!(neighbors.rows[0][0], "n0");
        assert_eq!(neighbors.rows[1][0], "n2");

        // The highlighted node renders enlarged relative to its peers.
        let highlighted = r.points[&MarkId::Node(1)].radius;
        let peer = r.points[&MarkId::Node(0)].radius;
        assert!(highlighted > peer);
    }

    #[test]
    fn hover_pass_shows_the_member_glimpse() {
        let mut explorer = fixture();
        explorer.handle_input(
            InputEvent::PointerEnter {
                surface: Surface::Network,
                entity: EntityRef::Subgraph(SubgraphId(3)),
            },
            0.0,
        );
        let mut r = RecordingRenderer::default();
        explorer.update(0.0, &mut r);

        assert_eq!(r.subgraph_highlight, Some(SubgraphId(3)));
        assert_eq!(r.panels.get(&Panel::MemberGlimpse), Some(&true));
        assert_eq!(r.tables[&Panel::MemberGlimpse].rows.len(), 3);
    }

    #[test]
    fn preview_cursor_produces_the_step_callout() {
        let mut explorer = fixture();
        explorer.handle_input(
            InputEvent::PointerMove {
                surface: Surface::Timeline,
                x: 10.0,
                y: 0.0,
            },
            0.0,
        );
        let mut r = RecordingRenderer::default();
        explorer.update(0.0, &mut r);

        assert_eq!(r.panels.get(&Panel::StepCallout), Some(&true));
        let callout = &r.tables[&Panel::StepCallout];
        assert_eq!(callout.title, "step 0");
        assert_eq!(callout.rows[0][0], "rel_max_size");

        // Pointer-leave reverts the preview: callout disappears.
        explorer.handle_input(
            InputEvent::PointerLeave {
                surface: Surface::Timeline,
                entity: EntityRef::Background,
            },
            1.0,
        );
        let mut r = RecordingRenderer::default();
        explorer.update(1.0, &mut r);
        assert_eq!(r.panels.get(&Panel::StepCallout), Some(&false));
        let pinned = &r.lines[&MarkId::PinnedCursor];
        let preview = &r.lines[&MarkId::PreviewCursor];
        assert_eq!(pinned.from, preview.from);
    }

    #[test]
    fn pinned_node_option_doubles_radius_and_dims_the_rest() {
        use crate::config::ExplorerOptions;
        use crate::entities::{Edge, GraphData, Node, Step, StepRecord};
        use indexmap::IndexMap;

        let data = GraphData::new(
            vec![
                Node {
                    id: "a".into(),
                    color: None,
                },
                Node {
                    id: "b".into(),
                    color: None,
                },
            ],
            vec![Edge {
                source: "a".into(),
                target: "b".into(),
                strength: 1.0,
            }],
        )
        .unwrap();
        let steps = vec![Step {
            index: 0,
            n_edges: 1,
            subgraphs: Vec::new(),
        }];
        let mut values = IndexMap::new();
        values.insert(StepRecord::REL_MAX_SIZE.to_string(), 1.0);
        let records = vec![StepRecord { index: 0, values }];
        let options = ExplorerOptions {
            pinned_node: Some("b".into()),
            ..Default::default()
        };

        let mut explorer = super::super::Explorer::new(data, steps, &records, options).unwrap();
        let mut r = RecordingRenderer::default();
        explorer.update(0.0, &mut r);

        let a = &r.points[&MarkId::Node(0)];
        let b = &r.points[&MarkId::Node(1)];
        assert_eq!(b.radius, 2.0 * a.radius);
        assert_eq!(b.opacity, 1.0);
        assert_eq!(a.opacity, 0.5);
    }
}
