//! Input dispatch for the explorer.
//!
//! All pointer/click events from the rendering collaborator enter through
//! `handle_input`, which is the error boundary: a failing handler is
//! logged and dropped, it never terminates the simulation loop or leaves
//! the state machine half-transitioned. Guarded transitions that reject a
//! request (interaction races) are not errors and stay silent apart from
//! debug logs.

use log::{debug, error};

use super::Explorer;
use crate::core::events::{FocusChanged, NodeHighlightChanged};
use crate::entities::SubgraphId;
use crate::error::DataError;
use crate::render::{EntityRef, InputEvent, Surface};
use crate::utils::Bounds;

impl Explorer {
    /// Dispatch one input event at time `now`.
    pub fn handle_input(&mut self, event: InputEvent, now: f64) {
        if let Err(err) = self.dispatch(event, now) {
            // Upstream contract breach surfaced by a commit: the step is
            // abandoned, the loop lives on.
            error!("interaction dropped: {err}");
        }
    }

    fn dispatch(&mut self, event: InputEvent, now: f64) -> Result<(), DataError> {
        match event {
            InputEvent::PointerMove {
                surface: Surface::Timeline,
                x,
                ..
            } => {
                self.timeline.preview_at(x);
            }
            InputEvent::PointerLeave {
                surface: Surface::Timeline,
                ..
            } => {
                self.timeline.pointer_leave();
            }
            InputEvent::Click {
                surface: Surface::Timeline,
                x,
                ..
            } => {
                let step = self.timeline.step_at(x);
                self.pin_step(step)?;
            }

            InputEvent::PointerEnter {
                surface: Surface::Network | Surface::SummaryChart,
                entity: EntityRef::Subgraph(id),
            } => {
                if self.snapshot.groups.contains_key(&id) {
                    self.view.hover_subgraph(id);
                } else {
                    debug!("hover on stale subgraph {id} ignored");
                }
            }
            InputEvent::PointerLeave {
                surface: Surface::Network | Surface::SummaryChart,
                entity: EntityRef::Subgraph(_),
            } => {
                self.view.unhover_subgraph();
            }
            InputEvent::Click {
                surface: Surface::Network | Surface::SummaryChart,
                entity: EntityRef::Subgraph(id),
                ..
            } => {
                if self.view.focused().is_some() {
                    // Zoomed in, any click resets - hunting for "outside
                    // the subgraph" is frustrating.
                    self.reset_focus(now);
                } else {
                    self.focus_subgraph(id, now);
                }
            }
            InputEvent::Click {
                surface: Surface::Network,
                entity: EntityRef::Background,
                ..
            } => {
                self.reset_focus(now);
            }

            InputEvent::PointerEnter {
                surface: Surface::Network | Surface::DetailTable,
                entity: EntityRef::Node(node),
            } => {
                self.hover_node(node);
            }
            InputEvent::PointerLeave {
                surface: Surface::Network | Surface::DetailTable,
                entity: EntityRef::Node(_),
            } => {
                if self.view.unhover_node() {
                    self.bus.emit(NodeHighlightChanged { node: None });
                }
            }

            _ => {}
        }
        Ok(())
    }

    fn focus_subgraph(&mut self, id: SubgraphId, now: f64) {
        let Some(group) = self.snapshot.groups.get(&id) else {
            debug!("focus on stale subgraph {id} ignored");
            return;
        };
        let positions = self.engine.positions();
        let Some(bounds) = Bounds::of(group.nodes.iter().map(|&n| positions[n])) else {
            return;
        };
        if self.view.focus(id, bounds, now) {
            self.bus.emit(FocusChanged { subgraph: Some(id) });
        }
    }

    fn reset_focus(&mut self, now: f64) {
        if self.view.reset(now) {
            self.bus.emit(FocusChanged { subgraph: None });
        }
    }

    fn hover_node(&mut self, node: usize) {
        // Node highlight is only meaningful inside the focused subgraph.
        let member_of_focus = self
            .view
            .focused()
            .zip(self.snapshot.nodes.get(node))
            .is_some_and(|(focus, member)| member.subgraph == focus);
        if member_of_focus && self.view.hover_node(node) {
            self.bus.emit(NodeHighlightChanged { node: Some(node) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fixture, focus_and_settle};
    use crate::core::event_bus::downcast_event;
    use crate::core::events::{FocusChanged, NodeHighlightChanged};
    use crate::core::view_state::Phase;
    use crate::entities::SubgraphId;
    use crate::render::{EntityRef, InputEvent, Surface};

    fn enter(surface: Surface, entity: EntityRef) -> InputEvent {
        InputEvent::PointerEnter { surface, entity }
    }

    fn leave(surface: Surface, entity: EntityRef) -> InputEvent {
        InputEvent::PointerLeave { surface, entity }
    }

    fn click(surface: Surface, entity: EntityRef) -> InputEvent {
        InputEvent::Click {
            surface,
            entity,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn summary_hover_highlights_like_network_hover() {
        let mut explorer = fixture();
        explorer.handle_input(
            enter(Surface::SummaryChart, EntityRef::Subgraph(SubgraphId(0))),
            0.0,
        );
        assert_eq!(explorer.view().phase(), Phase::Highlighted(SubgraphId(0)));
        explorer.handle_input(
            leave(Surface::SummaryChart, EntityRef::Subgraph(SubgraphId(0))),
            1.0,
        );
        assert_eq!(explorer.view().phase(), Phase::Overview);
    }

    #[test]
    fn click_focuses_and_background_click_resets() {
        let mut explorer = fixture();
        explorer.handle_input(click(Surface::Network, EntityRef::Subgraph(SubgraphId(0))), 0.0);
        assert_eq!(explorer.view().focused(), Some(SubgraphId(0)));

        let events = explorer.bus().poll();
        assert!(events
            .iter()
            .any(|e| matches!(downcast_event::<FocusChanged>(e), Some(FocusChanged { subgraph: Some(_) }))));

        // Reset is dropped mid-animation...
        explorer.handle_input(click(Surface::Network, EntityRef::Background), 100.0);
        assert_eq!(explorer.view().focused(), Some(SubgraphId(0)));

        // ...and applies once the zoom settled.
        let now = focus_and_settle_noop(&mut explorer);
        explorer.handle_input(click(Surface::Network, EntityRef::Background), now);
        assert_eq!(explorer.view().phase(), Phase::Overview);
    }

    /// Run updates far enough past the zoom duration to settle it.
    fn focus_and_settle_noop(explorer: &mut super::super::Explorer) -> f64 {
        let mut recorder = crate::app::render::tests::RecordingRenderer::default();
        explorer.update(800.0, &mut recorder);
        800.0
    }

    #[test]
    fn any_click_resets_while_focused() {
        let mut explorer = fixture();
        let now = focus_and_settle(&mut explorer, SubgraphId(0));
        // Clicking another subgraph while focused resets rather than
        // retargets.
        explorer.handle_input(
            click(Surface::Network, EntityRef::Subgraph(SubgraphId(3))),
            now,
        );
        assert_eq!(explorer.view().phase(), Phase::Overview);
    }

    #[test]
    fn node_hover_requires_membership_in_the_focused_subgraph() {
        let mut explorer = fixture();
        let now = focus_and_settle(&mut explorer, SubgraphId(0));
        let _ = explorer.bus().poll();

        // Node 4 lives in the other component: ignored.
        explorer.handle_input(enter(Surface::Network, EntityRef::Node(4)), now);
        assert_eq!(explorer.view().highlighted_node(), None);

        // Node 1 is a member: highlighted, and subscribers hear about it.
        explorer.handle_input(enter(Surface::DetailTable, EntityRef::Node(1)), now);
        assert_eq!(explorer.view().highlighted_node(), Some(1));
        let events = explorer.bus().poll();
        assert!(events.iter().any(|e| matches!(
            downcast_event::<NodeHighlightChanged>(e),
            Some(NodeHighlightChanged { node: Some(1) })
        )));

        explorer.handle_input(leave(Surface::DetailTable, EntityRef::Node(1)), now);
        assert_eq!(explorer.view().highlighted_node(), None);
    }

    #[test]
    fn timeline_interaction_drives_preview_and_commit() {
        let mut explorer = fixture();
        // 2 steps over the default inner width (750px): left half previews
        // step 0 without committing.
        explorer.handle_input(
            InputEvent::PointerMove {
                surface: Surface::Timeline,
                x: 10.0,
                y: 0.0,
            },
            0.0,
        );
        assert_eq!(explorer.timeline().preview(), 0);
        assert_eq!(explorer.timeline().pinned(), 1);

        explorer.handle_input(
            leave(Surface::Timeline, EntityRef::Background),
            1.0,
        );
        assert_eq!(explorer.timeline().preview(), 1);

        explorer.handle_input(
            InputEvent::Click {
                surface: Surface::Timeline,
                entity: EntityRef::Background,
                x: 10.0,
                y: 0.0,
            },
            2.0,
        );
        assert_eq!(explorer.timeline().pinned(), 0);
        assert_eq!(explorer.snapshot().step_index, 0);
    }
}
