use eframe::egui::{Pos2, Vec2};

use crate::graph::Graph;

use super::super::physics::Simulation;
use super::scene::{node_at, node_headline};
use super::viewport::Viewport;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Gesture {
    Idle,
    /// The node is pinned for as long as this state lasts. `grab_offset` keeps
    /// the node from jumping under the pointer when the drag starts.
    DraggingNode {
        node_id: String,
        grab_offset: Vec2,
    },
    PanningOrZooming,
}

#[derive(Clone, Debug, PartialEq)]
struct Hover {
    node_id: String,
    pointer: Pos2,
}

pub(crate) struct Tooltip<'a> {
    pub node_id: &'a str,
    pub anchor: Pos2,
    pub title: &'a str,
    pub lines: Vec<String>,
}

/// Turns canvas pointer events into pins, alpha changes and viewport moves.
/// All positions are canvas-local screen coordinates.
pub(crate) struct InteractionController {
    gesture: Gesture,
    hovered: Option<Hover>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
            hovered: None,
        }
    }
}

impl InteractionController {
    pub(crate) fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub(crate) fn dragged_id(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::DraggingNode { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    pub(crate) fn hovered_id(&self) -> Option<&str> {
        self.hovered.as_ref().map(|hover| hover.node_id.as_str())
    }

    /// Starts a gesture. Returns `false` when the press is ignored: another
    /// gesture is still active or the node under the pointer is already pinned.
    pub(crate) fn pointer_down(
        &mut self,
        pointer: Pos2,
        simulation: &mut Simulation,
        viewport: &Viewport,
    ) -> bool {
        if self.gesture != Gesture::Idle {
            return false;
        }

        let world = viewport.to_world(pointer);
        let Some(index) = node_at(simulation.graph(), world) else {
            self.gesture = Gesture::PanningOrZooming;
            return true;
        };

        let node = &simulation.graph().nodes()[index];
        let node_id = node.id.clone();
        let position = node.position();
        if simulation.is_pinned(&node_id) {
            return false;
        }

        simulation.pin(&node_id, position);
        simulation.reheat(simulation.config().drag_alpha_target);
        log::debug!("dragging node {node_id}");

        self.hovered = None;
        self.gesture = Gesture::DraggingNode {
            node_id,
            grab_offset: position - world,
        };
        true
    }

    pub(crate) fn pointer_move(
        &mut self,
        pointer: Pos2,
        delta: Vec2,
        simulation: &mut Simulation,
        viewport: &mut Viewport,
    ) {
        if self.gesture == Gesture::Idle {
            self.hover(Some(pointer), simulation.graph(), viewport);
            return;
        }

        match &self.gesture {
            Gesture::DraggingNode {
                node_id,
                grab_offset,
            } => {
                simulation.pin(node_id, viewport.to_world(pointer) + *grab_offset);
            }
            Gesture::PanningOrZooming => viewport.pan_by(delta),
            Gesture::Idle => {}
        }
    }

    pub(crate) fn pointer_up(&mut self, simulation: &mut Simulation) {
        if let Gesture::DraggingNode { node_id, .. } =
            std::mem::replace(&mut self.gesture, Gesture::Idle)
        {
            simulation.unpin(&node_id);
            simulation.settle();
            log::debug!("released node {node_id}");
        }
    }

    /// Wheel and pinch zoom apply in any state and never touch pins.
    pub(crate) fn zoom(factor: f32, focal: Pos2, viewport: &mut Viewport) {
        viewport.zoom_by(factor, focal);
    }

    /// Endpoint URL to open for a click that did not turn into a drag.
    pub(crate) fn clicked_url<'a>(
        &self,
        pointer: Pos2,
        graph: &'a Graph,
        viewport: &Viewport,
    ) -> Option<&'a str> {
        if self.gesture != Gesture::Idle {
            return None;
        }

        let index = node_at(graph, viewport.to_world(pointer))?;
        graph.nodes()[index].metadata_str("url")
    }

    /// Tracks the node under a free-moving pointer; `None` means the pointer
    /// left the canvas.
    pub(crate) fn hover(&mut self, pointer: Option<Pos2>, graph: &Graph, viewport: &Viewport) {
        if self.gesture != Gesture::Idle {
            self.hovered = None;
            return;
        }

        self.hovered = pointer.and_then(|pointer| {
            node_at(graph, viewport.to_world(pointer)).map(|index| Hover {
                node_id: graph.nodes()[index].id.clone(),
                pointer,
            })
        });
    }

    pub(crate) fn tooltip<'a>(&'a self, graph: &'a Graph) -> Option<Tooltip<'a>> {
        let hover = self.hovered.as_ref()?;
        let node = graph.node(&hover.node_id)?;
        let mut lines = Vec::new();
        if let Some(label) = node.label.as_deref() {
            lines.push(format!("label: {label}"));
        }
        lines.extend(node.metadata_lines());

        Some(Tooltip {
            node_id: &node.id,
            anchor: hover.pointer,
            title: node_headline(node),
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Pos2, Vec2, pos2, vec2};
    use serde_json::json;

    use super::{Gesture, InteractionController};
    use crate::app::graph::viewport::Viewport;
    use crate::app::physics::{Simulation, SimulationConfig};
    use crate::graph::Graph;
    use crate::graph::tests::{chain, raw_node};

    fn settled(graph: Graph) -> Simulation {
        let mut simulation = Simulation::new(SimulationConfig::default());
        simulation.start(graph, vec2(800.0, 600.0));
        let mut ticks = 0;
        while simulation.tick() {
            ticks += 1;
            assert!(ticks < 2_000);
        }
        simulation
    }

    fn screen_of(simulation: &Simulation, viewport: &Viewport, id: &str) -> Pos2 {
        let node = simulation.graph().node(id).expect("node exists");
        viewport.to_screen(node.position())
    }

    #[test]
    fn drag_pins_node_and_release_unpins_it() {
        let mut simulation = settled(chain(&["A", "B", "C"]));
        let mut viewport = Viewport::default();
        let mut interaction = InteractionController::default();

        let start = screen_of(&simulation, &viewport, "B");
        assert!(interaction.pointer_down(start, &mut simulation, &viewport));
        assert_eq!(interaction.dragged_id(), Some("B"));
        assert!(simulation.is_pinned("B"));
        assert!(simulation.is_running());

        let target = pos2(500.0, 500.0);
        interaction.pointer_move(target, target - start, &mut simulation, &mut viewport);
        for _ in 0..10 {
            assert!(simulation.tick());
            assert_eq!(simulation.graph().node("B").map(|n| n.position()), Some(vec2(500.0, 500.0)));
        }

        interaction.pointer_up(&mut simulation);
        assert_eq!(interaction.gesture(), &Gesture::Idle);
        let released = simulation.graph().node("B").expect("node exists");
        assert_eq!(released.position(), vec2(500.0, 500.0));
        assert!(released.pin.is_none());

        let mut moved = false;
        for _ in 0..5 {
            simulation.tick();
            moved |= simulation.graph().node("B").map(|n| n.position()) != Some(vec2(500.0, 500.0));
        }
        assert!(moved);
        assert!(!simulation.is_pinned("B"));
    }

    #[test]
    fn grab_offset_is_preserved_while_dragging() {
        let mut simulation = settled(chain(&["A", "B"]));
        let mut viewport = Viewport::default();
        viewport.zoom_by(2.0, pos2(400.0, 300.0));
        let mut interaction = InteractionController::default();

        let press = screen_of(&simulation, &viewport, "A") + vec2(20.0, -10.0);
        assert!(interaction.pointer_down(press, &mut simulation, &viewport));
        let before = simulation.graph().node("A").expect("node").position();

        interaction.pointer_move(press + vec2(40.0, 0.0), vec2(40.0, 0.0), &mut simulation, &mut viewport);
        let after = simulation.graph().node("A").expect("node").position();
        assert!((after - before - vec2(20.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn second_press_is_ignored_until_release() {
        let mut simulation = settled(chain(&["A", "B"]));
        let viewport = Viewport::default();
        let mut interaction = InteractionController::default();

        let press = screen_of(&simulation, &viewport, "A");
        assert!(interaction.pointer_down(press, &mut simulation, &viewport));
        assert!(!interaction.pointer_down(press, &mut simulation, &viewport));

        let mut other = InteractionController::default();
        assert!(!other.pointer_down(press, &mut simulation, &viewport));
        assert_eq!(other.gesture(), &Gesture::Idle);

        interaction.pointer_up(&mut simulation);
        assert!(other.pointer_down(press, &mut simulation, &viewport));
    }

    #[test]
    fn empty_canvas_drag_pans_without_pinning() {
        let mut simulation = settled(chain(&["A", "B"]));
        let mut viewport = Viewport::default();
        let mut interaction = InteractionController::default();

        let far = pos2(-5_000.0, -5_000.0);
        assert!(interaction.pointer_down(far, &mut simulation, &viewport));
        assert_eq!(interaction.gesture(), &Gesture::PanningOrZooming);

        interaction.pointer_move(far + vec2(30.0, 15.0), vec2(30.0, 15.0), &mut simulation, &mut viewport);
        assert_eq!(viewport.translation(), vec2(30.0, 15.0));
        assert!(simulation.graph().nodes().iter().all(|node| !node.is_pinned()));
        assert!(!simulation.is_running());

        InteractionController::zoom(2.0, far, &mut viewport);
        assert_eq!(viewport.scale(), 2.0);

        interaction.pointer_up(&mut simulation);
        assert_eq!(interaction.gesture(), &Gesture::Idle);
    }

    #[test]
    fn hover_shows_tooltip_from_metadata_and_hides_on_leave() {
        let mut node = raw_node("getUsers");
        node.x = Some(100.0);
        node.y = Some(100.0);
        node.label = Some("List users".into());
        node.metadata.insert("method".into(), json!("GET"));
        node.metadata.insert("url".into(), json!("/api/users"));
        let graph = Graph::build(&[node], &[]).expect("valid");

        let viewport = Viewport::default();
        let mut interaction = InteractionController::default();

        interaction.hover(Some(pos2(110.0, 95.0)), &graph, &viewport);
        assert_eq!(interaction.hovered_id(), Some("getUsers"));
        let tooltip = interaction.tooltip(&graph).expect("tooltip visible");
        assert_eq!(tooltip.node_id, "getUsers");
        assert_eq!(tooltip.anchor, pos2(110.0, 95.0));
        assert_eq!(tooltip.title, "List users");
        assert_eq!(
            tooltip.lines,
            vec![
                "label: List users".to_string(),
                "method: GET".to_string(),
                "url: /api/users".to_string()
            ]
        );

        interaction.hover(Some(pos2(400.0, 400.0)), &graph, &viewport);
        assert!(interaction.tooltip(&graph).is_none());

        interaction.hover(Some(pos2(100.0, 100.0)), &graph, &viewport);
        interaction.hover(None, &graph, &viewport);
        assert_eq!(interaction.hovered_id(), None);
    }

    #[test]
    fn idle_pointer_move_updates_hover() {
        let mut simulation = settled(chain(&["A"]));
        let mut viewport = Viewport::default();
        let mut interaction = InteractionController::default();

        let over = screen_of(&simulation, &viewport, "A");
        interaction.pointer_move(over, Vec2::ZERO, &mut simulation, &mut viewport);
        assert_eq!(interaction.hovered_id(), Some("A"));

        assert!(interaction.pointer_down(over, &mut simulation, &viewport));
        assert_eq!(interaction.hovered_id(), None);
    }

    #[test]
    fn click_on_node_yields_its_url() {
        let mut linked = raw_node("getUsers");
        linked.x = Some(100.0);
        linked.y = Some(100.0);
        linked
            .metadata
            .insert("url".into(), json!("https://api.example.com/users"));
        let mut bare = raw_node("bare");
        bare.x = Some(400.0);
        bare.y = Some(100.0);
        let graph = Graph::build(&[linked, bare], &[]).expect("valid");

        let mut viewport = Viewport::default();
        viewport.zoom_by(2.0, pos2(0.0, 0.0));
        let interaction = InteractionController::default();

        assert_eq!(
            interaction.clicked_url(pos2(200.0, 200.0), &graph, &viewport),
            Some("https://api.example.com/users")
        );
        assert_eq!(interaction.clicked_url(pos2(800.0, 200.0), &graph, &viewport), None);
        assert_eq!(interaction.clicked_url(pos2(500.0, 600.0), &graph, &viewport), None);
    }

    #[test]
    fn click_during_a_drag_opens_nothing() {
        let mut node = raw_node("A");
        node.metadata.insert("url".into(), json!("/api/a"));
        let mut simulation = Simulation::new(SimulationConfig::default());
        simulation.start(Graph::build(&[node], &[]).expect("valid"), vec2(800.0, 600.0));
        let mut viewport = Viewport::default();
        let mut interaction = InteractionController::default();

        let over = screen_of(&simulation, &viewport, "A");
        assert_eq!(interaction.clicked_url(over, simulation.graph(), &viewport), Some("/api/a"));

        assert!(interaction.pointer_down(over, &mut simulation, &viewport));
        interaction.pointer_move(over, Vec2::ZERO, &mut simulation, &mut viewport);
        assert_eq!(interaction.clicked_url(over, simulation.graph(), &viewport), None);
    }
}
