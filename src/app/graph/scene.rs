use eframe::egui::{Pos2, Rect, Vec2, vec2};

use crate::graph::{Graph, Node};
use crate::util::short_url;

use super::viewport::Viewport;

/// Size of a node box in layout units; boxes are centered on the node.
pub(crate) const NODE_SIZE: Vec2 = vec2(160.0, 100.0);

pub(crate) struct EdgeLine {
    pub from: Pos2,
    pub to: Pos2,
    pub self_loop: bool,
}

pub(crate) struct NodeBox<'a> {
    pub index: usize,
    pub id: &'a str,
    pub rect: Rect,
    pub headline: &'a str,
    pub detail: String,
    pub pinned: bool,
}

/// One frame worth of geometry in screen space. Built from scratch on every
/// call; nothing is carried over between frames.
pub(crate) struct Scene<'a> {
    pub edges: Vec<EdgeLine>,
    pub nodes: Vec<NodeBox<'a>>,
    pub scale: f32,
}

pub(crate) fn node_headline(node: &Node) -> &str {
    node.metadata_str("snippet")
        .or(node.label.as_deref())
        .unwrap_or(&node.id)
}

pub(crate) fn node_detail(node: &Node) -> String {
    let method = node.metadata_str("method");
    let url = node.metadata_str("url").map(short_url);
    match (method, url) {
        (Some(method), Some(url)) => format!("{} {url}", method.to_ascii_uppercase()),
        (Some(method), None) => method.to_ascii_uppercase(),
        (None, Some(url)) => url,
        (None, None) => String::new(),
    }
}

fn node_rect(viewport: &Viewport, origin: Pos2, position: Vec2) -> Rect {
    let center = origin + viewport.to_screen(position).to_vec2();
    Rect::from_center_size(center, NODE_SIZE * viewport.scale())
}

pub(crate) fn build_scene<'a>(graph: &'a Graph, viewport: &Viewport, origin: Pos2) -> Scene<'a> {
    let nodes = graph.nodes();
    let to_screen = |position: Vec2| origin + viewport.to_screen(position).to_vec2();

    let edges = graph
        .edges()
        .iter()
        .map(|edge| {
            let (source, target) = edge.endpoints();
            EdgeLine {
                from: to_screen(nodes[source].position()),
                to: to_screen(nodes[target].position()),
                self_loop: edge.is_self_loop(),
            }
        })
        .collect();

    let nodes = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| NodeBox {
            index,
            id: &node.id,
            rect: node_rect(viewport, origin, node.position()),
            headline: node_headline(node),
            detail: node_detail(node),
            pinned: node.is_pinned(),
        })
        .collect();

    Scene {
        edges,
        nodes,
        scale: viewport.scale(),
    }
}

/// Topmost node whose box contains `world`. Later nodes are drawn on top, so
/// the search runs back to front.
pub(crate) fn node_at(graph: &Graph, world: Vec2) -> Option<usize> {
    let half = NODE_SIZE * 0.5;
    graph
        .nodes()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, node)| {
            let offset = world - node.position();
            offset.x.abs() <= half.x && offset.y.abs() <= half.y
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Pos2, pos2, vec2};
    use serde_json::json;

    use super::{NODE_SIZE, build_scene, node_at, node_detail, node_headline};
    use crate::app::graph::viewport::Viewport;
    use crate::graph::Graph;
    use crate::graph::tests::{chain, raw_edge, raw_node};

    fn placed_graph() -> Graph {
        let mut left = raw_node("left");
        left.x = Some(0.0);
        left.y = Some(0.0);
        let mut right = raw_node("right");
        right.x = Some(100.0);
        right.y = Some(0.0);
        Graph::build(&[left, right], &[raw_edge("left", "right")]).expect("valid")
    }

    #[test]
    fn empty_graph_renders_empty_scene() {
        let graph = Graph::default();
        let scene = build_scene(&graph, &Viewport::default(), Pos2::ZERO);
        assert!(scene.nodes.is_empty());
        assert!(scene.edges.is_empty());
    }

    #[test]
    fn scene_follows_viewport_transform() {
        let graph = placed_graph();
        let mut viewport = Viewport::default();
        viewport.zoom_by(2.0, pos2(0.0, 0.0));
        viewport.pan_by(vec2(10.0, 20.0));

        let scene = build_scene(&graph, &viewport, pos2(5.0, 5.0));
        assert_eq!(scene.edges.len(), 1);
        assert_eq!(scene.edges[0].from, pos2(15.0, 25.0));
        assert_eq!(scene.edges[0].to, pos2(215.0, 25.0));
        assert_eq!(scene.nodes[1].rect.center(), pos2(215.0, 25.0));
        assert_eq!(scene.nodes[1].rect.size(), NODE_SIZE * 2.0);
        assert_eq!(scene.scale, 2.0);
    }

    #[test]
    fn building_twice_is_identical_and_leaves_graph_untouched() {
        let graph = chain(&["a", "b", "c"]);
        let before = graph
            .nodes()
            .iter()
            .map(|node| node.position())
            .collect::<Vec<_>>();

        let first = build_scene(&graph, &Viewport::default(), Pos2::ZERO);
        let second = build_scene(&graph, &Viewport::default(), Pos2::ZERO);
        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!(a.rect, b.rect);
            assert_eq!(a.headline, b.headline);
        }

        let after = graph
            .nodes()
            .iter()
            .map(|node| node.position())
            .collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn labels_prefer_snippet_then_label_then_id() {
        let mut snippet = raw_node("s");
        snippet.label = Some("Label".into());
        snippet.metadata.insert("snippet".into(), json!("axios.get(url)"));
        snippet.metadata.insert("method".into(), json!("get"));
        snippet
            .metadata
            .insert("url".into(), json!("https://api.example.com/v1/users/{id}/orders"));
        let mut labelled = raw_node("l");
        labelled.label = Some("Label".into());
        let bare = raw_node("bare");

        let graph = Graph::build(&[snippet, labelled, bare], &[]).expect("valid");
        let nodes = graph.nodes();
        assert_eq!(node_headline(&nodes[0]), "axios.get(url)");
        assert_eq!(node_detail(&nodes[0]), "GET api.example.com/v1/use…");
        assert_eq!(node_headline(&nodes[1]), "Label");
        assert_eq!(node_headline(&nodes[2]), "bare");
        assert_eq!(node_detail(&nodes[2]), "");
    }

    #[test]
    fn hit_test_prefers_topmost_box() {
        let graph = placed_graph();
        assert_eq!(node_at(&graph, vec2(0.0, 0.0)), Some(0));
        assert_eq!(node_at(&graph, vec2(60.0, 10.0)), Some(1));
        assert_eq!(node_at(&graph, vec2(-79.0, 49.0)), Some(0));
        assert_eq!(node_at(&graph, vec2(50.0, 60.0)), None);
        assert_eq!(node_at(&graph, vec2(300.0, 0.0)), None);
    }
}
