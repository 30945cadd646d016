use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, PointerButton, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    EDGE_COLOR, NodeEmphasis, draw_background, edge_visible, paint_edge, paint_empty_hint,
    paint_node, paint_tooltip,
};
use super::super::{SearchMatchCache, ViewModel};
use super::interaction::{Gesture, InteractionController};
use super::scene::{NODE_SIZE, build_scene, node_detail, node_headline};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .simulation
            .graph()
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                [node_headline(node), node_detail(node).as_str(), node.id.as_str()]
                    .iter()
                    .any(|text| fuzzy_match_score(&matcher, text, query).is_some())
            })
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    /// Starts the layout on the first frame the canvas has a size, and keeps
    /// the centering target on the canvas middle afterwards.
    fn sync_canvas(&mut self, rect: Rect) {
        let size = rect.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }

        if let Some(graph) = self.pending_graph.take() {
            self.simulation.start(graph, size);
            self.canvas_size = size;
            return;
        }

        if size != self.canvas_size {
            self.simulation.resize(size);
            self.canvas_size = size;
        }
    }

    fn handle_canvas_input(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let local = |pos: Pos2| Pos2::ZERO + (pos - rect.min);

        if response.clicked_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(url) =
                self.interaction
                    .clicked_url(local(pointer), self.simulation.graph(), &self.viewport)
        {
            log::info!("opening {url}");
            ui.ctx().open_url(egui::OpenUrl::new_tab(url));
        }

        if response.drag_started_by(PointerButton::Primary) {
            let press = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(press) = press {
                self.interaction
                    .pointer_down(local(press), &mut self.simulation, &self.viewport);
            }
        }

        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.interaction.pointer_move(
                local(pointer),
                response.drag_delta(),
                &mut self.simulation,
                &mut self.viewport,
            );
        }

        if response.drag_stopped() {
            self.interaction.pointer_up(&mut self.simulation);
        }

        if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle) {
            self.viewport.pan_by(response.drag_delta());
        }

        if response.hovered() {
            let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
            let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15) * pinch;
            if (factor - 1.0).abs() > f32::EPSILON {
                let focal = response
                    .hover_pos()
                    .map(local)
                    .unwrap_or_else(|| Pos2::ZERO + rect.size() * 0.5);
                InteractionController::zoom(factor, focal, &mut self.viewport);
            }
        }

        if !response.dragged() {
            self.interaction.hover(
                response.hover_pos().map(local),
                self.simulation.graph(),
                &self.viewport,
            );
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.sync_canvas(rect);
        draw_background(&painter, rect, self.viewport.translation(), self.viewport.scale());

        if self.pending_graph.is_some() {
            return;
        }
        if self.simulation.graph().is_empty() {
            paint_empty_hint(&painter, rect);
            return;
        }

        self.handle_canvas_input(ui, rect, &response);

        let mut moving = false;
        if self.live_physics {
            moving = self.simulation.tick();
        }
        let dragging = self.interaction.dragged_id().is_some();
        if moving || dragging {
            ui.ctx().request_repaint();
        }

        let search_matches = self.cached_search_matches();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let graph = self.simulation.graph();
        let scene = build_scene(graph, &self.viewport, rect.min);

        for edge in &scene.edges {
            if edge.self_loop {
                let radius = 14.0 * scene.scale;
                let top = edge.from - vec2(0.0, NODE_SIZE.y * 0.5 * scene.scale + radius);
                if rect.expand(radius).contains(top) {
                    painter.circle_stroke(top, radius, Stroke::new(1.2, EDGE_COLOR));
                }
                continue;
            }
            if edge_visible(rect, edge.from, edge.to, 2.5) {
                paint_edge(&painter, edge.from, edge.to, scene.scale);
            }
        }

        let hovered = self.interaction.hovered_id();
        for node in &scene.nodes {
            if !node.rect.intersects(rect) {
                continue;
            }

            let search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&node.index));
            let emphasis = NodeEmphasis {
                hovered: hovered == Some(node.id),
                search_match,
                dimmed: search_active && !search_match,
            };
            paint_node(&painter, node, scene.scale, emphasis);
        }

        if let Some(tooltip) = self.interaction.tooltip(graph) {
            paint_tooltip(&painter, rect, &tooltip);
        }

        let cursor = match self.interaction.gesture() {
            Gesture::DraggingNode { .. } => Some(egui::CursorIcon::Grabbing),
            Gesture::Idle if hovered.is_some() => Some(egui::CursorIcon::Grab),
            _ => None,
        };
        if let Some(cursor) = cursor {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }
    }
}
