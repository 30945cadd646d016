use std::collections::VecDeque;
use std::path::PathBuf;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::graph::Graph;

use super::super::graph::interaction::InteractionController;
use super::super::graph::viewport::Viewport;
use super::super::physics::{Simulation, SimulationConfig};
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(source: PathBuf, graph: Graph, config: SimulationConfig) -> Self {
        log::info!(
            "graph ready: {} nodes, {} edges ({} dropped)",
            graph.node_count(),
            graph.edge_count(),
            graph.dropped_edges()
        );

        Self {
            source,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            dropped_edges: graph.dropped_edges(),
            pending_graph: Some(graph),
            simulation: Simulation::new(config),
            viewport: Viewport::default(),
            interaction: InteractionController::default(),
            live_physics: true,
            search: String::new(),
            search_match_cache: None,
            canvas_size: Vec2::ZERO,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        path_input: &mut String,
        load_requested: &mut bool,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("API Explorer");
                    ui.separator();
                    ui.label(format!("source: {}", self.source.display()));
                    ui.label(format!("nodes: {}", self.node_count));
                    ui.label(format!("edges: {}", self.edge_count));
                    if self.dropped_edges > 0 {
                        ui.label(format!("dropped edges: {}", self.dropped_edges))
                            .on_hover_text("Edges whose source or target id is not a node.");
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.simulation_status_text());
                        ui.label(self.fps_display_text());
                    });
                });
            });

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                *load_requested |= super::draw_source_picker(ui, path_input, is_loading);
                ui.separator();
                self.draw_controls(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading endpoint graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
