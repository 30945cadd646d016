use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::graph::{Graph, load_graph_file};

mod graph;
mod physics;
mod render_utils;
mod ui;

use graph::interaction::InteractionController;
use graph::viewport::Viewport;
pub(crate) use physics::SimulationConfig;
use physics::Simulation;

type LoadResult = Result<Graph, String>;

pub struct ExplorerApp {
    path_input: String,
    config: SimulationConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Empty,
    Loading {
        path: PathBuf,
        rx: Receiver<LoadResult>,
    },
    Ready(Box<ViewModel>),
    Error {
        path: PathBuf,
        message: String,
    },
}

struct ViewModel {
    source: PathBuf,
    pending_graph: Option<Graph>,
    simulation: Simulation,
    viewport: Viewport,
    interaction: InteractionController,
    live_physics: bool,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    canvas_size: Vec2,
    node_count: usize,
    edge_count: usize,
    dropped_edges: usize,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

impl ExplorerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        graph_path: Option<PathBuf>,
        config: SimulationConfig,
    ) -> Self {
        let path_input = graph_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let state = match graph_path {
            Some(path) => Self::start_load(path),
            None => AppState::Empty,
        };

        Self {
            path_input,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph_file(&path)
                .and_then(|raw| Graph::from_raw(&raw).map_err(anyhow::Error::from))
                .map_err(|error| format!("{error:#}"));
            if let Err(message) = &result {
                log::error!("failed to load {}: {message}", path.display());
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(path: PathBuf) -> AppState {
        log::info!("loading graph from {}", path.display());
        AppState::Loading {
            rx: Self::spawn_load(path.clone()),
            path,
        }
    }

    fn requested_path(&self) -> Option<PathBuf> {
        let trimmed = self.path_input.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    fn show_placeholder(ctx: &Context, heading: &str, busy: bool) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.heading(heading);
                if busy {
                    ui.add_space(8.0);
                    ui.spinner();
                }
            });
        });
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut load_requested = false;

        let is_loading = matches!(self.state, AppState::Loading { .. }) || self.reload_rx.is_some();
        if !matches!(self.state, AppState::Ready(_)) {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| {
                    load_requested = ui::draw_source_picker(ui, &mut self.path_input, is_loading);
                });
        }

        match &mut self.state {
            AppState::Empty => {
                Self::show_placeholder(ctx, "Open a graph file to visualize", false);
            }
            AppState::Loading { path, rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(graph) => AppState::Ready(Box::new(ViewModel::new(
                                path.clone(),
                                graph,
                                self.config,
                            ))),
                            Err(message) => AppState::Error {
                                path: path.clone(),
                                message,
                            },
                        });
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error {
                            path: path.clone(),
                            message: "Background load worker disconnected".to_owned(),
                        });
                    }
                }

                Self::show_placeholder(ctx, "Loading endpoint graph...", true);
            }
            AppState::Error { path, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load endpoint graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(
                    ctx,
                    &mut self.path_input,
                    &mut load_requested,
                    &mut reload_requested,
                    is_loading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(model.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(
                                    model.source.clone(),
                                    graph,
                                    self.config,
                                ))),
                                Err(message) => AppState::Error {
                                    path: model.source.clone(),
                                    message,
                                },
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error {
                                path: model.source.clone(),
                                message: "Background load worker disconnected".to_owned(),
                            });
                        }
                    }
                }
            }
        }

        if load_requested && let Some(path) = self.requested_path() {
            transition = Some(Self::start_load(path));
        }

        if let Some(next_state) = transition {
            if let AppState::Ready(model) = &mut self.state {
                model.simulation.stop();
            }
            self.reload_rx = None;
            self.state = next_state;
        }

        if matches!(self.state, AppState::Loading { .. }) {
            ctx.request_repaint();
        }
    }
}
