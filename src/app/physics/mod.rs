mod forces;
mod quadtree;

use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};

use crate::graph::Graph;
use forces::{ChargeParams, accumulate_charge, apply_centering, apply_links};
use quadtree::ChargeCell;

const INITIAL_SPIRAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug)]
pub(crate) struct SimulationConfig {
    /// Many-body strength; negative values repel.
    pub charge: f32,
    pub rest_distance: f32,
    pub center_strength: f32,
    pub theta: f32,
    pub min_distance: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            charge: -300.0,
            rest_distance: 160.0,
            center_strength: 0.1,
            theta: 0.9,
            min_distance: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

struct PhysicsScratch {
    positions: Vec<Vec2>,
    degrees: Vec<usize>,
}

/// Owns the graph while it is laid out. Positions of free nodes are written
/// only by `tick`; a pinned node follows its pin until `unpin`.
pub(crate) struct Simulation {
    config: SimulationConfig,
    graph: Graph,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    ticks: u64,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub(crate) fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            graph: Graph::default(),
            center: Vec2::ZERO,
            alpha: 0.0,
            alpha_target: 0.0,
            running: false,
            ticks: 0,
            scratch: PhysicsScratch {
                positions: Vec::new(),
                degrees: Vec::new(),
            },
        }
    }

    /// Installs `graph`, replacing whatever was laid out before, and starts a
    /// fresh run from alpha 1.
    pub(crate) fn start(&mut self, graph: Graph, viewport_size: Vec2) {
        self.graph = graph;
        self.center = viewport_size * 0.5;
        self.ticks = 0;
        self.alpha_target = 0.0;
        self.scratch.degrees = self.graph.degrees();

        let center = self.center;
        for (index, node) in self.graph.nodes_mut().iter_mut().enumerate() {
            node.position = node
                .initial_position
                .unwrap_or_else(|| center + spiral_offset(index));
            node.velocity = Vec2::ZERO;
            node.pin = None;
        }

        if self.graph.is_empty() {
            self.alpha = 0.0;
            self.running = false;
            log::debug!("simulation started with an empty graph");
            return;
        }

        self.alpha = 1.0;
        self.running = true;
        log::debug!(
            "simulation started with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
    }

    /// Advances one step. Returns `false` without touching any position once
    /// the layout has settled or the simulation was stopped.
    pub(crate) fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let config = self.config;
        self.alpha += (self.alpha_target - self.alpha) * config.alpha_decay;
        let alpha = self.alpha;

        self.apply_link_force(alpha);
        self.apply_charge_force(alpha);
        apply_centering(self.graph.nodes_mut(), self.center, config.center_strength);
        self.integrate();

        self.ticks += 1;
        if self.alpha < config.alpha_min && self.alpha_target < config.alpha_min {
            self.running = false;
            log::debug!("layout settled after {} ticks", self.ticks);
        }
        true
    }

    fn apply_link_force(&mut self, alpha: f32) {
        let (nodes, edges) = self.graph.nodes_and_edges_mut();
        apply_links(
            nodes,
            edges,
            &self.scratch.degrees,
            self.config.rest_distance,
            alpha,
        );
    }

    fn apply_charge_force(&mut self, alpha: f32) {
        let params = ChargeParams {
            strength: self.config.charge * alpha,
            min_distance: self.config.min_distance.max(f32::EPSILON),
            theta: self.config.theta,
        };
        if params.strength == 0.0 {
            return;
        }

        let positions = &mut self.scratch.positions;
        positions.clear();
        positions.extend(self.graph.nodes().iter().map(|node| node.position));

        let Some(root) = ChargeCell::build(positions) else {
            log::warn!("skipping repulsion: node positions are not finite");
            return;
        };

        for (index, node) in self.graph.nodes_mut().iter_mut().enumerate() {
            accumulate_charge(&root, index, positions, params, &mut node.velocity);
        }
    }

    fn integrate(&mut self) {
        let friction = 1.0 - self.config.velocity_decay.clamp(0.0, 1.0);
        let center = self.center;
        for (index, node) in self.graph.nodes_mut().iter_mut().enumerate() {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity *= friction;
            node.position += node.velocity;

            if !node.position.is_finite() || !node.velocity.is_finite() {
                node.position = center + spiral_offset(index);
                node.velocity = Vec2::ZERO;
            }
        }
    }

    /// Raises the alpha target so motion resumes and keeps going while the
    /// target is held, e.g. for the duration of a drag.
    pub(crate) fn reheat(&mut self, strength: f32) {
        if self.graph.is_empty() {
            return;
        }
        self.alpha_target = strength.max(0.0);
        self.running = true;
    }

    /// Drops the alpha target back to zero; alpha then decays on its own.
    pub(crate) fn settle(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Raises alpha itself (not the target) to at least `alpha` and resumes,
    /// so the layout runs once more and cools down on its own.
    pub(crate) fn warm(&mut self, alpha: f32) {
        if self.graph.is_empty() {
            return;
        }
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
        self.running = true;
    }

    pub(crate) fn stop(&mut self) {
        self.alpha = 0.0;
        self.alpha_target = 0.0;
        self.running = false;
    }

    /// Fixes a node at `position`. Returns `false` for unknown ids.
    pub(crate) fn pin(&mut self, id: &str, position: Vec2) -> bool {
        let Some(index) = self.graph.index_of(id) else {
            return false;
        };
        if !position.is_finite() {
            return false;
        }

        let node = &mut self.graph.nodes_mut()[index];
        node.pin = Some(position);
        node.position = position;
        node.velocity = Vec2::ZERO;
        true
    }

    pub(crate) fn unpin(&mut self, id: &str) -> bool {
        let Some(index) = self.graph.index_of(id) else {
            return false;
        };
        let node = &mut self.graph.nodes_mut()[index];
        node.velocity = Vec2::ZERO;
        node.pin.take().is_some()
    }

    pub(crate) fn resize(&mut self, viewport_size: Vec2) {
        self.center = viewport_size * 0.5;
    }

    pub(crate) fn graph(&self) -> &Graph {
        &self.graph
    }

    pub(crate) fn config(&self) -> SimulationConfig {
        self.config
    }

    pub(crate) fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
    }

    pub(crate) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn is_pinned(&self, id: &str) -> bool {
        self.graph.node(id).is_some_and(|node| node.is_pinned())
    }
}

/// Phyllotaxis arrangement: evenly spread, deterministic, and never stacks
/// two nodes on the same point.
fn spiral_offset(index: usize) -> Vec2 {
    let radius = INITIAL_SPIRAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * PI * (3.0 - 5.0_f32.sqrt());
    vec2(radius * angle.cos(), radius * angle.sin())
}
