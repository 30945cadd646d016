use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::ChargeCell;
use crate::graph::{Edge, Node};

const COINCIDENT_EPSILON: f32 = 1e-6;

/// Unit vector used when two bodies sit on the same point. Swapping the pair
/// flips the sign, so the two bodies are pushed apart instead of together.
pub(super) fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let (low, high, sign) = if from < to {
        (from, to, 1.0)
    } else {
        (to, from, -1.0)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214 + 0.11) * TAU;
    vec2(angle.cos(), angle.sin()) * sign
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) min_distance: f32,
    pub(super) theta: f32,
}

fn charge_between(point: Vec2, source: Vec2, weight: f32, params: ChargeParams, fallback: Vec2) -> Vec2 {
    let delta = source - point;
    let distance_sq = delta.length_sq();
    let (direction, distance) = if distance_sq > COINCIDENT_EPSILON * COINCIDENT_EPSILON {
        let distance = distance_sq.sqrt();
        (delta / distance, distance)
    } else {
        (fallback, 0.0)
    };
    direction * (params.strength * weight / distance.max(params.min_distance))
}

pub(super) fn accumulate_charge(
    cell: &ChargeCell,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if cell.weight <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.bodies {
            if other == index {
                continue;
            }
            *velocity += charge_between(
                point,
                positions[other],
                1.0,
                params,
                fallback_direction(index, other),
            );
        }
        return;
    }

    let distance = (cell.centroid - point).length().max(params.min_distance);
    let far_enough = !cell.bounds.contains(point)
        && cell.weight > 1.0
        && (cell.bounds.side_length() / distance) < params.theta;
    if far_enough {
        *velocity += charge_between(point, cell.centroid, cell.weight, params, Vec2::ZERO);
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, params, velocity);
    }
}

/// Springs pull each linked pair toward `rest_distance`. The correction is
/// weighted by degree so hubs move less than leaves.
pub(super) fn apply_links(
    nodes: &mut [Node],
    edges: &[Edge],
    degrees: &[usize],
    rest_distance: f32,
    alpha: f32,
) {
    for edge in edges {
        if edge.is_self_loop() {
            continue;
        }
        let (source, target) = edge.endpoints();

        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        let strength = 1.0 / source_degree.min(target_degree);
        let bias = source_degree / (source_degree + target_degree);

        let predicted_source = nodes[source].position + nodes[source].velocity;
        let predicted_target = nodes[target].position + nodes[target].velocity;
        let delta = predicted_target - predicted_source;
        let length = delta.length();
        let direction = if length > COINCIDENT_EPSILON {
            delta / length
        } else {
            fallback_direction(source, target)
        };

        let correction = direction * ((length - rest_distance) * alpha * strength);
        nodes[target].velocity -= correction * bias;
        nodes[source].velocity += correction * (1.0 - bias);
    }
}

/// Translates free nodes so the centroid of the whole set drifts toward
/// `center`.
pub(super) fn apply_centering(nodes: &mut [Node], center: Vec2, strength: f32) {
    if nodes.is_empty() || strength <= 0.0 {
        return;
    }

    let centroid = nodes
        .iter()
        .fold(Vec2::ZERO, |sum, node| sum + node.position)
        / nodes.len() as f32;
    let shift = (center - centroid) * strength.min(1.0);
    if shift.length_sq() <= f32::EPSILON {
        return;
    }

    for node in nodes.iter_mut().filter(|node| node.pin.is_none()) {
        node.position += shift;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Vec2, vec2};

    use super::{ChargeParams, accumulate_charge, fallback_direction};
    use crate::app::physics::quadtree::ChargeCell;

    const PARAMS: ChargeParams = ChargeParams {
        strength: -300.0,
        min_distance: 1.0,
        theta: 0.9,
    };

    #[test]
    fn fallback_direction_is_antisymmetric_unit_vector() {
        for (a, b) in [(0, 1), (3, 7), (12, 2)] {
            let forward = fallback_direction(a, b);
            let backward = fallback_direction(b, a);
            assert!((forward.length() - 1.0).abs() < 1e-5);
            assert!((forward + backward).length() < 1e-6);
        }
    }

    #[test]
    fn negative_charge_pushes_bodies_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let root = ChargeCell::build(&positions).expect("finite positions");

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_charge(&root, 0, &positions, PARAMS, &mut left);
        accumulate_charge(&root, 1, &positions, PARAMS, &mut right);

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
        assert!((left.x + 30.0).abs() < 1e-4);
        assert!((left + right).length() < 1e-4);
    }

    #[test]
    fn coincident_bodies_get_bounded_opposite_pushes() {
        let positions = vec![vec2(4.0, 4.0), vec2(4.0, 4.0)];
        let root = ChargeCell::build(&positions).expect("finite positions");

        let mut first = Vec2::ZERO;
        let mut second = Vec2::ZERO;
        accumulate_charge(&root, 0, &positions, PARAMS, &mut first);
        accumulate_charge(&root, 1, &positions, PARAMS, &mut second);

        assert!(first.is_finite() && second.is_finite());
        assert!((first.length() - 300.0).abs() < 1e-3);
        assert!((first + second).length() < 1e-3);
    }

    #[test]
    fn far_clusters_are_approximated_close_to_exact_sum() {
        let mut positions = vec![vec2(0.0, 0.0)];
        for index in 0..40 {
            positions.push(vec2(
                2000.0 + (index % 8) as f32 * 3.0,
                (index / 8) as f32 * 3.0,
            ));
        }
        let root = ChargeCell::build(&positions).expect("finite positions");

        let mut approximated = Vec2::ZERO;
        accumulate_charge(&root, 0, &positions, PARAMS, &mut approximated);

        let exact = positions[1..].iter().fold(Vec2::ZERO, |sum, other| {
            let delta = *other - positions[0];
            sum + delta.normalized() * (PARAMS.strength / delta.length())
        });

        assert!(approximated.x < 0.0);
        assert!((approximated - exact).length() / exact.length() < 0.05);
    }
}
