use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Squared distances are floored here so coincident nodes cannot blow up.
const MIN_DISTANCE_SQ: f32 = 1.0;

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_reach_sq: f32,
}

/// Deterministic unit direction for two nodes sitting on the same point.
pub(super) fn jitter_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn charge_between(
    point: Vec2,
    other: Vec2,
    charge: f32,
    alpha: f32,
    index: usize,
    other_index: usize,
) -> Vec2 {
    let mut delta = other - point;
    if delta.length_sq() < 1e-9 {
        delta = jitter_direction(index, other_index) * 1e-3;
    }
    let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
    delta * (charge * alpha / distance_sq)
}

/// Velocity change on `index` from every charge in the tree. Negative charges
/// repel; distant cells contribute their aggregate.
pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    theta: f32,
    alpha: f32,
    velocity: &mut Vec2,
) {
    if node.charge == 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *velocity += charge_between(
                point,
                positions[other_index],
                charges[other_index],
                alpha,
                index,
                other_index,
            );
        }
        return;
    }

    let delta = node.center_of_charge - point;
    let distance = delta.length_sq().max(MIN_DISTANCE_SQ).sqrt();
    let can_approximate =
        !node.bounds.contains(point) && (node.bounds.side_length() / distance) < theta;

    if can_approximate {
        *velocity += delta * (node.charge * alpha / (distance * distance));
        return;
    }

    for child in node.children() {
        accumulate_charge_for_node(child, index, positions, charges, theta, alpha, velocity);
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 1e-4 {
        delta / distance
    } else {
        jitter_direction(from, to)
    };

    // Heavier (larger) nodes give way less.
    let weight_from = radii[from] * radii[from];
    let weight_to = radii[to] * radii[to];
    let total = (weight_from + weight_to).max(f32::EPSILON);
    let push = direction * ((reach - distance) * params.strength);

    velocities[from] += push * (weight_to / total);
    velocities[to] -= push * (weight_from / total);
}

/// Pushes apart every pair whose padded circles overlap, pruning cell pairs
/// that are further apart than the largest possible reach.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_reach_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_overlap(from, to, positions, radii, params, velocities);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, positions, radii, params, velocities);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, velocities);
            for child_b in &children[offset + 1..] {
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, velocities,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, velocities);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, velocities);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_charge(index: usize, positions: &[Vec2], charges: &[f32]) -> Vec2 {
        let mut total = Vec2::ZERO;
        for other in 0..positions.len() {
            if other != index {
                total += charge_between(
                    positions[index],
                    positions[other],
                    charges[other],
                    1.0,
                    index,
                    other,
                );
            }
        }
        total
    }

    #[test]
    fn zero_theta_matches_brute_force() {
        let positions = (0..30)
            .map(|index| vec2((index * 37 % 101) as f32, (index * 53 % 89) as f32))
            .collect::<Vec<_>>();
        let charges = vec![-30.0; positions.len()];
        let tree = QuadNode::build(&positions, &charges).unwrap();

        for index in 0..positions.len() {
            let mut velocity = Vec2::ZERO;
            accumulate_charge_for_node(&tree, index, &positions, &charges, 0.0, 1.0, &mut velocity);
            let expected = brute_force_charge(index, &positions, &charges);
            assert!((velocity - expected).length() < 1e-3, "{velocity:?} vs {expected:?}");
        }
    }

    #[test]
    fn negative_charge_pushes_away() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let charges = vec![-50.0, -50.0];
        let tree = QuadNode::build(&positions, &charges).unwrap();

        let mut velocity = Vec2::ZERO;
        accumulate_charge_for_node(&tree, 0, &positions, &charges, 0.9, 1.0, &mut velocity);
        assert!(velocity.x < 0.0);
    }

    #[test]
    fn overlapping_circles_separate() {
        let positions = vec![vec2(0.0, 0.0), vec2(4.0, 0.0)];
        let radii = vec![5.0, 5.0];
        let tree = QuadNode::build(&positions, &[-1.0, -1.0]).unwrap();
        let mut velocities = vec![Vec2::ZERO; 2];

        accumulate_collision_pairs(
            &tree,
            &tree,
            true,
            &positions,
            &radii,
            CollisionParams {
                strength: 0.7,
                max_reach_sq: 100.0,
            },
            &mut velocities,
        );

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
    }
}
