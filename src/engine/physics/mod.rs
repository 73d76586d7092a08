//! Force simulation over the network arena: charge repulsion through a
//! Barnes-Hut quadtree, contact-to-company springs, a weak pull toward the
//! canvas center and padded collision.

mod forces;
mod quadtree;

use eframe::egui::{Pos2, Vec2, vec2};
use tracing::debug;

use super::config::ForceConfig;
use super::graph::{NetworkGraph, NodeDetail};
use crate::util::stable_pair;
use forces::{CollisionParams, accumulate_charge_for_node, accumulate_collision_pairs};
use quadtree::QuadNode;

const GOLDEN_ANGLE: f32 = 2.399_963_2;

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    deltas: Vec<Vec2>,
    radii: Vec<f32>,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    contact: usize,
    company: usize,
    distance: f32,
    /// Share of the correction applied to the company end.
    bias: f32,
}

/// Iterative layout state. One instance per dataset; rebuilt alongside the
/// graph.
pub struct Simulation {
    config: ForceConfig,
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    center: Pos2,
    ticks: u64,
    charges: Vec<f32>,
    links: Vec<Link>,
    max_collision_radius: f32,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub fn new(config: &ForceConfig, graph: &NetworkGraph, center: Pos2) -> Self {
        let large = graph.is_large();
        let settle_ticks = if large {
            config.large_settle_ticks
        } else {
            config.settle_ticks
        }
        .max(1);
        let alpha_min = config.alpha_min.clamp(f32::EPSILON, 0.999);
        let alpha_decay = 1.0 - alpha_min.powf(1.0 / settle_ticks as f32);

        let charges = graph
            .nodes
            .iter()
            .map(|node| match &node.detail {
                NodeDetail::Company(_) => -node.radius * node.radius * config.company_charge_factor,
                NodeDetail::Contact(contact) if contact.is_home => config.home_contact_charge,
                NodeDetail::Contact(_) if large => config.large_contact_charge,
                NodeDetail::Contact(_) => config.contact_charge,
            })
            .collect::<Vec<_>>();

        let base_distance = if large {
            config.large_link_distance
        } else {
            config.link_distance
        };
        let links = graph
            .employment
            .iter()
            .map(|edge| {
                let company_degree = graph.contacts_of(edge.company).len() as f32;
                Link {
                    contact: edge.contact,
                    company: edge.company,
                    distance: graph.nodes[edge.company].radius + base_distance,
                    bias: 1.0 / (1.0 + company_degree.max(1.0)),
                }
            })
            .collect();

        let max_collision_radius = graph
            .nodes
            .iter()
            .map(|node| node.radius + config.collision_padding)
            .fold(0.0_f32, f32::max);

        Self {
            config: config.clone(),
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay,
            center,
            ticks: 0,
            charges,
            links,
            max_collision_radius,
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fresh energy, as after a rebuild.
    pub fn restart(&mut self) {
        self.alpha = 1.0;
        self.alpha_target = 0.0;
    }

    /// Keeps the simulation warm while something is dragged.
    pub fn reheat(&mut self) {
        self.alpha_target = self.config.reheat_target;
        self.alpha = self.alpha.max(self.config.reheat_target);
    }

    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min && self.alpha_target <= 0.0
    }

    /// Advances one tick. Returns false when the simulation was already
    /// settled and nothing moved.
    pub fn step(&mut self, graph: &mut NetworkGraph) -> bool {
        let node_count = graph.nodes.len();
        if node_count == 0 || self.is_settled() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.ticks += 1;
        let alpha = self.alpha;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.radii.clear();
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);
        for node in &graph.nodes {
            scratch.positions.push(node.position.to_vec2());
            scratch.radii.push(node.radius + self.config.collision_padding);
        }

        for link in &self.links {
            let contact = &graph.nodes[link.contact];
            let company = &graph.nodes[link.company];
            let mut delta = (company.position.to_vec2() + company.velocity)
                - (contact.position.to_vec2() + contact.velocity);
            if !delta.x.is_finite() || !delta.y.is_finite() {
                continue;
            }
            if delta.length_sq() < 1e-9 {
                delta = forces::jitter_direction(link.contact, link.company) * 1e-3;
            }
            let distance = delta.length();
            let correction =
                delta * ((distance - link.distance) / distance * alpha * self.config.link_strength);

            scratch.deltas[link.company] -= correction * link.bias;
            scratch.deltas[link.contact] += correction * (1.0 - link.bias);
        }

        if let Some(tree) = QuadNode::build(&scratch.positions, &self.charges) {
            for (index, delta) in scratch.deltas.iter_mut().enumerate() {
                if !scratch.positions[index].x.is_finite() || !scratch.positions[index].y.is_finite()
                {
                    continue;
                }
                accumulate_charge_for_node(
                    &tree,
                    index,
                    &scratch.positions,
                    &self.charges,
                    self.config.theta,
                    alpha,
                    delta,
                );
            }

            let reach = self.max_collision_radius * 2.0;
            if reach > 0.0 {
                accumulate_collision_pairs(
                    &tree,
                    &tree,
                    true,
                    &scratch.positions,
                    &scratch.radii,
                    CollisionParams {
                        strength: self.config.collision_strength,
                        max_reach_sq: reach * reach,
                    },
                    &mut scratch.deltas,
                );
            }
        }

        let center = self.center.to_vec2();
        let center_pull = self.config.center_strength * alpha;
        let keep = 1.0 - self.config.velocity_decay.clamp(0.0, 1.0);
        let mut reset = 0usize;
        for (node, delta) in graph.nodes.iter_mut().zip(&scratch.deltas) {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let position = node.position.to_vec2();
            let velocity = (node.velocity + *delta + (center - position) * center_pull) * keep;
            let next = position + velocity;
            if next.x.is_finite() && next.y.is_finite() {
                node.velocity = velocity;
                node.position = next.to_pos2();
            } else {
                node.velocity = Vec2::ZERO;
                node.position = self.center;
                reset += 1;
            }
        }

        if reset > 0 {
            debug!(reset, "reset non-finite node positions to the canvas center");
        }

        true
    }
}

/// Deterministic starting layout: companies on a phyllotaxis spiral around
/// `center`, contacts scattered around their employer by a per-id hash. The
/// home company (if any) is pinned at `center`.
pub fn seed_layout(graph: &mut NetworkGraph, config: &ForceConfig, center: Pos2) {
    let large = graph.is_large();
    let link_distance = if large {
        config.large_link_distance
    } else {
        config.link_distance
    };

    let company_count = graph.company_count().max(1);
    let average_radius = graph.nodes[graph.company_indices()]
        .iter()
        .map(|node| node.radius)
        .sum::<f32>()
        / company_count as f32;
    let spacing = (average_radius * 2.0 + link_distance).max(10.0);

    let home = graph.home_company();
    let mut ring = 0usize;
    for index in graph.company_indices() {
        let node = &mut graph.nodes[index];
        node.velocity = Vec2::ZERO;
        if Some(index) == home {
            node.position = center;
            node.pinned = Some(center);
            continue;
        }

        ring += 1;
        let (jx, jy) = stable_pair(node.id());
        let angle = ring as f32 * GOLDEN_ANGLE;
        let distance = spacing * (0.5 + ring as f32).sqrt();
        node.position = center + vec2(angle.cos(), angle.sin()) * distance + vec2(jx, jy);
        node.pinned = None;
    }

    for index in graph.contact_indices() {
        let Some(company) = graph.nodes[index].company else {
            continue;
        };
        let anchor = graph.nodes[company].position;
        let company_radius = graph.nodes[company].radius;

        let node = &mut graph.nodes[index];
        let (jx, jy) = stable_pair(node.id());
        let angle = jx * std::f32::consts::PI;
        let distance = company_radius + link_distance * (0.75 + 0.25 * jy);
        node.position = anchor + vec2(angle.cos(), angle.sin()) * distance;
        node.velocity = Vec2::ZERO;
        node.pinned = None;
    }
}
