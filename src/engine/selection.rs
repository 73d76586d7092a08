//! Company selection, the highlight it implies, and the per-element render
//! state derived from toggles, filter and highlight.

use std::cmp::Ordering;
use std::collections::HashMap;

use eframe::egui::{Pos2, vec2};

use super::config::HighlightConfig;
use super::graph::NetworkGraph;
use super::options::{DisplayToggles, RelationshipFilter};
use crate::network::RelationshipKind;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    CompanySelected(String),
}

impl SelectionState {
    pub fn selected_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::CompanySelected(id) => Some(id),
        }
    }

    /// Clicking the selected company deselects it; any other company takes
    /// over the selection.
    pub fn click_company(&mut self, id: &str) {
        *self = match self {
            Self::CompanySelected(current) if current == id => Self::Idle,
            _ => Self::CompanySelected(id.to_owned()),
        };
    }
}

/// Derived data for one selected company.
#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    pub selected: usize,
    /// Companies linked to the selection, keyed to the kind of their
    /// strongest connecting edge.
    pub connected: HashMap<usize, RelationshipKind>,
    /// Ranked contacts of the selected company.
    pub key_players: Vec<usize>,
}

impl Highlight {
    /// Uses every relationship, filtered or not.
    pub fn compute(graph: &NetworkGraph, selected: usize, config: &HighlightConfig) -> Self {
        let mut strongest: HashMap<usize, (f32, RelationshipKind)> = HashMap::new();
        for edge in &graph.relationships {
            let other = if edge.source == selected {
                edge.target
            } else if edge.target == selected {
                edge.source
            } else {
                continue;
            };

            strongest
                .entry(other)
                .and_modify(|current| {
                    if edge.strength > current.0 {
                        *current = (edge.strength, edge.kind);
                    }
                })
                .or_insert((edge.strength, edge.kind));
        }

        Self {
            selected,
            connected: strongest
                .into_iter()
                .map(|(index, (_, kind))| (index, kind))
                .collect(),
            key_players: rank_key_players(graph, selected, config),
        }
    }

    pub fn involves(&self, company: usize) -> bool {
        company == self.selected || self.connected.contains_key(&company)
    }
}

/// Contacts of `company` with seniority at or above the threshold, by
/// seniority then influence (both descending), capped at the limit.
pub fn rank_key_players(
    graph: &NetworkGraph,
    company: usize,
    config: &HighlightConfig,
) -> Vec<usize> {
    let mut ranked = graph
        .contacts_of(company)
        .iter()
        .copied()
        .filter_map(|index| {
            let contact = graph.nodes[index].as_contact()?;
            (contact.seniority >= config.key_player_min_seniority).then_some((
                index,
                contact.seniority,
                contact.influence,
            ))
        })
        .collect::<Vec<_>>();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(config.key_player_limit);
    ranked.into_iter().map(|(index, _, _)| index).collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub visible: bool,
    pub label_visible: bool,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
    pub visible: bool,
    pub label_visible: bool,
    pub opacity: f32,
}

/// Visibility and opacity of every element, indexed like the graph arena.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderState {
    pub nodes: Vec<NodeStyle>,
    pub employment: Vec<EdgeStyle>,
    pub relationships: Vec<EdgeStyle>,
}

const FULL: f32 = 1.0;

/// Pure function of its inputs, so clearing the highlight gives back exactly
/// the state the toggles alone produce.
pub fn derive_render_state(
    graph: &NetworkGraph,
    toggles: &DisplayToggles,
    filter: &RelationshipFilter,
    highlight: Option<&Highlight>,
    config: &HighlightConfig,
) -> RenderState {
    let dimmed = config.dimmed_opacity.clamp(0.0, 1.0);
    let company_opacity = |company: usize| match highlight {
        Some(highlight) if !highlight.involves(company) => dimmed,
        _ => FULL,
    };
    let forced = |company: usize| highlight.is_some_and(|highlight| highlight.involves(company));

    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| match node.company {
            None => NodeStyle {
                visible: true,
                label_visible: toggles.company_text,
                opacity: company_opacity(index),
            },
            Some(company) => NodeStyle {
                visible: toggles.contact_dots || forced(company),
                label_visible: false,
                opacity: company_opacity(company),
            },
        })
        .collect();

    let employment = graph
        .employment
        .iter()
        .map(|edge| EdgeStyle {
            visible: toggles.contact_lines || forced(edge.company),
            label_visible: false,
            opacity: company_opacity(edge.company),
        })
        .collect();

    let relationships = graph
        .relationships
        .iter()
        .map(|edge| {
            let opacity = match highlight {
                Some(highlight)
                    if edge.source != highlight.selected && edge.target != highlight.selected =>
                {
                    dimmed
                }
                _ => FULL,
            };
            EdgeStyle {
                visible: filter.allows(edge.kind),
                label_visible: toggles.relationship_labels,
                opacity,
            }
        })
        .collect();

    RenderState {
        nodes,
        employment,
        relationships,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyPlayerAnnotation {
    pub contact: usize,
    pub center: Pos2,
    pub ring_radius: f32,
    pub label: String,
    pub label_position: Pos2,
}

/// Ring and label placement for the key players at their current positions.
pub fn annotate_key_players(
    graph: &NetworkGraph,
    highlight: &Highlight,
    config: &HighlightConfig,
) -> Vec<KeyPlayerAnnotation> {
    highlight
        .key_players
        .iter()
        .filter_map(|&index| {
            let node = graph.nodes.get(index)?;
            let contact = node.as_contact()?;
            let ring_radius = node.radius + config.ring_gap;
            let label = if contact.title.is_empty() {
                contact.name.clone()
            } else {
                format!("{} · {}", contact.name, contact.title)
            };
            Some(KeyPlayerAnnotation {
                contact: index,
                center: node.position,
                ring_radius,
                label,
                label_position: node.position + vec2(0.0, ring_radius + config.label_offset),
            })
        })
        .collect()
}
