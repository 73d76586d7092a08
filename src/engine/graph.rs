use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, Pos2, Rect, Vec2};
use tracing::debug;

use crate::network::{NetworkSnapshot, RelationshipKind, UNASSIGNED_COMPANY_ID};

use super::config::SizingConfig;
use super::palette::company_color;
use super::sizing::{
    CompanyScale, RadiusBounds, company_radius, contact_radius, home_company_radius,
};

#[derive(Clone, Debug, PartialEq)]
pub struct CompanyInfo {
    pub id: String,
    pub name: String,
    pub employee_count: u32,
    pub industry: String,
    pub is_home: bool,
    pub color: Color32,
}

impl CompanyInfo {
    pub fn is_unassigned(&self) -> bool {
        self.id == UNASSIGNED_COMPANY_ID
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContactInfo {
    pub id: String,
    pub name: String,
    pub title: String,
    pub company_id: String,
    pub seniority: f32,
    pub influence: f32,
    pub is_home: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeDetail {
    Company(CompanyInfo),
    Contact(ContactInfo),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Company,
    Contact,
}

/// Identity of a node across rebuilds; company and contact ids live in
/// separate namespaces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub id: String,
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub detail: NodeDetail,
    pub position: Pos2,
    pub velocity: Vec2,
    pub radius: f32,
    pub pinned: Option<Pos2>,
    /// Employer index for contacts.
    pub company: Option<usize>,
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match &self.detail {
            NodeDetail::Company(company) => &company.id,
            NodeDetail::Contact(contact) => &contact.id,
        }
    }

    pub fn name(&self) -> &str {
        match &self.detail {
            NodeDetail::Company(company) => &company.name,
            NodeDetail::Contact(contact) => &contact.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.detail {
            NodeDetail::Company(_) => NodeKind::Company,
            NodeDetail::Contact(_) => NodeKind::Contact,
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey {
            kind: self.kind(),
            id: self.id().to_owned(),
        }
    }

    pub fn as_company(&self) -> Option<&CompanyInfo> {
        match &self.detail {
            NodeDetail::Company(company) => Some(company),
            NodeDetail::Contact(_) => None,
        }
    }

    pub fn as_contact(&self) -> Option<&ContactInfo> {
        match &self.detail {
            NodeDetail::Company(_) => None,
            NodeDetail::Contact(contact) => Some(contact),
        }
    }

    pub fn is_company(&self) -> bool {
        matches!(self.detail, NodeDetail::Company(_))
    }

    pub fn is_home(&self) -> bool {
        match &self.detail {
            NodeDetail::Company(company) => company.is_home,
            NodeDetail::Contact(contact) => contact.is_home,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmploymentEdge {
    pub contact: usize,
    pub company: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelationshipEdge {
    pub source: usize,
    pub target: usize,
    pub kind: RelationshipKind,
    pub strength: f32,
}

/// Flat node/edge arena rebuilt from each snapshot. Companies occupy the
/// leading indices, contacts follow.
#[derive(Clone, Debug, Default)]
pub struct NetworkGraph {
    pub nodes: Vec<GraphNode>,
    pub employment: Vec<EmploymentEdge>,
    /// Every valid relationship, regardless of any display filter.
    pub relationships: Vec<RelationshipEdge>,
    company_index: HashMap<String, usize>,
    contact_index: HashMap<String, usize>,
    contacts_by_company: Vec<Vec<usize>>,
    home_company: Option<usize>,
    home_contact: Option<usize>,
    company_count: usize,
    large: bool,
}

impl NetworkGraph {
    pub fn build(snapshot: &NetworkSnapshot, config: &SizingConfig, canvas: Vec2) -> Self {
        let mut graph = Self::default();

        for record in &snapshot.companies {
            if record.id.is_empty() || graph.company_index.contains_key(&record.id) {
                debug!(company = %record.id, "skipping duplicate or blank company id");
                continue;
            }

            let mut is_home = record.is_home;
            if is_home && graph.home_company.is_some() {
                debug!(company = %record.id, "demoting extra home company");
                is_home = false;
            }

            let index = graph.nodes.len();
            if is_home {
                graph.home_company = Some(index);
            }

            let color = company_color(
                snapshot.company_colors.get(&record.id).map(String::as_str),
                &record.industry,
                &record.id,
            );
            graph.company_index.insert(record.id.clone(), index);
            graph.nodes.push(GraphNode {
                detail: NodeDetail::Company(CompanyInfo {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    employee_count: record.employee_count.max(1),
                    industry: record.industry.clone(),
                    is_home,
                    color,
                }),
                position: Pos2::ZERO,
                velocity: Vec2::ZERO,
                radius: 0.0,
                pinned: None,
                company: None,
            });
        }
        graph.company_count = graph.nodes.len();

        for record in &snapshot.contacts {
            let Some(company) = record
                .company_id
                .as_deref()
                .and_then(|id| graph.company_index.get(id).copied())
            else {
                debug!(contact = %record.id, "dropping contact without a resolvable company");
                continue;
            };
            if record.id.is_empty() || graph.contact_index.contains_key(&record.id) {
                debug!(contact = %record.id, "skipping duplicate or blank contact id");
                continue;
            }

            let mut is_home = record.is_home;
            if is_home && graph.home_contact.is_some() {
                debug!(contact = %record.id, "demoting extra home contact");
                is_home = false;
            }

            let index = graph.nodes.len();
            if is_home {
                graph.home_contact = Some(index);
            }

            let company_id = graph.nodes[company].id().to_owned();
            graph.contact_index.insert(record.id.clone(), index);
            graph.nodes.push(GraphNode {
                detail: NodeDetail::Contact(ContactInfo {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    title: record.title.clone(),
                    company_id,
                    seniority: sanitize_score(record.seniority).min(10.0),
                    influence: sanitize_score(record.influence),
                    is_home,
                }),
                position: Pos2::ZERO,
                velocity: Vec2::ZERO,
                radius: 0.0,
                pinned: None,
                company: Some(company),
            });
            graph.employment.push(EmploymentEdge {
                contact: index,
                company,
            });
        }

        let mut seen_dangling = HashSet::new();
        for record in &snapshot.relationships {
            let source = graph.company_index.get(&record.source).copied();
            let target = graph.company_index.get(&record.target).copied();
            match (source, target) {
                (Some(source), Some(target)) if source != target => {
                    graph.relationships.push(RelationshipEdge {
                        source,
                        target,
                        kind: record.kind,
                        strength: if record.strength.is_finite() {
                            record.strength.clamp(0.0, 1.0)
                        } else {
                            0.0
                        },
                    });
                }
                _ => {
                    if seen_dangling.insert((record.source.as_str(), record.target.as_str())) {
                        debug!(
                            source = %record.source,
                            target = %record.target,
                            "dropping relationship with unknown or identical endpoints"
                        );
                    }
                }
            }
        }

        graph.contacts_by_company = vec![Vec::new(); graph.nodes.len()];
        for edge in &graph.employment {
            graph.contacts_by_company[edge.company].push(edge.contact);
        }

        graph.large = graph.nodes.len() > config.large_network_threshold;
        graph.assign_radii(config, canvas);
        graph
    }

    fn assign_radii(&mut self, config: &SizingConfig, canvas: Vec2) {
        let bounds = RadiusBounds::for_canvas(canvas, self.large, config);
        let scale = CompanyScale::from_sizes(
            self.nodes
                .iter()
                .filter_map(GraphNode::as_company)
                .filter(|company| !company.is_home)
                .map(|company| company.employee_count),
        );
        let max_influence = self
            .nodes
            .iter()
            .filter_map(GraphNode::as_contact)
            .map(|contact| contact.influence)
            .fold(0.0_f32, f32::max);

        let large = self.large;
        for node in &mut self.nodes {
            node.radius = match &node.detail {
                NodeDetail::Company(company) if company.is_home => {
                    home_company_radius(bounds, config)
                }
                NodeDetail::Company(company) => {
                    company_radius(company.employee_count, &scale, bounds, config)
                }
                NodeDetail::Contact(contact) => contact_radius(
                    contact.influence,
                    max_influence,
                    contact.is_home,
                    large,
                    config,
                ),
            };
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn company_count(&self) -> usize {
        self.company_count
    }

    pub fn contact_count(&self) -> usize {
        self.nodes.len() - self.company_count
    }

    pub fn is_large(&self) -> bool {
        self.large
    }

    pub fn company_index(&self, id: &str) -> Option<usize> {
        self.company_index.get(id).copied()
    }

    pub fn contact_index(&self, id: &str) -> Option<usize> {
        self.contact_index.get(id).copied()
    }

    pub fn home_company(&self) -> Option<usize> {
        self.home_company
    }

    pub fn home_contact(&self) -> Option<usize> {
        self.home_contact
    }

    pub fn contacts_of(&self, company: usize) -> &[usize] {
        self.contacts_by_company
            .get(company)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn company_indices(&self) -> std::ops::Range<usize> {
        0..self.company_count
    }

    pub fn contact_indices(&self) -> std::ops::Range<usize> {
        self.company_count..self.nodes.len()
    }

    /// Bounding box of node circles, or `None` when nothing has a finite
    /// position yet.
    pub fn bounds(&self, companies_only: bool) -> Option<Rect> {
        let range = if companies_only {
            self.company_indices()
        } else {
            0..self.nodes.len()
        };

        let mut bounds = Rect::NOTHING;
        for node in &self.nodes[range] {
            if !node.position.x.is_finite() || !node.position.y.is_finite() {
                continue;
            }
            bounds = bounds.union(Rect::from_center_size(
                node.position,
                Vec2::splat(node.radius.max(0.0) * 2.0),
            ));
        }

        (bounds.min.x <= bounds.max.x && bounds.min.y <= bounds.max.y).then_some(bounds)
    }
}

fn sanitize_score(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
