//! Overview projection of company positions and the main viewport.

use eframe::egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};

use super::config::MinimapConfig;
use super::graph::NetworkGraph;
use super::palette::{HOME_COLOR, VOID_COLOR, relationship_color, with_opacity};
use super::selection::Highlight;

/// Aspect-preserving world-to-minimap map, centered inside the padded
/// minimap area. Minimap coordinates are local, with the origin at the
/// minimap's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapProjector {
    world_center: Pos2,
    local_center: Pos2,
    scale: f32,
}

impl MinimapProjector {
    pub fn fit(world: Rect, size: Vec2, padding: f32) -> Option<Self> {
        if !world.is_finite() || !size.is_finite() {
            return None;
        }

        let inner = (size - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));
        let width = world.width().max(1.0);
        let height = world.height().max(1.0);
        let scale = (inner.x / width).min(inner.y / height);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        Some(Self {
            world_center: world.center(),
            local_center: (size * 0.5).to_pos2(),
            scale,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_minimap(&self, world: Pos2) -> Pos2 {
        self.local_center + (world - self.world_center) * self.scale
    }

    pub fn to_world(&self, local: Pos2) -> Pos2 {
        self.world_center + (local - self.local_center) / self.scale
    }

    pub fn project_rect(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.to_minimap(world.min), self.to_minimap(world.max))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinimapMarker {
    Company,
    Home,
    /// The collaborator's bucket for contacts without an employer.
    Void,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapDot {
    pub node: usize,
    pub position: Pos2,
    pub radius: f32,
    pub color: Color32,
    pub marker: MinimapMarker,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinimapFrame {
    pub size: Vec2,
    pub projector: MinimapProjector,
    pub dots: Vec<MinimapDot>,
    /// Main viewport in minimap coordinates.
    pub viewport: Rect,
}

impl MinimapFrame {
    pub fn dot(&self, node: usize) -> Option<&MinimapDot> {
        self.dots.iter().find(|dot| dot.node == node)
    }
}

/// Projects company positions and the visible world rect. `None` when no
/// company has a finite position.
pub fn build_frame(
    graph: &NetworkGraph,
    highlight: Option<&Highlight>,
    visible_world: Rect,
    config: &MinimapConfig,
) -> Option<MinimapFrame> {
    let bounds = graph.bounds(true)?;
    let size = vec2(config.width, config.height);
    let projector = MinimapProjector::fit(bounds, size, config.padding)?;

    let mut dots = Vec::with_capacity(graph.company_count());
    for index in graph.company_indices() {
        let node = &graph.nodes[index];
        let Some(company) = node.as_company() else {
            continue;
        };
        if !node.position.x.is_finite() || !node.position.y.is_finite() {
            continue;
        }

        let (marker, base_color, radius) = if company.is_home {
            (MinimapMarker::Home, HOME_COLOR, config.home_radius)
        } else if company.is_unassigned() {
            (MinimapMarker::Void, VOID_COLOR, config.dot_radius)
        } else {
            (MinimapMarker::Company, company.color, config.dot_radius)
        };

        let color = match highlight {
            None => base_color,
            Some(highlight) if highlight.selected == index => base_color,
            Some(highlight) => match highlight.connected.get(&index) {
                Some(kind) => relationship_color(*kind),
                None => with_opacity(base_color, config.dimmed_opacity),
            },
        };

        dots.push(MinimapDot {
            node: index,
            position: projector.to_minimap(node.position),
            radius,
            color,
            marker,
        });
    }

    let viewport = if visible_world.is_finite() {
        projector.project_rect(visible_world)
    } else {
        Rect::from_min_size(pos2(0.0, 0.0), size)
    };

    Some(MinimapFrame {
        size,
        projector,
        dots,
        viewport,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{HighlightConfig, SizingConfig};
    use crate::engine::graph::tests::{company, relationship};
    use crate::network::{NetworkSnapshot, RelationshipKind, UNASSIGNED_COMPANY_ID};

    fn bucketed_graph() -> NetworkGraph {
        let mut home = company("home", 200);
        home.is_home = true;
        let snapshot = NetworkSnapshot {
            companies: vec![
                home,
                company("partner", 80),
                company(UNASSIGNED_COMPANY_ID, 1),
            ],
            relationships: vec![relationship("home", "partner", RelationshipKind::Partner)],
            ..Default::default()
        };
        let mut graph = NetworkGraph::build(&snapshot, &SizingConfig::default(), vec2(1200.0, 800.0));
        for (offset, index) in graph.company_indices().enumerate() {
            graph.nodes[index].position = pos2(offset as f32 * 150.0, offset as f32 * 40.0);
        }
        graph
    }

    fn frame_for(graph: &NetworkGraph, highlight: Option<&Highlight>) -> MinimapFrame {
        build_frame(
            graph,
            highlight,
            Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0)),
            &MinimapConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn projection_round_trips_and_preserves_aspect() {
        let world = Rect::from_min_max(pos2(-500.0, -100.0), pos2(500.0, 100.0));
        let projector = MinimapProjector::fit(world, vec2(200.0, 140.0), 8.0).unwrap();

        let local = projector.to_minimap(pos2(250.0, 50.0));
        let back = projector.to_world(local);
        assert!((back - pos2(250.0, 50.0)).length() < 1e-3);

        let projected = projector.project_rect(world);
        assert!((projected.width() - 184.0).abs() < 1e-3);
        assert!((projected.center() - pos2(100.0, 70.0)).length() < 1e-3);
    }

    #[test]
    fn degenerate_bounds_still_project() {
        let world = Rect::from_min_max(pos2(3.0, 3.0), pos2(3.0, 3.0));
        let projector = MinimapProjector::fit(world, vec2(200.0, 140.0), 8.0).unwrap();
        assert_eq!(projector.to_minimap(pos2(3.0, 3.0)), pos2(100.0, 70.0));
    }

    #[test]
    fn empty_graph_has_no_frame() {
        let graph = NetworkGraph::default();
        let frame = build_frame(
            &graph,
            None,
            Rect::from_min_size(Pos2::ZERO, vec2(10.0, 10.0)),
            &MinimapConfig::default(),
        );
        assert!(frame.is_none());
    }

    #[test]
    fn home_and_unassigned_companies_get_their_own_markers() {
        let graph = bucketed_graph();
        let config = MinimapConfig::default();
        let home = graph.home_company().unwrap();
        let partner = graph.company_index("partner").unwrap();
        let bucket = graph.company_index(UNASSIGNED_COMPANY_ID).unwrap();

        let frame = frame_for(&graph, None);
        let home_dot = frame.dot(home).unwrap();
        assert_eq!(home_dot.marker, MinimapMarker::Home);
        assert_eq!(home_dot.color, HOME_COLOR);
        assert_eq!(home_dot.radius, config.home_radius);

        let bucket_dot = frame.dot(bucket).unwrap();
        assert_eq!(bucket_dot.marker, MinimapMarker::Void);
        assert_eq!(bucket_dot.color, VOID_COLOR);
        assert_eq!(bucket_dot.radius, config.dot_radius);

        let partner_dot = frame.dot(partner).unwrap();
        assert_eq!(partner_dot.marker, MinimapMarker::Company);
        assert_eq!(partner_dot.color, graph.nodes[partner].as_company().unwrap().color);
    }

    #[test]
    fn highlight_recolors_dots_but_keeps_markers() {
        let graph = bucketed_graph();
        let config = MinimapConfig::default();
        let home = graph.home_company().unwrap();
        let partner = graph.company_index("partner").unwrap();
        let bucket = graph.company_index(UNASSIGNED_COMPANY_ID).unwrap();
        let highlight = Highlight::compute(&graph, home, &HighlightConfig::default());

        let frame = frame_for(&graph, Some(&highlight));
        let home_dot = frame.dot(home).unwrap();
        assert_eq!(home_dot.marker, MinimapMarker::Home);
        assert_eq!(home_dot.color, HOME_COLOR);

        let partner_dot = frame.dot(partner).unwrap();
        assert_eq!(partner_dot.color, relationship_color(RelationshipKind::Partner));

        let bucket_dot = frame.dot(bucket).unwrap();
        assert_eq!(bucket_dot.marker, MinimapMarker::Void);
        assert_eq!(bucket_dot.color, with_opacity(VOID_COLOR, config.dimmed_opacity));
    }
}
