//! Paths, arrow markers and label anchors for company-to-company
//! relationship edges. Edges sharing an unordered company pair fan out into
//! distinct quadratic curves.

use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2, vec2};

use super::config::RoutingConfig;
use super::graph::{NetworkGraph, RelationshipEdge};
use super::options::RelationshipFilter;

/// Text metrics source, so label boxes can be sized without a renderer.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Vec2;
}

/// Monospace approximation used when no renderer is around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedWidthMeasure {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self {
            char_width: 6.5,
            line_height: 12.0,
        }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn measure(&self, text: &str) -> Vec2 {
        vec2(text.chars().count() as f32 * self.char_width, self.line_height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowMarker {
    pub tip: Pos2,
    /// Unit vector the arrow points along.
    pub direction: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeRoute {
    pub start: Pos2,
    pub end: Pos2,
    /// Quadratic control point; `None` for a straight segment.
    pub control: Option<Pos2>,
    pub offset: f32,
    /// Unit direction of travel leaving `start`.
    pub start_tangent: Vec2,
    /// Unit direction of travel arriving at `end`.
    pub end_tangent: Vec2,
    pub label_anchor: Pos2,
}

impl EdgeRoute {
    pub fn is_curved(&self) -> bool {
        self.control.is_some()
    }

    pub fn point_at(&self, t: f32) -> Pos2 {
        match self.control {
            Some(control) => quadratic_point(self.start, control, self.end, t),
            None => self.start.lerp(self.end, t),
        }
    }

    /// Arrowhead at the target end, plus one at the source end for
    /// bidirectional kinds.
    pub fn markers(&self, bidirectional: bool) -> [Option<ArrowMarker>; 2] {
        let end = ArrowMarker {
            tip: self.end,
            direction: self.end_tangent,
        };
        let start = bidirectional.then_some(ArrowMarker {
            tip: self.start,
            direction: -self.start_tangent,
        });
        [Some(end), start]
    }

    pub fn label_box(&self, text_size: Vec2, config: &RoutingConfig) -> Rect {
        Rect::from_center_size(
            self.label_anchor,
            text_size + vec2(config.label_padding_x, config.label_padding_y) * 2.0,
        )
    }
}

fn quadratic_point(start: Pos2, control: Pos2, end: Pos2, t: f32) -> Pos2 {
    let u = 1.0 - t;
    (start.to_vec2() * (u * u) + control.to_vec2() * (2.0 * u * t) + end.to_vec2() * (t * t))
        .to_pos2()
}

/// Offsets `(i - (n - 1) / 2) * spacing` for every routed edge, keyed by
/// edge index. Edges rejected by `filter` get `None` and do not count toward
/// their pair.
pub fn pair_offsets(
    edges: &[RelationshipEdge],
    spacing: f32,
    mut filter: impl FnMut(&RelationshipEdge) -> bool,
) -> Vec<Option<f32>> {
    let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        if edge.source == edge.target || !filter(edge) {
            continue;
        }
        let key = (edge.source.min(edge.target), edge.source.max(edge.target));
        groups.entry(key).or_default().push(index);
    }

    let mut offsets = vec![None; edges.len()];
    for members in groups.values() {
        let middle = (members.len() as f32 - 1.0) * 0.5;
        for (slot, &edge) in members.iter().enumerate() {
            offsets[edge] = Some((slot as f32 - middle) * spacing);
        }
    }
    offsets
}

/// Route for one edge between two circles. `None` when the endpoints
/// coincide or are not finite.
pub fn route_edge(
    source: Pos2,
    source_radius: f32,
    target: Pos2,
    target_radius: f32,
    canonical_forward: bool,
    offset: f32,
    config: &RoutingConfig,
) -> Option<EdgeRoute> {
    let delta = target - source;
    let distance = delta.length();
    if !distance.is_finite() || distance <= f32::EPSILON {
        return None;
    }

    let direction = delta / distance;
    // Perpendicular of the lower-index to higher-index direction, so the
    // sign of `offset` alone decides which side a curve bulges to.
    let canonical = if canonical_forward {
        direction
    } else {
        -direction
    };
    let normal = vec2(-canonical.y, canonical.x);
    let source_trim = source_radius + config.endpoint_padding;
    let target_trim = target_radius + config.endpoint_padding;

    if offset == 0.0 {
        let start = source + direction * source_trim;
        let end = target - direction * target_trim;
        let label_anchor = start.lerp(end, 0.5) + normal * config.label_nudge;
        return Some(EdgeRoute {
            start,
            end,
            control: None,
            offset,
            start_tangent: direction,
            end_tangent: direction,
            label_anchor,
        });
    }

    let control = source.lerp(target, 0.5) + normal * (offset * distance);
    let start_tangent = (control - source).normalized();
    let end_tangent = (target - control).normalized();
    let start = source + start_tangent * source_trim;
    let end = target - end_tangent * target_trim;
    let middle = quadratic_point(start, control, end, 0.5);
    let label_anchor = middle + normal * (config.label_nudge * offset.signum());

    Some(EdgeRoute {
        start,
        end,
        control: Some(control),
        offset,
        start_tangent,
        end_tangent,
        label_anchor,
    })
}

/// Per-edge routes and cached label metrics for the current dataset.
#[derive(Debug, Default)]
pub struct EdgeRouter {
    config: RoutingConfig,
    offsets: Vec<Option<f32>>,
    label_sizes: Vec<Option<Vec2>>,
    routes: Vec<Option<EdgeRoute>>,
}

impl EdgeRouter {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            config: config.clone(),
            ..Self::default()
        }
    }

    /// Regroups edges after a rebuild or a filter change. Cached label sizes
    /// survive filter changes but not rebuilds.
    pub fn assign(&mut self, graph: &NetworkGraph, filter: &RelationshipFilter) {
        self.offsets = pair_offsets(&graph.relationships, self.config.curve_spacing, |edge| {
            filter.allows(edge.kind)
        });
        self.label_sizes.resize(graph.relationships.len(), None);
        self.routes.clear();
        self.routes.resize(graph.relationships.len(), None);
    }

    pub fn reset(&mut self) {
        self.offsets.clear();
        self.label_sizes.clear();
        self.routes.clear();
    }

    pub fn update(&mut self, graph: &NetworkGraph) {
        self.routes.resize(graph.relationships.len(), None);
        for ((route, offset), edge) in self
            .routes
            .iter_mut()
            .zip(&self.offsets)
            .zip(&graph.relationships)
        {
            *route = offset.and_then(|offset| {
                let source = &graph.nodes[edge.source];
                let target = &graph.nodes[edge.target];
                route_edge(
                    source.position,
                    source.radius,
                    target.position,
                    target.radius,
                    edge.source < edge.target,
                    offset,
                    &self.config,
                )
            });
        }
    }

    /// Measures each edge label once; later calls only fill gaps.
    pub fn measure_labels(&mut self, graph: &NetworkGraph, measure: &dyn TextMeasure) {
        self.label_sizes.resize(graph.relationships.len(), None);
        for (size, edge) in self.label_sizes.iter_mut().zip(&graph.relationships) {
            if size.is_none() {
                *size = Some(measure.measure(edge.kind.label()));
            }
        }
    }

    pub fn route(&self, edge: usize) -> Option<&EdgeRoute> {
        self.routes.get(edge).and_then(Option::as_ref)
    }

    pub fn offset(&self, edge: usize) -> Option<f32> {
        self.offsets.get(edge).copied().flatten()
    }

    pub fn label_size(&self, edge: usize) -> Option<Vec2> {
        self.label_sizes.get(edge).copied().flatten()
    }

    pub fn label_box(&self, edge: usize) -> Option<Rect> {
        let route = self.route(edge)?;
        let size = self.label_size(edge)?;
        Some(route.label_box(size, &self.config))
    }

    pub fn routes(&self) -> impl Iterator<Item = (usize, &EdgeRoute)> {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(index, route)| route.as_ref().map(|route| (index, route)))
    }
}
