//! Viewport culling and zoom-dependent stroke sizes.

use eframe::egui::{Pos2, Rect};

use super::camera::ViewTransform;
use super::config::LodConfig;
use super::graph::GraphNode;

/// World rect covered by `viewport`, grown by `margin` world units.
pub fn visible_world_rect(transform: ViewTransform, viewport: Rect, margin: f32) -> Rect {
    transform.invert_rect(viewport).expand(margin.max(0.0))
}

/// Whether any part of the circle can touch `rect`.
pub fn circle_in_view(center: Pos2, radius: f32, rect: Rect) -> bool {
    if !center.x.is_finite() || !center.y.is_finite() {
        return false;
    }
    let radius = radius.max(0.0);
    let nearest = rect.clamp(center);
    nearest.distance_sq(center) <= radius * radius
}

/// Writes one hidden flag per node. Nodes stay in the arena either way.
pub fn cull_nodes(nodes: &[GraphNode], rect: Rect, hidden: &mut Vec<bool>) -> usize {
    hidden.clear();
    hidden.reserve(nodes.len());
    let mut visible = 0;
    for node in nodes {
        let in_view = circle_in_view(node.position, node.radius, rect);
        if in_view {
            visible += 1;
        }
        hidden.push(!in_view);
    }
    visible
}

/// Divisor for stroke widths and marker sizes, so lines keep a readable
/// on-screen weight across zoom levels.
pub fn stroke_scale(k: f32) -> f32 {
    if k.is_finite() && k > 0.0 {
        1.0 / k.sqrt()
    } else {
        1.0
    }
}

/// Stroke and marker sizes in world units for the current zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSizes {
    pub employment: f32,
    pub relationship: f32,
    pub marker: f32,
    pub ring: f32,
}

impl StrokeSizes {
    pub fn for_zoom(k: f32, config: &LodConfig) -> Self {
        let scale = stroke_scale(k);
        Self {
            employment: config.employment_width * scale,
            relationship: config.relationship_width * scale,
            marker: config.marker_size * scale,
            ring: config.ring_width * scale,
        }
    }
}

pub fn show_company_text(k: f32, config: &LodConfig) -> bool {
    k >= config.label_min_zoom
}

/// Collapses any number of culling requests between two frames into one
/// pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct CullScheduler {
    pending: bool,
}

impl CullScheduler {
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// True once per batch of requests.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Hidden flags plus the rect they were computed against.
#[derive(Clone, Debug, Default)]
pub struct CullState {
    pub hidden: Vec<bool>,
    pub rect: Option<Rect>,
    pub visible_count: usize,
}

impl CullState {
    pub fn update(&mut self, nodes: &[GraphNode], rect: Rect) {
        self.visible_count = cull_nodes(nodes, rect, &mut self.hidden);
        self.rect = Some(rect);
    }

    pub fn clear(&mut self) {
        self.hidden.clear();
        self.rect = None;
        self.visible_count = 0;
    }

    /// Unknown indices count as visible until the first pass runs.
    pub fn is_hidden(&self, index: usize) -> bool {
        self.hidden.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn circle_overlapping_edge_is_visible() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(circle_in_view(pos2(105.0, 50.0), 6.0, rect));
        assert!(!circle_in_view(pos2(120.0, 50.0), 6.0, rect));
        assert!(!circle_in_view(pos2(f32::NAN, 50.0), 6.0, rect));
    }

    #[test]
    fn strokes_thin_out_as_zoom_grows() {
        let config = LodConfig::default();
        let near = StrokeSizes::for_zoom(4.0, &config);
        let far = StrokeSizes::for_zoom(0.25, &config);
        assert!(near.relationship < far.relationship);
        assert_eq!(StrokeSizes::for_zoom(1.0, &config).marker, config.marker_size);
    }

    #[test]
    fn scheduler_coalesces_requests() {
        let mut scheduler = CullScheduler::default();
        scheduler.request();
        scheduler.request();
        scheduler.request();
        assert!(scheduler.take());
        assert!(!scheduler.take());
    }

    #[test]
    fn company_text_hides_below_threshold() {
        let config = LodConfig::default();
        assert!(!show_company_text(config.label_min_zoom * 0.5, &config));
        assert!(show_company_text(1.0, &config));
    }

    proptest! {
        #[test]
        fn culling_has_no_false_negatives(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            radius in 0.0f32..80.0,
            k in 0.1f32..4.0,
            tx in -500.0f32..500.0,
            ty in -500.0f32..500.0,
        ) {
            let viewport = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
            let transform = ViewTransform { k, x: tx, y: ty };
            let rect = visible_world_rect(transform, viewport, 0.0);

            let screen_center = transform.apply(pos2(x, y));
            let screen_radius = radius * k;
            let touches_screen = circle_in_view(screen_center, screen_radius, viewport.shrink(0.01));
            if touches_screen {
                prop_assert!(circle_in_view(pos2(x, y), radius, rect));
            }
        }
    }
}
