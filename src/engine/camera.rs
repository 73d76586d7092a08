use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};
use tracing::debug;

use super::config::CameraConfig;

/// `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub k: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    /// Transform that shows `world` at the center of `viewport` at scale `k`.
    pub fn centered_on(world: Pos2, k: f32, viewport: Rect) -> Self {
        let center = viewport.center();
        Self {
            k,
            x: center.x - world.x * k,
            y: center.y - world.y * k,
        }
    }

    pub fn translation(&self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn apply(&self, world: Pos2) -> Pos2 {
        pos2(world.x * self.k + self.x, world.y * self.k + self.y)
    }

    pub fn invert(&self, screen: Pos2) -> Pos2 {
        pos2((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    pub fn apply_rect(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.apply(world.min), self.apply(world.max))
    }

    pub fn invert_rect(&self, screen: Rect) -> Rect {
        Rect::from_min_max(self.invert(screen.min), self.invert(screen.max))
    }

    fn is_finite(&self) -> bool {
        self.k.is_finite() && self.k > 0.0 && self.x.is_finite() && self.y.is_finite()
    }
}

pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
    }
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    from_center: Pos2,
    from_log_k: f32,
    to_center: Pos2,
    to_log_k: f32,
    elapsed: f32,
    duration: f32,
}

/// Zoom and pan state for the primary surface. Programmatic moves animate;
/// pointer-driven moves apply immediately and stay within the translate
/// extent.
#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    viewport: Rect,
    transform: ViewTransform,
    transition: Option<Transition>,
    translate_extent: Option<Rect>,
}

impl Camera {
    pub fn new(config: &CameraConfig, viewport: Rect) -> Self {
        Self {
            config: config.clone(),
            viewport,
            transform: ViewTransform::IDENTITY,
            transition: None,
            translate_extent: None,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn zoom(&self) -> f32 {
        self.transform.k
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn translate_extent(&self) -> Option<Rect> {
        self.translate_extent
    }

    /// Moves the surface on screen. The transform is kept as is, like a
    /// resized canvas keeps its zoom state.
    pub fn set_viewport(&mut self, viewport: Rect) {
        if viewport.is_finite() && viewport.is_positive() {
            self.viewport = viewport;
        }
    }

    /// Company bounds the pointer-driven pan may not leave, grown by the
    /// configured margin. `None` lifts the constraint.
    pub fn set_translate_extent(&mut self, bounds: Option<Rect>) {
        self.translate_extent = bounds
            .filter(|bounds| bounds.is_finite())
            .map(|bounds| bounds.expand(self.config.pan_margin));
    }

    pub fn visible_world_rect(&self) -> Rect {
        self.transform.invert_rect(self.viewport)
    }

    /// World point shown at the viewport center.
    pub fn world_center(&self) -> Pos2 {
        self.transform.invert(self.viewport.center())
    }

    fn clamp_zoom(&self, k: f32) -> f32 {
        k.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Steps an in-flight transition. Returns true when the transform
    /// changed.
    pub fn advance(&mut self, dt: f32) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };

        transition.elapsed += dt.max(0.0);
        let raw = if transition.duration > 0.0 {
            transition.elapsed / transition.duration
        } else {
            1.0
        };
        let eased = ease_cubic_in_out(raw);
        let center = transition.from_center.lerp(transition.to_center, eased);
        let log_k = transition.from_log_k + (transition.to_log_k - transition.from_log_k) * eased;
        self.transform = ViewTransform::centered_on(center, log_k.exp(), self.viewport);

        if raw >= 1.0 {
            self.transition = None;
        }
        true
    }

    /// Starts an eased move to `world` at scale `k`, replacing any transition
    /// already running.
    pub fn animate_to(&mut self, world: Pos2, k: f32) -> bool {
        let k = self.clamp_zoom(k);
        if !world.x.is_finite() || !world.y.is_finite() || !k.is_finite() {
            debug!("ignoring camera move to a non-finite target");
            return false;
        }

        self.transition = Some(Transition {
            from_center: self.world_center(),
            from_log_k: self.transform.k.ln(),
            to_center: world,
            to_log_k: k.ln(),
            elapsed: 0.0,
            duration: self.config.transition_secs.max(0.0),
        });
        true
    }

    pub fn zoom_to_fit(&mut self, bounds: Option<Rect>) -> bool {
        let Some(bounds) = bounds.filter(|bounds| bounds.is_finite()) else {
            debug!("zoom to fit skipped: nothing positioned");
            return false;
        };

        let target = self.fit_transform(bounds);
        self.animate_to(target.0, target.1)
    }

    /// Center and scale that frame `bounds` plus the fit margin.
    pub fn fit_transform(&self, bounds: Rect) -> (Pos2, f32) {
        let padded = bounds.expand(self.config.fit_margin);
        let width = padded.width().max(1.0);
        let height = padded.height().max(1.0);
        let k = (self.viewport.width() / width)
            .min(self.viewport.height() / height)
            .min(self.config.max_zoom)
            .max(self.config.min_zoom);
        (bounds.center(), k)
    }

    pub fn center_on(&mut self, world: Pos2, k: f32) -> bool {
        self.animate_to(world, k)
    }

    /// Recenters at the current scale without animating, used while dragging
    /// on the minimap.
    pub fn jump_to(&mut self, world: Pos2) -> bool {
        if !world.x.is_finite() || !world.y.is_finite() {
            return false;
        }
        self.transition = None;
        self.transform = ViewTransform::centered_on(world, self.transform.k, self.viewport);
        true
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        if transform.is_finite() {
            self.transition = None;
            self.transform = ViewTransform {
                k: self.clamp_zoom(transform.k),
                ..transform
            };
        }
    }

    /// Wheel zoom keeping the world point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }

        let k = self.clamp_zoom(self.transform.k * factor);
        let world = self.transform.invert(anchor);
        let next = ViewTransform {
            k,
            x: anchor.x - world.x * k,
            y: anchor.y - world.y * k,
        };
        self.apply_user(next)
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        if !delta.is_finite() || delta == Vec2::ZERO {
            return false;
        }

        let next = ViewTransform {
            x: self.transform.x + delta.x,
            y: self.transform.y + delta.y,
            ..self.transform
        };
        self.apply_user(next)
    }

    fn apply_user(&mut self, next: ViewTransform) -> bool {
        let next = self.constrain(next);
        self.transition = None;
        if next == self.transform || !next.is_finite() {
            return false;
        }
        self.transform = next;
        true
    }

    /// Keeps the translate extent covering the viewport: centered when the
    /// extent is smaller than the view, flush with the nearest edge
    /// otherwise.
    fn constrain(&self, transform: ViewTransform) -> ViewTransform {
        let Some(extent) = self.translate_extent else {
            return transform;
        };

        let view = transform.invert_rect(self.viewport);
        let shift = |view_min: f32, view_max: f32, extent_min: f32, extent_max: f32| {
            let low = view_min - extent_min;
            let high = view_max - extent_max;
            if high > low {
                (low + high) * 0.5
            } else if low < 0.0 {
                low
            } else {
                high.max(0.0)
            }
        };

        let shift_x = shift(view.min.x, view.max.x, extent.min.x, extent.max.x);
        let shift_y = shift(view.min.y, view.max.y, extent.min.y, extent.max.y);
        ViewTransform {
            k: transform.k,
            x: transform.x + shift_x * transform.k,
            y: transform.y + shift_y * transform.k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))
    }

    fn finish(camera: &mut Camera) {
        for _ in 0..200 {
            camera.advance(1.0 / 60.0);
        }
        assert!(!camera.is_animating());
    }

    #[test]
    fn apply_and_invert_are_inverse() {
        let transform = ViewTransform {
            k: 2.5,
            x: -30.0,
            y: 12.0,
        };
        let world = pos2(13.0, -7.0);
        let back = transform.invert(transform.apply(world));
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!(ease_cubic_in_out(0.25) < 0.25);
    }

    #[test]
    fn zoom_to_fit_contains_bounds() {
        let mut camera = Camera::new(&CameraConfig::default(), viewport());
        let bounds = Rect::from_min_max(pos2(-900.0, -100.0), pos2(1400.0, 700.0));
        assert!(camera.zoom_to_fit(Some(bounds)));
        finish(&mut camera);

        let screen = camera.transform().apply_rect(bounds);
        assert!(viewport().expand(0.5).contains_rect(screen));
    }

    #[test]
    fn zoom_to_fit_without_bounds_is_a_noop() {
        let mut camera = Camera::new(&CameraConfig::default(), viewport());
        assert!(!camera.zoom_to_fit(None));
        assert!(!camera.is_animating());
        assert_eq!(camera.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn fit_scale_respects_max_zoom() {
        let camera = Camera::new(&CameraConfig::default(), viewport());
        let (_, k) = camera.fit_transform(Rect::from_center_size(Pos2::ZERO, vec2(1.0, 1.0)));
        assert_eq!(k, CameraConfig::default().max_zoom);
    }

    #[test]
    fn new_transition_replaces_running_one() {
        let mut camera = Camera::new(&CameraConfig::default(), viewport());
        camera.center_on(pos2(1000.0, 0.0), 1.0);
        camera.advance(0.1);
        camera.center_on(pos2(-50.0, 20.0), 2.0);
        finish(&mut camera);

        assert!((camera.world_center() - pos2(-50.0, 20.0)).length() < 1e-2);
        assert!((camera.zoom() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn wheel_zoom_keeps_anchor_fixed() {
        let mut camera = Camera::new(&CameraConfig::default(), viewport());
        let anchor = pos2(200.0, 150.0);
        let before = camera.transform().invert(anchor);
        assert!(camera.zoom_at(anchor, 1.5));
        let after = camera.transform().invert(anchor);
        assert!((before - after).length() < 1e-3);
        assert!(!camera.zoom_at(anchor, f32::NAN));
    }

    #[test]
    fn pan_stays_inside_translate_extent() {
        let config = CameraConfig {
            pan_margin: 0.0,
            ..CameraConfig::default()
        };
        let mut camera = Camera::new(&config, viewport());
        camera.set_translate_extent(Some(Rect::from_min_max(
            pos2(-1000.0, -1000.0),
            pos2(1000.0, 1000.0),
        )));

        camera.pan_by(vec2(50_000.0, 0.0));
        let visible = camera.visible_world_rect();
        assert!(visible.min.x >= -1000.0 - 1e-3);
    }

    #[test]
    fn programmatic_moves_ignore_the_extent() {
        let config = CameraConfig {
            pan_margin: 0.0,
            ..CameraConfig::default()
        };
        let mut camera = Camera::new(&config, viewport());
        camera.set_translate_extent(Some(Rect::from_min_max(Pos2::ZERO, pos2(10.0, 10.0))));
        camera.center_on(pos2(5000.0, 5000.0), 1.0);
        finish(&mut camera);
        assert!((camera.world_center() - pos2(5000.0, 5000.0)).length() < 1e-2);
    }
}
