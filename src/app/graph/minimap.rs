use eframe::egui::{Color32, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, vec2};

use contact_graph::engine::minimap::MinimapMarker;
use contact_graph::engine::{InteractionEvent, PointerPhase};

use super::super::ViewModel;

const MINIMAP_MARGIN: f32 = 12.0;
const VIEWPORT_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

impl ViewModel {
    /// Lower-right overview. Returns true while the pointer is driving it.
    pub(in crate::app) fn draw_minimap(&mut self, ui: &Ui, surface: Rect) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };

        let config = &engine.config().minimap;
        let size = vec2(config.width, config.height);
        let rect = Rect::from_min_size(
            surface.right_bottom() - size - vec2(MINIMAP_MARGIN, MINIMAP_MARGIN),
            size,
        );
        if !self.show_minimap || !surface.contains_rect(rect) {
            engine.set_minimap_rect(None);
            return false;
        }
        engine.set_minimap_rect(Some(rect));

        let response = ui.interact(rect, ui.id().with("minimap"), Sense::click_and_drag());
        let local = response
            .interact_pointer_pos()
            .map(|pointer| (pointer - rect.min).to_pos2());

        if let Some(local) = local {
            let phase = if response.drag_started() || response.clicked() {
                Some(PointerPhase::Down)
            } else if response.dragged() {
                Some(PointerPhase::Move)
            } else {
                None
            };
            if let Some(phase) = phase {
                engine.handle(InteractionEvent::MinimapPointer { phase, local });
            }
        }
        if response.drag_stopped() || response.clicked() {
            engine.handle(InteractionEvent::MinimapPointer {
                phase: PointerPhase::Up,
                local: local.unwrap_or(Pos2::ZERO),
            });
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 6.0, Color32::from_rgba_unmultiplied(12, 15, 20, 225));
        painter.rect_stroke(
            rect,
            6.0,
            Stroke::new(1.0, Color32::from_gray(70)),
            StrokeKind::Inside,
        );

        let Some(frame) = engine.minimap() else {
            return response.dragged();
        };

        let offset = rect.min.to_vec2();
        for dot in &frame.dots {
            let center = dot.position + offset;
            match dot.marker {
                MinimapMarker::Company => {
                    painter.circle_filled(center, dot.radius, dot.color);
                }
                MinimapMarker::Home => {
                    painter.circle_filled(center, dot.radius, dot.color);
                    painter.circle_stroke(center, dot.radius + 2.0, Stroke::new(1.0, dot.color));
                }
                MinimapMarker::Void => {
                    painter.circle_stroke(center, dot.radius, Stroke::new(1.0, dot.color));
                }
            }
        }

        let viewport = frame.viewport.translate(offset).intersect(rect);
        if viewport.is_positive() {
            painter.rect_stroke(
                viewport,
                0.0,
                Stroke::new(1.2, VIEWPORT_COLOR),
                StrokeKind::Inside,
            );
        }

        response.dragged() || response.clicked()
    }
}
