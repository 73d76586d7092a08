use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, vec2,
};

use contact_graph::engine::GraphEngine;
use contact_graph::engine::palette::{
    CONTACT_COLOR, HOME_COLOR, KEY_PLAYER_COLOR, VOID_COLOR, relationship_color, with_opacity,
};

use super::super::ViewModel;
use super::super::render_utils::{
    LABEL_FONT_SIZE, PainterTextMeasure, blend_color, draw_arrowhead, draw_background,
};

const MIN_LABEL_FONT_SIZE: f32 = 6.0;
const LABEL_PILL_COLOR: Color32 = Color32::from_rgb(28, 32, 40);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.prepare_engine(rect);
        self.handle_graph_input(ui, rect, &response);

        let dt = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let live_physics = self.live_physics;

        let needs_repaint = {
            let Some(engine) = self.engine.as_mut() else {
                return;
            };
            if engine.graph().is_empty() {
                draw_background(&painter, rect, rect.center(), 1.0);
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "No companies or contacts in this snapshot",
                    FontId::proportional(14.0),
                    Color32::from_gray(150),
                );
                return;
            }

            if engine.toggles().relationship_labels {
                engine.measure_labels(&PainterTextMeasure::new(&painter));
            }

            let camera_moving = engine.advance_camera(dt);
            let physics_moving = if live_physics || engine.dragging().is_some() {
                engine.tick().moved
            } else {
                engine.service_pending();
                false
            };

            let selection_animating = paint_network(ui, &painter, rect, engine);
            paint_hover_caption(&painter, rect, engine);

            physics_moving
                || camera_moving
                || selection_animating
                || engine.camera().is_animating()
                || response.dragged()
        };

        if self.draw_minimap(ui, rect) || needs_repaint {
            ui.ctx().request_repaint();
        }
    }
}

/// Paints the network back to front. Returns whether a selection halo is
/// still animating.
fn paint_network(ui: &Ui, painter: &Painter, rect: Rect, engine: &GraphEngine) -> bool {
    let transform = engine.camera().transform();
    let k = transform.k;
    let graph = engine.graph();
    let state = engine.render_state();
    let strokes = engine.stroke_sizes();

    draw_background(painter, rect, transform.apply(Pos2::ZERO), k);

    for (index, edge) in graph.employment.iter().enumerate() {
        let Some(style) = state.employment.get(index) else {
            continue;
        };
        if !style.visible || (engine.is_culled(edge.contact) && engine.is_culled(edge.company)) {
            continue;
        }
        let Some([contact, company]) = engine.employment_segment(index) else {
            continue;
        };

        painter.line_segment(
            [transform.apply(contact), transform.apply(company)],
            Stroke::new(
                strokes.employment * k,
                with_opacity(CONTACT_COLOR, 0.35 * style.opacity),
            ),
        );
    }

    let label_font_size = LABEL_FONT_SIZE * k;
    for (index, route) in engine.router().routes() {
        let (Some(edge), Some(style)) = (graph.relationships.get(index), state.relationships.get(index))
        else {
            continue;
        };
        if !style.visible || (engine.is_culled(edge.source) && engine.is_culled(edge.target)) {
            continue;
        }

        let color = with_opacity(relationship_color(edge.kind), style.opacity);
        let stroke = Stroke::new(strokes.relationship * k, color);
        let start = transform.apply(route.start);
        let end = transform.apply(route.end);
        match route.control {
            Some(control) => {
                painter.add(QuadraticBezierShape::from_points_stroke(
                    [start, transform.apply(control), end],
                    false,
                    Color32::TRANSPARENT,
                    stroke,
                ));
            }
            None => {
                painter.line_segment([start, end], stroke);
            }
        }

        for marker in route.markers(edge.kind.is_bidirectional()).into_iter().flatten() {
            draw_arrowhead(
                painter,
                transform.apply(marker.tip),
                marker.direction,
                strokes.marker * k,
                color,
            );
        }

        if style.label_visible
            && label_font_size >= MIN_LABEL_FONT_SIZE
            && let Some(label_box) = engine.router().label_box(index)
        {
            let pill = transform.apply_rect(label_box);
            let rounding = pill.height() * 0.5;
            painter.rect_filled(pill, rounding, with_opacity(LABEL_PILL_COLOR, style.opacity * 0.9));
            painter.rect_stroke(pill, rounding, Stroke::new(1.0, color), StrokeKind::Inside);
            painter.text(
                pill.center(),
                Align2::CENTER_CENTER,
                edge.kind.label(),
                FontId::proportional(label_font_size),
                with_opacity(Color32::from_gray(230), style.opacity),
            );
        }
    }

    let selected = engine.highlight().map(|highlight| highlight.selected);
    let show_company_text = engine.show_company_text();
    let mut selection_animating = false;

    for index in graph.company_indices() {
        if engine.is_culled(index) {
            continue;
        }
        let node = &graph.nodes[index];
        let (Some(company), Some(style)) = (node.as_company(), state.nodes.get(index)) else {
            continue;
        };
        if !style.visible {
            continue;
        }

        let center = transform.apply(node.position);
        let radius = node.radius * k;
        let base = if company.is_home {
            HOME_COLOR
        } else if company.is_unassigned() {
            VOID_COLOR
        } else {
            company.color
        };

        let selection_mix = ui.ctx().animate_bool(
            ui.make_persistent_id(("company-selection", company.id.as_str())),
            selected == Some(index),
        );
        if selection_mix > 0.0 && selection_mix < 1.0 {
            selection_animating = true;
        }

        let fill = blend_color(base.gamma_multiply(0.55), SELECTED_COLOR, selection_mix * 0.3);
        painter.circle_filled(center, radius, with_opacity(fill, style.opacity));
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(
                (1.4 + selection_mix * 1.2) * k.sqrt(),
                with_opacity(base, style.opacity),
            ),
        );

        if selection_mix > 0.0 {
            let halo_strength = (selection_mix * (1.0 - selection_mix) * 4.0).clamp(0.0, 1.0);
            let halo_alpha = (30.0 + (halo_strength * 145.0)) as u8;
            painter.circle_stroke(
                center,
                radius + 4.0 + ((1.0 - selection_mix) * 6.0),
                Stroke::new(
                    1.0 + (halo_strength * 1.6),
                    Color32::from_rgba_unmultiplied(245, 206, 93, halo_alpha),
                ),
            );
        }

        if show_company_text && style.label_visible {
            painter.text(
                center,
                Align2::CENTER_CENTER,
                company.name.as_str(),
                FontId::proportional((radius * 0.3).clamp(9.0, 16.0)),
                with_opacity(Color32::from_gray(238), style.opacity),
            );
        }
    }

    let hovered = engine.hovered();
    for index in graph.contact_indices() {
        if engine.is_culled(index) {
            continue;
        }
        let node = &graph.nodes[index];
        let Some(style) = state.nodes.get(index) else {
            continue;
        };
        if !style.visible {
            continue;
        }

        let color = if hovered == Some(index) {
            KEY_PLAYER_COLOR
        } else {
            CONTACT_COLOR
        };
        painter.circle_filled(
            transform.apply(node.position),
            (node.radius * k).max(1.0),
            with_opacity(color, style.opacity),
        );
    }

    for annotation in engine.annotations() {
        if engine.is_culled(annotation.contact) {
            continue;
        }
        painter.circle_stroke(
            transform.apply(annotation.center),
            annotation.ring_radius * k,
            Stroke::new(strokes.ring * k, KEY_PLAYER_COLOR),
        );
        painter.text(
            transform.apply(annotation.label_position),
            Align2::CENTER_TOP,
            annotation.label.as_str(),
            FontId::proportional(LABEL_FONT_SIZE),
            KEY_PLAYER_COLOR,
        );
    }

    selection_animating
}

fn paint_hover_caption(painter: &Painter, rect: Rect, engine: &GraphEngine) {
    let Some(node) = engine.hovered().and_then(|index| engine.graph().nodes.get(index)) else {
        return;
    };
    let Some(contact) = node.as_contact() else {
        return;
    };

    let company = node
        .company
        .and_then(|index| engine.graph().nodes.get(index))
        .map(|company| company.name())
        .unwrap_or_default();
    let caption = if contact.title.is_empty() {
        format!("{}  |  {company}", contact.name)
    } else {
        format!("{}  |  {}  |  {company}", contact.name, contact.title)
    };

    painter.text(
        rect.left_top() + vec2(10.0, 10.0),
        Align2::LEFT_TOP,
        caption,
        FontId::proportional(13.0),
        Color32::from_gray(240),
    );
}
