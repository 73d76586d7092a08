use eframe::egui::{self, PointerButton, Rect, Response, Ui};
use tracing::debug;

use contact_graph::engine::graph::ContactInfo;
use contact_graph::engine::{CameraInput, DragPhase, InteractionEvent, Notification};

use super::super::ViewModel;

const WHEEL_ZOOM_RATE: f32 = 0.0018;

impl ViewModel {
    /// Translates this frame's pointer input on the primary surface into
    /// engine events.
    pub(in crate::app) fn handle_graph_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let factor = (1.0 + (scroll * WHEEL_ZOOM_RATE)).clamp(0.85, 1.15);
                engine.handle(InteractionEvent::CameraChanged(CameraInput::Zoom {
                    anchor: pointer.unwrap_or_else(|| rect.center()),
                    factor,
                }));
            }
        }

        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && let Some(node) = engine.node_at(origin)
        {
            self.drag = Some(node);
            engine.handle(InteractionEvent::NodeDragged {
                node,
                phase: DragPhase::Start,
                world: engine.screen_to_world(origin),
            });
        }

        match self.drag {
            Some(node) if response.dragged_by(PointerButton::Primary) => {
                if let Some(pointer) = response.interact_pointer_pos() {
                    engine.handle(InteractionEvent::NodeDragged {
                        node,
                        phase: DragPhase::Move,
                        world: engine.screen_to_world(pointer),
                    });
                }
            }
            Some(_) => {}
            None => {
                if response.dragged_by(PointerButton::Primary)
                    || response.dragged_by(PointerButton::Secondary)
                    || response.dragged_by(PointerButton::Middle)
                {
                    engine.handle(InteractionEvent::CameraChanged(CameraInput::Pan {
                        delta: response.drag_delta(),
                    }));
                }
            }
        }

        if response.drag_stopped()
            && let Some(node) = self.drag.take()
        {
            let world = response
                .interact_pointer_pos()
                .map(|pointer| engine.screen_to_world(pointer))
                .unwrap_or(engine.graph().nodes[node].position);
            engine.handle(InteractionEvent::NodeDragged {
                node,
                phase: DragPhase::End,
                world,
            });
        }

        if self.drag.is_none() {
            let hovered = pointer
                .filter(|_| response.hovered())
                .and_then(|pointer| engine.node_at(pointer));
            if let Some(notification) = engine.handle(InteractionEvent::NodeHovered { node: hovered })
            {
                record_notification(
                    &mut self.hovered_contact,
                    &mut self.clicked_contact,
                    notification,
                );
            }

            if hovered.is_some() {
                ui.output_mut(|output| {
                    output.cursor_icon = egui::CursorIcon::PointingHand;
                });
            }
        } else {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::Grabbing;
            });
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(node) = pointer.and_then(|pointer| engine.node_at(pointer))
            && let Some(notification) = engine.handle(InteractionEvent::NodeClicked { node })
        {
            record_notification(
                &mut self.hovered_contact,
                &mut self.clicked_contact,
                notification,
            );
        }
    }
}

/// Keeps the last hovered and last clicked contact for the details panel.
fn record_notification(
    hovered: &mut Option<ContactInfo>,
    clicked: &mut Option<ContactInfo>,
    notification: Notification,
) {
    match notification {
        Notification::CompanyClicked(company) => {
            debug!(company = %company.id, "company clicked");
        }
        Notification::ContactClicked(contact) => {
            debug!(contact = %contact.id, "contact clicked");
            *clicked = Some(contact);
        }
        Notification::ContactHovered(Some(contact)) => *hovered = Some(contact),
        Notification::ContactHovered(None) => {}
    }
}
