use std::path::Path;

use eframe::egui::{self, Align, Context, Layout};

use super::super::{ExportState, ViewModel};

const FPS_SAMPLE_WINDOW: usize = 180;

impl ViewModel {
    fn sample_frame_rate(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        if self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    fn status_readouts(&self) -> Vec<String> {
        let mut readouts = Vec::new();
        if let Some(engine) = self.engine.as_ref() {
            readouts.push(format!(
                "visible: {} / {} nodes",
                engine.visible_node_count(),
                engine.graph().len()
            ));
        }
        if self.show_fps_bar && !self.fps_samples.is_empty() {
            let average = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
            readouts.push(format!(
                "FPS {:.0} | avg {average:.1} | {:.1} ms",
                self.fps_current,
                1000.0 / self.fps_current.max(f32::EPSILON)
            ));
        }
        readouts
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        snapshot_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.sample_frame_rate(ctx);
        self.collect_export(ctx, snapshot_path);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("contact-graph");
                    ui.separator();
                    ui.label(format!("snapshot: {}", snapshot_path.display()));
                    if let Some(engine) = self.engine.as_ref() {
                        let graph = engine.graph();
                        ui.label(format!("companies: {}", graph.company_count()));
                        ui.label(format!("contacts: {}", graph.contact_count()));
                        ui.label(format!("relationships: {}", graph.relationships.len()));
                    }

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload snapshot"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Fit").clicked()
                        && let Some(engine) = self.engine.as_mut()
                    {
                        engine.zoom_to_fit();
                    }
                    if ui.button("Home").clicked()
                        && let Some(engine) = self.engine.as_mut()
                    {
                        engine.center_on_home();
                    }
                    let exporting = matches!(self.export, ExportState::Requested);
                    if ui
                        .add_enabled(!exporting && self.engine.is_some(), egui::Button::new("Export"))
                        .clicked()
                    {
                        self.request_export(ctx);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        for readout in self.status_readouts() {
                            ui.label(readout);
                        }
                        match &self.export {
                            ExportState::Saved(path) => {
                                ui.small(format!("saved {}", path.display()));
                            }
                            ExportState::Failed(error) => {
                                ui.small(format!("export failed: {error}"));
                            }
                            ExportState::Idle | ExportState::Requested => {}
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if is_loading && self.engine.is_none() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading contact network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    self.draw_graph(ui);
                }
            });
    }
}
