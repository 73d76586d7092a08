use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context, Rect};
use tracing::{error, info, warn};

use contact_graph::engine::GraphEngine;
use contact_graph::engine::config::EngineConfig;
use contact_graph::engine::graph::ContactInfo;
use contact_graph::engine::options::{DisplayToggles, RelationshipFilter};
use contact_graph::network::{NetworkSnapshot, load_snapshot};

mod export;
mod graph;
mod render_utils;
mod ui;

pub struct ContactGraphApp {
    snapshot_path: PathBuf,
    config_path: Option<PathBuf>,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedNetwork, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedNetwork, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct LoadedNetwork {
    snapshot: NetworkSnapshot,
    config: EngineConfig,
}

struct ViewModel {
    snapshot: NetworkSnapshot,
    config: EngineConfig,
    /// Created on the first frame, once the primary surface has a size.
    engine: Option<GraphEngine>,
    toggles: DisplayToggles,
    filter: RelationshipFilter,
    live_physics: bool,
    search: String,
    focus_token: u64,
    hovered_contact: Option<ContactInfo>,
    clicked_contact: Option<ContactInfo>,
    drag: Option<usize>,
    export: ExportState,
    show_minimap: bool,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

#[derive(Debug, Default)]
enum ExportState {
    #[default]
    Idle,
    Requested,
    Saved(PathBuf),
    Failed(String),
}

/// Reads the snapshot and the optional engine config. Runs on the loader
/// thread.
fn load_network(snapshot_path: &Path, config_path: Option<&Path>) -> anyhow::Result<LoadedNetwork> {
    let snapshot = load_snapshot(snapshot_path)?;
    let config = match config_path {
        Some(path) => EngineConfig::load(path).with_context(|| {
            format!("while loading network {}", snapshot_path.display())
        })?,
        None => EngineConfig::default(),
    };
    Ok(LoadedNetwork { snapshot, config })
}

impl ContactGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        snapshot_path: PathBuf,
        config_path: Option<PathBuf>,
    ) -> Self {
        let state = Self::start_load(snapshot_path.clone(), config_path.clone());
        Self {
            snapshot_path,
            config_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(
        snapshot_path: PathBuf,
        config_path: Option<PathBuf>,
    ) -> Receiver<Result<LoadedNetwork, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_network(&snapshot_path, config_path.as_deref()).map_err(|error| {
                error!("{error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(snapshot_path: PathBuf, config_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(snapshot_path, config_path),
        }
    }

    fn ready(loaded: LoadedNetwork) -> AppState {
        if loaded.snapshot.is_empty() {
            warn!("snapshot has no companies or contacts");
        }
        info!(
            companies = loaded.snapshot.companies.len(),
            contacts = loaded.snapshot.contacts.len(),
            "network loaded"
        );
        AppState::Ready(Box::new(ViewModel::new(loaded)))
    }
}

impl eframe::App for ContactGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(loaded) => Self::ready(loaded),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading contact network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load contact network");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(
                            self.snapshot_path.clone(),
                            self.config_path.clone(),
                        ));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.snapshot_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(
                        self.snapshot_path.clone(),
                        self.config_path.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(loaded)) => model.replace_network(loaded),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(loaded: LoadedNetwork) -> Self {
        Self {
            snapshot: loaded.snapshot,
            config: loaded.config,
            engine: None,
            toggles: DisplayToggles::default(),
            filter: RelationshipFilter::all(),
            live_physics: true,
            search: String::new(),
            focus_token: 0,
            hovered_contact: None,
            clicked_contact: None,
            drag: None,
            export: ExportState::Idle,
            show_minimap: true,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    /// Swaps in a reloaded snapshot. The engine keeps its camera and
    /// selection; the layout restarts.
    fn replace_network(&mut self, loaded: LoadedNetwork) {
        self.snapshot = loaded.snapshot;
        if self.config != loaded.config {
            self.config = loaded.config;
            self.engine = None;
        } else if let Some(engine) = self.engine.as_mut() {
            engine.rebuild(&self.snapshot);
        }
        self.hovered_contact = None;
        self.clicked_contact = None;
        self.drag = None;
    }

    /// Creates the engine on first use and pushes the panel options into it.
    fn prepare_engine(&mut self, viewport: Rect) {
        let engine = self.engine.get_or_insert_with(|| {
            let mut engine = GraphEngine::new(self.config.clone(), viewport);
            engine.rebuild(&self.snapshot);
            engine
        });
        engine.set_viewport(viewport);
        engine.set_toggles(self.toggles);
        engine.set_filter(self.filter.clone());
    }
}
