//! Layout and view state for one network snapshot.
//!
//! [`GraphEngine`] owns the node arena, the force simulation, the camera and
//! every piece of derived render data. The shell drives it once per frame:
//! [`GraphEngine::tick`], [`GraphEngine::advance_camera`], then
//! [`GraphEngine::handle`] for each input event.

pub mod camera;
pub mod config;
pub mod graph;
pub mod lod;
pub mod minimap;
pub mod options;
pub mod palette;
pub mod physics;
pub mod routing;
pub mod selection;
pub mod sizing;

use std::collections::{HashMap, HashSet};

use eframe::egui::{Pos2, Rect, Vec2};
use tracing::{debug, info};

use crate::network::NetworkSnapshot;
use camera::{Camera, ViewTransform};
use config::EngineConfig;
use graph::{CompanyInfo, ContactInfo, NetworkGraph, NodeDetail, NodeKey};
use lod::{CullScheduler, CullState, StrokeSizes};
use minimap::{MinimapFrame, build_frame};
use options::{DisplayToggles, FocusRequest, RelationshipFilter};
use physics::{Simulation, seed_layout};
use routing::{EdgeRouter, TextMeasure};
use selection::{
    Highlight, KeyPlayerAnnotation, RenderState, SelectionState, annotate_key_players,
    derive_render_state,
};

/// Outward events for the host application.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    CompanyClicked(CompanyInfo),
    ContactClicked(ContactInfo),
    ContactHovered(Option<ContactInfo>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Start,
    Move,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraInput {
    /// Wheel or pinch zoom by `factor` around a screen point.
    Zoom { anchor: Pos2, factor: f32 },
    Pan { delta: Vec2 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionEvent {
    NodeClicked { node: usize },
    NodeHovered { node: Option<usize> },
    /// `world` is the pointer position in world coordinates.
    NodeDragged {
        node: usize,
        phase: DragPhase,
        world: Pos2,
    },
    CameraChanged(CameraInput),
    /// `local` is relative to the minimap's top-left corner.
    MinimapPointer { phase: PointerPhase, local: Pos2 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Primary,
    Minimap,
}

/// Names one of the drawing surfaces; [`GraphEngine::surface_rect`] resolves
/// it to its current screen rect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceHandle {
    pub kind: SurfaceKind,
}

pub trait GraphControls {
    fn zoom_to_fit(&mut self) -> bool;
    fn center_on_home(&mut self) -> bool;
    fn primary_surface(&self) -> SurfaceHandle;
    fn minimap_surface(&self) -> SurfaceHandle;
}

/// Node identity changes between two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildDiff {
    pub added: Vec<NodeKey>,
    pub removed: Vec<NodeKey>,
    pub retained: Vec<NodeKey>,
}

impl RebuildDiff {
    fn between(previous: &HashSet<NodeKey>, graph: &NetworkGraph) -> Self {
        let current = graph.nodes.iter().map(|node| node.key()).collect::<HashSet<_>>();
        let mut diff = Self {
            added: current.difference(previous).cloned().collect(),
            removed: previous.difference(&current).cloned().collect(),
            retained: current.intersection(previous).cloned().collect(),
        };
        diff.added.sort();
        diff.removed.sort();
        diff.retained.sort();
        diff
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub moved: bool,
    pub employment_refreshed: bool,
    pub viewport_refreshed: bool,
}

pub struct GraphEngine {
    config: EngineConfig,
    graph: NetworkGraph,
    simulation: Simulation,
    router: EdgeRouter,
    camera: Camera,
    cull: CullState,
    cull_scheduler: CullScheduler,
    selection: SelectionState,
    highlight: Option<Highlight>,
    render_state: RenderState,
    annotations: Vec<KeyPlayerAnnotation>,
    employment_segments: Vec<[Pos2; 2]>,
    minimap: Option<MinimapFrame>,
    minimap_rect: Option<Rect>,
    minimap_dragging: bool,
    toggles: DisplayToggles,
    filter: RelationshipFilter,
    last_focus: Option<FocusRequest>,
    dragging: Option<usize>,
    hovered: Option<usize>,
    canvas: Rect,
    ticks: u64,
}

impl GraphEngine {
    /// `viewport` is the primary surface's screen rect; its size drives node
    /// sizing and its center is the layout center in world space.
    pub fn new(config: EngineConfig, viewport: Rect) -> Self {
        let canvas = Rect::from_min_size(Pos2::ZERO, viewport.size());
        let graph = NetworkGraph::default();
        let simulation = Simulation::new(&config.forces, &graph, canvas.center());
        let mut camera = Camera::new(&config.camera, viewport);
        camera.set_transform(ViewTransform::centered_on(canvas.center(), 1.0, viewport));

        Self {
            router: EdgeRouter::new(&config.routing),
            config,
            graph,
            simulation,
            camera,
            cull: CullState::default(),
            cull_scheduler: CullScheduler::default(),
            selection: SelectionState::Idle,
            highlight: None,
            render_state: RenderState::default(),
            annotations: Vec::new(),
            employment_segments: Vec::new(),
            minimap: None,
            minimap_rect: None,
            minimap_dragging: false,
            toggles: DisplayToggles::default(),
            filter: RelationshipFilter::all(),
            last_focus: None,
            dragging: None,
            hovered: None,
            canvas,
            ticks: 0,
        }
    }

    /// Replaces the whole dataset and restarts the layout.
    pub fn rebuild(&mut self, snapshot: &NetworkSnapshot) -> RebuildDiff {
        let previous_keys = self.graph.nodes.iter().map(|node| node.key()).collect::<HashSet<_>>();
        let previous_state = if self.config.layout.preserve_positions {
            self.graph
                .nodes
                .iter()
                .map(|node| (node.key(), (node.position, node.velocity)))
                .collect::<HashMap<_, _>>()
        } else {
            HashMap::new()
        };

        self.canvas = Rect::from_min_size(Pos2::ZERO, self.camera.viewport().size());
        let center = self.canvas.center();
        self.graph = NetworkGraph::build(snapshot, &self.config.sizing, self.canvas.size());
        seed_layout(&mut self.graph, &self.config.forces, center);

        if !previous_state.is_empty() {
            for node in &mut self.graph.nodes {
                if node.pinned.is_some() {
                    continue;
                }
                if let Some(&(position, velocity)) = previous_state.get(&node.key()) {
                    node.position = position;
                    node.velocity = velocity;
                }
            }
        }

        self.simulation = Simulation::new(&self.config.forces, &self.graph, center);
        self.simulation.restart();
        self.router.reset();
        self.router.assign(&self.graph, &self.filter);
        self.router.update(&self.graph);
        self.cull.clear();
        self.cull_scheduler.request();
        self.minimap = None;
        self.minimap_dragging = false;
        self.dragging = None;
        self.hovered = None;
        self.ticks = 0;

        if let Some(id) = self.selection.selected_id()
            && self.graph.company_index(id).is_none()
        {
            debug!(company = %id, "selected company left the dataset");
            self.selection = SelectionState::Idle;
        }

        self.refresh_employment();
        self.refresh_highlight();
        self.refresh_viewport();

        let diff = RebuildDiff::between(&previous_keys, &self.graph);
        info!(
            companies = self.graph.company_count(),
            contacts = self.graph.contact_count(),
            relationships = self.graph.relationships.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            retained = diff.retained.len(),
            "rebuilt network graph"
        );
        diff
    }

    /// One simulation step plus whatever derived data is due this tick.
    pub fn tick(&mut self) -> TickReport {
        let moved = self.simulation.step(&mut self.graph);
        let mut report = TickReport {
            moved,
            ..TickReport::default()
        };

        if moved {
            self.ticks += 1;
            self.router.update(&self.graph);
            if self.highlight.is_some() {
                self.refresh_annotations();
            }

            let employment_every = self.config.layout.employment_refresh_every.max(1);
            if self.ticks % employment_every == 0 {
                self.refresh_employment();
                report.employment_refreshed = true;
            }

            let viewport_every = self.config.layout.viewport_refresh_every.max(1);
            if self.ticks % viewport_every == 0 {
                self.cull_scheduler.request();
            }
        }

        report.viewport_refreshed = self.service_pending();
        report
    }

    /// Runs the culling pass if one was requested since the last call. The
    /// shell calls this directly while the simulation is paused.
    pub fn service_pending(&mut self) -> bool {
        if !self.cull_scheduler.take() {
            return false;
        }
        self.refresh_viewport();
        true
    }

    /// Steps the camera transition by `dt` seconds.
    pub fn advance_camera(&mut self, dt: f32) -> bool {
        let changed = self.camera.advance(dt);
        if changed {
            self.cull_scheduler.request();
        }
        changed
    }

    pub fn handle(&mut self, event: InteractionEvent) -> Option<Notification> {
        match event {
            InteractionEvent::NodeClicked { node } => self.click_node(node),
            InteractionEvent::NodeHovered { node } => self.hover_node(node),
            InteractionEvent::NodeDragged { node, phase, world } => {
                self.drag_node(node, phase, world);
                None
            }
            InteractionEvent::CameraChanged(input) => {
                let changed = match input {
                    CameraInput::Zoom { anchor, factor } => self.camera.zoom_at(anchor, factor),
                    CameraInput::Pan { delta } => self.camera.pan_by(delta),
                };
                if changed {
                    self.cull_scheduler.request();
                }
                None
            }
            InteractionEvent::MinimapPointer { phase, local } => {
                self.minimap_pointer(phase, local);
                None
            }
        }
    }

    fn click_node(&mut self, node: usize) -> Option<Notification> {
        match &self.graph.nodes.get(node)?.detail {
            NodeDetail::Company(company) => {
                let company = company.clone();
                self.selection.click_company(&company.id);
                self.refresh_highlight();
                Some(Notification::CompanyClicked(company))
            }
            NodeDetail::Contact(contact) => Some(Notification::ContactClicked(contact.clone())),
        }
    }

    fn hover_node(&mut self, node: Option<usize>) -> Option<Notification> {
        let node = node.filter(|&index| {
            self.graph
                .nodes
                .get(index)
                .is_some_and(|node| !node.is_company())
        });
        if node == self.hovered {
            return None;
        }

        self.hovered = node;
        let contact = node
            .and_then(|index| self.graph.nodes[index].as_contact())
            .cloned();
        Some(Notification::ContactHovered(contact))
    }

    fn drag_node(&mut self, node: usize, phase: DragPhase, world: Pos2) {
        if node >= self.graph.nodes.len() {
            return;
        }
        let world_is_finite = world.x.is_finite() && world.y.is_finite();

        match phase {
            DragPhase::Start => {
                if let Some(previous) = self.dragging.take()
                    && previous != node
                {
                    self.release_node(previous);
                }
                self.dragging = Some(node);
                if world_is_finite {
                    self.graph.nodes[node].pinned = Some(world);
                } else {
                    let current = self.graph.nodes[node].position;
                    self.graph.nodes[node].pinned = Some(current);
                }
                self.simulation.reheat();
            }
            DragPhase::Move => {
                if self.dragging != Some(node) || !world_is_finite {
                    return;
                }
                let target = &mut self.graph.nodes[node];
                target.pinned = Some(world);
                target.position = world;
            }
            DragPhase::End => {
                if self.dragging != Some(node) {
                    return;
                }
                self.dragging = None;
                self.release_node(node);
                self.simulation.cool();
            }
        }
    }

    /// Unpins a dragged node. The home company goes back to the canvas center.
    fn release_node(&mut self, node: usize) {
        let is_home = Some(node) == self.graph.home_company();
        let center = self.canvas.center();
        let target = &mut self.graph.nodes[node];
        if is_home {
            target.pinned = Some(center);
            target.position = center;
            target.velocity = Vec2::ZERO;
        } else {
            target.pinned = None;
        }
    }

    fn minimap_pointer(&mut self, phase: PointerPhase, local: Pos2) {
        match phase {
            PointerPhase::Down => self.minimap_dragging = true,
            PointerPhase::Move if self.minimap_dragging => {}
            PointerPhase::Move => return,
            PointerPhase::Up => {
                self.minimap_dragging = false;
                return;
            }
        }

        let Some(frame) = self.minimap.as_ref() else {
            return;
        };
        let world = frame.projector.to_world(local);
        if self.camera.jump_to(world) {
            self.cull_scheduler.request();
        }
    }

    /// Selects a company by id, or clears the selection with `None`.
    /// Unknown ids leave the selection unchanged.
    pub fn set_selection(&mut self, id: Option<&str>) {
        match id {
            None => self.selection = SelectionState::Idle,
            Some(id) if self.graph.company_index(id).is_some() => {
                self.selection = SelectionState::CompanySelected(id.to_owned());
            }
            Some(id) => {
                debug!(company = %id, "ignoring selection of unknown company");
                return;
            }
        }
        self.refresh_highlight();
    }

    pub fn zoom_to_fit(&mut self) -> bool {
        self.camera.zoom_to_fit(self.graph.bounds(false))
    }

    pub fn center_on_home(&mut self) -> bool {
        let Some(home) = self.graph.home_company() else {
            debug!("center on home skipped: no home company");
            return false;
        };
        let position = self.graph.nodes[home].position;
        self.camera.center_on(position, 1.0)
    }

    /// Centers on a company or contact. Fires again for the same id only
    /// when the token changes.
    pub fn request_focus(&mut self, request: FocusRequest) -> bool {
        if self.last_focus.as_ref() == Some(&request) {
            return false;
        }

        let target = self
            .graph
            .company_index(&request.id)
            .or_else(|| self.graph.contact_index(&request.id));
        self.last_focus = Some(request);

        let Some(index) = target else {
            debug!("focus skipped: unknown node id");
            return false;
        };
        let position = self.graph.nodes[index].position;
        self.camera.center_on(position, self.config.camera.focus_zoom)
    }

    pub fn set_toggles(&mut self, toggles: DisplayToggles) {
        if self.toggles != toggles {
            self.toggles = toggles;
            self.refresh_render_state();
        }
    }

    pub fn set_filter(&mut self, filter: RelationshipFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.router.assign(&self.graph, &self.filter);
            self.router.update(&self.graph);
            self.refresh_render_state();
        }
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.camera.viewport() != viewport {
            self.camera.set_viewport(viewport);
            self.cull_scheduler.request();
        }
    }

    pub fn set_minimap_rect(&mut self, rect: Option<Rect>) {
        self.minimap_rect = rect;
    }

    pub fn surface_rect(&self, handle: SurfaceHandle) -> Option<Rect> {
        match handle.kind {
            SurfaceKind::Primary => Some(self.camera.viewport()),
            SurfaceKind::Minimap => self.minimap_rect,
        }
    }

    pub fn measure_labels(&mut self, measure: &dyn TextMeasure) {
        self.router.measure_labels(&self.graph, measure);
    }

    /// Topmost visible node under a screen point. Contacts are drawn above
    /// companies, so they win ties.
    pub fn node_at(&self, screen: Pos2) -> Option<usize> {
        let transform = self.camera.transform();
        let world = transform.invert(screen);
        let slop = self.config.lod.hit_slop / transform.k;

        let hit = |index: &usize| {
            let index = *index;
            let node = &self.graph.nodes[index];
            let style_visible = self
                .render_state
                .nodes
                .get(index)
                .is_none_or(|style| style.visible);
            style_visible
                && !self.cull.is_hidden(index)
                && node.position.distance(world) <= node.radius + slop
        };

        self.graph
            .contact_indices()
            .rev()
            .find(hit)
            .or_else(|| self.graph.company_indices().rev().find(hit))
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        self.camera.transform().invert(screen)
    }

    fn refresh_employment(&mut self) {
        self.employment_segments.clear();
        self.employment_segments.extend(self.graph.employment.iter().map(|edge| {
            [
                self.graph.nodes[edge.contact].position,
                self.graph.nodes[edge.company].position,
            ]
        }));
    }

    fn refresh_highlight(&mut self) {
        self.highlight = self
            .selection
            .selected_id()
            .and_then(|id| self.graph.company_index(id))
            .map(|index| Highlight::compute(&self.graph, index, &self.config.highlight));
        self.refresh_render_state();
        self.refresh_annotations();
        self.refresh_minimap();
    }

    fn refresh_render_state(&mut self) {
        self.render_state = derive_render_state(
            &self.graph,
            &self.toggles,
            &self.filter,
            self.highlight.as_ref(),
            &self.config.highlight,
        );
    }

    fn refresh_annotations(&mut self) {
        self.annotations = match &self.highlight {
            Some(highlight) => annotate_key_players(&self.graph, highlight, &self.config.highlight),
            None => Vec::new(),
        };
    }

    fn refresh_minimap(&mut self) {
        self.camera.set_translate_extent(self.graph.bounds(true));
        self.minimap = build_frame(
            &self.graph,
            self.highlight.as_ref(),
            self.camera.visible_world_rect(),
            &self.config.minimap,
        );
    }

    fn refresh_viewport(&mut self) {
        let rect = lod::visible_world_rect(
            self.camera.transform(),
            self.camera.viewport(),
            self.config.lod.cull_margin,
        );
        self.cull.update(&self.graph.nodes, rect);
        self.refresh_minimap();
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn router(&self) -> &EdgeRouter {
        &self.router
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    pub fn annotations(&self) -> &[KeyPlayerAnnotation] {
        &self.annotations
    }

    pub fn employment_segment(&self, edge: usize) -> Option<[Pos2; 2]> {
        self.employment_segments.get(edge).copied()
    }

    pub fn minimap(&self) -> Option<&MinimapFrame> {
        self.minimap.as_ref()
    }

    pub fn toggles(&self) -> DisplayToggles {
        self.toggles
    }

    pub fn filter(&self) -> &RelationshipFilter {
        &self.filter
    }

    pub fn is_culled(&self, node: usize) -> bool {
        self.cull.is_hidden(node)
    }

    pub fn visible_node_count(&self) -> usize {
        self.cull.visible_count
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn canvas_center(&self) -> Pos2 {
        self.canvas.center()
    }

    pub fn stroke_sizes(&self) -> StrokeSizes {
        StrokeSizes::for_zoom(self.camera.zoom(), &self.config.lod)
    }

    pub fn show_company_text(&self) -> bool {
        self.toggles.company_text && lod::show_company_text(self.camera.zoom(), &self.config.lod)
    }
}

impl GraphControls for GraphEngine {
    fn zoom_to_fit(&mut self) -> bool {
        GraphEngine::zoom_to_fit(self)
    }

    fn center_on_home(&mut self) -> bool {
        GraphEngine::center_on_home(self)
    }

    fn primary_surface(&self) -> SurfaceHandle {
        SurfaceHandle {
            kind: SurfaceKind::Primary,
        }
    }

    fn minimap_surface(&self) -> SurfaceHandle {
        SurfaceHandle {
            kind: SurfaceKind::Minimap,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::engine::graph::tests::{company, contact, relationship};
    use crate::network::RelationshipKind;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(1200.0, 800.0))
    }

    fn snapshot() -> NetworkSnapshot {
        let mut home = company("home", 120);
        home.is_home = true;
        NetworkSnapshot {
            companies: vec![home, company("a", 500), company("b", 50)],
            contacts: vec![
                contact("a1", "a", 5.0, 2.0),
                contact("a2", "a", 3.0, 1.0),
                contact("b1", "b", 4.0, 3.0),
            ],
            relationships: vec![relationship("home", "a", RelationshipKind::Lead)],
            ..Default::default()
        }
    }

    #[test]
    fn tick_cadence_refreshes_on_schedule() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());

        let first = engine.tick();
        assert!(first.moved);
        assert!(first.viewport_refreshed);
        assert!(!first.employment_refreshed);

        let second = engine.tick();
        let third = engine.tick();
        assert!(!second.employment_refreshed && !second.viewport_refreshed);
        assert!(third.employment_refreshed);

        for _ in 3..9 {
            engine.tick();
        }
        assert!(engine.tick().viewport_refreshed);
    }

    #[test]
    fn camera_input_is_serviced_once() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        engine.tick();

        for _ in 0..5 {
            engine.handle(InteractionEvent::CameraChanged(CameraInput::Zoom {
                anchor: pos2(600.0, 400.0),
                factor: 1.05,
            }));
        }
        assert!(engine.tick().viewport_refreshed);
        assert!(!engine.tick().viewport_refreshed);
    }

    #[test]
    fn rebuild_reports_diff() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        let first = engine.rebuild(&snapshot());
        assert_eq!(first.added.len(), 6);

        let mut next = snapshot();
        next.contacts.pop();
        next.companies.push(company("c", 10));
        let diff = engine.rebuild(&next);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.retained.len(), 5);
    }

    #[test]
    fn clicking_contact_keeps_selection() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        let a = engine.graph().company_index("a").unwrap();
        let a1 = engine.graph().contact_index("a1").unwrap();

        let notification = engine.handle(InteractionEvent::NodeClicked { node: a });
        assert!(matches!(notification, Some(Notification::CompanyClicked(ref info)) if info.id == "a"));
        let notification = engine.handle(InteractionEvent::NodeClicked { node: a1 });
        assert!(matches!(notification, Some(Notification::ContactClicked(_))));
        assert_eq!(engine.selection().selected_id(), Some("a"));
    }

    #[test]
    fn hover_reports_changes_only() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        let a1 = engine.graph().contact_index("a1").unwrap();

        let first = engine.handle(InteractionEvent::NodeHovered { node: Some(a1) });
        assert!(matches!(first, Some(Notification::ContactHovered(Some(_)))));
        assert_eq!(engine.handle(InteractionEvent::NodeHovered { node: Some(a1) }), None);
        assert_eq!(
            engine.handle(InteractionEvent::NodeHovered { node: None }),
            Some(Notification::ContactHovered(None))
        );
    }

    #[test]
    fn rebuild_without_selected_company_goes_idle() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        engine.set_selection(Some("b"));
        assert!(engine.highlight().is_some());

        let mut next = snapshot();
        next.companies.retain(|company| company.id != "b");
        engine.rebuild(&next);
        assert_eq!(engine.selection(), &SelectionState::Idle);
        assert!(engine.highlight().is_none());
    }

    #[test]
    fn preserve_positions_keeps_retained_nodes() {
        let mut config = EngineConfig::default();
        config.layout.preserve_positions = true;
        let mut engine = GraphEngine::new(config, viewport());
        engine.rebuild(&snapshot());
        for _ in 0..20 {
            engine.tick();
        }
        let a = engine.graph().company_index("a").unwrap();
        let before = engine.graph().nodes[a].position;

        engine.rebuild(&snapshot());
        assert_eq!(engine.graph().nodes[a].position, before);
    }

    #[test]
    fn node_at_finds_company_under_pointer() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        let home = engine.graph().home_company().unwrap();
        let screen = engine
            .camera()
            .transform()
            .apply(engine.graph().nodes[home].position);
        assert_eq!(engine.node_at(screen), Some(home));
        assert_eq!(engine.node_at(pos2(-5000.0, -5000.0)), None);
    }

    #[test]
    fn surfaces_resolve_to_rects() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        let minimap = engine.minimap_surface();
        assert_eq!(engine.surface_rect(minimap), None);
        let rect = Rect::from_min_size(pos2(980.0, 640.0), vec2(200.0, 140.0));
        engine.set_minimap_rect(Some(rect));
        assert_eq!(engine.surface_rect(minimap), Some(rect));
        assert_eq!(engine.surface_rect(engine.primary_surface()), Some(viewport()));
    }

    fn drag(engine: &mut GraphEngine, node: usize, phase: DragPhase, world: Pos2) {
        engine.handle(InteractionEvent::NodeDragged { node, phase, world });
    }

    #[test]
    fn release_of_another_node_keeps_the_drag() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        let a = engine.graph().company_index("a").unwrap();
        let b = engine.graph().company_index("b").unwrap();

        drag(&mut engine, a, DragPhase::Start, pos2(5.0, 5.0));
        drag(&mut engine, b, DragPhase::End, pos2(5.0, 5.0));
        assert_eq!(engine.dragging, Some(a));
        assert_eq!(engine.graph().nodes[a].pinned, Some(pos2(5.0, 5.0)));
        assert!(engine.simulation().alpha_target() > 0.0);

        drag(&mut engine, a, DragPhase::End, pos2(5.0, 5.0));
        assert_eq!(engine.dragging, None);
        assert_eq!(engine.graph().nodes[a].pinned, None);
        assert_eq!(engine.simulation().alpha_target(), 0.0);

        let mut ticks = 0;
        while !engine.simulation().is_settled() && ticks < 5000 {
            engine.tick();
            ticks += 1;
        }
        assert!(engine.simulation().is_settled());
    }

    #[test]
    fn starting_a_new_drag_releases_the_previous_node() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        let home = engine.graph().home_company().unwrap();
        let a = engine.graph().company_index("a").unwrap();
        let b = engine.graph().company_index("b").unwrap();

        drag(&mut engine, a, DragPhase::Start, pos2(5.0, 5.0));
        drag(&mut engine, b, DragPhase::Start, pos2(50.0, 50.0));
        assert_eq!(engine.dragging, Some(b));
        assert_eq!(engine.graph().nodes[a].pinned, None);
        assert_eq!(engine.graph().nodes[b].pinned, Some(pos2(50.0, 50.0)));

        drag(&mut engine, home, DragPhase::Start, pos2(300.0, 300.0));
        drag(&mut engine, home, DragPhase::Move, pos2(320.0, 310.0));
        drag(&mut engine, b, DragPhase::Start, pos2(60.0, 60.0));
        let center = engine.canvas_center();
        assert_eq!(engine.graph().nodes[home].pinned, Some(center));
        assert_eq!(engine.graph().nodes[home].position, center);
        assert_eq!(engine.graph().nodes[b].pinned, Some(pos2(60.0, 60.0)));
    }

    #[test]
    fn viewport_refresh_sets_translate_extent_from_companies() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        assert!(engine.tick().viewport_refreshed);

        let margin = engine.config().camera.pan_margin;
        let bounds = engine.graph().bounds(true).unwrap();
        assert_eq!(engine.camera().translate_extent(), Some(bounds.expand(margin)));
    }

    #[test]
    fn selection_change_recomputes_translate_extent() {
        let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
        engine.rebuild(&snapshot());
        engine.tick();
        let a = engine.graph().company_index("a").unwrap();

        let far = pos2(9000.0, -9000.0);
        drag(&mut engine, a, DragPhase::Start, far);
        drag(&mut engine, a, DragPhase::Move, far);
        engine.set_selection(Some("b"));

        let margin = engine.config().camera.pan_margin;
        let bounds = engine.graph().bounds(true).unwrap();
        assert!(bounds.contains(far));
        assert_eq!(engine.camera().translate_extent(), Some(bounds.expand(margin)));
    }
}
