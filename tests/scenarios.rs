use contact_graph::engine::config::EngineConfig;
use contact_graph::engine::lod::circle_in_view;
use contact_graph::engine::options::{DisplayToggles, FocusRequest, RelationshipFilter};
use contact_graph::engine::palette::relationship_color;
use contact_graph::engine::{
    DragPhase, GraphControls, GraphEngine, InteractionEvent, PointerPhase,
};
use contact_graph::network::{
    CompanyRecord, ContactRecord, NetworkSnapshot, RelationshipKind, RelationshipRecord,
};
use eframe::egui::{Rect, pos2, vec2};
use pretty_assertions::assert_eq;

fn viewport() -> Rect {
    Rect::from_min_size(pos2(0.0, 0.0), vec2(1200.0, 800.0))
}

fn company(id: &str, employee_count: u32) -> CompanyRecord {
    CompanyRecord {
        id: id.to_owned(),
        name: id.to_owned(),
        employee_count,
        industry: "software".to_owned(),
        is_home: false,
    }
}

fn contact(id: &str, company_id: &str, seniority: f32) -> ContactRecord {
    ContactRecord {
        id: id.to_owned(),
        name: id.to_owned(),
        title: "Manager".to_owned(),
        company_id: Some(company_id.to_owned()),
        seniority,
        influence: seniority * 0.5,
        is_home: false,
    }
}

fn relationship(source: &str, target: &str, kind: RelationshipKind) -> RelationshipRecord {
    RelationshipRecord {
        source: source.to_owned(),
        target: target.to_owned(),
        kind,
        strength: 0.5,
    }
}

fn abc_snapshot() -> NetworkSnapshot {
    let contacts = (0..10)
        .map(|index| {
            let company_id = ["A", "B", "C"][index % 3];
            contact(&format!("p{index}"), company_id, (index % 6) as f32)
        })
        .collect();

    NetworkSnapshot {
        companies: vec![company("A", 500), company("B", 50), company("C", 5000)],
        contacts,
        relationships: vec![relationship("A", "B", RelationshipKind::Partner)],
        ..Default::default()
    }
}

fn settle(engine: &mut GraphEngine) -> usize {
    let mut ticks = 0;
    while engine.tick().moved {
        ticks += 1;
        assert!(ticks < 2_000, "simulation did not settle");
    }
    ticks
}

fn finish_camera(engine: &mut GraphEngine) {
    for _ in 0..120 {
        engine.advance_camera(1.0 / 60.0);
    }
    engine.tick();
}

#[test]
fn selecting_a_dims_c_and_recolors_b_on_the_minimap() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());
    settle(&mut engine);

    let graph = engine.graph();
    let a = graph.company_index("A").unwrap();
    let b = graph.company_index("B").unwrap();
    let c = graph.company_index("C").unwrap();

    engine.set_selection(Some("A"));
    let dimmed = engine.config().highlight.dimmed_opacity;
    let state = engine.render_state();
    assert_eq!(state.nodes[a].opacity, 1.0);
    assert_eq!(state.nodes[b].opacity, 1.0);
    assert_eq!(state.nodes[c].opacity, dimmed);

    let minimap = engine.minimap().unwrap();
    assert_eq!(
        minimap.dot(b).unwrap().color,
        relationship_color(RelationshipKind::Partner)
    );
    assert_ne!(minimap.dot(c).unwrap().color, engine.graph().nodes[c].as_company().unwrap().color);
}

#[test]
fn lead_and_customer_fan_out_then_collapse() {
    let mut snapshot = NetworkSnapshot {
        companies: vec![company("X", 200), company("Y", 200)],
        relationships: vec![
            relationship("X", "Y", RelationshipKind::Lead),
            relationship("Y", "X", RelationshipKind::Customer),
        ],
        ..Default::default()
    };

    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&snapshot);
    engine.tick();

    let first = *engine.router().route(0).unwrap();
    let second = *engine.router().route(1).unwrap();
    assert!(first.is_curved() && second.is_curved());
    assert!(first.offset * second.offset < 0.0);
    assert!(first.point_at(0.5).distance(second.point_at(0.5)) > 1.0);

    snapshot.relationships.pop();
    engine.rebuild(&snapshot);
    engine.tick();

    let graph = engine.graph();
    let route = engine.router().route(0).unwrap();
    assert!(!route.is_curved());
    let x = &graph.nodes[graph.company_index("X").unwrap()];
    let padding = engine.config().routing.endpoint_padding;
    assert!((route.start.distance(x.position) - (x.radius + padding)).abs() < 1e-3);
}

#[test]
fn dragged_home_company_snaps_back_to_center() {
    let mut snapshot = abc_snapshot();
    snapshot.companies[0].is_home = true;

    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&snapshot);
    let home = engine.graph().home_company().unwrap();
    let center = engine.canvas_center();

    let world = pos2(center.x - 250.0, center.y + 120.0);
    engine.handle(InteractionEvent::NodeDragged {
        node: home,
        phase: DragPhase::Start,
        world,
    });
    engine.handle(InteractionEvent::NodeDragged {
        node: home,
        phase: DragPhase::Move,
        world,
    });
    for _ in 0..5 {
        engine.tick();
    }
    assert_eq!(engine.graph().nodes[home].position, world);

    engine.handle(InteractionEvent::NodeDragged {
        node: home,
        phase: DragPhase::End,
        world,
    });
    engine.tick();

    let node = &engine.graph().nodes[home];
    assert_eq!(node.position, center);
    assert_eq!(node.pinned, Some(center));
}

#[test]
fn released_company_rejoins_the_simulation() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());
    let b = engine.graph().company_index("B").unwrap();

    engine.handle(InteractionEvent::NodeDragged {
        node: b,
        phase: DragPhase::Start,
        world: pos2(10.0, 10.0),
    });
    assert!(engine.graph().nodes[b].pinned.is_some());
    engine.handle(InteractionEvent::NodeDragged {
        node: b,
        phase: DragPhase::End,
        world: pos2(10.0, 10.0),
    });
    assert!(engine.graph().nodes[b].pinned.is_none());
    assert_eq!(engine.simulation().alpha_target(), 0.0);
}

#[test]
fn zoom_to_fit_shows_every_node() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());
    settle(&mut engine);

    assert!(GraphControls::zoom_to_fit(&mut engine));
    finish_camera(&mut engine);

    let transform = engine.camera().transform();
    for node in &engine.graph().nodes {
        let screen = transform.apply(node.position);
        assert!(viewport().contains(screen), "{} at {screen:?}", node.id());
    }
}

#[test]
fn zoom_to_fit_on_empty_graph_is_a_noop() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&NetworkSnapshot::default());
    let before = engine.camera().transform();
    assert!(!engine.zoom_to_fit());
    assert!(!engine.center_on_home());
    assert_eq!(engine.camera().transform(), before);
}

#[test]
fn deselecting_restores_render_state_for_every_toggle_combination() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());
    for _ in 0..30 {
        engine.tick();
    }

    for toggles in DisplayToggles::all_combinations() {
        engine.set_toggles(toggles);
        let before = engine.render_state().clone();

        engine.set_selection(Some("A"));
        assert!(engine.highlight().is_some());
        engine.tick();
        engine.set_selection(None);

        assert_eq!(engine.render_state(), &before);
    }
}

#[test]
fn clicking_selected_company_returns_to_idle() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());
    let a = engine.graph().company_index("A").unwrap();
    let before = engine.render_state().clone();

    engine.handle(InteractionEvent::NodeClicked { node: a });
    assert_eq!(engine.selection().selected_id(), Some("A"));
    engine.handle(InteractionEvent::NodeClicked { node: a });
    assert_eq!(engine.selection().selected_id(), None);
    assert_eq!(engine.render_state(), &before);
}

#[test]
fn culling_never_hides_a_node_on_screen() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());
    settle(&mut engine);

    let a = engine.graph().company_index("A").unwrap();
    let focus = engine.graph().nodes[a].position;
    engine.request_focus(FocusRequest::new("A", 1));
    finish_camera(&mut engine);

    let transform = engine.camera().transform();
    for (index, node) in engine.graph().nodes.iter().enumerate() {
        let on_screen = circle_in_view(
            transform.apply(node.position),
            node.radius * transform.k,
            viewport(),
        );
        if on_screen {
            assert!(!engine.is_culled(index), "{} culled while on screen", node.id());
        }
    }
    assert!(!engine.is_culled(a));
    assert!((engine.camera().world_center() - focus).length() < 1e-2);
}

#[test]
fn focus_requests_retrigger_on_new_tokens() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());

    assert!(engine.request_focus(FocusRequest::new("B", 1)));
    assert!(!engine.request_focus(FocusRequest::new("B", 1)));
    assert!(engine.request_focus(FocusRequest::new("B", 2)));
    assert!(engine.request_focus(FocusRequest::new("p3", 3)));
    assert!(!engine.request_focus(FocusRequest::new("nobody", 4)));
}

#[test]
fn dangling_references_never_reach_the_layout() {
    let mut snapshot = abc_snapshot();
    snapshot
        .relationships
        .push(relationship("A", "ghost", RelationshipKind::Lead));
    snapshot
        .relationships
        .push(relationship("C", "C", RelationshipKind::Competitor));
    snapshot.contacts.push(contact("drifter", "nowhere", 3.0));

    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&snapshot);

    let graph = engine.graph();
    assert_eq!(graph.relationships.len(), 1);
    assert_eq!(graph.contact_count(), 10);
    assert!(graph.contact_index("drifter").is_none());
}

#[test]
fn layout_settles_without_nan() {
    let mut snapshot = abc_snapshot();
    snapshot.companies[2].is_home = true;
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&snapshot);

    let ticks = settle(&mut engine);
    assert!(ticks <= engine.config().forces.settle_ticks as usize + 1);
    assert!(engine.simulation().is_settled());
    for node in &engine.graph().nodes {
        assert!(node.position.x.is_finite() && node.position.y.is_finite());
    }
}

#[test]
fn minimap_drag_recenters_the_camera() {
    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&abc_snapshot());
    settle(&mut engine);

    let local = pos2(30.0, 40.0);
    let target = engine.minimap().unwrap().projector.to_world(local);
    engine.handle(InteractionEvent::MinimapPointer {
        phase: PointerPhase::Down,
        local,
    });
    assert!((engine.camera().world_center() - target).length() < 1e-2);

    let next = pos2(120.0, 90.0);
    let next_target = engine.minimap().unwrap().projector.to_world(next);
    engine.handle(InteractionEvent::MinimapPointer {
        phase: PointerPhase::Move,
        local: next,
    });
    assert!((engine.camera().world_center() - next_target).length() < 1e-2);

    engine.handle(InteractionEvent::MinimapPointer {
        phase: PointerPhase::Up,
        local: next,
    });
    let after_release = engine.camera().world_center();
    engine.handle(InteractionEvent::MinimapPointer {
        phase: PointerPhase::Move,
        local,
    });
    assert_eq!(engine.camera().world_center(), after_release);
}

#[test]
fn hidden_kinds_leave_the_pair_group() {
    let snapshot = NetworkSnapshot {
        companies: vec![company("X", 200), company("Y", 200)],
        relationships: vec![
            relationship("X", "Y", RelationshipKind::Lead),
            relationship("Y", "X", RelationshipKind::Customer),
        ],
        ..Default::default()
    };

    let mut engine = GraphEngine::new(EngineConfig::default(), viewport());
    engine.rebuild(&snapshot);
    engine.set_filter(RelationshipFilter::only([RelationshipKind::Lead]));

    assert!(engine.router().route(1).is_none());
    assert!(!engine.router().route(0).unwrap().is_curved());
    assert!(!engine.render_state().relationships[1].visible);
}
