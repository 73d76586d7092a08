use eframe::egui::{RichText, Ui};

use contact_graph::engine::GraphEngine;
use contact_graph::engine::graph::ContactInfo;
use contact_graph::engine::palette::relationship_color;
use contact_graph::network::RelationshipKind;

use super::super::ViewModel;

/// What the details panel asked for this frame.
enum DetailsAction {
    Select(String),
    Clear,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(engine) = self.engine.as_mut() else {
            ui.label("Waiting for the network to load.");
            return;
        };

        let action = draw_selected_company(ui, engine);
        match action {
            Some(DetailsAction::Select(id)) => engine.set_selection(Some(id.as_str())),
            Some(DetailsAction::Clear) => engine.set_selection(None),
            None => {}
        }

        ui.separator();
        ui.label(RichText::new("Last hovered contact").strong());
        draw_contact(ui, self.hovered_contact.as_ref());

        ui.add_space(6.0);
        ui.label(RichText::new("Last clicked contact").strong());
        draw_contact(ui, self.clicked_contact.as_ref());
    }
}

fn draw_selected_company(ui: &mut Ui, engine: &GraphEngine) -> Option<DetailsAction> {
    let graph = engine.graph();
    let Some(highlight) = engine.highlight() else {
        ui.label("Click a company to see its relationships.");
        return None;
    };
    let company = graph
        .nodes
        .get(highlight.selected)
        .and_then(|node| node.as_company())?;

    let mut action = None;

    ui.label(RichText::new(company.name.as_str()).strong().color(company.color));
    ui.small(company.id.as_str());
    if !company.industry.is_empty() {
        ui.label(format!("Industry: {}", company.industry));
    }
    ui.label(format!("Employees: {}", company.employee_count));
    ui.label(format!(
        "Contacts in network: {}",
        graph.contacts_of(highlight.selected).len()
    ));
    if ui.button("Clear selection").clicked() {
        action = Some(DetailsAction::Clear);
    }

    ui.separator();
    ui.label(RichText::new("Connected companies").strong());
    if highlight.connected.is_empty() {
        ui.label("No relationships.");
    }
    for kind in RelationshipKind::ALL {
        let mut names = highlight
            .connected
            .iter()
            .filter(|(_, connected_kind)| **connected_kind == kind)
            .filter_map(|(&index, _)| {
                let company = graph.nodes.get(index)?.as_company()?;
                Some((company.name.clone(), company.id.clone()))
            })
            .collect::<Vec<_>>();
        if names.is_empty() {
            continue;
        }
        names.sort();

        ui.label(RichText::new(kind.label()).color(relationship_color(kind)));
        ui.indent(("connected", kind.label()), |ui| {
            for (name, id) in names {
                if ui.link(name).clicked() {
                    action = Some(DetailsAction::Select(id));
                }
            }
        });
    }

    ui.separator();
    ui.label(RichText::new("Key players").strong());
    if highlight.key_players.is_empty() {
        ui.label("No senior contacts.");
    }
    for &index in &highlight.key_players {
        let Some(contact) = graph.nodes.get(index).and_then(|node| node.as_contact()) else {
            continue;
        };
        ui.horizontal(|ui| {
            ui.label(contact.name.as_str());
            if !contact.title.is_empty() {
                ui.small(contact.title.as_str());
            }
            ui.small(format!("seniority {:.0}", contact.seniority));
        });
    }

    action
}

fn draw_contact(ui: &mut Ui, contact: Option<&ContactInfo>) {
    let Some(contact) = contact else {
        ui.small("None");
        return;
    };

    ui.label(contact.name.as_str());
    if !contact.title.is_empty() {
        ui.small(contact.title.as_str());
    }
    ui.small(format!(
        "seniority {:.1}  |  influence {:.1}",
        contact.seniority, contact.influence
    ));
}
