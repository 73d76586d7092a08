use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use contact_graph::engine::graph::NetworkGraph;
use contact_graph::engine::options::FocusRequest;
use contact_graph::engine::palette::relationship_color;
use contact_graph::network::RelationshipKind;

use super::super::ViewModel;

const SEARCH_RESULT_LIMIT: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Companies whose name fuzzily matches `query`, best first, as
/// `(id, name)` pairs.
fn search_companies(graph: &NetworkGraph, query: &str, limit: usize) -> Vec<(String, String)> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = graph
        .company_indices()
        .filter_map(|index| {
            let company = graph.nodes[index].as_company()?;
            let score = fuzzy_match_score(&matcher, &company.name, query)?;
            Some((score, company.id.clone(), company.name.clone()))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.2.cmp(&b.2)));
    scored.truncate(limit);
    scored.into_iter().map(|(_, id, name)| (id, name)).collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Display");
        ui.add_space(4.0);
        ui.checkbox(&mut self.toggles.company_text, "Company names");
        ui.checkbox(&mut self.toggles.contact_dots, "Contact dots");
        ui.checkbox(&mut self.toggles.contact_lines, "Employment lines");
        ui.checkbox(&mut self.toggles.relationship_labels, "Relationship labels");
        ui.checkbox(&mut self.show_minimap, "Minimap");
        ui.checkbox(&mut self.show_fps_bar, "FPS readout");

        ui.separator();
        ui.heading("Relationships");
        ui.add_space(4.0);
        for kind in RelationshipKind::ALL {
            let mut visible = self.filter.allows(kind);
            let label = RichText::new(kind.label()).color(relationship_color(kind));
            if ui.checkbox(&mut visible, label).changed() {
                self.filter.set(kind, visible);
            }
        }
        ui.horizontal(|ui| {
            if ui.small_button("All").clicked() {
                for kind in RelationshipKind::ALL {
                    self.filter.set(kind, true);
                }
            }
            if ui.small_button("None").clicked() {
                for kind in RelationshipKind::ALL {
                    self.filter.set(kind, false);
                }
            }
        });

        ui.separator();
        ui.heading("Layout");
        ui.add_space(4.0);
        ui.checkbox(&mut self.live_physics, "Live physics");
        if let Some(engine) = self.engine.as_ref() {
            let simulation = engine.simulation();
            ui.small(format!(
                "alpha {:.3}{}",
                simulation.alpha(),
                if simulation.is_settled() { " (settled)" } else { "" }
            ));
        }

        ui.separator();
        ui.heading("Find company");
        ui.add_space(4.0);
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("fuzzy search")
                .desired_width(f32::INFINITY),
        );

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let results = search_companies(engine.graph(), &self.search, SEARCH_RESULT_LIMIT);
        if results.is_empty() && !self.search.trim().is_empty() {
            ui.small("No matching companies.");
        }

        for (id, name) in results {
            if ui.link(name).clicked() {
                self.focus_token += 1;
                engine.request_focus(FocusRequest::new(id, self.focus_token));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use contact_graph::engine::config::SizingConfig;
    use contact_graph::network::{CompanyRecord, NetworkSnapshot};

    use super::*;

    fn company(id: &str, name: &str) -> CompanyRecord {
        CompanyRecord {
            id: id.to_owned(),
            name: name.to_owned(),
            employee_count: 100,
            industry: String::new(),
            is_home: false,
        }
    }

    fn graph() -> NetworkGraph {
        NetworkGraph::build(
            &NetworkSnapshot {
                companies: vec![
                    company("acme", "Acme Corporation"),
                    company("globex", "Globex"),
                    company("initech", "Initech"),
                ],
                ..Default::default()
            },
            &SizingConfig::default(),
            vec2(800.0, 600.0),
        )
    }

    #[test]
    fn search_is_case_insensitive_and_ranked() {
        let results = search_companies(&graph(), "ACME", 5);
        assert_eq!(results.first().map(|(id, _)| id.as_str()), Some("acme"));
    }

    #[test]
    fn blank_query_returns_nothing() {
        assert!(search_companies(&graph(), "   ", 5).is_empty());
    }

    #[test]
    fn results_are_capped() {
        assert_eq!(search_companies(&graph(), "c", 1).len(), 1);
    }
}
