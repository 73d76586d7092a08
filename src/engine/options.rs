use std::collections::BTreeSet;

use crate::network::RelationshipKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisplayToggles {
    pub company_text: bool,
    pub contact_dots: bool,
    pub contact_lines: bool,
    pub relationship_labels: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            company_text: true,
            contact_dots: true,
            contact_lines: true,
            relationship_labels: false,
        }
    }
}

impl DisplayToggles {
    /// Every on/off combination of the four toggles.
    pub fn all_combinations() -> impl Iterator<Item = Self> {
        (0u8..16).map(|bits| Self {
            company_text: bits & 1 != 0,
            contact_dots: bits & 2 != 0,
            contact_lines: bits & 4 != 0,
            relationship_labels: bits & 8 != 0,
        })
    }
}

/// Relationship kinds currently drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipFilter {
    visible: BTreeSet<RelationshipKind>,
}

impl Default for RelationshipFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl RelationshipFilter {
    pub fn all() -> Self {
        Self {
            visible: RelationshipKind::ALL.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self {
            visible: BTreeSet::new(),
        }
    }

    pub fn only(kinds: impl IntoIterator<Item = RelationshipKind>) -> Self {
        Self {
            visible: kinds.into_iter().collect(),
        }
    }

    pub fn allows(&self, kind: RelationshipKind) -> bool {
        self.visible.contains(&kind)
    }

    pub fn set(&mut self, kind: RelationshipKind, visible: bool) {
        if visible {
            self.visible.insert(kind);
        } else {
            self.visible.remove(&kind);
        }
    }
}

/// Request to center the camera on a node. A new token re-triggers the same
/// id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub id: String,
    pub token: u64,
}

impl FocusRequest {
    pub fn new(id: impl Into<String>, token: u64) -> Self {
        Self {
            id: id.into(),
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_distinct_toggle_combinations() {
        let all = DisplayToggles::all_combinations().collect::<Vec<_>>();
        assert_eq!(all.len(), 16);
        let unique = all.iter().collect::<std::collections::HashSet<_>>();
        assert_eq!(unique.len(), 16);
    }

    #[test]
    fn filter_toggles_kinds() {
        let mut filter = RelationshipFilter::all();
        assert!(filter.allows(RelationshipKind::Partner));
        filter.set(RelationshipKind::Partner, false);
        assert!(!filter.allows(RelationshipKind::Partner));
        assert!(filter.allows(RelationshipKind::Lead));
        assert!(!RelationshipFilter::none().allows(RelationshipKind::Lead));
    }
}
