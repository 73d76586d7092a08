use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Company id the network builder uses for contacts it could not place.
pub const UNASSIGNED_COMPANY_ID: &str = "unassigned";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Lead,
    Customer,
    Partner,
    Investor,
    Competitor,
    Inferred,
}

impl RelationshipKind {
    pub const ALL: [Self; 6] = [
        Self::Lead,
        Self::Customer,
        Self::Partner,
        Self::Investor,
        Self::Competitor,
        Self::Inferred,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Customer => "Customer",
            Self::Partner => "Partner",
            Self::Investor => "Investor",
            Self::Competitor => "Competitor",
            Self::Inferred => "Inferred",
        }
    }

    /// Partner and competitor links read the same in both directions.
    pub fn is_bidirectional(self) -> bool {
        matches!(self, Self::Partner | Self::Competitor)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    #[serde(default = "default_employee_count")]
    pub employee_count: u32,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub is_home: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub seniority: f32,
    #[serde(default)]
    pub influence: f32,
    #[serde(default)]
    pub is_home: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    #[serde(default = "default_strength")]
    pub strength: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,
    #[serde(default)]
    pub contacts: Vec<ContactRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
    /// Company id to `#rrggbb` display color.
    #[serde(default)]
    pub company_colors: HashMap<String, String>,
}

impl NetworkSnapshot {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty() && self.contacts.is_empty()
    }

    pub fn element_count(&self) -> usize {
        self.companies.len() + self.contacts.len()
    }
}

fn default_employee_count() -> u32 {
    1
}

fn default_strength() -> f32 {
    0.5
}
