use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tuning knobs for every engine component. All sections default, so a JSON
/// file only needs the values it overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sizing: SizingConfig,
    pub forces: ForceConfig,
    pub layout: LayoutConfig,
    pub routing: RoutingConfig,
    pub camera: CameraConfig,
    pub lod: LodConfig,
    pub minimap: MinimapConfig,
    pub highlight: HighlightConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Node count above which the tighter large-network constants apply.
    pub large_network_threshold: usize,
    pub min_fraction: f32,
    pub max_fraction: f32,
    pub large_min_fraction: f32,
    pub large_max_fraction: f32,
    pub min_radius_floor: f32,
    pub exponent: f32,
    pub home_fraction: f32,
    pub contact_base: f32,
    pub contact_span: f32,
    pub large_contact_base: f32,
    pub large_contact_span: f32,
    pub home_contact_bonus: f32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            large_network_threshold: 200,
            min_fraction: 0.018,
            max_fraction: 0.07,
            large_min_fraction: 0.012,
            large_max_fraction: 0.045,
            min_radius_floor: 6.0,
            exponent: 0.6,
            home_fraction: 0.9,
            contact_base: 3.5,
            contact_span: 4.0,
            large_contact_base: 2.5,
            large_contact_span: 2.5,
            home_contact_bonus: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub company_charge_factor: f32,
    pub home_contact_charge: f32,
    pub contact_charge: f32,
    pub large_contact_charge: f32,
    pub link_distance: f32,
    pub large_link_distance: f32,
    pub link_strength: f32,
    pub center_strength: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub theta: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub settle_ticks: u32,
    pub large_settle_ticks: u32,
    pub reheat_target: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            company_charge_factor: 0.15,
            home_contact_charge: -60.0,
            contact_charge: -30.0,
            large_contact_charge: -12.0,
            link_distance: 45.0,
            large_link_distance: 25.0,
            link_strength: 0.7,
            center_strength: 0.02,
            collision_padding: 4.0,
            collision_strength: 0.7,
            theta: 0.9,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            settle_ticks: 300,
            large_settle_ticks: 120,
            reheat_target: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Keep positions of nodes that survive a rebuild instead of re-seeding.
    pub preserve_positions: bool,
    pub employment_refresh_every: u64,
    pub viewport_refresh_every: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            preserve_positions: false,
            employment_refresh_every: 3,
            viewport_refresh_every: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub curve_spacing: f32,
    pub endpoint_padding: f32,
    pub label_nudge: f32,
    pub label_padding_x: f32,
    pub label_padding_y: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            curve_spacing: 0.22,
            endpoint_padding: 3.0,
            label_nudge: 8.0,
            label_padding_x: 4.0,
            label_padding_y: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub transition_secs: f32,
    pub fit_margin: f32,
    pub focus_zoom: f32,
    pub pan_margin: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 4.0,
            transition_secs: 0.6,
            fit_margin: 40.0,
            focus_zoom: 1.6,
            pan_margin: 600.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    pub cull_margin: f32,
    pub employment_width: f32,
    pub relationship_width: f32,
    pub marker_size: f32,
    pub ring_width: f32,
    pub label_min_zoom: f32,
    pub hit_slop: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            cull_margin: 80.0,
            employment_width: 0.8,
            relationship_width: 1.6,
            marker_size: 7.0,
            ring_width: 2.0,
            label_min_zoom: 0.35,
            hit_slop: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub dot_radius: f32,
    pub home_radius: f32,
    pub dimmed_opacity: f32,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 140.0,
            padding: 8.0,
            dot_radius: 2.5,
            home_radius: 4.5,
            dimmed_opacity: 0.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub dimmed_opacity: f32,
    pub key_player_limit: usize,
    pub key_player_min_seniority: f32,
    pub ring_gap: f32,
    pub label_offset: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            dimmed_opacity: 0.15,
            key_player_limit: 8,
            key_player_min_seniority: 2.0,
            ring_gap: 3.0,
            label_offset: 6.0,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse engine config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid engine config JSON")
    }
}
