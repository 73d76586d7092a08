use eframe::egui::Color32;

use crate::network::RelationshipKind;
use crate::util::stable_index;

const COMPANY_COLORS: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

pub const HOME_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub const VOID_COLOR: Color32 = Color32::from_rgb(88, 92, 104);
pub const CONTACT_COLOR: Color32 = Color32::from_rgb(196, 204, 216);
pub const KEY_PLAYER_COLOR: Color32 = Color32::from_rgb(255, 196, 92);

pub fn relationship_color(kind: RelationshipKind) -> Color32 {
    match kind {
        RelationshipKind::Lead => Color32::from_rgb(103, 196, 255),
        RelationshipKind::Customer => Color32::from_rgb(96, 214, 140),
        RelationshipKind::Partner => Color32::from_rgb(186, 132, 255),
        RelationshipKind::Investor => Color32::from_rgb(247, 194, 111),
        RelationshipKind::Competitor => Color32::from_rgb(241, 106, 94),
        RelationshipKind::Inferred => Color32::from_rgb(150, 156, 168),
    }
}

/// Explicit `#rrggbb` color if it parses, otherwise a stable pick keyed on
/// the industry (or the id when the industry is blank).
pub fn company_color(explicit: Option<&str>, industry: &str, id: &str) -> Color32 {
    if let Some(color) = explicit.and_then(|hex| Color32::from_hex(hex.trim()).ok()) {
        return color;
    }

    let key = if industry.trim().is_empty() { id } else { industry };
    COMPANY_COLORS[stable_index(key, COMPANY_COLORS.len())]
}

pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}
