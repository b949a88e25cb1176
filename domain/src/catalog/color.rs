//! The fixed color table.
//!
//! Colors arrive from the reasoning service either as `#rrggbb` hex or as a
//! name from this table. Everything else is a validation failure.

/// Named colors the reasoning service may use instead of hex.
pub const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("blue", "#3b82f6"),
    ("gray", "#6b7280"),
    ("green", "#22c55e"),
    ("indigo", "#6366f1"),
    ("orange", "#f97316"),
    ("pink", "#ec4899"),
    ("purple", "#a855f7"),
    ("red", "#ef4444"),
    ("teal", "#14b8a6"),
    ("white", "#ffffff"),
    ("yellow", "#eab308"),
];

/// True for a `#rrggbb` hex literal
pub fn is_hex_color(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(|b| b.is_ascii_hexdigit())
}

/// Resolve a color to normalized lowercase hex, or `None` if unrecognized
pub fn resolve_color(input: &str) -> Option<String> {
    if is_hex_color(input) {
        return Some(input.to_ascii_lowercase());
    }
    let lower = input.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, hex)| (*hex).to_string())
}

/// The color names, for error messages and catalog descriptions
pub fn color_names() -> Vec<&'static str> {
    NAMED_COLORS.iter().map(|(name, _)| *name).collect()
}
