use bevy::prelude::*;

/// Shared color palette for wheel picker chrome.
pub struct Colored;

impl Colored {
    pub const TRANSPARENT: Color = Color::NONE;

    /// Picker root background.
    pub const SURFACE: Color = Color::srgb(0.094, 0.102, 0.125);
    /// Column viewport background.
    pub const SURFACE_RAISED: Color = Color::srgb(0.125, 0.137, 0.168);
    /// Resting border tone.
    pub const BORDER: Color = Color::srgb(0.243, 0.263, 0.314);
    /// Border tone while the picker holds focus.
    pub const BORDER_FOCUSED: Color = Color::srgb(0.416, 0.565, 0.910);
    /// Row text for the centered selection.
    pub const TEXT_PRIMARY: Color = Color::srgb(0.925, 0.937, 0.957);
    /// Row text away from the center line.
    pub const TEXT_MUTED: Color = Color::srgb(0.502, 0.533, 0.600);
    /// Value readout text.
    pub const TEXT_VALUE: Color = Color::srgb(0.733, 0.777, 0.867);
    /// Translucent band marking the selection row.
    pub const HIGHLIGHT_BAND: Color = Color::srgba(0.416, 0.565, 0.910, 0.14);
}
