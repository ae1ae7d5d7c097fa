use bevy::input::mouse::{MouseScrollUnit, MouseWheel};

/// Pixels one wheel "line" advances, matching common desktop conventions.
const LINE_SCROLL_PX: f32 = 20.0;

/// Vertical wheel delta in logical UI pixels.
///
/// Line-unit events (discrete wheels) are scaled to a fixed per-line pixel
/// amount; pixel-unit events (trackpads) arrive in physical pixels and are
/// converted with the node's inverse scale factor.
pub fn wheel_delta_y(event: &MouseWheel, inverse_scale_factor: f32) -> f32 {
    match event.unit {
        MouseScrollUnit::Line => event.y * LINE_SCROLL_PX,
        MouseScrollUnit::Pixel => event.y * inverse_scale_factor,
    }
}
