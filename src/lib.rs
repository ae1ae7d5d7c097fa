pub mod calendar;
pub mod services;
pub mod styles;
pub mod widgets;

use bevy::prelude::*;

use crate::services::state_service::StateService;
use crate::widgets::controls::wheel_date_picker::WheelDatePickerWidget;

pub use crate::widgets::WheelDateChanged;

/// Global configuration for the wheel picker UI.
#[derive(Resource, Debug, Clone)]
pub struct WheelUiConfiguration {
    /// Render layers the spawned UI nodes are assigned to. The first entry
    /// is used; a camera must render that layer for the picker to be visible.
    pub render_layers: Vec<usize>,
}

impl Default for WheelUiConfiguration {
    fn default() -> Self {
        Self {
            render_layers: vec![0],
        }
    }
}

/// Tracks the widget that currently holds focus.
#[derive(Resource, Default)]
pub struct CurrentWidgetState {
    pub widget_id: usize,
}

/// Top-level plugin registering all wheel picker widgets and services.
pub struct WheelPickerPlugin;

impl Plugin for WheelPickerPlugin {
    /// Registers widget plugins, services and shared resources.
    fn build(&self, app: &mut App) {
        app.init_resource::<WheelUiConfiguration>();
        app.init_resource::<CurrentWidgetState>();
        app.add_plugins((StateService, WheelDatePickerWidget));
    }
}
