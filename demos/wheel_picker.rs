use bevy::prelude::*;
use bevy_wheel_picker::WheelPickerPlugin;
use bevy_wheel_picker::calendar::{self, JalaliDate};
use bevy_wheel_picker::widgets::{WheelDateChanged, WheelDatePicker};

/// Runs a wheel date picker demo with a live selection readout.
fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Wheel Date Picker".to_string(),
            ..default()
        }),
        ..default()
    }));
    app.add_plugins(WheelPickerPlugin);
    app.add_systems(Startup, load_ui);
    app.add_systems(Update, sync_selection_readout);
    app.run();
}

/// Marker component for the selection readout label.
#[derive(Component)]
struct SelectionReadout;

fn load_ui(mut commands: Commands) {
    commands.spawn(Camera2d);

    commands
        .spawn((
            Name::new("Demo-Root"),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                row_gap: Val::Px(18.0),
                ..default()
            },
            Pickable::IGNORE,
        ))
        .with_children(|root| {
            root.spawn(WheelDatePicker {
                entry: 1,
                label: "Date of birth".to_string(),
                initial: JalaliDate::new(1403, 12, 30),
            });

            root.spawn((
                Name::new("Demo-Readout"),
                Text::new("Spin a column or drag a wheel"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                SelectionReadout,
            ));
        });
}

fn sync_selection_readout(
    mut changes: MessageReader<WheelDateChanged>,
    mut readouts: Query<&mut Text, With<SelectionReadout>>,
) {
    for change in changes.read() {
        for mut text in readouts.iter_mut() {
            text.0 = format!(
                "Selected: {} {} {}",
                change.selected_day,
                calendar::month_name(change.date.month),
                change.selected_year,
            );
        }
    }
}
