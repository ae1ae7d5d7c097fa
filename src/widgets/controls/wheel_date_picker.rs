use std::time::Duration;

use crate::calendar::{self, JalaliDate};
use crate::styles::paint::Colored;
use crate::widgets::widget_util::wheel_delta_y;
use crate::widgets::{
    BindToID, IgnoreParentState, InputValue, UIGenID, UIWidgetState, WheelDateChanged,
    WheelDatePicker, WidgetId, WidgetKind,
};
use crate::{CurrentWidgetState, WheelUiConfiguration};
use bevy::camera::visibility::RenderLayers;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

/// Marker component for initialized wheel picker widgets.
#[derive(Component)]
struct WheelPickerBase;

/// Marker component for the picker headline text.
#[derive(Component)]
struct PickerLabelText;

/// Marker component for the formatted value readout.
#[derive(Component)]
struct PickerValueText;

/// One scrollable wheel column viewport.
#[derive(Component)]
struct PickerColumn {
    kind: ColumnKind,
}

/// One fixed-height row inside a column.
#[derive(Component)]
struct PickerColumnRow {
    index: usize,
}

/// Text entity of one column row.
#[derive(Component)]
struct PickerRowText;

/// Requests that a column scrolls to center the given row.
#[derive(Component, Clone, Copy, Debug)]
struct PendingCenter {
    index: usize,
    animated: bool,
}

/// Shared row height in logical pixels; must match the rendered row exactly.
const ITEM_HEIGHT: f32 = 36.0;
const VISIBLE_ROWS: usize = 5;
const COLUMN_WIDTH: f32 = 96.0;
const COLUMN_GAP: f32 = 8.0;
const CAPTION_HEIGHT: f32 = 20.0;
const CAPTION_GAP: f32 = 4.0;
/// Quiet period after the last wheel event before a settle decision.
const SCROLL_DEBOUNCE_SECS: f32 = 0.15;
/// Clearance delay after a settle while the snap animation finishes.
const SNAP_SETTLE_SECS: f32 = 0.05;
const SNAP_SMOOTH_FACTOR: f32 = 24.0;
const YEAR_WINDOW: usize = 80;
const MAX_DAY_ROWS: usize = 31;
const MONTH_COUNT: usize = 12;

/// Identity of one of the three wheel columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColumnKind {
    Day,
    Month,
    Year,
}

impl ColumnKind {
    fn caption(self) -> &'static str {
        match self {
            ColumnKind::Day => "Day",
            ColumnKind::Month => "Month",
            ColumnKind::Year => "Year",
        }
    }

    fn row_capacity(self) -> usize {
        match self {
            ColumnKind::Day => MAX_DAY_ROWS,
            ColumnKind::Month => MONTH_COUNT,
            ColumnKind::Year => YEAR_WINDOW,
        }
    }

    /// Number of currently selectable items in this column.
    fn item_count(self, state: &WheelPickerState) -> usize {
        match self {
            ColumnKind::Day => state.day_count as usize,
            ColumnKind::Month => MONTH_COUNT,
            ColumnKind::Year => YEAR_WINDOW,
        }
    }

    /// Row index the current selection occupies.
    fn selected_index(self, state: &WheelPickerState) -> usize {
        match self {
            ColumnKind::Day => state.selected_day.saturating_sub(1) as usize,
            ColumnKind::Month => state.selected_month_index as usize,
            ColumnKind::Year => (state.selected_year - state.year_start).max(0) as usize,
        }
    }

    /// Writes the value at a settled row index into the selection.
    ///
    /// The month column selects by index; year and day rows carry literal
    /// values, the index is merely positional.
    fn apply_settled_index(self, index: usize, state: &mut WheelPickerState) {
        match self {
            ColumnKind::Day => state.selected_day = index as u32 + 1,
            ColumnKind::Month => state.selected_month_index = index as u32,
            ColumnKind::Year => state.selected_year = state.year_start + index as i32,
        }
    }
}

/// Runtime wheel picker state (selection + derived day window).
#[derive(Component, Clone, Debug)]
struct WheelPickerState {
    selected_month_index: u32,
    selected_year: i32,
    selected_day: u32,
    day_count: u32,
    year_start: i32,
    day_list_for: (i32, u32),
    last_notified: Option<(u32, i32, u32)>,
    mount_notified: bool,
}

impl WheelPickerState {
    fn seeded(initial: JalaliDate, year_start: i32) -> Self {
        let day_count = calendar::days_in_month(initial.year, initial.month);
        Self {
            selected_month_index: initial.month_index(),
            selected_year: initial.year,
            selected_day: initial.day.min(day_count),
            day_count,
            year_start,
            day_list_for: (initial.year, initial.month_index()),
            last_notified: None,
            mount_notified: false,
        }
    }
}

/// Per-column interaction state machine.
///
/// Exactly one phase is active per column; phases on different columns never
/// block each other. `Snapping` and `Dragging` suppress wheel handling.
#[derive(Component, Default, Debug)]
enum ColumnPhase {
    #[default]
    Idle,
    Scrolling {
        debounce: Timer,
    },
    Snapping {
        target: f32,
        settle: Timer,
    },
    Dragging {
        grab_y: f32,
        grab_offset: f32,
    },
}

/// Outcome of advancing a column phase by one frame.
enum PhaseTick {
    Quiet,
    Settle,
    Glide { target: f32 },
    SnapDone { target: f32 },
}

impl ColumnPhase {
    fn accepts_scroll(&self) -> bool {
        matches!(self, ColumnPhase::Idle | ColumnPhase::Scrolling { .. })
    }

    /// Starts or restarts the quiet-period debounce after a wheel event.
    fn note_scroll(&mut self) {
        match self {
            ColumnPhase::Scrolling { debounce } => debounce.reset(),
            _ => {
                *self = ColumnPhase::Scrolling {
                    debounce: Timer::from_seconds(SCROLL_DEBOUNCE_SECS, TimerMode::Once),
                };
            }
        }
    }

    fn begin_drag(&mut self, grab_y: f32, grab_offset: f32) {
        *self = ColumnPhase::Dragging {
            grab_y,
            grab_offset,
        };
    }

    fn drag_grab(&self) -> Option<(f32, f32)> {
        match self {
            ColumnPhase::Dragging {
                grab_y,
                grab_offset,
            } => Some((*grab_y, *grab_offset)),
            _ => None,
        }
    }

    /// Leaves the dragging phase; true when a drag was actually active.
    fn end_drag(&mut self) -> bool {
        if matches!(self, ColumnPhase::Dragging { .. }) {
            *self = ColumnPhase::Idle;
            true
        } else {
            false
        }
    }

    fn begin_snap(&mut self, target: f32) {
        *self = ColumnPhase::Snapping {
            target,
            settle: Timer::from_seconds(SNAP_SETTLE_SECS, TimerMode::Once),
        };
    }

    /// Advances the phase timers by `delta`.
    ///
    /// A finished debounce leaves the phase `Idle` and reports `Settle`; a
    /// finished snap settle reports `SnapDone` so the caller can pin the
    /// offset to the exact target.
    fn tick(&mut self, delta: Duration) -> PhaseTick {
        match self {
            ColumnPhase::Scrolling { debounce } => {
                debounce.tick(delta);
                if debounce.just_finished() {
                    *self = ColumnPhase::Idle;
                    PhaseTick::Settle
                } else {
                    PhaseTick::Quiet
                }
            }
            ColumnPhase::Snapping { target, settle } => {
                settle.tick(delta);
                let target = *target;
                if settle.just_finished() {
                    *self = ColumnPhase::Idle;
                    PhaseTick::SnapDone { target }
                } else {
                    PhaseTick::Glide { target }
                }
            }
            _ => PhaseTick::Quiet,
        }
    }
}

/// Plugin that registers wheel date picker widget behavior.
pub struct WheelDatePickerWidget;

impl Plugin for WheelDatePickerWidget {
    /// Registers systems for wheel picker setup and interaction.
    fn build(&self, app: &mut App) {
        app.add_message::<WheelDateChanged>();
        app.add_systems(
            Update,
            (
                internal_node_creation_system,
                handle_column_scroll_events,
                advance_column_phases,
                reconcile_picker_selection,
                apply_pending_centers,
                sync_column_rows,
                sync_picker_chrome,
            )
                .chain(),
        );
    }
}

/// Creates UI nodes for each wheel picker entity.
fn internal_node_creation_system(
    mut commands: Commands,
    query: Query<
        (Entity, &UIGenID, &WheelDatePicker, Option<&UIWidgetState>),
        (With<WheelDatePicker>, Without<WheelPickerBase>),
    >,
    config: Res<WheelUiConfiguration>,
) {
    let layer = config.render_layers.first().copied().unwrap_or(0);

    for (entity, id, picker, ui_state_opt) in query.iter() {
        let today = calendar::today_jalali_date();
        let initial = picker.initial.unwrap_or(today);
        let year_start = today.year - (YEAR_WINDOW as i32 - 1);
        let state = WheelPickerState::seeded(initial, year_start);

        if ui_state_opt.is_none() {
            commands.entity(entity).insert(UIWidgetState::default());
        }

        commands
            .entity(entity)
            .insert((
                Name::new(format!("WheelDatePicker-{}", picker.entry)),
                Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(10.0),
                    padding: UiRect::all(Val::Px(14.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                WidgetId {
                    id: picker.entry,
                    kind: WidgetKind::WheelDatePicker,
                },
                BackgroundColor(Colored::SURFACE),
                BorderColor::all(Colored::BORDER),
                BorderRadius::all(Val::Px(10.0)),
                ZIndex::default(),
                Pickable::default(),
                RenderLayers::layer(layer),
                state.clone(),
                WheelPickerBase,
                InputValue::default(),
            ))
            .observe(on_internal_cursor_entered)
            .observe(on_internal_cursor_leave)
            .with_children(|builder| {
                builder.spawn((
                    Name::new(format!("WheelPicker-Label-{}", picker.entry)),
                    Text::new(picker.label.clone()),
                    TextColor(Colored::TEXT_MUTED),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextLayout::new_with_justify(bevy::text::Justify::Center).with_no_wrap(),
                    UIWidgetState::default(),
                    RenderLayers::layer(layer),
                    Pickable::IGNORE,
                    PickerLabelText,
                    BindToID(id.get()),
                ));

                builder
                    .spawn((
                        Name::new(format!("WheelPicker-Columns-{}", picker.entry)),
                        Node {
                            flex_direction: FlexDirection::Row,
                            column_gap: Val::Px(COLUMN_GAP),
                            ..default()
                        },
                        RenderLayers::layer(layer),
                        Pickable::IGNORE,
                    ))
                    .with_children(|row| {
                        for kind in [ColumnKind::Day, ColumnKind::Month, ColumnKind::Year] {
                            spawn_column(row, kind, id.get(), picker.entry, &state, layer);
                        }
                    });

                builder.spawn((
                    Name::new(format!("WheelPicker-Value-{}", picker.entry)),
                    Text::new(""),
                    TextColor(Colored::TEXT_VALUE),
                    TextFont {
                        font_size: 15.0,
                        ..default()
                    },
                    TextLayout::new_with_justify(bevy::text::Justify::Center).with_no_wrap(),
                    RenderLayers::layer(layer),
                    Pickable::IGNORE,
                    PickerValueText,
                    BindToID(id.get()),
                ));
            });
    }
}

/// Spawns one wheel column with its caption, viewport, rows and center band.
fn spawn_column(
    builder: &mut ChildSpawnerCommands,
    kind: ColumnKind,
    bind_id: usize,
    entry: usize,
    state: &WheelPickerState,
    layer: usize,
) {
    let pad = (VISIBLE_ROWS as f32 - 1.0) * 0.5 * ITEM_HEIGHT;

    builder
        .spawn((
            Name::new(format!("WheelColumn-{kind:?}-{entry}")),
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(CAPTION_GAP),
                ..default()
            },
            RenderLayers::layer(layer),
            Pickable::IGNORE,
        ))
        .with_children(|column| {
            column.spawn((
                Name::new(format!("WheelColumn-Caption-{kind:?}-{entry}")),
                Text::new(kind.caption()),
                TextColor(Colored::TEXT_MUTED),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextLayout::new_with_justify(bevy::text::Justify::Center).with_no_wrap(),
                Node {
                    height: Val::Px(CAPTION_HEIGHT),
                    ..default()
                },
                RenderLayers::layer(layer),
                Pickable::IGNORE,
            ));

            column
                .spawn((
                    Name::new(format!("WheelColumn-Viewport-{kind:?}-{entry}")),
                    Node {
                        width: Val::Px(COLUMN_WIDTH),
                        height: Val::Px(ITEM_HEIGHT * VISIBLE_ROWS as f32),
                        flex_direction: FlexDirection::Column,
                        overflow: Overflow::scroll_y(),
                        padding: UiRect::vertical(Val::Px(pad)),
                        ..default()
                    },
                    BackgroundColor(Colored::SURFACE_RAISED),
                    BorderRadius::all(Val::Px(8.0)),
                    ScrollPosition::default(),
                    UIWidgetState::default(),
                    IgnoreParentState,
                    RenderLayers::layer(layer),
                    Pickable::default(),
                    PickerColumn { kind },
                    ColumnPhase::default(),
                    PendingCenter {
                        index: kind.selected_index(state),
                        animated: false,
                    },
                    BindToID(bind_id),
                ))
                .observe(on_column_press)
                .observe(on_column_cursor_entered)
                .observe(on_column_cursor_leave)
                .observe(on_column_drag_start)
                .observe(on_column_drag)
                .observe(on_column_drag_end)
                .with_children(|viewport| {
                    for index in 0..kind.row_capacity() {
                        viewport
                            .spawn((
                                Name::new(format!("WheelRow-{kind:?}-{index}-{entry}")),
                                Node {
                                    width: Val::Percent(100.0),
                                    height: Val::Px(ITEM_HEIGHT),
                                    justify_content: JustifyContent::Center,
                                    align_items: AlignItems::Center,
                                    flex_shrink: 0.0,
                                    ..default()
                                },
                                UIWidgetState::default(),
                                IgnoreParentState,
                                RenderLayers::layer(layer),
                                Pickable::IGNORE,
                                PickerColumnRow { index },
                            ))
                            .with_children(|row| {
                                row.spawn((
                                    Name::new(format!("WheelRow-Text-{kind:?}-{index}-{entry}")),
                                    Text::new(row_label(kind, index, state.year_start)),
                                    TextColor(Colored::TEXT_MUTED),
                                    TextFont {
                                        font_size: 15.0,
                                        ..default()
                                    },
                                    TextLayout::new_with_justify(bevy::text::Justify::Center)
                                        .with_no_wrap(),
                                    RenderLayers::layer(layer),
                                    Pickable::IGNORE,
                                    PickerRowText,
                                ));
                            });
                    }
                });

            // Translucent band marking the selection row of this column.
            column.spawn((
                Name::new(format!("WheelColumn-Band-{kind:?}-{entry}")),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(CAPTION_HEIGHT + CAPTION_GAP + pad),
                    width: Val::Px(COLUMN_WIDTH),
                    height: Val::Px(ITEM_HEIGHT),
                    ..default()
                },
                BackgroundColor(Colored::HIGHLIGHT_BAND),
                BorderRadius::all(Val::Px(6.0)),
                RenderLayers::layer(layer),
                Pickable::IGNORE,
            ));
        });
}

fn row_label(kind: ColumnKind, index: usize, year_start: i32) -> String {
    match kind {
        ColumnKind::Day => (index + 1).to_string(),
        ColumnKind::Month => calendar::month_name(index as u32 + 1).to_string(),
        ColumnKind::Year => (year_start + index as i32).to_string(),
    }
}

/// Routes mouse-wheel events to the hovered column and restarts its debounce.
fn handle_column_scroll_events(
    mut scroll_events: MessageReader<MouseWheel>,
    pickers: Query<(&UIGenID, &WheelPickerState, &UIWidgetState), With<WheelPickerBase>>,
    mut columns: Query<
        (
            &PickerColumn,
            &UIWidgetState,
            &ComputedNode,
            &mut ScrollPosition,
            &mut ColumnPhase,
            &BindToID,
        ),
        Without<WheelPickerBase>,
    >,
) {
    if scroll_events.is_empty() {
        return;
    }

    for event in scroll_events.read() {
        for (column, column_ui, computed, mut scroll, mut phase, bind) in columns.iter_mut() {
            if !column_ui.hovered {
                continue;
            }
            let Some((state, picker_ui)) = find_picker(&pickers, bind.0) else {
                continue;
            };
            if picker_ui.disabled || picker_ui.readonly {
                continue;
            }
            // While snapping or dragging, wheel events neither apply nor
            // restart the debounce.
            if !phase.accepts_scroll() {
                continue;
            }

            let count = column.kind.item_count(state);
            if count == 0 {
                scroll.y = 0.0;
                continue;
            }

            let inv_sf = computed.inverse_scale_factor.max(f32::EPSILON);
            let delta = -wheel_delta_y(event, inv_sf);
            scroll.y = (scroll.y + delta).clamp(0.0, max_scroll_offset(count));
            phase.note_scroll();
        }
    }
}

/// Ticks debounce/settle timers and drives the snap glide.
fn advance_column_phases(
    time: Res<Time>,
    mut pickers: Query<(&UIGenID, &mut WheelPickerState), With<WheelPickerBase>>,
    mut columns: Query<
        (
            &PickerColumn,
            &mut ScrollPosition,
            &mut ColumnPhase,
            &BindToID,
        ),
        Without<WheelPickerBase>,
    >,
) {
    let delta = time.delta();
    let dt = time.delta_secs();

    for (column, mut scroll, mut phase, bind) in columns.iter_mut() {
        match phase.tick(delta) {
            PhaseTick::Quiet => {}
            PhaseTick::Glide { target } => {
                let step = (SNAP_SMOOTH_FACTOR * dt).min(1.0);
                scroll.y += (target - scroll.y) * step;
            }
            PhaseTick::SnapDone { target } => {
                scroll.y = target;
            }
            PhaseTick::Settle => {
                let Some((_, mut state)) =
                    pickers.iter_mut().find(|(id, _)| id.get() == bind.0)
                else {
                    continue;
                };
                settle_column(column.kind, scroll.y, &mut phase, &mut state);
            }
        }
    }
}

/// Converts a column's rest offset into a selection update and snap target.
///
/// Returns the snap target offset, or `None` when the offset no longer maps
/// into the item list (the list shrank mid-flight); in that case the
/// selection is left unchanged and the column returns to idle.
fn settle_column(
    kind: ColumnKind,
    offset: f32,
    phase: &mut ColumnPhase,
    state: &mut WheelPickerState,
) -> Option<f32> {
    let count = kind.item_count(state);
    let Some(index) = snapped_index(offset, count) else {
        warn!("wheel column {kind:?} settled outside its item list; selection unchanged");
        *phase = ColumnPhase::Idle;
        return None;
    };

    kind.apply_settled_index(index, state);
    // A settle always re-notifies, even when the value did not change.
    state.last_notified = None;

    let target = index as f32 * ITEM_HEIGHT;
    phase.begin_snap(target);
    Some(target)
}

/// Rebuilds the derived day window after a month/year change.
///
/// Day-only changes leave the window untouched so settling the day column
/// cannot feed back into itself. Returns the day column's new center index
/// when the window changed.
fn reconcile_day_window(state: &mut WheelPickerState) -> Option<usize> {
    let key = (state.selected_year, state.selected_month_index);
    if state.day_list_for == key {
        return None;
    }

    state.day_count =
        calendar::days_in_month(state.selected_year, state.selected_month_index + 1);
    if state.selected_day > state.day_count {
        state.selected_day = state.day_count;
    }
    state.day_list_for = key;
    Some(state.selected_day.saturating_sub(1) as usize)
}

/// Returns the selection triple when it differs from the last notification.
fn take_notification(state: &mut WheelPickerState) -> Option<(u32, i32, u32)> {
    let triple = (
        state.selected_month_index,
        state.selected_year,
        state.selected_day,
    );
    if state.last_notified == Some(triple) {
        return None;
    }
    state.last_notified = Some(triple);
    Some(triple)
}

/// Applies selection changes: rebuilds the day window, re-centers the day
/// column and writes the change notification.
fn reconcile_picker_selection(
    mut commands: Commands,
    mut pickers: Query<
        (Entity, &UIGenID, &mut WheelPickerState, &mut InputValue),
        With<WheelPickerBase>,
    >,
    columns: Query<(Entity, &PickerColumn, &BindToID)>,
    mut changes: MessageWriter<WheelDateChanged>,
) {
    for (entity, id, mut state, mut input_value) in pickers.iter_mut() {
        reconcile_day_window(&mut state);

        let was_mount = !state.mount_notified;
        let Some((month_index, year, day)) = take_notification(&mut state) else {
            continue;
        };
        state.mount_notified = true;

        let Some(date) = JalaliDate::from_month_index(year, month_index, day) else {
            warn!("wheel picker resolved an unrepresentable date {year}/{month_index}/{day}");
            continue;
        };

        let formatted = format!("{year:04}/{:02}/{day:02}", date.month);
        if input_value.0 != formatted {
            input_value.0 = formatted;
        }
        changes.write(WheelDateChanged {
            entity,
            selected_month_index: month_index,
            selected_year: year,
            selected_day: day,
            date,
        });

        // The mount pass was already requested (instantly) at spawn time;
        // every later settled change re-centers all three columns.
        if !was_mount {
            for (column_entity, column, bind) in columns.iter() {
                if bind.0 != id.get() {
                    continue;
                }
                commands.entity(column_entity).insert(PendingCenter {
                    index: column.kind.selected_index(&state),
                    animated: true,
                });
            }
        }
    }
}

/// Applies requested column centering once layout is valid.
fn apply_pending_centers(
    mut commands: Commands,
    pickers: Query<(&UIGenID, &WheelPickerState), With<WheelPickerBase>>,
    mut columns: Query<
        (
            Entity,
            &PickerColumn,
            &ComputedNode,
            &mut ScrollPosition,
            &mut ColumnPhase,
            &BindToID,
            &PendingCenter,
        ),
        Without<WheelPickerBase>,
    >,
) {
    for (entity, column, computed, mut scroll, mut phase, bind, pending) in columns.iter_mut() {
        // Never fight an active drag; the drag's own settle re-centers.
        if matches!(*phase, ColumnPhase::Dragging { .. }) {
            commands.entity(entity).remove::<PendingCenter>();
            continue;
        }

        let Some(state) = pickers
            .iter()
            .find(|(id, _)| id.get() == bind.0)
            .map(|(_, state)| state)
        else {
            continue;
        };
        let count = column.kind.item_count(state);
        if count == 0 {
            commands.entity(entity).remove::<PendingCenter>();
            continue;
        }

        let inv_sf = computed.inverse_scale_factor.max(f32::EPSILON);
        let viewport_h = computed.size().y * inv_sf;
        // Right after spawning, the computed size can still be invalid.
        // Wait until the viewport is plausibly laid out before centering.
        if viewport_h < ITEM_HEIGHT * 2.0 {
            continue;
        }

        let index = pending.index.min(count - 1);
        let target = index as f32 * ITEM_HEIGHT;
        if pending.animated {
            phase.begin_snap(target);
        } else {
            scroll.y = target;
            *phase = ColumnPhase::Idle;
        }
        commands.entity(entity).remove::<PendingCenter>();
    }
}

/// Keeps row visibility, highlight and text tones in sync with the state.
fn sync_column_rows(
    pickers: Query<(&UIGenID, &WheelPickerState, &UIWidgetState), With<WheelPickerBase>>,
    columns: Query<(Entity, &PickerColumn, &ScrollPosition, &BindToID), Without<WheelPickerBase>>,
    mut rows: Query<
        (&PickerColumnRow, &ChildOf, &mut Node, &mut UIWidgetState),
        (Without<WheelPickerBase>, Without<PickerColumn>),
    >,
    mut row_texts: Query<(&ChildOf, &mut TextColor), With<PickerRowText>>,
) {
    for (row, child_of, mut node, mut row_ui) in rows.iter_mut() {
        let Ok((_, column, scroll, bind)) = columns.get(child_of.parent()) else {
            continue;
        };
        let Some((state, picker_ui)) = find_picker(&pickers, bind.0) else {
            continue;
        };

        let count = column.kind.item_count(state);
        let nearest = snapped_index(scroll.y, count);

        let desired_display = if row.index < count {
            Display::Flex
        } else {
            Display::None
        };
        if node.display != desired_display {
            node.display = desired_display;
        }

        let checked = nearest == Some(row.index);
        if row_ui.checked != checked {
            row_ui.checked = checked;
        }
        if row_ui.disabled != picker_ui.disabled {
            row_ui.disabled = picker_ui.disabled;
        }
    }

    for (child_of, mut color) in row_texts.iter_mut() {
        let Ok((_, _, _, row_ui)) = rows.get(child_of.parent()) else {
            continue;
        };
        let desired = if row_ui.disabled {
            Colored::TEXT_MUTED.with_alpha(0.5)
        } else if row_ui.checked {
            Colored::TEXT_PRIMARY
        } else {
            Colored::TEXT_MUTED
        };
        if color.0 != desired {
            color.0 = desired;
        }
    }
}

/// Paints picker chrome (border, headline) and mirrors the value readout.
fn sync_picker_chrome(
    mut pickers: Query<
        (&UIGenID, &UIWidgetState, &InputValue, &mut BorderColor),
        With<WheelPickerBase>,
    >,
    mut value_texts: Query<(&BindToID, &mut Text), With<PickerValueText>>,
    mut labels: Query<
        (&UIWidgetState, &mut TextColor),
        (With<PickerLabelText>, Without<WheelPickerBase>),
    >,
) {
    for (id, ui, input_value, mut border) in pickers.iter_mut() {
        let desired = if ui.focused {
            Colored::BORDER_FOCUSED
        } else {
            Colored::BORDER
        };
        let desired = BorderColor::all(desired);
        if *border != desired {
            *border = desired;
        }

        for (bind, mut text) in value_texts.iter_mut() {
            if bind.0 != id.get() {
                continue;
            }
            if text.0 != input_value.0 {
                text.0 = input_value.0.clone();
            }
        }
    }

    for (label_ui, mut color) in labels.iter_mut() {
        let desired = if label_ui.focused {
            Colored::TEXT_PRIMARY
        } else {
            Colored::TEXT_MUTED
        };
        if color.0 != desired {
            color.0 = desired;
        }
    }
}

/// Captures the pointer on a column and begins direct manipulation.
fn on_column_drag_start(
    mut trigger: On<Pointer<DragStart>>,
    mut columns: Query<(&ScrollPosition, &mut ColumnPhase, &BindToID), With<PickerColumn>>,
    mut pickers: Query<(&UIGenID, &mut UIWidgetState), With<WheelPickerBase>>,
    mut current_widget_state: ResMut<CurrentWidgetState>,
) {
    let Ok((scroll, mut phase, bind)) = columns.get_mut(trigger.entity) else {
        return;
    };
    let Some((id, mut picker_ui)) = pickers.iter_mut().find(|(id, _)| id.get() == bind.0) else {
        return;
    };
    if picker_ui.disabled || picker_ui.readonly {
        trigger.propagate(false);
        return;
    }

    picker_ui.focused = true;
    current_widget_state.widget_id = id.get();
    // Entering the drag phase supersedes any pending debounce or snap.
    phase.begin_drag(trigger.pointer_location.position.y, scroll.y);
    trigger.propagate(false);
}

/// Scrubs the column offset while the pointer is held.
fn on_column_drag(
    mut trigger: On<Pointer<Drag>>,
    mut columns: Query<
        (&PickerColumn, &mut ScrollPosition, &ColumnPhase, &BindToID),
        Without<WheelPickerBase>,
    >,
    pickers: Query<(&UIGenID, &WheelPickerState), With<WheelPickerBase>>,
) {
    let Ok((column, mut scroll, phase, bind)) = columns.get_mut(trigger.entity) else {
        return;
    };
    let Some((grab_y, grab_offset)) = phase.drag_grab() else {
        return;
    };
    let Some(state) = pickers
        .iter()
        .find(|(id, _)| id.get() == bind.0)
        .map(|(_, state)| state)
    else {
        return;
    };

    let count = column.kind.item_count(state);
    scroll.y = drag_offset(
        grab_y,
        grab_offset,
        trigger.pointer_location.position.y,
        count,
    );
    trigger.propagate(false);
}

/// Treats pointer release as an immediate settle of the dragged column.
fn on_column_drag_end(
    mut trigger: On<Pointer<DragEnd>>,
    mut columns: Query<
        (&PickerColumn, &ScrollPosition, &mut ColumnPhase, &BindToID),
        Without<WheelPickerBase>,
    >,
    mut pickers: Query<(&UIGenID, &mut WheelPickerState), With<WheelPickerBase>>,
) {
    let Ok((column, scroll, mut phase, bind)) = columns.get_mut(trigger.entity) else {
        return;
    };
    if !phase.end_drag() {
        return;
    }
    let Some((_, mut state)) = pickers.iter_mut().find(|(id, _)| id.get() == bind.0) else {
        return;
    };
    // Releasing over an emptied list is a no-op.
    if column.kind.item_count(&state) == 0 {
        return;
    }

    settle_column(column.kind, scroll.y, &mut phase, &mut state);
    trigger.propagate(false);
}

/// Focuses the picker when one of its columns is pressed.
fn on_column_press(
    mut trigger: On<Pointer<Press>>,
    columns: Query<&BindToID, With<PickerColumn>>,
    mut pickers: Query<(&UIGenID, &mut UIWidgetState), With<WheelPickerBase>>,
    mut current_widget_state: ResMut<CurrentWidgetState>,
) {
    let Ok(bind) = columns.get(trigger.entity) else {
        return;
    };
    let Some((id, mut picker_ui)) = pickers.iter_mut().find(|(id, _)| id.get() == bind.0) else {
        return;
    };
    if picker_ui.disabled {
        trigger.propagate(false);
        return;
    }

    picker_ui.focused = true;
    current_widget_state.widget_id = id.get();
    trigger.propagate(false);
}

/// Sets hovered state when the cursor enters a column viewport.
fn on_column_cursor_entered(
    mut trigger: On<Pointer<Over>>,
    mut query: Query<&mut UIWidgetState, With<PickerColumn>>,
) {
    if let Ok(mut state) = query.get_mut(trigger.entity) {
        state.hovered = true;
    }

    trigger.propagate(false);
}

/// Clears hovered state when the cursor leaves a column viewport.
fn on_column_cursor_leave(
    mut trigger: On<Pointer<Out>>,
    mut query: Query<&mut UIWidgetState, With<PickerColumn>>,
) {
    if let Ok(mut state) = query.get_mut(trigger.entity) {
        state.hovered = false;
    }

    trigger.propagate(false);
}

/// Sets hovered state when entering the picker root.
fn on_internal_cursor_entered(
    mut trigger: On<Pointer<Over>>,
    mut query: Query<&mut UIWidgetState, With<WheelPickerBase>>,
) {
    if let Ok(mut state) = query.get_mut(trigger.entity) {
        state.hovered = true;
    }

    trigger.propagate(false);
}

/// Clears hovered state when leaving the picker root.
fn on_internal_cursor_leave(
    mut trigger: On<Pointer<Out>>,
    mut query: Query<&mut UIWidgetState, With<WheelPickerBase>>,
) {
    if let Ok(mut state) = query.get_mut(trigger.entity) {
        state.hovered = false;
    }

    trigger.propagate(false);
}

fn find_picker<'a>(
    pickers: &'a Query<(&UIGenID, &WheelPickerState, &UIWidgetState), With<WheelPickerBase>>,
    bind: usize,
) -> Option<(&'a WheelPickerState, &'a UIWidgetState)> {
    pickers
        .iter()
        .find(|(id, _, _)| id.get() == bind)
        .map(|(_, state, ui)| (state, ui))
}

fn max_scroll_offset(item_count: usize) -> f32 {
    item_count.saturating_sub(1) as f32 * ITEM_HEIGHT
}

/// Nearest row index for an offset, clamped into the item list.
fn snapped_index(offset: f32, item_count: usize) -> Option<usize> {
    if item_count == 0 {
        return None;
    }
    let raw = (offset / ITEM_HEIGHT).round();
    Some(raw.clamp(0.0, (item_count - 1) as f32) as usize)
}

/// New scroll offset for a drag: the content follows the pointer 1:1.
fn drag_offset(grab_y: f32, grab_offset: f32, pointer_y: f32, item_count: usize) -> f32 {
    (grab_offset - (pointer_y - grab_y)).clamp(0.0, max_scroll_offset(item_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_for(year: i32, month_index: u32, day: u32) -> WheelPickerState {
        let date = JalaliDate::from_month_index(year, month_index, day).expect("valid seed date");
        WheelPickerState::seeded(date, year - 40)
    }

    #[test]
    fn selected_day_stays_within_month_after_reconciliation() {
        let mut state = state_for(1403, 5, 31);
        for year in [1401, 1402, 1403, 1404] {
            for month_index in 0..12 {
                state.selected_year = year;
                state.selected_month_index = month_index;
                reconcile_day_window(&mut state);
                let max = calendar::days_in_month(year, month_index + 1);
                assert!(
                    state.selected_day >= 1 && state.selected_day <= max,
                    "day {} out of range for {year}/{month_index}",
                    state.selected_day
                );
            }
        }
    }

    #[test]
    fn settling_an_already_centered_column_repeats_the_notification() {
        let mut state = state_for(1403, 6, 10);
        let mut phase = ColumnPhase::Idle;
        assert_eq!(take_notification(&mut state), Some((6, 1403, 10)));
        assert_eq!(take_notification(&mut state), None);

        let offset = 9.0 * ITEM_HEIGHT;
        let target = settle_column(ColumnKind::Day, offset, &mut phase, &mut state);
        assert_eq!(target, Some(offset));
        assert_eq!(state.selected_day, 10);
        assert_eq!(take_notification(&mut state), Some((6, 1403, 10)));

        let target = settle_column(ColumnKind::Day, offset, &mut phase, &mut state);
        assert_eq!(target, Some(offset));
        assert_eq!(take_notification(&mut state), Some((6, 1403, 10)));
    }

    #[test]
    fn debounce_collapses_a_scroll_burst_into_one_settle() {
        let mut phase = ColumnPhase::Idle;
        let mut settles = 0;

        for _ in 0..10 {
            assert!(phase.accepts_scroll());
            phase.note_scroll();
            if matches!(phase.tick(Duration::from_millis(50)), PhaseTick::Settle) {
                settles += 1;
            }
        }
        for _ in 0..10 {
            if matches!(phase.tick(Duration::from_millis(50)), PhaseTick::Settle) {
                settles += 1;
            }
        }

        assert_eq!(settles, 1);
        assert!(matches!(phase, ColumnPhase::Idle));
    }

    #[test]
    fn dragging_ignores_wheel_events_and_settles_only_on_release() {
        let mut phase = ColumnPhase::Idle;
        phase.begin_drag(120.0, 2.0 * ITEM_HEIGHT);

        assert!(!phase.accepts_scroll());
        for _ in 0..20 {
            assert!(matches!(
                phase.tick(Duration::from_millis(100)),
                PhaseTick::Quiet
            ));
        }

        assert!(phase.end_drag());
        assert!(!phase.end_drag());

        let mut state = state_for(1402, 2, 5);
        let target = settle_column(ColumnKind::Day, 2.0 * ITEM_HEIGHT, &mut phase, &mut state);
        assert_eq!(target, Some(2.0 * ITEM_HEIGHT));
        assert_eq!(state.selected_day, 3);
    }

    #[test]
    fn wheel_events_are_ignored_while_snapping() {
        let mut phase = ColumnPhase::Idle;
        phase.begin_snap(2.0 * ITEM_HEIGHT);
        assert!(!phase.accepts_scroll());
    }

    #[test]
    fn snap_pins_the_offset_when_the_settle_timer_fires() {
        let mut phase = ColumnPhase::Idle;
        phase.begin_snap(3.0 * ITEM_HEIGHT);

        assert!(matches!(
            phase.tick(Duration::from_millis(16)),
            PhaseTick::Glide { target } if target == 3.0 * ITEM_HEIGHT
        ));
        assert!(matches!(
            phase.tick(Duration::from_millis(40)),
            PhaseTick::SnapDone { target } if target == 3.0 * ITEM_HEIGHT
        ));
        assert!(phase.accepts_scroll());
    }

    #[test]
    fn shrinking_month_clamps_the_selected_day_down() {
        // Shahrivar (31 days) -> Esfand 1402 (29 days)
        let mut state = state_for(1402, 5, 31);
        assert_eq!(take_notification(&mut state), Some((5, 1402, 31)));

        state.selected_month_index = 11;
        let recenter = reconcile_day_window(&mut state);
        assert_eq!(state.day_count, 29);
        assert_eq!(state.selected_day, 29);
        assert_eq!(recenter, Some(28));
        assert_eq!(take_notification(&mut state), Some((11, 1402, 29)));

        // Growing the month back never raises the day.
        state.selected_month_index = 5;
        let recenter = reconcile_day_window(&mut state);
        assert_eq!(state.day_count, 31);
        assert_eq!(state.selected_day, 29);
        assert_eq!(recenter, Some(28));
    }

    #[test]
    fn day_only_changes_leave_the_day_window_untouched() {
        let mut state = state_for(1403, 11, 30);
        assert_eq!(reconcile_day_window(&mut state), None);
        state.selected_day = 12;
        assert_eq!(reconcile_day_window(&mut state), None);
        assert_eq!(state.day_count, 30);
    }

    #[test]
    fn year_settle_cascades_into_the_day_window() {
        // Esfand 1403 is the leap month with 30 days; 1402 has 29.
        let year_start = 1403 - (YEAR_WINDOW as i32 - 1);
        let initial = JalaliDate::from_month_index(1403, 11, 30).expect("valid leap date");
        let mut state = WheelPickerState::seeded(initial, year_start);

        assert_eq!(state.day_count, 30);
        assert_eq!(ColumnKind::Day.selected_index(&state), 29);
        assert_eq!(take_notification(&mut state), Some((11, 1403, 30)));

        let mut phase = ColumnPhase::Idle;
        let year_offset = (1402 - year_start) as f32 * ITEM_HEIGHT;
        settle_column(ColumnKind::Year, year_offset, &mut phase, &mut state);
        assert_eq!(state.selected_year, 1402);

        let recenter = reconcile_day_window(&mut state);
        assert_eq!(state.day_count, 29);
        assert_eq!(state.selected_day, 29);
        assert_eq!(recenter, Some(28));
        assert_eq!(ColumnKind::Day.selected_index(&state), 28);
        assert_eq!(take_notification(&mut state), Some((11, 1402, 29)));
    }

    #[test]
    fn out_of_range_offsets_clamp_to_the_item_list() {
        assert_eq!(snapped_index(-500.0, 12), Some(0));
        assert_eq!(snapped_index(5_000.0, 12), Some(11));
        assert_eq!(snapped_index(0.0, 0), None);

        let mut state = state_for(1402, 0, 1);
        let mut phase = ColumnPhase::Idle;
        let target = settle_column(ColumnKind::Day, 10_000.0, &mut phase, &mut state);
        assert_eq!(target, Some(30.0 * ITEM_HEIGHT));
        assert_eq!(state.selected_day, 31);
    }

    #[test]
    fn drag_offset_tracks_the_pointer_and_clamps_at_both_ends() {
        let grab_y = 200.0;
        let grab_offset = 2.0 * ITEM_HEIGHT;

        // Moving the pointer down by one row height scrolls up one row.
        assert_eq!(
            drag_offset(grab_y, grab_offset, grab_y + ITEM_HEIGHT, 12),
            ITEM_HEIGHT
        );
        assert_eq!(
            drag_offset(grab_y, grab_offset, grab_y - ITEM_HEIGHT, 12),
            3.0 * ITEM_HEIGHT
        );
        assert_eq!(drag_offset(grab_y, grab_offset, grab_y + 10_000.0, 12), 0.0);
        assert_eq!(
            drag_offset(grab_y, grab_offset, grab_y - 10_000.0, 12),
            max_scroll_offset(12)
        );
    }

    #[test]
    fn settling_over_an_empty_list_leaves_the_selection_unchanged() {
        let mut state = state_for(1402, 3, 15);
        state.day_count = 0;
        let mut phase = ColumnPhase::Idle;
        phase.note_scroll();

        let target = settle_column(ColumnKind::Day, 2.0 * ITEM_HEIGHT, &mut phase, &mut state);
        assert_eq!(target, None);
        assert!(matches!(phase, ColumnPhase::Idle));
        assert_eq!(state.selected_day, 15);
    }

    #[test]
    fn seeding_clamps_against_the_seed_month() {
        let initial = JalaliDate::from_month_index(1403, 11, 30).expect("valid date");
        let state = WheelPickerState::seeded(initial, 1324);
        assert_eq!(state.day_count, 30);
        assert_eq!(state.selected_day, 30);
        assert_eq!(ColumnKind::Year.selected_index(&state), 79);
        assert_eq!(ColumnKind::Month.selected_index(&state), 11);
    }
}
