pub mod controls;
pub mod widget_util;

use std::sync::atomic::{AtomicUsize, Ordering};

use bevy::prelude::*;

use crate::calendar::JalaliDate;

static WIDGET_ID_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Unique, monotonically increasing widget id assigned on spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UIGenID(pub usize);

impl Default for UIGenID {
    fn default() -> Self {
        Self(WIDGET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl UIGenID {
    pub fn get(&self) -> usize {
        self.0
    }
}

/// Links an internal UI node to the widget root that owns it.
#[derive(Component, Debug, Clone, Copy)]
pub struct BindToID(pub usize);

/// Opts an internal node out of parent state propagation.
#[derive(Component, Default)]
pub struct IgnoreParentState;

/// Interactive state shared by all widgets.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct UIWidgetState {
    pub hovered: bool,
    pub focused: bool,
    pub readonly: bool,
    pub disabled: bool,
    pub checked: bool,
}

/// Discriminates widget kinds for inspection and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    WheelDatePicker,
}

/// Stable widget identity: the user-chosen entry number plus the kind.
#[derive(Component, Debug, Clone, Copy)]
pub struct WidgetId {
    pub id: usize,
    pub kind: WidgetKind,
}

/// Formatted display value of a widget.
#[derive(Component, Debug, Clone, Default)]
pub struct InputValue(pub String);

/// Spawn component for the wheel-style Jalali date picker.
///
/// Add this (plus a [`UIGenID`]) to an entity and the widget plugin builds
/// the three scrollable columns underneath it on the next update.
#[derive(Component, Debug, Clone, Default)]
#[require(UIGenID, Node)]
pub struct WheelDatePicker {
    /// User-chosen entry number, used for naming and [`WidgetId`].
    pub entry: usize,
    /// Caption shown above the columns.
    pub label: String,
    /// Seed date for the initial selection; today when absent.
    pub initial: Option<JalaliDate>,
}

/// Message written every time the settled selection changes, including once
/// after the widget finishes mounting.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct WheelDateChanged {
    pub entity: Entity,
    /// Zero-based month index, 0 = Farvardin.
    pub selected_month_index: u32,
    pub selected_year: i32,
    /// One-based day of month.
    pub selected_day: u32,
    pub date: JalaliDate,
}
