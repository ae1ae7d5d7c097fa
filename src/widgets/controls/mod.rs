pub mod wheel_date_picker;
