pub mod generator;
pub mod history_panel;
pub mod toast;
