pub mod pending_dialogs;
pub mod sequence_plot;
pub mod side_panel;
pub mod toolbar;
