/// Toolbar — top menu bar with file operations and engine requests

/// Actions that can be triggered from the toolbar
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    None,
    OpenSequence,
    SaveSequence,
    OpenScanner,
    SaveScanner,
    PlotSequence,
    Simulate,
    ExportLog,
    ShowLog,
    ShowAbout,
}

/// Show save dialog for the activity log
pub fn save_log_dialog() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export Activity Log")
        .add_filter("Text File", &["txt"])
        .add_filter("JSON", &["json"])
        .save_file()
}

/// Render the toolbar and return any triggered action
pub fn show_toolbar(ctx: &egui::Context, save_extension: &mut String, pending_dialogs: usize) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("📁 File", |ui| {
                if ui.button("📂 Open Sequence…").clicked() {
                    action = ToolbarAction::OpenSequence;
                    ui.close_menu();
                }
                if ui.button("💾 Save Sequence…").clicked() {
                    action = ToolbarAction::SaveSequence;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("📂 Open Scanner…").clicked() {
                    action = ToolbarAction::OpenScanner;
                    ui.close_menu();
                }
                if ui.button("💾 Save Scanner…").clicked() {
                    action = ToolbarAction::SaveScanner;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("📋 Export Activity Log…").clicked() {
                    action = ToolbarAction::ExportLog;
                    ui.close_menu();
                }
            });

            ui.menu_button("▶ Run", |ui| {
                if ui.button("📈 Plot Sequence").clicked() {
                    action = ToolbarAction::PlotSequence;
                    ui.close_menu();
                }
                if ui.button("🧲 Simulate").clicked() {
                    action = ToolbarAction::Simulate;
                    ui.close_menu();
                }
            });

            ui.menu_button("❓ Help", |ui| {
                if ui.button("📋 Activity Log").clicked() {
                    action = ToolbarAction::ShowLog;
                    ui.close_menu();
                }
                if ui.button("ℹ About").clicked() {
                    action = ToolbarAction::ShowAbout;
                    ui.close_menu();
                }
            });

            ui.separator();

            egui::ComboBox::from_label("save as")
                .selected_text(format!(".{}", save_extension))
                .show_ui(ui, |ui| {
                    for ext in ["seq", "json"] {
                        ui.selectable_value(save_extension, ext.to_string(), format!(".{}", ext));
                    }
                });

            if ui.button("📈 Plot").clicked() {
                action = ToolbarAction::PlotSequence;
            }
            if ui.button("🧲 Simulate").clicked() {
                action = ToolbarAction::Simulate;
            }

            if pending_dialogs > 0 {
                ui.separator();
                ui.label(format!("⏳ {} dialog(s) waiting", pending_dialogs));
            }
        });
    });

    action
}
