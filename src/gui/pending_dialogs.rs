/// Window that answers deferred file dialogs
///
/// Used when the app runs with the deferred picker: each waiting request gets
/// a path field and Choose / Cancel buttons.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::backend::notify::RequestId;
use crate::platform::{DialogKind, PendingDialog};

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAnswer {
    Resolve(RequestId, Option<PathBuf>),
    CancelAll,
}

#[derive(Debug, Default)]
pub struct PendingDialogsState {
    inputs: HashMap<RequestId, String>,
}

pub fn show_pending_dialogs(
    ctx: &egui::Context,
    state: &mut PendingDialogsState,
    pending: &[PendingDialog],
) -> Vec<PendingAnswer> {
    let mut answers = Vec::new();
    state.inputs.retain(|id, _| pending.iter().any(|p| p.request == *id));
    if pending.is_empty() {
        return answers;
    }

    egui::Window::new("⏳ File requests").show(ctx, |ui| {
        for p in pending {
            ui.group(|ui| {
                let verb = match p.kind {
                    DialogKind::Open => "Open",
                    DialogKind::Save => "Save",
                };
                ui.label(format!(
                    "{}: {} (*.{})",
                    verb,
                    p.dialog.title,
                    p.dialog.extensions.join(", *.")
                ));
                let input = state
                    .inputs
                    .entry(p.request)
                    .or_insert_with(|| p.dialog.file_name.clone().unwrap_or_default());
                ui.text_edit_singleline(input);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!input.trim().is_empty(), egui::Button::new("Choose")).clicked() {
                        answers.push(PendingAnswer::Resolve(p.request, Some(PathBuf::from(input.trim()))));
                    }
                    if ui.button("Cancel").clicked() {
                        answers.push(PendingAnswer::Resolve(p.request, None));
                    }
                });
            });
        }
        if pending.len() > 1 && ui.button("Cancel all").clicked() {
            answers.push(PendingAnswer::CancelAll);
        }
    });

    answers
}
