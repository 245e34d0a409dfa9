/// Blocking desktop dialogs via rfd

use super::{DialogSpec, FilePicker, PickCallback};
use crate::backend::notify::RequestId;

#[derive(Debug, Clone, Default)]
pub struct NativePicker;

impl NativePicker {
    fn dialog(opts: &DialogSpec) -> rfd::FileDialog {
        let mut dialog = rfd::FileDialog::new().set_title(&opts.title);
        if !opts.extensions.is_empty() {
            dialog = dialog.add_filter(&opts.filter_name, &opts.extensions[..]);
        }
        if let Some(name) = &opts.file_name {
            dialog = dialog.set_file_name(name);
        }
        dialog
    }
}

impl FilePicker for NativePicker {
    fn pick_open(&self, request: RequestId, dialog: DialogSpec, done: PickCallback) {
        log::debug!("[{}] open dialog: {}", request.short(), dialog.title);
        done(Self::dialog(&dialog).pick_file());
    }

    fn pick_save(&self, request: RequestId, dialog: DialogSpec, done: PickCallback) {
        log::debug!("[{}] save dialog: {}", request.short(), dialog.title);
        done(Self::dialog(&dialog).save_file());
    }
}
