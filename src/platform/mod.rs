//! File selection behind a platform seam.
//!
//! Desktop builds answer a dialog before the call returns. Hosts that can
//! only answer later (a browser page, a test harness) park the request and
//! complete it through a handle. Both report through the same callback:
//! `Some(path)` when the user chose a file, `None` when the dialog was
//! dismissed.

pub mod deferred;
pub mod native;

use std::path::PathBuf;

use crate::backend::notify::RequestId;

pub use deferred::{DeferredHandle, DeferredPicker, PendingDialog};
pub use native::NativePicker;

/// Completion callback for a dialog
pub type PickCallback = Box<dyn FnOnce(Option<PathBuf>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Open,
    Save,
}

/// What a dialog should look like
#[derive(Debug, Clone, PartialEq)]
pub struct DialogSpec {
    pub title: String,
    pub filter_name: String,
    pub extensions: Vec<String>,
    pub file_name: Option<String>,
}

impl DialogSpec {
    pub fn new(title: &str, filter_name: &str, extensions: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            filter_name: filter_name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            file_name: None,
        }
    }

    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }
}

pub trait FilePicker {
    fn pick_open(&self, request: RequestId, dialog: DialogSpec, done: PickCallback);
    fn pick_save(&self, request: RequestId, dialog: DialogSpec, done: PickCallback);
}

/// Which picker the host wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerKind {
    #[default]
    Native,
    Deferred,
}
