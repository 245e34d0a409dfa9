/// Notifications sent from the backend to the UI
///
/// Every request is tagged with a `RequestId` that travels with the
/// notifications it produces. Delivery is one-way: the backend never waits
/// for the UI and a closed receiver only produces a log line.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collab::{PhantomImage, SequencePlot, SimulationResult, SlicePlane};
use crate::data::model::{ScannerModel, SequenceModel};

/// Identifies one UI request and everything it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, enough to tell requests apart in a status line
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The request kinds the UI can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    UploadSequence,
    UploadSequenceFromPresets,
    LoadPresetSequence,
    DownloadSequence,
    UploadScanner,
    DownloadScanner,
    PlotSequence,
    Plot3d,
    DisplayPhantom,
    Simulate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::UploadSequence => "Upload sequence",
            Operation::UploadSequenceFromPresets => "List presets",
            Operation::LoadPresetSequence => "Load preset",
            Operation::DownloadSequence => "Save sequence",
            Operation::UploadScanner => "Upload scanner",
            Operation::DownloadScanner => "Save scanner",
            Operation::PlotSequence => "Plot sequence",
            Operation::Plot3d => "Plot slice plane",
            Operation::DisplayPhantom => "Display phantom",
            Operation::Simulate => "Simulate",
        };
        write!(f, "{}", name)
    }
}

/// What happened for a request
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SequenceFileChosen { path: PathBuf, model: SequenceModel },
    ScannerFileChosen { path: PathBuf, model: ScannerModel },
    PresetsAvailable(Vec<String>),
    SequenceLoaded { name: String, model: SequenceModel },
    SequenceSaved(PathBuf),
    ScannerSaved(PathBuf),
    SequencePlotted(SequencePlot),
    SlicePlaneReady(SlicePlane),
    PhantomReady(PhantomImage),
    SimulationFinished(SimulationResult),
    Failed { operation: Operation, message: String },
}

impl Event {
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub request: RequestId,
    pub event: Event,
}

/// Sending half of the notification channel
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, Receiver<Notification>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, request: RequestId, event: Event) {
        if let Event::Failed { operation, message } = &event {
            log::warn!("[{}] {} failed: {}", request.short(), operation, message);
        }
        if self.tx.send(Notification { request, event }).is_err() {
            log::debug!("[{}] notification dropped, UI receiver closed", request.short());
        }
    }

    pub fn fail(&self, request: RequestId, operation: Operation, message: impl fmt::Display) {
        self.send(
            request,
            Event::Failed {
                operation,
                message: message.to_string(),
            },
        );
    }
}
