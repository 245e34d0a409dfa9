/// Session activity log
///
/// Every request the editor issues is recorded with its request id, the
/// operation, a one-line summary and whether it succeeded. The log can be
/// exported as plain text or JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use crate::backend::notify::{Event, Notification, Operation, RequestId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// 1-based position in the session
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    pub request: RequestId,
    pub operation: Operation,
    pub summary: String,
    pub ok: bool,
}

impl ActivityEntry {
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {} | {}\n      Request: {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            if self.ok { "ok  " } else { "FAIL" },
            self.operation,
            self.summary,
            self.request,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    pub software_version: String,
    pub entries: Vec<ActivityEntry>,
}

/// Operation and summary line for a notification
pub fn describe(event: &Event) -> (Operation, String) {
    match event {
        Event::SequenceFileChosen { path, .. } => {
            (Operation::UploadSequence, format!("Opened {}", path.display()))
        }
        Event::ScannerFileChosen { path, .. } => {
            (Operation::UploadScanner, format!("Opened {}", path.display()))
        }
        Event::PresetsAvailable(names) => (
            Operation::UploadSequenceFromPresets,
            format!("{} presets available", names.len()),
        ),
        Event::SequenceLoaded { name, .. } => {
            (Operation::LoadPresetSequence, format!("Loaded preset {}", name))
        }
        Event::SequenceSaved(path) => (Operation::DownloadSequence, format!("Saved {}", path.display())),
        Event::ScannerSaved(path) => (Operation::DownloadScanner, format!("Saved {}", path.display())),
        Event::SequencePlotted(plot) => (
            Operation::PlotSequence,
            format!("{} traces over {:.3} ms", plot.traces.len(), plot.total_duration * 1e3),
        ),
        Event::SlicePlaneReady(plane) => (
            Operation::Plot3d,
            format!(
                "Normal ({:.3}, {:.3}, {:.3}), offset {:.2} mm",
                plane.normal[0], plane.normal[1], plane.normal[2], plane.distance_mm
            ),
        ),
        Event::PhantomReady(image) => (
            Operation::DisplayPhantom,
            format!("{} ({})", image.name, image.path.display()),
        ),
        Event::SimulationFinished(_) => (Operation::Simulate, "Simulation finished".to_string()),
        Event::Failed { operation, message } => (*operation, message.clone()),
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, request: RequestId, operation: Operation, summary: &str, ok: bool) {
        let seq = self.entries.len() + 1;
        self.entries.push(ActivityEntry {
            sequence: seq,
            timestamp: Local::now(),
            request,
            operation,
            summary: summary.to_string(),
            ok,
        });
        log::debug!("[LOG {:03}] {} — {}", seq, operation, summary);
    }

    pub fn record_notification(&mut self, notification: &Notification) {
        let (operation, summary) = describe(&notification.event);
        self.record(
            notification.request,
            operation,
            &summary,
            !notification.event.is_failure(),
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.ok).count()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str("  Sequence Editor Activity Log\n");
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str(&format!("  Session ID:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:     {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Software:    seq_editor v{}\n", self.software_version));
        out.push_str(&format!(
            "  Requests:    {} ({} failed)\n",
            self.entries.len(),
            self.failures()
        ));
        out.push_str("───────────────────────────────────────────────────────────────\n\n");

        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push_str("\n\n");
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save_text(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_text())
    }

    pub fn save_json(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
