/// Main application state and eframe::App implementation
///
/// Hosts the backend controller: UI actions become backend requests, and
/// notifications drained each frame update the editor buffers. Failures only
/// touch the status line, so the buffers keep their previous contents.

use std::path::Path;
use std::sync::mpsc::Receiver;

use eframe::egui;

use crate::backend::notify::{Event, Notification};
use crate::backend::Backend;
use crate::collab::{PhantomImage, SequencePlot, SlicePlane};
use crate::config::Settings;
use crate::gui::pending_dialogs::{self, PendingAnswer, PendingDialogsState};
use crate::gui::sequence_plot;
use crate::gui::side_panel::{self, SidePanelAction, SidePanelState};
use crate::gui::toolbar::{self, ToolbarAction};
use crate::log::activity::{self, ActivityLog};
use crate::platform::{DeferredHandle, DeferredPicker, FilePicker, NativePicker, PickerKind};

const DEFAULT_SCANNER: &str = r#"{
  "B0": 1.5,
  "B1": 10e-6,
  "Gmax": 0.06,
  "Smax": 500,
  "ADC_dt": 2e-6,
  "seq_dt": 1e-5
}"#;

const STARTUP_PRESET: &str = "gradient_echo";

/// Editor buffers, last results and status line.
/// Only success notifications touch the buffers.
pub struct Workspace {
    pub sequence_text: String,
    pub scanner_text: String,

    pub plot: Option<SequencePlot>,
    pub slice_plane: Option<SlicePlane>,
    pub phantom: Option<PhantomImage>,
    pub simulation: Option<String>,

    pub side_panel: SidePanelState,
    pub activity: ActivityLog,

    pub status_message: String,
    pub status_is_error: bool,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            sequence_text: String::new(),
            scanner_text: DEFAULT_SCANNER.to_string(),
            plot: None,
            slice_plane: None,
            phantom: None,
            simulation: None,
            side_panel: SidePanelState::default(),
            activity: ActivityLog::new(),
            status_message: "Ready".to_string(),
            status_is_error: false,
        }
    }
}

impl Workspace {
    pub fn apply(&mut self, n: Notification) {
        self.activity.record_notification(&n);
        let (_, summary) = activity::describe(&n.event);
        self.status_is_error = n.event.is_failure();
        self.status_message = format!("[{}] {}", n.request.short(), summary);

        match n.event {
            Event::SequenceFileChosen { model, .. } | Event::SequenceLoaded { model, .. } => {
                self.sequence_text = model.to_pretty_string();
                self.plot = None;
            }
            Event::ScannerFileChosen { model, .. } => {
                self.scanner_text = model.to_pretty_string();
            }
            Event::PresetsAvailable(names) => {
                let panel = &mut self.side_panel;
                if let Some(sel) = &panel.selected_preset {
                    if !names.contains(sel) {
                        panel.selected_preset = None;
                    }
                }
                panel.presets = names;
            }
            Event::SequenceSaved(_) | Event::ScannerSaved(_) => {}
            Event::SequencePlotted(plot) => self.plot = Some(plot),
            Event::SlicePlaneReady(plane) => self.slice_plane = Some(plane),
            Event::PhantomReady(image) => self.phantom = Some(image),
            Event::SimulationFinished(result) => {
                self.simulation = Some(
                    serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("JSON error: {}", e)),
                );
            }
            Event::Failed { .. } => {}
        }
    }

    pub fn set_phantoms(&mut self, names: Vec<String>) {
        let panel = &mut self.side_panel;
        if !names.is_empty() && !names.contains(&panel.phantom) {
            panel.phantom = names[0].clone();
        }
        panel.phantoms = names;
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        self.status_message = message;
        self.status_is_error = is_error;
    }
}

/// The main application
pub struct SeqEditorApp {
    backend: Backend,
    notifications: Receiver<Notification>,
    /// Present when dialogs are answered inside the window
    deferred: Option<DeferredHandle>,

    workspace: Workspace,
    save_extension: String,
    pending_dialogs_state: PendingDialogsState,

    show_log_window: bool,
    show_about: bool,
}

impl SeqEditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let (picker, deferred): (Box<dyn FilePicker>, Option<DeferredHandle>) = match settings.picker {
            PickerKind::Native => (Box::new(NativePicker), None),
            PickerKind::Deferred => {
                let picker = DeferredPicker::new();
                let handle = picker.handle();
                (Box::new(picker), Some(handle))
            }
        };
        log::info!("File dialogs: {:?}", settings.picker);

        let (backend, notifications) = Backend::from_settings(&settings, picker);
        backend.upload_sequence_from_presets();
        backend.load_preset_sequence(STARTUP_PRESET);

        let mut workspace = Workspace::default();
        workspace.set_phantoms(backend.phantom_names());

        Self {
            backend,
            notifications,
            deferred,
            workspace,
            save_extension: "seq".to_string(),
            pending_dialogs_state: PendingDialogsState::default(),
            show_log_window: false,
            show_about: false,
        }
    }

    fn drain_notifications(&mut self) {
        while let Ok(n) = self.notifications.try_recv() {
            self.workspace.apply(n);
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::OpenSequence => {
                self.backend.upload_sequence();
            }
            ToolbarAction::SaveSequence => {
                self.backend
                    .download_sequence(&self.workspace.sequence_text, &self.save_extension);
            }
            ToolbarAction::OpenScanner => {
                self.backend.upload_scanner();
            }
            ToolbarAction::SaveScanner => {
                self.backend.download_scanner(&self.workspace.scanner_text);
            }
            ToolbarAction::PlotSequence => {
                let ws = &self.workspace;
                self.backend.plot_sequence(&ws.scanner_text, &ws.sequence_text);
            }
            ToolbarAction::Simulate => {
                let ws = &self.workspace;
                self.backend.simulate(&ws.sequence_text, &ws.scanner_text);
            }
            ToolbarAction::ExportLog => {
                if let Some(path) = toolbar::save_log_dialog() {
                    self.export_log(&path);
                }
            }
            ToolbarAction::ShowLog => self.show_log_window = true,
            ToolbarAction::ShowAbout => self.show_about = true,
            ToolbarAction::None => {}
        }
    }

    fn handle_side_panel_action(&mut self, action: SidePanelAction) {
        match action {
            SidePanelAction::RefreshPresets => {
                self.backend.upload_sequence_from_presets();
            }
            SidePanelAction::RefreshPhantoms => {
                let names = self.backend.phantom_names();
                self.workspace.set_phantoms(names);
            }
            SidePanelAction::LoadPreset(name) => {
                self.backend.load_preset_sequence(&name);
            }
            SidePanelAction::PlotPlane => {
                let r = self.workspace.side_panel.plane_request();
                self.backend.plot_3d(r.gx, r.gy, r.gz, r.deltaf, r.gamma);
            }
            SidePanelAction::DisplayPhantom => {
                self.backend.display_phantom(&self.workspace.side_panel.phantom);
            }
            SidePanelAction::None => {}
        }
    }

    fn export_log(&mut self, path: &Path) {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let ws = &mut self.workspace;
        let result = match ext.as_str() {
            "json" => ws.activity.save_json(path),
            _ => ws.activity.save_text(path),
        };
        match result {
            Ok(_) => ws.set_status(format!("Log saved: {}", path.display()), false),
            Err(e) => ws.set_status(format!("Error saving log: {}", e), true),
        }
    }

    fn show_results(&self, ui: &mut egui::Ui) {
        let ws = &self.workspace;
        sequence_plot::show_sequence_plot(ui, ws.plot.as_ref());

        if let Some(plane) = &ws.slice_plane {
            ui.separator();
            ui.strong("Slice plane");
            sequence_plot::show_slice_plane(ui, plane);
        }
        if let Some(image) = &ws.phantom {
            ui.separator();
            ui.strong(format!("Phantom: {}", image.name));
            ui.monospace(image.path.display().to_string());
        }
        if let Some(sim) = &ws.simulation {
            ui.separator();
            egui::CollapsingHeader::new("Simulation result")
                .default_open(false)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                        ui.monospace(sim.as_str());
                    });
                });
        }
    }
}

impl eframe::App for SeqEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_notifications();

        // ── Deferred dialogs ──
        let pending = self.deferred.as_ref().map(|h| h.pending()).unwrap_or_default();
        let answers = pending_dialogs::show_pending_dialogs(ctx, &mut self.pending_dialogs_state, &pending);
        if let Some(handle) = &self.deferred {
            for answer in answers {
                match answer {
                    PendingAnswer::Resolve(request, choice) => {
                        handle.resolve(request, choice);
                    }
                    PendingAnswer::CancelAll => {
                        let n = handle.cancel_all();
                        log::info!("Cancelled {} file requests", n);
                    }
                }
            }
        }

        // ── Toolbar ──
        let toolbar_action = toolbar::show_toolbar(ctx, &mut self.save_extension, pending.len());

        // ── Status bar ──
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let ws = &self.workspace;
            ui.horizontal(|ui| {
                if ws.status_is_error {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 60), &ws.status_message);
                } else {
                    ui.label(&ws.status_message);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{} requests", ws.activity.len()));
                });
            });
        });

        // ── Side panel ──
        let side_action = egui::SidePanel::left("side_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| side_panel::show_side_panel(ui, &mut self.workspace.side_panel))
            .inner;

        // ── Editors + results ──
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                cols[0].strong("Sequence");
                egui::ScrollArea::vertical()
                    .id_salt("sequence_editor")
                    .max_height(320.0)
                    .show(&mut cols[0], |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.workspace.sequence_text)
                                .code_editor()
                                .desired_width(f32::INFINITY)
                                .desired_rows(18),
                        );
                    });
                cols[1].strong("Scanner");
                egui::ScrollArea::vertical()
                    .id_salt("scanner_editor")
                    .max_height(320.0)
                    .show(&mut cols[1], |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.workspace.scanner_text)
                                .code_editor()
                                .desired_width(f32::INFINITY)
                                .desired_rows(18),
                        );
                    });
            });
            ui.separator();
            self.show_results(ui);
        });

        // ── Log Window ──
        if self.show_log_window {
            egui::Window::new("📋 Activity Log")
                .open(&mut self.show_log_window)
                .default_size([600.0, 400.0])
                .resizable(true)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.style_mut().override_font_id = Some(egui::FontId::monospace(12.0));
                        ui.label(self.workspace.activity.to_text());
                    });
                });
        }

        // ── About Dialog ──
        if self.show_about {
            egui::Window::new("About")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.heading("🧲 MRI Sequence Editor");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(10.0);
                    ui.label("Edit pulse sequences and scanner settings,");
                    ui.label("plot waveforms and hand them to a simulator.");
                });
        }

        self.handle_toolbar_action(toolbar_action);
        self.handle_side_panel_action(side_action);

        // Dialog answers and engine results arrive outside input events
        if self.deferred.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}
