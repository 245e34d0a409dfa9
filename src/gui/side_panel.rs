/// Left sidebar: presets, slice plane parameters, phantom selection

use crate::collab::PlaneRequest;

#[derive(Debug, Clone)]
pub struct SidePanelState {
    pub presets: Vec<String>,
    pub selected_preset: Option<String>,

    // Slice plane, SI units
    pub gx: f32,     // T/m
    pub gy: f32,     // T/m
    pub gz: f32,     // T/m
    pub deltaf: f32, // Hz
    pub gamma: f32,  // Hz/T

    pub phantoms: Vec<String>,
    pub phantom: String,
}

impl Default for SidePanelState {
    fn default() -> Self {
        Self {
            presets: Vec::new(),
            selected_preset: None,
            gx: 0.01,
            gy: 0.0,
            gz: 0.0,
            deltaf: 0.0,
            gamma: 42.577e6,
            phantoms: Vec::new(),
            phantom: "brain".to_string(),
        }
    }
}

impl SidePanelState {
    pub fn plane_request(&self) -> PlaneRequest {
        PlaneRequest {
            gx: self.gx,
            gy: self.gy,
            gz: self.gz,
            deltaf: self.deltaf,
            gamma: self.gamma,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SidePanelAction {
    None,
    RefreshPresets,
    RefreshPhantoms,
    LoadPreset(String),
    PlotPlane,
    DisplayPhantom,
}

pub fn show_side_panel(ui: &mut egui::Ui, state: &mut SidePanelState) -> SidePanelAction {
    let mut action = SidePanelAction::None;

    ui.heading("📚 Presets");
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt("preset_select")
            .selected_text(state.selected_preset.clone().unwrap_or_else(|| "None".to_string()))
            .show_ui(ui, |ui| {
                for name in &state.presets {
                    ui.selectable_value(&mut state.selected_preset, Some(name.clone()), name.as_str());
                }
            });
        if ui.button("🔄").on_hover_text("Refresh preset list").clicked() {
            action = SidePanelAction::RefreshPresets;
        }
    });
    let can_load = state.selected_preset.is_some();
    if ui.add_enabled(can_load, egui::Button::new("Load preset")).clicked() {
        if let Some(name) = &state.selected_preset {
            action = SidePanelAction::LoadPreset(name.clone());
        }
    }

    ui.separator();
    ui.heading("🧭 Slice plane");
    egui::Grid::new("plane_grid").num_columns(2).show(ui, |ui| {
        for (label, value, speed) in [
            ("Gx (T/m)", &mut state.gx, 0.001),
            ("Gy (T/m)", &mut state.gy, 0.001),
            ("Gz (T/m)", &mut state.gz, 0.001),
            ("Δf (Hz)", &mut state.deltaf, 10.0),
            ("γ (Hz/T)", &mut state.gamma, 1000.0),
        ] {
            ui.label(label);
            ui.add(egui::DragValue::new(value).speed(speed));
            ui.end_row();
        }
    });
    if ui.button("Show plane").clicked() {
        action = SidePanelAction::PlotPlane;
    }

    ui.separator();
    ui.heading("🧠 Phantom");
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt("phantom_select")
            .selected_text(state.phantom.as_str())
            .show_ui(ui, |ui| {
                for name in &state.phantoms {
                    ui.selectable_value(&mut state.phantom, name.clone(), name.as_str());
                }
            });
        if ui.button("🔄").on_hover_text("Rescan phantom directory").clicked() {
            action = SidePanelAction::RefreshPhantoms;
        }
    });
    if state.phantoms.is_empty() {
        ui.weak("No phantoms found");
    }
    if ui.button("Display").clicked() {
        action = SidePanelAction::DisplayPhantom;
    }

    action
}
