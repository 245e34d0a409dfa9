//! Collaborators the backend forwards work to.
//!
//! Plotting, slice-plane display, phantom rendering and simulation all live
//! behind traits so the host can swap in its own engines. The defaults here
//! are enough to drive the desktop window.

pub mod phantom;
pub mod simulator;
pub mod slice_plane;
pub mod waveform;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Settings;
use crate::data::model::{ScannerModel, SequenceModel};

pub use phantom::PhantomLibrary;
pub use simulator::{CommandSimulator, SimulatorCommand};
pub use slice_plane::SlicePlaneCalculator;
pub use waveform::WaveformPlotter;

/// Sequence channels drawn by the plotter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Rf,
    Gx,
    Gy,
    Gz,
    Adc,
}

impl Channel {
    pub const ALL: [Channel; 5] = [Channel::Rf, Channel::Gx, Channel::Gy, Channel::Gz, Channel::Adc];

    /// Key of the channel inside a sequence block
    pub fn key(&self) -> &'static str {
        match self {
            Channel::Rf => "rf",
            Channel::Gx => "gx",
            Channel::Gy => "gy",
            Channel::Gz => "gz",
            Channel::Adc => "adc",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Rf => write!(f, "RF"),
            Channel::Gx => write!(f, "Gx"),
            Channel::Gy => write!(f, "Gy"),
            Channel::Gz => write!(f, "Gz"),
            Channel::Adc => write!(f, "ADC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub channel: Channel,
    /// (time s, amplitude) vertices
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequencePlot {
    pub traces: Vec<Trace>,
    pub total_duration: f64,
}

/// The five values behind a 3D slice-plane request, as the UI sent them
#[derive(Debug, Clone, Copy, PartialEq)]
/// Slice selection in SI units: gradient in T/m, `deltaf` in Hz, `gamma` in Hz/T
pub struct PlaneRequest {
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
    pub deltaf: f32,
    pub gamma: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlicePlane {
    /// Unit normal
    pub normal: [f64; 3],
    /// Shift of the plane centre from the phantom centre (mm)
    pub offset_mm: [f64; 3],
    pub distance_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhantomImage {
    pub name: String,
    pub path: PathBuf,
}

/// Whatever the simulation engine returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationResult(pub Value);

pub trait SequencePlotter {
    fn plot(&self, scan: &ScannerModel, seq: &SequenceModel) -> Result<SequencePlot, String>;
}

pub trait SlicePlotter {
    fn plot_plane(&self, request: PlaneRequest) -> Result<SlicePlane, String>;
}

pub trait PhantomRenderer {
    fn display(&self, name: &str) -> Result<PhantomImage, String>;

    /// Names `display` will accept, when the renderer can enumerate them
    fn available(&self) -> Vec<String> {
        Vec::new()
    }
}

pub trait Simulator {
    fn simulate(&self, seq: &SequenceModel, scan: &ScannerModel) -> Result<SimulationResult, String>;
}

pub struct Collaborators {
    pub plotter: Box<dyn SequencePlotter>,
    pub slice_plotter: Box<dyn SlicePlotter>,
    pub phantoms: Box<dyn PhantomRenderer>,
    pub simulator: Box<dyn Simulator>,
}

impl Collaborators {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            plotter: Box::new(WaveformPlotter),
            slice_plotter: Box::new(SlicePlaneCalculator),
            phantoms: Box::new(PhantomLibrary::new(settings.phantom_dir.clone())),
            simulator: Box::new(CommandSimulator::new(settings.simulator.clone())),
        }
    }
}
