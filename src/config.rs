/// Application settings
///
/// Read from `seq_editor.json` in the working directory (or the file named by
/// `SEQ_EDITOR_CONFIG`), then overridden by environment variables. A missing
/// file means defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collab::SimulatorCommand;
use crate::platform::PickerKind;

pub const CONFIG_FILE: &str = "seq_editor.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid settings in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown picker {0:?} (expected native or deferred)")]
    Picker(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Extra preset directory, layered over the built-in presets
    pub preset_dir: Option<PathBuf>,
    pub phantom_dir: PathBuf,
    pub simulator: Option<SimulatorCommand>,
    pub picker: PickerKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset_dir: None,
            phantom_dir: PathBuf::from("public/nifti_phantoms"),
            simulator: None,
            picker: PickerKind::Native,
        }
    }
}

impl Settings {
    /// Settings file plus process environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("SEQ_EDITOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// Only the file can fail the load. A bad override is logged and the
    /// value it would have replaced is kept.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::load_from(path)?;
        if let Err(e) = settings.apply_env(lookup) {
            log::warn!("{}; keeping picker {:?}", e, settings.picker);
        }
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply every override that parses; the first bad one is returned
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SEQ_EDITOR_PRESETS").filter(|s| !s.trim().is_empty()) {
            self.preset_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("SEQ_EDITOR_PHANTOMS").filter(|s| !s.trim().is_empty()) {
            self.phantom_dir = PathBuf::from(dir);
        }
        if let Some(line) = lookup("SEQ_EDITOR_SIMULATOR") {
            let mut parts = line.split_whitespace();
            if let Some(program) = parts.next() {
                self.simulator = Some(parts.fold(SimulatorCommand::new(program), SimulatorCommand::arg));
            }
        }
        if let Some(picker) = lookup("SEQ_EDITOR_PICKER") {
            match picker.trim().to_lowercase().as_str() {
                "native" => self.picker = PickerKind::Native,
                "deferred" => self.picker = PickerKind::Deferred,
                _ => return Err(ConfigError::Picker(picker)),
            }
        }
        Ok(())
    }
}
