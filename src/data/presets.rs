/// Preset sequence catalog
///
/// Presets come from two places: a handful compiled into the binary and an
/// optional directory of `*.json` files. A directory preset replaces a
/// built-in one with the same name.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::backend::error::{BackendError, BackendResult};

use super::model::SequenceModel;

const BUILTIN_PRESETS: &[(&str, &str)] = &[
    (
        "free_induction_decay",
        include_str!("../../presets/free_induction_decay.json"),
    ),
    ("gradient_echo", include_str!("../../presets/gradient_echo.json")),
    ("spin_echo", include_str!("../../presets/spin_echo.json")),
];

#[derive(Debug, Clone)]
enum PresetSource {
    Builtin(&'static str),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PresetCatalog {
    directory: Option<PathBuf>,
}

impl PresetCatalog {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }

    fn discover(&self) -> BackendResult<BTreeMap<String, PresetSource>> {
        let mut presets = BTreeMap::new();
        for &(name, text) in BUILTIN_PRESETS {
            presets.insert(name.to_string(), PresetSource::Builtin(text));
        }

        if let Some(dir) = &self.directory {
            let entries = fs::read_dir(dir).map_err(|e| BackendError::io(dir, e))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if !p.is_file() {
                    continue;
                }
                let ext = p
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if ext != "json" {
                    continue;
                }
                let name = p
                    .file_stem()
                    .map(|s| s.to_string_lossy().trim().to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                presets.insert(name, PresetSource::File(p));
            }
        }
        Ok(presets)
    }

    /// Preset names: unique, non-empty, sorted
    pub fn names(&self) -> BackendResult<Vec<String>> {
        Ok(self.discover()?.into_keys().collect())
    }

    pub fn load(&self, name: &str) -> BackendResult<SequenceModel> {
        match self.discover()?.remove(name) {
            Some(PresetSource::Builtin(text)) => SequenceModel::from_ui(text),
            Some(PresetSource::File(path)) => SequenceModel::read(&path),
            None => Err(BackendError::PresetNotFound(name.to_string())),
        }
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new(None)
    }
}
