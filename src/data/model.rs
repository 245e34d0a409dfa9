/// Sequence and scanner documents
///
/// Both models are JSON objects whose contents belong to the simulation
/// engine. The editor only checks that the top-level value is an object and
/// otherwise passes the document through untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::error::{BackendError, BackendResult};

/// File form selected by the extension of a download request.
/// Every form is pretty-printed JSON; only the suffix and dialog filter differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Seq,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Seq => "seq",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SaveFormat::Json => "JSON",
            SaveFormat::Seq => "Pulse sequence",
        }
    }

    /// Formats accepted for sequence files
    pub fn for_sequence(extension: &str) -> BackendResult<Self> {
        match normalize_extension(extension).as_str() {
            "json" => Ok(SaveFormat::Json),
            "seq" => Ok(SaveFormat::Seq),
            _ => Err(BackendError::UnsupportedExtension(extension.to_string())),
        }
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn parse_object(text: &str, kind: &'static str) -> BackendResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(BackendError::NotAnObject(kind)),
    }
}

fn read_object(path: &Path, kind: &'static str) -> BackendResult<Map<String, Value>> {
    let text = fs::read_to_string(path).map_err(|e| BackendError::io(path, e))?;
    parse_object(&text, kind)
}

fn write_pretty(path: &Path, value: &Value) -> BackendResult<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).map_err(|e| BackendError::io(path, e))
}

/// A pulse sequence document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceModel(Value);

impl SequenceModel {
    const KIND: &'static str = "Sequence";

    /// Parse the string representation handed over by the UI
    pub fn from_ui(text: &str) -> BackendResult<Self> {
        parse_object(text, Self::KIND).map(|m| Self(Value::Object(m)))
    }

    pub fn read(path: &Path) -> BackendResult<Self> {
        read_object(path, Self::KIND).map(|m| Self(Value::Object(m)))
    }

    pub fn write(&self, path: &Path) -> BackendResult<()> {
        write_pretty(path, &self.0)
    }

    /// The `blocks` array, when the document has one
    pub fn blocks(&self) -> Option<&Vec<Value>> {
        self.0.get("blocks").and_then(Value::as_array)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

/// A scanner hardware document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScannerModel(Value);

impl ScannerModel {
    const KIND: &'static str = "Scanner";

    pub fn from_ui(text: &str) -> BackendResult<Self> {
        parse_object(text, Self::KIND).map(|m| Self(Value::Object(m)))
    }

    pub fn read(path: &Path) -> BackendResult<Self> {
        read_object(path, Self::KIND).map(|m| Self(Value::Object(m)))
    }

    pub fn write(&self, path: &Path) -> BackendResult<()> {
        write_pretty(path, &self.0)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}
