//! Descriptor Loading
//!
//! Reads already-parsed descriptor documents from YAML or JSON files.
//! The format is chosen from the file extension: `.json` is read as JSON,
//! everything else as YAML.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::LoadError;

use super::model::Document;

/// Serialization format of a descriptor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Picks the format from a path's extension.
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Loads a descriptor document from a file.
///
/// # Example
///
/// ```rust,no_run
/// use wdlforge::workflow::load_document;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let document = load_document("pipeline.yaml")?;
///     println!("Loaded '{}'", document.name());
///     Ok(())
/// }
/// ```
pub fn load_document(path: &str) -> Result<Document, LoadError> {
    info!("Loading descriptors from: {}", path);

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })?;

    debug!("Descriptor content loaded ({} bytes)", content.len());

    let document = parse_document(&content, Format::from_path(path))?;
    info!("Parsed descriptor document '{}'", document.name());
    Ok(document)
}

/// Parses descriptor text in the given format.
pub fn parse_document(text: &str, format: Format) -> Result<Document, LoadError> {
    let document: Document = match format {
        Format::Yaml => serde_yaml::from_str(text)?,
        Format::Json => serde_json::from_str(text)?,
    };
    Ok(document)
}

/// Saves a descriptor document, in the format implied by `path`.
pub fn save_document(document: &Document, path: &str) -> Result<(), LoadError> {
    let content = match Format::from_path(path) {
        Format::Yaml => serde_yaml::to_string(document)?,
        Format::Json => serde_json::to_string_pretty(document)?,
    };
    fs::write(path, content).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })?;
    info!("Descriptors saved to: {}", path);
    Ok(())
}
