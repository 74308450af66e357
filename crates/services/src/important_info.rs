//! Loader for the important-info document injected into every model call.

use shared::error::ImportantInfoError;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::history_store::flatten;

#[derive(Debug, Clone)]
pub struct ImportantInfo {
    path: PathBuf,
    required_sentence: String,
}

impl ImportantInfo {
    pub fn new(path: impl Into<PathBuf>, required_sentence: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_sentence: required_sentence.into(),
        }
    }

    /// Read the document with newlines flattened to spaces.
    ///
    /// The required sentence is checked after flattening, so it may wrap
    /// across lines in the file.
    pub fn load(&self) -> Result<String, ImportantInfoError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ImportantInfoError::Missing {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(ImportantInfoError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let flat = flatten(&text);
        if !flat.contains(&self.required_sentence) {
            return Err(ImportantInfoError::RequiredSentenceMissing {
                path: self.path.clone(),
            });
        }
        Ok(flat)
    }
}
