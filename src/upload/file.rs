//! Candidate files and the extension allow-list.

use crate::domain::{ApiFailure, Result, ValidationKind};
use serde::Serialize;
use std::path::Path;

/// Where a candidate file came from. Both paths feed the same entry point;
/// the source is only recorded for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSource {
    DragDrop,
    Picker,
}

/// A file offered for upload: its name and raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    /// Reads a file from disk, keeping only its file name.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }

    /// Lowercased extension without the dot, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Case-insensitive allow-list of file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    allowed: Vec<String>,
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self::new(["xlsx", "xls"])
    }
}

impl ExtensionPolicy {
    /// Builds a policy; entries may be given with or without a leading dot.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { allowed }
    }

    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Checks the file before anything is sent.
    ///
    /// # Errors
    ///
    /// `Validation(InvalidFormat)` for a disallowed extension,
    /// `Validation(EmptyFile)` for a zero-byte file.
    pub fn validate(&self, file: &CandidateFile) -> std::result::Result<(), ApiFailure> {
        let accepted = file
            .extension()
            .is_some_and(|ext| self.allowed.iter().any(|a| *a == ext));
        if !accepted {
            let allowed = self
                .allowed
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join("/");
            return Err(ApiFailure::validation(
                ValidationKind::InvalidFormat,
                format!("{} is not an accepted file ({allowed})", file.name),
            ));
        }
        if file.is_empty() {
            return Err(ApiFailure::validation(
                ValidationKind::EmptyFile,
                format!("{} is empty", file.name),
            ));
        }
        Ok(())
    }
}
