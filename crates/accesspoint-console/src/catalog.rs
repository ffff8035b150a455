//! Candidate groups for the group tag input.
//!
//! Groups live on disk as `<group>.txt` files, one server IP per line. The
//! console only needs the names; the backend expands groups into IPs.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use crate::{ConsoleError, TagInput};

/// Sorted list of known group names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCatalog {
    names: Vec<String>,
}

impl GroupCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Read group names from the `.txt` files in `dir`.
    ///
    /// A missing directory yields an empty catalog.
    pub async fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let dir = dir.as_ref();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(dir = %dir.display(), "group directory not found");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        let catalog = Self::new(names);
        info!(dir = %dir.display(), groups = catalog.len(), "loaded group catalog");
        Ok(catalog)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// A group tag input autocompleting from this catalog.
    pub fn tag_input(&self) -> TagInput {
        TagInput::with_candidates(self.names.iter().cloned())
    }
}
