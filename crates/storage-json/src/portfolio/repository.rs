use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use asset_tracker_core::portfolio::{PortfolioDocument, PortfolioRepositoryTrait};
use asset_tracker_core::Result;
use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;

use crate::errors::{IntoCore, JsonStoreError};

const INDENT: &[u8] = b"    ";

/// Keeps the whole portfolio document in one pretty-printed JSON file.
pub struct JsonPortfolioRepository {
    path: PathBuf,
}

impl JsonPortfolioRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn read_document(&self) -> std::result::Result<PortfolioDocument, JsonStoreError> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JsonStoreError::NotFound(self.path.clone())
            } else {
                JsonStoreError::io(&self.path, e)
            }
        })?;

        let document: PortfolioDocument =
            serde_json::from_str(&text).map_err(|source| JsonStoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        document.validate().map_err(|source| JsonStoreError::Invalid {
            path: self.path.clone(),
            source,
        })?;

        Ok(document)
    }

    fn write_document(
        &self,
        document: &PortfolioDocument,
    ) -> std::result::Result<(), JsonStoreError> {
        let bytes = encode(document)?;
        let directory = self.directory();
        fs::create_dir_all(directory).map_err(|e| JsonStoreError::io(directory, e))?;

        // Written beside the target so the rename stays on one filesystem.
        let mut temp =
            NamedTempFile::new_in(directory).map_err(|e| JsonStoreError::io(directory, e))?;
        temp.write_all(&bytes)
            .map_err(|e| JsonStoreError::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| JsonStoreError::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| JsonStoreError::io(&self.path, e.error))?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

/// Four-space indented JSON with a trailing newline.
fn encode(document: &PortfolioDocument) -> std::result::Result<Vec<u8>, JsonStoreError> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    bytes.push(b'\n');
    Ok(bytes)
}

impl PortfolioRepositoryTrait for JsonPortfolioRepository {
    fn load(&self) -> Result<PortfolioDocument> {
        let document = self.read_document().into_core()?;
        info!(
            "Read {} snapshot(s) from {}",
            document.len(),
            self.path.display()
        );
        Ok(document)
    }

    fn save(&self, document: &PortfolioDocument) -> Result<()> {
        self.write_document(document).into_core()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}
