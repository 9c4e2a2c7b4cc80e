use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::error::ConversionError;

/// A user-selected file whose content can be read asynchronously.
///
/// Reading is the only suspension point of a conversion and may fail
/// independently of decoding.
#[async_trait]
pub trait RawFile: Send + Sync {
    /// Display name, used in logs and snapshots
    fn name(&self) -> &str;

    async fn read_bytes(&self) -> Result<Vec<u8>, ConversionError>;
}

/// File content already held in memory (uploads, tests)
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    bytes: Vec<u8>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl RawFile for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, ConversionError> {
        Ok(self.bytes.clone())
    }
}

/// File on the local filesystem, read with `tokio::fs`
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RawFile for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, ConversionError> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            ConversionError::read(format!("{}: {}", self.path.display(), e))
        })
    }
}
