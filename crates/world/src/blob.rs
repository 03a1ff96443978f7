use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("failed to read blob '{label}' at {path}: {source}")]
    Read {
        label: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write blob '{label}' at {path}: {source}")]
    Write {
        label: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Host persistence primitive: opaque byte blobs keyed by label. The codec
/// does not interpret, compress, or checksum what it hands over.
pub trait BlobStore {
    fn put(&mut self, label: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError>;
    fn get(&self, label: &str) -> Result<Option<Vec<u8>>, BlobStoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, label: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        self.blobs.insert(label.to_string(), bytes);
        Ok(())
    }

    fn get(&self, label: &str) -> Result<Option<Vec<u8>>, BlobStoreError> {
        Ok(self.blobs.get(label).cloned())
    }
}

/// One file per label under a root directory, replaced atomically on write
/// so a crash mid-save never leaves a half-written blob behind.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn blob_path(&self, label: &str) -> PathBuf {
        self.root.join(format!("{label}.bin"))
    }
}

impl BlobStore for FileBlobStore {
    fn put(&mut self, label: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        let path = self.blob_path(label);
        write_bytes_atomic(&path, &bytes).map_err(|source| BlobStoreError::Write {
            label: label.to_string(),
            path,
            source,
        })
    }

    fn get(&self, label: &str) -> Result<Option<Vec<u8>>, BlobStoreError> {
        let path = self.blob_path(label);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BlobStoreError::Read {
                label: label.to_string(),
                path,
                source,
            }),
        }
    }
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, bytes)?;
    replace_file(&tmp_path, path)
}

fn replace_file(tmp_path: &Path, final_path: &Path) -> io::Result<()> {
    match fs::remove_file(final_path) {
        Ok(_) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(tmp_path);
            return Err(error);
        }
    }

    if let Err(error) = fs::rename(tmp_path, final_path) {
        let _ = fs::remove_file(tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("blob.tmp");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}
