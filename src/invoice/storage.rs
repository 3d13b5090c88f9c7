//! The directory that uploaded invoice files are written to.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::io::AsyncWriteExt;

use crate::{Error, invoice::domain::FileName};

/// A flat directory of invoice files keyed by their sanitized names.
#[derive(Debug, Clone)]
pub struct InvoiceStorage {
    root: PathBuf,
}

impl InvoiceStorage {
    /// Use `root` as the storage directory, creating it if it does not exist.
    ///
    /// # Errors
    /// Returns [Error::StorageError] if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|error| {
            Error::StorageError(format!(
                "could not create upload directory {}: {error}",
                root.display()
            ))
        })?;

        Ok(Self { root })
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the file named `file_name` lives in the storage directory.
    pub fn path_for(&self, file_name: &FileName) -> PathBuf {
        self.root.join(file_name.as_ref())
    }

    /// Write `contents` to a new file named `file_name`.
    ///
    /// Existing files are never overwritten.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateInvoiceFileName] if a file with that name already exists,
    /// - or [Error::StorageError] if the file could not be written.
    pub async fn write_new(&self, file_name: &FileName, contents: &[u8]) -> Result<PathBuf, Error> {
        let path = self.path_for(file_name);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|error| match error.kind() {
                ErrorKind::AlreadyExists => Error::DuplicateInvoiceFileName(file_name.to_string()),
                _ => Error::StorageError(format!("could not create {}: {error}", path.display())),
            })?;

        let written = match file.write_all(contents).await {
            Ok(()) => file.flush().await,
            Err(error) => Err(error),
        };

        if let Err(error) = written {
            drop(file);
            self.remove(&path).await;
            return Err(Error::StorageError(format!(
                "could not write {}: {error}",
                path.display()
            )));
        }

        Ok(path)
    }

    /// Read the file named `file_name`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if there is no such file,
    /// - or [Error::StorageError] if the file could not be read.
    pub async fn read(&self, file_name: &FileName) -> Result<Vec<u8>, Error> {
        let path = self.path_for(file_name);

        tokio::fs::read(&path)
            .await
            .map_err(|error| match error.kind() {
                ErrorKind::NotFound => Error::NotFound,
                _ => Error::StorageError(format!("could not read {}: {error}", path.display())),
            })
    }

    /// Remove the file at `path`.
    ///
    /// A file that is already gone is fine. Any other failure is logged and
    /// otherwise ignored.
    pub async fn remove(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} was already removed", path.display());
            }
            Err(error) => {
                tracing::warn!("could not remove {}: {error}", path.display());
            }
        }
    }
}
