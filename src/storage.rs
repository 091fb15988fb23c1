//! Uploaded and generated files on local disk.
//!
//! Files are stored under the configured upload directory with generated
//! names; the database only keeps the relative path, the display name and the
//! size (see [`StoredFile`]).

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::domain::document::StoredFile;

/// Sub-directory of the upload root holding each kind of file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Folder {
    Contracts,
    Templates,
    Quotations,
    Invoices,
}

impl Folder {
    const fn as_str(self) -> &'static str {
        match self {
            Folder::Contracts => "contracts",
            Folder::Templates => "templates",
            Folder::Quotations => "quotations",
            Folder::Invoices => "invoices",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileStorage {
    root: PathBuf,
}

fn extension_of(name: &str) -> Option<String> {
    let (_, extension) = name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    (!extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(extension)
}

fn file_size(len: u64) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored relative path.
    ///
    /// Paths escaping the upload root are rejected.
    pub fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid stored path: {}", relative.display()),
            ));
        }
        Ok(self.root.join(relative))
    }

    fn target(&self, folder: Folder, original_name: &str) -> io::Result<(String, PathBuf)> {
        let directory = self.root.join(folder.as_str());
        fs::create_dir_all(&directory)?;
        let file_name = match extension_of(original_name) {
            Some(extension) => format!("{}.{extension}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let relative = format!("{}/{file_name}", folder.as_str());
        Ok((relative, directory.join(file_name)))
    }

    /// Copies an uploaded temporary file into `folder`.
    pub fn save_upload(
        &self,
        folder: Folder,
        source: &Path,
        original_name: &str,
    ) -> io::Result<StoredFile> {
        let (relative, destination) = self.target(folder, original_name)?;
        let size = fs::copy(source, &destination)?;
        Ok(StoredFile {
            path: relative,
            name: original_name.to_string(),
            size: file_size(size),
        })
    }

    /// Writes `bytes` as a new file in `folder`.
    pub fn save_bytes(&self, folder: Folder, bytes: &[u8], name: &str) -> io::Result<StoredFile> {
        let (relative, destination) = self.target(folder, name)?;
        fs::write(&destination, bytes)?;
        Ok(StoredFile {
            path: relative,
            name: name.to_string(),
            size: file_size(bytes.len() as u64),
        })
    }

    /// Replaces the content of a stored file in place.
    pub fn overwrite(&self, file: &StoredFile, bytes: &[u8]) -> io::Result<StoredFile> {
        let destination = self.resolve(&file.path)?;
        fs::write(destination, bytes)?;
        Ok(StoredFile {
            size: file_size(bytes.len() as u64),
            ..file.clone()
        })
    }

    pub fn read(&self, file: &StoredFile) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(&file.path)?)
    }

    /// Removes a stored file; a file that is already gone is not an error.
    pub fn remove(&self, file: &StoredFile) -> io::Result<()> {
        match fs::remove_file(self.resolve(&file.path)?) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Removes a file and logs instead of failing the caller.
    pub fn discard(&self, file: &StoredFile) {
        if let Err(err) = self.remove(file) {
            log::warn!("Failed to remove stored file {}: {err}", file.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_files_keep_extension_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let stored = storage
            .save_bytes(Folder::Templates, b"docx", "Quote.DOCX")
            .unwrap();
        assert!(stored.path.starts_with("templates/"));
        assert!(stored.path.ends_with(".docx"));
        assert_eq!(stored.name, "Quote.DOCX");
        assert_eq!(stored.size, 4);
        assert_eq!(storage.read(&stored).unwrap(), b"docx");
    }

    #[test]
    fn files_with_the_same_name_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let template = storage.save_bytes(Folder::Templates, b"abc", "t.docx").unwrap();
        let copy = storage.save_bytes(Folder::Templates, b"abc", "t.docx").unwrap();
        assert_ne!(copy.path, template.path);
        storage.overwrite(&copy, b"edited").unwrap();
        assert_eq!(storage.read(&template).unwrap(), b"abc");
        storage.remove(&copy).unwrap();
        storage.remove(&copy).unwrap();
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let storage = FileStorage::new("/srv/uploads");
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert_eq!(
            storage.resolve("contracts/a.pdf").unwrap(),
            PathBuf::from("/srv/uploads/contracts/a.pdf")
        );
    }
}
