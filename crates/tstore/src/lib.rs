#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `tstore` holds the temporary file a reconstruction writes into: created
//! under an exclusive, randomly-generated name, accepting block-aligned
//! writes, and truncated to the target's exact length on completion.
//!
//! # Design
//!
//! Ownership of the open file and its path can be transferred to a caller
//! exactly once via [`TargetStore::take_file`] / [`TargetStore::take_path`],
//! mirroring the historical target store's "take" getters that null out
//! their internal field on first call rather than handing out a shared
//! mutable pointer.
//!
//! # Invariants
//!
//! - Writes are only ever issued at `block_id * blocksize` offsets, whole
//!   block lengths (the final block may be shorter; see
//!   [`control::TargetDescription::block_len`]).
//! - The file is retained on disk until explicitly removed by the caller —
//!   an aborted run's `.part` file is a deliberate feature, not a leak.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use matchscan::BlockSink;
use thiserror::Error;

/// Failures writing to or finalizing the temporary target file.
#[derive(Debug, Error)]
pub enum TargetStoreError {
    /// Underlying I/O failure.
    #[error("target store I/O error: {0}")]
    Io(#[from] io::Error),

    /// Could not persist the temporary file under a stable path.
    #[error("failed to persist temporary file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// The file handle or path was already transferred to a caller via
    /// [`TargetStore::take_file`] / [`TargetStore::take_path`].
    #[error("target store handle was already taken")]
    AlreadyTaken,
}

/// Convenience alias for target-store results.
pub type Result<T> = std::result::Result<T, TargetStoreError>;

/// The temporary file backing an in-progress reconstruction.
pub struct TargetStore {
    file: Option<File>,
    path: Option<PathBuf>,
    blocksize: u32,
    length: u64,
}

impl TargetStore {
    /// Creates a new, exclusively-owned temporary file inside `dir`.
    pub fn create_in(dir: &Path, blocksize: u32, length: u64) -> Result<Self> {
        let named = tempfile::Builder::new()
            .prefix(".zsync-")
            .suffix(".part")
            .tempfile_in(dir)?;
        let (file, path) = named.keep()?;
        Ok(Self {
            file: Some(file),
            path: Some(path),
            blocksize,
            length,
        })
    }

    /// Writes `data` at the block-aligned offset for `block_id`.
    pub fn write_aligned(&mut self, block_id: u32, data: &[u8]) -> Result<()> {
        let file = self.file.as_mut().ok_or(TargetStoreError::AlreadyTaken)?;
        let offset = u64::from(block_id) * u64::from(self.blocksize);
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        Ok(())
    }

    /// Truncates the file to exactly the target's declared length.
    pub fn finalize(&mut self) -> Result<()> {
        let file = self.file.as_ref().ok_or(TargetStoreError::AlreadyTaken)?;
        file.set_len(self.length)?;
        Ok(())
    }

    /// The store's current path, if not yet taken.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Renames the underlying file to `new_path` and updates the path this
    /// store reports, so a caller that moves the in-progress file to a
    /// stable `.part` location keeps a consistent view of where it lives.
    pub fn rename_to(&mut self, new_path: PathBuf) -> Result<()> {
        let current = self.path.as_ref().ok_or(TargetStoreError::AlreadyTaken)?;
        std::fs::rename(current, &new_path)?;
        self.path = Some(new_path);
        Ok(())
    }

    /// Transfers ownership of the open file handle to the caller. Returns
    /// `None` if already taken.
    pub fn take_file(&mut self) -> Option<File> {
        self.file.take()
    }

    /// Transfers ownership of the file's path to the caller. Returns
    /// `None` if already taken.
    pub fn take_path(&mut self) -> Option<PathBuf> {
        self.path.take()
    }
}

impl BlockSink for TargetStore {
    fn write_block(&mut self, block_id: u32, data: &[u8]) -> io::Result<()> {
        self.write_aligned(block_id, data).map_err(|err| match err {
            TargetStoreError::Io(err) => err,
            other => io::Error::other(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn writes_land_at_block_aligned_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TargetStore::create_in(dir.path(), 8, 20).unwrap();

        store.write_aligned(0, b"AAAAAAAA").unwrap();
        store.write_aligned(2, b"CCCC").unwrap();
        store.finalize().unwrap();

        let path = store.path().unwrap().to_path_buf();
        let mut contents = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut contents).unwrap();

        assert_eq!(contents.len(), 20);
        assert_eq!(&contents[0..8], b"AAAAAAAA");
        assert_eq!(&contents[16..20], b"CCCC");
    }

    #[test]
    fn finalize_truncates_to_exact_length() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TargetStore::create_in(dir.path(), 8, 5).unwrap();
        store.write_aligned(0, b"AAAAAAAA").unwrap();
        store.finalize().unwrap();

        let path = store.path().unwrap().to_path_buf();
        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), 5);
    }

    #[test]
    fn take_file_and_take_path_are_each_one_shot() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TargetStore::create_in(dir.path(), 8, 8).unwrap();

        assert!(store.take_file().is_some());
        assert!(store.take_file().is_none());

        assert!(store.take_path().is_some());
        assert!(store.take_path().is_none());
    }

    #[test]
    fn writing_after_take_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TargetStore::create_in(dir.path(), 8, 8).unwrap();
        store.take_file();
        let err = store.write_aligned(0, b"AAAAAAAA").unwrap_err();
        assert!(matches!(err, TargetStoreError::AlreadyTaken));
    }
}
