use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lz4_flex::frame::{FrameDecoder, FrameEncoder};

use crate::foundation::error::{MintError, MintResult};
use crate::package::tar::{TarWriter, read_entries};

/// Destination of a packaging run.
///
/// Ordering contract: `create_folder` is called for a folder before anything is deposited into it,
/// and entries arrive in ascending item order. Exactly one of `seal` or `abort` ends the sink.
pub trait ArchiveSink {
    /// What a successful run returns.
    type Sealed;

    /// Register `folder` at the archive root.
    fn create_folder(&mut self, folder: &str) -> MintResult<()>;

    /// Store `bytes` as `folder/name`. The sink takes ownership of the buffer.
    fn deposit(&mut self, folder: &str, name: &str, bytes: Vec<u8>) -> MintResult<()>;

    /// Finish the archive.
    fn seal(self) -> MintResult<Self::Sealed>
    where
        Self: Sized;

    /// Discard everything deposited so far.
    fn abort(self)
    where
        Self: Sized;
}

#[derive(Debug, Default)]
struct EntryIndex {
    folders: BTreeSet<String>,
    files: BTreeSet<String>,
}

impl EntryIndex {
    fn add_folder(&mut self, folder: &str) -> MintResult<bool> {
        check_component(folder)?;
        Ok(self.folders.insert(folder.to_string()))
    }

    fn add_file(&mut self, folder: &str, name: &str) -> MintResult<String> {
        check_component(name)?;
        if !self.folders.contains(folder) {
            return Err(MintError::archive(format!(
                "deposit into '{folder}' before the folder was created"
            )));
        }
        let path = format!("{folder}/{name}");
        if !self.files.insert(path.clone()) {
            return Err(MintError::archive(format!("duplicate archive entry '{path}'")));
        }
        Ok(path)
    }
}

fn check_component(s: &str) -> MintResult<()> {
    if s.is_empty() || s == "." || s == ".." || s.contains(['/', '\\', '\0']) {
        return Err(MintError::archive(format!("invalid archive path component '{s}'")));
    }
    Ok(())
}

/// Archive streamed into an in-memory, LZ4-framed ustar buffer.
///
/// Each deposit is compressed into the buffer at once, so only the compressed archive bytes are
/// retained. Sealing yields a `.tar.lz4` blob.
pub struct MemoryArchive {
    tar: TarWriter<FrameEncoder<Vec<u8>>>,
    index: EntryIndex,
}

impl Default for MemoryArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self {
            tar: TarWriter::new(FrameEncoder::new(Vec::new())),
            index: EntryIndex::default(),
        }
    }

    /// Uncompressed tar bytes written so far.
    pub fn buffered_len(&self) -> u64 {
        self.tar.written()
    }
}

impl ArchiveSink for MemoryArchive {
    type Sealed = SealedArchive;

    fn create_folder(&mut self, folder: &str) -> MintResult<()> {
        if self.index.add_folder(folder)? {
            self.tar.append_dir(folder)?;
        }
        Ok(())
    }

    fn deposit(&mut self, folder: &str, name: &str, bytes: Vec<u8>) -> MintResult<()> {
        let path = self.index.add_file(folder, name)?;
        self.tar.append_file(&path, &bytes)
    }

    fn seal(self) -> MintResult<SealedArchive> {
        let compressed = self
            .tar
            .finish()?
            .finish()
            .map_err(|e| MintError::archive(format!("finish lz4 frame: {e}")))?;
        SealedArchive::from_bytes(compressed)
    }

    fn abort(self) {}
}

/// Finished archive: one opaque `.tar.lz4` blob plus an index for reading entries back.
#[derive(Clone, Debug)]
pub struct SealedArchive {
    bytes: Vec<u8>,
    tar: Vec<u8>,
    files: BTreeMap<String, (usize, usize)>,
    folders: Vec<String>,
}

impl SealedArchive {
    /// Decompress and index an existing `.tar.lz4` blob.
    pub fn from_bytes(bytes: Vec<u8>) -> MintResult<Self> {
        let mut tar = Vec::new();
        FrameDecoder::new(bytes.as_slice())
            .read_to_end(&mut tar)
            .map_err(|e| MintError::archive(format!("decompress archive: {e}")))?;

        let mut files = BTreeMap::new();
        let mut folders = Vec::new();
        for entry in read_entries(&tar)? {
            if entry.is_dir {
                folders.push(entry.path.trim_end_matches('/').to_string());
            } else {
                files.insert(entry.path, (entry.offset, entry.len));
            }
        }
        Ok(Self {
            bytes,
            tar,
            files,
            folders,
        })
    }

    /// Contents of the file at `path` (`folder/name`).
    pub fn read(&self, path: &str) -> Option<&[u8]> {
        let &(offset, len) = self.files.get(path)?;
        self.tar.get(offset..offset + len)
    }

    /// File paths in lexical order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Folders in creation order.
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Return `true` when the archive holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The compressed archive blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The uncompressed ustar stream.
    pub fn tar_bytes(&self) -> &[u8] {
        &self.tar
    }

    /// Take the compressed archive blob.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Archive written as a directory tree.
///
/// Entries land in a hidden staging directory next to the target, which is renamed into place on
/// seal. Aborting or dropping an unsealed archive removes the staging directory.
#[derive(Debug)]
pub struct DirArchive {
    target: PathBuf,
    staging: Option<PathBuf>,
    index: EntryIndex,
}

impl DirArchive {
    /// Stage a new archive that will appear at `target` once sealed. `target` must not exist.
    pub fn create(target: impl Into<PathBuf>) -> MintResult<Self> {
        let target = target.into();
        if target.exists() {
            return Err(MintError::archive(format!(
                "archive target '{}' already exists",
                target.display()
            )));
        }
        let name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MintError::archive("archive target needs a file name"))?;
        let staging = target.with_file_name(format!(".{name}.partial-{}", std::process::id()));
        if staging.exists() {
            std::fs::remove_dir_all(&staging)
                .with_context(|| format!("clear stale staging dir '{}'", staging.display()))?;
        }
        std::fs::create_dir_all(&staging)
            .with_context(|| format!("create staging dir '{}'", staging.display()))?;
        Ok(Self {
            target,
            staging: Some(staging),
            index: EntryIndex::default(),
        })
    }

    /// Final location of the archive.
    pub fn target(&self) -> &Path {
        &self.target
    }

    fn staging(&self) -> MintResult<&Path> {
        self.staging
            .as_deref()
            .ok_or_else(|| MintError::archive("archive already finished"))
    }
}

impl ArchiveSink for DirArchive {
    type Sealed = PathBuf;

    fn create_folder(&mut self, folder: &str) -> MintResult<()> {
        if self.index.add_folder(folder)? {
            let dir = self.staging()?.join(folder);
            std::fs::create_dir_all(&dir)
                .map_err(|e| MintError::archive(format!("create '{}': {e}", dir.display())))?;
        }
        Ok(())
    }

    fn deposit(&mut self, folder: &str, name: &str, bytes: Vec<u8>) -> MintResult<()> {
        let path = self.index.add_file(folder, name)?;
        let file = self.staging()?.join(path);
        std::fs::write(&file, bytes)
            .map_err(|e| MintError::archive(format!("write '{}': {e}", file.display())))
    }

    fn seal(mut self) -> MintResult<PathBuf> {
        let staging = self
            .staging
            .take()
            .ok_or_else(|| MintError::archive("archive already finished"))?;
        if let Err(e) = std::fs::rename(&staging, &self.target) {
            std::fs::remove_dir_all(&staging).ok();
            return Err(MintError::archive(format!(
                "move '{}' into place: {e}",
                self.target.display()
            )));
        }
        Ok(self.target.clone())
    }

    fn abort(mut self) {
        if let Some(staging) = self.staging.take() {
            std::fs::remove_dir_all(staging).ok();
        }
    }
}

impl Drop for DirArchive {
    fn drop(&mut self) {
        if let Some(staging) = self.staging.take() {
            std::fs::remove_dir_all(staging).ok();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/package/archive.rs"]
mod tests;
