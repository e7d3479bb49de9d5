//! Selective extraction of layer archives
//!
//! The extractor streams an archive once and keeps only entries selected by a
//! [`FileSelection`](crate::selector::FileSelection). The result is a
//! [`FileMap`], which is immutable once built and shared by reference with
//! every analyzer run against the layer.

mod archive;

pub use archive::TarExtractor;

use crate::error::ExtractionError;
use crate::selector::FileSelection;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Strip the leading `./` and `/` components archive writers disagree on
pub fn normalize_path(path: &str) -> &str {
    let mut path = path;
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            return path;
        }
    }
}

/// Path to content mapping for the files retained from one layer
///
/// Keys are normalized paths relative to the layer root. Lookups normalize
/// their argument, so `/etc/os-release` and `etc/os-release` are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap {
    files: HashMap<String, Vec<u8>>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: &str, content: Vec<u8>) {
        self.files.insert(normalize_path(path).to_string(), content);
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(normalize_path(path)).map(Vec::as_slice)
    }

    /// Content as UTF-8, `None` if absent or not valid UTF-8
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(normalize_path(path))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<P: AsRef<str>, C: Into<Vec<u8>>> FromIterator<(P, C)> for FileMap {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, content) in iter {
            map.insert(path.as_ref(), content.into());
        }
        map
    }
}

/// Turns an archive stream into a [`FileMap`]
pub trait Extractor: Send + Sync {
    /// Read `reader` sequentially, retaining only entries matched by `selection`
    fn extract_files(
        &self,
        reader: &mut dyn Read,
        selection: &FileSelection,
    ) -> Result<FileMap, ExtractionError>;
}

/// Open a layer archive, reporting a missing file as [`ExtractionError::ArchiveNotFound`]
///
/// The first block is read eagerly so that a path which opens but cannot be
/// read (a directory, an I/O fault) surfaces as [`ExtractionError::Open`]
/// rather than as a corrupt archive.
pub fn open_archive(path: &Path) -> Result<BufReader<File>, ExtractionError> {
    let open_failed = |source| ExtractionError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ExtractionError::ArchiveNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(open_failed(e)),
    };

    let mut reader = BufReader::new(file);
    reader.fill_buf().map_err(open_failed)?;
    Ok(reader)
}
