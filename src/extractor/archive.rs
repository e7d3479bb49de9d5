//! Tar layer extraction (plain or gzip-compressed)

use super::{normalize_path, Extractor, FileMap};
use crate::error::ExtractionError;
use crate::selector::FileSelection;
use std::io::{BufRead, BufReader, Read};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Streams a tar archive and keeps selected regular files
#[derive(Debug, Clone)]
pub struct TarExtractor {
    max_file_size: u64,
    timeout: Option<Duration>,
}

impl Default for TarExtractor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            timeout: None,
        }
    }
}

impl TarExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected entries larger than this fail extraction instead of being truncated
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Deadline checked between entries; a read stuck inside one entry is not interrupted
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn extract_entries<R: Read>(
        &self,
        mut archive: tar::Archive<R>,
        selection: &FileSelection,
    ) -> Result<FileMap, ExtractionError> {
        let started = Instant::now();
        let mut files = FileMap::new();
        let mut scanned = 0usize;

        let entries = archive
            .entries()
            .map_err(|e| ExtractionError::corrupt(None, e))?;

        for entry in entries {
            if let Some(timeout) = self.timeout {
                if started.elapsed() > timeout {
                    return Err(ExtractionError::Timeout(timeout));
                }
            }

            let mut entry = entry.map_err(|e| ExtractionError::corrupt(None, e))?;
            scanned += 1;

            let raw_path = entry
                .path()
                .map_err(|e| ExtractionError::corrupt(None, e))?
                .to_string_lossy()
                .into_owned();
            let path = normalize_path(&raw_path);

            if !selection.matches(path) {
                continue;
            }

            let entry_type = entry.header().entry_type();
            if !entry_type.is_file() {
                debug!(path, ?entry_type, "Skipping selected non-regular entry");
                continue;
            }

            let size = entry.size();
            if size > self.max_file_size {
                return Err(ExtractionError::EntryTooLarge {
                    path: path.to_string(),
                    size,
                    limit: self.max_file_size,
                });
            }

            let mut content = Vec::with_capacity(size as usize);
            entry
                .read_to_end(&mut content)
                .map_err(|e| ExtractionError::corrupt(Some(path), e))?;
            if (content.len() as u64) < size {
                return Err(ExtractionError::corrupt(
                    Some(path),
                    std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "entry data truncated"),
                ));
            }

            trace!(path, bytes = content.len(), "Retained entry");
            files.insert(path, content);
        }

        debug!(
            scanned,
            retained = files.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Layer extraction complete"
        );

        Ok(files)
    }
}

impl Extractor for TarExtractor {
    fn extract_files(
        &self,
        reader: &mut dyn Read,
        selection: &FileSelection,
    ) -> Result<FileMap, ExtractionError> {
        let mut reader = BufReader::new(reader);
        let is_gzip = reader
            .fill_buf()
            .map_err(|e| ExtractionError::corrupt(None, e))?
            .starts_with(&GZIP_MAGIC);

        if is_gzip {
            debug!("Detected gzip-compressed layer");
            // pigz and concatenated streams produce several members
            let decoder = flate2::read::MultiGzDecoder::new(reader);
            self.extract_entries(tar::Archive::new(decoder), selection)
        } else {
            self.extract_entries(tar::Archive::new(reader), selection)
        }
    }
}
