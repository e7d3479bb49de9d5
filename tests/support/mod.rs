#![allow(dead_code)]

pub mod analyzers;

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub use analyzers::{ApkAnalyzer, DpkgAnalyzer, SpyOsAnalyzer, UbuntuAnalyzer};

/// Install the crate's subscriber once; `LAYERSCAN_LOG_LEVEL=debug` shows
/// every analyzer attempt while debugging a failing test
pub fn init_logging() {
    layerscan::init_from_env();
}

/// Serialize `files` into an uncompressed tar.
///
/// Names are written into the header verbatim so fixtures can carry the
/// `/` and `./` prefixes real layer tools emit.
pub fn build_tar(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        let name = path.as_bytes();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, content.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap()
}

/// Create a layer directory containing `layer.tar` with `files`
pub fn layer_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_layer(dir.path(), "layer.tar", &build_tar(files));
    dir
}

pub fn write_layer(dir: &Path, name: &str, data: &[u8]) {
    fs::write(dir.join(name), data).unwrap();
}
