//! Content source abstraction for reading parts from the filesystem or from
//! an AASX (ZIP) package.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::io::{Read, Seek};

/// Trait for abstracting part I/O (filesystem vs. ZIP package).
pub trait ContentSource {
    /// Read the part at the given logical path as UTF-8 text.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
    /// Whether a part exists at the given logical path.
    fn contains(&mut self, path: &Utf8Path) -> bool;
}

/// Reads parts directly from the local filesystem.
pub struct FsSource;

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path.as_std_path()).with_context(|| format!("Failed to read {}", path))
    }

    fn contains(&mut self, path: &Utf8Path) -> bool {
        path.is_file()
    }
}

/// Reads parts from a ZIP archive (used for `.aasx` packages).
pub struct ZipSource<R: Read + Seek> {
    zip: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader).context("Failed to open zip archive")?;
        Ok(Self { zip })
    }

    /// Names of all entries, in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(|n| n.to_string()).collect()
    }
}

/// Package part names are stored without a leading slash.
fn entry_name(path: &Utf8Path) -> String {
    path.as_str()
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}

impl<R: Read + Seek> ContentSource for ZipSource<R> {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        let p = entry_name(path);
        let mut f = self
            .zip
            .by_name(&p)
            .with_context(|| format!("File {} not found in zip", p))?;
        let mut s = String::new();
        f.read_to_string(&mut s)
            .with_context(|| format!("Failed to read {} from zip", p))?;
        Ok(s)
    }

    fn contains(&mut self, path: &Utf8Path) -> bool {
        let p = entry_name(path);
        self.zip.by_name(&p).is_ok()
    }
}
