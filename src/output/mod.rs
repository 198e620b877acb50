//! Persisting extraction results.
//!
//! An [`OutputSink`] receives image files and JSON documents. The
//! [`DirectorySink`] lays them out on disk as
//!
//! ```text
//! <root>/images/page{N}_image{M}.png
//! <root>/images/page{N}_question{Q}.png
//! <root>/images/page{N}_option{K}.png
//! <root>/structured_questions.json
//! <root>/complete_extraction.json
//! ```

mod json;

pub use json::{questions_to_json, report_to_json, to_json, JsonFormat};

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{Notice, NoticeKind};
use crate::structure::Extraction;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_content";

/// File name of the structured question list.
pub const QUESTIONS_FILE: &str = "structured_questions.json";

/// File name of the complete extraction report.
pub const REPORT_FILE: &str = "complete_extraction.json";

/// Destination for extracted files.
pub trait OutputSink {
    /// Store one image under `filename`.
    fn write_image(&mut self, filename: &str, bytes: &[u8]) -> Result<()>;

    /// Store a JSON document under `filename`.
    fn write_json(&mut self, filename: &str, contents: &str) -> Result<()>;
}

/// Options for writing results.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub format: JsonFormat,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Write compact JSON.
    pub fn compact(mut self) -> Self {
        self.format = JsonFormat::Compact;
        self
    }
}

/// Writes files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    images: PathBuf,
}

impl DirectorySink {
    /// Create the root and `images/` directories if missing.
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let images = root.join("images");
        fs::create_dir_all(&images)?;
        Ok(Self { root, images })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> &Path {
        &self.images
    }
}

impl OutputSink for DirectorySink {
    fn write_image(&mut self, filename: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.images.join(filename), bytes)?;
        Ok(())
    }

    fn write_json(&mut self, filename: &str, contents: &str) -> Result<()> {
        fs::write(self.root.join(filename), contents)?;
        Ok(())
    }
}

/// Keeps files in memory. Can be told to fail specific image writes.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub images: BTreeMap<String, Vec<u8>>,
    pub json: BTreeMap<String, String>,
    failing: BTreeSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes of `filename` fail.
    pub fn fail_on(mut self, filename: impl Into<String>) -> Self {
        self.failing.insert(filename.into());
        self
    }
}

impl OutputSink for MemorySink {
    fn write_image(&mut self, filename: &str, bytes: &[u8]) -> Result<()> {
        if self.failing.contains(filename) {
            return Err(Error::Other(format!("refusing to write {}", filename)));
        }
        self.images.insert(filename.to_string(), bytes.to_vec());
        Ok(())
    }

    fn write_json(&mut self, filename: &str, contents: &str) -> Result<()> {
        self.json.insert(filename.to_string(), contents.to_string());
        Ok(())
    }
}

impl Extraction {
    /// Write images, then both JSON documents, to `sink`.
    ///
    /// An image that fails to write is logged and reported as a notice, and
    /// every reference to it is removed before the JSON is rendered. JSON
    /// failures are fatal.
    pub fn write_to(&mut self, sink: &mut dyn OutputSink, options: &OutputOptions) -> Result<()> {
        let mut failed = Vec::new();
        for image in &self.images {
            if let Err(e) = sink.write_image(&image.filename, &image.bytes) {
                log::warn!("Failed to write image {}: {}", image.filename, e);
                failed.push((image.filename.clone(), e.to_string()));
            }
        }

        for (filename, reason) in failed {
            self.forget_image(&filename);
            self.images.retain(|image| image.filename != filename);
            self.notices.push(Notice::new(NoticeKind::ImageWriteFailed {
                filename,
                reason,
            }));
        }

        sink.write_json(QUESTIONS_FILE, &questions_to_json(&self.questions, options.format)?)?;
        sink.write_json(REPORT_FILE, &report_to_json(&self.report, options.format)?)?;
        Ok(())
    }

    /// Write everything under `dir` with default options.
    pub fn save<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let mut sink = DirectorySink::create(dir)?;
        self.write_to(&mut sink, &OutputOptions::default())
    }
}
