//! Diagnostic artifacts.
//!
//! Every render leaves its description in a fixed-name debug file; a failed
//! layout additionally leaves it in a fixed-name error file. Nothing reads
//! these back.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use crate::infrastructure::config::ArtifactSettings;
use crate::ports::ArtifactSink;

pub struct FileArtifactSink {
    debug_path: PathBuf,
    error_path: PathBuf,
}

impl FileArtifactSink {
    pub fn new(settings: &ArtifactSettings) -> Self {
        Self {
            debug_path: settings.dir.join(&settings.debug_file),
            error_path: settings.dir.join(&settings.error_file),
        }
    }

    pub fn debug_path(&self) -> &Path {
        &self.debug_path
    }

    pub fn error_path(&self) -> &Path {
        &self.error_path
    }

    fn write(path: &Path, description: &str) {
        match fs::write(path, description) {
            Ok(()) => debug!(path = %path.display(), "description saved"),
            Err(e) => warn!(path = %path.display(), error = %e, "unable to write description"),
        }
    }
}

impl ArtifactSink for FileArtifactSink {
    fn write_debug(&self, description: &str) {
        Self::write(&self.debug_path, description);
    }

    fn write_error(&self, description: &str) {
        Self::write(&self.error_path, description);
    }
}

/// Discards everything; used when artifacts are disabled.
pub struct NullArtifactSink;

impl ArtifactSink for NullArtifactSink {
    fn write_debug(&self, _description: &str) {}
    fn write_error(&self, _description: &str) {}
}

/// Sink matching the settings: files when enabled, nothing otherwise.
pub fn sink_from_settings(settings: &ArtifactSettings) -> Box<dyn ArtifactSink> {
    if settings.enabled {
        Box::new(FileArtifactSink::new(settings))
    } else {
        Box::new(NullArtifactSink)
    }
}
