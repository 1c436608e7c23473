//! Graphviz layout engine adapter.
//!
//! Pipes the graph description into the `dot` executable and returns what it
//! prints. Any failure (missing binary, syntax error, crash) comes back as an
//! error carrying Graphviz's stderr.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;
use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use crate::infrastructure::config::EngineSettings;
use crate::ports::LayoutEngine;

pub struct GraphvizEngine {
    spec: EngineCommandSpec,
}

impl GraphvizEngine {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            spec: build_command_spec(settings),
        }
    }

    /// Check that the configured executable runs.
    pub fn check_available(&self) -> Result<String> {
        let output = Command::new(&self.spec.program)
            .arg("-V")
            .output()
            .with_context(|| format!("{} not found in PATH. Install Graphviz: https://graphviz.org/download/", self.spec.program))?;
        if !output.status.success() {
            bail!("{} found but returned error: {:?}", self.spec.program, output.status.code());
        }
        // Graphviz prints its version banner on stderr.
        Ok(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

impl LayoutEngine for GraphvizEngine {
    fn layout(&self, description: &str) -> Result<String> {
        let start = Instant::now();
        let mut child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to execute {}", self.spec.program))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow::anyhow!("{} stdin unavailable", self.spec.program))?;
            stdin
                .write_all(description.as_bytes())
                .context("Failed to pipe description into layout engine")?;
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for layout engine")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} failed with exit code {:?}: {}",
                self.spec.program,
                output.status.code(),
                stderr.trim()
            );
        }

        let markup = String::from_utf8(output.stdout)
            .context("Layout engine output was not valid UTF-8")?;

        info!(elapsed_ms = start.elapsed().as_millis() as u64, "layout calculated");
        debug!(description_bytes = description.len(), markup_bytes = markup.len(), "layout sizes");
        Ok(markup)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Testable Command Builder
// ═══════════════════════════════════════════════════════════════════════════

/// The command line the engine runs, without executing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

pub fn build_command_spec(settings: &EngineSettings) -> EngineCommandSpec {
    EngineCommandSpec {
        program: settings.program.clone(),
        args: vec![format!("-K{}", settings.layout), format!("-T{}", settings.format)],
    }
}
