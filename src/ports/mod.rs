use anyhow::Result;

pub mod graph_description;
pub mod label;
pub mod markup;

/// External layout engine: graph description in, rendered markup out.
pub trait LayoutEngine: Send {
    fn layout(&self, description: &str) -> Result<String>;
}

/// Destination for the diagnostic copies of each description.
/// Failures to write are the sink's business and never reach the caller.
pub trait ArtifactSink: Send {
    fn write_debug(&self, description: &str);
    fn write_error(&self, description: &str);
}
