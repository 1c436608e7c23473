// Infrastructure adapters for CallScope: Graphviz, diagnostic files, node data, settings.

pub mod artifacts;
pub mod config;
pub mod graphviz;
pub mod node_loader;

pub use artifacts::{sink_from_settings, FileArtifactSink, NullArtifactSink};
pub use config::Settings;
pub use graphviz::GraphvizEngine;
pub use node_loader::NodeLoader;
