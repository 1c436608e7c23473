// Command-line entry point for CallScope.

use anyhow::{Context, Result};
use callscope::api::server::start_server;
use callscope::application::{GraphController, Request, LAYOUT_FAILED};
use callscope::domain::node::NodeId;
use callscope::infrastructure::{sink_from_settings, GraphvizEngine, NodeLoader, Settings};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of visible expansion levels
    #[arg(long, global = true)]
    visible_parents: Option<usize>,

    /// Override the Graphviz executable
    #[arg(long, global = true)]
    engine: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out the graph and write annotated SVG
    Render {
        #[command(flatten)]
        view: ViewArgs,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the Graphviz description without running the layout engine
    Describe {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Serve expand/collapse requests as line-delimited JSON over TCP
    Serve {
        /// Node data file (JSON)
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long, default_value_t = 4600)]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Node data file (JSON)
    #[arg(short, long)]
    data: PathBuf,

    /// Expand a node before rendering (can specify multiple)
    #[arg(short, long)]
    expand: Vec<u64>,

    /// Expand every node reachable from the roots
    #[arg(long)]
    expand_all: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(visible_parents) = cli.visible_parents {
        settings.visible_parents = visible_parents.max(1);
    }
    if let Some(program) = cli.engine {
        settings.engine.program = program;
    }

    match cli.command {
        Command::Render { view, output } => {
            let mut controller = build_controller(&settings, &view.data)?;
            let start = prepare_view(&mut controller, &view)?;
            let markup = controller.render(&start).context(LAYOUT_FAILED)?;
            write_output(output, &markup)?;
        }
        Command::Describe { view } => {
            let mut controller = build_controller(&settings, &view.data)?;
            let start = prepare_view(&mut controller, &view)?;
            let description = controller.describe(&start)?;
            println!("{}", description.dot);
        }
        Command::Serve { data, port } => {
            let engine = GraphvizEngine::new(&settings.engine);
            match engine.check_available() {
                Ok(version) => info!(version = %version, "layout engine available"),
                Err(e) => warn!(error = %e, "layout engine unavailable, renders will fail"),
            }
            let controller = build_controller(&settings, &data)?;
            start_server(port, Arc::new(Mutex::new(controller)))?;
        }
    }

    Ok(())
}

fn build_controller(settings: &Settings, data: &std::path::Path) -> Result<GraphController> {
    let graph = NodeLoader::load_file(data)?;
    info!(nodes = graph.len(), roots = graph.roots().len(), "node data loaded");
    Ok(GraphController::new(
        graph,
        settings.visible_parents,
        Box::new(GraphvizEngine::new(&settings.engine)),
        sink_from_settings(&settings.artifacts),
    ))
}

/// Apply the requested expansions and return the start nodes of the view.
fn prepare_view(controller: &mut GraphController, view: &ViewArgs) -> Result<Vec<NodeId>> {
    let mut start = if view.expand_all {
        controller.apply(Request::ExpandFullGraph)?
    } else {
        controller.expansion().visible_root_nodes().to_vec()
    };
    for id in &view.expand {
        start = controller.apply(Request::ExpandNode(NodeId(*id)))?;
    }
    Ok(start)
}

fn write_output(output: Option<PathBuf>, markup: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(&path, markup)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{}", markup),
    }
    Ok(())
}
