//! MCPortal CLI
//!
//! Runs the bridge server and inspects stored traces.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod logging;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::bail;
use mcportal_core::PortalConfig;
use mcportal_server::BridgeServer;
use mcportal_tool::{BuiltinTool, ToolRegistry};
use mcportal_trace::{TraceStore, Tracer};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mcportal")]
#[command(about = "MCPortal - tool bridge with request tracing", long_about = None)]
struct Cli {
    /// Debug logging when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bridge server
    Server {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(short, long)]
        port: Option<u16>,
        /// Comma-separated tools to enable
        #[arg(short, long, value_delimiter = ',')]
        tools: Option<Vec<String>>,
        /// Do not record requests
        #[arg(long)]
        no_tracing: bool,
        /// Trace storage directory
        #[arg(short, long)]
        storage: Option<PathBuf>,
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the built-in tools
    Tools,
    /// Inspect stored traces
    Traces {
        #[command(subcommand)]
        command: TraceCommands,
    },
    /// Print the version
    Version,
}

#[derive(Subcommand)]
enum TraceCommands {
    /// List stored traces, newest first
    List {
        /// Trace storage directory
        #[arg(short, long)]
        storage: Option<PathBuf>,
    },
    /// Show one stored trace
    Show {
        /// Trace id
        id: String,
        /// Trace storage directory
        #[arg(short, long)]
        storage: Option<PathBuf>,
    },
}

/// Server flags layered over the config file
struct ServerOverrides {
    host: Option<String>,
    port: Option<u16>,
    tools: Option<Vec<String>>,
    no_tracing: bool,
    storage: Option<PathBuf>,
}

impl ServerOverrides {
    fn apply(self, config: &mut PortalConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(tools) = self.tools {
            config.tools = tools;
        }
        if self.no_tracing {
            config.tracing.enabled = false;
        }
        if let Some(storage) = self.storage {
            config.tracing.storage_path = Some(storage);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Server {
            host,
            port,
            tools,
            no_tracing,
            storage,
            config,
        } => {
            let mut portal = PortalConfig::load_or_default(config.as_deref())?;
            ServerOverrides {
                host,
                port,
                tools,
                no_tracing,
                storage,
            }
            .apply(&mut portal);
            run_server(portal).await
        }
        Commands::Tools => {
            print_tools();
            Ok(())
        }
        Commands::Traces { command } => match command {
            TraceCommands::List { storage } => {
                let traces = open_store(storage)?.list_traces()?;
                println!("{}", serde_json::to_string_pretty(&traces)?);
                Ok(())
            }
            TraceCommands::Show { id, storage } => {
                let lookup = open_store(storage)?.trace_details(&id);
                if let Some(error) = lookup.error() {
                    bail!("{}", error);
                }
                println!("{}", serde_json::to_string_pretty(&lookup)?);
                Ok(())
            }
        },
        Commands::Version => {
            println!("mcportal {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Registry with the named catalog tools; unknown names are skipped
fn build_registry(names: &[String]) -> (ToolRegistry, Vec<String>) {
    let mut registry = ToolRegistry::new();
    let mut skipped = Vec::new();
    for name in names {
        match BuiltinTool::from_name(name) {
            Some(tool) => {
                if let Err(err) = registry.register(tool.definition()) {
                    warn!(tool = %name, error = %err, "Failed to register tool");
                }
            }
            None => skipped.push(name.clone()),
        }
    }
    (registry, skipped)
}

async fn run_server(config: PortalConfig) -> Result<()> {
    let (registry, skipped) = build_registry(&config.tools);
    for name in &skipped {
        warn!(tool = %name, "Unknown tool, skipping");
    }
    info!(tools = ?registry.identities(), "Registered tools");

    let storage = config.tracing.resolved_storage_path();
    let tracer = if config.tracing.enabled {
        let path = storage.clone()?;
        Some(Tracer::with_storage(path)?)
    } else {
        info!("Tracing disabled");
        None
    };

    let mut bridge = BridgeServer::new(registry, tracer);
    if let Ok(path) = storage {
        bridge = bridge.with_trace_store(TraceStore::new(path));
    }

    bridge.start(&config.server.host, config.server.port).await?;
    Ok(())
}

fn open_store(storage: Option<PathBuf>) -> Result<TraceStore> {
    Ok(match storage {
        Some(path) => TraceStore::new(path),
        None => TraceStore::open_default()?,
    })
}

fn print_tools() {
    for tool in BuiltinTool::ALL {
        println!("{}  {}", tool.identity(), tool.description());
        for (name, spec) in tool.parameters().iter() {
            match &spec.allowed {
                Some(allowed) => println!(
                    "    {}: {} [{}]  {}",
                    name,
                    spec.param_type.as_str(),
                    allowed.join(", "),
                    spec.description
                ),
                None => println!(
                    "    {}: {}  {}",
                    name,
                    spec.param_type.as_str(),
                    spec.description
                ),
            }
        }
    }
}
