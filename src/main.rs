use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tfflow::provider::security_group_attachment::TYPE_NAME;
use tfflow::provider::Diagnostics;
use tfflow::shared::logging;
use tfflow::{TfFlow, TfFlowServer};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(
    name = "tfflow",
    about = "Manage the security groups attached to Flow compute network interfaces.",
    version = APP_VERSION,
    disable_version_flag(true)
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(
        long,
        short = 'c',
        value_name = "PATH",
        help = "Path to the configuration file"
    )]
    pub config: Option<String>,

    #[arg(
        long = "type",
        short = 't',
        value_name = "TYPE",
        default_value = TYPE_NAME,
        help = "Resource type to operate on"
    )]
    pub resource_type: String,

    #[arg(long, short = 'V', help = "Print version")]
    pub version: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "mcp", about = "Launch tfflow as an MCP server")]
    Mcp,

    #[command(name = "schema", about = "Print the resource schema")]
    Schema {
        #[arg(value_name = "TYPE", help = "Resource type (defaults to --type)")]
        resource_type: Option<String>,
    },

    #[command(name = "create", about = "Create the resource from a configuration file")]
    Create {
        #[arg(long, short = 'i', value_name = "FILE", help = "Configuration JSON")]
        input: PathBuf,
    },

    #[command(name = "read", about = "Refresh a state file from the compute API")]
    Read {
        #[arg(long, short = 's', value_name = "FILE", help = "State JSON")]
        state: PathBuf,
    },

    #[command(name = "update", about = "Apply a new configuration to existing state")]
    Update {
        #[arg(long, short = 's', value_name = "FILE", help = "Prior state JSON")]
        state: PathBuf,
        #[arg(long, short = 'i', value_name = "FILE", help = "Configuration JSON")]
        input: PathBuf,
    },

    #[command(name = "delete", about = "Reset the interface to its default security group")]
    Delete {
        #[arg(long, short = 's', value_name = "FILE", help = "State JSON")]
        state: PathBuf,
    },

    #[command(name = "import", about = "Import an attachment by <server_id>/<network_interface_id>")]
    Import { id: String },
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let cli = Cli::parse();

    if cli.version {
        println!("{}", APP_VERSION);
        std::process::exit(0);
    }

    let Some(command) = &cli.command else {
        println!("No command specified. Use --help for usage information.");
        return;
    };

    let tfflow = match TfFlow::new(cli.config.clone()) {
        Ok(tfflow) => tfflow,
        Err(e) => {
            logging::error(&format!("Failed to initialize tfflow: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(command, &cli.resource_type, tfflow).await {
        logging::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run(command: &Commands, resource_type: &str, tfflow: TfFlow) -> anyhow::Result<()> {
    let provider = tfflow.provider();

    match command {
        Commands::Mcp => {
            logging::info("Starting tfflow in MCP server mode");
            TfFlowServer::serve_stdio(tfflow).await
        }
        Commands::Schema {
            resource_type: schema_type,
        } => {
            let resource_type = schema_type.as_deref().unwrap_or(resource_type);
            let schema = provider.schema(resource_type).map_err(failed)?;
            print_json(&serde_json::to_value(schema)?)
        }
        Commands::Create { input } => {
            let config = read_json(input)?;
            let state = provider.create(resource_type, config).await.map_err(failed)?;
            print_json(&state)
        }
        Commands::Read { state } => {
            let state = read_json(state)?;
            let state = provider.read(resource_type, state).await.map_err(failed)?;
            print_json(&state)
        }
        Commands::Update { state, input } => {
            let prior_state = read_json(state)?;
            let config = read_json(input)?;
            let state = provider
                .update(resource_type, prior_state, config)
                .await
                .map_err(failed)?;
            print_json(&state)
        }
        Commands::Delete { state } => {
            let state = read_json(state)?;
            provider.delete(resource_type, state).await.map_err(failed)?;
            logging::info("Security group attachment removed");
            Ok(())
        }
        Commands::Import { id } => {
            let state = provider.import(resource_type, id).await.map_err(failed)?;
            print_json(&state)
        }
    }
}

fn failed(diags: Diagnostics) -> anyhow::Error {
    for diag in diags.iter() {
        eprintln!("{}", diag);
    }
    anyhow::anyhow!("operation failed with {} diagnostic(s)", diags.len())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
