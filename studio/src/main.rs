/// seiatlas: contract studio backend and command line
///
/// - `serve` runs the compile / ABI HTTP API
/// - `compile`, `functions` inspect Solidity sources and ABIs
/// - `call`, `send`, `deploy` interact with contracts through the JSON-RPC endpoint
/// - `assist`, `files` apply assistant replies to the persisted project files

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use studio::config::StudioConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "seiatlas", version, about = "Solidity contract studio for Sei EVM")]
struct Cli {
    /// Network: mainnet, testnet, devnet or local
    #[arg(long, global = true, env = "SEIATLAS_NETWORK")]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Compile a Solidity file
    Compile {
        /// Path to the .sol source
        source: String,

        /// Write `{abi, bytecode}` to this file
        #[arg(long)]
        out: Option<String>,
    },

    /// List the read, write and constructor inputs of an ABI
    Functions {
        /// ABI JSON file (array or artifact with an `abi` field)
        abi: String,
    },

    /// Call a view function
    Call {
        /// ABI JSON file
        abi: String,

        /// Function signature, e.g. `balanceOf(address)`
        signature: String,

        /// Arguments in parameter order
        args: Vec<String>,

        /// Contract address; defaults to the last one used
        #[arg(long)]
        address: Option<String>,
    },

    /// Send a transaction to a state-changing function
    Send {
        abi: String,
        signature: String,
        args: Vec<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Deploy a contract from a .sol source or a `{abi, bytecode}` artifact
    Deploy {
        source: String,

        /// Constructor arguments in parameter order
        args: Vec<String>,
    },

    /// Apply an assistant reply (markdown) to the project files
    Assist {
        /// File holding the reply
        reply: String,
    },

    /// Show the project files
    Files,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seiatlas=info,studio=info,shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = StudioConfig::from_env(cli.network.as_deref())?;

    match cli.command {
        Commands::Serve => {
            commands::serve(&config).await?;
        }
        Commands::Compile { source, out } => {
            commands::compile(&config, &source, out.as_deref()).await?;
        }
        Commands::Functions { abi } => {
            commands::functions(&abi)?;
        }
        Commands::Call {
            abi,
            signature,
            args,
            address,
        } => {
            commands::call(&config, &abi, &signature, &args, address.as_deref()).await?;
        }
        Commands::Send {
            abi,
            signature,
            args,
            address,
        } => {
            commands::send(&config, &abi, &signature, &args, address.as_deref()).await?;
        }
        Commands::Deploy { source, args } => {
            commands::deploy(&config, &source, &args).await?;
        }
        Commands::Assist { reply } => {
            commands::assist(&config, &reply)?;
        }
        Commands::Files => {
            commands::files(&config)?;
        }
    }

    Ok(())
}
