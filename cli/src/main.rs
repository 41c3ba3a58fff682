//! ModLogs CLI: inspect what a wallet did through one of its modules.
//!
//! # Commands
//! ```text
//! modlogs scan        --module <Name> --version <x.y.z> --wallet <addr> [--method <fn>]
//! modlogs decode-call --calldata <hex> [--abi <path.json>]
//! modlogs decode-log  --topics <...> --data <hex> [--abi <path.json>]
//! modlogs selectors   --module <Name> --version <x.y.z>
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use modlogs_core::error::RegistryError;
use modlogs_observability::{init_tracing, LogConfig};
use modlogs_registry::{AbiRegistry, FileSchemaSource, SchemaSource};
use std::path::PathBuf;

mod cmd_decode;
mod cmd_scan;
mod render;

#[derive(Parser)]
#[command(
    name = "modlogs",
    about = "Decode a wallet's module activity from on-chain logs",
    long_about = "
ModLogs: pull the logs a wallet module emitted for one wallet, fetch the
transactions behind them and decode calls, relayed inner calls and events
against the module's versioned ABI.

ENVIRONMENT VARIABLES (also read from .env):
  MODLOGS_RPC_URL     Ethereum JSON-RPC endpoint
  INFURA_API_KEY      Infura project id, used when MODLOGS_RPC_URL is unset
  ETHERSCAN_API_KEY   Etherscan API key (log retrieval)
  MODULE_ENDPOINT     URL of the module release listing
  MODLOGS_ABI_DIR     Root of the versioned ABI tree (default: ./abi)
  RUST_LOG            Log filter, overrides --verbose
"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, decode and print the module logs of one wallet
    Scan(cmd_scan::ScanArgs),

    /// Decode transaction calldata, unwrapping relayed calls
    #[command(name = "decode-call")]
    DecodeCall {
        /// Raw calldata (0x-prefixed hex)
        #[arg(long)]
        calldata: String,
        #[command(flatten)]
        schema: SchemaArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// topics[0] = event signature hash, topics[1..] = indexed params
        #[arg(long, num_args = 1.., required = true)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        #[command(flatten)]
        schema: SchemaArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List function selectors and event signatures of a module
    Selectors {
        #[command(flatten)]
        schema: SchemaArgs,
    },
}

/// Which ABI to decode against.
#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Module name
    #[arg(long, default_value = "TransferManager")]
    pub module: String,
    /// Module release version
    #[arg(long = "version", value_name = "VERSION", default_value = "1.6.0")]
    pub release: String,
    /// Root of the versioned ABI tree
    #[arg(long, env = "MODLOGS_ABI_DIR", default_value = "./abi")]
    pub abi_dir: PathBuf,
    /// Load this ABI file instead of <abi-dir>/<version>/<module>.json
    #[arg(long)]
    pub abi: Option<PathBuf>,
}

impl SchemaArgs {
    pub fn load(&self) -> Result<AbiRegistry> {
        SchemaSource::load(self, &self.release, &self.module).with_context(|| match &self.abi {
            Some(path) => format!("load ABI file '{}'", path.display()),
            None => format!("load schema from '{}'", self.abi_dir.display()),
        })
    }
}

/// An explicit `--abi` file wins over the versioned tree.
impl SchemaSource for SchemaArgs {
    fn load(&self, version: &str, module: &str) -> Result<AbiRegistry, RegistryError> {
        match &self.abi {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                Ok(AbiRegistry::from_abi_json(&json)?.with_label(module, version))
            }
            None => FileSchemaSource::new(&self.abi_dir).load(version, module),
        }
    }
}

fn log_config(verbose: u8, json: bool) -> LogConfig {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    LogConfig::default().level(level).json(json)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&log_config(cli.verbose, cli.log_json));

    match cli.command {
        Commands::Scan(args) => cmd_scan::run(args).await,

        Commands::DecodeCall {
            calldata,
            schema,
            json,
        } => cmd_decode::decode_call(&calldata, &schema, json),

        Commands::DecodeLog {
            topics,
            data,
            schema,
            json,
        } => cmd_decode::decode_log(topics, data, &schema, json),

        Commands::Selectors { schema } => cmd_decode::selectors(&schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_defaults() {
        let cli = Cli::try_parse_from(["modlogs", "scan"]).unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.schema.module, "TransferManager");
        assert_eq!(args.schema.release, "1.6.0");
        assert_eq!(args.method, "addModule");
        assert_eq!((args.from_block, args.to_block), (10_000_000, 20_000_000));
        assert!(!args.json);
    }

    #[test]
    fn verbosity_maps_to_level() {
        assert_eq!(log_config(0, false).level, "warn");
        assert_eq!(log_config(2, true).level, "debug");
        assert!(log_config(2, true).json);
    }
}
