//! `modlogs scan`: resolve the module, pull its logs for a wallet, decode them.

use anyhow::{bail, Context, Result};
use clap::Args;
use modlogs_pipeline::{FailurePolicy, ModuleScanner, PipelineConfig, ScanRequest};
use modlogs_rpc::{
    build_http_client, parse_endpoint, providers::infura_url, EtherscanLogSource,
    HttpClientConfig, HttpModuleDirectory, HttpRpcClient, RpcTransactionFetcher,
    ETHERSCAN_MAINNET,
};
use std::sync::Arc;

use crate::render;
use crate::SchemaArgs;

const DEFAULT_WALLET: &str = "0xc4d46ecbc83f41d0bf71a39868d3f830299068b8";

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Wallet whose module activity to scan
    #[arg(long, default_value = DEFAULT_WALLET)]
    pub wallet: String,

    /// Keep only calls (outer or relayed) to this function; "" keeps all
    #[arg(long, default_value = "addModule")]
    pub method: String,

    /// First block of the range
    #[arg(long = "from", default_value_t = 10_000_000)]
    pub from_block: u64,

    /// Last block of the range
    #[arg(long = "to", default_value_t = 20_000_000)]
    pub to_block: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep going when a log fails to fetch or decode
    #[arg(long)]
    pub graceful: bool,

    /// Maximum transaction fetches in flight
    #[arg(long, default_value_t = 16)]
    pub concurrency: usize,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "MODLOGS_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Infura project id, used when no RPC URL is given
    #[arg(long, env = "INFURA_API_KEY", hide_env_values = true)]
    pub infura_key: Option<String>,

    /// Etherscan API key
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_key: Option<String>,

    /// Etherscan API base URL
    #[arg(long, env = "ETHERSCAN_URL", default_value = ETHERSCAN_MAINNET)]
    pub etherscan_url: String,

    /// URL of the module release listing
    #[arg(long, env = "MODULE_ENDPOINT")]
    pub module_endpoint: Option<String>,
}

impl ScanArgs {
    fn rpc_endpoint(&self) -> Result<String> {
        match (&self.rpc_url, &self.infura_key) {
            (Some(url), _) => Ok(url.clone()),
            (None, Some(key)) => Ok(infura_url(key, 1)),
            (None, None) => bail!("set MODLOGS_RPC_URL or INFURA_API_KEY"),
        }
    }

    fn request(&self) -> ScanRequest {
        ScanRequest::new(&self.schema.module, &self.schema.release, &self.wallet)
            .blocks(self.from_block, self.to_block)
            .method(&self.method)
    }

    fn pipeline_config(&self) -> PipelineConfig {
        let policy = if self.graceful {
            FailurePolicy::Graceful
        } else {
            FailurePolicy::FailFast
        };
        PipelineConfig::default()
            .concurrency(self.concurrency)
            .failure_policy(policy)
    }
}

pub async fn run(args: ScanArgs) -> Result<()> {
    let Some(etherscan_key) = args.etherscan_key.clone() else {
        bail!("ETHERSCAN_API_KEY not set");
    };
    let Some(module_endpoint) = args.module_endpoint.as_deref() else {
        bail!("MODULE_ENDPOINT not set");
    };

    let http_config = HttpClientConfig {
        request_timeout_secs: args.timeout,
        ..Default::default()
    };
    let http = build_http_client(&http_config).context("build HTTP client")?;

    let rpc_url = parse_endpoint(&args.rpc_endpoint()?).context("RPC URL")?;
    let transport = Arc::new(HttpRpcClient::new(
        rpc_url.as_str(),
        http.clone(),
        http_config.retry.clone(),
    ));
    let etherscan = EtherscanLogSource::new(
        http.clone(),
        parse_endpoint(&args.etherscan_url).context("Etherscan URL")?,
        etherscan_key,
    )
    .with_retry(http_config.retry.clone());
    let directory = HttpModuleDirectory::new(
        http,
        parse_endpoint(module_endpoint).context("MODULE_ENDPOINT")?,
    )
    .with_retry(http_config.retry);

    let scanner = ModuleScanner::new(
        Arc::new(args.schema.clone()),
        Arc::new(directory),
        Arc::new(etherscan),
        Arc::new(RpcTransactionFetcher::new(transport)),
    )
    .with_config(args.pipeline_config());

    let request = args.request();
    let report = scanner.scan(&request).await.with_context(|| {
        format!(
            "scan {} v{} for wallet {}",
            request.module, request.version, request.wallet
        )
    })?;

    if args.json {
        let records: Vec<_> = report.records.iter().map(|r| r.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        render::print_report(&request, &report);
    }
    Ok(())
}
