//! # modlogs-rpc
//!
//! Network adapters for the ModLogs pipeline. Each one implements a
//! collaborator trait from `modlogs-core::source` on top of a shared
//! `reqwest::Client`:
//!
//! - [`RpcTransactionFetcher`]: `TransactionFetcher` via `eth_getTransactionByHash`
//! - [`EtherscanLogSource`]: `LogSource` via Etherscan `getLogs`
//! - [`HttpModuleDirectory`]: `ModuleDirectory` via a JSON release listing

pub mod directory;
pub mod error;
pub mod etherscan;
pub mod fetcher;
pub mod http;
pub mod providers;
pub mod request;
pub mod retry;
pub mod transport;

pub use directory::{find_module_address, HttpModuleDirectory, ModuleListing};
pub use error::TransportError;
pub use etherscan::{EtherscanLogSource, ETHERSCAN_MAINNET};
pub use fetcher::RpcTransactionFetcher;
pub use http::{build_http_client, parse_endpoint, HttpClientConfig, HttpRpcClient};
pub use retry::{RetryConfig, RetryPolicy};
pub use transport::RpcTransport;
