//! Hosted RPC provider URLs.

pub fn infura_url(project_id: &str, chain_id: u64) -> String {
    let network = chain_id_to_network(chain_id);
    format!("https://{network}.infura.io/v3/{project_id}")
}

fn chain_id_to_network(chain_id: u64) -> &'static str {
    match chain_id {
        11155111 => "sepolia",
        137 => "polygon-mainnet",
        42161 => "arbitrum-mainnet",
        10 => "optimism-mainnet",
        _ => "mainnet",
    }
}
