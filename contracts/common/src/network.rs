//! Network Configuration
//!
//! Which price feed a deployment wires into the ledger, per network.
//! Development networks get a freshly deployed mock aggregator; live
//! networks use a published feed address.

use crate::constants::network::{
    DEVELOPMENT_CHAINS, DEV_BLOCK_CONFIRMATIONS, GOERLI_CHAIN_ID, HARDHAT_CHAIN_ID,
    LIVE_BLOCK_CONFIRMATIONS, LOCALHOST_CHAIN_ID,
};
use crate::types::Address;

/// Goerli ETH/USD aggregator (0xD4a33860578De61DBAbDc8BFdb98FD742fA7028e),
/// left-padded to 32 bytes
pub const GOERLI_ETH_USD_FEED: Address = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0xd4, 0xa3, 0x38, 0x60, 0x57, 0x8d, 0xe6, 0x1d, 0xba, 0xbd,
    0xc8, 0xbf, 0xdb, 0x98, 0xfd, 0x74, 0x2f, 0xa7, 0x02, 0x8e,
];

/// Deployment parameters for one network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name
    pub name: &'static str,
    /// Chain identifier
    pub chain_id: u64,
    /// Published ETH/USD feed; `None` means deploy a mock
    pub eth_usd_price_feed: Option<Address>,
    /// Confirmations to wait for after deployment
    pub block_confirmations: u64,
}

/// Every network the ledger knows how to deploy to
pub const NETWORKS: [NetworkConfig; 3] = [
    NetworkConfig {
        name: "hardhat",
        chain_id: HARDHAT_CHAIN_ID,
        eth_usd_price_feed: None,
        block_confirmations: DEV_BLOCK_CONFIRMATIONS,
    },
    NetworkConfig {
        name: "localhost",
        chain_id: LOCALHOST_CHAIN_ID,
        eth_usd_price_feed: None,
        block_confirmations: DEV_BLOCK_CONFIRMATIONS,
    },
    NetworkConfig {
        name: "goerli",
        chain_id: GOERLI_CHAIN_ID,
        eth_usd_price_feed: Some(GOERLI_ETH_USD_FEED),
        block_confirmations: LIVE_BLOCK_CONFIRMATIONS,
    },
];

impl NetworkConfig {
    /// Look up a network by name
    pub fn by_name(name: &str) -> Option<Self> {
        NETWORKS.iter().find(|n| n.name == name).copied()
    }

    /// Look up a network by chain id
    pub fn by_chain_id(chain_id: u64) -> Option<Self> {
        NETWORKS.iter().find(|n| n.chain_id == chain_id).copied()
    }

    /// Returns true if deployments here use a mock price feed
    pub fn is_development(&self) -> bool {
        is_development_network(self.name)
    }
}

/// Returns true if `name` is a development network
pub fn is_development_network(name: &str) -> bool {
    DEVELOPMENT_CHAINS.iter().any(|chain| *chain == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_chain_id() {
        let goerli = NetworkConfig::by_name("goerli").unwrap();
        assert_eq!(goerli.chain_id, 5);
        assert_eq!(NetworkConfig::by_chain_id(5), Some(goerli));
        assert_eq!(goerli.block_confirmations, 6);
        assert!(NetworkConfig::by_name("mainnet").is_none());
    }

    #[test]
    fn test_development_networks_use_mocks() {
        for network in NETWORKS.iter() {
            assert_eq!(network.is_development(), network.eth_usd_price_feed.is_none());
        }
        assert!(is_development_network("hardhat"));
        assert!(!is_development_network("goerli"));
    }
}
