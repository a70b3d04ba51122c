//! Local Deployment
//!
//! Development networks have no published price feed, so a deployment there
//! first puts a mock aggregator on chain and wires the ledger to it.
//!
//! ```text
//! deployer nonce 0 -> MockV3Aggregator (8 decimals, 200 USD)
//! deployer nonce 1 -> FundMe(price_feed = aggregator)
//! ```

use fundme_common::{
    access_control::require_nonzero,
    errors::{FundMeError, FundMeResult},
    network::NetworkConfig,
    types::{derive_contract_address, Address},
};
use fundme_price_feed::MockV3Aggregator;

use crate::FundMe;

/// Deployer nonce used for the mock aggregator
pub const MOCK_FEED_NONCE: u64 = 0;
/// Deployer nonce used for the ledger
pub const LEDGER_NONCE: u64 = 1;

/// Ledger deployed alongside its mock feed
#[derive(Debug)]
pub struct LocalDeployment {
    /// Network the deployment targets
    pub network: NetworkConfig,
    /// Address of the deployed ledger
    pub ledger_address: Address,
    /// The ledger, owning the mock feed it reads
    pub fund_me: FundMe<MockV3Aggregator>,
}

/// Deploy a mock feed and a ledger on a development network
///
/// # Errors
/// - `InvalidInput` if `network` has a live feed or `deployer` is zero
pub fn deploy_local(network: &NetworkConfig, deployer: Address) -> FundMeResult<LocalDeployment> {
    if !network.is_development() {
        return Err(FundMeError::InvalidInput {
            param: "network",
            reason: "live network uses a published price feed",
        });
    }
    require_nonzero(&deployer, "deployer")?;

    let feed_address = derive_contract_address(&deployer, MOCK_FEED_NONCE);
    let feed = MockV3Aggregator::with_defaults(feed_address, deployer);

    Ok(LocalDeployment {
        network: *network,
        ledger_address: derive_contract_address(&deployer, LEDGER_NONCE),
        fund_me: FundMe::new(deployer, feed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundme_common::constants::price_feed::{DECIMALS, INITIAL_ANSWER};
    use fundme_common::types::derive_address;

    #[test]
    fn test_deploy_on_hardhat() {
        let deployer = derive_address("deployer");
        let network = NetworkConfig::by_name("hardhat").unwrap();

        let deployment = deploy_local(&network, deployer).unwrap();
        let fund_me = &deployment.fund_me;

        assert_eq!(fund_me.get_owner(), deployer);
        assert_eq!(fund_me.get_price_feed(), derive_contract_address(&deployer, 0));
        assert_eq!(fund_me.oracle().decimals(), DECIMALS);
        assert_eq!(fund_me.oracle().latest_answer(), INITIAL_ANSWER);
        assert_ne!(deployment.ledger_address, fund_me.get_price_feed());
    }

    #[test]
    fn test_deploy_on_live_network_rejected() {
        let network = NetworkConfig::by_name("goerli").unwrap();
        let result = deploy_local(&network, derive_address("deployer"));

        assert!(matches!(result, Err(FundMeError::InvalidInput { param: "network", .. })));
    }

    #[test]
    fn test_deploy_zero_deployer_rejected() {
        let network = NetworkConfig::by_name("localhost").unwrap();
        let result = deploy_local(&network, [0u8; 32]);

        assert!(matches!(result, Err(FundMeError::InvalidInput { param: "deployer", .. })));
    }
}
