//! Ledger Constants
//!
//! All magic numbers and configuration values for the FundMe ledger.

/// Native asset metadata
pub mod native {
    /// Decimal places of the native asset (wei precision)
    pub const DECIMALS: u8 = 18;
    /// One whole native unit in base units (1 ETH = 1e18 wei)
    pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;
}

/// Precision constants
pub mod precision {
    /// Canonical fixed-point precision for reference values
    pub const DECIMAL_PRECISION: u128 = 1_000_000_000_000_000_000; // 1e18

    /// Decimal places of the canonical precision
    pub const DECIMALS: u8 = 18;
}

/// Funding rules
pub mod funding {
    use super::precision::DECIMAL_PRECISION;

    /// Minimum contribution, in USD with 18 decimals (50 USD)
    pub const MINIMUM_USD: u128 = 50 * DECIMAL_PRECISION;
}

/// Mock price feed deployment parameters
pub mod price_feed {
    /// Decimals reported by the ETH/USD aggregator
    pub const DECIMALS: u8 = 8;

    /// Initial answer for the mock aggregator (200 USD with 8 decimals)
    pub const INITIAL_ANSWER: i128 = 200_00000000;

    /// Aggregator interface version
    pub const VERSION: u64 = 4;

    /// Human-readable feed description
    pub const DESCRIPTION: &str = "v0.8/tests/MockV3Aggregator.sol";
}

/// Network configuration
pub mod network {
    /// Networks that get a locally deployed mock price feed
    pub const DEVELOPMENT_CHAINS: [&str; 2] = ["hardhat", "localhost"];

    /// In-process development chain
    pub const HARDHAT_CHAIN_ID: u64 = 31337;

    /// Local node chain
    pub const LOCALHOST_CHAIN_ID: u64 = 1337;

    /// Goerli testnet
    pub const GOERLI_CHAIN_ID: u64 = 5;

    /// Confirmations to wait for on live networks
    pub const LIVE_BLOCK_CONFIRMATIONS: u64 = 6;

    /// Confirmations to wait for on development networks
    pub const DEV_BLOCK_CONFIRMATIONS: u64 = 1;
}
