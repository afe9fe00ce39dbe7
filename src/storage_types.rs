use soroban_sdk::{contracttype, Address};

/// Holders may acquire at most this many passes through `mint`.
pub const MAX_PER_WALLET: u32 = 5;

/// Royalty rate ceiling and divisor: tenths of a percent, capped at 10%.
pub const MAX_ROYALTY_BPS: u32 = 1000;
pub const ROYALTY_DENOMINATOR: i128 = 1000;

/// Staking gate values. Any u32 is storable; only `STAKING_OPEN` accepts stakes.
pub const STAKING_CLOSED: u32 = 0;
pub const STAKING_OPEN: u32 = 1;

/// Active sale window and unit price. Replaced wholesale by the admin.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintConfig {
    pub price: i128,
    pub start_time: u64,
    pub end_time: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // Instance singletons
    Admin,
    Treasury,
    PaymentToken,
    MintConfig,
    Minted,
    RoyaltyBps,
    StakingState,
    // Persistent per-address / per-token maps
    Owner(u32),
    Balance(Address),
    Approved(u32),
    MintedOf(Address),
    Staked(Address),
}
