//! Chain constants shared by the time-related types.

// see reference values in AntelopeIO/spring/libraries/chain/include/eosio/chain/config.hpp

/// Duration of a block slot, in milliseconds.
pub const BLOCK_INTERVAL_MS: u32 = 500;

/// Epoch for `BlockTimestamp` values: 2000-01-01T00:00:00Z, in milliseconds
/// since the UNIX epoch.
pub const BLOCK_TIMESTAMP_EPOCH: u64 = 946_684_800_000;
