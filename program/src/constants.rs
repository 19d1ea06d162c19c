// Program-wide limits and defaults

/// Maximum number of entries held by one raffle account.
/// Fixes the account size so the entrant list can be stored inline.
pub const MAX_ENTRANTS: usize = 256;

/// Number of in-flight requests the mock coordinator can track.
pub const MAX_PENDING_REQUESTS: usize = 16;

/// Random words requested per draw. Only the first one picks the winner.
pub const NUM_WORDS: u32 = 1;

/// Upper bound on random words carried by a single fulfillment.
pub const MAX_RANDOM_WORDS: usize = 8;

/// Request ids start at 1 so that 0 never names a live request.
pub const FIRST_REQUEST_ID: u64 = 1;

/// Default entrance fee: 0.01 SOL in lamports.
pub const DEFAULT_ENTRANCE_FEE: u64 = 10_000_000;

/// Default seconds between draws.
pub const DEFAULT_INTERVAL: u64 = 30;
