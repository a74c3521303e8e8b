//! Exit codes for `certchain`.
//! These codes are part of the public contract; scripts branch on them.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1; // Form rejected, or certificate invalid / not found
pub const EXIT_CONFIG_ERROR: i32 = 2; // Bad config, bad input, contract missing
pub const EXIT_CANCELLED: i32 = 3; // User declined in the wallet
pub const EXIT_TIMED_OUT: i32 = 4; // Wallet did not answer in time
pub const EXIT_TRANSPORT_ERROR: i32 = 5; // Wallet or node failure
pub const EXIT_INVALID_RESPONSE: i32 = 6; // Node answered with something undecodable
