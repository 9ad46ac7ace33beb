//! Process exit codes for `brickq`.
//!
//! Library errors map through `QueryError::exit_code`; the codes it returns
//! are pinned to these constants in `main.rs` tests.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 1; // Bad flags, unknown saved query, unreadable query file
#[allow(dead_code)]
pub const EXIT_TRANSPORT_ERROR: i32 = 5; // Endpoint unreachable or non-2xx
#[allow(dead_code)]
pub const EXIT_DATA_ERROR: i32 = 6; // Malformed results or cache store failure
