//! Integration tests for the remote catalog client
//!
//! Each module spins up a wiremock server and points a `RemoteClient`
//! (with throttling disabled) at it.

mod test_credentials;
mod test_datasets;
