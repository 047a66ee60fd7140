//! Integration tests for dramapop
//!
//! These drive the full open / play / advance / persist flow through
//! `WatchSession` against fake media and catalog implementations. The HTTP
//! catalog client is exercised against a mockito server.

mod continuity_test;
mod history_test;
