//! Property-based coverage tests.
//!
//! Run with: `cargo test --test property`

mod coverage;
