//! Kani harnesses for the pure AMM and lending models
//!
//! Run with: cargo kani -p proofs-kani
//! Single harness: cargo kani -p proofs-kani --harness <name>

#![cfg(kani)]

mod amm;
mod lending;
