//! Loyalty Module
//!
//! The reward accrual core: the pure policy derivation, the per-customer
//! lock registry, and the service that records purchases and claims.
//!
//! Data flows one way: purchases append to the ledger, the policy reads a
//! ledger snapshot to derive status, and a claim appends the reward order
//! back through the same ledger.

pub mod locks;
pub mod policy;
pub mod service;

pub use locks::CustomerLocks;
pub use policy::{CYCLE_LEN, compute_status, status_from_ledger};
pub use service::LoyaltyService;
