//! State Module - Application state that outlives a single page
//!
//! - **Store** - Observable state with per-key subscribers
//! - **Storage** - Key-value backends for the persistent store variant

mod storage;
mod store;

pub use storage::*;
pub use store::*;
