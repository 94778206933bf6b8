//! End-to-end tests
//!
//! Full flows across manager, config and guard

#[allow(unused_imports)]
mod concurrent_acquire;
