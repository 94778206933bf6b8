//! Integration test modules
//!
//! One submodule per area of the crate

#[allow(unused_imports)]
pub mod guard;
