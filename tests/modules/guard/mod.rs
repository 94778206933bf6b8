#[allow(unused_imports)]
pub mod integration;
