//! Controller behaviour through the public API
//!
//! Run with: cargo test --test controller

mod fabric;
mod forwarding;
mod management;
