//! Embervale library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can import game types, systems, and resources without needing a
//! window or GPU.

pub mod shared;
pub mod registry;
pub mod animate;
pub mod input;
pub mod town_map;
pub mod overworld;
pub mod audio;
pub mod save;
pub mod data;
