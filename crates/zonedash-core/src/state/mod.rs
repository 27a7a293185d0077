// # Snapshot Store Implementations
//
// This module provides implementations of the SnapshotStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::ConfigFileStore;
pub use memory::MemorySnapshotStore;
