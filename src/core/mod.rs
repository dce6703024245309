//! Core data types shared across the crate.

pub mod library;
pub mod scope;
pub mod toolchain;
pub mod unit;

pub use library::{LibraryMetadata, LibraryResolver};
pub use scope::Scope;
pub use toolchain::ToolchainSpec;
pub use unit::CompileUnit;
