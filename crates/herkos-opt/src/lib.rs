//! herkos-opt — runs optimization passes over WebAssembly binaries.
//!
//! The pass catalog lives in [`passes`], the module representation in
//! [`module`], and [`cli`] exposes the optimization directives on a clap
//! command line.

pub mod cli;
pub mod module;
pub mod passes;

pub use module::{Section, WasmModule};
