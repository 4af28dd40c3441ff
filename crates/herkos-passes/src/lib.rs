//! herkos-passes — optimization options for herkos tools.
//!
//! Turns order-sensitive optimization directives (`-O2`, `--shrink-level 1`,
//! `--pass-arg key:value`, `--<pass>`) into an ordered pass plan, and replays
//! that plan against a [`PassEngine`].
//!
//! The set of selectable passes is not fixed: one directive is generated per
//! entry of the [`PassCatalog`] handed to [`OptimizationOptions::new`].

pub mod arguments;
pub mod catalog;
pub mod directive;
pub mod engine;
pub mod error;
pub mod level;
pub mod options;
pub mod registry;
pub mod runner;
pub mod selection;

pub use arguments::PassArguments;
pub use catalog::PassCatalog;
pub use directive::{Arity, Directive, DirectiveAction, DirectiveTable, Spelling};
pub use engine::PassEngine;
pub use error::OptionsError;
pub use level::OptimizationLevel;
pub use options::{OptimizationOptions, PassOptions};
pub use registry::{Pass, PassRegistry};
pub use runner::PassRunner;
pub use selection::{PassEntry, PassSelection};
