//! The wasm pass catalog and the default optimization pipeline.

pub mod strip;

use crate::module::WasmModule;
use anyhow::Result;
use herkos_passes::registry::PassConstructor;
use herkos_passes::{PassOptions, PassRegistry};

const PASSES: &[(&str, &str, PassConstructor<WasmModule>)] = &[
    (
        "strip-custom-sections",
        "strip the custom sections named by --pass-arg strip-custom-sections:NAME[,NAME...]",
        strip::named,
    ),
    (
        "strip-debug",
        "strip debug info (name section, DWARF and source map references)",
        strip::debug,
    ),
    ("strip-dwarf", "strip DWARF debug sections", strip::dwarf),
    (
        "strip-producers",
        "strip the producers section",
        strip::producers,
    ),
    (
        "strip-target-features",
        "strip the target_features section",
        strip::target_features,
    ),
];

/// Builds the registry of every pass `herkos-opt` can run.
pub fn registry() -> Result<PassRegistry<WasmModule>> {
    let mut registry = PassRegistry::new()
        .with_default_pipeline(default_pipeline)
        .with_validator(validate);
    for &(name, description, create) in PASSES {
        registry.register(name, description, create)?;
    }
    Ok(registry)
}

/// Passes run for `-O`, `-O1`..`-O4`, `-Os` and `-Oz`.
pub fn default_pipeline(options: &PassOptions) -> Vec<&'static str> {
    let level = options.level;
    let mut passes = Vec::new();
    if level.optimize >= 1 || level.shrink >= 1 {
        passes.push("strip-dwarf");
    }
    if level.shrink >= 1 {
        passes.push("strip-producers");
    }
    if level.shrink >= 2 {
        passes.push("strip-debug");
    }
    passes
}

fn validate(module: &WasmModule, options: &PassOptions) -> Result<()> {
    module.validate(options.features)
}
