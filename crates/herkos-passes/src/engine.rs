//! The protocol between an assembled pass plan and whatever executes it.

use wasmparser::WasmFeatures;

/// An engine that queues passes and runs them against a module.
///
/// [`OptimizationOptions::run_passes`](crate::OptimizationOptions::run_passes)
/// builds one engine per run, replays the pass selection into it and calls
/// [`run`](PassEngine::run) exactly once. Unknown pass names are the engine's
/// to report.
pub trait PassEngine {
    type Module: ?Sized;
    type Error;

    fn set_debug(&mut self, debug: bool);

    fn set_features(&mut self, features: WasmFeatures);

    /// Queues the engine's built-in pipeline for the current levels.
    fn add_default_optimization_passes(&mut self) -> Result<(), Self::Error>;

    /// Queues a single pass by name.
    fn add(&mut self, pass: &str) -> Result<(), Self::Error>;

    /// Runs everything queued so far.
    fn run(&mut self, module: &mut Self::Module) -> Result<(), Self::Error>;
}
