//! Runs passes from a [`PassRegistry`] against a module.

use crate::engine::PassEngine;
use crate::options::PassOptions;
use crate::registry::{Pass, PassRegistry};
use anyhow::{bail, Context, Result};
use std::time::Instant;
use wasmparser::WasmFeatures;

/// A [`PassEngine`] backed by a [`PassRegistry`].
///
/// Passes are instantiated when queued and run in queue order. In debug mode
/// the registry's validator runs after every pass.
pub struct PassRunner<'r, M: ?Sized> {
    registry: &'r PassRegistry<M>,
    options: PassOptions,
    debug: bool,
    queue: Vec<(String, Box<dyn Pass<M>>)>,
}

impl<'r, M: ?Sized> PassRunner<'r, M> {
    pub fn new(registry: &'r PassRegistry<M>, options: PassOptions) -> Self {
        Self {
            registry,
            options,
            debug: false,
            queue: Vec::new(),
        }
    }

    pub fn options(&self) -> &PassOptions {
        &self.options
    }

    /// Names of the passes queued so far.
    pub fn queued(&self) -> Vec<&str> {
        self.queue.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl<M: ?Sized> PassEngine for PassRunner<'_, M> {
    type Module = M;
    type Error = anyhow::Error;

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn set_features(&mut self, features: WasmFeatures) {
        self.options.features = features;
    }

    fn add_default_optimization_passes(&mut self) -> Result<()> {
        let pipeline = self.registry.default_pipeline(&self.options);
        log::debug!(
            "default pipeline at -O{} (shrink {}): {:?}",
            self.options.level.optimize,
            self.options.level.shrink,
            pipeline
        );
        for pass in pipeline {
            self.add(pass)
                .context("default pipeline names an unregistered pass")?;
        }
        Ok(())
    }

    fn add(&mut self, pass: &str) -> Result<()> {
        let Some(instance) = self.registry.create(pass) else {
            bail!("unknown pass `{pass}`");
        };
        self.queue.push((pass.to_string(), instance));
        Ok(())
    }

    fn run(&mut self, module: &mut M) -> Result<()> {
        let queue = std::mem::take(&mut self.queue);
        log::info!("running {} passes", queue.len());
        for (name, mut pass) in queue {
            let start = Instant::now();
            pass.run(module, &self.options)
                .with_context(|| format!("pass `{name}` failed"))?;
            log::debug!("pass {name} took {:?}", start.elapsed());
            if self.debug {
                self.registry
                    .validate(module, &self.options)
                    .with_context(|| format!("module is invalid after pass `{name}`"))?;
            }
        }
        log::info!("passes finished");
        Ok(())
    }
}
