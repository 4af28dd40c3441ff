//! A concrete pass catalog: named passes with descriptions and constructors.

use crate::catalog::PassCatalog;
use crate::options::PassOptions;
use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// A single transformation over a module of type `M`.
pub trait Pass<M: ?Sized> {
    fn run(&mut self, module: &mut M, options: &PassOptions) -> Result<()>;
}

/// Creates a fresh pass instance for one run.
pub type PassConstructor<M> = fn() -> Box<dyn Pass<M>>;

/// Chooses the default pipeline for the given levels.
pub type DefaultPipeline = fn(&PassOptions) -> Vec<&'static str>;

/// Checks a module between passes in debug mode.
pub type ModuleValidator<M> = fn(&M, &PassOptions) -> Result<()>;

struct PassInfo<M: ?Sized> {
    description: String,
    create: PassConstructor<M>,
}

/// Registered passes, keyed (and listed) by name in sorted order.
pub struct PassRegistry<M: ?Sized> {
    passes: BTreeMap<String, PassInfo<M>>,
    default_pipeline: DefaultPipeline,
    validator: Option<ModuleValidator<M>>,
}

fn empty_pipeline(_options: &PassOptions) -> Vec<&'static str> {
    Vec::new()
}

impl<M: ?Sized> PassRegistry<M> {
    pub fn new() -> Self {
        Self {
            passes: BTreeMap::new(),
            default_pipeline: empty_pipeline,
            validator: None,
        }
    }

    pub fn with_default_pipeline(mut self, pipeline: DefaultPipeline) -> Self {
        self.default_pipeline = pipeline;
        self
    }

    pub fn with_validator(mut self, validator: ModuleValidator<M>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        create: PassConstructor<M>,
    ) -> Result<()> {
        let name = name.into();
        if self.passes.contains_key(&name) {
            bail!("pass `{name}` is already registered");
        }
        self.passes.insert(
            name,
            PassInfo {
                description: description.into(),
                create,
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.passes.get(name).map(|info| info.description.as_str())
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Pass<M>>> {
        self.passes.get(name).map(|info| (info.create)())
    }

    /// Names of the default pipeline passes for `options`, in run order.
    pub fn default_pipeline(&self, options: &PassOptions) -> Vec<&'static str> {
        (self.default_pipeline)(options)
    }

    /// Runs the validator, if one is installed.
    pub fn validate(&self, module: &M, options: &PassOptions) -> Result<()> {
        match self.validator {
            Some(validate) => validate(module, options),
            None => Ok(()),
        }
    }
}

impl<M: ?Sized> Default for PassRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized> PassCatalog for PassRegistry<M> {
    fn registered_names(&self) -> Vec<String> {
        self.passes.keys().cloned().collect()
    }

    fn describe(&self, name: &str) -> String {
        self.description(name).unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Push(&'static str);

    impl Pass<Vec<&'static str>> for Push {
        fn run(&mut self, module: &mut Vec<&'static str>, _options: &PassOptions) -> Result<()> {
            module.push(self.0);
            Ok(())
        }
    }

    fn registry() -> PassRegistry<Vec<&'static str>> {
        let mut registry = PassRegistry::new();
        registry
            .register("vacuum", "removes obviously unneeded code", || {
                Box::new(Push("vacuum"))
            })
            .unwrap();
        registry
            .register("dce", "removes unreachable code", || Box::new(Push("dce")))
            .unwrap();
        registry
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(registry().registered_names(), vec!["dce", "vacuum"]);
    }

    #[test]
    fn describe_known_and_unknown() {
        let registry = registry();
        assert_eq!(registry.describe("dce"), "removes unreachable code");
        assert_eq!(registry.describe("inline"), "");
        assert!(registry.contains("vacuum"));
        assert!(!registry.contains("inline"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry
            .register("dce", "again", || Box::new(Push("dce")))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn create_builds_a_runnable_pass() {
        let registry = registry();
        let mut module = Vec::new();
        let mut pass = registry.create("dce").unwrap();
        pass.run(&mut module, &PassOptions::default()).unwrap();
        assert_eq!(module, vec!["dce"]);
        assert!(registry.create("inline").is_none());
    }

    #[test]
    fn default_pipeline_is_empty_unless_configured() {
        let options = PassOptions::default();
        assert!(registry().default_pipeline(&options).is_empty());
        let registry = registry().with_default_pipeline(|_| vec!["dce", "vacuum"]);
        assert_eq!(registry.default_pipeline(&options), vec!["dce", "vacuum"]);
    }
}
