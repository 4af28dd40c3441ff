//! Optimization options: directive processing and plan execution.

use crate::arguments::PassArguments;
use crate::catalog::PassCatalog;
use crate::directive::{Arity, DirectiveAction, DirectiveTable};
use crate::engine::PassEngine;
use crate::error::OptionsError;
use crate::level::OptimizationLevel;
use crate::selection::{PassEntry, PassSelection};
use wasmparser::WasmFeatures;

/// Settings handed to the engine and, through it, to every pass.
#[derive(Debug, Clone, Default)]
pub struct PassOptions {
    pub level: OptimizationLevel,
    /// Assume loads, div/rem and friends never trap unexpectedly.
    pub ignore_implicit_traps: bool,
    /// Assume the low 1K of linear memory is unused.
    pub low_memory_unused: bool,
    pub arguments: PassArguments,
    pub features: WasmFeatures,
}

impl PassOptions {
    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key)
    }
}

/// Optimization directives collected from the command line.
///
/// Directives are applied in arrival order. Level directives overwrite the
/// level state; `-O*` shortcuts and `--<pass>` directives append to the pass
/// selection, which is replayed against an engine by [`run_passes`].
///
/// [`run_passes`]: OptimizationOptions::run_passes
#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pass_options: PassOptions,
    passes: PassSelection,
    directives: DirectiveTable,
    debug: bool,
}

impl OptimizationOptions {
    /// Builds the directive table from `catalog`. Passes registered in the
    /// catalog later are not visible to this instance.
    pub fn new(catalog: &dyn PassCatalog) -> Result<Self, OptionsError> {
        Ok(Self {
            pass_options: PassOptions::default(),
            passes: PassSelection::new(),
            directives: DirectiveTable::new(catalog)?,
            debug: false,
        })
    }

    pub fn directives(&self) -> &DirectiveTable {
        &self.directives
    }

    pub fn pass_options(&self) -> &PassOptions {
        &self.pass_options
    }

    pub fn passes(&self) -> &PassSelection {
        &self.passes
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Applies one directive by name (`"O2"`, `"pass-arg"`, `"dce"`).
    ///
    /// `value` must be `None` for flags and `Some` for directives that take
    /// an argument.
    pub fn apply(&mut self, name: &str, value: Option<&str>) -> Result<(), OptionsError> {
        let directive = self
            .directives
            .get(name)
            .ok_or_else(|| OptionsError::UnknownDirective(name.to_string()))?;
        let value = match (directive.arity, value) {
            (Arity::Zero, Some(value)) => {
                return Err(OptionsError::UnexpectedValue {
                    directive: name.to_string(),
                    value: value.to_string(),
                })
            }
            (Arity::Zero, None) => "",
            (Arity::One | Arity::Many, Some(value)) => value,
            (Arity::One | Arity::Many, None) => {
                return Err(OptionsError::MissingValue(name.to_string()))
            }
        };
        log::debug!("applying {} {}", directive.flag(), value);
        let action = directive.action.clone();

        match action {
            DirectiveAction::DefaultPasses => self.passes.append_default(),
            DirectiveAction::Level {
                optimize,
                shrink,
                run_default,
            } => {
                self.pass_options.level.set(optimize, shrink);
                if run_default {
                    self.passes.append_default();
                }
            }
            DirectiveAction::OptimizeLevel => {
                self.pass_options.level.optimize = parse_level(name, value)?;
            }
            DirectiveAction::ShrinkLevel => {
                self.pass_options.level.shrink = parse_level(name, value)?;
            }
            DirectiveAction::IgnoreImplicitTraps => self.pass_options.ignore_implicit_traps = true,
            DirectiveAction::LowMemoryUnused => self.pass_options.low_memory_unused = true,
            DirectiveAction::PassArg => self.pass_options.arguments.set_argument(value)?,
            DirectiveAction::Pass(pass) => self.passes.append_named(pass),
        }
        Ok(())
    }

    /// Applies directives in order, stopping at the first error.
    pub fn apply_all<'a, I>(&mut self, directives: I) -> Result<(), OptionsError>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        for (name, value) in directives {
            self.apply(name, value)?;
        }
        Ok(())
    }

    /// Whether the default pipeline was requested by any directive.
    pub fn running_default_optimization_passes(&self) -> bool {
        self.passes.has_default()
    }

    /// Whether any pass, default or named, was requested.
    pub fn running_passes(&self) -> bool {
        !self.passes.is_empty()
    }

    /// Replays the pass selection against a fresh engine and runs it once.
    ///
    /// `build` receives the options as they are now, so a `Default` entry
    /// expands with the final level state rather than the state at the time
    /// the entry was appended.
    pub fn run_passes<E, F>(&self, module: &mut E::Module, build: F) -> Result<(), E::Error>
    where
        E: PassEngine,
        F: FnOnce(&PassOptions) -> E,
    {
        let mut engine = build(&self.pass_options);
        engine.set_debug(self.debug);
        engine.set_features(self.pass_options.features);
        for entry in &self.passes {
            match entry {
                PassEntry::Default => engine.add_default_optimization_passes()?,
                PassEntry::Named(pass) => engine.add(pass)?,
            }
        }
        engine.run(module)
    }
}

/// Strict level parsing: anything `u32::from_str` rejects is an error.
fn parse_level(directive: &str, value: &str) -> Result<u32, OptionsError> {
    value.parse().map_err(|_| OptionsError::InvalidLevel {
        directive: directive.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Catalog;

    impl PassCatalog for Catalog {
        fn registered_names(&self) -> Vec<String> {
            vec!["dce".to_string(), "vacuum".to_string()]
        }

        fn describe(&self, _name: &str) -> String {
            String::new()
        }
    }

    fn options() -> OptimizationOptions {
        OptimizationOptions::new(&Catalog).unwrap()
    }

    /// Records engine calls into the "module".
    #[derive(Default)]
    struct Recorder {
        level: OptimizationLevel,
        debug: bool,
        queued: Vec<String>,
    }

    impl PassEngine for Recorder {
        type Module = Vec<String>;
        type Error = String;

        fn set_debug(&mut self, debug: bool) {
            self.debug = debug;
        }

        fn set_features(&mut self, _features: WasmFeatures) {}

        fn add_default_optimization_passes(&mut self) -> Result<(), String> {
            self.queued.push(format!(
                "default(O{},s{})",
                self.level.optimize, self.level.shrink
            ));
            Ok(())
        }

        fn add(&mut self, pass: &str) -> Result<(), String> {
            self.queued.push(pass.to_string());
            Ok(())
        }

        fn run(&mut self, module: &mut Vec<String>) -> Result<(), String> {
            if self.debug {
                module.push("debug".to_string());
            }
            module.append(&mut self.queued);
            Ok(())
        }
    }

    fn recorder(options: &PassOptions) -> Recorder {
        Recorder {
            level: options.level,
            ..Default::default()
        }
    }

    #[test]
    fn level_shortcut_table() {
        let cases = [
            ("O0", 0, 0, false),
            ("O1", 1, 0, true),
            ("O2", 2, 0, true),
            ("O3", 3, 0, true),
            ("O4", 4, 0, true),
            ("Os", 2, 1, true),
            ("Oz", 2, 2, true),
        ];
        for (name, optimize, shrink, default) in cases {
            let mut opts = options();
            opts.apply("optimize-level", Some("7")).unwrap();
            opts.apply("shrink-level", Some("7")).unwrap();
            opts.apply(name, None).unwrap();
            assert_eq!(
                opts.pass_options().level,
                OptimizationLevel::new(optimize, shrink),
                "{name}"
            );
            assert_eq!(opts.passes().len(), usize::from(default), "{name}");
            assert_eq!(opts.running_default_optimization_passes(), default, "{name}");
        }
    }

    #[test]
    fn whole_default_keeps_levels() {
        let mut opts = options();
        opts.apply("optimize-level", Some("3")).unwrap();
        opts.apply("shrink-level", Some("1")).unwrap();
        opts.apply("O", None).unwrap();
        assert_eq!(opts.pass_options().level, OptimizationLevel::new(3, 1));
        assert_eq!(opts.passes().entries(), &[PassEntry::Default]);
    }

    #[test]
    fn single_field_setters_leave_the_other_level() {
        let mut opts = options();
        opts.apply("Oz", None).unwrap();
        opts.apply("optimize-level", Some("4")).unwrap();
        assert_eq!(opts.pass_options().level, OptimizationLevel::new(4, 2));
        opts.apply("shrink-level", Some("0")).unwrap();
        assert_eq!(opts.pass_options().level, OptimizationLevel::new(4, 0));
    }

    #[test]
    fn malformed_levels_are_rejected() {
        for bad in ["", "abc", "-1", "2x", "99999999999"] {
            let mut opts = options();
            let err = opts.apply("optimize-level", Some(bad)).unwrap_err();
            assert_eq!(
                err,
                OptionsError::InvalidLevel {
                    directive: "optimize-level".into(),
                    value: bad.into(),
                }
            );
            assert_eq!(opts.pass_options().level, OptimizationLevel::default());
        }
    }

    #[test]
    fn aliases_apply_like_their_directives() {
        let mut opts = options();
        opts.apply_all([
            ("ol", Some("3")),
            ("iit", None),
            ("lmu", None),
            ("pa", Some("k:v")),
        ])
        .unwrap();
        assert_eq!(opts.pass_options().level.optimize, 3);
        assert!(opts.pass_options().ignore_implicit_traps);
        assert!(opts.pass_options().low_memory_unused);
        assert_eq!(opts.pass_options().argument("k"), Some("v"));
    }

    #[test]
    fn toggles() {
        let mut opts = options();
        assert!(!opts.pass_options().ignore_implicit_traps);
        assert!(!opts.pass_options().low_memory_unused);
        opts.apply("ignore-implicit-traps", None).unwrap();
        opts.apply("low-memory-unused", None).unwrap();
        assert!(opts.pass_options().ignore_implicit_traps);
        assert!(opts.pass_options().low_memory_unused);
        assert!(!opts.running_passes());
    }

    #[test]
    fn arity_is_checked() {
        let mut opts = options();
        assert_eq!(
            opts.apply("O2", Some("x")).unwrap_err(),
            OptionsError::UnexpectedValue {
                directive: "O2".into(),
                value: "x".into(),
            }
        );
        assert_eq!(
            opts.apply("pass-arg", None).unwrap_err(),
            OptionsError::MissingValue("pass-arg".into())
        );
        assert_eq!(
            opts.apply("inline", None).unwrap_err(),
            OptionsError::UnknownDirective("inline".into())
        );
        assert!(!opts.running_passes());
    }

    #[test]
    fn apply_all_stops_at_first_error() {
        let mut opts = options();
        let err = opts
            .apply_all([
                ("dce", None),
                ("pass-arg", Some("noColon")),
                ("vacuum", None),
            ])
            .unwrap_err();
        assert_eq!(err, OptionsError::MalformedPassArg);
        assert_eq!(opts.passes().entries(), &[PassEntry::Named("dce".into())]);
        assert!(opts.pass_options().arguments.is_empty());
    }

    #[test]
    fn run_passes_replays_in_order() {
        let mut opts = options();
        opts.apply_all([
            ("dce", None),
            ("O1", None),
            ("vacuum", None),
            ("dce", None),
        ])
        .unwrap();
        let mut module = Vec::new();
        opts.run_passes(&mut module, recorder).unwrap();
        assert_eq!(module, vec!["dce", "default(O1,s0)", "vacuum", "dce"]);
    }

    #[test]
    fn default_expansion_uses_final_levels() {
        let mut opts = options();
        opts.apply_all([("O1", None), ("optimize-level", Some("3"))]).unwrap();
        let mut module = Vec::new();
        opts.run_passes(&mut module, recorder).unwrap();
        assert_eq!(module, vec!["default(O3,s0)"]);
    }

    #[test]
    fn debug_flag_reaches_engine() {
        let mut opts = options();
        opts.set_debug(true);
        opts.apply("dce", None).unwrap();
        let mut module = Vec::new();
        opts.run_passes(&mut module, recorder).unwrap();
        assert_eq!(module, vec!["debug", "dce"]);
    }

    #[test]
    fn engine_errors_propagate() {
        struct Failing;

        impl PassEngine for Failing {
            type Module = ();
            type Error = String;

            fn set_debug(&mut self, _debug: bool) {}
            fn set_features(&mut self, _features: WasmFeatures) {}
            fn add_default_optimization_passes(&mut self) -> Result<(), String> {
                Ok(())
            }
            fn add(&mut self, pass: &str) -> Result<(), String> {
                Err(format!("no such pass {pass}"))
            }
            fn run(&mut self, _module: &mut ()) -> Result<(), String> {
                Ok(())
            }
        }

        let mut opts = options();
        opts.apply("vacuum", None).unwrap();
        let err = opts.run_passes(&mut (), |_| Failing).unwrap_err();
        assert_eq!(err, "no such pass vacuum");
    }
}
