//! The directive table: every recognized optimization flag and what it does.
//!
//! Fixed directives (levels, toggles, `--pass-arg`) are registered first,
//! followed by one `--<pass>` directive per catalog entry. The table is built
//! once and never changes afterwards.

use crate::catalog::PassCatalog;
use crate::error::OptionsError;
use std::collections::HashMap;

/// How many values a directive takes per occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Zero,
    One,
    /// One value per occurrence, and the directive is expected to repeat.
    Many,
}

/// How a directive is written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spelling {
    /// `-O`, `-O2`, `-Os`: the directive name behind a single dash.
    Shortcut,
    /// `--name`, optionally with a one-letter short form.
    Long { short: Option<char> },
}

/// What applying a directive does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveAction {
    /// Append the default pipeline without touching the levels.
    DefaultPasses,
    /// Set both levels, and append the default pipeline if `run_default`.
    Level {
        optimize: u32,
        shrink: u32,
        run_default: bool,
    },
    OptimizeLevel,
    ShrinkLevel,
    IgnoreImplicitTraps,
    LowMemoryUnused,
    PassArg,
    /// Append this catalog pass.
    Pass(String),
}

/// One recognized flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub spelling: Spelling,
    pub description: String,
    pub arity: Arity,
    pub action: DirectiveAction,
    /// Extra name for a long directive, e.g. `ol` for `optimize-level`.
    pub alias: Option<String>,
}

impl Directive {
    fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// The flag as a user types it, e.g. `-O3` or `--pass-arg`.
    pub fn flag(&self) -> String {
        match self.spelling {
            Spelling::Shortcut => format!("-{}", self.name),
            Spelling::Long { .. } => format!("--{}", self.name),
        }
    }
}

/// Directive name → directive, in registration order.
#[derive(Debug, Clone, Default)]
pub struct DirectiveTable {
    directives: Vec<Directive>,
    by_name: HashMap<String, usize>,
}

impl DirectiveTable {
    /// Builds the fixed directives plus one directive per pass in `catalog`.
    ///
    /// Fails if a catalog pass has the same name as a fixed directive (or the
    /// catalog lists a name twice).
    pub fn new(catalog: &dyn PassCatalog) -> Result<Self, OptionsError> {
        let mut table = Self::default();
        for directive in fixed_directives() {
            table.register(directive)?;
        }
        for name in catalog.registered_names() {
            let description = catalog.describe(&name);
            table.register(Directive {
                name: name.clone(),
                spelling: Spelling::Long { short: None },
                description,
                arity: Arity::Zero,
                action: DirectiveAction::Pass(name),
                alias: None,
            })?;
        }
        log::debug!("built directive table with {} entries", table.len());
        Ok(table)
    }

    /// Names and aliases share one namespace.
    fn register(&mut self, directive: Directive) -> Result<(), OptionsError> {
        let names = std::iter::once(&directive.name).chain(directive.alias.as_ref());
        for name in names.clone() {
            if self.by_name.contains_key(name) {
                return Err(OptionsError::DuplicateDirective(name.clone()));
            }
        }
        for name in names {
            self.by_name.insert(name.clone(), self.directives.len());
        }
        self.directives.push(directive);
        Ok(())
    }

    /// Looks a directive up by name or alias.
    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.by_name.get(name).map(|&idx| &self.directives[idx])
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.directives.iter()
    }
}

fn shortcut(
    name: &str,
    description: &str,
    optimize: u32,
    shrink: u32,
    run_default: bool,
) -> Directive {
    Directive {
        name: name.to_string(),
        spelling: Spelling::Shortcut,
        description: description.to_string(),
        arity: Arity::Zero,
        action: DirectiveAction::Level {
            optimize,
            shrink,
            run_default,
        },
        alias: None,
    }
}

fn long(
    name: &str,
    short: Option<char>,
    description: &str,
    arity: Arity,
    action: DirectiveAction,
) -> Directive {
    Directive {
        name: name.to_string(),
        spelling: Spelling::Long { short },
        description: description.to_string(),
        arity,
        action,
        alias: None,
    }
}

fn fixed_directives() -> Vec<Directive> {
    vec![
        Directive {
            name: "O".to_string(),
            spelling: Spelling::Shortcut,
            description: "execute default optimization passes".to_string(),
            arity: Arity::Zero,
            action: DirectiveAction::DefaultPasses,
            alias: None,
        },
        shortcut("O0", "execute no optimization passes", 0, 0, false),
        shortcut(
            "O1",
            "execute -O1 optimization passes (quick and useful, for iteration builds)",
            1,
            0,
            true,
        ),
        shortcut(
            "O2",
            "execute -O2 optimization passes (most opts, generally gets most perf)",
            2,
            0,
            true,
        ),
        shortcut(
            "O3",
            "execute -O3 optimization passes (spends potentially a lot of time optimizing)",
            3,
            0,
            true,
        ),
        shortcut(
            "O4",
            "execute -O4 optimization passes (slowest, for nested or less-optimized input)",
            4,
            0,
            true,
        ),
        shortcut(
            "Os",
            "execute default optimization passes, focusing on code size",
            2,
            1,
            true,
        ),
        shortcut(
            "Oz",
            "execute default optimization passes, super-focusing on code size",
            2,
            2,
            true,
        ),
        long(
            "optimize-level",
            None,
            "How much to focus on optimizing code",
            Arity::One,
            DirectiveAction::OptimizeLevel,
        )
        .with_alias("ol"),
        long(
            "shrink-level",
            Some('s'),
            "How much to focus on shrinking code size",
            Arity::One,
            DirectiveAction::ShrinkLevel,
        ),
        long(
            "ignore-implicit-traps",
            None,
            "Optimize under the assumption that no surprising traps occur (from load, div/mod, etc.)",
            Arity::Zero,
            DirectiveAction::IgnoreImplicitTraps,
        )
        .with_alias("iit"),
        long(
            "low-memory-unused",
            None,
            "Optimize under the assumption that the low 1K of memory is not used by the application",
            Arity::Zero,
            DirectiveAction::LowMemoryUnused,
        )
        .with_alias("lmu"),
        long(
            "pass-arg",
            None,
            "An argument passed along to optimization passes being run. Must be in the form KEY:VALUE",
            Arity::Many,
            DirectiveAction::PassArg,
        )
        .with_alias("pa"),
    ]
}
