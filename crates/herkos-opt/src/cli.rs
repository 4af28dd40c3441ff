//! Exposes optimization directives on a clap command line.
//!
//! Every long directive becomes an appendable `--name` argument. The `-O`
//! shortcuts share one short option, `-O[=LEVEL]`, whose value picks the
//! shortcut. [`normalize_args`] rewrites `-O2` to `-O=2` and `-ol` to `--ol`
//! before clap sees the arguments, so a bare `-O` never swallows the next
//! token. Directive order is recovered from the value indices clap records,
//! so `--pass-a -O2 --pass-b` replays in exactly that order.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use herkos_passes::{
    Arity, Directive, DirectiveAction, DirectiveTable, OptimizationOptions, OptionsError, Spelling,
};

/// clap id of the `-O[LEVEL]` option.
pub const OPT_LEVEL_ID: &str = "O";

/// Arguments clap adds on its own when the command is built.
const BUILTIN_IDS: &[&str] = &["help", "version"];
const BUILTIN_SHORTS: &[char] = &['h', 'V'];

/// Value clap records for a flag given without `=VALUE`. It cannot appear in
/// a real argument, so `--flag=` stays distinguishable from `--flag`.
const FLAG_PRESENT: &str = "\u{0}";

/// One directive occurrence on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Position among all parsed values; only the relative order matters.
    pub index: usize,
    pub name: String,
    pub value: Option<String>,
}

/// Adds one argument per directive to `cmd`.
///
/// Fails if a directive would shadow an argument `cmd` already defines.
pub fn with_directives(
    mut cmd: Command,
    directives: &DirectiveTable,
) -> Result<Command, OptionsError> {
    let shortcuts: Vec<&Directive> = directives
        .iter()
        .filter(|d| d.spelling == Spelling::Shortcut)
        .collect();
    if !shortcuts.is_empty() {
        ensure_free(&cmd, OPT_LEVEL_ID, None, Some('O'))?;
        cmd = cmd.arg(shortcut_arg(&shortcuts));
    }
    for directive in directives.iter() {
        let Spelling::Long { short } = directive.spelling else {
            continue;
        };
        ensure_free(&cmd, &directive.name, Some(&directive.name), short)?;
        if let Some(alias) = &directive.alias {
            ensure_free(&cmd, alias, Some(alias), None)?;
        }
        cmd = cmd.arg(long_arg(directive, short));
    }
    Ok(cmd)
}

fn ensure_free(
    cmd: &Command,
    id: &str,
    long: Option<&str>,
    short: Option<char>,
) -> Result<(), OptionsError> {
    let builtin = BUILTIN_IDS.contains(&id)
        || long.is_some_and(|l| BUILTIN_IDS.contains(&l))
        || short.is_some_and(|s| BUILTIN_SHORTS.contains(&s));
    let taken = cmd.get_arguments().any(|arg| {
        arg.get_id().as_str() == id
            || (long.is_some() && arg.get_long() == long)
            || (short.is_some() && arg.get_short() == short)
    });
    if builtin || taken {
        return Err(OptionsError::DuplicateDirective(id.to_string()));
    }
    Ok(())
}

fn shortcut_arg(shortcuts: &[&Directive]) -> Arg {
    let long_help = shortcuts
        .iter()
        .map(|d| format!("{:<5} {}", d.flag(), d.description))
        .collect::<Vec<_>>()
        .join("\n");
    Arg::new(OPT_LEVEL_ID)
        .short('O')
        .value_name("LEVEL")
        .num_args(0..=1)
        .require_equals(true)
        .default_missing_value("")
        .action(ArgAction::Append)
        .help("Optimization shortcut: -O, -O0 .. -O4, -Os, -Oz")
        .long_help(long_help)
}

fn long_arg(directive: &Directive, short: Option<char>) -> Arg {
    let mut arg = Arg::new(directive.name.clone())
        .long(directive.name.clone())
        .help(directive.description.clone())
        .action(ArgAction::Append);
    if let Some(short) = short {
        arg = arg.short(short);
    }
    if let Some(alias) = &directive.alias {
        arg = arg.visible_alias(alias.clone());
    }
    match directive.arity {
        // Flags still record a value per occurrence so that every occurrence
        // gets an index.
        Arity::Zero => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value(FLAG_PRESENT),
        Arity::One | Arity::Many => arg.num_args(1).value_name(value_name(&directive.action)),
    }
}

fn value_name(action: &DirectiveAction) -> &'static str {
    match action {
        DirectiveAction::OptimizeLevel | DirectiveAction::ShrinkLevel => "LEVEL",
        DirectiveAction::PassArg => "KEY:VALUE",
        _ => "VALUE",
    }
}

/// Collects directive occurrences from `matches`, in command-line order.
pub fn occurrences(matches: &ArgMatches, directives: &DirectiveTable) -> Vec<Occurrence> {
    let mut found = Vec::new();
    if directives.iter().any(|d| d.spelling == Spelling::Shortcut) {
        for (index, level) in indexed_values(matches, OPT_LEVEL_ID) {
            found.push(Occurrence {
                index,
                name: format!("O{level}"),
                value: None,
            });
        }
    }
    for directive in directives.iter() {
        if directive.spelling == Spelling::Shortcut {
            continue;
        }
        for (index, value) in indexed_values(matches, &directive.name) {
            let value = match directive.arity {
                Arity::Zero if value == FLAG_PRESENT => None,
                _ => Some(value),
            };
            found.push(Occurrence {
                index,
                name: directive.name.clone(),
                value,
            });
        }
    }
    found.sort_by_key(|o| o.index);
    found
}

fn indexed_values(matches: &ArgMatches, id: &str) -> Vec<(usize, String)> {
    match (matches.indices_of(id), matches.get_many::<String>(id)) {
        (Some(indices), Some(values)) => indices.zip(values.cloned()).collect(),
        _ => Vec::new(),
    }
}

/// Rewrites directive spellings clap cannot parse on its own.
///
/// `-O<LEVEL>` becomes `-O=<LEVEL>` and single-dash aliases (`-ol 3`,
/// `-pa=k:v`) become long options. The first argument (the binary name) and
/// everything after `--` are left alone.
pub fn normalize_args<I, T>(args: I, directives: &DirectiveTable) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let has_shortcuts = directives.iter().any(|d| d.spelling == Spelling::Shortcut);
    let mut escaped = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(position, arg)| {
            if position == 0 || escaped {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                escaped = true;
                return arg;
            }
            if let Some(level) = text.strip_prefix("-O") {
                if has_shortcuts && !level.is_empty() && !level.starts_with('=') {
                    return format!("-O={level}").into();
                }
                return arg;
            }
            if let Some(body) = text.strip_prefix('-').filter(|b| !b.starts_with('-')) {
                let name = body.split_once('=').map_or(body, |(name, _)| name);
                let is_alias = directives
                    .get(name)
                    .is_some_and(|d| d.alias.as_deref() == Some(name));
                if is_alias {
                    return format!("--{body}").into();
                }
            }
            arg
        })
        .collect()
}

/// Applies every directive in `matches` to `options`, in order.
pub fn apply_matches(
    options: &mut OptimizationOptions,
    matches: &ArgMatches,
) -> Result<(), OptionsError> {
    for occurrence in occurrences(matches, options.directives()) {
        options.apply(&occurrence.name, occurrence.value.as_deref())?;
    }
    Ok(())
}
