use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use herkos_opt::{cli, passes, WasmModule};
use herkos_passes::{OptimizationOptions, PassRunner};
use std::fs;
use std::path::PathBuf;

/// herkos-opt — runs optimization passes over a WebAssembly module.
///
/// Optimization flags apply in the order given: `--strip-producers -O2`
/// strips first, then runs the default pipeline.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Input WebAssembly binary (.wasm)
    input: PathBuf,

    /// Output WebAssembly binary
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Validate the module after every pass
    #[arg(long, short)]
    debug: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let registry = passes::registry()?;
    let mut options = OptimizationOptions::new(&registry)?;
    let args = cli::normalize_args(std::env::args_os(), options.directives());
    let matches = cli::with_directives(Cli::command(), options.directives())?.get_matches_from(args);
    let cli = Cli::from_arg_matches(&matches)?;
    options.set_debug(cli.debug);
    cli::apply_matches(&mut options, &matches)?;

    let bytes =
        fs::read(&cli.input).with_context(|| format!("failed to read {}", cli.input.display()))?;
    let mut module = WasmModule::from_bytes(bytes)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;

    if options.running_passes() {
        log::info!("optimizing {}", cli.input.display());
        options
            .run_passes(&mut module, |pass_options| {
                PassRunner::new(&registry, pass_options.clone())
            })
            .context("optimization failed")?;
    } else {
        log::warn!("no passes specified, not doing any work");
    }

    match cli.output {
        Some(output_path) => {
            fs::write(&output_path, module.into_bytes())
                .with_context(|| format!("failed to write {}", output_path.display()))?;
            log::info!("wrote {}", output_path.display());
        }
        None => log::warn!("no output file specified, not emitting output"),
    }
    Ok(())
}
