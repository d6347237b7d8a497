//! sgpatch command line
//!
//! `sgpatch patch Lit.shader` writes `Lit_Patched.shader` next to the input.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sgpatch::resolver::STDIN_PATH;
use sgpatch::{InputWatcher, Patcher};
use sgpatch_config::Config;

/// How long a single watch wait blocks before looping
const WATCH_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "sgpatch")]
#[command(version)]
#[command(about = "Patch shader graph output for indexed-indirect rendering", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.config/sgpatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch shaders or graph assets
    Patch(PatchArgs),

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(clap::Args)]
struct PatchArgs {
    /// Inputs (.shader, .shadergraph, .shadersubgraph, or - for stdin)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Print the patched shader instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Treat unclosed regions as errors
    #[arg(long)]
    strict: bool,

    /// Re-patch inputs whenever they change
    #[arg(long, conflicts_with = "stdout")]
    watch: bool,

    /// Skip the instance id rewrite
    #[arg(long)]
    no_instance_id: bool,

    /// Skip the nointerpolation qualifier
    #[arg(long)]
    no_nointerpolation: bool,

    /// UV0 type (default, uint16, int16, uint, int)
    #[arg(long, value_name = "TYPE")]
    uv0: Option<String>,

    /// UV1 type
    #[arg(long, value_name = "TYPE")]
    uv1: Option<String>,

    /// UV2 type
    #[arg(long, value_name = "TYPE")]
    uv2: Option<String>,

    /// UV3 type
    #[arg(long, value_name = "TYPE")]
    uv3: Option<String>,

    /// Suffix for the shader name and output file
    #[arg(long)]
    suffix: Option<String>,
}

impl PatchArgs {
    /// Command line flags win over the configuration file
    fn apply_to(&self, config: &mut Config) {
        if self.no_instance_id {
            config.patch.instance_id = false;
        }
        if self.no_nointerpolation {
            config.patch.no_interpolation = false;
        }
        for (channel, value) in [&self.uv0, &self.uv1, &self.uv2, &self.uv3].into_iter().enumerate() {
            if let (Some(value), Some(selector)) = (value, config.patch.uv_selector_mut(channel)) {
                *selector = value.clone();
            }
        }
        if let Some(suffix) = &self.suffix {
            config.output.suffix = suffix.clone();
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn,sgpatch=info,sgpatch_core=info,sgpatch_config=info",
        1 => "warn,sgpatch=debug,sgpatch_core=debug,sgpatch_config=debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when at least one input failed
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Patch(args) => {
            let config = load_config(cli.config.as_deref())?;
            patch(config, &args)
        }
        Commands::InitConfig { force } => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::config_file_path()?,
            };
            Config::create_default_config(&path, force)
                .with_context(|| format!("Failed to create {:?}", path))?;
            println!("Wrote {}", path.display());
            Ok(true)
        }
        Commands::ShowConfig => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", config.to_toml_string()?);
            Ok(true)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

fn patch(mut config: Config, args: &PatchArgs) -> Result<bool> {
    args.apply_to(&mut config);
    let patcher = Patcher::from_config(&config, args.strict).context("Invalid configuration")?;

    let mut ok = true;
    for input in &args.inputs {
        ok &= patch_one(&patcher, input, args.stdout);
    }

    if args.watch {
        watch(&patcher, &args.inputs)?;
    }
    Ok(ok)
}

/// Patch a single input, logging failures so the remaining inputs still run
fn patch_one(patcher: &Patcher, input: &Path, to_stdout: bool) -> bool {
    let result = if to_stdout || input.as_os_str() == STDIN_PATH {
        print_patched(patcher, input)
    } else {
        patcher
            .patch_file(input)
            .map(|outcome| println!("{}", outcome.output.display()))
            .map_err(anyhow::Error::from)
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("{:#}", e);
            false
        }
    }
}

fn print_patched(patcher: &Patcher, input: &Path) -> Result<()> {
    let text = patcher.patch_to_string(input)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    stdout.flush()?;
    Ok(())
}

fn watch(patcher: &Patcher, inputs: &[PathBuf]) -> Result<()> {
    let files: Vec<PathBuf> = inputs
        .iter()
        .filter(|p| p.as_os_str() != STDIN_PATH)
        .cloned()
        .collect();
    let mut watcher = InputWatcher::new(&files).context("Failed to start watcher")?;
    log::info!("Watching {} input(s), press Ctrl-C to stop", files.len());

    loop {
        if let Some(changed) = watcher.wait(WATCH_TIMEOUT) {
            log::info!("{:?} changed", changed);
            patch_one(patcher, &changed, false);
        }
    }
}
