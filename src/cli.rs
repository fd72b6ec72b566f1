use clap::Parser;

use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::{path::Path, sync::mpsc::channel, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::constants::BASE_PADDING;
use crate::errors::{Error, Result};
use crate::{route_file, OutputFormat, RouterConfig, SearchStrategy};

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about=None)] // Read from Cargo.toml
struct Arguments {
    /// JSON request file to process ('-' for stdin)
    #[arg(default_value = "-")]
    file: String,

    /// Target output file ('-' for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Watch file for changes; update output on change. (FILE must be given)
    #[arg(short, long, requires = "file")]
    watch: bool,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Path search strategy
    #[arg(long, default_value = "astar")]
    strategy: SearchStrategy,

    /// Clearance around the side a connector leaves a shape (user-units)
    #[arg(long, default_value_t = BASE_PADDING)]
    padding: f64,

    /// Log filter, e.g. 'debug' or 'elbowdx=trace'. Overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

/// Top-level configuration used by the `elbowdx` command-line process.
///
/// This is typically derived from command line arguments and passed to `run()`.
///
/// 'front-end' program settings (e.g. input/output filenames, whether to continually
/// process input on change, etc) are stored directly in this struct. Routing
/// ('back-end') settings are stored in the embedded `RouterConfig` struct.
#[derive(Clone)]
pub struct Config {
    /// Path to input file, or '-' for stdin
    pub input_path: String,
    /// Path to output file, or '-' for stdout
    pub output_path: String,
    /// Stay monitoring `input_path` for changes (Requires input_path is not stdin)
    pub watch: bool,
    pub format: OutputFormat,
    /// Log filter directive, if given on the command line
    pub log: Option<String>,
    /// routing config options
    pub router: RouterConfig,
}

impl Config {
    fn from_args(args: Arguments) -> Result<Self> {
        if args.watch && args.file == "-" {
            // Should already be enforced by clap validation
            return Err(Error::Cli(
                "A non-stdin file must be provided with -w/--watch argument".into(),
            ));
        }
        if args.file != "-" && args.output != "-" {
            // Arguably creating this struct shouldn't do any IO, but this is a
            // deliberate UX safety restriction on the CLI.
            let in_path = Path::new(&args.file);
            let out_path = Path::new(&args.output);
            if out_path.exists()
                && out_path.canonicalize().map_err(Error::from_err)?
                    == in_path.canonicalize().map_err(Error::from_err)?
            {
                return Err(Error::Cli(
                    "Output path must not refer to the same file as the input file.".into(),
                ));
            }
        }
        if !args.padding.is_finite() || args.padding < 0. {
            return Err(Error::Cli(format!(
                "Padding must be a non-negative number, got {}",
                args.padding
            )));
        }
        Ok(Self {
            input_path: args.file,
            output_path: args.output,
            watch: args.watch,
            format: args.format,
            log: args.log,
            router: RouterConfig {
                base_padding: args.padding,
                strategy: args.strategy,
                ..Default::default()
            },
        })
    }

    /// Create a `Config` object set up given a command line string.
    ///
    /// The string is parsed using `shlex::split()`, so values containing
    /// spaces or quotes should be quoted or escaped appropriately.
    pub fn from_cmdline(args: &str) -> Result<Self> {
        let args = shlex::split(args).unwrap_or_default();
        let args = Arguments::try_parse_from(args.iter()).map_err(Error::from_err)?;
        Self::from_args(args)
    }
}

/// Create a `Config` object from process arguments.
pub fn get_config() -> Result<Config> {
    let args = Arguments::parse();
    Config::from_args(args)
}

/// Send log output to stderr, filtered by `filter` or else `RUST_LOG`.
fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // a subscriber may already be installed, e.g. when run from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the `elbowdx` program with a given `Config`.
pub fn run(config: Config) -> Result<()> {
    init_logging(config.log.as_deref());

    if !config.watch {
        route_file(
            &config.input_path,
            &config.output_path,
            config.format,
            &config.router,
        )?;
    } else if config.input_path != "-" {
        let watch = config.input_path;
        let (tx, rx) = channel();
        let mut watcher = new_debouncer(Duration::from_millis(250), tx).map_err(Error::from_err)?;
        let watch_path = Path::new(&watch);
        watcher
            .watcher()
            .watch(Path::new(&watch), RecursiveMode::NonRecursive)
            .map_err(Error::from_err)?;
        route_file(&watch, &config.output_path, config.format, &config.router).unwrap_or_else(
            |e| {
                eprintln!("routing failed: {e}");
            },
        );
        eprintln!("Watching {watch} for changes");
        loop {
            match rx.recv() {
                Ok(Ok(events)) => {
                    for event in events {
                        if event.path.canonicalize().map_err(Error::Io)?
                            == watch_path.canonicalize().map_err(Error::Io)?
                        {
                            eprintln!("{} changed", event.path.to_string_lossy());
                            route_file(&watch, &config.output_path, config.format, &config.router)
                                .unwrap_or_else(|e| {
                                    eprintln!("routing failed: {e}");
                                });
                        }
                    }
                }
                Ok(Err(e)) => eprintln!("Watch error {e:?}"),
                Err(e) => eprintln!("Channel error: {e:?}"),
            }
        }
    }

    Ok(())
}
