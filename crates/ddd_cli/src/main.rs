mod commands;
mod util;

use clap::{Parser, Subcommand};
use ddd_error::DddError;
use ddd_export::AxisRemap;
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ddd", version, about = "Export Blender object matrices to ddd text files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum size to decompress into memory (in MB)
    #[arg(long, global = true, default_value = "256")]
    max_in_memory: usize,

    /// Read files instead of memory-mapping them
    #[arg(long, global = true)]
    no_mmap: bool,

    /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode: suppress explanatory output, show only raw results
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,
}

/// Scene options shared by commands that read a .blend file
#[derive(clap::Args, Debug, Clone, Default)]
struct SceneArgs {
    /// Scene to read (default: the file's current scene)
    #[arg(long)]
    scene: Option<String>,
    /// View layer that decides visibility (default: the first one)
    #[arg(long = "view-layer")]
    view_layer: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the matrices of all visible objects to a ddd file
    Export {
        #[arg(index = 1)]
        file: PathBuf,
        /// Output directory (default: the .blend file's directory)
        #[arg(long)]
        basedir: Option<PathBuf>,
        /// Output file name (default: the .blend file's name)
        #[arg(long)]
        filename: Option<String>,
        #[command(flatten)]
        scene: SceneArgs,
        /// Location axis remap, e.g. "x,z,-y"
        #[arg(long)]
        remap: Option<AxisRemap>,
        /// TOML file with export settings; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List scene objects in export order
    Objects {
        #[arg(index = 1)]
        file: PathBuf,
        #[command(flatten)]
        scene: SceneArgs,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Read an exported ddd file back
    Show {
        #[arg(index = 1)]
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(e) = run_main() {
        use log::error;
        error!("{}", e.user_message());
        std::process::exit(1);
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .format(|buf, record| {
            use std::io::Write;
            let level_style = match record.level() {
                log::Level::Error => "\x1b[31mERROR\x1b[0m",
                log::Level::Warn => "\x1b[33mWARN\x1b[0m",
                log::Level::Info => "\x1b[32mINFO\x1b[0m",
                log::Level::Debug => "\x1b[36mDEBUG\x1b[0m",
                log::Level::Trace => "\x1b[35mTRACE\x1b[0m",
            };

            writeln!(buf, "[{}] {}", level_style, record.args())
        })
        .init();
}

fn run_main() -> Result<(), DddError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("ddd starting with verbosity level: {}", cli.verbose);
    debug!(
        "Parse options: max_in_memory={}MB, no_mmap={}",
        cli.max_in_memory, cli.no_mmap
    );

    let parse_options = util::create_parse_options(cli.max_in_memory, cli.no_mmap);
    let output = util::OutputHandler::new(cli.quiet);
    let ctx = util::CommandContext::new(&parse_options, &output);

    match cli.command {
        Commands::Export {
            file,
            basedir,
            filename,
            scene,
            remap,
            config,
        } => {
            let overrides = ddd_export::ExportConfig {
                basedir,
                filename,
                scene: scene.scene,
                view_layer: scene.view_layer,
                remap,
            };
            commands::cmd_export(file, config, overrides, &ctx)
                .map_err(|e| e.with_command("export"))
        }
        Commands::Objects { file, scene, json } => {
            commands::cmd_objects(file, scene.scene, scene.view_layer, json, &ctx)
                .map_err(|e| e.with_command("objects"))
        }
        Commands::Show { file, json } => {
            commands::cmd_show(file, json, &ctx).map_err(|e| e.with_command("show"))
        }
    }
}
