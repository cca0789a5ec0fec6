use clap::{Parser, Subcommand};
use image_downsampler::output::RunLog;
use image_downsampler::{config, output, process};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-downsampler")]
#[command(about = "Batch-downsample a directory of images to several target DPIs")]
#[command(long_about = "\
Batch-downsample a directory of images to several target DPIs

Every JPEG, PNG, TIFF and BMP file directly inside the source directory is
decoded once and written again at each configured target resolution:

  tmp/source/photo.jpg
    → tmp/source_images_72dpi/photo_72dpi.jpg
    → tmp/source_images_300dpi/photo_300dpi.jpg

Targets above an image's own resolution are skipped. Images without an
embedded resolution are assumed to be at source.default_dpi.

Run 'image-downsampler gen-config' to generate a documented downsample.toml.")]
#[command(version)]
struct Cli {
    /// Source directory
    #[arg(long, default_value = "tmp/source", global = true)]
    source: PathBuf,

    /// Config file (default: ./downsample.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Downsample every image in the source directory
    Run {
        /// Also write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Log to stdout only, leave the run log file untouched
        #[arg(long)]
        no_log_file: bool,
    },
    /// Show what a run would produce without decoding or writing anything
    Check,
    /// Print a stock downsample.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            report,
            no_log_file,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            if config.processing.parallel {
                init_thread_pool(&config.processing);
            }

            let mut log = if no_log_file {
                RunLog::stdout_only()
            } else {
                RunLog::create(&config.log.file)?
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    log.write_event(&event);
                }
            });
            let result = process::process(&cli.source, &config, Some(tx));
            printer.join().map_err(|_| "log printer thread panicked")?;
            let run = result?;

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&run)?;
                std::fs::write(&path, json)?;
            }
        }
        Command::Check => {
            let config = config::load_config(cli.config.as_deref())?;
            let planned = process::plan(&cli.source, &config)?;
            output::print_plan(&planned);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
