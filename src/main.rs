use clap::{Parser, Subcommand};
use image_captions::{config, import, output, record::CaptionedImage};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-captions")]
#[command(about = "Caption and EXIF/IPTC metadata extraction for images")]
#[command(long_about = "\
Caption and EXIF/IPTC metadata extraction for images

Reads the IPTC block (headline, caption, credit, byline, keywords, ...) and
the EXIF block (camera, lens, exposure, GPS) of JPEG and TIFF files and turns
them into captioned image records.

Field mapping:
  Title, alt:    IPTC headline (file name when absent)
  Caption:       IPTC caption, wrapped in <p> markup unless already marked up
  Usage terms:   IPTC special instructions
  Camera, lens:  EXIF Make/Model, LensMake/LensModel
  Exposure:      EXIF ExposureTime, ApertureValue (f/4.00), ISO (400ISO)
  Location:      EXIF GPS block, as signed decimal degrees

Set RUST_LOG (e.g. RUST_LOG=info) for extraction diagnostics on stderr.
Run 'image-captions gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: config.toml in the imported directory, if any)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the record each image would produce
    Inspect {
        /// JPEG or TIFF files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Build records for every image in a directory, skipping duplicates
    Import {
        /// Directory to import
        dir: PathBuf,
        /// Write the manifest JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Inspect { files, json } => {
            let config = resolve_config(cli.config.as_deref(), None)?;
            let mut records = Vec::with_capacity(files.len());
            for path in &files {
                records.push((path, inspect_file(path, &config)?));
            }
            if json {
                let value: Vec<_> = records
                    .iter()
                    .map(|(path, image)| serde_json::json!({ "source": path, "image": image }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for (i, (path, image)) in records.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    output::print_inspect_output(i + 1, path, image);
                }
            }
        }
        Command::Import { dir, output: out } => {
            let config = resolve_config(cli.config.as_deref(), Some(&dir))?;
            init_thread_pool(&config.processing);
            let manifest = import::import_dir(&dir, &config)?;
            let json = serde_json::to_string_pretty(&manifest)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    output::print_import_output(&manifest, &dir);
                }
                None => println!("{}", json),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// An explicit `--config` wins; otherwise look for `config.toml` in the
/// directory being imported, falling back to stock defaults.
fn resolve_config(
    explicit: Option<&Path>,
    dir: Option<&Path>,
) -> Result<config::Config, config::ConfigError> {
    match (explicit, dir) {
        (Some(path), _) => config::load_config_file(path),
        (None, Some(dir)) => config::load_config(dir),
        (None, None) => Ok(config::Config::default()),
    }
}

fn inspect_file(
    path: &Path,
    config: &config::Config,
) -> Result<CaptionedImage, Box<dyn std::error::Error>> {
    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut reader = BufReader::new(File::open(path)?);
    Ok(CaptionedImage::create(title, &mut reader, config.extract.exif)?)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
