use clap::{Parser, Subcommand};
use pixelsmith::imaging::{CompressionLevel, CropRegion, CropShape};
use pixelsmith::presets::find_preset;
use pixelsmith::{
    CompressOptions, ConversionOptions, Pipeline, SourceFile, TargetFormat, TransformError,
    TransformResult, config, output, result,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared flags for commands that encode an image.
#[derive(clap::Args, Clone)]
struct EncodeArgs {
    /// Output format: png, jpg or webp (default from config)
    #[arg(long, short)]
    format: Option<TargetFormat>,

    /// Lossy quality 0.0-1.0, clamped (default from config)
    #[arg(long, short)]
    quality: Option<f32>,
}

#[derive(Parser)]
#[command(name = "pixelsmith")]
#[command(about = "Convert, compress, resize, crop and cut out images locally")]
#[command(long_about = "\
Convert, compress, resize, crop and cut out images locally

Inputs may be PNG, JPEG, WebP, GIF, BMP, TIFF, SVG, HEIC (feature `heic`)
or PDF (feature `pdf`, first page only). Results are written to the output
directory under a derived name:

  photo.png  convert --format webp   →  photo.webp
  photo.png  resize --width 400      →  photo_400x300.png
  photo.png  remove-bg --format jpg  →  photo_no-bg.jpg

Files are processed in parallel. Outputs that would share a name get a
numeric suffix (photo.png, photo_2.png); existing files are kept unless
--overwrite is given. Set RUST_LOG (or -v) for diagnostics.

Run 'pixelsmith gen-config' to generate a documented pixelsmith.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory results are written to
    #[arg(long, short, default_value = "out", global = true)]
    output_dir: PathBuf,

    /// Replace files left in the output directory by earlier runs
    #[arg(long, global = true)]
    overwrite: bool,

    /// Print one JSON object per file instead of the listing
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode files at their natural size
    Convert {
        files: Vec<PathBuf>,
        #[command(flatten)]
        encode: EncodeArgs,
        /// Rasterization multiplier for SVG and PDF input
        #[arg(long)]
        scale: Option<f32>,
    },
    /// Shrink files towards a size budget
    Compress {
        files: Vec<PathBuf>,
        /// 1 (gentle) to 5 (strong)
        #[arg(long, short, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=5))]
        level: u8,
        /// Output format (default: keep png/jpg/webp, else jpg)
        #[arg(long, short)]
        format: Option<TargetFormat>,
    },
    /// Resize raster files
    Resize {
        files: Vec<PathBuf>,
        #[arg(long, short = 'W')]
        width: Option<u32>,
        #[arg(long, short = 'H')]
        height: Option<u32>,
        /// Named target size (see `pixelsmith presets`)
        #[arg(long, short, conflicts_with_all = ["width", "height"])]
        preset: Option<String>,
        /// Stretch to exactly --width x --height
        #[arg(long)]
        no_aspect_lock: bool,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Make the background transparent
    RemoveBg {
        files: Vec<PathBuf>,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Cut a rectangle or ellipse out of raster files
    Crop {
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = 0)]
        x: u32,
        #[arg(long, default_value_t = 0)]
        y: u32,
        #[arg(long, short = 'W')]
        width: u32,
        #[arg(long, short = 'H')]
        height: u32,
        /// Keep only the ellipse inscribed in the rectangle
        #[arg(long)]
        ellipse: bool,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// List the named resize presets
    Presets,
    /// Print a stock pixelsmith.toml with all options documented
    GenConfig,
}

/// One transform applied to every input file.
enum Job {
    Convert(ConversionOptions),
    Compress(CompressOptions),
    Resize(ConversionOptions),
    RemoveBackground(ConversionOptions),
    Crop(CropRegion, ConversionOptions),
}

impl Job {
    fn run(&self, pipeline: &Pipeline, file: &SourceFile) -> Result<TransformResult, TransformError> {
        match self {
            Job::Convert(opts) => pipeline.convert(file, opts),
            Job::Compress(opts) => pipeline.compress(file, opts),
            Job::Resize(opts) => pipeline.resize(file, opts),
            Job::RemoveBackground(opts) => pipeline.remove_background(file, opts),
            Job::Crop(region, opts) => pipeline.crop_region(file, region, opts),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;
    let defaults = config.conversion_defaults();
    let encoded = |encode: EncodeArgs| {
        let mut opts = defaults;
        if let Some(format) = encode.format {
            opts.target_format = format;
        }
        match encode.quality {
            Some(q) => opts.with_quality(q),
            None => opts,
        }
    };

    let (files, job) = match cli.command {
        Command::Presets => {
            output::print_presets();
            return Ok(());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Convert {
            files,
            encode,
            scale,
        } => {
            let mut opts = encoded(encode);
            if let Some(scale) = scale {
                opts = opts.with_scale_factor(scale);
            }
            (files, Job::Convert(opts))
        }
        Command::Compress {
            files,
            level,
            format,
        } => (
            files,
            Job::Compress(CompressOptions {
                level: CompressionLevel::new(level),
                target_format: format,
            }),
        ),
        Command::Resize {
            files,
            width,
            height,
            preset,
            no_aspect_lock,
            encode,
        } => {
            let mut opts = encoded(encode)
                .with_size(width, height)
                .with_aspect_lock(!no_aspect_lock);
            if let Some(name) = preset {
                let preset = find_preset(&name)
                    .ok_or_else(|| format!("unknown preset {name:?} (see `pixelsmith presets`)"))?;
                if preset.is_custom() {
                    return Err("the Custom preset needs explicit --width/--height".into());
                }
                opts = preset.apply(opts);
            }
            (files, Job::Resize(opts))
        }
        Command::RemoveBg { files, encode } => (files, Job::RemoveBackground(encoded(encode))),
        Command::Crop {
            files,
            x,
            y,
            width,
            height,
            ellipse,
            encode,
        } => {
            let region = CropRegion {
                x,
                y,
                width,
                height,
                shape: if ellipse {
                    CropShape::Ellipse
                } else {
                    CropShape::Rectangle
                },
            };
            (files, Job::Crop(region, encoded(encode)))
        }
    };

    if files.is_empty() {
        return Err("no input files given".into());
    }

    let pipeline = Pipeline::new(config);
    init_thread_pool(&pipeline.config().processing);
    let transformed: Vec<Result<TransformResult, BoxError>> = files
        .par_iter()
        .map(|path| transform_file(&pipeline, &job, path))
        .collect();

    let saved = result::save_all(
        transformed.iter().filter_map(|t| t.as_ref().ok()),
        &cli.output_dir,
        cli.overwrite,
    );
    let mut saved = saved.into_iter();
    let outcomes: Vec<Result<(TransformResult, PathBuf), BoxError>> = transformed
        .into_iter()
        .map(|t| {
            let result = t?;
            match saved.next() {
                Some(Ok(path)) => Ok((result, path)),
                Some(Err(err)) => Err(save_error(err)),
                None => Err("result was not saved".into()),
            }
        })
        .collect();

    let mut failed = 0;
    for (i, (path, outcome)) in files.iter().zip(&outcomes).enumerate() {
        let name = path.display().to_string();
        match outcome {
            Ok((result, saved)) if cli.json => {
                println!("{}", output::format_result_json(&name, result, Some(saved.as_path()))?)
            }
            Ok((result, saved)) => output::print_result(i + 1, &name, result, Some(saved.as_path())),
            Err(err) => {
                failed += 1;
                if cli.json {
                    println!("{}", output::format_failure_json(&name, &**err));
                } else {
                    output::print_failure(i + 1, &name, &**err);
                }
            }
        }
    }

    if !cli.json {
        println!();
        println!("{}", output::format_summary(files.len() - failed, failed));
    }
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Read and transform one file.
fn transform_file(pipeline: &Pipeline, job: &Job, path: &Path) -> Result<TransformResult, BoxError> {
    let file = SourceFile::open(path)?;
    Ok(job.run(pipeline, &file)?)
}

fn save_error(err: std::io::Error) -> BoxError {
    if err.kind() == std::io::ErrorKind::AlreadyExists {
        "output file already exists (pass --overwrite to replace it)".into()
    } else {
        Box::new(err)
    }
}

/// Log to stderr so stdout stays the result listing.
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
