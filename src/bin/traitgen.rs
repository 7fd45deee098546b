use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "traitgen", version)]
struct Cli {
    /// Verbose run (per-token sampling and render logs).
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate unique tokens, report rarity, and render token images.
    Generate(GenerateArgs),
    /// Validate a config and print how many unique tokens it can produce.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Location of the token config file.
    #[arg(short, long)]
    config: PathBuf,

    /// Base path of the character/trait artwork directories.
    #[arg(short = 'p', long, default_value = ".")]
    base_path: PathBuf,

    /// Skip image generation. Useful to analyze expected output.
    #[arg(short = 'i', long)]
    skip_images: bool,

    /// Skip token analysis.
    #[arg(short = 's', long)]
    skip_analysis: bool,

    /// Seed for the random stream (overrides the config's `seed`).
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many candidate draws instead of sampling forever.
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Render tokens in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel rendering.
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,

    /// Warn and skip tokens whose artwork is missing instead of failing.
    #[arg(long)]
    skip_missing_assets: bool,

    /// Opaque background color (RRGGBB) to flatten images onto; alpha is dropped otherwise.
    #[arg(long, value_parser = parse_rgb_hex)]
    background: Option<[u8; 3]>,

    /// Also write the rarity report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Location of the token config file.
    #[arg(short, long)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<traitgen::Catalog> {
    let config = traitgen::CatalogConfig::load(path)
        .with_context(|| format!("load config '{}'", path.display()))?;
    let catalog = traitgen::Catalog::from_config(&config)
        .with_context(|| format!("validate config '{}'", path.display()))?;
    Ok(catalog)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.config)?;
    println!(
        "ok: size {} of {} possible unique tokens",
        catalog.size,
        catalog.capacity()
    );
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.config)?;

    tracing::info!("generating tokens");
    let mut rng = traitgen::seeded_rng(&catalog, args.seed);
    let opts = traitgen::GenerateOpts {
        max_attempts: args.max_attempts,
    };
    let (set, _stats) = traitgen::generate_unique_set(&catalog, &mut rng, opts)?;

    if !args.skip_analysis {
        let report = traitgen::analyze(&catalog, &set);
        report.log();
        if let Some(path) = &args.report {
            write_report(path, &report)?;
        }
    }

    if args.skip_images {
        return Ok(());
    }

    let layout = traitgen::AssetLayout::new(&args.base_path);
    let opts = traitgen::RenderOpts {
        parallel: args.parallel,
        threads: args.threads,
        skip_missing_assets: args.skip_missing_assets,
        settings: traitgen::RenderSettings {
            background_rgb: args.background,
        },
    };
    let stats = traitgen::render_set(&catalog, &set, &layout, &opts)?;
    eprintln!(
        "wrote {} token images under {}",
        stats.tokens_rendered,
        args.base_path.display()
    );
    Ok(())
}

fn write_report(path: &Path, report: &traitgen::RarityReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir '{}'", parent.display()))?;
    }
    let f = std::fs::File::create(path)
        .with_context(|| format!("create report '{}'", path.display()))?;
    serde_json::to_writer_pretty(f, report)
        .with_context(|| format!("write report '{}'", path.display()))?;
    Ok(())
}

fn parse_rgb_hex(s: &str) -> Result<[u8; 3], String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got '{s}'"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("invalid color '{s}': {e}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
