use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simid_core::{
    render_svg, run, FileType, Palette, PairwiseTable, SimilarityReport, SimilarityRequest,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const VERSION_LONG: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (formats: ",
    env!("SIMID_FORMATS"),
    ")"
);

const DEFAULT_CONFIG: &str = "simid.toml";

#[derive(Parser, Debug)]
#[command(
    name = "simid",
    version = VERSION,
    long_version = VERSION_LONG,
    about = "Pairwise TF-IDF similarity for Indonesian documents"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the pairwise similarity table
    Compare {
        directory: PathBuf,
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Write the similarity heatmap as SVG
    Heatmap {
        directory: PathBuf,
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(short = 'o', long = "out", default_value = "heatmap.svg")]
        out: PathBuf,
        #[arg(long)]
        palette: Option<String>,
    },
    /// List the highest-weighted TF-IDF terms of every document
    Terms {
        directory: PathBuf,
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct CorpusArgs {
    #[arg(long = "file-type")]
    file_type: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_stem")]
    stem: bool,
    #[arg(long = "no-stem", action = ArgAction::SetTrue)]
    no_stem: bool,
}

#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    #[serde(default)]
    defaults: Defaults,
}

#[derive(Debug, Deserialize)]
struct Defaults {
    #[serde(default)]
    file_type: FileType,
    #[serde(default = "default_stem")]
    stem: bool,
    #[serde(default)]
    palette: Palette,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            file_type: FileType::default(),
            stem: default_stem(),
            palette: Palette::default(),
        }
    }
}

fn default_stem() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = load_config(&config_path)?;

    match cli.command {
        Commands::Compare {
            directory,
            corpus,
            format,
        } => {
            let format = parse_format(&format)?;
            let report = run(&resolve_request(&directory, &corpus, &config.defaults)?)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            match format {
                OutputFormat::Table => write_table(&mut out, &report.table)?,
                OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
                OutputFormat::Csv => write_csv(&mut out, &report.table)?,
            }
        }
        Commands::Heatmap {
            directory,
            corpus,
            out,
            palette,
        } => {
            let palette = match palette {
                Some(name) => name.parse::<Palette>()?,
                None => config.defaults.palette,
            };
            let report = run(&resolve_request(&directory, &corpus, &config.defaults)?)?;
            let svg = render_svg(&report.files, &report.table, palette);
            fs::write(&out, svg)
                .with_context(|| format!("failed to write heatmap {}", out.display()))?;
            info!(out = %out.display(), palette = palette.label(), "heatmap written");
        }
        Commands::Terms {
            directory,
            corpus,
            top,
        } => {
            let report = run(&resolve_request(&directory, &corpus, &config.defaults)?)?;
            let stdout = io::stdout();
            write_terms(&mut stdout.lock(), &report, top)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents).map_err(|e| anyhow!("invalid config: {e}"))
}

fn resolve_request(
    directory: &Path,
    args: &CorpusArgs,
    defaults: &Defaults,
) -> Result<SimilarityRequest> {
    let file_type = match args.file_type.as_deref() {
        Some(value) => value.parse::<FileType>()?,
        None => defaults.file_type,
    };
    let stem = if args.stem {
        true
    } else if args.no_stem {
        false
    } else {
        defaults.stem
    };
    Ok(SimilarityRequest::new(directory, file_type).stem(stem))
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    match value.to_lowercase().as_str() {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        "csv" => Ok(OutputFormat::Csv),
        other => bail!("unknown output format {other}"),
    }
}

fn write_table<W: Write>(out: &mut W, table: &PairwiseTable) -> Result<()> {
    let width_a = table
        .iter()
        .map(|row| row.a.chars().count())
        .max()
        .unwrap_or(0)
        .max(1);
    let width_b = table
        .iter()
        .map(|row| row.b.chars().count())
        .max()
        .unwrap_or(0)
        .max(1);
    writeln!(out, "{:<width_a$}  {:<width_b$}  {:>7}", "a", "b", "score")?;
    for row in table.iter() {
        writeln!(
            out,
            "{:<width_a$}  {:<width_b$}  {:>7.2}",
            row.a, row.b, row.score
        )?;
    }
    Ok(())
}

fn write_csv<W: Write>(out: &mut W, table: &PairwiseTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["a", "b", "score"])?;
    for row in table.iter() {
        let score = format!("{:.2}", row.score);
        writer.write_record([row.a.as_str(), row.b.as_str(), score.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_terms<W: Write>(out: &mut W, report: &SimilarityReport, top: usize) -> Result<()> {
    writeln!(
        out,
        "{} documents, {} terms",
        report.files.len(),
        report.features.n_features()
    )?;
    for (idx, file) in report.files.iter().enumerate() {
        let terms = report.features.top_terms(idx, top);
        let rendered: Vec<String> = terms
            .iter()
            .map(|(term, weight)| format!("{term} ({weight:.3})"))
            .collect();
        writeln!(out, "{file}: {}", rendered.join(", "))?;
    }
    Ok(())
}
