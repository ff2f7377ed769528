//! castgraph - character co-occurrence graphs from the command line
//!
//! Builds GraphML character graphs from tagged chapters, writes the CSV
//! submission manifest for whole books and scores NER output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use castgraph_core::config::loader::render_config;
use castgraph_core::config::{load_config, AliasStrategy, ConfigFormat};
use castgraph_core::evaluation::ner_metrics_from_files;
use castgraph_core::graph::SubmissionWriter;
use castgraph_core::ner::GazetteerExtractor;
use castgraph_core::{BatchRunner, ChapterInput, ChapterPipeline, ChapterReport, Config};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};

mod manifest;

use manifest::BooksManifest;

#[derive(Parser)]
#[command(name = "castgraph")]
#[command(version, about = "Character co-occurrence graphs from novel chapters", long_about = None)]
struct Cli {
    /// Configuration file path (TOML, YAML or JSON)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the character graph of one chapter
    Graph {
        #[command(flatten)]
        input: GraphInput,

        /// One character name per line, used with `--text`
        #[arg(long, value_name = "FILE")]
        names: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Write GraphML here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the chapter's mentions as `<PER>`-tagged text, for `evaluate`
        #[arg(long, value_name = "FILE")]
        emit_tagged: Option<PathBuf>,
    },

    /// Write the CSV submission manifest for a set of books
    Submission {
        /// Books manifest (TOML)
        #[arg(short, long, value_name = "FILE")]
        manifest: PathBuf,

        #[command(flatten)]
        overrides: Overrides,

        /// Manifest path, defaults to `output.submission_path`
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Process chapters on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Score `<PER>`-tagged predictions against gold annotations
    Evaluate {
        #[arg(long, value_name = "FILE")]
        predicted: PathBuf,

        #[arg(long, value_name = "FILE")]
        gold: PathBuf,
    },

    /// Print the effective configuration as TOML
    PrintConfig,
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct GraphInput {
    /// JSON dump of tagger output
    #[arg(long, value_name = "FILE")]
    mentions: Option<PathBuf>,

    /// Text with `<PER> … </PER>` tags
    #[arg(long, value_name = "FILE")]
    tagged: Option<PathBuf>,

    /// Raw text, tagged with the names listed in `--names`
    #[arg(long, value_name = "FILE", requires = "names")]
    text: Option<PathBuf>,
}

/// Command line settings layered over the configuration file
#[derive(clap::Args, Default)]
struct Overrides {
    /// Count repeated interactions as edge weight
    #[arg(long)]
    weighted: bool,

    /// Proximity window in tokens
    #[arg(long)]
    window: Option<usize>,

    /// Alias similarity strategy (jaro_winkler, partial_token_sort)
    #[arg(long)]
    strategy: Option<AliasStrategy>,

    /// Match threshold of the chosen strategy
    #[arg(long)]
    threshold: Option<f64>,

    /// Group aliases with the configured Ollama model
    #[arg(long)]
    llm: bool,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if self.weighted {
            config.graph.weighted = true;
        }
        if let Some(window) = self.window {
            config.proximity.window = window;
        }
        if let Some(strategy) = self.strategy {
            config.alias.strategy = strategy;
        }
        if let Some(threshold) = self.threshold {
            match config.alias.strategy {
                AliasStrategy::JaroWinkler => config.alias.jaro_winkler_threshold = threshold,
                AliasStrategy::PartialTokenSort => {
                    config.alias.partial_token_sort_threshold = threshold.round().clamp(0.0, 255.0) as u8
                },
            }
        }
        if self.llm {
            config.llm.enabled = true;
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    setup_logging(cli.debug)?;

    let mut config = match &cli.config {
        Some(path) => load_config(&path.to_string_lossy())?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Graph {
            input,
            names,
            overrides,
            output,
            emit_tagged,
        } => {
            overrides.apply(&mut config);
            let report = run_graph(config, &input, names.as_deref())?;
            if let Some(path) = &emit_tagged {
                write_tagged(&report, path)?;
            }
            write_graphml(&report, output.as_deref())?;
        },
        Commands::Submission {
            manifest,
            overrides,
            output,
            parallel,
        } => {
            overrides.apply(&mut config);
            let rows = run_submission(config, &manifest, output, parallel)?;
            println!("{rows} chapters written");
        },
        Commands::Evaluate { predicted, gold } => {
            let metrics = ner_metrics_from_files(&predicted, &gold)?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        },
        Commands::PrintConfig => {
            println!("{}", render_config(&config, ConfigFormat::Toml)?);
        },
    }

    Ok(())
}

fn run_graph(config: Config, input: &GraphInput, names: Option<&Path>) -> Result<ChapterReport> {
    let mut pipeline = ChapterPipeline::new(config)?;

    let chapter = if let Some(path) = &input.mentions {
        ChapterInput::ner_json_file(path)?
    } else if let Some(path) = &input.tagged {
        ChapterInput::tagged_file(path)?
    } else if let (Some(path), Some(names)) = (&input.text, names) {
        pipeline = pipeline.with_extractor(Arc::new(load_gazetteer(names)?));
        ChapterInput::text_file(path)?
    } else {
        return Err(eyre!("--text needs --names, or use --mentions or --tagged"));
    };

    let report = pipeline.run(chapter)?;
    tracing::info!(
        nodes = report.graph.node_count(),
        edges = report.graph.edge_count(),
        unresolved = report.unresolved.len(),
        "graph built"
    );
    Ok(report)
}

fn load_gazetteer(path: &Path) -> Result<GazetteerExtractor> {
    let names = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading names from {}", path.display()))?;
    Ok(GazetteerExtractor::new(names.lines())?)
}

fn write_graphml(report: &ChapterReport, output: Option<&Path>) -> Result<()> {
    let graphml = report.graph.to_graphml();
    match output {
        Some(path) => {
            std::fs::write(path, graphml)
                .wrap_err_with(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "GraphML written");
        },
        None => println!("{graphml}"),
    }
    Ok(())
}

fn write_tagged(report: &ChapterReport, path: &Path) -> Result<()> {
    std::fs::write(path, report.tagged_text())
        .wrap_err_with(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), mentions = report.mentions.len(), "tagged text written");
    Ok(())
}

fn run_submission(
    config: Config,
    manifest: &Path,
    output: Option<PathBuf>,
    parallel: bool,
) -> Result<usize> {
    let jobs = BooksManifest::load(manifest)?.jobs()?;
    let output = output.unwrap_or_else(|| PathBuf::from(&config.output.submission_path));
    let graphml_dir = Some(config.output.graphml_dir.clone()).filter(|d| !d.is_empty());
    if let Some(dir) = &graphml_dir {
        std::fs::create_dir_all(dir).wrap_err_with(|| format!("creating {dir}"))?;
    }

    let pipeline = ChapterPipeline::new(config)?;
    let runner = BatchRunner::new(&pipeline);
    let results = if parallel {
        run_parallel(&runner, jobs)
    } else {
        runner.run(jobs)
    };

    let mut writer = SubmissionWriter::create(&output)
        .wrap_err_with(|| format!("creating {}", output.display()))?;
    for (id, result) in results {
        let report = result.wrap_err_with(|| format!("chapter {id}"))?;
        writer.write_graph(&id, &report.graph)?;
        if let Some(dir) = &graphml_dir {
            let path = Path::new(dir).join(format!("{id}.graphml"));
            std::fs::write(&path, report.graph.to_graphml())
                .wrap_err_with(|| format!("writing {}", path.display()))?;
        }
    }
    Ok(writer.finish()?)
}

#[cfg(feature = "parallel")]
fn run_parallel(
    runner: &BatchRunner<'_>,
    jobs: Vec<castgraph_core::ChapterJob>,
) -> Vec<(castgraph_core::ChapterId, castgraph_core::Result<ChapterReport>)> {
    runner.run_parallel(jobs)
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    runner: &BatchRunner<'_>,
    jobs: Vec<castgraph_core::ChapterJob>,
) -> Vec<(castgraph_core::ChapterId, castgraph_core::Result<ChapterReport>)> {
    tracing::warn!("built without the `parallel` feature, processing chapters sequentially");
    runner.run(jobs)
}

/// Setup tracing for command output on stderr
fn setup_logging(debug: bool) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = if debug {
        EnvFilter::new("castgraph_cli=debug,castgraph_core=debug")
    } else {
        EnvFilter::new("castgraph_cli=info,castgraph_core=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))?;

    Ok(())
}
