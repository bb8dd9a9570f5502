use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use feedback_aspect_sentiment::aspects::keywords_for;
use feedback_aspect_sentiment::config::{resolve_model_path, HeuristicsConfig};
use feedback_aspect_sentiment::ingest::load_feedback;
use feedback_aspect_sentiment::report::{build_report, BatchRun};
use feedback_aspect_sentiment::{categorize, training, Aspect, ClassifierHandle, FeedbackAnalyzer};

#[derive(Parser)]
#[command(name = "feedback-sentiment")]
#[command(about = "Aspect-based sentiment analysis for student feedback", long_about = None)]
struct Cli {
    /// Model artifact (falls back to FEEDBACK_MODEL_PATH, then model/sentiment_model.json)
    #[arg(long, global = true)]
    model: Option<PathBuf>,
    /// JSON file overriding thresholds and lexicon tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single piece of feedback
    #[command(group(
        ArgGroup::new("input")
            .args(["text", "file"])
            .required(true)
            .multiple(false)
    ))]
    Analyze {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Analyze every row of a CSV or Excel file and write a markdown report
    Batch {
        /// .csv, or .xlsx/.xls/.ods (first worksheet)
        #[arg(long, visible_alias = "csv")]
        input: PathBuf,
        /// Feedback column header; detected from common names when omitted
        #[arg(long)]
        column: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long)]
        csv_out: Option<PathBuf>,
        #[arg(long, default_value_t = 4)]
        workers: usize,
    },
    /// Train the classifier and save the artifact
    Train {
        /// Labelled `text,label` CSV; the bundled dataset when omitted
        #[arg(long)]
        data: Option<PathBuf>,
        /// Where to write the artifact; the resolved model path when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the aspect keyword table
    Keywords {
        #[arg(long)]
        aspect: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let model_path = resolve_model_path(cli.model);
    let heuristics = match &cli.config {
        Some(path) => HeuristicsConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => HeuristicsConfig::default(),
    };

    match cli.command {
        Commands::Analyze { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => bail!("either --text or --file is required"),
            };

            let handle = Arc::new(ClassifierHandle::new(&model_path));
            let analyzer = FeedbackAnalyzer::from_config(handle, &heuristics)?;
            let analysis = analyzer
                .analyze(&text)
                .context("sentiment model is unavailable")?;
            let category = categorize(&text, &analysis.aspects);
            let contrast = analyzer.resolver().lexicon().has_contrast_connector(&text);

            println!(
                "{} {} ({:.1}% confidence), score {:+.2}",
                analysis.overall.label.emoji(),
                analysis.overall.label,
                analysis.overall.confidence * 100.0,
                analysis.overall_score
            );
            println!("Category: {} - {}", category.label, category.description);
            println!("Contrast connector: {}", if contrast { "yes" } else { "no" });
            for result in &analysis.aspect_results {
                println!(
                    "- {} {}: {} ({:.1}%)",
                    result.aspect.icon(),
                    result.aspect,
                    result.sentiment,
                    result.confidence * 100.0
                );
            }
        }
        Commands::Batch {
            input,
            column,
            out,
            json,
            csv_out,
            workers,
        } => {
            let rows = load_feedback(&input, column.as_deref())
                .with_context(|| format!("failed to load {}", input.display()))?;
            if rows.texts.is_empty() {
                println!("No feedback rows found in {}.", input.display());
                return Ok(());
            }

            let handle = Arc::new(ClassifierHandle::new(&model_path));
            // Load or train before fanning out.
            handle.model().context("sentiment model is unavailable")?;
            let analyzer = Arc::new(FeedbackAnalyzer::from_config(handle, &heuristics)?);
            let analyses = analyzer.analyze_batch_concurrent(rows.texts, workers).await?;

            let run = BatchRun::new(input.display().to_string(), analyses);
            std::fs::write(&out, build_report(&run))?;
            println!(
                "Analyzed {} comments from column '{}' ({} skipped). Report written to {}.",
                run.summary.total,
                rows.column,
                rows.skipped,
                out.display()
            );

            if let Some(path) = json {
                run.write_json(&path)?;
                println!("JSON written to {}.", path.display());
            }
            if let Some(path) = csv_out {
                run.write_results_csv(&path)?;
                println!("Results written to {}.", path.display());
            }
        }
        Commands::Train { data, out } => {
            let examples = match &data {
                Some(path) => training::load_examples(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => training::bundled_examples()?,
            };
            let report = training::train(&examples)?;
            let out = out.unwrap_or(model_path);
            report.model.save(&out)?;

            println!(
                "Trained on {} examples, evaluated on {}: accuracy {:.2}%",
                report.train_size,
                report.test_size,
                report.accuracy * 100.0
            );
            for (label, metrics) in &report.per_label {
                println!(
                    "- {}: precision {:.2} recall {:.2} f1 {:.2} (support {})",
                    label, metrics.precision, metrics.recall, metrics.f1, metrics.support
                );
            }
            println!("Model saved to {}.", out.display());
        }
        Commands::Keywords { aspect } => {
            let selected: Vec<Aspect> = match aspect {
                Some(name) => match Aspect::parse(&name) {
                    Some(aspect) => vec![aspect],
                    None => bail!("unknown aspect '{name}'"),
                },
                None => Aspect::ALL.to_vec(),
            };
            for aspect in selected {
                println!("{} {}: {}", aspect.icon(), aspect, keywords_for(aspect).join(", "));
            }
        }
    }

    Ok(())
}
