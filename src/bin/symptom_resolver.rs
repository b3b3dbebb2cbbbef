use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use symptom_resolver::llm::EmbeddingProviderFactory;
use symptom_resolver::toolkit::body_parts::BodyPartTable;
use symptom_resolver::toolkit::evaluation::{PredictionRecord, Scorer};
use symptom_resolver::toolkit::ontology::HierarchyLoader;
use symptom_resolver::toolkit::search::ConceptEmbeddingIndex;
use symptom_resolver::{ConceptResolver, ResolverConfig};

#[derive(Parser)]
#[command(name = "symptom-resolver", version, about = "Resolve patient phrases to medical concepts")]
struct Cli {
    /// Configuration file (TOML, JSON or YAML); SYMPTOM_RESOLVER_* variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the concept index for the configured backend, or load it if present.
    BuildIndex,
    /// Resolve one phrase and print the match as JSON.
    Resolve {
        phrase: String,
        /// Restrict the search to the subtrees of this body part.
        #[arg(long)]
        body_part: Option<u32>,
    },
    /// Score a JSON list of {predictions, real_concepts} records.
    Evaluate { predictions: PathBuf },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("warn".parse()?)
                .add_directive("symptom_resolver=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = ResolverConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::BuildIndex => {
            let provider = EmbeddingProviderFactory::from_config(&config)?;
            let hierarchy = HierarchyLoader::load(&config.hierarchy_path)?;
            let path = config.index_path();
            let index = ConceptEmbeddingIndex::build_or_load(&path, &hierarchy, provider.as_ref())?;
            println!("{} rows in {}", index.len(), path.display());
        }
        Command::Resolve { phrase, body_part } => {
            let resolver = ConceptResolver::initialize(&config)?;
            let result = match body_part {
                Some(id) => {
                    let table_path = config
                        .body_parts_path
                        .as_deref()
                        .context("body_parts_path must be configured to search by body part")?;
                    let table = BodyPartTable::load(table_path)?;
                    let part = table
                        .get(id)
                        .with_context(|| format!("unknown body part {id}"))?;
                    resolver.resolve_body_part_token(&phrase, part)
                }
                None => resolver.resolve_symptom_token(&phrase),
            };
            print_json(&result)?;
        }
        Command::Evaluate { predictions } => {
            let json = std::fs::read_to_string(&predictions)
                .with_context(|| format!("cannot read {}", predictions.display()))?;
            let records: Vec<PredictionRecord> = serde_json::from_str(&json)?;
            info!("Evaluating {} records from {}", records.len(), predictions.display());

            let hierarchy = HierarchyLoader::load(&config.hierarchy_path)?;
            let report = Scorer::new(&hierarchy).evaluate(&records);
            print_json(&report)?;
        }
    }

    Ok(())
}
