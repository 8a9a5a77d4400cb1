/**
 * This is the main entrypoint for the `assemble_media` pipeline binary.
 *
 * The binary reads a narration script and a timestamped transcript,
 * extracts keywords, fetches stock media candidates from the configured
 * catalogs, ranks them by relevance to the script via the language
 * model, assigns media to transcript segments, and writes the mapping
 * JSON consumed by the media-editing step.
 */
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use media_mapper::mapper::MappingStrategy;
use media_mapper::scorer::RelevanceScorer;
use media_mapper::{keywords, mapper, output, ranker};
use redact::Secret;
use regex::Regex;
use rf_app::ContextProvider;
use rf_openai::{Completer, CompletionClient, SamplingConfig};
use serde::Deserialize;
use stock_search::{
    PexelsClient, ShutterstockClient, StockCatalog, UnsplashClient,
};
use thiserror::Error;
use types::ScoredMedia;

#[derive(Debug, Deserialize)]
struct Config {
    script_path: PathBuf,
    transcript_path: PathBuf,
    candidate_pool_path: PathBuf,
    mapping_path: PathBuf,

    openai_key: Secret<String>,
    openai_model: String,
    openai_temperature: Option<f32>,
    openai_max_tokens: Option<u32>,

    pexels_api_key: Secret<String>,
    unsplash_access_key: Secret<String>,
    shutterstock_client_id: Secret<String>,
    shutterstock_client_secret: Secret<String>,

    #[serde(default = "default_results_per_keyword")]
    results_per_keyword: u32,
    #[serde(default = "default_max_keywords")]
    max_keywords: usize,
    #[serde(default = "default_max_ranked_items")]
    max_ranked_items: usize,
    #[serde(default = "default_min_score")]
    min_score: u8,
    #[serde(default)]
    mapping_strategy: MappingStrategy,
    score_pattern: Option<String>,
}

const fn default_results_per_keyword() -> u32 {
    5
}

const fn default_max_keywords() -> usize {
    15
}

const fn default_max_ranked_items() -> usize {
    5
}

const fn default_min_score() -> u8 {
    1
}

struct AppContext {
    config: Config,
    completer: CompletionClient,
    catalog: StockCatalog,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config) -> Self {
        let mut sampling = SamplingConfig::new(config.openai_model.clone());
        if let Some(temperature) = config.openai_temperature {
            sampling.temperature = temperature;
        }
        if let Some(max_tokens) = config.openai_max_tokens {
            sampling.max_tokens = max_tokens;
        }

        let completer = CompletionClient::new(
            config.openai_key.expose_secret().clone(),
            sampling,
        );

        let catalog = StockCatalog::new(
            PexelsClient::new(config.pexels_api_key.clone()),
            UnsplashClient::new(config.unsplash_access_key.clone()),
            ShutterstockClient::new(
                config.shutterstock_client_id.clone(),
                config.shutterstock_client_secret.clone(),
            ),
        );

        Self {
            config,
            completer,
            catalog,
        }
    }
}

#[derive(Error, Debug)]
enum PipelineError {
    #[error("failed to read pipeline input: {0}")]
    Io(#[from] std::io::Error),
    #[error("SCORE_PATTERN is not a valid regex: {0}")]
    ScorePattern(#[from] regex::Error),
    #[error(transparent)]
    Output(#[from] output::OutputError),
}

#[tokio::main]
async fn main() {
    let context: AppContext = rf_app::create_app_context()
        .await
        .expect("failed to load config");

    if let Err(e) = run(&context).await {
        tracing::error!("pipeline failed: {e}");
        std::process::exit(1);
    }
}

async fn run(context: &AppContext) -> Result<(), PipelineError> {
    let config = &context.config;

    // A bad score pattern is a configuration mistake; fail before any
    // catalog or model traffic.
    let scorer = match &config.score_pattern {
        Some(pattern) => RelevanceScorer::with_pattern(
            &context.completer,
            Regex::new(pattern)?,
        ),
        None => RelevanceScorer::new(&context.completer),
    };

    let script_text = std::fs::read_to_string(&config.script_path)?;
    let transcript = File::open(&config.transcript_path)?;
    let segments = types::parse_transcript(BufReader::new(transcript))?;

    if segments.is_empty() {
        tracing::warn!(
            "transcript {path} has no segments; the mapping will be empty",
            path = config.transcript_path.display()
        );
    }

    let keywords = gather_keywords(
        &context.completer,
        &script_text,
        config.max_keywords,
    )
    .await;
    tracing::info!(
        "searching stock catalogs with {count} keywords",
        count = keywords.len()
    );

    let pool = context
        .catalog
        .search_all(&keywords, config.results_per_keyword)
        .await;
    tracing::info!(
        "fetched {count} candidates from all catalogs",
        count = pool.len()
    );
    output::write_candidate_pool(&pool, &config.candidate_pool_path)?;

    let mut scored: Vec<ScoredMedia> = Vec::new();
    for candidate in &pool {
        match scorer.score(&script_text, candidate).await {
            Ok(Some(item)) => scored.push(item),
            Ok(None) => tracing::warn!(
                "unparseable relevance reply for candidate {id}, \
                 excluding it",
                id = candidate.id
            ),
            Err(e) => tracing::error!(
                "failed to score candidate {id}: {e}",
                id = candidate.id
            ),
        }
    }

    let ranked = ranker::rank(scored, config.max_ranked_items);
    tracing::info!("ranked {count} candidates", count = ranked.len());

    let assignments = match config.mapping_strategy {
        MappingStrategy::IndexCycling => {
            mapper::assign_cycling(&segments, &ranked)
        }
        MappingStrategy::GreedyConsume => {
            mapper::assign_greedy(
                &segments,
                ranked,
                &scorer,
                &script_text,
                config.min_score,
            )
            .await
        }
    };

    output::write_mapping(&assignments, &config.mapping_path)?;
    tracing::info!(
        "wrote mapping for {count} segments to {path}",
        count = assignments.len(),
        path = config.mapping_path.display()
    );

    Ok(())
}

/// Keyword refinement via the language model, falling back to naive
/// extraction when the model is unavailable or replies with nothing.
async fn gather_keywords<C: Completer>(
    completer: &C,
    script_text: &str,
    max_keywords: usize,
) -> Vec<String> {
    match keywords::refine_keywords(completer, script_text, max_keywords)
        .await
    {
        Ok(refined) if !refined.is_empty() => refined,
        Ok(_) => {
            tracing::warn!(
                "keyword refinement produced nothing; using naive \
                 extraction"
            );
            naive_keywords(script_text, max_keywords)
        }
        Err(e) => {
            tracing::warn!(
                "keyword refinement failed ({e}); using naive extraction"
            );
            naive_keywords(script_text, max_keywords)
        }
    }
}

fn naive_keywords(script_text: &str, max_keywords: usize) -> Vec<String> {
    let mut extracted = keywords::extract_keywords(script_text);
    extracted.truncate(max_keywords);
    extracted
}
