use anyhow::{Context, bail};
use clap::Parser;
use dict_aggregator::error::Result;
use dict_aggregator::folding::is_punct;
use dict_aggregator::{ArticleMaker, ArticleRequest, Backend, InputPhrase, LookupConfig, MemoryDictionary, Outcome};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

#[derive(Parser, Debug)]
#[command(name = "dict-aggregator")]
#[command(about = "Look a phrase up in several dictionaries at once", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file [default: <config dir>/dict-aggregator/config.toml]
    #[arg(short, long, env = "DICT_AGGREGATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Dictionary file to load in addition to the configured ones
    #[arg(short, long = "dict")]
    dicts: Vec<PathBuf>,

    /// Group to look the phrase up in; unknown ids use every dictionary
    #[arg(short, long, default_value_t = 0)]
    group: u32,

    /// Dictionary id to leave out of the lookup
    #[arg(short, long = "mute")]
    muted: Vec<String>,

    #[arg(long)]
    ignore_diacritics: bool,

    /// Context passed to one dictionary, as ID=TEXT
    #[arg(long = "context", value_parser = parse_context)]
    contexts: Vec<(String, String)>,

    /// Log debug output from the lookup to stderr
    #[arg(short, long)]
    verbose: bool,

    phrase: String,
}

fn parse_context(arg: &str) -> std::result::Result<(String, String), String> {
    arg.split_once('=')
        .map(|(id, text)| (id.to_string(), text.to_string()))
        .ok_or_else(|| format!("expected ID=TEXT, got '{arg}'"))
}

/// Splits trailing punctuation off the phrase.
fn input_phrase(raw: &str) -> InputPhrase {
    let raw = raw.trim();
    let phrase = raw.trim_end_matches(is_punct);
    if phrase.is_empty() {
        return InputPhrase::new(raw);
    }
    InputPhrase::with_suffix(phrase, &raw[phrase.len()..])
}

fn load_dictionaries(paths: &[PathBuf]) -> Vec<Backend> {
    paths
        .iter()
        .filter_map(|path| match MemoryDictionary::load(path) {
            Ok(dictionary) => {
                tracing::debug!("loaded {} entries from {}", dictionary.len(), path.display());
                Some(Arc::new(dictionary) as Backend)
            }
            Err(e) => {
                tracing::warn!("skipping dictionary: {}", e);
                None
            }
        })
        .collect()
}

/// Writes the document to stdout as it grows and returns how the request ended.
async fn stream(request: &ArticleRequest) -> Result<Outcome> {
    let mut stdout = tokio::io::stdout();
    let mut updates = request.subscribe();
    let mut written = 0;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        // Outcome first: once it is set the snapshot below is complete.
        let outcome = request.outcome();
        let snapshot = request.snapshot();
        if snapshot.len() > written {
            stdout.write_all(&snapshot[written..]).await?;
            stdout.flush().await?;
            written = snapshot.len();
        }
        if let Some(outcome) = outcome {
            return Ok(outcome);
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(request.outcome().unwrap_or(Outcome::Cancelled));
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                tracing::info!("interrupted, cancelling lookup");
                request.cancel();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dict_aggregator::tracing::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => LookupConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LookupConfig::load_or_default().context("Failed to load default config")?,
    };

    let mut paths = config.dictionaries.clone();
    paths.extend(cli.dicts.iter().cloned());
    let dictionaries = load_dictionaries(&paths);
    if dictionaries.is_empty() {
        bail!("No dictionaries loaded; pass --dict or list them in the config file");
    }

    let maker = ArticleMaker::from_config(&config, dictionaries)?;

    let mut muted = config.muted.clone();
    muted.extend(cli.muted);

    let phrase = input_phrase(&cli.phrase);
    tracing::info!("looking up {:?}", phrase.phrase);

    let request = maker.make_definition_for(
        phrase,
        cli.group,
        cli.contexts.into_iter().collect(),
        &muted,
        &[],
        cli.ignore_diacritics || config.ignore_diacritics,
    );

    let outcome = stream(&request).await?;
    tracing::info!("lookup {:?}", outcome);

    Ok(())
}
