use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lemma_translate::{
    CaseFolding, DiskCache, FailurePolicy, LexiconDir, Mode, Settings, Translator, YandexClient,
};
use reqwest::Client;
use tracing::{info, warn};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Overall per-request timeout covering connect and response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Translate words through one or more dictionary backends and print the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "lemma-translate", version)]
struct Args {
    /// Words to translate
    #[arg(required = true)]
    words: Vec<String>,

    /// Backend, or '+'-joined backends: w2w, yandex, yandex_syns
    #[arg(short, long, default_value = "w2w")]
    mode: String,

    /// Source language code
    #[arg(long, default_value = "en")]
    src: String,

    /// Destination language code
    #[arg(long, default_value = "es")]
    dst: String,

    /// Result cache directory (overrides LEMMA_TRANSLATE_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Directory of <src>-<dst>.tsv lexicons (overrides LEMMA_TRANSLATE_LEXICON_DIR)
    #[arg(long)]
    lexicon_dir: Option<PathBuf>,

    /// Lowercase words before deduplication, so `Run` and `run` are one query
    #[arg(long)]
    fold_case: bool,

    /// Record failed remote lookups as untranslated instead of aborting
    #[arg(long)]
    record_empty: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lemma_translate=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mode: Mode = args.mode.parse()?;

    let mut settings = Settings::from_env();
    if let Some(dir) = args.cache_dir {
        settings.cache_dir = dir;
    }
    if args.lexicon_dir.is_some() {
        settings.lexicon_dir = args.lexicon_dir;
    }
    if args.fold_case {
        settings.case_folding = CaseFolding::Lower;
    }
    if args.record_empty {
        settings.on_error = FailurePolicy::RecordEmpty;
    }

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let mut translator: Translator<LexiconDir, YandexClient, DiskCache> =
        Translator::new(DiskCache::new(&settings.cache_dir))
            .case_folding(settings.case_folding)
            .on_error(settings.on_error);
    if let Some(dir) = &settings.lexicon_dir {
        translator = translator.with_lexicons(LexiconDir::new(dir));
    }
    match YandexClient::from_env(http) {
        Ok(client) => translator = translator.with_dictionary(client),
        Err(e) if mode.backends().iter().any(|b| b.is_remote()) => {
            warn!("dictionary client not available: {e}");
        }
        Err(_) => {}
    }

    let result = translator
        .translate_with(&args.words, &mode, &args.src, &args.dst)
        .await
        .inspect_err(|e| tracing::error!("translation failed: {e}"))?;

    info!(
        total_queries = result.total_queries,
        not_translated = result.not_translated,
        "done"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
