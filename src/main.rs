use anyhow::Context;
use clap::{Parser, Subcommand};
use dedup_store::{record_used, JsonFileStore, KeySetStore, SqliteStore};
use llm_interface::{summarize_with_budget, ChatCompletionProvider, ReduceConfig};
use notifier::{NoopNotifier, NotifySink, SlackNotifier};
use runtime_client::{JobRuntime, RuntimeApiClient, RunRequest};
use scheduler::{plan, CurateOptions, CuratePass, Dispatcher, DEFAULT_BASE_DELAY_SECONDS};
use serde::{Deserialize, Serialize};
use soapbox_core::{Bucket, DispatchMode, RawItem, RunConfigurable};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:54367";

/// Job that ingests source material (Slack history or explicit links)
/// before generation.
const INGEST_DATA_JOB: &str = "ingest_data";

#[derive(Parser)]
#[command(name = "soapbox", version, about = "Schedules social posts through the job runtime")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create generate-post runs for the URLs listed in config.json
    Post {
        /// Directory holding config.json and used-urls.json
        #[arg(long, default_value = ".")]
        config_dir: PathBuf,

        /// Spacing between posts; 0 fires them all immediately
        #[arg(long, default_value_t = 0)]
        base_delay_seconds: u64,
    },
    /// Create a single ingest run to backfill historical data
    Backfill {
        /// Explicit links to ingest instead of pulling channel history
        #[arg(long = "link")]
        links: Vec<String>,

        /// How many days of history to ingest
        #[arg(long, default_value_t = 7)]
        max_days_history: u32,
    },
    /// Summarize a large text file through the budgeted map-reduce pass
    Summarize {
        /// Text file to summarize
        #[arg(long)]
        file: PathBuf,

        /// Token budget per one-minute window
        #[arg(long, default_value_t = 6_000)]
        tokens_per_minute: u64,
    },
    /// Run one curation pass over raw items from a JSON file
    Curate {
        /// JSON file holding the raw items to schedule
        #[arg(long)]
        items: PathBuf,

        /// "single" or "multiple"
        #[arg(long, default_value = "multiple")]
        mode: DispatchMode,

        /// Spacing between scheduled posts
        #[arg(long, default_value_t = DEFAULT_BASE_DELAY_SECONDS)]
        base_delay_seconds: u64,

        /// Dedup store database URL
        #[arg(long, default_value = "sqlite://soapbox.db?mode=rwc")]
        db: String,
    },
}

/// The `config.json` surface: which URLs to post and how to batch them.
#[derive(Debug, Serialize, Deserialize)]
struct PostingConfig {
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    mode: DispatchMode,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            urls: vec!["https://example.com/1".to_string()],
            mode: DispatchMode::Single,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| tracing_subscriber::EnvFilter::new("soapbox=info,scheduler=info,runtime_client=info"),
        ))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Post {
            config_dir,
            base_delay_seconds,
        } => post(&config_dir, base_delay_seconds).await,
        Command::Backfill {
            links,
            max_days_history,
        } => backfill(links, max_days_history).await,
        Command::Summarize {
            file,
            tokens_per_minute,
        } => summarize(&file, tokens_per_minute).await,
        Command::Curate {
            items,
            mode,
            base_delay_seconds,
            db,
        } => curate(&items, mode, base_delay_seconds, &db).await,
    }
}

fn api_url() -> String {
    std::env::var("SOAPBOX_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Reads `config.json`, creating an editable template on first run.
fn load_or_init_config(config_dir: &Path) -> anyhow::Result<Option<PostingConfig>> {
    let path = config_dir.join("config.json");
    if !path.exists() {
        let template = serde_json::to_string_pretty(&PostingConfig::default())?;
        std::fs::write(&path, template)
            .with_context(|| format!("writing {}", path.display()))?;
        println!(
            "Created {} template. Please edit it and re-run.",
            path.display()
        );
        return Ok(None);
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: PostingConfig =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config))
}

async fn post(config_dir: &Path, base_delay_seconds: u64) -> anyhow::Result<()> {
    let Some(config) = load_or_init_config(config_dir)? else {
        return Ok(());
    };

    for url in &config.urls {
        if Url::parse(url).is_err() {
            warn!(%url, "Configured URL does not parse; posting it anyway");
        }
    }

    // Drop URLs that were already posted in an earlier run.
    let store = JsonFileStore::new(config_dir);
    let used = store.get(Bucket::UsedUrls).await?;
    let new_urls: Vec<String> = config
        .urls
        .iter()
        .filter(|url| !used.contains(*url))
        .cloned()
        .collect();

    if new_urls.is_empty() {
        println!("No new URLs to post. All URLs have already been used.");
        return Ok(());
    }

    let client = RuntimeApiClient::new(api_url());
    let configurable = RunConfigurable::default()
        .with_text_only_mode(false)
        .skipping_checks();

    let schedule = plan(&new_urls, base_delay_seconds);
    let outcome = Dispatcher::new(&client)
        .dispatch(&schedule, config.mode, &configurable)
        .await;

    // Only accepted links count as used; a rejected one is retried next run.
    record_used(&store, Bucket::UsedUrls, outcome.accepted_links.clone()).await?;

    match config.mode {
        DispatchMode::Single if !outcome.accepted_links.is_empty() => {
            println!("Created one post for all URLs: {:?}", outcome.accepted_links);
        }
        DispatchMode::Single => {}
        DispatchMode::Multiple => {
            for link in &outcome.accepted_links {
                println!("Created post for URL: {link}");
            }
        }
    }

    if outcome.failed > 0 {
        println!(
            "Dispatched {} of {} planned run(s); {} failed.",
            outcome.handles.len(),
            outcome.planned,
            outcome.failed
        );
    } else {
        println!("Dispatched {} run(s).", outcome.handles.len());
    }

    Ok(())
}

async fn backfill(links: Vec<String>, max_days_history: u32) -> anyhow::Result<()> {
    let client = RuntimeApiClient::new(api_url());

    let mut configurable = RunConfigurable::default().skipping_checks();
    configurable.extra.insert(
        "maxDaysHistory".to_string(),
        serde_json::json!(max_days_history),
    );

    let input = if links.is_empty() {
        serde_json::json!({})
    } else {
        // Explicit links skip the channel-history ingestion entirely.
        configurable
            .extra
            .insert("skipIngest".to_string(), serde_json::json!(true));
        serde_json::json!({ "links": links })
    };

    let thread_id = client.create_thread().await?;
    let request = RunRequest::new(input).with_configurable(configurable);
    let run_id = client
        .create_run(&thread_id, INGEST_DATA_JOB, request)
        .await?;

    println!("Created backfill run {run_id} on thread {thread_id}");
    Ok(())
}

async fn summarize(file: &Path, tokens_per_minute: u64) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;

    let provider = ChatCompletionProvider::from_env()?;
    let config = ReduceConfig {
        tokens_per_minute,
        ..ReduceConfig::default()
    };

    let report = summarize_with_budget(
        &provider,
        "You write a concise, factual report of the provided content.",
        &text,
        &config,
    )
    .await?;

    println!("{report}");
    Ok(())
}

async fn curate(
    items_path: &Path,
    mode: DispatchMode,
    base_delay_seconds: u64,
    db: &str,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(items_path)
        .with_context(|| format!("reading {}", items_path.display()))?;
    let items: Vec<RawItem> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", items_path.display()))?;

    let store = SqliteStore::connect(db).await?;
    let client = RuntimeApiClient::new(api_url());

    let sink: Box<dyn NotifySink> = match SlackNotifier::from_env() {
        Some(slack) => {
            info!(channel = slack.channel_id(), "Slack notifications enabled");
            Box::new(slack)
        }
        None => {
            info!("SLACK_TOKEN/SLACK_CHANNEL_ID not set, notifications disabled");
            Box::new(NoopNotifier)
        }
    };

    let options = CurateOptions {
        mode,
        base_delay_seconds,
        ..CurateOptions::default()
    };

    let outcome = CuratePass::new(&store, &client, sink.as_ref())
        .run(&items, &options)
        .await?;

    if outcome.new_links.is_empty() {
        println!("No new items to post.");
    } else if outcome.dispatch.failed > 0 {
        println!(
            "Dispatched {} of {} planned run(s); {} failed.",
            outcome.dispatch.handles.len(),
            outcome.dispatch.planned,
            outcome.dispatch.failed
        );
    } else {
        println!("Dispatched {} run(s).", outcome.dispatch.handles.len());
    }

    Ok(())
}
