use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use factcheck_client::FactCheckClient;
use hoaxwatch_agent::classify::RemoteClassifier;
use hoaxwatch_agent::monitor::{FactChecker, Monitor};
use hoaxwatch_agent::schedule::{self, DailySchedule};
use hoaxwatch_agent::sources::{ForumSource, MicroblogSource, NewsSource, SourceAdapter};
use hoaxwatch_agent::store::PgRecordStore;
use hoaxwatch_common::{Config, Platform};

#[derive(Parser, Debug)]
#[command(
    name = "hoaxwatch",
    about = "Hoax monitoring pipeline: fetch, classify, fact-check, persist"
)]
struct Cli {
    /// Run one fetch/classify/fact-check cycle and exit
    #[arg(long)]
    once: bool,

    /// Run daily at the scheduled time (runs once immediately on start)
    #[arg(long)]
    daily: bool,

    /// Daily run time, HH:MM in the UTC+7 wall clock
    #[arg(long, default_value = "02:00")]
    time: String,

    /// Data sources: news, microblog, forum, social (microblog+forum), or all
    #[arg(long, default_value = "news")]
    source: String,

    /// Maximum news articles per keyword
    #[arg(long, default_value_t = 10)]
    news_max: u32,

    /// Maximum microblog posts per keyword
    #[arg(long, default_value_t = 50)]
    microblog_max: u32,

    /// Maximum forum submissions per keyword
    #[arg(long, default_value_t = 50)]
    forum_max: u32,

    /// Enable fact-check enrichment for hoax-labeled records
    #[arg(long)]
    fact_check: bool,
}

fn selected_platforms(source: &str) -> Vec<Platform> {
    match source {
        "social" => vec![Platform::Microblog, Platform::Forum],
        "all" => vec![Platform::News, Platform::Microblog, Platform::Forum],
        other => Platform::from_str_loose(other)
            .map(|p| vec![p])
            .unwrap_or_default(),
    }
}

fn build_sources(cli: &Cli, config: &Config) -> Vec<Box<dyn SourceAdapter>> {
    let mut sources: Vec<Box<dyn SourceAdapter>> = Vec::new();
    for platform in selected_platforms(&cli.source) {
        match platform {
            Platform::News => sources.push(Box::new(NewsSource::new(
                &config.news_api_url,
                &config.language,
                &config.country,
                cli.news_max,
            ))),
            Platform::Microblog => sources.push(Box::new(MicroblogSource::new(
                &config.microblog_api_url,
                &config.language,
                cli.microblog_max,
            ))),
            Platform::Forum => match ForumSource::new(
                config.forum_client_id.clone(),
                config.forum_client_secret.clone(),
                config.forum_user_agent.clone(),
                cli.forum_max,
            ) {
                Ok(source) => sources.push(Box::new(source)),
                // A misconfigured source drops out of the run; the others
                // proceed.
                Err(e) => warn!(error = %e, "Forum source disabled"),
            },
        }
    }
    sources
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hoaxwatch=info".parse()?))
        .init();

    let cli = Cli::parse();
    info!("HoaxWatch agent starting...");

    let config = Config::from_env();
    config.log_redacted();

    let store = PgRecordStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let sources = build_sources(&cli, &config);
    if sources.is_empty() {
        anyhow::bail!("No usable sources configured (--source {})", cli.source);
    }

    let classifier = RemoteClassifier::new(&config.classifier_url, config.classifier_token.clone());

    let fact_checker = if cli.fact_check {
        let client = FactCheckClient::new(config.fact_check_api_key.clone(), &config.language);
        Some(FactChecker::new(Box::new(client)))
    } else {
        None
    };

    let monitor = Monitor::new(
        sources,
        Box::new(classifier),
        fact_checker,
        Box::new(store),
        config.keywords.clone(),
    );

    if cli.once {
        let stats = monitor.run_job().await?;
        info!("Run complete. {stats}");
        return Ok(());
    }

    if cli.daily {
        let daily: DailySchedule = cli.time.parse().map_err(|e| anyhow::anyhow!("{e}"))?;
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, shutting down at the next check");
                let _ = tx.send(true);
            }
        });
        schedule::run_daily(&monitor, daily, rx).await;
        return Ok(());
    }

    warn!("Nothing to do: pass --once or --daily");
    Ok(())
}
