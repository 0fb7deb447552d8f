use anyhow::Context;
use cdr_kafka::kafka::{KafkaBroker, TopicManager};
use cdr_kafka::{CallRecord, CdrPublisher, Config, HostIdentity};
use clap::Parser;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "cdr-kafka")]
#[command(about = "Publishes call detail records to Kafka", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "cdr_kafka.toml")]
    config: PathBuf,

    #[arg(short, long, value_name = "FILE", help = "Newline-delimited JSON records, '-' for stdin")]
    input: Option<PathBuf>,

    #[arg(long, default_value_t = 10, help = "Seconds to wait for queued messages on exit")]
    flush_timeout: u64,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[derive(Debug, Default)]
struct Counters {
    published: u64,
    dropped: u64,
}

#[derive(Debug, PartialEq, Eq)]
enum Exit {
    EndOfInput,
    Shutdown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Starting cdr-kafka");
    info!("Loading configuration from {:?}", args.config);

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config))?;

    info!(
        connections = ?config.kafka.connections.keys().collect::<Vec<_>>(),
        connection = %config.cdr.connection,
        topic = %config.cdr.topic,
        key = %config.cdr.key,
        loguniqueid = config.cdr.loguniqueid,
        loguserfield = config.cdr.loguserfield,
        "Configuration summary"
    );

    let identity = HostIdentity::from_config(&config.host)?;
    let broker = Arc::new(KafkaBroker::from_config(&config));
    let publisher = CdrPublisher::load(broker.clone(), identity, &config.cdr)?;

    if config.cdr.ensure_topic {
        ensure_topic(&broker, &config).await;
    }

    let input: Box<dyn AsyncRead + Unpin + Send> = match &args.input {
        Some(path) if path.as_os_str() != "-" => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input {:?}", path))?,
        ),
        _ => Box::new(tokio::io::stdin()),
    };
    let lines = BufReader::new(input).lines();
    let mut hangup = signal(SignalKind::hangup())?;
    let mut counters = Counters::default();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match run(lines, &publisher, &mut hangup, shutdown, &args.config, &mut counters).await? {
        Exit::EndOfInput => info!("End of input"),
        Exit::Shutdown => info!("Shutdown requested"),
    }

    publisher.on_shutdown();
    if let Err(e) = broker.flush_all(Duration::from_secs(args.flush_timeout)) {
        warn!("Failed to flush Kafka producers: {}", e);
    }

    info!(
        published = counters.published,
        dropped = counters.dropped,
        "cdr-kafka stopped"
    );

    Ok(())
}

/// Publishes input lines until the input ends or `shutdown` completes.
///
/// `shutdown` is polled across iterations, so a signal delivered while lines
/// are flowing is never lost.
async fn run<R, F>(
    mut lines: Lines<R>,
    publisher: &CdrPublisher,
    hangup: &mut Signal,
    shutdown: F,
    config_path: &Path,
    counters: &mut Counters,
) -> std::io::Result<Exit>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => publish_line(publisher, &line, counters),
                None => return Ok(Exit::EndOfInput),
            },
            _ = hangup.recv() => reload(config_path, publisher),
            _ = &mut shutdown => return Ok(Exit::Shutdown),
        }
    }
}

fn publish_line(publisher: &CdrPublisher, line: &str, counters: &mut Counters) {
    if line.trim().is_empty() {
        return;
    }

    let record: CallRecord = match serde_json::from_str(line) {
        Ok(record) => record,
        Err(e) => {
            warn!("Skipping malformed call record: {}", e);
            counters.dropped += 1;
            return;
        }
    };

    match publisher.on_call_completed(&record) {
        Ok(()) => counters.published += 1,
        Err(_) => counters.dropped += 1,
    }
}

fn reload(path: &Path, publisher: &CdrPublisher) {
    info!("Reloading configuration from {:?}", path);

    let config = match Config::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to reload configuration, keeping previous: {}", e);
            return;
        }
    };

    // Connections are fixed at start-up; only the cdr section is reloaded.
    if let Err(e) = publisher.on_reload(&config.cdr) {
        error!("Reload failed: {}", e);
    }
}

async fn ensure_topic(broker: &KafkaBroker, config: &Config) {
    let Some(connection) = broker.connection_config(&config.cdr.connection) else {
        warn!(
            connection = %config.cdr.connection,
            "Cannot ensure topic, connection is not defined"
        );
        return;
    };

    let result = match TopicManager::new(
        connection,
        config.cdr.topic_partitions,
        config.cdr.topic_replication_factor,
    ) {
        Ok(manager) => manager.ensure_topic(&config.cdr.topic).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        warn!(topic = %config.cdr.topic, "Failed to ensure topic exists: {}", e);
    }
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("cdr_kafka=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cdr_kafka=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
