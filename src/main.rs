use clap::{Arg, ArgAction, Command};
use ringlog::*;
use std::sync::Arc;
use std::time::Duration;

use agentlens::client::ApiClient;
use agentlens::config::Config;
use agentlens::dashboard::{self, ChartModel};
use agentlens::filters::FilterStore;
use agentlens::normalize;
use agentlens::query::{Endpoint, QueryCache, QueryStatus};

fn main() {
    let matches = Command::new("agentlens")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Polls the LLM-operations API and logs derived dashboard metrics")
        .arg(
            Arg::new("CONFIG")
                .help("Path to the TOML config file")
                .index(1),
        )
        .arg(
            Arg::new("VERBOSE")
                .long("verbose")
                .short('v')
                .help("Increase verbosity")
                .action(ArgAction::Count),
        )
        .get_matches();

    let config = match matches.get_one::<String>("CONFIG") {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        }),
        None => Config::default(),
    };

    let level = match matches.get_count("VERBOSE") {
        0 => config.log.level(),
        1 => Level::Debug,
        _ => Level::Trace,
    };

    let log = LogBuilder::new()
        .output(Box::new(Stderr::new()))
        .build()
        .expect("failed to initialize log");

    let mut log = MultiLogBuilder::new()
        .level_filter(level.to_level_filter())
        .default(log)
        .build()
        .start();

    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_millis(50));
        let _ = log.flush();
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to initialize tokio runtime");

    if let Err(e) = runtime.block_on(watch(config)) {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn watch(config: Config) -> anyhow::Result<()> {
    let client = Arc::new(ApiClient::new(&config.api)?);
    let filters = Arc::new(FilterStore::new());
    let cache = QueryCache::new(client, filters).with_refresh_overrides(config.refresh.resolve()?);

    info!(
        "watching {} as workspace {}",
        config.api.base_url, config.api.workspace
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(30));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }

        report(&cache, config.api.latency_slo_ms).await;
    }
}

/// Read the headline panels concurrently and log their derived models.
async fn report(cache: &QueryCache, latency_slo_ms: f64) {
    let (snapshot, cost_trend, quality_drift, anomalies, latency) = futures::join!(
        cache.read(Endpoint::Overview),
        cache.read(Endpoint::CostTrend),
        cache.read(Endpoint::QualityDrift),
        cache.read(Endpoint::Anomalies),
        cache.read(Endpoint::LatencyTrend),
    );

    match (&snapshot.data, snapshot.status) {
        (Some(payload), _) => {
            let summary = normalize::overview_summary(payload);
            info!(
                "overview: ${:.2} spend, {} requests, {:.2}% error rate, {:.0}ms avg latency",
                summary.total_cost_usd,
                summary.total_requests as u64,
                summary.error_rate,
                summary.avg_latency_ms
            );
        }
        (None, QueryStatus::Error) => {
            warn!(
                "overview unavailable: {}",
                snapshot.error.as_deref().unwrap_or("unknown error")
            );
        }
        _ => {}
    }

    if let Some(payload) = cost_trend.data {
        if let ChartModel::Ready(points) = dashboard::build_cost_trend(&payload) {
            let models = agentlens::pipeline::timeseries::series_keys(&points);
            info!(
                "cost trend: {} buckets across {} models",
                points.len(),
                models.len()
            );
        }
    }

    if let Some(payload) = quality_drift.data {
        match dashboard::build_quality_drift(&payload) {
            ChartModel::Ready(result) => {
                info!(
                    "quality drift: {:?} ({:+.1}%)",
                    result.trend, result.drift_percentage
                );
            }
            ChartModel::Empty => info!("quality drift: no data for this range"),
        }
    }

    if let Some(payload) = anomalies.data {
        match dashboard::build_anomalies(&payload) {
            ChartModel::Ready((markers, summary)) => {
                info!(
                    "anomalies: {} flagged ({} critical, {} high, {} medium, {} low)",
                    markers.len(),
                    summary.critical,
                    summary.high,
                    summary.medium,
                    summary.low
                );
            }
            ChartModel::Empty => info!("anomalies: none in range"),
        }
    }

    if let Some(payload) = latency.data {
        match dashboard::build_latency_slo(&payload, latency_slo_ms) {
            ChartModel::Ready(compliance) => {
                info!(
                    "p95 latency SLO ({latency_slo_ms:.0}ms): {compliance:.1}% compliant"
                );
            }
            ChartModel::Empty => info!("latency: no data for this range"),
        }
    }
}
