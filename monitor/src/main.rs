use std::sync::Arc;

use alerts::channel::{GoogleTts, TelegramChannel};
use alerts::{AlertDispatcher, AlertStatus, CooldownGate, messages};
use anyhow::{Context, bail};
use chrono::Utc;
use clap::Parser;
use common::logger::{LogFormat, init_logger};
use market::PriceSource;
use market::source::HyperliquidClient;
use monitor::{
    cli::{Cli, Command},
    config::AppConfig,
    console::{Console, stdin_lines},
    engine::PriceMonitor,
    scheduler::MonitorService,
};
use tracing::{error, info};

const SERVICE: &str = "pricewatch";

fn build_dispatcher(cfg: &AppConfig) -> anyhow::Result<AlertDispatcher> {
    let telegram = cfg.telegram()?.clone();
    let tts = GoogleTts::new(cfg.tts_url.as_str(), cfg.tts_language.as_str())?;
    let channel = TelegramChannel::new(telegram, tts)?;

    Ok(AlertDispatcher::new(
        Arc::new(channel),
        cfg.enable_text,
        cfg.enable_voice,
    ))
}

fn build_monitor(cfg: &AppConfig) -> anyhow::Result<PriceMonitor> {
    Ok(PriceMonitor::new(
        cfg.thresholds,
        cfg.history_capacity,
        cfg.cooldown,
    )?)
}

/// Validates credentials and the asset, then runs the scheduler until Ctrl-C.
async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let dispatcher = build_dispatcher(&cfg)?;
    let source = HyperliquidClient::new(cfg.hyperliquid_api_url.as_str())?;

    let listed = source
        .is_listed(&cfg.asset)
        .await
        .context("checking asset listing")?;
    if !listed {
        bail!("asset {} is not listed on Hyperliquid", cfg.asset);
    }

    let monitor = Arc::new(build_monitor(&cfg)?);
    let service = Arc::new(MonitorService::new(
        cfg.scheduler_config(),
        monitor,
        Arc::new(source),
        dispatcher,
    ));

    info!(
        asset = %cfg.asset,
        target = cfg.thresholds.target_price,
        channel = %service.dispatcher().channel_name(),
        "Starting price monitor..."
    );

    let console = tokio::spawn(Console::new(Arc::clone(&service)).run(stdin_lines()));
    let handle = service.spawn();

    tokio::signal::ctrl_c().await?;
    console.abort();
    info!("Shutdown signal received");

    handle.shutdown().await
}

/// One-shot quote. A single sample supports no analysis, so only the price and
/// its distance to target are shown; `status` in the run console has the rest.
async fn price(cfg: &AppConfig, json: bool) -> anyhow::Result<()> {
    let source = HyperliquidClient::new(cfg.hyperliquid_api_url.as_str())?;
    let price = source
        .fetch_price(&cfg.asset)
        .await
        .with_context(|| format!("fetching {} price", cfg.asset))?;

    let target = cfg.thresholds.target_price;

    if json {
        let body = serde_json::json!({
            "asset": cfg.asset,
            "price": price,
            "target_price": target,
            "below_target": price < target,
            "at": Utc::now().to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!(
            "{} ${:.2} (target ${:.2}, {:+.2})",
            cfg.asset,
            price,
            target,
            price - target
        );
    }

    Ok(())
}

/// Configured values as a fresh process sees them. The live cooldown state of a
/// running monitor is served by its console (`settings`).
fn settings(cfg: &AppConfig) {
    let gate = CooldownGate::new(cfg.cooldown);
    let status = AlertStatus::from_gate(
        &gate,
        cfg.enable_text,
        cfg.enable_voice,
        common::time::now_ms(),
    );

    println!(
        "{}",
        messages::settings_summary(&cfg.thresholds, cfg.update_interval, &status)
    );
}

async fn test_voice(cfg: &AppConfig) -> anyhow::Result<()> {
    build_dispatcher(cfg)?
        .send_test_voice()
        .await
        .context("sending test voice message")?;

    info!("Test voice message sent");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logger(SERVICE, LogFormat::default());
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };
    init_logger(SERVICE, cfg.log_format);

    match cli.command() {
        Command::Run => run(cfg).await,
        Command::Price { json } => price(&cfg, json).await,
        Command::Settings => {
            settings(&cfg);
            Ok(())
        }
        Command::TestVoice => test_voice(&cfg).await,
    }
}
