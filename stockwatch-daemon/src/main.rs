use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use stockwatch_core::config::{FleetConfig, StockwatchConfig};
use stockwatch_daemon::cli::DaemonCli;
use stockwatch_daemon::logging::init_tracing;
use stockwatch_daemon::orchestrator::{Orchestrator, wait_for_shutdown_signal};
use stockwatch_daemon::simulator::SimulatedScanner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드: 파일(선택) → 환경변수 → CLI 순으로 덮어씀
    let mut config = match &cli.config {
        Some(path) => StockwatchConfig::load(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?,
        None => {
            let mut config = StockwatchConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "stockwatch-daemon starting");

    let orchestrator = Orchestrator::builder()
        .config(config)
        .fleet(FleetConfig::default())
        .scanner(Arc::new(SimulatedScanner::default()))
        .build()?;

    // 시그널 수신 시 종료 대기를 중단하고 강제 취소로 전환
    let interrupt = orchestrator.interrupt_token();
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(signal) => {
                tracing::warn!(signal, "shutdown signal received, interrupting");
                interrupt.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signals"),
        }
    });

    let report = orchestrator.run().await?;
    tracing::info!(
        total = report.final_summary.total,
        submitted = report.submitted,
        succeeded = report.scans_succeeded,
        failed = report.scans_failed,
        duplicates = report.duplicates.len(),
        scan_phase = ?report.scan_phase,
        report_phase = ?report.report_phase,
        "stockwatch-daemon shut down"
    );
    Ok(())
}
