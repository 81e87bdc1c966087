//! 일별 시세 파이프라인 CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use stock_collector::{bootstrap, probe, CollectorConfig, RunStats};
use stock_core::logging::{init_logging, LogConfig};
use stock_core::{RunSummary, Symbol};
use stock_data::{InMemoryHistoryStore, StaticSymbolCatalog};
use stock_notification::NotificationManager;

#[derive(Parser)]
#[command(name = "stock-collector")]
#[command(about = "Daily stock quote pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 파이프라인 1회 실행
    Run {
        /// 카탈로그 대신 지정한 심볼만 처리 (쉼표로 구분, 예: "RELIANCE,TCS")
        #[arg(long)]
        symbols: Option<String>,

        /// 메모리 저장소를 사용하여 데이터베이스 없이 실행 (--symbols 필요)
        #[arg(long)]
        dry_run: bool,
    },

    /// 데몬 모드: 주기적으로 파이프라인 실행
    Daemon,

    /// 데이터베이스 마이그레이션 실행
    Migrate,

    /// 시세 API 점검 (저장하지 않음)
    Probe {
        /// 점검할 심볼 (쉼표로 구분)
        #[arg(long, default_value = "RELIANCE,TCS,INFY")]
        symbols: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    let default_filter = ["stock_collector", "stock_core", "stock_data", "stock_notification"]
        .iter()
        .map(|target| format!("{}={}", target, cli.log_level))
        .collect::<Vec<_>>()
        .join(",");
    init_logging(LogConfig::from_env(&default_filter))?;

    tracing::info!("Stock Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        base_url = %config.quote_api.base_url,
        exchange = ?config.quote_api.exchange,
        window_size = config.pipeline.window_size,
        "설정 로드 완료"
    );

    match cli.command {
        Commands::Run { symbols, dry_run } => {
            let notifier = Arc::new(bootstrap::build_notifier());

            let (summary, stats) = if dry_run {
                let symbols = symbols.ok_or("--dry-run에는 --symbols가 필요합니다")?;
                tracing::info!("드라이런: 메모리 저장소 사용");
                let runner = bootstrap::build_runner(
                    &config,
                    Arc::new(StaticSymbolCatalog::parse(&symbols)),
                    Arc::new(InMemoryHistoryStore::new()),
                    notifier,
                )?;
                runner.run_with_stats().await?
            } else {
                let database = bootstrap::connect_database(&config).await?;
                let runner = match symbols {
                    Some(ref list) => bootstrap::build_runner(
                        &config,
                        Arc::new(StaticSymbolCatalog::parse(list)),
                        Arc::new(database.history_store()),
                        notifier,
                    )?,
                    None => bootstrap::build_pg_runner(&config, &database, notifier)?,
                };
                let result = runner.run_with_stats().await;
                database.pool().close().await;
                result?
            };

            stats.log_summary("시세 파이프라인");
            print_summary(&summary, &stats)?;
        }
        Commands::Daemon => {
            let database = bootstrap::connect_database(&config).await?;
            let notifier = Arc::new(bootstrap::build_notifier());
            let runner = bootstrap::build_pg_runner(&config, &database, notifier.clone())?;

            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        tracing::info!("=== 파이프라인 실행 시작 ===");
                        run_scheduled(&runner, &notifier).await;
                        tracing::info!(
                            "=== 파이프라인 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }

            database.pool().close().await;
        }
        Commands::Migrate => {
            let database = bootstrap::connect_database(&config).await?;
            database.migrate().await?;
            database.pool().close().await;
        }
        Commands::Probe { symbols } => {
            let client = config.quote_api.build_client()?;
            let symbols = Symbol::parse_list(&symbols);
            let results = probe::probe_quotes(&client, &symbols).await;

            for result in &results {
                if let Ok(quote) = &result.outcome {
                    println!(
                        "{}: close={} change={}",
                        result.symbol,
                        quote.close,
                        quote
                            .provider_change_pct
                            .map(|pct| format!("{}%", pct))
                            .unwrap_or_else(|| "N/A".to_string())
                    );
                }
            }

            println!("\nSummary:");
            for result in &results {
                println!("{}", result.status_line());
            }

            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                tracing::warn!(failed, total = results.len(), "일부 심볼 점검 실패");
            }
        }
    }

    tracing::info!("Stock Collector 종료");

    Ok(())
}

/// 데몬 주기마다 실행하고 결과를 알림으로 전달합니다.
async fn run_scheduled(
    runner: &stock_collector::PipelineRunner,
    notifier: &NotificationManager,
) {
    match runner.run_with_stats().await {
        Ok((summary, stats)) => {
            stats.log_summary("시세 파이프라인");
            if let Err(e) = notifier.notify_run_degraded(&summary).await {
                tracing::warn!(error = %e, "실행 결과 알림 전송 실패");
            }
        }
        Err(e) => {
            tracing::error!("파이프라인 실행 실패: {}", e);
            if let Err(e) = notifier.notify_run_failed(&e.to_string()).await {
                tracing::warn!(error = %e, "실행 실패 알림 전송 실패");
            }
        }
    }
}

/// 요약을 JSON으로 표준 출력에 씁니다.
fn print_summary(summary: &RunSummary, stats: &RunStats) -> Result<(), serde_json::Error> {
    let output = serde_json::json!({
        "summary": summary,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
