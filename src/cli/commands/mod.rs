pub mod indexed;
pub mod lines;

pub use indexed::*;
pub use lines::*;

use crate::cli::CommonOptions;
use crate::core::{CancellationToken, RunReport, RunSummary};
use crate::services::WorkloadOptions;
use anyhow::Result;
use serde::Serialize;
use std::fmt::Display;

/// コマンドライン引数と設定ファイルからオプションを組み立てる
///
/// 引数で指定した値が設定ファイルの値より優先される。
pub fn build_options(common: &CommonOptions, token: CancellationToken) -> Result<WorkloadOptions> {
    let mut options = match &common.config {
        Some(path) => WorkloadOptions::from_json_file(path)?,
        None => WorkloadOptions::default(),
    };

    if let Some(partition_size) = common.partition_size {
        options = options.with_partition_size(partition_size);
    }
    if let Some(threads) = common.threads {
        options = options.with_worker_threads(threads);
    }
    if common.quiet {
        options = options.with_progress_reporting(false);
    }

    options.validate()?;
    Ok(options.with_cancellation(token))
}

/// Ctrl+C でトークンをキャンセルするタスクを起動
pub fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("⏹️  中断要求を受け付けました。実行中のチャンクの完了を待ちます...");
            token.cancel();
        }
    })
}

/// 実行結果を出力し、失敗やキャンセルがあればエラーを返す
pub fn print_report<T>(report: RunReport<Vec<T>>, json: bool) -> Result<()>
where
    T: Serialize + Display,
{
    if json {
        let output = serde_json::json!({
            "results": &report.results,
            "summary": &report.summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for result in &report.results {
            println!("{result}");
        }
        print_summary(&report.summary);
    }

    if let Some(failures) = &report.failures {
        for failure in failures {
            eprintln!("❌ {}: {}", failure.tag(), failure.error());
        }
    }

    report.into_result()?;
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    eprintln!("📊 実行結果:");
    eprintln!("   - ソース: {}", summary.source_kind);
    eprintln!("   - チャンク数: {}", summary.chunks_dispatched);
    eprintln!("   - 成功: {}", summary.items_succeeded);
    eprintln!("   - 失敗: {}", summary.items_failed);
    eprintln!("   - 処理時間: {}ms", summary.elapsed_ms);
    eprintln!(
        "   - 平均処理時間: {:.3}ms/件",
        summary.average_time_per_item_ms()
    );
}
