use super::{build_options, cancel_on_ctrl_c, print_report};
use crate::cli::{CommonOptions, IndexedArgs};
use crate::core::{CancellationToken, WorkloadConfig};
use crate::engine::ChunkedDispatchEngine;
use crate::ruleset::LoopRuleset;
use crate::services::{ConsoleProgressReporter, IndexedCollator};
use anyhow::Result;

/// 値を2乗する作業単位（オーバーフローは失敗として扱う）
pub async fn square(value: i64, token: CancellationToken) -> Result<i64> {
    token.ensure_active()?;
    value
        .checked_mul(value)
        .ok_or_else(|| anyhow::anyhow!("{value} の2乗がオーバーフローしました"))
}

/// Execute indexed command on the async engine
pub async fn execute_indexed(args: IndexedArgs, common: CommonOptions) -> Result<()> {
    if args.step == 0 {
        anyhow::bail!("Step must not be zero");
    }

    let ruleset = LoopRuleset::new(
        args.from,
        args.to,
        args.relation.into(),
        args.assignment.into(),
        args.step,
    );

    let token = CancellationToken::new();
    let options = build_options(&common, token.clone())?;
    let reporter = if common.quiet || common.json {
        ConsoleProgressReporter::quiet()
    } else {
        ConsoleProgressReporter::new()
    };

    if !common.quiet && !common.json {
        println!(
            "🔁 for (i = {}; i {} {}; i {} {})",
            ruleset.from(),
            ruleset.relation(),
            ruleset.to(),
            ruleset.assignment(),
            ruleset.step()
        );
    }

    let engine = ChunkedDispatchEngine::new(options, reporter);
    let signal = cancel_on_ctrl_c(token);

    tracing::info!(partition_size = engine.config().partition_size(), "indexed を実行します");
    let report = engine
        .execute_async(ruleset.values(), IndexedCollator::new(), |value, token| async move {
            let squared = square(value, token).await?;
            anyhow::Ok((value, squared))
        })
        .await;
    signal.abort();

    print_report(report?, common.json)
}
