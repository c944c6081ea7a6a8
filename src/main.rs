use anyhow::Context;
use clap::Parser;
use pool_grader::utils::error::ErrorSeverity;
use pool_grader::utils::{logger, validation::Validate};
use pool_grader::{CliArgs, GradePipeline, GraderConfig, PoolHierarchy, UpdateOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入 TOML 配置
    let mut config = GraderConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    // 初始化日誌
    logger::init_cli_logger(
        config.log_level(),
        args.verbose,
        config.log_file(),
        config.log_format(),
    )
    .context("failed to initialise logging")?;

    let user_id = args.user_id.as_str();
    let module_id = args.project_id.as_str();
    tracing::info!("user-{} module-{}: starting checkup", user_id, module_id);

    let hierarchy = match PoolHierarchy::from_file(config.pool_list_path()) {
        Ok(hierarchy) => hierarchy,
        Err(e) => {
            tracing::error!("user-{} module-{}: {}", user_id, module_id, e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("loaded {} pools from {}", hierarchy.len(), config.pool_list_path());

    let pipeline = GradePipeline::new(
        config.build_client()?,
        config.build_limiter(),
        hierarchy,
        config.pipeline_options(),
    );

    match pipeline.run(user_id, module_id).await {
        Ok(outcome) => {
            match outcome {
                UpdateOutcome::AlreadyUpToDate {
                    current_mark,
                    computed_mark,
                    ..
                } => {
                    println!(
                        "user already had a better grade ({} >= {})",
                        current_mark, computed_mark
                    );
                }
                UpdateOutcome::Updated { team_id, mark } => {
                    println!("Successfully updated team {}'s mark to {}", team_id, mark);
                }
                UpdateOutcome::DryRun {
                    team_id,
                    current_mark,
                    computed_mark,
                } => {
                    println!(
                        "Dry run: team {}'s mark would go from {} to {}",
                        team_id, current_mark, computed_mark
                    );
                }
            }
            tracing::info!("user-{} module-{}: everything went well", user_id, module_id);
        }
        Err(e) => {
            let cause = e.kind();
            tracing::error!(
                "user-{} module-{}: {} (Category: {:?}, Severity: {:?})",
                user_id,
                module_id,
                e,
                cause.category(),
                cause.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", cause.recovery_suggestion());

            eprintln!("user-{} module-{}: {}", user_id, module_id, e);
            eprintln!("💡 {}", cause.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match cause.severity() {
                ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
