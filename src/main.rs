use anyhow::Context;
use clap::Parser;
use compose_teardown::config::LogFormat;
use compose_teardown::utils::{logger, validation::Validate};
use compose_teardown::{
    cancel_scope, CliConfig, CliRuntime, DryRunExecutor, ProjectConfig, ResourceOutcome,
    TeardownEngine, TeardownError, TeardownOptions, TeardownReport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("📁 Loading project from: {}", args.config.display());

    // 載入 TOML 配置
    let mut config = match ProjectConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "❌ Failed to load config file '{}': {}",
                args.config.display(),
                e
            );
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    // 應用命令列覆蓋設定
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let project = config.to_project();
    let runtime = CliRuntime::new(config.runtime_binary(), &project.name)
        .with_namespace(config.namespace().map(str::to_string))
        .with_timeout(config.timeout());
    let options = TeardownOptions {
        remove_volumes: args.volumes,
    };

    tracing::info!(
        project = %project.name,
        runtime = runtime.binary(),
        remove_volumes = options.remove_volumes,
        "Tearing down project"
    );

    let (cancel, signal) = cancel_scope();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping before the next step");
            cancel.cancel();
        }
    });

    let result = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be removed");
        let executor = DryRunExecutor::new(runtime.clone());
        TeardownEngine::new(&runtime, &executor)
            .tear_down(&project, &options, &signal)
            .await
    } else {
        TeardownEngine::new(&runtime, &runtime)
            .tear_down(&project, &options, &signal)
            .await
    };

    match result {
        Ok(report) => print_report(&report, args.json),
        Err(e) => fail(&e),
    }
}

fn fail(e: &TeardownError) -> ! {
    tracing::error!("❌ Teardown failed: {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn print_report(report: &TeardownReport, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("failed to render teardown report")?;
        println!("{}", rendered);
        return Ok(());
    }

    for record in report.failures() {
        if let ResourceOutcome::RemovalFailed { reason } = &record.outcome {
            println!("⚠️  could not remove {} {}: {}", record.kind, record.name, reason);
        }
    }
    println!("✅ Project '{}': {}", report.project, report.summary());
    if !report.is_clean() {
        println!("💡 Run the teardown again to retry the failed removals");
    }
    Ok(())
}
