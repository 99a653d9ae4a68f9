use clap::Parser;
use dify_export::config::credential_chains;
use dify_export::utils::error::{ErrorSeverity, ExportError};
use dify_export::utils::{logger, naming, validation::Validate};
use dify_export::{CliConfig, ExportEngine, ExportSettings, OutputMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 讓 .env 裡的 DIFY_CONSOLE_TOKEN 等變數也能被讀到
    let _ = dotenvy::dotenv();

    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting dify-export");

    let file_config = match cli.load_file() {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };
    if let Some(path) = &cli.config {
        tracing::info!("📁 Loaded configuration from: {}", path.display());
    }

    let settings = ExportSettings::layered(file_config.as_ref(), cli.overrides());
    if cli.verbose {
        tracing::debug!("Export settings: {:?}", settings);
    }

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(e);
    }

    display_settings_summary(&settings, cli.dry_run);

    let (token_chain, cookie_chain) = credential_chains(cli.credential_flags(), file_config.as_ref());
    let engine = match ExportEngine::connect(settings, &token_chain, &cookie_chain) {
        Ok(engine) => engine,
        Err(e) => exit_with(e),
    };

    let today = naming::today();

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no app will be exported");
        let planned = engine.dry_run_on(today).await;
        println!("🔍 {} apps would be exported:", planned.len());
        for entry in &planned {
            println!("  {}  ->  {}", entry.item.id, entry.file_name);
        }
        let config = engine.pipeline().config();
        if config.output_mode == OutputMode::Archive && !planned.is_empty() {
            println!(
                "📦 Archive: {}",
                engine
                    .pipeline()
                    .output_location(&config.naming.archive_file_name(today))
            );
        }
        return Ok(());
    }

    match engine.run_on(today).await {
        Ok(report) => {
            println!(
                "✅ Export finished: {}/{} apps succeeded",
                report.succeeded, report.attempted
            );
            if !report.is_complete() {
                println!("⚠️ {} apps failed, see the log above", report.shortfall());
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn display_settings_summary(settings: &ExportSettings, dry_run: bool) {
    println!("📋 Export Summary:");
    println!("  Console API: {}", settings.base_url);
    println!("  Auth: {:?}", settings.auth);
    println!("  Output: {} ({:?})", settings.output_path, settings.output_mode);
    println!(
        "  Execution: {:?} (up to {} requests)",
        settings.execution_mode, settings.concurrent_requests
    );
    println!("  Page Size: {}", settings.page_size);
    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn exit_with(e: ExportError) -> ! {
    tracing::error!(
        "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
