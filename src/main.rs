use clap::Parser;
use wp_release::config::toml_config::ReleaseToml;
use wp_release::utils::error::ReleaseError;
use wp_release::utils::{logger, validation::Validate};
use wp_release::{ReleaseArgs, ReleaseEngine, ReleaseSettings};

fn main() {
    let args = ReleaseArgs::parse();

    // 初始化日誌
    logger::init(args.verbose, args.log_json);

    tracing::info!("🚀 Starting wp-release");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 載入 TOML 配置（可選）
    let file = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            match ReleaseToml::from_file(path).and_then(|f| f.validate().map(|_| f)) {
                Ok(file) => file,
                Err(e) => fail(&e),
            }
        }
        None => ReleaseToml::default(),
    };

    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let settings = ReleaseSettings::resolve(
        &args.root,
        args.plugin_dir.clone(),
        args.toggles(),
        date,
        &file,
    );
    let engine = ReleaseEngine::new(&settings);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        match engine.plan() {
            Ok(plan) => {
                println!("📋 Release plan:");
                println!("  Version: {}", plan.version);
                println!("  Artifact: {}", plan.artifact.display());
                println!("  Pending fragments: {}", plan.pending_fragments);
                println!("  ZIP entries ({}):", plan.entries.len());
                for entry in &plan.entries {
                    println!("   - {}", entry);
                }
            }
            Err(e) => fail(&e),
        }
        return;
    }

    match engine.run() {
        Ok(report) => {
            tracing::info!("✅ Release {} built", report.version);
            println!("✅ Release {} built", report.version);
            println!("📁 {}", report.archive.path.display());
            if let Some(tag) = &report.tag {
                println!("🏷️  {} (push with: git push && git push --tags)", tag);
            }
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &ReleaseError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Release failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}
