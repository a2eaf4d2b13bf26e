use clap::Parser;
use wp_release::domain::model::FetchStatus;
use wp_release::utils::{logger, validation::Validate};
use wp_release::{FetchArgs, HttpSource, LocalStorage, RemoteFetcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = FetchArgs::parse();

    // 初始化日誌
    logger::init(args.verbose, args.log_json);

    // 驗證配置
    if let Err(e) = args.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    let storage = LocalStorage::new(args.dest.clone());
    let fetcher = RemoteFetcher::new(HttpSource::new(), storage, args.settings());

    let report = fetcher.run().await?;

    for record in report.failed() {
        if let FetchStatus::Failed { reason } = &record.status {
            tracing::debug!("failed {:?} {}: {}", record.kind, record.url, reason);
        }
    }

    println!(
        "[write] {} ({} fetched, {} failed, {} ticket(s) exported, slug '{}')",
        args.dest.join(&report.export_path).display(),
        report.fetched(),
        report.failed().count(),
        report.exported_tickets,
        report.slug
    );

    Ok(())
}
