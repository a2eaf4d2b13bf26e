use clap::Parser;
use wp_release::core::archive::{slug_from_dir, ArchiveBuilder};
use wp_release::core::version::resolve_or_default;
use wp_release::domain::model::{ExclusionRules, Version};
use wp_release::utils::error::ReleaseError;
use wp_release::utils::logger;
use wp_release::ZipArgs;

fn main() -> anyhow::Result<()> {
    let args = ZipArgs::parse();
    logger::init_cli_logger(args.verbose);

    let plugin_path = args.root.join(&args.plugin_dir);
    if !plugin_path.is_dir() {
        eprintln!("ERROR: Plugin dir not found: {}", plugin_path.display());
        std::process::exit(1);
    }

    let slug = slug_from_dir(&plugin_path).ok_or_else(|| ReleaseError::ConfigError {
        message: format!("cannot derive slug from {}", plugin_path.display()),
    })?;
    let main_php = plugin_path.join(format!("{}.php", slug));
    if !main_php.is_file() {
        eprintln!("ERROR: {}/{}.php missing.", args.plugin_dir.display(), slug);
        std::process::exit(1);
    }

    let version = match &args.version {
        Some(v) => Version::new(v.as_str()),
        None => resolve_or_default(&main_php, "0.1.0"),
    };

    let zip_path = wp_release::config::artifact_path(
        &args.root.join("dist"),
        &args.artifact_prefix,
        &version,
    );
    let rules = ExclusionRules::minimal();
    let report = ArchiveBuilder::new(&plugin_path, &slug, &rules).build(&zip_path)?;

    println!("Created: {}", report.path.display());
    println!("ZIP manifest:");
    for entry in &report.entries {
        println!(" - {}", entry);
    }

    Ok(())
}
