use clap::Parser;
use wp_release::utils::logger;
use wp_release::{IndexArgs, ManifestIndexer};

fn main() -> anyhow::Result<()> {
    let args = IndexArgs::parse();
    logger::init_cli_logger(args.verbose);

    let settings = args.settings();
    let index = ManifestIndexer::new(&settings).write()?;

    println!("[index] wrote {} entries", index.files.len());
    Ok(())
}
