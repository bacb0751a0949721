//! The `slipscan normalize` command: write the exact bytes that would be sent
//! to the model.

use std::path::PathBuf;

use clap::Args;
use slipscan_core::{Config, SlipProcessor};

/// Arguments for the `normalize` command.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Image to normalize
    pub image: PathBuf,

    /// Where to write the re-encoded image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Longest side in pixels, overriding `normalize.max_dimension`
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_dimension: Option<u32>,
}

/// Execute the normalize command.
pub async fn execute(args: NormalizeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(max_dimension) = args.max_dimension {
        config.normalize.max_dimension = max_dimension;
    }

    let processor = SlipProcessor::new(&config);
    let bytes = processor.load(&args.image).await?;
    let image = processor.prepare(bytes).await?;

    tokio::fs::write(&args.output, &image.bytes).await?;
    tracing::info!("Normalized image written to {:?}", args.output);

    println!(
        "{} {}x{} -> {}x{} ({} bytes) {}",
        image.format,
        image.original_width,
        image.original_height,
        image.width,
        image.height,
        image.bytes.len(),
        args.output.display()
    );
    Ok(())
}
