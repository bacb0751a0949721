//! The `slipscan check` command: validate an upload without calling the model.

use std::path::PathBuf;

use clap::Args;
use slipscan_core::{Config, Normalizer, SlipProcessor};

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Image to check
    pub image: PathBuf,
}

/// Execute the check command.
///
/// Prints the detected format and the size the model would receive. A rejected
/// image exits with an error.
pub async fn execute(args: CheckArgs, config: Config) -> anyhow::Result<()> {
    let processor = SlipProcessor::new(&config);
    let bytes = processor.load(&args.image).await?;
    let size = bytes.len();

    let upload = processor
        .validate(bytes)
        .await
        .map_err(|e| anyhow::anyhow!(super::describe_failure(&e)))?;

    let dimensions = (upload.image.width(), upload.image.height());
    println!(
        "{}",
        summary(dimensions, upload.format, size, processor.max_dimension())
    );
    Ok(())
}

fn summary(
    dimensions: (u32, u32),
    format: slipscan_core::SlipFormat,
    size: usize,
    max_dimension: u32,
) -> String {
    let (width, height) = dimensions;
    let (target_width, target_height) = Normalizer::target_dimensions(width, height, max_dimension);
    if (target_width, target_height) == (width, height) {
        format!("ok: {format} {width}x{height} ({size} bytes), sent as-is")
    } else {
        format!(
            "ok: {format} {width}x{height} ({size} bytes), resized to {target_width}x{target_height}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipscan_core::SlipFormat;

    #[test]
    fn summary_reports_resize() {
        let line = summary((3000, 2000), SlipFormat::Jpeg, 1234, 1120);
        assert_eq!(
            line,
            "ok: jpeg 3000x2000 (1234 bytes), resized to 1120x747"
        );
    }

    #[test]
    fn summary_reports_unchanged() {
        let line = summary((500, 400), SlipFormat::Png, 99, 1120);
        assert!(line.ends_with("sent as-is"));
    }

    #[tokio::test]
    async fn rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = execute(CheckArgs { image: path }, Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("The image could not be used."));
    }
}
