//! The `slipscan extract` command.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use slipscan_core::{
    Config, ExtractionRecord, ExtractionSession, InferenceClient, OutputFormat as CoreOutputFormat,
    OutputWriter, SlipProcessor,
};

use super::{describe_failure, file_name, spinner};

/// How the answer is printed.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// The model's answer as-is
    #[default]
    Text,
    /// The answer plus image details
    Json,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => CoreOutputFormat::Text,
            OutputFormat::Json => CoreOutputFormat::Json,
        }
    }
}

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Image of a receipt or payment slip (png, jpeg, gif, webp)
    pub image: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bedrock model id, overriding `bedrock.model_id`
    #[arg(short, long)]
    pub model: Option<String>,

    /// Longest side sent to the model, overriding `normalize.max_dimension`
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_dimension: Option<u32>,
}

impl ExtractArgs {
    /// Fold command-line overrides into the loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.bedrock.model_id = model.clone();
        }
        if let Some(max_dimension) = self.max_dimension {
            config.normalize.max_dimension = max_dimension;
        }
    }
}

/// Execute the extract command.
pub async fn execute(args: ExtractArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply_to(&mut config);

    let processor = SlipProcessor::new(&config);
    let bytes = processor.load(&args.image).await?;

    let mut session = ExtractionSession::new(&config);
    if session.upload(bytes).await.is_none() {
        return Err(session_failure(&session));
    }
    if let Some(image) = session.image() {
        tracing::info!(
            "Accepted {} {}x{}, sending {}x{} ({} bytes)",
            image.format,
            image.original_width,
            image.original_height,
            image.width,
            image.height,
            image.bytes.len()
        );
    }

    let client = InferenceClient::from_config(&config)?;

    let pb = spinner(&format!("Asking {}...", client.model()));
    let extracted = session.extract(&client).await.is_some();
    pb.finish_and_clear();

    if !extracted {
        return Err(session_failure(&session));
    }

    let (Some(image), Some(result)) = (session.image(), session.result()) else {
        anyhow::bail!("Extraction finished without a result");
    };
    let record = ExtractionRecord::new(file_name(&args.image), image, result.clone());

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            write_record(BufWriter::new(file), args.format, &record)?;
            tracing::info!("Output written to {:?}", path);
        }
        None => write_record(std::io::stdout().lock(), args.format, &record)?,
    }

    Ok(())
}

fn write_record<W: Write>(
    writer: W,
    format: OutputFormat,
    record: &ExtractionRecord,
) -> anyhow::Result<()> {
    let mut writer = OutputWriter::new(writer, format.into(), true);
    writer.write(record)?;
    writer.flush()?;
    Ok(())
}

fn session_failure(session: &ExtractionSession) -> anyhow::Error {
    match session.error() {
        Some(error) => anyhow::anyhow!(describe_failure(error)),
        None => anyhow::anyhow!("Extraction failed"),
    }
}
