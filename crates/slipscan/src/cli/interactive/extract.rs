//! Guided extraction: path → validation → image info → confirm → model call →
//! result, with a retry offer after a failed call.

use console::Style;
use dialoguer::{Confirm, Input, Select};
use slipscan_core::{Config, ExtractionSession, InferenceClient, NormalizedImage, SlipProcessor};
use std::path::PathBuf;

use super::theme::slipscan_theme;
use crate::cli::{describe_failure, file_name, spinner};

/// Walk the user through one slip.
pub async fn guided_extract(config: &Config) -> anyhow::Result<()> {
    let theme = slipscan_theme();
    let warn = Style::new().for_stderr().yellow();
    let err = Style::new().for_stderr().red();

    let processor = SlipProcessor::new(config);
    let mut session = ExtractionSession::new(config);

    // ── Step 1: Upload ──────────────────────────────────────────────────────
    // Re-prompts until an image is accepted.

    let name = loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Path to slip image")
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        let path = PathBuf::from(shellexpand::tilde(raw_path.trim()).into_owned());
        let bytes = match processor.load(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("  {}", warn.apply_to(e.to_string()));
                continue;
            }
        };

        match session.upload(bytes).await {
            Some(image) => {
                eprintln!("  {}", Style::new().for_stderr().dim().apply_to(image_info(image)));
                break file_name(&path).unwrap_or_else(|| path.display().to_string());
            }
            None => {
                if let Some(e) = session.error() {
                    eprintln!("  {}", warn.apply_to(describe_failure(e)));
                }
            }
        }
    };

    // ── Step 2: Explicit trigger ────────────────────────────────────────────

    let confirm = Confirm::with_theme(&theme)
        .with_prompt("Extract payment information?")
        .default(true)
        .interact_opt()?;
    if !matches!(confirm, Some(true)) {
        return Ok(());
    }

    let client = match InferenceClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            session.fail_extraction(e);
            if let Some(e) = session.error() {
                eprintln!("  {} {}", err.apply_to("✗"), describe_failure(e));
            }
            return Ok(());
        }
    };

    // ── Step 3: Extraction, retried on request ──────────────────────────────

    loop {
        let pb = spinner(&format!("Reading {name}..."));
        let text = session.extract(&client).await.map(str::to_string);
        pb.finish_and_clear();

        match text {
            Some(text) => {
                print_result(&text);
                break;
            }
            None => {
                if let Some(e) = session.error() {
                    eprintln!("  {} {}", err.apply_to("✗"), describe_failure(e));
                }

                let retry = Confirm::with_theme(&theme)
                    .with_prompt("Try again?")
                    .default(true)
                    .interact_opt()?;
                if !matches!(retry, Some(true)) {
                    break;
                }
            }
        }
    }

    // ── What next ───────────────────────────────────────────────────────────

    let next = Select::with_theme(&theme)
        .with_prompt("What next?")
        .items(&["Extract another slip", "Back to main menu"])
        .default(0)
        .interact_opt()?;

    if matches!(next, Some(0)) {
        Box::pin(guided_extract(config)).await?;
    }

    Ok(())
}

fn image_info(image: &NormalizedImage) -> String {
    if image.was_resized() {
        format!(
            "{} {}x{}, resized to {}x{} ({:.1} KB)",
            image.format,
            image.original_width,
            image.original_height,
            image.width,
            image.height,
            image.bytes.len() as f64 / 1024.0
        )
    } else {
        format!(
            "{} {}x{} ({:.1} KB)",
            image.format,
            image.width,
            image.height,
            image.bytes.len() as f64 / 1024.0
        )
    }
}

/// The answer goes to stdout verbatim, framed on stderr.
fn print_result(text: &str) {
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    eprintln!("{}", dim.apply_to("─".repeat(40)));
    println!("{text}");
    eprintln!("{}", dim.apply_to("─".repeat(40)));
    eprintln!();
}
