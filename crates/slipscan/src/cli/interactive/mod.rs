//! Guided mode for a bare `slipscan` invocation on a TTY.

pub mod extract;
pub mod theme;

use console::Style;
use dialoguer::Select;
use slipscan_core::inference::{resolve_env_var, AwsCredentials};
use slipscan_core::Config;

/// Turn a dialoguer result into `Ok(None)` on Ctrl+C so the flow can exit
/// cleanly; other I/O failures stay errors.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &["Extract from a payment slip", "Show configuration", "Exit"];

/// Entry point for guided mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::slipscan_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => extract::guided_extract(config).await?,
            Some(1) => show_config(config),
            _ => break,
        }
    }

    Ok(())
}

fn show_config(config: &Config) {
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();
    let dim = Style::new().for_stderr().dim();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    eprintln!(
        "    {:<16} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Model:"),
        config.bedrock.model_id
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Region:"),
        resolve_env_var(&config.bedrock.region).unwrap_or_else(|| "not set".to_string())
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Credentials:"),
        credentials_status(config)
    );
    eprintln!(
        "    {:<16} {}px",
        label.apply_to("Max dimension:"),
        config.normalize.max_dimension
    );
    eprintln!(
        "    {:<16} {}s",
        label.apply_to("Model timeout:"),
        config.limits.llm_timeout_ms / 1000
    );
    eprintln!(
        "    {:<16} {}",
        label.apply_to("Log level:"),
        config.logging.level
    );
    eprintln!();
}

fn credentials_status(config: &Config) -> &'static str {
    match AwsCredentials::resolve(&config.bedrock) {
        Ok(creds) if creds.session_token.is_some() => "found (with session token)",
        Ok(_) => "found",
        Err(_) => "missing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_maps_to_none() {
        let interrupted: dialoguer::Result<String> = Err(dialoguer::Error::IO(
            std::io::Error::new(std::io::ErrorKind::Interrupted, "ctrl-c"),
        ));
        assert!(handle_interrupt(interrupted).unwrap().is_none());

        let broken: dialoguer::Result<String> = Err(dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        )));
        assert!(handle_interrupt(broken).is_err());
    }

    #[test]
    fn literal_credentials_are_found() {
        let mut config = Config::default();
        config.bedrock.access_key_id = "AKIDEXAMPLE".to_string();
        config.bedrock.secret_access_key = "secret".to_string();
        config.bedrock.session_token = String::new();
        assert_eq!(credentials_status(&config), "found");
    }
}
