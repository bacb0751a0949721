//! Dialoguer theme and entry banner for guided mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` in Slipscan's colours: cyan prompts, green values.
pub fn slipscan_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Print the version banner to stderr.
pub fn print_banner() {
    let cyan = Style::new().for_stderr().cyan();
    for line in banner_lines(slipscan_core::VERSION) {
        eprintln!("{}", cyan.apply_to(line));
    }
    eprintln!();
}

fn banner_lines(version: &str) -> Vec<String> {
    let title = format!("Slipscan v{version}");
    let tagline = "Payment slips to date and amount";
    let inner_width = title.len().max(tagline.len()) + 4;

    vec![
        String::new(),
        format!("  ┌{:─<width$}┐", "", width = inner_width),
        format!("  │{:^width$}│", title, width = inner_width),
        format!("  │{:^width$}│", tagline, width = inner_width),
        format!("  └{:─<width$}┘", "", width = inner_width),
    ]
}
