//! CLI command implementations.

pub mod check;
pub mod config;
pub mod extract;
pub mod interactive;
pub mod normalize;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use slipscan_core::PipelineError;

/// Spinner shown on stderr while waiting on the model.
///
/// indicatif hides it when stderr is not a terminal.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One-line explanation of a failed session for the terminal.
pub(crate) fn describe_failure(error: &PipelineError) -> String {
    if error.is_upload_error() {
        format!("The image could not be used. {error}")
    } else if error.is_auth_error() {
        format!("{error}\n  Check the [bedrock] credentials (`slipscan config show`).")
    } else {
        error.to_string()
    }
}

/// File name of an upload path, for records and prompts.
pub(crate) fn file_name(path: &std::path::Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn upload_failures_are_labelled() {
        let msg = describe_failure(&PipelineError::InvalidImage {
            message: "bad header".to_string(),
        });
        assert!(msg.starts_with("The image could not be used."));
        assert!(msg.contains("bad header"));
    }

    #[test]
    fn preparation_failures_are_upload_failures() {
        let msg = describe_failure(&PipelineError::Timeout {
            stage: "normalize".to_string(),
            timeout_ms: 10000,
        });
        assert!(msg.starts_with("The image could not be used."));

        let msg = describe_failure(&PipelineError::Encode {
            format: "gif".to_string(),
            message: "palette overflow".to_string(),
        });
        assert!(msg.starts_with("The image could not be used."));
    }

    #[test]
    fn auth_failures_point_at_credentials() {
        let msg = describe_failure(&PipelineError::Transport {
            message: "HTTP 403".to_string(),
            status_code: Some(403),
        });
        assert!(msg.contains("[bedrock] credentials"));
    }

    #[test]
    fn other_failures_are_passed_through() {
        let err = PipelineError::MalformedResponse {
            message: "empty content".to_string(),
        };
        assert_eq!(describe_failure(&err), err.to_string());
    }

    #[test]
    fn file_name_of_path() {
        assert_eq!(
            file_name(Path::new("/tmp/slips/slip.jpg")).as_deref(),
            Some("slip.jpg")
        );
        assert_eq!(file_name(Path::new("/")), None);
    }
}
