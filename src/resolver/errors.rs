//! Flag resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while asking the package-configuration tool for flags.
#[derive(Debug, Error)]
pub enum FlagError {
    #[error("`{program}` was not found")]
    ToolNotFound { program: String },

    #[error("failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` failed with exit code {code:?}: {stderr}")]
    QueryFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("no packages to query")]
    NoPackages,
}

impl FlagError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FlagError::ToolNotFound { program } => Diagnostic::error(format!(
                "the package-configuration tool `{}` is not installed or not on PATH",
                program
            ))
            .with_suggestion(suggestions::INSTALL_PKG_CONFIG)
            .with_suggestion(suggestions::RUN_DOCTOR),

            FlagError::Spawn { command, message } => {
                Diagnostic::error(format!("failed to run `{}`", command))
                    .with_context(message.clone())
                    .with_suggestion(suggestions::RUN_DOCTOR)
            }

            FlagError::QueryFailed {
                command,
                code,
                stderr,
            } => {
                let mut diag = Diagnostic::error(format!("`{}` failed", command));
                if let Some(code) = code {
                    diag = diag.with_context(format!("exit code {}", code));
                }
                for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.trim().to_string());
                }
                diag.with_suggestion(suggestions::PKG_CONFIG_PATH)
            }

            FlagError::NoPackages => Diagnostic::error("no pkg-config packages to query")
                .with_suggestion("List packages under `extension.pkg-config` in Setup.toml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failed_diagnostic_lists_stderr() {
        let err = FlagError::QueryFailed {
            command: "pkg-config --libs --cflags king".to_string(),
            code: Some(1),
            stderr: "Package king was not found in the pkg-config search path.\n".to_string(),
        };

        let diag = err.to_diagnostic();
        assert!(diag.context.iter().any(|c| c == "exit code 1"));
        assert!(diag
            .context
            .iter()
            .any(|c| c.contains("Package king was not found")));
        assert_eq!(diag.suggestions[0], suggestions::PKG_CONFIG_PATH);
    }

    #[test]
    fn test_tool_not_found_message() {
        let err = FlagError::ToolNotFound {
            program: "pkg-config".to_string(),
        };
        assert_eq!(err.to_string(), "`pkg-config` was not found");
        assert!(err
            .to_diagnostic()
            .message
            .contains("not installed or not on PATH"));
    }
}
