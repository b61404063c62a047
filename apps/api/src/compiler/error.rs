use thiserror::Error;

/// Failures the pipeline can hit. Only the facade turns these into output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Unclosed brace in \\{command} argument near \"{snippet}\"")]
    UnbalancedBraces { command: String, snippet: String },

    #[error("Compiler crashed: {0}")]
    Panicked(String),
}

impl CompileError {
    pub(crate) fn unbalanced(command: &str, rest: &str) -> Self {
        let snippet: String = rest.chars().take(40).collect();
        CompileError::UnbalancedBraces {
            command: command.to_string(),
            snippet: snippet.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}
