use crate::types::SourceSpan;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LSystemError {
    #[error("Syntax error at {span}: {message}")]
    Syntax { message: String, span: SourceSpan },

    #[error("Probability error: {message}")]
    Probability { message: String, spans: Vec<SourceSpan> },

    #[error("Rule conflict: {message}")]
    Conflict { message: String, spans: Vec<SourceSpan> },

    #[error("Internal compiler error at {span}: {message}")]
    Internal { message: String, span: SourceSpan },

    #[error("Global parameter mismatch: expected {expected}, got {actual}")]
    GlobalParameterMismatch { expected: usize, actual: usize },

    #[error("Malformed symbol string: {0}")]
    MalformedString(String),

    #[error("Step {step} was cancelled")]
    Cancelled { step: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LSystemError {
    pub fn syntax(message: impl Into<String>, span: SourceSpan) -> Self {
        LSystemError::Syntax {
            message: message.into(),
            span,
        }
    }

    /// Source locations this error points at.
    pub fn spans(&self) -> Vec<SourceSpan> {
        match self {
            LSystemError::Syntax { span, .. } | LSystemError::Internal { span, .. } => vec![*span],
            LSystemError::Probability { spans, .. } | LSystemError::Conflict { spans, .. } => {
                spans.clone()
            }
            _ => Vec::new(),
        }
    }

    /// Re-bases every span by `by`. Used when an error raised on a fragment is lifted
    /// into the text that contains it.
    pub fn offset_by(self, by: usize) -> Self {
        match self {
            LSystemError::Syntax { message, span } => LSystemError::Syntax {
                message,
                span: span.shifted(by),
            },
            LSystemError::Internal { message, span } => LSystemError::Internal {
                message,
                span: span.shifted(by),
            },
            LSystemError::Probability { message, spans } => LSystemError::Probability {
                message,
                spans: spans.iter().map(|s| s.shifted(by)).collect(),
            },
            LSystemError::Conflict { message, spans } => LSystemError::Conflict {
                message,
                spans: spans.iter().map(|s| s.shifted(by)).collect(),
            },
            other => other,
        }
    }

    /// Renders the error against the text it was raised on, bracketing the offending slice.
    pub fn render(&self, source: &str) -> String {
        let mut out = self.to_string();
        for span in self.spans() {
            let chars: Vec<char> = source.chars().collect();
            let start = span.offset.min(chars.len());
            let end = span.end().min(chars.len());
            let before: String = chars[..start].iter().collect();
            let inside: String = chars[start..end].iter().collect();
            let after: String = chars[end..].iter().collect();
            out.push_str(&format!("\n  {}>>{}<<{}", before, inside, after));
        }
        out
    }
}

pub type Result<T> = std::result::Result<T, LSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_by_shifts_syntax_span() {
        let err = LSystemError::syntax("bad", SourceSpan::new(2, 3)).offset_by(10);
        assert_eq!(err.spans(), vec![SourceSpan::new(12, 3)]);
    }

    #[test]
    fn test_render_brackets_offending_slice() {
        let err = LSystemError::syntax("unknown", SourceSpan::new(5, 1));
        let rendered = err.render("A -> (B");
        assert!(rendered.contains("A -> >>(<<B"));
    }
}
