use thiserror::Error;

/// Errors raised while compiling or evaluating a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The expression could not be parsed, uses unsupported syntax, or
    /// applied an operation to a value of the wrong type.
    #[error("invalid expression `{expression}`: {message}")]
    InvalidExpression {
        /// The expression as given.
        expression: String,
        /// What was wrong, with a character offset where one is known.
        message: String,
    },
    /// Single-node mode found nothing.
    #[error("no match for `{expression}`")]
    NoMatch {
        /// The expression as given.
        expression: String,
    },
}

impl QueryError {
    pub(crate) fn invalid(expression: &str, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}
