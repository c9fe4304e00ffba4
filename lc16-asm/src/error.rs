use thiserror::Error;

/// Errors raised while tokenizing, constructing, or resolving an assembly
/// source.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("line {line}, column {column}: invalid token \"{token}\"")]
    InvalidToken {
        line: u32,
        column: u32,
        token: String,
    },

    #[error("instruction {instruction_index}: undefined reference \"{token}\"")]
    UndefinedReference { instruction_index: u32, token: String },

    #[error("failed to read \"{path}\"")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
