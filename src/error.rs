use thiserror::Error;

/// Errors that can occur while executing an already-resolved instruction
/// stream. Distinct from assembly-time errors, which live in `lc16-asm`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("call/ret are not implemented")]
    NotImplemented,
    #[error("pop from an empty stack")]
    StackUnderflow,
}
