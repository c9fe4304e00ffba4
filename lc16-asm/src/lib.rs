//! Tokenizes and assembles lc16 assembly source into a resolved
//! [`lc16::Instruction`] list.
//!
//! Assembling a program is a two-pass affair: [`Parser::new`] tokenizes the
//! source and builds the label map once; [`Parser::make_instruction_set`]
//! resolves every reference against a caller-supplied [`RegisterMap`], and
//! may be called again cheaply as long as the same map is reused.

pub mod encoded;
pub mod error;
pub mod labels;
mod opcodes;
mod parser;
mod register_map;
mod tokenizer;

pub use error::ParserError;
pub use labels::LabelMap;
pub use parser::Parser;
pub use register_map::RegisterMap;
