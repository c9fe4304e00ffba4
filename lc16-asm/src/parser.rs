use crate::encoded::{Encoded, EncodedParam, PartialInstr};
use crate::error::ParserError;
use crate::labels::{self, LabelMap};
use crate::register_map::RegisterMap;
use crate::tokenizer::{split_line, FeedOutcome, Tokenizer};
use lc16::register::{new_register_with, Register};
use lc16::{Instruction, Parameter};
use std::path::Path;

/// Assembles source text into a resolved instruction stream.
///
/// Parsing and label discovery happen once, in [`Parser::new`]. Resolving
/// references against a [`RegisterMap`] happens lazily, in
/// [`Parser::make_instruction_set`], and its result is cached: calling it
/// again with the same register map is a no-op, matching the reference
/// assembler's cache keyed on the map's identity rather than its contents.
pub struct Parser {
    encoded: Vec<Encoded>,
    labels: LabelMap,
    instruction_count: u32,
    cache: Option<((usize, usize), Vec<Instruction>)>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Parser, ParserError> {
        let encoded = tokenize(source)?;
        let (labels, instruction_count) = labels::build(&encoded);
        Ok(Parser {
            encoded,
            labels,
            instruction_count,
            cache: None,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Parser, ParserError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ParserError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Parser::new(&source)
    }

    /// Resolves every reference against `registers` and returns the
    /// instruction stream, rebuilding it only if `registers` is a different
    /// map than the one the cached result was resolved against.
    pub fn make_instruction_set(
        &mut self,
        registers: &RegisterMap,
    ) -> Result<&[Instruction], ParserError> {
        let key = registers.identity_key();
        let stale = match &self.cache {
            Some((cached_key, _)) => *cached_key != key,
            None => true,
        };
        if stale {
            let resolved = self.resolve(registers)?;
            self.cache = Some((key, resolved));
        }
        Ok(&self.cache.as_ref().unwrap().1)
    }

    fn resolve(&self, registers: &RegisterMap) -> Result<Vec<Instruction>, ParserError> {
        let constants = constants_pool(self.instruction_count);
        let mut resolved = Vec::with_capacity(self.instruction_count as usize);
        let mut index = 0u32;
        for item in &self.encoded {
            if let Encoded::Instr(partial) = item {
                resolved.push(self.resolve_instr(partial, index, registers, &constants)?);
                index += 1;
            }
        }
        Ok(resolved)
    }

    fn resolve_instr(
        &self,
        partial: &PartialInstr,
        instruction_index: u32,
        registers: &RegisterMap,
        constants: &[Register],
    ) -> Result<Instruction, ParserError> {
        let p0 = partial
            .p0
            .as_ref()
            .map(|p| self.resolve_param(p, instruction_index, registers, constants))
            .transpose()?;
        let p1 = partial
            .p1
            .as_ref()
            .map(|p| self.resolve_param(p, instruction_index, registers, constants))
            .transpose()?;
        Ok(Instruction::new(partial.kind, p0, p1))
    }

    fn resolve_param(
        &self,
        param: &EncodedParam,
        instruction_index: u32,
        registers: &RegisterMap,
        constants: &[Register],
    ) -> Result<Parameter, ParserError> {
        match param {
            EncodedParam::Constant(value) => Ok(Parameter::Constant(*value as u16)),
            EncodedParam::Reference(name) => {
                if let Some(&target) = self.labels.get(name) {
                    Ok(Parameter::Register(constants[target as usize].clone()))
                } else if let Some(register) = registers.get(name) {
                    Ok(Parameter::Register(register.clone()))
                } else {
                    Err(ParserError::UndefinedReference {
                        instruction_index,
                        token: name.clone(),
                    })
                }
            }
        }
    }
}

/// Builds the pool of registers that labels resolve into: cell `i` is
/// pre-loaded with the value `i`, so a `jmp loop` reads the instruction
/// index `loop` attaches to as if it had been written as a numeric literal,
/// while still behaving as an ordinary (read-only, in practice) register
/// parameter to the rest of the crate.
fn constants_pool(instruction_count: u32) -> Vec<Register> {
    (0..=instruction_count)
        .map(|i| new_register_with(i as u16))
        .collect()
}

fn tokenize(source: &str) -> Result<Vec<Encoded>, ParserError> {
    let mut tokenizer = Tokenizer::new();
    let mut encoded = Vec::new();
    let mut last_line = 0u32;

    for (line_index, line) in source.lines().enumerate() {
        let line_number = (line_index + 1) as u32;
        last_line = line_number;
        tokenizer.new_line();
        for (token, column) in split_line(line) {
            match tokenizer.feed(token) {
                Ok(FeedOutcome::Nothing) => {}
                Ok(FeedOutcome::Emit(item)) => encoded.push(item),
                Err(err) => {
                    return Err(ParserError::InvalidToken {
                        line: line_number,
                        column: column + err.column_offset,
                        token: err.token,
                    })
                }
            }
        }
    }

    if tokenizer.incomplete() {
        return Err(ParserError::InvalidToken {
            line: last_line,
            column: 0,
            token: "<EOF>".to_string(),
        });
    }
    if let Some(item) = tokenizer.take_remaining() {
        encoded.push(item);
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc16::Cpu;

    #[test]
    fn assembles_and_resolves_against_named_registers() {
        let mut cpu = Cpu::new();
        let registers = RegisterMap::named_data_registers(cpu.registers());
        let mut parser = Parser::new("mov r0 10;\nadd r0 r0;\n").unwrap();

        let instructions = parser.make_instruction_set(&registers).unwrap();
        assert_eq!(instructions.len(), 2);

        cpu.run(instructions).unwrap();
        assert_eq!(cpu.registers().get(0).get(), 20);
    }

    #[test]
    fn undefined_reference_names_the_offending_instruction() {
        let registers = RegisterMap::new();
        let mut parser = Parser::new("mov r0 10;\n").unwrap();
        let err = parser.make_instruction_set(&registers).unwrap_err();
        match err {
            ParserError::UndefinedReference { instruction_index, token } => {
                assert_eq!(instruction_index, 0);
                assert_eq!(token, "r0");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn label_resolves_to_its_instruction_index() {
        let mut cpu = Cpu::new();
        let registers = RegisterMap::named_data_registers(cpu.registers());
        let source = "mov r0 0;\nloop:\nadd r0 r0;\njmp loop;\n";
        let mut parser = Parser::new(source).unwrap();
        let instructions = parser.make_instruction_set(&registers).unwrap();

        let target = instructions[2].p0.as_ref().unwrap().value();
        assert_eq!(target, 1);
    }

    #[test]
    fn repeated_calls_with_same_map_reuse_the_cached_resolution() {
        let cpu = Cpu::new();
        let registers = RegisterMap::named_data_registers(cpu.registers());
        let mut parser = Parser::new("ret;\n").unwrap();
        parser.make_instruction_set(&registers).unwrap();
        let first_len = parser.make_instruction_set(&registers).unwrap().len();
        assert_eq!(first_len, 1);
    }

    #[test]
    fn invalid_token_reports_line_and_column() {
        let err = Parser::new("mov r0 10;\nbogus r1 r2;\n").unwrap_err();
        match err {
            ParserError::InvalidToken { line, column, token } => {
                assert_eq!(line, 2);
                assert_eq!(column, 1);
                assert_eq!(token, "bogus");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn mid_instruction_eof_reports_the_eof_token() {
        let err = Parser::new("mov r0").unwrap_err();
        match err {
            ParserError::InvalidToken { token, .. } => assert_eq!(token, "<EOF>"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
