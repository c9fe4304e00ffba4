use lc16::{Register, RegisterFile};
use std::collections::HashMap;

/// The caller-supplied mapping from an identifier used in source text to a
/// register cell, consulted when a reference does not name a label.
///
/// Resolved instruction lists are cached against this map's identity (see
/// [`Parser::make_instruction_set`](crate::Parser::make_instruction_set)):
/// reusing the same `RegisterMap` across calls skips re-resolution, the way
/// the reference tool keys its cache off `(count, base pointer)`.
pub struct RegisterMap {
    cells: HashMap<String, Register>,
}

impl RegisterMap {
    pub fn new() -> RegisterMap {
        RegisterMap {
            cells: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, register: Register) {
        self.cells.insert(name.into(), register);
    }

    pub fn get(&self, name: &str) -> Option<&Register> {
        self.cells.get(name)
    }

    /// Builds a `RegisterMap` naming a CPU's eight data registers
    /// `r0`..`r7`, the conventional binding for running an assembled
    /// program against a fresh `Cpu`.
    pub fn named_data_registers(registers: &RegisterFile) -> RegisterMap {
        let mut map = RegisterMap::new();
        for (index, register) in registers.iter().enumerate() {
            map.insert(format!("r{}", index), register.clone());
        }
        map
    }

    pub(crate) fn identity_key(&self) -> (usize, usize) {
        (self.cells.len(), self as *const RegisterMap as usize)
    }
}

impl Default for RegisterMap {
    fn default() -> RegisterMap {
        RegisterMap::new()
    }
}
