use crate::register::Register;

/// An instruction operand.
///
/// `Register` is readable and writable. `Constant` is readable only.
/// `MemoryLocation` is neither readable nor writable through the current
/// accessors — any attempt to do so is a programming error in the caller
/// (an already-resolved instruction stream never produces one), not a
/// recoverable condition, so the accessors panic rather than return a
/// `Result`.
#[derive(Clone)]
pub enum Parameter {
    Register(Register),
    Constant(u16),
    MemoryLocation(u16),
}

impl Parameter {
    /// Reads the current value of this parameter.
    pub fn value(&self) -> u16 {
        match self {
            Parameter::Register(cell) => cell.get(),
            Parameter::Constant(value) => *value,
            Parameter::MemoryLocation(_) => {
                panic!("illegal operation: read of a MemoryLocation parameter")
            }
        }
    }

    /// Returns the backing register cell, for instructions that write their
    /// destination operand. Panics if this parameter is not a `Register`.
    pub fn register(&self) -> &Register {
        match self {
            Parameter::Register(cell) => cell,
            Parameter::Constant(_) => panic!("illegal operation: write of a Constant parameter"),
            Parameter::MemoryLocation(_) => {
                panic!("illegal operation: write of a MemoryLocation parameter")
            }
        }
    }

    pub fn is_register(&self) -> bool {
        matches!(self, Parameter::Register(_))
    }
}
