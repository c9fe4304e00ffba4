use crate::error::Error;
use crate::flags;
use crate::instruction::{Instruction, InstructionType};
use crate::register::Register;

/// Conditional-branch unit. Mutates the program counter directly rather than
/// returning a target, since a non-taken branch must leave it untouched.
pub struct Ipu {
    flag: Register,
}

impl Ipu {
    pub fn new(flag: Register) -> Ipu {
        Ipu { flag }
    }

    /// Executes an IPU-category instruction. On a taken branch, sets
    /// `*pc = target - 1` so that the caller's fetch loop (which increments
    /// `pc` after every instruction) lands exactly on `target`.
    pub fn execute(&self, instruction: &Instruction, pc: &mut usize) -> Result<(), Error> {
        let flag = self.flag.get();
        let equal = flags::is_set(flag, flags::EQUAL);
        let less = flags::is_set(flag, flags::LESS);

        let taken = match instruction.kind {
            InstructionType::Jmp => true,
            InstructionType::Jeq => equal,
            InstructionType::Jne => !equal,
            InstructionType::Jlt => less && !equal,
            InstructionType::Jgt => !less && !equal,
            InstructionType::Jle => less || equal,
            InstructionType::Jge => !less || equal,
            InstructionType::Call | InstructionType::Ret => return Err(Error::NotImplemented),
            other => panic!("{:?} is not an IPU instruction", other),
        };

        if taken {
            let target = instruction
                .p0
                .as_ref()
                .expect("branch instruction missing target parameter")
                .value();
            *pc = (target as usize).wrapping_sub(1);
        }

        Ok(())
    }
}
