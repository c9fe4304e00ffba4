use crate::alu::Alu;
use crate::error::Error;
use crate::instruction::Instruction;
use crate::ipu::Ipu;
use crate::mmu::Mmu;
use crate::register::{new_register, Register, RegisterFile};

/// Owns the machine state: eight data registers, the flag register, the
/// overflow register, and the program counter. Dispatches each instruction
/// to the ALU, IPU, or MMU by category.
pub struct Cpu {
    registers: RegisterFile,
    flag: Register,
    overflow: Register,
    pc: usize,
    alu: Alu,
    ipu: Ipu,
    mmu: Mmu,
}

impl Cpu {
    pub fn new() -> Cpu {
        let flag = new_register();
        let overflow = new_register();
        Cpu {
            registers: RegisterFile::new(),
            flag: flag.clone(),
            overflow: overflow.clone(),
            pc: 0,
            alu: Alu::new(flag.clone(), overflow),
            ipu: Ipu::new(flag),
            mmu: Mmu::new(),
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn flag(&self) -> &Register {
        &self.flag
    }

    pub fn overflow(&self) -> &Register {
        &self.overflow
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Executes a single instruction. Resets the flag register first unless
    /// the instruction is IPU-category, since a branch must observe the
    /// flags set by the instruction preceding it.
    pub fn execute(&mut self, instruction: &Instruction) -> Result<(), Error> {
        if !instruction.is_ipu() {
            self.flag.set(0);
        }

        log::trace!("dispatch {:?}", instruction.kind);

        if instruction.is_alu() {
            self.alu.execute(instruction);
            Ok(())
        } else if instruction.is_ipu() {
            self.ipu.execute(instruction, &mut self.pc)
        } else {
            self.mmu.execute(instruction)
        }
    }

    /// Runs a resolved instruction list to completion. There is no explicit
    /// halt opcode in this language; execution simply stops once the
    /// program counter runs past the end of the list.
    pub fn run(&mut self, program: &[Instruction]) -> Result<(), Error> {
        self.pc = 0;
        while self.pc < program.len() {
            log::debug!("pc={} flag={:#04x}", self.pc, self.flag.get());
            self.execute(&program[self.pc])?;
            self.pc = self.pc.wrapping_add(1);
        }
        Ok(())
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}
