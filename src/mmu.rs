use crate::error::Error;
use crate::instruction::{Instruction, InstructionType};

/// Move/push/pop against the CPU's registers and an implicit operand stack.
#[derive(Default)]
pub struct Mmu {
    stack: Vec<u16>,
}

impl Mmu {
    pub fn new() -> Mmu {
        Mmu { stack: Vec::new() }
    }

    pub fn execute(&mut self, instruction: &Instruction) -> Result<(), Error> {
        match instruction.kind {
            InstructionType::Mov => {
                let src = instruction
                    .p1
                    .as_ref()
                    .expect("mov missing source parameter")
                    .value();
                instruction
                    .p0
                    .as_ref()
                    .expect("mov missing destination parameter")
                    .register()
                    .set(src);
            }
            InstructionType::Push => {
                let value = instruction
                    .p0
                    .as_ref()
                    .expect("push missing source parameter")
                    .value();
                self.stack.push(value);
            }
            InstructionType::Pop => {
                let value = self.stack.pop().ok_or(Error::StackUnderflow)?;
                if let Some(dst) = instruction.p0.as_ref() {
                    dst.register().set(value);
                }
            }
            other => panic!("{:?} is not an MMU instruction", other),
        }
        Ok(())
    }
}
