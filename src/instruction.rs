use crate::parameter::Parameter;

/// The kind of an instruction. Variants are grouped into three contiguous
/// ranges — ALU, IPU, MMU — so that category membership can be decided with
/// a single range check instead of a per-variant match.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum InstructionType {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Cmp,

    Jmp,
    Jeq,
    Jne,
    Jlt,
    Jle,
    Jgt,
    Jge,
    Call,
    Ret,

    Mov,
    Push,
    Pop,
}

const ALU_RANGE: std::ops::RangeInclusive<u8> = InstructionType::Add as u8..=InstructionType::Cmp as u8;
const IPU_RANGE: std::ops::RangeInclusive<u8> = InstructionType::Jmp as u8..=InstructionType::Ret as u8;
const MMU_RANGE: std::ops::RangeInclusive<u8> = InstructionType::Mov as u8..=InstructionType::Pop as u8;

impl InstructionType {
    pub fn is_alu(self) -> bool {
        ALU_RANGE.contains(&(self as u8))
    }

    pub fn is_ipu(self) -> bool {
        IPU_RANGE.contains(&(self as u8))
    }

    pub fn is_mmu(self) -> bool {
        MMU_RANGE.contains(&(self as u8))
    }
}

/// A fully resolved instruction: an opcode and up to two operands.
pub struct Instruction {
    pub kind: InstructionType,
    pub p0: Option<Parameter>,
    pub p1: Option<Parameter>,
}

impl Instruction {
    pub fn new(kind: InstructionType, p0: Option<Parameter>, p1: Option<Parameter>) -> Instruction {
        Instruction { kind, p0, p1 }
    }

    pub fn is_alu(&self) -> bool {
        self.kind.is_alu()
    }

    pub fn is_ipu(&self) -> bool {
        self.kind.is_ipu()
    }

    pub fn is_mmu(&self) -> bool {
        self.kind.is_mmu()
    }
}
