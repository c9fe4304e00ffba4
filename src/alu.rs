use crate::flags;
use crate::instruction::{Instruction, InstructionType};
use crate::register::Register;

type BinaryOperator = fn(u16, u16) -> u32;
type OverflowConsumer = fn(&Register, u16);

fn sum(lhs: u16, rhs: u16) -> u32 {
    lhs as u32 + rhs as u32
}

fn sub(lhs: u16, rhs: u16) -> u32 {
    (lhs as u32).wrapping_sub(rhs as u32)
}

fn mul(lhs: u16, rhs: u16) -> u32 {
    lhs as u32 * rhs as u32
}

fn and(lhs: u16, rhs: u16) -> u32 {
    (lhs & rhs) as u32
}

fn or(lhs: u16, rhs: u16) -> u32 {
    (lhs | rhs) as u32
}

fn xor(lhs: u16, rhs: u16) -> u32 {
    (lhs ^ rhs) as u32
}

fn shl(lhs: u16, rhs: u16) -> u32 {
    if rhs >= 32 {
        0
    } else {
        (lhs as u32) << (rhs as u32)
    }
}

fn shr(lhs: u16, rhs: u16) -> u32 {
    if rhs >= 32 {
        0
    } else {
        (lhs as u32) >> (rhs as u32)
    }
}

fn not(lhs: u16, _rhs: u16) -> u32 {
    !(lhs as u32) & 0xFFFF
}

/// Packs quotient into the low 16 bits and remainder into the high 16 bits,
/// the way the accept-overflow consumer expects. Caller must check for a
/// zero divisor first.
fn div2(lhs: u16, rhs: u16) -> u32 {
    let remainder = lhs % rhs;
    let quotient = lhs / rhs;
    ((remainder as u32) << 16) | (quotient as u32 & 0xFFFF)
}

fn accept_overflow(dst: &Register, value: u16) {
    dst.set(value);
}

fn ignore_overflow(_dst: &Register, _value: u16) {}

/// 16-bit arithmetic/logic unit with a 32-bit intermediate and a shared
/// overflow register.
pub struct Alu {
    flag: Register,
    overflow: Register,
}

impl Alu {
    pub fn new(flag: Register, overflow: Register) -> Alu {
        Alu { flag, overflow }
    }

    fn compute(&self, op: BinaryOperator, dst: &Register, rhs: u16, consumer: OverflowConsumer) {
        let result = op(dst.get(), rhs);
        dst.set((result & 0xFFFF) as u16);
        consumer(&self.overflow, ((result >> 16) & 0xFFFF) as u16);
    }

    fn div(&self, dst: &Register, rhs: u16) {
        if rhs == 0 {
            self.flag.set(self.flag.get() | flags::DIV_ZERO);
            return;
        }
        self.compute(div2, dst, rhs, accept_overflow);
    }

    fn cmp(&self, lhs: u16, rhs: u16) {
        if lhs == rhs {
            self.flag.set(self.flag.get() | flags::EQUAL);
        } else if lhs < rhs {
            self.flag.set(self.flag.get() | flags::LESS);
        }
    }

    /// Executes an ALU-category instruction. `p0` must be a writable
    /// register parameter; `p1` must be present and readable.
    pub fn execute(&self, instruction: &Instruction) {
        let p0 = instruction
            .p0
            .as_ref()
            .expect("ALU instruction missing first parameter");
        let p1 = instruction
            .p1
            .as_ref()
            .expect("ALU instruction missing second parameter");

        let dst = p0.register();
        let rhs = p1.value();

        match instruction.kind {
            InstructionType::Add => self.compute(sum, dst, rhs, ignore_overflow),
            InstructionType::Sub => self.compute(sub, dst, rhs, accept_overflow),
            InstructionType::Mul => self.compute(mul, dst, rhs, ignore_overflow),
            InstructionType::Div => self.div(dst, rhs),
            InstructionType::And => self.compute(and, dst, rhs, ignore_overflow),
            InstructionType::Or => self.compute(or, dst, rhs, ignore_overflow),
            InstructionType::Xor => self.compute(xor, dst, rhs, ignore_overflow),
            InstructionType::Shl => self.compute(shl, dst, rhs, ignore_overflow),
            InstructionType::Shr => self.compute(shr, dst, rhs, ignore_overflow),
            InstructionType::Not => self.compute(not, dst, rhs, ignore_overflow),
            InstructionType::Cmp => self.cmp(dst.get(), rhs),
            other => panic!("{:?} is not an ALU instruction", other),
        }

        debug_assert!(
            !flags::is_set(self.flag.get(), flags::ILLEGAL)
                && !flags::is_set(self.flag.get(), flags::MULTISTATE)
                && !flags::is_set(self.flag.get(), flags::SEG),
            "ALU execution raised a reserved flag"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::new_register_with;

    fn alu() -> (Alu, Register, Register) {
        let flag = new_register_with(0);
        let overflow = new_register_with(0);
        (Alu::new(flag.clone(), overflow.clone()), flag, overflow)
    }

    fn binary(kind: InstructionType, lhs: u16, rhs: u16) -> (u16, u16, u16) {
        let (alu, flag, overflow) = alu();
        let dst = new_register_with(lhs);
        let instr = Instruction::new(
            kind,
            Some(crate::Parameter::Register(dst.clone())),
            Some(crate::Parameter::Constant(rhs)),
        );
        alu.execute(&instr);
        (dst.get(), overflow.get(), flag.get())
    }

    #[test]
    fn add_wraps_and_ignores_overflow() {
        let (result, overflow, _) = binary(InstructionType::Add, 0xFFFF, 0x0001);
        assert_eq!(result, 0x0000);
        assert_eq!(overflow, 0);
    }

    #[test]
    fn sub_underflow_writes_overflow_register() {
        let (result, overflow, _) = binary(InstructionType::Sub, 0x0000, 0x0001);
        assert_eq!(result, 0xFFFF);
        assert_eq!(overflow, 0xFFFF);
    }

    #[test]
    fn div_by_zero_sets_flag_and_leaves_dst() {
        let (result, _, flag) = binary(InstructionType::Div, 10, 0);
        assert_eq!(result, 10);
        assert_eq!(flag, flags::DIV_ZERO);
    }

    #[test]
    fn div_packs_quotient_and_remainder() {
        let (result, overflow, _) = binary(InstructionType::Div, 10, 3);
        assert_eq!(result, 3);
        assert_eq!(overflow, 1);
    }

    #[test]
    fn cmp_sets_equal_and_does_not_write_dst() {
        let (result, _, flag) = binary(InstructionType::Cmp, 5, 5);
        assert_eq!(result, 5);
        assert_eq!(flag, flags::EQUAL);
    }

    #[test]
    fn cmp_sets_less_when_lhs_smaller() {
        let (_, _, flag) = binary(InstructionType::Cmp, 4, 5);
        assert_eq!(flag, flags::LESS);
    }
}
