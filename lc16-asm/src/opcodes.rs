use lc16::InstructionType;

/// Looks up a mnemonic in the closed opcode table, returning its
/// `InstructionType` and `(min, max)` parameter arity.
pub fn lookup(mnemonic: &str) -> Option<(InstructionType, usize, usize)> {
    use InstructionType::*;
    Some(match mnemonic {
        "add" => (Add, 2, 2),
        "sub" => (Sub, 2, 2),
        "mul" => (Mul, 2, 2),
        "div" => (Div, 2, 2),
        "and" => (And, 2, 2),
        "or" => (Or, 2, 2),
        "xor" => (Xor, 2, 2),
        "not" => (Not, 1, 1),
        "shl" => (Shl, 2, 2),
        "shr" => (Shr, 2, 2),
        "cmp" => (Cmp, 2, 2),
        "mov" => (Mov, 2, 2),
        "jmp" => (Jmp, 1, 1),
        "jeq" => (Jeq, 1, 1),
        "jne" => (Jne, 1, 1),
        "jlt" => (Jlt, 1, 1),
        "jle" => (Jle, 1, 1),
        "jgt" => (Jgt, 1, 1),
        "jge" => (Jge, 1, 1),
        "call" => (Call, 1, 1),
        "ret" => (Ret, 0, 0),
        "push" => (Push, 1, 1),
        "pop" => (Pop, 0, 1),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_all_twenty_three_mnemonics() {
        let mnemonics = [
            "add", "sub", "mul", "div", "and", "or", "xor", "not", "shl", "shr", "cmp", "mov",
            "jmp", "jeq", "jne", "jlt", "jle", "jgt", "jge", "call", "ret", "push", "pop",
        ];
        assert_eq!(mnemonics.len(), 23);
        for mnemonic in mnemonics {
            assert!(lookup(mnemonic).is_some(), "{} should be recognized", mnemonic);
        }
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        assert!(lookup("nop").is_none());
    }

    #[test]
    fn ret_takes_no_parameters() {
        let (_, min, max) = lookup("ret").unwrap();
        assert_eq!((min, max), (0, 0));
    }

    #[test]
    fn pop_destination_is_optional() {
        let (_, min, max) = lookup("pop").unwrap();
        assert_eq!((min, max), (0, 1));
    }
}
