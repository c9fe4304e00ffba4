use crate::encoded::Encoded;
use std::collections::HashMap;

/// Maps a label name to the index of the instruction it attaches to.
pub type LabelMap = HashMap<String, u32>;

/// Walks the tokenizer's output once, in order, building the label map and
/// counting the instructions that will ultimately be emitted. A label
/// attaches to the count as it stands when the label is seen, since that is
/// the index of the next instruction to be emitted — labels themselves
/// never occupy a slot.
pub fn build(encoded: &[Encoded]) -> (LabelMap, u32) {
    let mut map = LabelMap::new();
    let mut count = 0u32;
    for item in encoded {
        match item {
            Encoded::Label(name) => declare(&mut map, name.clone(), count),
            Encoded::Instr(_) => count += 1,
        }
    }
    (map, count)
}

/// Records a label declaration. The first declaration of a given name wins;
/// later re-declarations of the same name are silently ignored, matching
/// the reference tool's associative-map insertion (a no-op on an existing
/// key) rather than overwriting.
pub fn declare(map: &mut LabelMap, name: String, instruction_index: u32) {
    map.entry(name).or_insert(instruction_index);
}

/// A label must be non-empty and start with a letter or underscore. The
/// rest of the name is unconstrained, matching the reference tool, which
/// imposes no further character restriction.
pub fn is_valid_label(name: &str) -> bool {
    match name.chars().next() {
        Some(c) => c.is_ascii_alphabetic() || c == '_',
        None => false,
    }
}
