//! Decoded instructions and the ordered instruction list.
//!
//! The parser lowers source text into a flat, source-ordered list of
//! [`ParsedInstruction`]. That order is significant everywhere: it is the
//! control-flow order, the validation scan order, and the emission order,
//! and it is never reordered between passes.

/// One decoded source instruction.
///
/// By the parser's contract the opcode indexes a valid catalog entry and
/// `parameters.len()` equals that entry's arity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInstruction {
    /// Opcode selecting the catalog entry.
    pub opcode: u8,
    /// Parameter texts, up to two.
    pub parameters: Vec<String>,
    /// Which parameter is dereferenced: 0 = none, 1 = first, 2 = second.
    pub pointer_param: u8,
    /// Source line number (1-indexed).
    pub line: u32,
    /// Cleared by the external dead-code pass to mean "keep for
    /// bookkeeping but do not emit".
    pub translate: bool,
}

impl ParsedInstruction {
    /// Create an instruction with no pointer parameter, marked for emission.
    pub fn new(opcode: u8, parameters: &[&str], line: u32) -> Self {
        Self {
            opcode,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            pointer_param: 0,
            line,
            translate: true,
        }
    }

    /// Mark parameter `n` (1-based) as dereferenced.
    pub fn with_pointer(mut self, n: u8) -> Self {
        self.pointer_param = n;
        self
    }

    /// Mark this instruction as removed by the dead-code pass.
    pub fn pruned(mut self) -> Self {
        self.translate = false;
        self
    }
}

/// The source-ordered instruction list.
#[derive(Debug, Clone, Default)]
pub struct InstructionList {
    instructions: Vec<ParsedInstruction>,
    /// Position at which the runtime-random-jump-target label is emitted,
    /// regardless of which instruction occupies the slot or whether that
    /// instruction survives dead-code elimination.
    pub random_slot: usize,
}

impl InstructionList {
    /// Wrap a parsed instruction sequence. The random slot defaults to 0.
    pub fn new(instructions: Vec<ParsedInstruction>) -> Self {
        Self {
            instructions,
            random_slot: 0,
        }
    }

    /// Set the designated random-jump slot, chosen upstream.
    pub fn with_random_slot(mut self, slot: usize) -> Self {
        self.random_slot = slot;
        self
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParsedInstruction> {
        self.instructions.iter()
    }

    pub fn as_slice(&self) -> &[ParsedInstruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&ParsedInstruction> {
        self.instructions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_instruction_defaults_to_translated() {
        let inst = ParsedInstruction::new(10, &["rax", "5"], 3);
        assert!(inst.translate);
        assert_eq!(inst.pointer_param, 0);
        assert_eq!(inst.parameters, vec!["rax", "5"]);
    }

    #[test]
    fn pruned_clears_translate_only() {
        let inst = ParsedInstruction::new(16, &[], 7).pruned();
        assert!(!inst.translate);
        assert_eq!(inst.line, 7);
    }

    #[test]
    fn list_preserves_source_order() {
        let list = InstructionList::new(vec![
            ParsedInstruction::new(0, &["f"], 1),
            ParsedInstruction::new(3, &[], 2),
        ]);
        let lines: Vec<u32> = list.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 2]);
    }
}
