//! [`Instruction`]: a decoded opcode word plus its resolved argument values.

use std::collections::BTreeMap;

use crate::catalogue::{self, OpDef};
use crate::error::{CoreError, CoreResult};

/// One decoded instruction: the catalogue entry it resolved to, the raw
/// opcode word it was decoded from, any format-mandated or addressing-mode
/// extension words, and the named argument values extracted from those
/// words.
///
/// Built by [`crate::decode::decode`] from a fetched opcode word, or by
/// [`Instruction::from_mnemonic`] when assembling one programmatically (used
/// by tests and by [`crate::decode::encode`]'s round-trip partner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    op: &'static OpDef,
    /// The opcode word exactly as fetched (argument bits included).
    effective_opcode: u16,
    /// Format-mandated second opcode word, if `op.extension` calls for one
    /// and this instruction has not yet had it attached (decode attaches it
    /// right after resolving the opcode against the catalogue).
    second_opcode_word: Option<u16>,
    /// Named argument field values, keyed by [`crate::catalogue::Field::name`].
    params: BTreeMap<&'static str, u16>,
}

impl Instruction {
    /// Build an instruction from a fetched opcode word. Extracts every
    /// argument field declared on the resolved [`OpDef`] but does not yet
    /// resolve addressing-mode extension words -- that is the decoder's
    /// job, not this constructor's.
    pub fn from_opcode(effective_opcode: u16) -> CoreResult<Self> {
        let op = catalogue::get_by_opcode(effective_opcode)?;
        let mut params = BTreeMap::new();
        for field in op.args {
            let shift = 16u32
                .checked_sub(field.bit_offset as u32 + field.bit_width as u32)
                .ok_or_else(|| CoreError::CoreBug(format!("field {} overruns the word", field.name)))?;
            let mask = (1u16 << field.bit_width) - 1;
            params.insert(field.name, (effective_opcode >> shift) & mask);
        }
        Ok(Self {
            op,
            effective_opcode,
            second_opcode_word: None,
            params,
        })
    }

    /// Build an instruction by mnemonic name and explicit named argument
    /// values, packing them into a fresh opcode word. Used by assemblers
    /// (tests, [`crate::decode::encode`]'s callers) rather than the fetch
    /// path.
    pub fn from_mnemonic(name: &str, params: BTreeMap<&'static str, u16>) -> CoreResult<Self> {
        let op = catalogue::get_by_name(name)?;
        let mut word = op.opcode;
        for field in op.args {
            let value = *params.get(field.name).unwrap_or(&0);
            let shift = 16u32
                .checked_sub(field.bit_offset as u32 + field.bit_width as u32)
                .ok_or_else(|| CoreError::CoreBug(format!("field {} overruns the word", field.name)))?;
            word |= (value & ((1u16 << field.bit_width) - 1)) << shift;
        }
        Ok(Self {
            op,
            effective_opcode: word,
            second_opcode_word: None,
            params,
        })
    }

    /// The catalogue entry this instruction resolved to.
    pub fn opcode_info(&self) -> &'static OpDef {
        self.op
    }

    /// The opcode word as fetched, argument bits included.
    pub const fn effective_opcode(&self) -> u16 {
        self.effective_opcode
    }

    /// The format-mandated second opcode word, if attached.
    pub const fn second_opcode_word(&self) -> Option<u16> {
        self.second_opcode_word
    }

    /// Attach the format-mandated second opcode word (the immediate value
    /// for format 8, a second opcode word for the reserved two-word shape).
    pub fn set_second_opcode_word(&mut self, word: u16) {
        self.second_opcode_word = Some(word);
    }

    /// The value of the one format-mandated immediate word (format 8),
    /// if this instruction carries one.
    pub fn immediate_value(&self) -> Option<u16> {
        self.second_opcode_word
    }

    /// Named argument field value, or `0` if the field is not present on
    /// this instruction's format.
    pub fn param(&self, name: &str) -> u16 {
        *self.params.get(name).unwrap_or(&0)
    }

    /// Record an addressing-mode extension-word value (`"s_ext"`/`"d_ext"`)
    /// resolved during decode. Not a declared format field, so it is kept
    /// separate from `args_bit_width` accounting.
    pub fn set_extension_param(&mut self, name: &'static str, value: u16) {
        self.params.insert(name, value);
    }

    /// All named argument field values.
    pub fn params(&self) -> &BTreeMap<&'static str, u16> {
        &self.params
    }

    /// `true` iff every field this instruction's format declares has
    /// resolved and, if the format mandates an extension word, it has been
    /// attached. Checked by the decoder before handing the instruction to
    /// the execution pipeline.
    pub fn is_finalized(&self) -> bool {
        let needs_extension = !matches!(self.op.extension, crate::catalogue::ExtensionWords::None);
        !needs_extension || self.second_opcode_word.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_opcode_extracts_format_1_fields() {
        // MOV R3,R5: MOV base 0xC000, td=0 (register), d=5, ts=0, s=3.
        let word = 0xC000 | (5 << 6) | 3;
        let instr = Instruction::from_opcode(word).unwrap();
        assert_eq!(instr.opcode_info().mnemonic, crate::catalogue::Mnemonic::Mov);
        assert_eq!(instr.param("d"), 5);
        assert_eq!(instr.param("s"), 3);
        assert_eq!(instr.param("td"), 0);
        assert_eq!(instr.param("ts"), 0);
    }

    #[test]
    fn from_mnemonic_packs_fields_back_into_the_same_word() {
        let word = 0xC000 | (5 << 6) | 3;
        let mut params = BTreeMap::new();
        params.insert("d", 5);
        params.insert("s", 3);
        let instr = Instruction::from_mnemonic("MOV", params).unwrap();
        assert_eq!(instr.effective_opcode(), word);
    }

    #[test]
    fn format_8_instruction_is_not_finalized_until_the_immediate_word_is_attached() {
        let mut params = BTreeMap::new();
        params.insert("d", 0);
        let mut instr = Instruction::from_mnemonic("LI", params).unwrap();
        assert!(!instr.is_finalized());
        instr.set_second_opcode_word(0x0042);
        assert!(instr.is_finalized());
        assert_eq!(instr.immediate_value(), Some(0x0042));
    }
}
