//! The instruction catalogue: mnemonic names, opcode ranges, operand-field
//! layouts and the Macro-Instruction-Detect reserved-range check.
//!
//! This is a closed, declarative replacement for an open class hierarchy of
//! opcode handlers: every entry is a plain [`OpDef`] value in a static
//! table, looked up by linear scan.

pub mod format;
pub mod mnemonic;
pub mod opdef;
mod table;

pub use format::{format_info, ExtensionWords, Field, FormatInfo};
pub use mnemonic::Mnemonic;
pub use opdef::{OpDef, PlatformSupport};
pub use table::MidRange;

use crate::error::{CoreError, CoreResult};
use std::str::FromStr;

/// `true` iff `name` names a catalogued mnemonic (case-sensitive upper-case,
/// e.g. `"MOV"`).
pub fn op_name_is_valid(name: &str) -> bool {
    Mnemonic::from_str(name).is_ok()
}

/// `true` iff `code` falls within some catalogued entry's opcode range.
pub fn opcode_is_valid(code: u16) -> bool {
    table::TABLE.iter().any(|e| e.covers(code))
}

/// Look up the catalogue entry for a mnemonic name.
pub fn get_by_name(name: &str) -> CoreResult<&'static OpDef> {
    let mnemonic = Mnemonic::from_str(name).map_err(|_| CoreError::UnknownOpName(name.to_string()))?;
    table::TABLE
        .iter()
        .find(|e| e.mnemonic == mnemonic)
        .ok_or_else(|| CoreError::UnknownOpName(name.to_string()))
}

/// Look up the catalogue entry whose opcode range covers `code`.
pub fn get_by_opcode(code: u16) -> CoreResult<&'static OpDef> {
    table::TABLE
        .iter()
        .find(|e| e.covers(code))
        .ok_or(CoreError::IllegalOpcode(code))
}

/// `true` iff `code` falls in one of the sixteen Macro-Instruction-Detect
/// reserved intervals. Consulted on every fetch, independent of whether
/// `code` also resolves to a catalogued [`OpDef`] -- flow state `C2`
/// consults this before `A` to route a reserved opcode to the illegal-
/// instruction trap instead of execution.
pub fn opcode_could_be_mid(code: u16) -> bool {
    table::MID_RANGES.iter().any(|r| code >= r.start && code <= r.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn known_mnemonics_resolve_both_ways() {
        let mov = get_by_name("MOV").unwrap();
        assert_eq!(mov.mnemonic, Mnemonic::Mov);
        assert!(opcode_is_valid(mov.opcode));
        let looked_up = get_by_opcode(mov.opcode).unwrap();
        assert_eq!(looked_up.mnemonic, Mnemonic::Mov);
    }

    #[test]
    fn unknown_name_and_opcode_report_the_right_errors() {
        assert!(matches!(get_by_name("FROB"), Err(CoreError::UnknownOpName(_))));
        assert!(matches!(get_by_opcode(0x0000), Err(CoreError::IllegalOpcode(0))));
    }

    #[test]
    fn the_scenario_f_probe_word_is_illegal_and_mid_reserved() {
        assert!(!opcode_is_valid(0x0000));
        assert!(opcode_could_be_mid(0x0000));
    }

    #[quickcheck]
    fn every_opcode_in_an_entrys_range_resolves_back_to_it(seed: u16) -> bool {
        let entry = &table::TABLE[seed as usize % table::TABLE.len()];
        let range_len = entry.opcode_range_len().max(1) as u16;
        let code = entry.opcode.wrapping_add(seed % range_len);
        get_by_opcode(code).map(|e| e.mnemonic) == Ok(entry.mnemonic)
    }
}
