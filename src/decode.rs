//! The bidirectional instruction codec: fetch an opcode word (and whatever
//! extension words its format and addressing modes mandate) out of memory
//! and produce a finalized [`Instruction`], or serialize one back out.

use crate::catalogue::ExtensionWords;
use crate::error::CoreResult;
use crate::instruction::Instruction;
use crate::memory::MemoryBus;

/// Addressing-mode value meaning "symbolic (register 0) / indexed (register
/// != 0)" -- the one mode that consumes its own extension word.
const MODE_SYMBOLIC_OR_INDEXED: u16 = 2;

/// Decode the instruction at `pc`, consuming every extension word its
/// format and operand addressing modes require.
///
/// Steps:
/// 1. Fetch the opcode word at `pc`.
/// 2. Resolve it against the catalogue.
/// 3. Extract the format's named argument fields from the opcode word.
/// 4. If the format mandates an extension word (format 8's immediate),
///    fetch it.
/// 5. If the source operand's addressing mode is symbolic/indexed, fetch
///    its extension word.
/// 6. If the destination operand's addressing mode is symbolic/indexed,
///    fetch its extension word.
/// 7. Return the finalized instruction and the program counter positioned
///    just past every word consumed.
pub fn decode(memory: &impl MemoryBus, pc: u16) -> CoreResult<(Instruction, u16)> {
    let mut cursor = pc;
    let opcode_word = memory.read_word(cursor);
    cursor = cursor.wrapping_add(2);

    let mut instr = Instruction::from_opcode(opcode_word)?;

    if matches!(instr.opcode_info().extension, ExtensionWords::ImmediateWord) {
        instr.set_second_opcode_word(memory.read_word(cursor));
        cursor = cursor.wrapping_add(2);
    }

    if instr.params().contains_key("ts") && instr.param("ts") == MODE_SYMBOLIC_OR_INDEXED {
        let ext = memory.read_word(cursor);
        cursor = cursor.wrapping_add(2);
        instr.set_extension_param("s_ext", ext);
    }

    if instr.params().contains_key("td") && instr.param("td") == MODE_SYMBOLIC_OR_INDEXED {
        let ext = memory.read_word(cursor);
        cursor = cursor.wrapping_add(2);
        instr.set_extension_param("d_ext", ext);
    }

    Ok((instr, cursor))
}

/// Serialize `instr` back into the sequence of words [`decode`] would have
/// consumed to produce it: the opcode word, then the format-mandated
/// extension word (if any), then the source and destination addressing-mode
/// extension words (if their modes are symbolic/indexed).
pub fn encode(instr: &Instruction) -> Vec<u16> {
    let mut words = vec![instr.effective_opcode()];
    if let Some(w) = instr.second_opcode_word() {
        words.push(w);
    }
    if instr.params().contains_key("ts") && instr.param("ts") == MODE_SYMBOLIC_OR_INDEXED {
        words.push(instr.param("s_ext"));
    }
    if instr.params().contains_key("td") && instr.param("td") == MODE_SYMBOLIC_OR_INDEXED {
        words.push(instr.param("d_ext"));
    }
    words
}

/// Write `words` into `memory` starting at `pc`, returning the address just
/// past the last word written. A small helper for tests exercising
/// `decode`/`encode` round trips over a real memory bus.
pub fn write_words(memory: &mut impl MemoryBus, pc: u16, words: &[u16]) -> u16 {
    let mut cursor = pc;
    for &w in words {
        memory.write_word(cursor, w);
        cursor = cursor.wrapping_add(2);
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;

    #[test]
    fn li_round_trips_through_decode_and_encode() {
        let mut mem = FlatMemory::new();
        // LI R2,0x1234
        write_words(&mut mem, 0x1000, &[0x0202, 0x1234]);
        let (instr, next_pc) = decode(&mem, 0x1000).unwrap();
        assert_eq!(next_pc, 0x1004);
        assert_eq!(instr.param("d"), 2);
        assert_eq!(instr.immediate_value(), Some(0x1234));
        assert_eq!(encode(&instr), vec![0x0202, 0x1234]);
    }

    #[test]
    fn symbolic_source_operand_consumes_its_extension_word() {
        let mut mem = FlatMemory::new();
        // MOV @1000,R0: ts=2 (symbolic), s=0 -> word 0xC000 | (0<<6) | (2<<4) | 0
        let word = 0xC000 | (2 << 4);
        write_words(&mut mem, 0x2000, &[word, 0x1000]);
        let (instr, next_pc) = decode(&mem, 0x2000).unwrap();
        assert_eq!(next_pc, 0x2004);
        assert_eq!(instr.param("s_ext"), 0x1000);
        assert_eq!(encode(&instr), vec![word, 0x1000]);
    }

    #[test]
    fn format_7_control_op_consumes_no_extension_words() {
        let mut mem = FlatMemory::new();
        write_words(&mut mem, 0x3000, &[0x0320]); // NOP
        let (instr, next_pc) = decode(&mem, 0x3000).unwrap();
        assert_eq!(next_pc, 0x3002);
        assert_eq!(encode(&instr), vec![0x0320]);
    }
}
