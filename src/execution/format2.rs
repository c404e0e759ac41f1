//! Conditional-jump format: an 8-bit signed, word-granular displacement
//! relative to the program counter, taken or not taken depending on status
//! bits consulted and then unconditionally cleared, see
//! `consts::CLEAR_JUMP_CONDITION_BITS_ON_CHECK`.

use crate::consts::CLEAR_JUMP_CONDITION_BITS_ON_CHECK;
use crate::instruction::Instruction;
use crate::memory::MemoryBus;
use crate::state::SimulationState;

/// Sign-extend the 8-bit displacement field and double it to a word offset.
fn displacement_words(raw: u16) -> i16 {
    ((raw as u8) as i8 as i16) * 2
}

/// Apply a conditional jump: if `condition` is true, add the instruction's
/// signed, doubled displacement to the program counter (which has already
/// been advanced past the jump instruction itself). Either way, clear every
/// status bit named in `consulted` -- real TMS9900 jumps clear the bits
/// they tested even when the branch is not taken.
pub fn conditional_jump<M: MemoryBus>(
    state: &mut SimulationState<M>,
    instr: &Instruction,
    condition: bool,
    consulted: &[u8],
) {
    if condition {
        let delta = displacement_words(instr.param("disp"));
        state.set_pc(state.pc().wrapping_add(delta as u16));
    }
    if CLEAR_JUMP_CONDITION_BITS_ON_CHECK {
        for &bit in consulted {
            let _ = state.status_mut().reset_bit(bit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ST_CARRY;
    use crate::instruction::Instruction;
    use crate::memory::FlatMemory;
    use std::collections::BTreeMap;

    fn jnc(disp: u16) -> Instruction {
        let mut params = BTreeMap::new();
        params.insert("disp", disp);
        Instruction::from_mnemonic("JNC", params).unwrap()
    }

    #[test]
    fn taken_jump_advances_pc_by_twice_the_signed_displacement() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_pc(0x1000);
        conditional_jump(&mut st, &jnc(4), true, &[ST_CARRY]);
        assert_eq!(st.pc(), 0x1008);
    }

    #[test]
    fn negative_displacement_moves_the_pc_backward() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_pc(0x1000);
        conditional_jump(&mut st, &jnc(0xFE), true, &[ST_CARRY]); // -2 words == -4 bytes
        assert_eq!(st.pc(), 0x0FFC);
    }

    #[test]
    fn not_taken_jump_still_clears_the_consulted_status_bit() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_pc(0x1000);
        st.status_mut().set_bit(ST_CARRY).unwrap();
        conditional_jump(&mut st, &jnc(4), false, &[ST_CARRY]);
        assert_eq!(st.pc(), 0x1000);
        assert!(!st.status().bit(ST_CARRY).unwrap());
    }
}
