//! The execution pipeline: one exhaustive dispatch over [`Mnemonic`], a
//! closed `match` rather than an open-ended per-opcode handler hierarchy.

mod format1;
mod format2;

use crate::addressing;
use crate::catalogue::Mnemonic;
use crate::consts::{ST_CARRY, ST_EQUAL, ST_LGT, ST_OVERFLOW, ST_PARITY, ST_AGT};
use crate::error::{CoreError, CoreResult};
use crate::instruction::Instruction;
use crate::memory::MemoryBus;
use crate::state::SimulationState;

fn bit(state: &SimulationState<impl MemoryBus>, b: u8) -> bool {
    state.status().bit(b).expect("execution only reads non-mask status bits")
}

/// Execute one finalized instruction against `state`.
///
/// Every mnemonic the catalogue declares is matched; mnemonics with no
/// execution body in this core (the CRU, shift, multiply/divide, context
/// and 990/12-extension families) return [`CoreError::UnimplementedOp`]
/// without mutating `state`.
pub fn execute<M: MemoryBus>(state: &mut SimulationState<M>, instr: &Instruction) -> CoreResult<()> {
    use Mnemonic::*;
    match instr.opcode_info().mnemonic {
        Nop => Ok(()),

        Li => {
            let d = instr.param("d") as u8;
            let value = instr.immediate_value().unwrap_or(0);
            state.set_register_word(d, value);
            format1::update_eq_gt(state, value);
            Ok(())
        }

        Mov => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let value = addressing::get_word(state, src);
            addressing::set_word(state, dst, value);
            format1::update_eq_gt(state, value);
            Ok(())
        }
        Movb => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let value = addressing::get_byte(state, src);
            addressing::set_byte(state, dst, value);
            format1::update_eq_gt(state, (value as u16) << 8);
            format1::update_parity(state, value);
            Ok(())
        }

        A => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let a = addressing::get_word(state, src);
            let b = addressing::get_word(state, dst);
            let result = format1::add_word(state, b, a);
            addressing::set_word(state, dst, result);
            format1::update_eq_gt(state, result);
            Ok(())
        }
        Ab => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let a = addressing::get_byte(state, src);
            let b = addressing::get_byte(state, dst);
            let result = format1::add_byte(state, b, a);
            addressing::set_byte(state, dst, result);
            format1::update_eq_gt(state, (result as u16) << 8);
            format1::update_parity(state, result);
            Ok(())
        }

        S => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let a = addressing::get_word(state, src);
            let b = addressing::get_word(state, dst);
            let result = format1::sub_word(state, b, a);
            addressing::set_word(state, dst, result);
            format1::update_eq_gt(state, result);
            Ok(())
        }
        Sb => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let a = addressing::get_byte(state, src);
            let b = addressing::get_byte(state, dst);
            let result = format1::sub_byte(state, b, a);
            addressing::set_byte(state, dst, result);
            format1::update_eq_gt(state, (result as u16) << 8);
            format1::update_parity(state, result);
            Ok(())
        }

        C => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let a = addressing::get_word(state, src);
            let b = addressing::get_word(state, dst);
            let status = state.status_mut();
            let _ = status.assign_bit(ST_EQUAL, a == b);
            let _ = status.assign_bit(ST_LGT, a > b);
            let _ = status.assign_bit(ST_AGT, (a as i16) > (b as i16));
            Ok(())
        }
        Cb => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let a = addressing::get_byte(state, src);
            let b = addressing::get_byte(state, dst);
            let status = state.status_mut();
            let _ = status.assign_bit(ST_EQUAL, a == b);
            let _ = status.assign_bit(ST_LGT, a > b);
            let _ = status.assign_bit(ST_AGT, (a as i8) > (b as i8));
            Ok(())
        }

        Soc => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let value = addressing::get_word(state, src) | addressing::get_word(state, dst);
            addressing::set_word(state, dst, value);
            format1::update_eq_gt(state, value);
            Ok(())
        }
        Socb => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let value = addressing::get_byte(state, src) | addressing::get_byte(state, dst);
            addressing::set_byte(state, dst, value);
            format1::update_eq_gt(state, (value as u16) << 8);
            format1::update_parity(state, value);
            Ok(())
        }

        Szc => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let value = !addressing::get_word(state, src) & addressing::get_word(state, dst);
            addressing::set_word(state, dst, value);
            format1::update_eq_gt(state, value);
            Ok(())
        }
        Szcb => {
            let (src, dst) = format1::resolve_operands(state, instr);
            let value = !addressing::get_byte(state, src) & addressing::get_byte(state, dst);
            addressing::set_byte(state, dst, value);
            format1::update_eq_gt(state, (value as u16) << 8);
            format1::update_parity(state, value);
            Ok(())
        }

        Inc => {
            let operand = format1::resolve_single_operand(state, instr, false);
            let value = addressing::get_word(state, operand);
            let result = format1::add_word(state, value, 1);
            addressing::set_word(state, operand, result);
            format1::update_eq_gt(state, result);
            Ok(())
        }
        Inct => {
            let operand = format1::resolve_single_operand(state, instr, false);
            let value = addressing::get_word(state, operand);
            let result = format1::add_word(state, value, 2);
            addressing::set_word(state, operand, result);
            format1::update_eq_gt(state, result);
            Ok(())
        }
        Dec => {
            let operand = format1::resolve_single_operand(state, instr, false);
            let value = addressing::get_word(state, operand);
            let result = format1::sub_word(state, value, 1);
            addressing::set_word(state, operand, result);
            format1::update_eq_gt(state, result);
            Ok(())
        }
        Dect => {
            let operand = format1::resolve_single_operand(state, instr, false);
            let value = addressing::get_word(state, operand);
            let result = format1::sub_word(state, value, 2);
            addressing::set_word(state, operand, result);
            format1::update_eq_gt(state, result);
            Ok(())
        }

        Jmp => {
            format2::conditional_jump(state, instr, true, &[]);
            Ok(())
        }
        Jeq => jump_on(state, instr, bit(state, ST_EQUAL), &[ST_EQUAL]),
        Jne => jump_on(state, instr, !bit(state, ST_EQUAL), &[ST_EQUAL]),
        Jgt => jump_on(state, instr, bit(state, ST_AGT), &[ST_AGT, ST_EQUAL]),
        Jlt => jump_on(state, instr, !bit(state, ST_AGT) && !bit(state, ST_EQUAL), &[ST_AGT, ST_EQUAL]),
        Jhe => jump_on(state, instr, bit(state, ST_LGT) || bit(state, ST_EQUAL), &[ST_LGT, ST_EQUAL]),
        Jh => jump_on(state, instr, bit(state, ST_LGT) && !bit(state, ST_EQUAL), &[ST_LGT, ST_EQUAL]),
        Jl => jump_on(state, instr, !bit(state, ST_LGT) && !bit(state, ST_EQUAL), &[ST_LGT, ST_EQUAL]),
        Jle => jump_on(state, instr, !bit(state, ST_LGT) || bit(state, ST_EQUAL), &[ST_LGT, ST_EQUAL]),
        Joc => jump_on(state, instr, bit(state, ST_CARRY), &[ST_CARRY]),
        Jnc => jump_on(state, instr, !bit(state, ST_CARRY), &[ST_CARRY]),
        Jno => jump_on(state, instr, !bit(state, ST_OVERFLOW), &[ST_OVERFLOW]),
        Jop => jump_on(state, instr, bit(state, ST_PARITY), &[ST_PARITY]),

        other => Err(CoreError::UnimplementedOp(other.name())),
    }
}

fn jump_on<M: MemoryBus>(
    state: &mut SimulationState<M>,
    instr: &Instruction,
    condition: bool,
    consulted: &[u8],
) -> CoreResult<()> {
    format2::conditional_jump(state, instr, condition, consulted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;
    use std::collections::BTreeMap;

    fn li(d: u16, value: u16) -> Instruction {
        let mut params = BTreeMap::new();
        params.insert("d", d);
        let mut i = Instruction::from_mnemonic("LI", params).unwrap();
        i.set_second_opcode_word(value);
        i
    }

    #[test]
    fn li_then_inc_matches_scenario_a() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0200);
        execute(&mut st, &li(0, 0x0042)).unwrap();
        assert_eq!(st.register_word(0), 0x0042);

        let mut params = BTreeMap::new();
        params.insert("ts", 0);
        params.insert("s", 1);
        let inct = Instruction::from_mnemonic("INCT", params).unwrap();
        execute(&mut st, &inct).unwrap();
        assert_eq!(st.register_word(1), 2);
    }

    #[test]
    fn mov_register_to_register_copies_the_value_and_sets_eq() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0200);
        st.set_register_word(3, 0);
        st.set_register_word(5, 0xABCD);
        let mut params = BTreeMap::new();
        params.insert("ts", 0);
        params.insert("s", 5);
        params.insert("td", 0);
        params.insert("d", 3);
        let mov = Instruction::from_mnemonic("MOV", params).unwrap();
        execute(&mut st, &mov).unwrap();
        assert_eq!(st.register_word(3), 0xABCD);
        assert!(!st.status().bit(ST_EQUAL).unwrap());
    }

    #[test]
    fn add_with_carry_sets_the_carry_bit() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0200);
        st.set_register_word(0, 0xFFFF);
        st.set_register_word(1, 0x0002);
        let mut params = BTreeMap::new();
        params.insert("ts", 0);
        params.insert("s", 0);
        params.insert("td", 0);
        params.insert("d", 1);
        let add = Instruction::from_mnemonic("A", params).unwrap();
        execute(&mut st, &add).unwrap();
        assert_eq!(st.register_word(1), 0x0001);
        assert!(st.status().bit(ST_CARRY).unwrap());
    }

    #[test]
    fn jmp_is_unconditionally_taken() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_pc(0x1000);
        let mut params = BTreeMap::new();
        params.insert("disp", 4);
        let jmp = Instruction::from_mnemonic("JMP", params).unwrap();
        execute(&mut st, &jmp).unwrap();
        assert_eq!(st.pc(), 0x1008);
    }

    #[test]
    fn jnc_not_taken_still_clears_carry() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_pc(0x1000);
        st.status_mut().set_bit(ST_CARRY).unwrap();
        let mut params = BTreeMap::new();
        params.insert("disp", 4);
        let jnc = Instruction::from_mnemonic("JNC", params).unwrap();
        execute(&mut st, &jnc).unwrap();
        assert_eq!(st.pc(), 0x1000);
        assert!(!st.status().bit(ST_CARRY).unwrap());
    }

    #[test]
    fn unimplemented_mnemonic_returns_an_error_without_mutating_state() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_register_word(0, 0x1234);
        let mut params = BTreeMap::new();
        params.insert("c", 1);
        params.insert("ts", 0);
        params.insert("s", 0);
        let sra = Instruction::from_mnemonic("SRA", params).unwrap();
        let err = execute(&mut st, &sra).unwrap_err();
        assert!(matches!(err, CoreError::UnimplementedOp(_)));
        assert_eq!(st.register_word(0), 0x1234);
    }
}
