//! The four addressing modes operands can be expressed in, and the
//! once-per-instruction autoincrement bookkeeping they share.

use crate::state::SimulationState;
use crate::memory::MemoryBus;

/// Addressing mode 0: operand value lives directly in the register.
pub const MODE_REGISTER: u16 = 0;
/// Addressing mode 1: the register holds the operand's memory address.
pub const MODE_INDIRECT: u16 = 1;
/// Addressing mode 2: symbolic (register 0) or indexed (register != 0); an
/// extension word supplies an absolute address or an index base.
pub const MODE_SYMBOLIC_OR_INDEXED: u16 = 2;
/// Addressing mode 3: like indirect, but the register is autoincremented by
/// the operand's width (1 byte or 2 bytes) after the address is read.
pub const MODE_INDIRECT_AUTOINCREMENT: u16 = 3;

/// Where one resolved operand lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The operand is the register itself (mode 0).
    Register(u8),
    /// The operand lives at this memory address (modes 1, 2, 3).
    Memory(u16),
}

/// Tracks, for the lifetime of one instruction's addressing-mode
/// resolution, the pre-increment address autoincrement-mode registers were
/// read at.
///
/// When the same register is used in autoincrement mode as both the source
/// and destination operand of one instruction, the increment happens
/// exactly once, at the moment the operand is read; the write-back
/// resolution must reuse that same (pre-increment) address rather than
/// recomputing it from the already-advanced register.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoincrementGuard {
    cached_address: [Option<u16>; 16],
}

impl AutoincrementGuard {
    /// A fresh guard, to be created once per instruction.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolve operand `reg` under `mode` to a [`Operand`], consuming
/// `extension` if the mode requires one and applying the once-per-
/// instruction autoincrement rule for mode 3.
///
/// `extension` must be `Some` when `mode == MODE_SYMBOLIC_OR_INDEXED`; the
/// decoder guarantees this by fetching the extension word whenever it sees
/// that mode (`crate::decode::decode`).
pub fn resolve<M: MemoryBus>(
    state: &mut SimulationState<M>,
    guard: &mut AutoincrementGuard,
    mode: u16,
    reg: u8,
    extension: Option<u16>,
    is_byte: bool,
) -> Operand {
    match mode {
        MODE_REGISTER => Operand::Register(reg),
        MODE_INDIRECT => Operand::Memory(state.register_word(reg)),
        MODE_SYMBOLIC_OR_INDEXED => {
            let ext = extension.unwrap_or(0);
            if reg == 0 {
                Operand::Memory(ext)
            } else {
                Operand::Memory(ext.wrapping_add(state.register_word(reg)))
            }
        }
        MODE_INDIRECT_AUTOINCREMENT => {
            let idx = (reg & 0x0F) as usize;
            let address = match guard.cached_address[idx] {
                Some(addr) => addr,
                None => {
                    let addr = state.register_word(reg);
                    let step: u16 = if is_byte { 1 } else { 2 };
                    state.set_register_word(reg, addr.wrapping_add(step));
                    guard.cached_address[idx] = Some(addr);
                    addr
                }
            };
            Operand::Memory(address)
        }
        _ => unreachable!("addressing mode is a 2-bit field, values 0..3"),
    }
}

/// Read the word at `operand`.
pub fn get_word<M: MemoryBus>(state: &SimulationState<M>, operand: Operand) -> u16 {
    match operand {
        Operand::Register(r) => state.register_word(r),
        Operand::Memory(addr) => state.memory().read_word(addr),
    }
}

/// Write `value` to the word at `operand`.
pub fn set_word<M: MemoryBus>(state: &mut SimulationState<M>, operand: Operand, value: u16) {
    match operand {
        Operand::Register(r) => state.set_register_word(r, value),
        Operand::Memory(addr) => state.memory_mut().write_word(addr, value),
    }
}

/// Read the byte at `operand` (register mode reads the register's high
/// byte, per the TMS9900's register-as-byte-pair convention).
pub fn get_byte<M: MemoryBus>(state: &SimulationState<M>, operand: Operand) -> u8 {
    match operand {
        Operand::Register(r) => state.register_byte(r),
        Operand::Memory(addr) => state.memory().read_byte(addr),
    }
}

/// Write `value` to the byte at `operand`.
pub fn set_byte<M: MemoryBus>(state: &mut SimulationState<M>, operand: Operand, value: u8) {
    match operand {
        Operand::Register(r) => state.set_register_byte(r, value),
        Operand::Memory(addr) => state.memory_mut().write_byte(addr, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;

    #[test]
    fn mode_0_is_the_register_itself() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0100);
        st.set_register_word(4, 0xBEEF);
        let mut guard = AutoincrementGuard::new();
        let operand = resolve(&mut st, &mut guard, MODE_REGISTER, 4, None, false);
        assert_eq!(get_word(&st, operand), 0xBEEF);
    }

    #[test]
    fn mode_1_indirects_through_the_register() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0100);
        st.set_register_word(4, 0x2000);
        st.memory_mut().write_word(0x2000, 0x1234);
        let mut guard = AutoincrementGuard::new();
        let operand = resolve(&mut st, &mut guard, MODE_INDIRECT, 4, None, false);
        assert_eq!(get_word(&st, operand), 0x1234);
    }

    #[test]
    fn mode_2_symbolic_uses_the_extension_word_directly_when_register_is_0() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.memory_mut().write_word(0x3000, 0x4242);
        let mut guard = AutoincrementGuard::new();
        let operand = resolve(&mut st, &mut guard, MODE_SYMBOLIC_OR_INDEXED, 0, Some(0x3000), false);
        assert_eq!(get_word(&st, operand), 0x4242);
    }

    #[test]
    fn mode_2_indexed_adds_the_register_to_the_extension_word() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0100);
        st.set_register_word(5, 0x0010);
        st.memory_mut().write_word(0x3010, 0x5555);
        let mut guard = AutoincrementGuard::new();
        let operand = resolve(&mut st, &mut guard, MODE_SYMBOLIC_OR_INDEXED, 5, Some(0x3000), false);
        assert_eq!(get_word(&st, operand), 0x5555);
    }

    #[test]
    fn mode_3_increments_the_register_by_2_for_word_operands() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0100);
        st.set_register_word(6, 0x4000);
        let mut guard = AutoincrementGuard::new();
        resolve(&mut st, &mut guard, MODE_INDIRECT_AUTOINCREMENT, 6, None, false);
        assert_eq!(st.register_word(6), 0x4002);
    }

    #[test]
    fn mode_3_increments_the_register_by_1_for_byte_operands() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0100);
        st.set_register_word(6, 0x4000);
        let mut guard = AutoincrementGuard::new();
        resolve(&mut st, &mut guard, MODE_INDIRECT_AUTOINCREMENT, 6, None, true);
        assert_eq!(st.register_word(6), 0x4001);
    }

    #[test]
    fn mode_3_increments_only_once_when_the_same_register_is_source_and_dest() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0100);
        st.set_register_word(7, 0x5000);
        let mut guard = AutoincrementGuard::new();
        let first = resolve(&mut st, &mut guard, MODE_INDIRECT_AUTOINCREMENT, 7, None, false);
        let second = resolve(&mut st, &mut guard, MODE_INDIRECT_AUTOINCREMENT, 7, None, false);
        // The destination resolution reuses the source's pre-increment
        // address rather than recomputing from the already-advanced register.
        assert_eq!(first, Operand::Memory(0x5000));
        assert_eq!(second, Operand::Memory(0x5000));
        assert_eq!(st.register_word(7), 0x5002);
    }

    #[test]
    fn mode_3_wraparound_does_not_touch_overflow_status() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.set_wp(0x0100);
        st.set_register_word(8, 0xFFFE);
        st.status_mut().reset_bit(crate::consts::ST_OVERFLOW).unwrap();
        let mut guard = AutoincrementGuard::new();
        resolve(&mut st, &mut guard, MODE_INDIRECT_AUTOINCREMENT, 8, None, false);
        assert_eq!(st.register_word(8), 0x0000);
        assert!(!st.status().bit(crate::consts::ST_OVERFLOW).unwrap());
    }
}
