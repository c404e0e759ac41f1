//! Processor-wide constants: register geometry, status-bit positions and
//! the reset/interrupt vector layout.

/// Number of general registers in the workspace register file.
pub const REGISTER_COUNT: usize = 16;

/// Size in bytes of the simulated address space (64 KiB, word-addressable).
pub const MEMORY_SIZE: usize = 1 << 16;

/* STATUS REGISTER BIT POSITIONS */

/// Logical greater-than.
pub const ST_LGT: u8 = 0;
/// Arithmetic (signed) greater-than.
pub const ST_AGT: u8 = 1;
/// Equal.
pub const ST_EQUAL: u8 = 2;
/// Carry out of the most significant bit.
pub const ST_CARRY: u8 = 3;
/// Signed arithmetic overflow.
pub const ST_OVERFLOW: u8 = 4;
/// Odd parity of the low byte (byte ops only).
pub const ST_PARITY: u8 = 5;
/// Extended operation in progress.
pub const ST_XOP: u8 = 6;
/// Processor is in privileged mode.
pub const ST_PRIVILEGED: u8 = 7;
/// Mapping file is enabled.
pub const ST_MAPFILE_ENABLED: u8 = 8;
/// Memory mapping is active.
pub const ST_MEMORY_MAPPED: u8 = 9;
/// Arithmetic overflow interrupt enabled.
pub const ST_OVERFLOW_INTERRUPT_ENABLED: u8 = 10;
/// Writable control store enabled.
pub const ST_WCS_ENABLED: u8 = 11;

/// First bit of the 4-bit interrupt-mask field.
pub const ST_MASK_START: u8 = 12;
/// Width in bits of the interrupt-mask field.
pub const ST_MASK_WIDTH: u8 = 4;

/* ERROR FLAG (EIST) BIT POSITIONS */

/// Arithmetic overflow trapped.
pub const ERR_ARITHMETIC_OVERFLOW: u8 = 4;
/// Illegal / unknown opcode trapped (ILLOP).
pub const ERR_ILLOP: u8 = 13;
/// Privileged-operation violation trapped (PRIVOP).
pub const ERR_PRIVOP: u8 = 14;

/* RESET / INTERRUPT VECTOR LAYOUT */

/// Reset / level-0 interrupt workspace-pointer vector.
pub const VECTOR_RESET_WP: u16 = 0x0000;
/// Reset / level-0 interrupt program-counter vector.
pub const VECTOR_RESET_PC: u16 = 0x0002;

/// Internal-interrupt (trap 2 / XOP-class) workspace-pointer vector.
pub const VECTOR_INTERNAL_WP: u16 = 0x0008;
/// Internal-interrupt (trap 2 / XOP-class) program-counter vector.
pub const VECTOR_INTERNAL_PC: u16 = 0x000A;

/// Non-maskable-interrupt program-counter vector (note: PC comes first).
pub const VECTOR_NMI_PC: u16 = 0xFFFC;
/// Non-maskable-interrupt workspace-pointer vector.
pub const VECTOR_NMI_WP: u16 = 0xFFFE;

/// Workspace-pointer vector address for external interrupt level `level`
/// (1..15; level 0 uses [`VECTOR_RESET_WP`]).
pub const fn interrupt_level_wp_vector(level: u8) -> u16 {
    4 * level as u16
}

/// Program-counter vector address for external interrupt level `level`
/// (1..15; level 0 uses [`VECTOR_RESET_PC`]).
pub const fn interrupt_level_pc_vector(level: u8) -> u16 {
    4 * level as u16 + 2
}

/// Conditional jumps clear the status bits they consulted even when the
/// jump is not taken -- a quirk of the real hardware's condition-check
/// logic, preserved here rather than only clearing on a taken branch.
pub const CLEAR_JUMP_CONDITION_BITS_ON_CHECK: bool = true;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_addresses_follow_the_4l_rule() {
        assert_eq!(interrupt_level_wp_vector(1), 0x0004);
        assert_eq!(interrupt_level_pc_vector(1), 0x0006);
        assert_eq!(interrupt_level_wp_vector(15), 0x003C);
        assert_eq!(interrupt_level_pc_vector(15), 0x003E);
    }
}
