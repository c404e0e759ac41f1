//! Runtime and catalogue error taxonomy for the core.

use thiserror::Error;

/// Errors produced by the decoder, addressing-mode resolver, execution
/// pipeline and flow state machine.
///
/// Arithmetic and privilege conditions that the hardware itself handles by
/// raising an internal trap (ILLOP, PRIVOP, arithmetic overflow) are *not*
/// exceptions from the flow state machine's point of view -- they are status
/// or error-flag bits consumed by states `C2` and `D`. The variants below
/// exist so that callers of the catalogue, codec and resolver -- which have
/// no flow state machine to fall back on -- get a `Result` they can act on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A catalogue lookup by mnemonic found no matching [`OpDef`](crate::catalogue::OpDef).
    #[error("unknown opcode mnemonic: {0}")]
    UnknownOpName(String),

    /// An opcode word does not fall within any catalogued opcode range.
    #[error("illegal opcode word: {0:#06x}")]
    IllegalOpcode(u16),

    /// The mnemonic is catalogued but has no execution body in this core.
    #[error("opcode {0} is catalogued but not implemented in this core")]
    UnimplementedOp(String),

    /// The current instruction requires privileged mode and the processor
    /// is not in privileged mode.
    #[error("privileged-operation violation")]
    PrivilegedOpViolation,

    /// `OVERFLOW` is set and `OVERFLOW_INTERRUPT_ENABLED` is set.
    #[error("arithmetic overflow trap")]
    ArithmeticOverflowTrap,

    /// An attempt was made to mutate the interrupt-mask bits (12..15) of the
    /// status register through the per-bit API.
    #[error("bit {0} belongs to the interrupt mask and cannot be set through the per-bit API")]
    BadStatusMaskWrite(u8),

    /// An unreachable branch was taken somewhere in the flow state machine.
    #[error("core bug: {0}")]
    CoreBug(String),
}

/// Convenience alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;
