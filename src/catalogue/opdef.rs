//! `OpDef`: one immutable catalogue record per mnemonic.

use super::format::{ExtensionWords, Field};
use super::mnemonic::Mnemonic;

/// Which processor family/platform a catalogued opcode is supported on.
/// Mirrors the TI-990 family's per-platform instruction-set variance (the
/// 990/12-class floating-point and BCD opcodes are not present on the base
/// TMS9900).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSupport {
    /// Supported on the base TMS9900 / 990/4 instruction set.
    pub tms9900: bool,
    /// Supported on the 990/10 extended instruction set.
    pub ti990_10: bool,
    /// Supported on the 990/12 extended (floating-point/BCD) instruction
    /// set.
    pub ti990_12: bool,
}

impl PlatformSupport {
    /// Supported everywhere.
    pub const ALL: Self = Self {
        tms9900: true,
        ti990_10: true,
        ti990_12: true,
    };

    /// Only on the 990/12 floating-point/BCD extension.
    pub const TI990_12_ONLY: Self = Self {
        tms9900: false,
        ti990_10: false,
        ti990_12: true,
    };
}

/// One immutable catalogue entry.
///
/// Invariants (checked by the catalogue's own tests):
/// - `opcode <= opcode_legal_max < 65536`
/// - `opcode_legal_max - opcode + 1 == 2^(16 - arg_start_bit)`
/// - the field widths in `args` sum to `16 - arg_start_bit`
#[derive(Debug, Clone, Copy)]
pub struct OpDef {
    /// The mnemonic this entry describes.
    pub mnemonic: Mnemonic,
    /// Lowest opcode word that dispatches to this entry.
    pub opcode: u16,
    /// Highest opcode word (inclusive) that still dispatches to this entry;
    /// every code in `[opcode, opcode_legal_max]` shares the same behavior,
    /// differing only in the argument bits.
    pub opcode_legal_max: u16,
    /// Bit position where argument fields begin (TI convention, bit 0 =
    /// MSB); the opcode proper occupies bits `0..arg_start_bit`.
    pub arg_start_bit: u8,
    /// Named, fixed-width argument fields, in encoding order.
    pub args: &'static [Field],
    /// Instruction-word format number, 1..21.
    pub format: u8,
    /// Human-readable format-variant tag (e.g. `"reg+imm"`, `"no-reg"`)
    /// distinguishing opcodes that share a format number but not an
    /// extension-word rule (format 8's LI-family vs. LWPI/STWP-family).
    pub format_variant: &'static str,
    /// The format-mandated extension word rule for this entry.
    pub extension: ExtensionWords,
    /// `true` iff this opcode may execute only in privileged mode.
    pub privileged: bool,
    /// Status-register bits this opcode's execution may write.
    pub touches_status_bits: &'static [u8],
    /// Per-platform support table.
    pub platforms: PlatformSupport,
}

impl OpDef {
    /// Number of opcode words `[opcode, opcode_legal_max]` covers.
    pub const fn opcode_range_len(&self) -> u32 {
        self.opcode_legal_max as u32 - self.opcode as u32 + 1
    }

    /// Sum of this entry's argument-field widths.
    pub fn args_bit_width(&self) -> u16 {
        self.args.iter().map(|f| f.bit_width as u16).sum()
    }

    /// `true` iff `code` falls within this entry's opcode range.
    pub const fn covers(&self, code: u16) -> bool {
        code >= self.opcode && code <= self.opcode_legal_max
    }
}
