//! `FormatInfo`: the operand-field layout and extension-word rules shared
//! by every [`OpDef`](super::OpDef) of a given instruction-word format.

/// How many, and what kind of, extension words follow the effective opcode
/// word for instructions of a given format -- independent of the
/// addressing-mode-driven extension words consumed by symbolic/indexed
/// operands (those apply uniformly across every format).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionWords {
    /// No format-mandated extension word (addressing modes may still
    /// consume one).
    None,
    /// A second opcode word follows (reserved for two-word encodings; not
    /// used by any catalogued mnemonic in this core, kept for fidelity with
    /// the decoder's general contract).
    SecondOpcodeWord,
    /// One immediate word follows unconditionally (format 8).
    ImmediateWord,
}

/// One named, fixed-width positional field within an instruction word,
/// in encoding order starting at the format's `arg_start_bit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Parameter name, e.g. `"ts"`, `"s"`, `"td"`, `"d"`, `"disp"`.
    pub name: &'static str,
    /// Bit-offset from the start of the word (bit 0 = most significant bit,
    /// per TI convention).
    pub bit_offset: u8,
    /// Width in bits.
    pub bit_width: u8,
}

/// The operand-field layout and extension-word rule for one of the 21
/// instruction-word formats.
#[derive(Debug, Clone, Copy)]
pub struct FormatInfo {
    /// Format number, 1..21.
    pub format_number: u8,
    /// Bit position (TI convention, bit 0 = MSB) where the argument fields
    /// begin; the opcode occupies bits `0..arg_start_bit`.
    pub arg_start_bit: u8,
    /// Positional argument fields, in encoding order.
    pub fields: &'static [Field],
    /// Format-mandated extension word, if any.
    pub extension: ExtensionWords,
    /// Minimum total instruction length in words (opcode word included).
    pub minimum_instruction_words: u8,
    /// Maximum total instruction length in words (opcode word included),
    /// accounting for up to two addressing-mode extension words on top of
    /// any format-mandated one.
    pub maximum_instruction_words: u8,
}

impl FormatInfo {
    /// Sum of this format's field widths; must equal `16 - arg_start_bit`
    /// for every format, so the argument fields exactly fill the word.
    pub fn fields_bit_width(&self) -> u16 {
        self.fields.iter().map(|f| f.bit_width as u16).sum()
    }
}

/// Two-operand general format (A, S, C, MOV, SOC, SZC and byte variants).
/// `OP(4 incl. B) | Td(2) | D(4) | Ts(2) | S(4)`.
pub const FIELDS_FORMAT_1: &[Field] = &[
    Field { name: "td", bit_offset: 4, bit_width: 2 },
    Field { name: "d", bit_offset: 6, bit_width: 4 },
    Field { name: "ts", bit_offset: 10, bit_width: 2 },
    Field { name: "s", bit_offset: 12, bit_width: 4 },
];

/// Conditional-jump format (JMP and its conditional variants).
/// `OP(8) | DISP(8)`.
pub const FIELDS_FORMAT_2: &[Field] = &[Field { name: "disp", bit_offset: 8, bit_width: 8 }];

/// Register-immediate compare format (COC, CZC).
/// `OP(6) | D(4) | Ts(2) | S(4)`.
pub const FIELDS_FORMAT_3: &[Field] = &[
    Field { name: "d", bit_offset: 6, bit_width: 4 },
    Field { name: "ts", bit_offset: 10, bit_width: 2 },
    Field { name: "s", bit_offset: 12, bit_width: 4 },
];

/// CRU multi-bit transfer format (LDCR, STCR).
/// `OP(6) | C(4) | Ts(2) | S(4)`.
pub const FIELDS_FORMAT_4: &[Field] = &[
    Field { name: "c", bit_offset: 6, bit_width: 4 },
    Field { name: "ts", bit_offset: 10, bit_width: 2 },
    Field { name: "s", bit_offset: 12, bit_width: 4 },
];

/// Shift-count format (SLA, SRA, SRC, SRL).
/// `OP(8) | C(4) | W(4)`.
pub const FIELDS_FORMAT_5: &[Field] = &[
    Field { name: "c", bit_offset: 8, bit_width: 4 },
    Field { name: "w", bit_offset: 12, bit_width: 4 },
];

/// Single-operand format (B, BL, BLWP, CLR, SETO, INV, NEG, ABS, SWPB, INC,
/// INCT, DEC, DECT, X). `OP(10) | Ts(2) | S(4)`.
pub const FIELDS_FORMAT_6: &[Field] = &[
    Field { name: "ts", bit_offset: 10, bit_width: 2 },
    Field { name: "s", bit_offset: 12, bit_width: 4 },
];

/// Control format with no operand fields (RTWP, CKON, CKOF, IDLE, RSET,
/// LREX). `OP(16)`.
pub const FIELDS_FORMAT_7: &[Field] = &[];

/// Immediate format with a destination register (LI, AI, ANDI, ORI, CI).
/// `OP(12) | D(4)`, one immediate extension word follows unconditionally.
pub const FIELDS_FORMAT_8_REG: &[Field] = &[Field { name: "d", bit_offset: 12, bit_width: 4 }];

/// Immediate format with no register field (LWPI, LIMI): `OP(16)`, one
/// immediate extension word follows unconditionally.
pub const FIELDS_FORMAT_8_NOREG: &[Field] = &[];

/// Register-only format with no extension word (STWP, STST).
/// `OP(12) | D(4)`.
pub const FIELDS_FORMAT_8B: &[Field] = &[Field { name: "d", bit_offset: 12, bit_width: 4 }];

/// Multiply/divide/XOP three-operand format (MPY, DIV, XOP).
/// `OP(6) | D(4) | Ts(2) | S(4)`. (Same shape as format 3/4; kept distinct
/// per the catalogue's own format numbering.)
pub const FIELDS_FORMAT_9: &[Field] = &[
    Field { name: "d", bit_offset: 6, bit_width: 4 },
    Field { name: "ts", bit_offset: 10, bit_width: 2 },
    Field { name: "s", bit_offset: 12, bit_width: 4 },
];

/// A generic single-register layout used by the catalogued-but-not-executed
/// 990/12-class floating-point and BCD/big-integer extension opcodes
/// (formats 10..21): `OP(12) | D(4)`. These formats are declared in the
/// catalogue so that such instructions decode and round-trip even though
/// their execution is left pending.
pub const FIELDS_FORMAT_EXTENDED: &[Field] = &[Field { name: "d", bit_offset: 12, bit_width: 4 }];

/// Returns the static [`FormatInfo`] for `format_number` (1..21).
///
/// Format numbers 10..21 all currently map to a generic extended layout
/// (see [`FIELDS_FORMAT_EXTENDED`]); individual pending opcodes still carry
/// their own [`OpDef`](super::OpDef) entry and format-variant tag.
pub fn format_info(format_number: u8) -> FormatInfo {
    match format_number {
        1 => FormatInfo {
            format_number,
            arg_start_bit: 4,
            fields: FIELDS_FORMAT_1,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 3,
        },
        2 => FormatInfo {
            format_number,
            arg_start_bit: 8,
            fields: FIELDS_FORMAT_2,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 1,
        },
        3 => FormatInfo {
            format_number,
            arg_start_bit: 6,
            fields: FIELDS_FORMAT_3,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 2,
        },
        4 => FormatInfo {
            format_number,
            arg_start_bit: 6,
            fields: FIELDS_FORMAT_4,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 2,
        },
        5 => FormatInfo {
            format_number,
            arg_start_bit: 8,
            fields: FIELDS_FORMAT_5,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 1,
        },
        6 => FormatInfo {
            format_number,
            arg_start_bit: 10,
            fields: FIELDS_FORMAT_6,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 2,
        },
        7 => FormatInfo {
            format_number,
            arg_start_bit: 16,
            fields: FIELDS_FORMAT_7,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 1,
        },
        8 => FormatInfo {
            format_number,
            arg_start_bit: 12,
            fields: FIELDS_FORMAT_8_REG,
            extension: ExtensionWords::ImmediateWord,
            minimum_instruction_words: 2,
            maximum_instruction_words: 2,
        },
        9 => FormatInfo {
            format_number,
            arg_start_bit: 6,
            fields: FIELDS_FORMAT_9,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 2,
        },
        10..=21 => FormatInfo {
            format_number,
            arg_start_bit: 6,
            fields: FIELDS_FORMAT_EXTENDED,
            extension: ExtensionWords::None,
            minimum_instruction_words: 1,
            maximum_instruction_words: 2,
        },
        other => panic!("no such instruction-word format: {other}"),
    }
}
