//! [`Mnemonic`]: the closed set of instruction names the catalogue knows
//! about.
//!
//! This is a closed sum-type rather than an open set of behavior classes:
//! every variant is matched exhaustively by the execution dispatcher in
//! [`crate::execution`].

use strum::{Display, EnumIter, EnumString};

/// A TMS9900 / TI-990 instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Mnemonic {
    // Format 1: two-operand general.
    A,
    Ab,
    C,
    Cb,
    Mov,
    Movb,
    S,
    Sb,
    Soc,
    Socb,
    Szc,
    Szcb,

    // Format 2: conditional jump.
    Jmp,
    Jeq,
    Jgt,
    Jh,
    Jhe,
    Jl,
    Jle,
    Jlt,
    Jnc,
    Jne,
    Jno,
    Joc,
    Jop,

    // Format 3: register/immediate compare.
    Coc,
    Czc,

    // Format 4: CRU multi-bit transfer.
    Ldcr,
    Stcr,

    // Format 5: shift.
    Sla,
    Sra,
    Src,
    Srl,

    // Format 6: single operand.
    B,
    Bl,
    Blwp,
    Clr,
    Seto,
    Inv,
    Neg,
    Abs,
    Swpb,
    Inc,
    Inct,
    Dec,
    Dect,
    X,

    // Format 7: control, no operand.
    Rtwp,
    Ckon,
    Ckof,
    Idle,
    Rset,
    Lrex,
    Nop,

    // Format 8: immediate.
    Li,
    Ai,
    Andi,
    Ori,
    Ci,
    Lwpi,
    Limi,
    Stwp,
    Stst,

    // Format 9: multiply / divide / extended op.
    Mpy,
    Div,
    Xop,

    // CRU single-bit ops (format 2 shape).
    Sbo,
    Sbz,
    Tb,

    // 990/12-class floating-point / BCD extension opcodes: catalogued,
    // not executable in this core.
    Ar,
    Sr,
    Mr,
    Dr,
    Cir,
    Cdr,
    Lr,
    Str,
    Nrm,
    Lbcd,
    Sbcd,
    Mbcd,
}

impl Mnemonic {
    /// The mnemonic's canonical assembly-syntax name, e.g. `"MOV"`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}
