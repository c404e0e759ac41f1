//! [`ExecutionProcess`]: the two-slot fetch/execute pipeline (current
//! instruction executing while the next one is decoded), mirroring the
//! two-phase prefetch the flow state machine drives.

use crate::catalogue::Mnemonic;
use crate::decode;
use crate::error::CoreResult;
use crate::execution;
use crate::instruction::Instruction;
use crate::memory::MemoryBus;
use crate::state::SimulationState;

/// Holds at most one "current" (being executed) and one "next" (prefetched,
/// not yet executed) instruction.
#[derive(Debug, Clone, Default)]
pub struct ExecutionProcess {
    current: Option<Instruction>,
    next: Option<Instruction>,
    /// The raw opcode word of the most recent fetch attempt, kept even when
    /// that word failed to resolve against the catalogue (an illegal/MID
    /// opcode has no [`Instruction`] to stage, but the flow state machine
    /// still needs the raw word to classify it).
    last_fetched_raw_opcode: Option<u16>,
}

impl ExecutionProcess {
    /// A process with both slots empty (the state right after `PowerOn` or
    /// a `Reset`).
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff a current instruction is staged and ready to execute.
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// The staged current instruction, if any.
    pub fn current(&self) -> Option<&Instruction> {
        self.current.as_ref()
    }

    /// Decode the instruction at `state`'s program counter directly into the
    /// current slot, advancing the program counter past it. Used by flow
    /// state `Begin` to prime the pipeline after a reset.
    pub fn begin<M: MemoryBus>(&mut self, state: &mut SimulationState<M>) -> CoreResult<()> {
        let (instr, next_pc) = decode::decode(state.memory(), state.pc())?;
        state.set_pc(next_pc);
        self.current = Some(instr);
        Ok(())
    }

    /// Decode the instruction at `state`'s program counter into the "next"
    /// slot, advancing the program counter past it, without disturbing
    /// whatever is already staged as "current".
    ///
    /// An opcode word that fails to resolve against the catalogue (an
    /// illegal or Macro-Instruction-Detect-reserved word) leaves "next"
    /// empty rather than propagating the decode error: the flow state
    /// machine classifies such words through [`Self::last_fetched_raw_opcode`]
    /// at state `C2` instead of treating a bad fetch as a caller-facing
    /// failure.
    pub fn fetch_next_instruction<M: MemoryBus>(&mut self, state: &mut SimulationState<M>) {
        let raw = state.memory().read_word(state.pc());
        self.last_fetched_raw_opcode = Some(raw);
        match decode::decode(state.memory(), state.pc()) {
            Ok((instr, next_pc)) => {
                state.set_pc(next_pc);
                self.next = Some(instr);
            }
            Err(_) => {
                state.advance_pc();
                self.next = None;
            }
        }
    }

    /// The raw opcode word of the most recent [`Self::fetch_next_instruction`]
    /// attempt, whether or not it resolved to a staged instruction.
    pub const fn last_fetched_raw_opcode(&self) -> Option<u16> {
        self.last_fetched_raw_opcode
    }

    /// Move the prefetched "next" instruction into "current", leaving
    /// "next" empty. Called once the previous current instruction has
    /// finished executing.
    pub fn promote_next_to_current(&mut self) {
        self.current = self.next.take();
    }

    /// Execute the staged current instruction against `state`. Does not
    /// clear the current slot -- the flow state machine decides when the
    /// pipeline advances. A cycle that enters state `B` with nothing staged
    /// (the instruction fetched into "current" failed to decode and was
    /// routed through `F`/`G` instead) is a no-op: there is nothing to run.
    pub fn execute<M: MemoryBus>(&self, state: &mut SimulationState<M>) -> CoreResult<()> {
        match self.current.as_ref() {
            Some(instr) => execution::execute(state, instr),
            None => Ok(()),
        }
    }

    /// `true` iff the current instruction is one of the conditional/
    /// unconditional jump mnemonics (format 2). The flow state machine
    /// consults this to decide whether the prefetched "next" instruction
    /// (fetched from the pre-jump program counter) must be discarded.
    pub fn current_instruction_is_jump(&self) -> bool {
        matches!(
            self.current.as_ref().map(|i| i.opcode_info().mnemonic),
            Some(
                Mnemonic::Jmp
                    | Mnemonic::Jeq
                    | Mnemonic::Jne
                    | Mnemonic::Jgt
                    | Mnemonic::Jlt
                    | Mnemonic::Jhe
                    | Mnemonic::Jh
                    | Mnemonic::Jl
                    | Mnemonic::Jle
                    | Mnemonic::Joc
                    | Mnemonic::Jnc
                    | Mnemonic::Jno
                    | Mnemonic::Jop
            )
        )
    }

    /// Discard a prefetched "next" instruction that a taken jump has just
    /// invalidated.
    pub fn discard_next(&mut self) {
        self.next = None;
    }

    /// `true` iff the current instruction is finalized (every
    /// format-mandated and addressing-mode extension word has been
    /// consumed). The decoder only ever produces finalized instructions, so
    /// this is a consistency check rather than a real gate.
    pub fn current_instruction_second_word_is_legal(&self) -> bool {
        self.current.as_ref().map(Instruction::is_finalized).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;

    #[test]
    fn begin_decodes_and_advances_pc() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.memory_mut().write_word(0x1000, 0x0320); // NOP
        st.set_pc(0x1000);
        let mut proc = ExecutionProcess::new();
        proc.begin(&mut st).unwrap();
        assert!(proc.has_current());
        assert_eq!(st.pc(), 0x1002);
    }

    #[test]
    fn promote_next_to_current_moves_the_prefetched_instruction() {
        let mut st = SimulationState::<FlatMemory>::default();
        st.memory_mut().write_word(0x1000, 0x0320);
        st.memory_mut().write_word(0x1002, 0x0340);
        st.set_pc(0x1000);
        let mut proc = ExecutionProcess::new();
        proc.begin(&mut st).unwrap();
        proc.fetch_next_instruction(&mut st);
        proc.promote_next_to_current();
        assert_eq!(
            proc.current().unwrap().opcode_info().mnemonic,
            crate::catalogue::Mnemonic::Idle
        );
    }
}
