//! The processor control-flow state machine: sequences instructions,
//! performs context switches on reset/interrupt, and gates execution on
//! privilege and exceptional conditions.

use tracing::{debug, trace};

use crate::catalogue::Mnemonic;
use crate::consts::{
    interrupt_level_pc_vector, interrupt_level_wp_vector, ERR_ARITHMETIC_OVERFLOW, ERR_ILLOP,
    ERR_PRIVOP, ST_MAPFILE_ENABLED, ST_MEMORY_MAPPED, ST_OVERFLOW, ST_OVERFLOW_INTERRUPT_ENABLED,
    ST_PRIVILEGED, ST_WCS_ENABLED, VECTOR_INTERNAL_PC, VECTOR_INTERNAL_WP, VECTOR_NMI_PC,
    VECTOR_NMI_WP, VECTOR_RESET_PC, VECTOR_RESET_WP,
};
use crate::error::{CoreError, CoreResult};
use crate::interrupts::InternalTrap;
use crate::memory::{FlatMemory, MemoryBus};
use crate::process::ExecutionProcess;
use crate::state::SimulationState;

/// One of the fourteen declared flow states. `flow_state` is always one of
/// these; there is no "unknown" tag to observe at runtime -- requesting a
/// transition to anything else is itself a `CoreBug` that routes to
/// `Crash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    PowerOn,
    Reset,
    Begin,
    A,
    A2,
    B,
    C,
    C2,
    D,
    E,
    F,
    F2,
    G,
    Crash,
}

/// Why a [`Flow::run`] call returned control to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// `max_state_changes` transitions were performed; call `run` again to
    /// continue.
    BoundReached,
    /// The current instruction was IDLE; a real busywait is not simulated,
    /// so the run loop stops instead of spinning.
    Idle,
    /// State `Crash` was reached.
    Crashed,
}

/// Registers R13/R14/R15 save old WP/PC/mask across a context switch, per
/// the TMS9900's workspace-switch convention.
const CONTEXT_SAVE_WP_REGISTER: u8 = 13;
const CONTEXT_SAVE_PC_REGISTER: u8 = 14;
const CONTEXT_SAVE_MASK_REGISTER: u8 = 15;

/// The processor control-flow state machine, paired with the
/// [`SimulationState`] it drives.
pub struct Flow<M = FlatMemory> {
    state: SimulationState<M>,
    flow_state: FlowState,
    process: ExecutionProcess,
    staged_pc: u16,
    staged_wp: u16,
    staged_mask: u8,
    active_interrupt_request: bool,
    last_trap_was_reset: bool,
    last_trap_was_illop: bool,
    current_is_privop_violation: bool,
    app_was_high_at_fetch: bool,
}

impl<M: MemoryBus> Flow<M> {
    /// Build a flow state machine around `state`, starting at `PowerOn`.
    pub fn new(state: SimulationState<M>) -> Self {
        Self {
            state,
            flow_state: FlowState::PowerOn,
            process: ExecutionProcess::new(),
            staged_pc: 0,
            staged_wp: 0,
            staged_mask: 0,
            active_interrupt_request: false,
            last_trap_was_reset: false,
            last_trap_was_illop: false,
            current_is_privop_violation: false,
            app_was_high_at_fetch: false,
        }
    }

    /// Force the machine back to `PowerOn` -- equivalent to pressing the
    /// reset button.
    pub fn reset(&mut self) {
        self.flow_state = FlowState::PowerOn;
        self.process = ExecutionProcess::new();
        self.active_interrupt_request = false;
    }

    /// Shared access to the driven processor state.
    pub fn state(&self) -> &SimulationState<M> {
        &self.state
    }

    /// Mutable access to the driven processor state -- used by a host to
    /// raise/clear interrupt lines between `run` calls.
    pub fn state_mut(&mut self) -> &mut SimulationState<M> {
        &mut self.state
    }

    /// The current flow-state tag.
    pub const fn flow_state(&self) -> FlowState {
        self.flow_state
    }

    /// Advance the state machine by at most `max_state_changes` transitions.
    pub fn run(&mut self, max_state_changes: u32) -> RunOutcome {
        for _ in 0..max_state_changes {
            trace!(target: "tms9900_core::flow", state = ?self.flow_state, "flow transition");
            match self.step() {
                Ok(Some(())) => continue,
                Ok(None) => return RunOutcome::Idle,
                Err(()) => return RunOutcome::Crashed,
            }
        }
        RunOutcome::BoundReached
    }

    /// Run exactly one state-handler invocation. `Ok(Some(()))` to keep
    /// going, `Ok(None)` to stop at IDLE, `Err(())` once `Crash` has been
    /// reached.
    fn step(&mut self) -> Result<Option<()>, ()> {
        match self.flow_state {
            FlowState::PowerOn => {
                self.flow_state = FlowState::Reset;
                Ok(Some(()))
            }
            FlowState::Reset => {
                self.staged_pc = self.state.memory().read_word(VECTOR_RESET_PC);
                self.staged_wp = self.state.memory().read_word(VECTOR_RESET_WP);
                self.staged_mask = 0;
                self.last_trap_was_reset = true;
                self.state.interrupts_mut().raise_internal(InternalTrap::Reset);
                self.flow_state = FlowState::Begin;
                Ok(Some(()))
            }
            FlowState::Begin => {
                self.do_begin();
                Ok(Some(()))
            }
            FlowState::A => {
                self.do_a();
                Ok(Some(()))
            }
            FlowState::A2 => self.do_a2(),
            FlowState::B => {
                self.do_b();
                Ok(Some(()))
            }
            FlowState::C => {
                self.do_c();
                Ok(Some(()))
            }
            FlowState::C2 => {
                self.do_c2();
                Ok(Some(()))
            }
            FlowState::D => {
                self.do_d();
                Ok(Some(()))
            }
            FlowState::E => {
                self.do_e();
                Ok(Some(()))
            }
            FlowState::F => {
                // This core implements no attached-processor path; F always
                // falls through to G.
                self.flow_state = FlowState::G;
                Ok(Some(()))
            }
            FlowState::F2 => Ok(None),
            FlowState::G => {
                debug!(target: "tms9900_core::flow", "ILLOP raised in state G");
                self.state.set_error_flag(ERR_ILLOP);
                self.state.interrupts_mut().raise_internal(InternalTrap::Illop);
                self.last_trap_was_illop = true;
                self.flow_state = FlowState::A;
                Ok(Some(()))
            }
            FlowState::Crash => Err(()),
        }
    }

    fn do_begin(&mut self) {
        let old_wp = self.state.wp();
        let old_pc = self.state.pc();
        let old_mask = self.state.status().interrupt_mask();
        self.state.set_wp(self.staged_wp);
        self.state.set_pc(self.staged_pc);
        self.state.status_mut().set_interrupt_mask(self.staged_mask);
        self.state.set_register_word(CONTEXT_SAVE_WP_REGISTER, old_wp);
        self.state.set_register_word(CONTEXT_SAVE_PC_REGISTER, old_pc);
        self.state.set_register_word(CONTEXT_SAVE_MASK_REGISTER, old_mask as u16);

        for bit in [
            ST_PRIVILEGED,
            ST_MAPFILE_ENABLED,
            ST_MEMORY_MAPPED,
            ST_OVERFLOW_INTERRUPT_ENABLED,
            ST_WCS_ENABLED,
        ] {
            let _ = self.state.status_mut().reset_bit(bit);
        }

        if self.last_trap_was_reset {
            self.state.status_mut().set_word(0);
            self.state.clear_error_flags();
            self.state.interrupts_mut().clear_internal(InternalTrap::Reset);
            self.last_trap_was_reset = false;
            self.flow_state = if self.state.interrupts().has_nmi() {
                FlowState::B
            } else {
                FlowState::C
            };
        } else if self.last_trap_was_illop && self.state.interrupts().has_nmi() {
            self.last_trap_was_illop = false;
            self.flow_state = FlowState::B;
        } else {
            self.flow_state = FlowState::C;
        }
    }

    fn do_a(&mut self) {
        if self.process.current_instruction_is_jump() {
            self.state.reduce_pc();
        }

        self.current_is_privop_violation = self
            .process
            .current()
            .map(|i| i.opcode_info().privileged && !self.state.status().bit(ST_PRIVILEGED).unwrap_or(false))
            .unwrap_or(false);

        let defers_nmi = matches!(
            self.process.current().map(|i| i.opcode_info().mnemonic),
            Some(Mnemonic::Xop | Mnemonic::Blwp | Mnemonic::X)
        );
        if !self.state.interrupts().has_nmi() && defers_nmi {
            self.flow_state = FlowState::B;
            return;
        }
        self.flow_state = FlowState::A2;
    }

    fn do_a2(&mut self) -> Result<Option<()>, ()> {
        let mask = self.state.status().interrupt_mask();
        if self.state.interrupts().has_any_raised_ignoring_mask()
            && !self.state.interrupts().lowest_raised_is_enabled_by_mask(mask)
        {
            self.active_interrupt_request = true;
            self.flow_state = FlowState::B;
            return Ok(Some(()));
        }
        if matches!(self.process.current().map(|i| i.opcode_info().mnemonic), Some(Mnemonic::Idle)) {
            return Ok(None);
        }
        self.flow_state = FlowState::B;
        Ok(Some(()))
    }

    fn do_b(&mut self) {
        self.app_was_high_at_fetch = false;
        let _ = self.process.fetch_next_instruction(&mut self.state);

        if let Err(err) = self.process.execute(&mut self.state) {
            self.handle_execute_error(err);
        }

        if self.process.current_instruction_is_jump() {
            self.process.discard_next();
            let _ = self.process.fetch_next_instruction(&mut self.state);
        }
        self.process.promote_next_to_current();
        self.flow_state = FlowState::D;
    }

    fn do_c(&mut self) {
        self.app_was_high_at_fetch = false;
        let _ = self.process.fetch_next_instruction(&mut self.state);
        self.process.promote_next_to_current();
        self.flow_state = FlowState::C2;
    }

    fn do_c2(&mut self) {
        if self.current_is_privop_violation {
            self.state.set_error_flag(ERR_PRIVOP);
            self.state.interrupts_mut().raise_internal(InternalTrap::Privop);
            debug!(target: "tms9900_core::flow", "privileged-op violation trapped");
            if self.state.status().interrupt_mask() > 2 {
                self.flow_state = FlowState::E;
                return;
            }
        }
        // Consult the raw fetched word, not the decoded instruction: a word
        // that failed to decode (illegal/MID opcode) leaves `current` empty,
        // but it still has to be classified here to reach `F`/`G`.
        let is_mid = self
            .process
            .last_fetched_raw_opcode()
            .map(crate::catalogue::opcode_could_be_mid)
            .unwrap_or(false);
        if is_mid || self.app_was_high_at_fetch {
            self.flow_state = FlowState::F;
            return;
        }
        self.flow_state = FlowState::A;
    }

    fn do_d(&mut self) {
        let overflow = self.state.status().bit(ST_OVERFLOW).unwrap_or(false);
        let overflow_enabled = self.state.status().bit(ST_OVERFLOW_INTERRUPT_ENABLED).unwrap_or(false);
        if overflow && overflow_enabled {
            self.state.set_error_flag(ERR_ARITHMETIC_OVERFLOW);
            debug!(target: "tms9900_core::flow", "arithmetic overflow trapped");
            if self.state.status().interrupt_mask() > 2 {
                self.state.reduce_pc();
                self.flow_state = FlowState::E;
                return;
            }
        }
        if self.active_interrupt_request {
            self.state.reduce_pc();
            self.flow_state = FlowState::E;
            return;
        }
        self.flow_state = FlowState::C2;
    }

    fn do_e(&mut self) {
        self.active_interrupt_request = true;
        if self.state.interrupts().has_nmi() {
            self.staged_pc = self.state.memory().read_word(VECTOR_NMI_PC);
            self.staged_wp = self.state.memory().read_word(VECTOR_NMI_WP);
            self.staged_mask = 0;
        } else if self.state.interrupts().has_enabled_internal() {
            self.staged_wp = self.state.memory().read_word(VECTOR_INTERNAL_WP);
            self.staged_pc = self.state.memory().read_word(VECTOR_INTERNAL_PC);
            self.staged_mask = 1;
        } else {
            match self.state.interrupts().lowest_raised() {
                Some(0) => {
                    self.staged_wp = self.state.memory().read_word(VECTOR_RESET_WP);
                    self.staged_pc = self.state.memory().read_word(VECTOR_RESET_PC);
                    self.staged_mask = 0;
                }
                Some(level) => {
                    self.staged_wp = self.state.memory().read_word(interrupt_level_wp_vector(level));
                    self.staged_pc = self.state.memory().read_word(interrupt_level_pc_vector(level));
                    self.staged_mask = level - 1;
                }
                None => {
                    self.flow_state = FlowState::Crash;
                    return;
                }
            }
        }
        self.flow_state = FlowState::Begin;
    }

    fn handle_execute_error(&mut self, err: CoreError) {
        match err {
            CoreError::IllegalOpcode(_) => {
                self.flow_state = FlowState::G;
            }
            CoreError::UnimplementedOp(mnemonic) => {
                debug!(target: "tms9900_core::flow", mnemonic = %mnemonic, "unimplemented opcode executed as a no-op");
            }
            CoreError::PrivilegedOpViolation => {
                self.current_is_privop_violation = true;
            }
            other => {
                debug!(target: "tms9900_core::flow", error = %other, "core bug during execute");
                self.flow_state = FlowState::Crash;
            }
        }
    }
}

#[allow(dead_code)]
fn assert_result_is_used(_: CoreResult<()>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;

    fn booted_flow() -> Flow<FlatMemory> {
        let mut mem = FlatMemory::new();
        mem.write_word(VECTOR_RESET_WP, 0x8300);
        mem.write_word(VECTOR_RESET_PC, 0x8000);
        let state = SimulationState::new(mem);
        let mut flow = Flow::new(state);
        // Drive PowerOn -> Reset -> Begin so the reset vector is loaded.
        flow.run(3);
        flow
    }

    #[test]
    fn flow_state_is_always_a_declared_tag() {
        let mut flow = booted_flow();
        for _ in 0..50 {
            flow.run(1);
            let tag = flow.flow_state();
            assert!(matches!(
                tag,
                FlowState::PowerOn
                    | FlowState::Reset
                    | FlowState::Begin
                    | FlowState::A
                    | FlowState::A2
                    | FlowState::B
                    | FlowState::C
                    | FlowState::C2
                    | FlowState::D
                    | FlowState::E
                    | FlowState::F
                    | FlowState::F2
                    | FlowState::G
                    | FlowState::Crash
            ));
            if tag == FlowState::Crash {
                break;
            }
        }
    }

    #[test]
    fn reset_loads_pc_and_wp_from_the_vector_table() {
        let flow = booted_flow();
        assert_eq!(flow.state().wp(), 0x8300);
        assert_eq!(flow.state().pc(), 0x8000);
    }

    #[test]
    fn illegal_opcode_sets_the_illop_error_flag() {
        let mut mem = FlatMemory::new();
        mem.write_word(VECTOR_RESET_WP, 0x8300);
        mem.write_word(VECTOR_RESET_PC, 0x8000);
        mem.write_word(0x8000, 0x0000); // falls in MID range, not catalogued
        let state = SimulationState::new(mem);
        let mut flow = Flow::new(state);
        flow.run(200);
        assert!(flow.state().error_flag(ERR_ILLOP));
    }
}
