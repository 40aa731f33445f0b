use kryon_ir::{Function, Instruction, StringTable};
use tracing::trace;

use crate::error::VmError;
use crate::host::HostRegistry;
use crate::state::StateTable;
use crate::value::{self, RuntimeValue};

/// Tunables for a single execution (§4.11, §5 concurrency notes on
/// cooperative instruction budgets).
#[derive(Debug, Clone, Copy)]
pub struct VmConfig {
    pub stack_capacity: usize,
    pub call_stack_capacity: usize,
    pub instruction_budget: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self { stack_capacity: 256, call_stack_capacity: 64, instruction_budget: None }
    }
}

struct Frame {
    function_id: u32,
    pc: usize,
    locals: Vec<RuntimeValue>,
    /// Index into the shared operand stack below which this frame's own
    /// pushes never reach — lets `Call` hand the caller back exactly one
    /// "return value" once the callee halts.
    stack_base: usize,
}

/// A single-threaded, cooperatively-scheduled stack machine (§4.11). One
/// `Vm` executes one function call tree to completion or to a trap; there is
/// no preemption and no resumable/paused state (§4.12).
pub struct Vm<'a> {
    config: VmConfig,
    host: &'a HostRegistry,
    state: &'a mut StateTable,
    strings: &'a mut StringTable,
    stack: Vec<RuntimeValue>,
    halted_flag: bool,
}

impl<'a> Vm<'a> {
    pub fn new(host: &'a HostRegistry, state: &'a mut StateTable, strings: &'a mut StringTable, config: VmConfig) -> Self {
        Self { config, host, state, strings, stack: Vec::new(), halted_flag: false }
    }

    /// Cooperative cancellation: a host call (or surrounding scheduler) can
    /// flag the VM to stop at the next instruction boundary rather than
    /// being preempted mid-instruction.
    pub fn request_halt(&mut self) {
        self.halted_flag = true;
    }

    /// Runs `entry_id` with `args` to completion. On success, buffered state
    /// writes are committed and subscribers notified; on a trap, buffered
    /// writes are discarded so a failed handler never partially applies.
    pub fn run(&mut self, functions: &[Function], entry_id: u32, args: Vec<RuntimeValue>) -> Result<(), VmError> {
        let result = self.run_inner(functions, entry_id, args);
        match &result {
            Ok(()) => self.state.commit_pending(),
            Err(_) => self.state.discard_pending(),
        }
        result
    }

    fn run_inner(&mut self, functions: &[Function], entry_id: u32, args: Vec<RuntimeValue>) -> Result<(), VmError> {
        self.halted_flag = false;
        let mut frames = vec![self.enter_frame(functions, entry_id, args)?];
        let mut instructions_executed: u64 = 0;

        loop {
            if self.halted_flag {
                return Ok(());
            }
            if let Some(budget) = self.config.instruction_budget {
                if instructions_executed >= budget {
                    return Err(VmError::InstructionBudgetExceeded(budget));
                }
            }

            let frame = frames.last_mut().expect("at least one frame while running");
            let func = find_function(functions, frame.function_id)?;
            if frame.pc >= func.instructions.len() {
                return Err(VmError::InvalidJump(frame.pc as i64));
            }
            let pc_at_fetch = frame.pc;
            frame.pc += 1;
            instructions_executed += 1;
            let instr = &func.instructions[pc_at_fetch];
            trace!(?instr, pc = pc_at_fetch, "executing instruction");

            match instr {
                Instruction::PushInt(i) => self.push(RuntimeValue::Int(*i))?,
                Instruction::PushFloat(f) => self.push(RuntimeValue::Float(*f))?,
                Instruction::PushString(s) => self.push(RuntimeValue::Str(*s))?,
                Instruction::PushBool(b) => self.push(RuntimeValue::Bool(*b))?,
                Instruction::Pop => {
                    self.pop()?;
                }
                Instruction::Dup => {
                    let top = self.peek()?.clone();
                    self.push(top)?;
                }
                Instruction::Add => self.binary(value::add)?,
                Instruction::Sub => self.binary(value::sub)?,
                Instruction::Mul => self.binary(value::mul)?,
                Instruction::Div => self.binary(value::div)?,
                Instruction::Mod => self.binary(value::modulo)?,
                Instruction::Neg => {
                    let v = self.pop()?;
                    self.push(match v {
                        RuntimeValue::Int(i) => RuntimeValue::Int(i.wrapping_neg()),
                        RuntimeValue::Float(f) => RuntimeValue::Float(-f),
                        other => other,
                    })?;
                }
                Instruction::Eq => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(a == b))?;
                }
                Instruction::Ne => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(a != b))?;
                }
                Instruction::Lt => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(value::compare_lt(&a, &b, self.strings)))?;
                }
                Instruction::Gt => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(value::compare_gt(&a, &b, self.strings)))?;
                }
                Instruction::Le => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(value::compare_le(&a, &b, self.strings)))?;
                }
                Instruction::Ge => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(value::compare_ge(&a, &b, self.strings)))?;
                }
                Instruction::And => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(a.truthy() && b.truthy()))?;
                }
                Instruction::Or => {
                    let (a, b) = self.pop_pair()?;
                    self.push(RuntimeValue::Bool(a.truthy() || b.truthy()))?;
                }
                Instruction::Not => {
                    let v = self.pop()?;
                    self.push(RuntimeValue::Bool(!v.truthy()))?;
                }
                Instruction::Concat => {
                    let (a, b) = self.pop_pair()?;
                    let joined = format!("{}{}", self.render_value(&a), self.render_value(&b));
                    let idx = self.strings.intern(&joined);
                    self.push(RuntimeValue::Str(idx))?;
                }
                Instruction::GetState(id) => {
                    let v = self.state.get(*id);
                    self.push(v)?;
                }
                Instruction::SetState(id) => {
                    let v = self.pop()?;
                    self.state.set(*id, v);
                }
                Instruction::GetLocal(slot) => {
                    let frame = frames.last().expect("frame");
                    let v = frame.locals.get(*slot as usize).cloned().unwrap_or(RuntimeValue::Null);
                    self.push(v)?;
                }
                Instruction::SetLocal(slot) => {
                    let v = self.pop()?;
                    let frame = frames.last_mut().expect("frame");
                    if (*slot as usize) >= frame.locals.len() {
                        frame.locals.resize(*slot as usize + 1, RuntimeValue::Null);
                    }
                    frame.locals[*slot as usize] = v;
                }
                Instruction::Jump(offset) => {
                    let frame = frames.last_mut().expect("frame");
                    frame.pc = apply_offset(frame.pc, *offset)?;
                }
                Instruction::JumpIfFalse(offset) => {
                    let cond = self.pop()?;
                    if !cond.truthy() {
                        let frame = frames.last_mut().expect("frame");
                        frame.pc = apply_offset(frame.pc, *offset)?;
                    }
                }
                Instruction::Call(function_id) => {
                    if frames.len() >= self.config.call_stack_capacity {
                        return Err(VmError::CallStackOverflow(self.config.call_stack_capacity));
                    }
                    let callee = find_function(functions, *function_id)?;
                    let arity = callee.param_indices.len();
                    let mut call_args = Vec::with_capacity(arity);
                    for _ in 0..arity {
                        call_args.push(self.pop()?);
                    }
                    call_args.reverse();
                    let new_frame = self.enter_frame(functions, *function_id, call_args)?;
                    frames.push(new_frame);
                }
                Instruction::Return => {
                    self.return_from_frame(&mut frames)?;
                    if frames.is_empty() {
                        return Ok(());
                    }
                }
                Instruction::CallHost(id) => {
                    let arity = self.host.arity(*id);
                    let mut call_args = Vec::with_capacity(arity);
                    for _ in 0..arity {
                        call_args.push(self.pop()?);
                    }
                    call_args.reverse();
                    let result = self.host.call(*id, &call_args)?;
                    self.push(result)?;
                }
                Instruction::GetProp(_obj, _prop) | Instruction::SetProp(_obj, _prop) => {
                    // Backend-specific element property access; not produced
                    // by the bytecode compiler and not meaningful without a
                    // live backend, so it's a documented no-op here.
                }
                Instruction::Halt => {
                    if frames.len() > 1 {
                        // A called subroutine also ends in `Halt` (every
                        // compiled function is terminated uniformly); treat
                        // it as an implicit `Return` rather than stopping
                        // the whole machine.
                        self.return_from_frame(&mut frames)?;
                    } else {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn enter_frame(&mut self, functions: &[Function], function_id: u32, args: Vec<RuntimeValue>) -> Result<Frame, VmError> {
        find_function(functions, function_id)?;
        let stack_base = self.stack.len();
        Ok(Frame { function_id, pc: 0, locals: args, stack_base })
    }

    fn return_from_frame(&mut self, frames: &mut Vec<Frame>) -> Result<(), VmError> {
        let frame = frames.pop().expect("frame to return from");
        let return_value = if self.stack.len() > frame.stack_base { self.pop()? } else { RuntimeValue::Null };
        self.stack.truncate(frame.stack_base);
        if !frames.is_empty() {
            self.push(return_value)?;
        }
        Ok(())
    }

    fn render_value(&self, v: &RuntimeValue) -> String {
        match v {
            RuntimeValue::Int(i) => i.to_string(),
            RuntimeValue::Float(f) => f.to_string(),
            RuntimeValue::Bool(b) => b.to_string(),
            RuntimeValue::Null => String::new(),
            RuntimeValue::Str(idx) => self.strings.get(*idx).unwrap_or("").to_string(),
        }
    }

    fn push(&mut self, value: RuntimeValue) -> Result<(), VmError> {
        if self.stack.len() >= self.config.stack_capacity {
            return Err(VmError::StackOverflow(self.config.stack_capacity));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<RuntimeValue, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    fn peek(&self) -> Result<&RuntimeValue, VmError> {
        self.stack.last().ok_or(VmError::StackUnderflow)
    }

    fn pop_pair(&mut self) -> Result<(RuntimeValue, RuntimeValue), VmError> {
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    fn binary(&mut self, f: impl Fn(RuntimeValue, RuntimeValue) -> Result<RuntimeValue, VmError>) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        let result = f(a, b)?;
        self.push(result)
    }
}

fn apply_offset(pc: usize, offset: i32) -> Result<usize, VmError> {
    let target = pc as i64 + offset as i64;
    if target < 0 {
        return Err(VmError::InvalidJump(target));
    }
    Ok(target as usize)
}

fn find_function(functions: &[Function], function_id: u32) -> Result<&Function, VmError> {
    functions.iter().find(|f| f.function_id == function_id).ok_or(VmError::UnknownFunction(function_id))
}

