//! Reconstructs readable statement text from compiled `Function::instructions`
//! (§4.6/§4.10). `handler_sources` is drained once the bytecode compiler
//! runs, so a function reached only via a decompiled KRB has nothing but its
//! instruction stream to print from — this module symbolically re-executes
//! that stream over a stack of source-text fragments instead of runtime
//! values, recovering the ternary jump pattern the compiler emits but
//! otherwise working one instruction at a time.
//!
//! Known, documented gaps (see DESIGN.md): local-variable names aren't
//! preserved (`kryon-bytecode` assigns anonymous slots), so locals print as
//! `localN`; template segment boundaries collapse into `+`-joined
//! concatenation since the bytecode doesn't retain them; and a host function
//! call that isn't one of the three VM builtins prints as a zero-argument
//! call, since `HostFunctionDecl` doesn't carry an arity for the decompiler
//! to recover.

use std::collections::HashMap;

use kryon_bytecode::{ARRAY_INDEX_HOST_ID, MEMBER_ACCESS_HOST_ID, STRINGIFY_HOST_ID};
use kryon_ir::{Function, Instruction, Ir, StringTable};

use crate::error::PrinterError;
use crate::value_print::quote;

struct Ctx<'a> {
    strings: &'a StringTable,
    state_names: HashMap<u16, String>,
    function_names: HashMap<u32, String>,
    function_arity: HashMap<u32, usize>,
    host_names: HashMap<u32, String>,
}

fn build_ctx(ir: &Ir) -> Ctx<'_> {
    let state_names =
        ir.states.iter().map(|s| (s.state_id, ir.strings.get(s.name_index).unwrap_or("").to_string())).collect();
    let function_names =
        ir.functions.iter().map(|f| (f.function_id, ir.strings.get(f.name_index).unwrap_or("").to_string())).collect();
    let function_arity = ir.functions.iter().map(|f| (f.function_id, f.param_indices.len())).collect();
    let host_names = ir.host_functions.iter().map(|h| (h.id, ir.strings.get(h.name_index).unwrap_or("").to_string())).collect();
    Ctx { strings: &ir.strings, state_names, function_names, function_arity, host_names }
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').to_string()
}

fn apply_offset(index: usize, offset: i32) -> usize {
    (index as i64 + 1 + offset as i64).max(0) as usize
}

fn pop(stack: &mut Vec<String>, function_id: u32) -> Result<String, PrinterError> {
    stack.pop().ok_or(PrinterError::StackUnderflow(function_id))
}

/// Decompiles one function's bytecode into a flat list of statement lines.
pub fn decompile_function(ir: &Ir, function: &Function) -> Result<Vec<String>, PrinterError> {
    let ctx = build_ctx(ir);
    let (_, statements) = run(&function.instructions, &ctx, function.function_id)?;
    Ok(statements)
}

fn run(instrs: &[Instruction], ctx: &Ctx<'_>, function_id: u32) -> Result<(Vec<String>, Vec<String>), PrinterError> {
    let mut stack: Vec<String> = Vec::new();
    let mut statements: Vec<String> = Vec::new();
    let mut i = 0usize;

    while i < instrs.len() {
        match &instrs[i] {
            Instruction::Halt | Instruction::Return => break,
            Instruction::Jump(offset) => {
                i = apply_offset(i, *offset);
                continue;
            }
            Instruction::JumpIfFalse(offset) => {
                let cond = pop(&mut stack, function_id)?;
                let else_start = apply_offset(i, *offset);
                let jump_idx = else_start.saturating_sub(1);
                let end = match instrs.get(jump_idx) {
                    Some(Instruction::Jump(jump_offset)) => apply_offset(jump_idx, *jump_offset),
                    _ => else_start,
                };
                let (then_stack, _) = run(&instrs[i + 1..jump_idx.min(instrs.len())], ctx, function_id)?;
                let (else_stack, _) = run(&instrs[else_start.min(instrs.len())..end.min(instrs.len())], ctx, function_id)?;
                let then_val = then_stack.last().cloned().unwrap_or_default();
                let else_val = else_stack.last().cloned().unwrap_or_default();
                stack.push(format!("({cond} ? {then_val} : {else_val})"));
                i = end;
                continue;
            }
            instr => step(instr, &mut stack, &mut statements, ctx, function_id)?,
        }
        i += 1;
    }

    Ok((stack, statements))
}

fn binop_symbol(instr: &Instruction) -> Option<&'static str> {
    Some(match instr {
        Instruction::Add => "+",
        Instruction::Sub => "-",
        Instruction::Mul => "*",
        Instruction::Div => "/",
        Instruction::Mod => "%",
        Instruction::Eq => "==",
        Instruction::Ne => "!=",
        Instruction::Lt => "<",
        Instruction::Gt => ">",
        Instruction::Le => "<=",
        Instruction::Ge => ">=",
        Instruction::And => "&&",
        Instruction::Or => "||",
        _ => return None,
    })
}

fn step(instr: &Instruction, stack: &mut Vec<String>, statements: &mut Vec<String>, ctx: &Ctx<'_>, function_id: u32) -> Result<(), PrinterError> {
    if let Some(sym) = binop_symbol(instr) {
        let b = pop(stack, function_id)?;
        let a = pop(stack, function_id)?;
        stack.push(format!("({a} {sym} {b})"));
        return Ok(());
    }

    match instr {
        Instruction::PushInt(v) => stack.push(v.to_string()),
        Instruction::PushFloat(v) => stack.push(v.to_string()),
        Instruction::PushBool(v) => stack.push(v.to_string()),
        Instruction::PushString(idx) => stack.push(quote(ctx.strings.get(*idx).unwrap_or(""))),
        Instruction::Pop => {
            let v = pop(stack, function_id)?;
            statements.push(format!("{v};"));
        }
        Instruction::Dup => {
            let v = stack.last().cloned().ok_or(PrinterError::StackUnderflow(function_id))?;
            stack.push(v);
        }
        Instruction::Neg => {
            let a = pop(stack, function_id)?;
            stack.push(format!("-{a}"));
        }
        Instruction::Not => {
            let a = pop(stack, function_id)?;
            stack.push(format!("!{a}"));
        }
        Instruction::Concat => {
            let b = pop(stack, function_id)?;
            let a = pop(stack, function_id)?;
            stack.push(format!("{a} + {b}"));
        }
        Instruction::GetState(id) => {
            let name = ctx.state_names.get(id).cloned().ok_or(PrinterError::UnknownState(function_id, *id))?;
            stack.push(name);
        }
        Instruction::SetState(id) => {
            let v = pop(stack, function_id)?;
            let name = ctx.state_names.get(id).cloned().ok_or(PrinterError::UnknownState(function_id, *id))?;
            statements.push(format!("{name} = {v};"));
        }
        Instruction::GetLocal(slot) => stack.push(format!("local{slot}")),
        Instruction::SetLocal(slot) => {
            let v = pop(stack, function_id)?;
            statements.push(format!("local{slot} = {v};"));
        }
        Instruction::Call(id) => {
            let name = ctx.function_names.get(id).cloned().ok_or(PrinterError::UnknownFunction(function_id, *id))?;
            let arity = ctx.function_arity.get(id).copied().unwrap_or(0);
            let mut args = Vec::with_capacity(arity);
            for _ in 0..arity {
                args.push(pop(stack, function_id)?);
            }
            args.reverse();
            stack.push(format!("{name}({})", args.join(", ")));
        }
        Instruction::CallHost(id) if *id == MEMBER_ACCESS_HOST_ID => {
            let field = pop(stack, function_id)?;
            let obj = pop(stack, function_id)?;
            stack.push(format!("{obj}.{}", unquote(&field)));
        }
        Instruction::CallHost(id) if *id == ARRAY_INDEX_HOST_ID => {
            let index = pop(stack, function_id)?;
            let base = pop(stack, function_id)?;
            stack.push(format!("{base}[{index}]"));
        }
        Instruction::CallHost(id) if *id == STRINGIFY_HOST_ID => {
            // Runtime-only coercion wrapper; the operand already prints fine.
        }
        Instruction::CallHost(id) => {
            let name = ctx.host_names.get(id).cloned().unwrap_or_else(|| format!("host_{id}"));
            stack.push(format!("{name}()"));
        }
        Instruction::GetProp(..) | Instruction::SetProp(..) => {
            stack.push("/* backend property access */".to_string());
        }
        Instruction::Jump(_) | Instruction::JumpIfFalse(_) | Instruction::Halt | Instruction::Return => unreachable!(),
        Instruction::Add | Instruction::Sub | Instruction::Mul | Instruction::Div | Instruction::Mod | Instruction::Eq
        | Instruction::Ne | Instruction::Lt | Instruction::Gt | Instruction::Le | Instruction::Ge | Instruction::And
        | Instruction::Or => unreachable!("handled by binop_symbol above"),
    }
    Ok(())
}
