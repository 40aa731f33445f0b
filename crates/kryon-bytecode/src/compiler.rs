use std::collections::HashMap;

use kryon_ir::{BinOp, Expression, Instruction, Ir, IrStmt, StringIndex, TemplateSegment, UnOp, Value};

use crate::builtin::{ARRAY_INDEX_HOST_ID, MEMBER_ACCESS_HOST_ID, STRINGIFY_HOST_ID};
use crate::error::BytecodeError;

/// Lowers every bytecode-backed function's resolved statement body
/// (`Ir.handler_sources`) into `Function.instructions`, then drains the
/// source table — it's only meaningful until this stage runs (§4.6).
pub fn compile_functions(ir: &mut Ir) -> Result<(), BytecodeError> {
    let state_ids: HashMap<StringIndex, u16> = ir.states.iter().map(|s| (s.name_index, s.state_id)).collect();
    let function_ids: HashMap<StringIndex, u32> = ir.functions.iter().map(|f| (f.name_index, f.function_id)).collect();
    let host_ids: HashMap<StringIndex, u32> = ir.host_functions.iter().map(|h| (h.name_index, h.id)).collect();

    let sources = std::mem::take(&mut ir.handler_sources);
    let lowerer = Lowerer { state_ids: &state_ids, function_ids: &function_ids, host_ids: &host_ids };

    for (function_id, stmts) in sources {
        let instructions = lowerer.lower_body(&stmts)?;
        let function = ir
            .functions
            .iter_mut()
            .find(|f| f.function_id == function_id)
            .ok_or(BytecodeError::UnknownFunction(function_id))?;
        function.instructions = instructions;
    }

    Ok(())
}

struct Lowerer<'a> {
    state_ids: &'a HashMap<StringIndex, u16>,
    function_ids: &'a HashMap<StringIndex, u32>,
    host_ids: &'a HashMap<StringIndex, u32>,
}

/// Tracks local-slot assignment within a single function body. Reactive
/// state names resolve through `state_ids`; any other name is treated as a
/// local (typically a function parameter) and given a slot in first-use
/// order, since `Function` doesn't retain original parameter names (only
/// their count, via `param_indices`).
#[derive(Default)]
struct Locals {
    slots: HashMap<StringIndex, u16>,
    next: u16,
}

impl Locals {
    fn slot_for(&mut self, name: StringIndex) -> u16 {
        *self.slots.entry(name).or_insert_with(|| {
            let slot = self.next;
            self.next += 1;
            slot
        })
    }
}

/// Only scalar kinds have a stack representation (`instruction.rs`'s `Push*`
/// family) — handler bodies manipulate counters/flags/labels, never whole
/// colors, arrays, or objects, which exist only as element property values.
fn push_value(value: &Value, out: &mut Vec<Instruction>) -> Result<(), BytecodeError> {
    match value {
        Value::Int(i) => out.push(Instruction::PushInt(*i)),
        Value::Float(f) => out.push(Instruction::PushFloat(*f)),
        Value::Bool(b) => out.push(Instruction::PushBool(*b)),
        Value::String(s) => out.push(Instruction::PushString(*s)),
        Value::Unit(v, _) => out.push(Instruction::PushFloat(*v)),
        Value::Null => out.push(Instruction::PushBool(false)),
        Value::Color(..) | Value::Array(_) | Value::Object(_) => {
            return Err(BytecodeError::UnsupportedExpression(format!(
                "{:?} has no runtime stack representation",
                value.kind()
            )));
        }
    }
    Ok(())
}

impl<'a> Lowerer<'a> {
    fn lower_body(&self, stmts: &[IrStmt]) -> Result<Vec<Instruction>, BytecodeError> {
        let mut out = Vec::new();
        let mut locals = Locals::default();
        for stmt in stmts {
            self.lower_stmt(stmt, &mut out, &mut locals)?;
        }
        out.push(Instruction::Halt);
        Ok(out)
    }

    fn lower_stmt(&self, stmt: &IrStmt, out: &mut Vec<Instruction>, locals: &mut Locals) -> Result<(), BytecodeError> {
        match stmt {
            IrStmt::Expr(expr) => {
                self.lower_expr(expr, out, locals)?;
                out.push(Instruction::Pop);
            }
            IrStmt::Assign { target_state, value } => {
                self.lower_expr(value, out, locals)?;
                let state_id =
                    self.state_ids.get(target_state).copied().ok_or(BytecodeError::UnknownState(*target_state))?;
                out.push(Instruction::SetState(state_id));
            }
        }
        Ok(())
    }

    fn lower_expr(&self, expr: &Expression, out: &mut Vec<Instruction>, locals: &mut Locals) -> Result<(), BytecodeError> {
        if let Some(value) = expr.fold_const() {
            push_value(&value, out)?;
            return Ok(());
        }

        match expr {
            Expression::Literal(v) => push_value(v, out)?,
            Expression::VarRef(name) => match self.state_ids.get(name) {
                Some(&id) => out.push(Instruction::GetState(id)),
                None => out.push(Instruction::GetLocal(locals.slot_for(*name))),
            },
            Expression::MemberAccess(inner, field) => {
                self.lower_expr(inner, out, locals)?;
                out.push(Instruction::PushString(*field));
                out.push(Instruction::CallHost(MEMBER_ACCESS_HOST_ID));
            }
            Expression::ArrayAccess(base, index) => {
                self.lower_expr(base, out, locals)?;
                self.lower_expr(index, out, locals)?;
                out.push(Instruction::CallHost(ARRAY_INDEX_HOST_ID));
            }
            Expression::BinaryOp(op, lhs, rhs) => {
                self.lower_expr(lhs, out, locals)?;
                self.lower_expr(rhs, out, locals)?;
                out.push(binop_instruction(*op));
            }
            Expression::UnaryOp(op, inner) => {
                self.lower_expr(inner, out, locals)?;
                out.push(match op {
                    UnOp::Neg => Instruction::Neg,
                    UnOp::Not => Instruction::Not,
                });
            }
            Expression::Ternary(cond, then, else_) => {
                self.lower_expr(cond, out, locals)?;
                let jf_pos = out.len();
                out.push(Instruction::JumpIfFalse(0));
                self.lower_expr(then, out, locals)?;
                let jmp_pos = out.len();
                out.push(Instruction::Jump(0));
                let else_start = out.len();
                out[jf_pos] = Instruction::JumpIfFalse((else_start - jf_pos - 1) as i32);
                self.lower_expr(else_, out, locals)?;
                let end = out.len();
                out[jmp_pos] = Instruction::Jump((end - jmp_pos - 1) as i32);
            }
            Expression::FunctionCall(name, args) => {
                for arg in args {
                    self.lower_expr(arg, out, locals)?;
                }
                if let Some(&id) = self.host_ids.get(name) {
                    out.push(Instruction::CallHost(id));
                } else if let Some(&id) = self.function_ids.get(name) {
                    out.push(Instruction::Call(id));
                } else {
                    return Err(BytecodeError::UnknownCallee(*name));
                }
            }
            Expression::Template(segments) => self.lower_template(segments, out, locals)?,
            Expression::ArrayLit(_) | Expression::ObjectLit(_) => {
                return Err(BytecodeError::UnsupportedExpression(
                    "non-constant array/object literals have no stack representation".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn lower_template(
        &self,
        segments: &[TemplateSegment],
        out: &mut Vec<Instruction>,
        locals: &mut Locals,
    ) -> Result<(), BytecodeError> {
        if segments.is_empty() {
            out.push(Instruction::PushString(0));
            return Ok(());
        }

        let mut first = true;
        for segment in segments {
            match segment {
                TemplateSegment::Literal(s) => out.push(Instruction::PushString(*s)),
                TemplateSegment::Expr(expr) => {
                    self.lower_expr(expr, out, locals)?;
                    out.push(Instruction::CallHost(STRINGIFY_HOST_ID));
                }
            }
            if !first {
                out.push(Instruction::Concat);
            }
            first = false;
        }
        Ok(())
    }
}

fn binop_instruction(op: BinOp) -> Instruction {
    match op {
        BinOp::Add => Instruction::Add,
        BinOp::Sub => Instruction::Sub,
        BinOp::Mul => Instruction::Mul,
        BinOp::Div => Instruction::Div,
        BinOp::Mod => Instruction::Mod,
        BinOp::Eq => Instruction::Eq,
        BinOp::Ne => Instruction::Ne,
        BinOp::Lt => Instruction::Lt,
        BinOp::Gt => Instruction::Gt,
        BinOp::Le => Instruction::Le,
        BinOp::Ge => Instruction::Ge,
        BinOp::And => Instruction::And,
        BinOp::Or => Instruction::Or,
    }
}

#[cfg(test)]
mod tests {
    use kryon_ir::{Function, StateCell, StateType};

    use super::*;

    fn ir_with_increment_handler() -> Ir {
        let mut ir = Ir::empty();
        let count_name = ir.strings.intern("count");
        ir.states.push(StateCell { state_id: 0, name_index: count_name, value_type: StateType::Int, initial: Value::Int(0) });

        let function_id = 0;
        let name_index = ir.strings.intern("on_click");
        let lang = ir.strings.intern(kryon_ir::EMBEDDED_BYTECODE_LANGUAGE);
        ir.functions.push(Function { function_id, name_index, language_tag_index: lang, param_indices: vec![], code_index: 0, instructions: vec![] });

        let stmt = IrStmt::Assign {
            target_state: count_name,
            value: Expression::BinaryOp(BinOp::Add, Box::new(Expression::VarRef(count_name)), Box::new(Expression::Literal(Value::Int(1)))),
        };
        ir.handler_sources.insert(function_id, vec![stmt]);
        ir
    }

    #[test]
    fn increment_handler_lowers_to_expected_bytecode() {
        let mut ir = ir_with_increment_handler();
        compile_functions(&mut ir).unwrap();
        assert!(ir.handler_sources.is_empty());
        assert_eq!(
            ir.functions[0].instructions,
            vec![
                Instruction::GetState(0),
                Instruction::PushInt(1),
                Instruction::Add,
                Instruction::SetState(0),
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn ternary_lowers_with_correctly_patched_jumps() {
        let mut ir = Ir::empty();
        let flag = ir.strings.intern("flag");
        ir.states.push(StateCell { state_id: 0, name_index: flag, value_type: StateType::Bool, initial: Value::Bool(true) });
        let function_id = 0;
        let name_index = ir.strings.intern("h");
        let lang = ir.strings.intern(kryon_ir::EMBEDDED_BYTECODE_LANGUAGE);
        ir.functions.push(Function { function_id, name_index, language_tag_index: lang, param_indices: vec![], code_index: 0, instructions: vec![] });
        let expr = Expression::Ternary(
            Box::new(Expression::VarRef(flag)),
            Box::new(Expression::Literal(Value::Int(1))),
            Box::new(Expression::Literal(Value::Int(2))),
        );
        ir.handler_sources.insert(function_id, vec![IrStmt::Expr(expr)]);

        compile_functions(&mut ir).unwrap();
        let instrs = &ir.functions[0].instructions;
        // GetState, JumpIfFalse, PushInt(1), Jump, PushInt(2), Pop, Halt
        assert_eq!(instrs[0], Instruction::GetState(0));
        assert!(matches!(instrs[1], Instruction::JumpIfFalse(2)));
        assert_eq!(instrs[2], Instruction::PushInt(1));
        assert!(matches!(instrs[3], Instruction::Jump(1)));
        assert_eq!(instrs[4], Instruction::PushInt(2));
        assert_eq!(instrs[5], Instruction::Pop);
        assert_eq!(instrs[6], Instruction::Halt);
    }

    #[test]
    fn unknown_function_call_is_an_error() {
        let mut ir = Ir::empty();
        let function_id = 0;
        let name_index = ir.strings.intern("h");
        let lang = ir.strings.intern(kryon_ir::EMBEDDED_BYTECODE_LANGUAGE);
        ir.functions.push(Function { function_id, name_index, language_tag_index: lang, param_indices: vec![], code_index: 0, instructions: vec![] });
        let callee = ir.strings.intern("doesNotExist");
        ir.handler_sources.insert(function_id, vec![IrStmt::Expr(Expression::FunctionCall(callee, vec![]))]);
        assert!(compile_functions(&mut ir).is_err());
    }
}
