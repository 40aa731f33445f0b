//! Tag-byte encodings for every value shared across the element tree, style
//! table, theme table, state table and script section: [`Value`],
//! [`Expression`], [`Instruction`], and the small closed enums they embed
//! (`BinOp`, `UnOp`, `Unit`, `EventKind`, `StateType`, `ThemeValueType`).

use kryon_ir::{
    BinOp, EventKind, Expression, Instruction, StateType, TemplateSegment, ThemeValueType, Unit, UnOp, Value,
};

use crate::cursor::{Reader, Writer};
use crate::error::BinaryError;

const VAL_STRING: u8 = 0x01;
const VAL_INT: u8 = 0x02;
const VAL_FLOAT: u8 = 0x03;
const VAL_BOOL: u8 = 0x04;
const VAL_NULL: u8 = 0x05;
const VAL_COLOR: u8 = 0x06;
const VAL_UNIT: u8 = 0x07;
const VAL_ARRAY: u8 = 0x08;
const VAL_OBJECT: u8 = 0x09;

pub fn encode_value(w: &mut Writer, value: &Value) {
    match value {
        Value::String(idx) => {
            w.u8(VAL_STRING);
            w.u32(*idx);
        }
        Value::Int(i) => {
            w.u8(VAL_INT);
            w.i64(*i);
        }
        Value::Float(f) => {
            w.u8(VAL_FLOAT);
            w.f64(*f);
        }
        Value::Bool(b) => {
            w.u8(VAL_BOOL);
            w.bool(*b);
        }
        Value::Null => w.u8(VAL_NULL),
        Value::Color(r, g, b, a) => {
            w.u8(VAL_COLOR);
            w.u8(*r);
            w.u8(*g);
            w.u8(*b);
            w.u8(*a);
        }
        Value::Unit(v, unit) => {
            w.u8(VAL_UNIT);
            w.f64(*v);
            w.u8(unit_code(*unit));
        }
        Value::Array(items) => {
            w.u8(VAL_ARRAY);
            w.u32(items.len() as u32);
            for item in items {
                encode_value(w, item);
            }
        }
        Value::Object(fields) => {
            w.u8(VAL_OBJECT);
            w.u32(fields.len() as u32);
            for (k, v) in fields {
                w.u32(*k);
                encode_value(w, v);
            }
        }
    }
}

pub fn decode_value(r: &mut Reader) -> Result<Value, BinaryError> {
    let tag = r.u8()?;
    Ok(match tag {
        VAL_STRING => Value::String(r.u32()?),
        VAL_INT => Value::Int(r.i64()?),
        VAL_FLOAT => Value::Float(r.f64()?),
        VAL_BOOL => Value::Bool(r.bool()?),
        VAL_NULL => Value::Null,
        VAL_COLOR => Value::Color(r.u8()?, r.u8()?, r.u8()?, r.u8()?),
        VAL_UNIT => {
            let v = r.f64()?;
            let unit = unit_from_code(r.u8()?)?;
            Value::Unit(v, unit)
        }
        VAL_ARRAY => {
            let count = r.u32()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(decode_value(r)?);
            }
            Value::Array(items)
        }
        VAL_OBJECT => {
            let count = r.u32()?;
            let mut fields = indexmap::IndexMap::with_capacity(count as usize);
            for _ in 0..count {
                let k = r.u32()?;
                fields.insert(k, decode_value(r)?);
            }
            Value::Object(fields)
        }
        other => return Err(BinaryError::new(r.position() - 1, format!("unknown value tag {other:#04x}"))),
    })
}

const EXPR_LITERAL: u8 = 0x01;
const EXPR_VAR_REF: u8 = 0x02;
const EXPR_MEMBER_ACCESS: u8 = 0x03;
const EXPR_ARRAY_ACCESS: u8 = 0x04;
const EXPR_BINARY_OP: u8 = 0x05;
const EXPR_UNARY_OP: u8 = 0x06;
const EXPR_TERNARY: u8 = 0x07;
const EXPR_FUNCTION_CALL: u8 = 0x08;
const EXPR_TEMPLATE: u8 = 0x09;
const EXPR_ARRAY_LIT: u8 = 0x0A;
const EXPR_OBJECT_LIT: u8 = 0x0B;

const TEMPLATE_SEGMENT_LITERAL: u8 = 0x00;
const TEMPLATE_SEGMENT_EXPR: u8 = 0x01;

pub fn encode_expression(w: &mut Writer, expr: &Expression) {
    match expr {
        Expression::Literal(v) => {
            w.u8(EXPR_LITERAL);
            encode_value(w, v);
        }
        Expression::VarRef(idx) => {
            w.u8(EXPR_VAR_REF);
            w.u32(*idx);
        }
        Expression::MemberAccess(base, name) => {
            w.u8(EXPR_MEMBER_ACCESS);
            encode_expression(w, base);
            w.u32(*name);
        }
        Expression::ArrayAccess(base, index) => {
            w.u8(EXPR_ARRAY_ACCESS);
            encode_expression(w, base);
            encode_expression(w, index);
        }
        Expression::BinaryOp(op, lhs, rhs) => {
            w.u8(EXPR_BINARY_OP);
            w.u8(binop_code(*op));
            encode_expression(w, lhs);
            encode_expression(w, rhs);
        }
        Expression::UnaryOp(op, inner) => {
            w.u8(EXPR_UNARY_OP);
            w.u8(unop_code(*op));
            encode_expression(w, inner);
        }
        Expression::Ternary(cond, then, else_) => {
            w.u8(EXPR_TERNARY);
            encode_expression(w, cond);
            encode_expression(w, then);
            encode_expression(w, else_);
        }
        Expression::FunctionCall(name, args) => {
            w.u8(EXPR_FUNCTION_CALL);
            w.u32(*name);
            w.u32(args.len() as u32);
            for arg in args {
                encode_expression(w, arg);
            }
        }
        Expression::Template(segments) => {
            w.u8(EXPR_TEMPLATE);
            w.u32(segments.len() as u32);
            for seg in segments {
                match seg {
                    TemplateSegment::Literal(idx) => {
                        w.u8(TEMPLATE_SEGMENT_LITERAL);
                        w.u32(*idx);
                    }
                    TemplateSegment::Expr(e) => {
                        w.u8(TEMPLATE_SEGMENT_EXPR);
                        encode_expression(w, e);
                    }
                }
            }
        }
        Expression::ArrayLit(items) => {
            w.u8(EXPR_ARRAY_LIT);
            w.u32(items.len() as u32);
            for item in items {
                encode_expression(w, item);
            }
        }
        Expression::ObjectLit(fields) => {
            w.u8(EXPR_OBJECT_LIT);
            w.u32(fields.len() as u32);
            for (name, value) in fields {
                w.u32(*name);
                encode_expression(w, value);
            }
        }
    }
}

pub fn decode_expression(r: &mut Reader) -> Result<Expression, BinaryError> {
    let tag = r.u8()?;
    Ok(match tag {
        EXPR_LITERAL => Expression::Literal(decode_value(r)?),
        EXPR_VAR_REF => Expression::VarRef(r.u32()?),
        EXPR_MEMBER_ACCESS => {
            let base = decode_expression(r)?;
            let name = r.u32()?;
            Expression::MemberAccess(Box::new(base), name)
        }
        EXPR_ARRAY_ACCESS => {
            let base = decode_expression(r)?;
            let index = decode_expression(r)?;
            Expression::ArrayAccess(Box::new(base), Box::new(index))
        }
        EXPR_BINARY_OP => {
            let op = binop_from_code(r.u8()?)?;
            let lhs = decode_expression(r)?;
            let rhs = decode_expression(r)?;
            Expression::BinaryOp(op, Box::new(lhs), Box::new(rhs))
        }
        EXPR_UNARY_OP => {
            let op = unop_from_code(r.u8()?)?;
            let inner = decode_expression(r)?;
            Expression::UnaryOp(op, Box::new(inner))
        }
        EXPR_TERNARY => {
            let cond = decode_expression(r)?;
            let then = decode_expression(r)?;
            let else_ = decode_expression(r)?;
            Expression::Ternary(Box::new(cond), Box::new(then), Box::new(else_))
        }
        EXPR_FUNCTION_CALL => {
            let name = r.u32()?;
            let count = r.u32()?;
            let mut args = Vec::with_capacity(count as usize);
            for _ in 0..count {
                args.push(decode_expression(r)?);
            }
            Expression::FunctionCall(name, args)
        }
        EXPR_TEMPLATE => {
            let count = r.u32()?;
            let mut segments = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let seg_tag = r.u8()?;
                segments.push(match seg_tag {
                    TEMPLATE_SEGMENT_LITERAL => TemplateSegment::Literal(r.u32()?),
                    TEMPLATE_SEGMENT_EXPR => TemplateSegment::Expr(decode_expression(r)?),
                    other => return Err(BinaryError::new(r.position() - 1, format!("unknown template segment tag {other:#04x}"))),
                });
            }
            Expression::Template(segments)
        }
        EXPR_ARRAY_LIT => {
            let count = r.u32()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(decode_expression(r)?);
            }
            Expression::ArrayLit(items)
        }
        EXPR_OBJECT_LIT => {
            let count = r.u32()?;
            let mut fields = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let name = r.u32()?;
                fields.push((name, decode_expression(r)?));
            }
            Expression::ObjectLit(fields)
        }
        other => return Err(BinaryError::new(r.position() - 1, format!("unknown expression tag {other:#04x}"))),
    })
}

fn binop_code(op: BinOp) -> u8 {
    use BinOp::*;
    match op {
        Add => 0,
        Sub => 1,
        Mul => 2,
        Div => 3,
        Mod => 4,
        Eq => 5,
        Ne => 6,
        Lt => 7,
        Gt => 8,
        Le => 9,
        Ge => 10,
        And => 11,
        Or => 12,
    }
}

fn binop_from_code(code: u8) -> Result<BinOp, BinaryError> {
    use BinOp::*;
    Ok(match code {
        0 => Add,
        1 => Sub,
        2 => Mul,
        3 => Div,
        4 => Mod,
        5 => Eq,
        6 => Ne,
        7 => Lt,
        8 => Gt,
        9 => Le,
        10 => Ge,
        11 => And,
        12 => Or,
        other => return Err(BinaryError::new(0, format!("unknown binop code {other}"))),
    })
}

fn unop_code(op: UnOp) -> u8 {
    match op {
        UnOp::Neg => 0,
        UnOp::Not => 1,
    }
}

fn unop_from_code(code: u8) -> Result<UnOp, BinaryError> {
    Ok(match code {
        0 => UnOp::Neg,
        1 => UnOp::Not,
        other => return Err(BinaryError::new(0, format!("unknown unop code {other}"))),
    })
}

pub fn unit_code(unit: Unit) -> u8 {
    match unit {
        Unit::Px => 0,
        Unit::Pct => 1,
        Unit::Em => 2,
        Unit::Rem => 3,
        Unit::Vw => 4,
        Unit::Vh => 5,
        Unit::Vmin => 6,
        Unit::Vmax => 7,
        Unit::None => 8,
    }
}

pub fn unit_from_code(code: u8) -> Result<Unit, BinaryError> {
    Ok(match code {
        0 => Unit::Px,
        1 => Unit::Pct,
        2 => Unit::Em,
        3 => Unit::Rem,
        4 => Unit::Vw,
        5 => Unit::Vh,
        6 => Unit::Vmin,
        7 => Unit::Vmax,
        8 => Unit::None,
        other => return Err(BinaryError::new(0, format!("unknown unit code {other}"))),
    })
}

pub fn event_kind_code(kind: EventKind) -> u8 {
    match kind {
        EventKind::Click => 0,
        EventKind::Change => 1,
        EventKind::Hover => 2,
        EventKind::Mount => 3,
        EventKind::Unmount => 4,
        EventKind::KeyDown => 5,
        EventKind::KeyUp => 6,
        EventKind::Focus => 7,
        EventKind::Blur => 8,
        EventKind::Submit => 9,
    }
}

pub fn event_kind_from_code(code: u8) -> Result<EventKind, BinaryError> {
    Ok(match code {
        0 => EventKind::Click,
        1 => EventKind::Change,
        2 => EventKind::Hover,
        3 => EventKind::Mount,
        4 => EventKind::Unmount,
        5 => EventKind::KeyDown,
        6 => EventKind::KeyUp,
        7 => EventKind::Focus,
        8 => EventKind::Blur,
        9 => EventKind::Submit,
        other => return Err(BinaryError::new(0, format!("unknown event kind code {other}"))),
    })
}

pub fn state_type_code(t: StateType) -> u8 {
    match t {
        StateType::Int => 0,
        StateType::Float => 1,
        StateType::String => 2,
        StateType::Bool => 3,
    }
}

pub fn state_type_from_code(code: u8) -> Result<StateType, BinaryError> {
    Ok(match code {
        0 => StateType::Int,
        1 => StateType::Float,
        2 => StateType::String,
        3 => StateType::Bool,
        other => return Err(BinaryError::new(0, format!("unknown state type code {other}"))),
    })
}

pub fn theme_value_type_code(t: &ThemeValueType) -> u8 {
    match t {
        ThemeValueType::Int => 0,
        ThemeValueType::Float => 1,
        ThemeValueType::String => 2,
        ThemeValueType::Bool => 3,
        ThemeValueType::Color => 4,
    }
}

pub fn theme_value_type_from_code(code: u8) -> Result<ThemeValueType, BinaryError> {
    Ok(match code {
        0 => ThemeValueType::Int,
        1 => ThemeValueType::Float,
        2 => ThemeValueType::String,
        3 => ThemeValueType::Bool,
        4 => ThemeValueType::Color,
        other => return Err(BinaryError::new(0, format!("unknown theme value type code {other}"))),
    })
}

const INS_PUSH_INT: u8 = 0x01;
const INS_PUSH_FLOAT: u8 = 0x02;
const INS_PUSH_STRING: u8 = 0x03;
const INS_PUSH_BOOL: u8 = 0x04;
const INS_POP: u8 = 0x05;
const INS_DUP: u8 = 0x06;
const INS_ADD: u8 = 0x07;
const INS_SUB: u8 = 0x08;
const INS_MUL: u8 = 0x09;
const INS_DIV: u8 = 0x0A;
const INS_MOD: u8 = 0x0B;
const INS_NEG: u8 = 0x0C;
const INS_EQ: u8 = 0x0D;
const INS_NE: u8 = 0x0E;
const INS_LT: u8 = 0x0F;
const INS_GT: u8 = 0x10;
const INS_LE: u8 = 0x11;
const INS_GE: u8 = 0x12;
const INS_AND: u8 = 0x13;
const INS_OR: u8 = 0x14;
const INS_NOT: u8 = 0x15;
const INS_CONCAT: u8 = 0x16;
const INS_GET_STATE: u8 = 0x17;
const INS_SET_STATE: u8 = 0x18;
const INS_GET_LOCAL: u8 = 0x19;
const INS_SET_LOCAL: u8 = 0x1A;
const INS_JUMP: u8 = 0x1B;
const INS_JUMP_IF_FALSE: u8 = 0x1C;
const INS_CALL: u8 = 0x1D;
const INS_RETURN: u8 = 0x1E;
const INS_CALL_HOST: u8 = 0x1F;
const INS_GET_PROP: u8 = 0x20;
const INS_SET_PROP: u8 = 0x21;
const INS_HALT: u8 = 0x22;

pub fn encode_instruction(w: &mut Writer, instr: &Instruction) {
    match instr {
        Instruction::PushInt(i) => {
            w.u8(INS_PUSH_INT);
            w.i64(*i);
        }
        Instruction::PushFloat(f) => {
            w.u8(INS_PUSH_FLOAT);
            w.f64(*f);
        }
        Instruction::PushString(s) => {
            w.u8(INS_PUSH_STRING);
            w.u32(*s);
        }
        Instruction::PushBool(b) => {
            w.u8(INS_PUSH_BOOL);
            w.bool(*b);
        }
        Instruction::Pop => w.u8(INS_POP),
        Instruction::Dup => w.u8(INS_DUP),
        Instruction::Add => w.u8(INS_ADD),
        Instruction::Sub => w.u8(INS_SUB),
        Instruction::Mul => w.u8(INS_MUL),
        Instruction::Div => w.u8(INS_DIV),
        Instruction::Mod => w.u8(INS_MOD),
        Instruction::Neg => w.u8(INS_NEG),
        Instruction::Eq => w.u8(INS_EQ),
        Instruction::Ne => w.u8(INS_NE),
        Instruction::Lt => w.u8(INS_LT),
        Instruction::Gt => w.u8(INS_GT),
        Instruction::Le => w.u8(INS_LE),
        Instruction::Ge => w.u8(INS_GE),
        Instruction::And => w.u8(INS_AND),
        Instruction::Or => w.u8(INS_OR),
        Instruction::Not => w.u8(INS_NOT),
        Instruction::Concat => w.u8(INS_CONCAT),
        Instruction::GetState(id) => {
            w.u8(INS_GET_STATE);
            w.u16(*id);
        }
        Instruction::SetState(id) => {
            w.u8(INS_SET_STATE);
            w.u16(*id);
        }
        Instruction::GetLocal(slot) => {
            w.u8(INS_GET_LOCAL);
            w.u16(*slot);
        }
        Instruction::SetLocal(slot) => {
            w.u8(INS_SET_LOCAL);
            w.u16(*slot);
        }
        Instruction::Jump(offset) => {
            w.u8(INS_JUMP);
            w.i32(*offset);
        }
        Instruction::JumpIfFalse(offset) => {
            w.u8(INS_JUMP_IF_FALSE);
            w.i32(*offset);
        }
        Instruction::Call(id) => {
            w.u8(INS_CALL);
            w.u32(*id);
        }
        Instruction::Return => w.u8(INS_RETURN),
        Instruction::CallHost(id) => {
            w.u8(INS_CALL_HOST);
            w.u32(*id);
        }
        Instruction::GetProp(obj, prop) => {
            w.u8(INS_GET_PROP);
            w.u32(*obj);
            w.u16(*prop);
        }
        Instruction::SetProp(obj, prop) => {
            w.u8(INS_SET_PROP);
            w.u32(*obj);
            w.u16(*prop);
        }
        Instruction::Halt => w.u8(INS_HALT),
    }
}

pub fn decode_instruction(r: &mut Reader) -> Result<Instruction, BinaryError> {
    let tag = r.u8()?;
    Ok(match tag {
        INS_PUSH_INT => Instruction::PushInt(r.i64()?),
        INS_PUSH_FLOAT => Instruction::PushFloat(r.f64()?),
        INS_PUSH_STRING => Instruction::PushString(r.u32()?),
        INS_PUSH_BOOL => Instruction::PushBool(r.bool()?),
        INS_POP => Instruction::Pop,
        INS_DUP => Instruction::Dup,
        INS_ADD => Instruction::Add,
        INS_SUB => Instruction::Sub,
        INS_MUL => Instruction::Mul,
        INS_DIV => Instruction::Div,
        INS_MOD => Instruction::Mod,
        INS_NEG => Instruction::Neg,
        INS_EQ => Instruction::Eq,
        INS_NE => Instruction::Ne,
        INS_LT => Instruction::Lt,
        INS_GT => Instruction::Gt,
        INS_LE => Instruction::Le,
        INS_GE => Instruction::Ge,
        INS_AND => Instruction::And,
        INS_OR => Instruction::Or,
        INS_NOT => Instruction::Not,
        INS_CONCAT => Instruction::Concat,
        INS_GET_STATE => Instruction::GetState(r.u16()?),
        INS_SET_STATE => Instruction::SetState(r.u16()?),
        INS_GET_LOCAL => Instruction::GetLocal(r.u16()?),
        INS_SET_LOCAL => Instruction::SetLocal(r.u16()?),
        INS_JUMP => Instruction::Jump(r.i32()?),
        INS_JUMP_IF_FALSE => Instruction::JumpIfFalse(r.i32()?),
        INS_CALL => Instruction::Call(r.u32()?),
        INS_RETURN => Instruction::Return,
        INS_CALL_HOST => Instruction::CallHost(r.u32()?),
        INS_GET_PROP => Instruction::GetProp(r.u32()?, r.u16()?),
        INS_SET_PROP => Instruction::SetProp(r.u32()?, r.u16()?),
        INS_HALT => Instruction::Halt,
        other => return Err(BinaryError::new(r.position() - 1, format!("unknown instruction opcode {other:#04x}"))),
    })
}
