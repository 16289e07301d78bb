//! Human-readable dump of the IR, one block per label.

use std::fmt;

use crate::entity::EntityRef;

use super::func::Function;
use super::inst::{CmpKind, Op};
use super::module::Module;
use super::ty::Type;
use super::value::{Constant, ValueId};

fn fmt_type(ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty {
        Type::Void => write!(f, "void"),
        Type::Bool => write!(f, "bool"),
        Type::Int(bits) => write!(f, "i{bits}"),
        Type::Float(bits) => write!(f, "f{bits}"),
        Type::String => write!(f, "string"),
    }
}

fn fmt_value(func: &Function, v: ValueId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match func.value_names.get(&v) {
        Some(name) => write!(f, "{name}"),
        None => write!(f, "v{}", v.index()),
    }
}

fn fmt_value_list(func: &Function, values: &[ValueId], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, &v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        fmt_value(func, v, f)?;
    }
    Ok(())
}

fn fmt_constant(c: &Constant, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match c {
        Constant::Bool(b) => write!(f, "{b}"),
        Constant::Int(n) => write!(f, "{n}"),
        Constant::Float(v) => {
            if v.fract() == 0.0 && v.is_finite() {
                write!(f, "{v:.1}")
            } else {
                write!(f, "{v}")
            }
        }
        Constant::String(s) => write!(f, "{s:?}"),
    }
}

fn fmt_cmp_kind(kind: CmpKind, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match kind {
        CmpKind::Eq => write!(f, "eq"),
        CmpKind::Ne => write!(f, "ne"),
        CmpKind::Lt => write!(f, "lt"),
        CmpKind::Le => write!(f, "le"),
        CmpKind::Gt => write!(f, "gt"),
        CmpKind::Ge => write!(f, "ge"),
    }
}

fn fmt_op(func: &Function, op: &Op, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match op {
        Op::Const(c) => {
            write!(f, "const ")?;
            fmt_constant(c, f)
        }
        Op::Add(a, b) => {
            write!(f, "add ")?;
            fmt_value_list(func, &[*a, *b], f)
        }
        Op::Sub(a, b) => {
            write!(f, "sub ")?;
            fmt_value_list(func, &[*a, *b], f)
        }
        Op::Mul(a, b) => {
            write!(f, "mul ")?;
            fmt_value_list(func, &[*a, *b], f)
        }
        Op::Div(a, b) => {
            write!(f, "div ")?;
            fmt_value_list(func, &[*a, *b], f)
        }
        Op::Cmp(kind, a, b) => {
            write!(f, "cmp.")?;
            fmt_cmp_kind(*kind, f)?;
            write!(f, " ")?;
            fmt_value_list(func, &[*a, *b], f)
        }
        Op::Not(a) => {
            write!(f, "not ")?;
            fmt_value(func, *a, f)
        }
        Op::Load(ptr) => {
            write!(f, "load ")?;
            fmt_value(func, *ptr, f)
        }
        Op::Store { ptr, value } => {
            write!(f, "store ")?;
            fmt_value(func, *ptr, f)?;
            write!(f, ", ")?;
            fmt_value(func, *value, f)
        }
        Op::Call { func: callee, args } => {
            write!(f, "call {callee}(")?;
            fmt_value_list(func, args, f)?;
            write!(f, ")")
        }
        Op::Br { target } => write!(f, "br block{}", target.index()),
        Op::BrIf {
            cond,
            then_target,
            else_target,
        } => {
            write!(f, "br_if ")?;
            fmt_value(func, *cond, f)?;
            write!(
                f,
                ", block{}, block{}",
                then_target.index(),
                else_target.index()
            )
        }
        Op::Switch {
            value,
            cases,
            default,
        } => {
            write!(f, "switch ")?;
            fmt_value(func, *value, f)?;
            for (c, target) in cases {
                write!(f, ", ")?;
                fmt_constant(c, f)?;
                write!(f, " -> block{}", target.index())?;
            }
            write!(f, ", default -> block{}", default.index())
        }
        Op::Return(value) => {
            write!(f, "return")?;
            if let Some(v) = value {
                write!(f, " ")?;
                fmt_value(func, *v, f)?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, ty) in self.sig.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "v{i}: ")?;
            fmt_type(ty, f)?;
        }
        write!(f, ") -> ")?;
        fmt_type(&self.sig.return_ty, f)?;
        writeln!(f, " {{")?;

        for (block_id, block) in self.blocks.iter() {
            writeln!(f, "block{}:", block_id.index())?;
            for &inst_id in &block.insts {
                let inst = &self.insts[inst_id];
                write!(f, "  ")?;
                if let Some(result) = inst.result {
                    fmt_value(self, result, f)?;
                    write!(f, " = ")?;
                }
                fmt_op(self, &inst.op, f)?;
                writeln!(f)?;
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {}", self.name)?;
        for func in self.functions.values() {
            writeln!(f)?;
            write!(f, "{func}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{CmpKind, FunctionBuilder, FunctionSig, Type};

    #[test]
    fn function_display_lists_blocks_and_insts() {
        let sig = FunctionSig {
            params: vec![Type::Int(64)],
            return_ty: Type::Bool,
        };
        let mut fb = FunctionBuilder::new("is_small", sig);
        let x = fb.param(0);
        fb.name_value(x, "x");
        let exit = fb.create_block();

        let ten = fb.const_int(10);
        let cond = fb.cmp(CmpKind::Lt, x, ten);
        fb.br(exit);
        fb.switch_to_block(exit);
        fb.ret(Some(cond));

        let func = fb.build();
        let text = format!("{func}");

        assert!(text.starts_with("fn is_small(v0: i64) -> bool {"));
        assert!(text.contains("block0:"));
        assert!(text.contains("block1:"));
        assert!(text.contains("= const 10"));
        assert!(text.contains("cmp.lt x, "));
        assert!(text.contains("br block1"));
        assert!(text.contains("return "));
    }
}
