//! C-like rendering of structured ASTs.

use std::fmt::Write;

use crate::entity::EntityRef;
use crate::ir::{CmpKind, Constant, Function, InstId, Op, ValueId};

use super::arena::AstArena;
use super::node::{BinOp, Expr, ExprId, LoopPosition, Stmt, StmtId, UnaryOp};

/// Walks an AST and emits pseudo-C. Conditions go through the expression
/// printer, which parenthesizes binary operators; statement-position
/// instructions are rendered from the IR.
pub struct AstPrinter<'a> {
    arena: &'a AstArena,
    func: &'a Function,
}

impl<'a> AstPrinter<'a> {
    pub fn new(arena: &'a AstArena, func: &'a Function) -> Self {
        Self { arena, func }
    }

    pub fn print(&self, root: StmtId) -> String {
        self.print_indented(root, 0)
    }

    pub fn print_indented(&self, root: StmtId, level: usize) -> String {
        let mut out = String::new();
        self.write_stmt(&mut out, root, level);
        out
    }

    fn write_stmt(&self, out: &mut String, stmt: StmtId, level: usize) {
        let pad = "    ".repeat(level);
        match self.arena.stmt(stmt) {
            Stmt::Sequence(children) => {
                for &child in children {
                    self.write_stmt(out, child, level);
                }
            }
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                let _ = writeln!(out, "{pad}if ({}) {{", self.expr_string(*cond));
                self.write_stmt(out, *then_body, level + 1);
                match else_body {
                    Some(else_body) => {
                        let _ = writeln!(out, "{pad}}} else {{");
                        self.write_stmt(out, *else_body, level + 1);
                        let _ = writeln!(out, "{pad}}}");
                    }
                    None => {
                        let _ = writeln!(out, "{pad}}}");
                    }
                }
            }
            Stmt::Loop {
                body,
                cond,
                position,
            } => match position {
                LoopPosition::Endless => {
                    let _ = writeln!(out, "{pad}while (true) {{");
                    self.write_stmt(out, *body, level + 1);
                    let _ = writeln!(out, "{pad}}}");
                }
                LoopPosition::PreTested => {
                    let cond = cond.expect("pre-tested loop without a condition");
                    let _ = writeln!(out, "{pad}while ({}) {{", self.expr_string(cond));
                    self.write_stmt(out, *body, level + 1);
                    let _ = writeln!(out, "{pad}}}");
                }
                LoopPosition::PostTested => {
                    let cond = cond.expect("post-tested loop without a condition");
                    let _ = writeln!(out, "{pad}do {{");
                    self.write_stmt(out, *body, level + 1);
                    let _ = writeln!(out, "{pad}}} while ({});", self.expr_string(cond));
                }
            },
            Stmt::Break => {
                let _ = writeln!(out, "{pad}break;");
            }
            Stmt::Expr(inst) => {
                let _ = writeln!(out, "{pad}{};", self.inst_string(*inst));
            }
        }
    }

    fn expr_string(&self, expr: ExprId) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, expr);
        out
    }

    fn write_expr(&self, out: &mut String, expr: ExprId) {
        match *self.arena.expr(expr) {
            Expr::Value(v) => out.push_str(&self.value_string(v)),
            Expr::Unary(UnaryOp::LogicalNot, inner) => {
                out.push('!');
                self.write_expr(out, inner);
            }
            Expr::Binary(op, lhs, rhs) => {
                out.push('(');
                self.write_expr(out, lhs);
                out.push_str(match op {
                    BinOp::LogicalAnd => " && ",
                    BinOp::LogicalOr => " || ",
                });
                self.write_expr(out, rhs);
                out.push(')');
            }
        }
    }

    fn value_string(&self, v: ValueId) -> String {
        match self.func.value_names.get(&v) {
            Some(name) => name.clone(),
            None => format!("v{}", v.index()),
        }
    }

    fn inst_string(&self, inst_id: InstId) -> String {
        let inst = &self.func.insts[inst_id];
        let rhs = match &inst.op {
            Op::Const(c) => match c {
                Constant::Bool(b) => b.to_string(),
                Constant::Int(n) => n.to_string(),
                Constant::Float(v) => v.to_string(),
                Constant::String(s) => format!("{s:?}"),
            },
            Op::Add(a, b) => format!("{} + {}", self.value_string(*a), self.value_string(*b)),
            Op::Sub(a, b) => format!("{} - {}", self.value_string(*a), self.value_string(*b)),
            Op::Mul(a, b) => format!("{} * {}", self.value_string(*a), self.value_string(*b)),
            Op::Div(a, b) => format!("{} / {}", self.value_string(*a), self.value_string(*b)),
            Op::Cmp(kind, a, b) => {
                let op = match kind {
                    CmpKind::Eq => "==",
                    CmpKind::Ne => "!=",
                    CmpKind::Lt => "<",
                    CmpKind::Le => "<=",
                    CmpKind::Gt => ">",
                    CmpKind::Ge => ">=",
                };
                format!("{} {op} {}", self.value_string(*a), self.value_string(*b))
            }
            Op::Not(a) => format!("!{}", self.value_string(*a)),
            Op::Load(ptr) => format!("*{}", self.value_string(*ptr)),
            Op::Store { ptr, value } => {
                return format!("*{} = {}", self.value_string(*ptr), self.value_string(*value));
            }
            Op::Call { func, args } => {
                let args: Vec<String> = args.iter().map(|&a| self.value_string(a)).collect();
                format!("{func}({})", args.join(", "))
            }
            Op::Return(value) => {
                return match value {
                    Some(v) => format!("return {}", self.value_string(*v)),
                    None => "return".to_string(),
                };
            }
            // Branches never appear in statement position.
            Op::Br { .. } | Op::BrIf { .. } | Op::Switch { .. } => {
                unreachable!("branch instruction in statement position")
            }
        };
        match inst.result {
            Some(result) => format!("{} = {rhs}", self.value_string(result)),
            None => rhs,
        }
    }
}
