//! Bottom-up AST cleanup applied after each region is structured.
//!
//! Four rewrites: nested sequences are flattened, `if (!c) a else b` is
//! rotated to `if (c) b else a`, `if (a) if (b) X` collapses to
//! `if (a && b) X`, and an endless loop ending in `if (c) break` becomes a
//! do-while. Each is a fixed point: running the simplifier twice yields the
//! same tree.

use super::arena::AstArena;
use super::node::{BinOp, Expr, LoopPosition, Stmt, StmtId, UnaryOp};

/// Simplify a statement tree. Returns the id of the simplified statement,
/// which may differ from the input (a one-element sequence collapses to its
/// element).
pub fn simplify_statement(arena: &mut AstArena, stmt: StmtId) -> StmtId {
    match arena.stmt(stmt) {
        Stmt::Sequence(_) => simplify_sequence(arena, stmt),
        Stmt::IfElse { .. } => simplify_if_else(arena, stmt),
        Stmt::Loop { .. } => simplify_loop(arena, stmt),
        Stmt::Break | Stmt::Expr(_) => stmt,
    }
}

fn simplify_sequence(arena: &mut AstArena, stmt: StmtId) -> StmtId {
    let children = match arena.stmt(stmt) {
        Stmt::Sequence(children) => children.clone(),
        _ => unreachable!(),
    };

    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        let child = simplify_statement(arena, child);
        match arena.stmt(child) {
            // Simplified children with multiple statements are inlined;
            // empty ones vanish.
            Stmt::Sequence(inner) => flat.extend(inner.iter().copied()),
            _ => flat.push(child),
        }
    }

    if flat.len() == 1 {
        return flat[0];
    }
    *arena.stmt_mut(stmt) = Stmt::Sequence(flat);
    stmt
}

fn simplify_if_else(arena: &mut AstArena, stmt: StmtId) -> StmtId {
    let (mut cond, mut then_body, mut else_body) = match *arena.stmt(stmt) {
        Stmt::IfElse {
            cond,
            then_body,
            else_body,
        } => (cond, then_body, else_body),
        _ => unreachable!(),
    };

    // Rotate `if (!c) a else b` into `if (c) b else a`.
    while let (Expr::Unary(UnaryOp::LogicalNot, inner), Some(else_stmt)) =
        (*arena.expr(cond), else_body)
    {
        cond = inner;
        else_body = Some(then_body);
        then_body = else_stmt;
    }

    then_body = simplify_statement(arena, then_body);
    else_body = else_body.map(|e| simplify_statement(arena, e));

    // An emptied else branch is no else branch.
    if let Some(e) = else_body {
        if matches!(arena.stmt(e), Stmt::Sequence(children) if children.is_empty()) {
            else_body = None;
        }
    }

    // `if (a) { if (b) X }` → `if (a && b) X`, single-leg ifs only.
    if else_body.is_none() {
        if let Stmt::IfElse {
            cond: inner_cond,
            then_body: inner_then,
            else_body: None,
        } = *arena.stmt(then_body)
        {
            cond = arena.binary(BinOp::LogicalAnd, cond, inner_cond);
            then_body = inner_then;
        }
    }

    *arena.stmt_mut(stmt) = Stmt::IfElse {
        cond,
        then_body,
        else_body,
    };
    stmt
}

fn simplify_loop(arena: &mut AstArena, stmt: StmtId) -> StmtId {
    let (body, mut cond, mut position) = match *arena.stmt(stmt) {
        Stmt::Loop {
            body,
            cond,
            position,
        } => (body, cond, position),
        _ => unreachable!(),
    };

    let mut body = simplify_statement(arena, body);

    // `while (true) { …; if (c) break; }` → `do { … } while (!c)`.
    if position == LoopPosition::Endless {
        if let Some((rest, break_cond)) = match_trailing_break(arena, body) {
            body = rest;
            cond = Some(arena.negate(break_cond));
            position = LoopPosition::PostTested;
        }
    }

    *arena.stmt_mut(stmt) = Stmt::Loop {
        body,
        cond,
        position,
    };
    stmt
}

/// If `body` is a sequence whose last statement is `if (c) break` (no else),
/// return the sequence without it and the break condition.
fn match_trailing_break(arena: &mut AstArena, body: StmtId) -> Option<(StmtId, super::node::ExprId)> {
    let children = match arena.stmt(body) {
        Stmt::Sequence(children) => children,
        _ => return None,
    };
    let &last = children.last()?;
    let break_cond = match *arena.stmt(last) {
        Stmt::IfElse {
            cond,
            then_body,
            else_body: None,
        } if matches!(arena.stmt(then_body), Stmt::Break) => cond,
        _ => return None,
    };

    let mut rest = children.clone();
    rest.pop();
    let rest_id = if rest.len() == 1 {
        rest[0]
    } else {
        *arena.stmt_mut(body) = Stmt::Sequence(rest);
        body
    };
    Some((rest_id, break_cond))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;
    use crate::ir::{InstId, ValueId};

    fn inst(arena: &mut AstArena, n: u32) -> StmtId {
        arena.inst_stmt(InstId::new(n))
    }

    #[test]
    fn nested_sequences_flatten() {
        let mut arena = AstArena::new();
        let a = inst(&mut arena, 0);
        let b = inst(&mut arena, 1);
        let c = inst(&mut arena, 2);
        let inner = arena.sequence(vec![b, c]);
        let empty = arena.sequence(vec![]);
        let outer = arena.sequence(vec![a, inner, empty]);

        let result = simplify_statement(&mut arena, outer);
        assert_eq!(*arena.stmt(result), Stmt::Sequence(vec![a, b, c]));
    }

    #[test]
    fn one_element_sequence_collapses() {
        let mut arena = AstArena::new();
        let a = inst(&mut arena, 0);
        let seq = arena.sequence(vec![a]);
        assert_eq!(simplify_statement(&mut arena, seq), a);
    }

    #[test]
    fn negated_if_with_else_rotates() {
        let mut arena = AstArena::new();
        let c = arena.value(ValueId::new(0));
        let not_c = arena.negate(c);
        let a = inst(&mut arena, 0);
        let b = inst(&mut arena, 1);
        let stmt = arena.if_else(not_c, a, Some(b));

        let result = simplify_statement(&mut arena, stmt);
        assert_eq!(
            *arena.stmt(result),
            Stmt::IfElse {
                cond: c,
                then_body: b,
                else_body: Some(a),
            }
        );
    }

    #[test]
    fn negated_if_without_else_stays() {
        let mut arena = AstArena::new();
        let c = arena.value(ValueId::new(0));
        let not_c = arena.negate(c);
        let a = inst(&mut arena, 0);
        let stmt = arena.if_else(not_c, a, None);

        let result = simplify_statement(&mut arena, stmt);
        assert_eq!(
            *arena.stmt(result),
            Stmt::IfElse {
                cond: not_c,
                then_body: a,
                else_body: None,
            }
        );
    }

    #[test]
    fn single_leg_if_chain_merges_into_and() {
        let mut arena = AstArena::new();
        let a = arena.value(ValueId::new(0));
        let b = arena.value(ValueId::new(1));
        let body = inst(&mut arena, 0);
        let inner = arena.if_else(b, body, None);
        let inner_seq = arena.sequence(vec![inner]);
        let outer = arena.if_else(a, inner_seq, None);

        let result = simplify_statement(&mut arena, outer);
        match *arena.stmt(result) {
            Stmt::IfElse {
                cond,
                then_body,
                else_body: None,
            } => {
                assert_eq!(*arena.expr(cond), Expr::Binary(BinOp::LogicalAnd, a, b));
                assert_eq!(then_body, body);
            }
            ref other => panic!("expected folded if, got {other:?}"),
        }
    }

    #[test]
    fn endless_loop_with_trailing_break_becomes_do_while() {
        let mut arena = AstArena::new();
        let c = arena.value(ValueId::new(0));
        let work = inst(&mut arena, 0);
        let brk = arena.break_stmt();
        let guard = arena.if_else(c, brk, None);
        let body = arena.sequence(vec![work, guard]);
        let lp = arena.endless_loop(body);

        let result = simplify_statement(&mut arena, lp);
        match *arena.stmt(result) {
            Stmt::Loop {
                body,
                cond: Some(cond),
                position: LoopPosition::PostTested,
            } => {
                assert_eq!(body, work);
                // do { … } while (!c)
                assert_eq!(*arena.expr(cond), Expr::Unary(UnaryOp::LogicalNot, c));
            }
            ref other => panic!("expected do-while, got {other:?}"),
        }
    }

    #[test]
    fn endless_loop_without_break_stays_endless() {
        let mut arena = AstArena::new();
        let a = inst(&mut arena, 0);
        let b = inst(&mut arena, 1);
        let body = arena.sequence(vec![a, b]);
        let lp = arena.endless_loop(body);

        let result = simplify_statement(&mut arena, lp);
        assert!(matches!(
            *arena.stmt(result),
            Stmt::Loop {
                cond: None,
                position: LoopPosition::Endless,
                ..
            }
        ));
    }

    #[test]
    fn simplification_is_idempotent() {
        let mut arena = AstArena::new();
        let c = arena.value(ValueId::new(0));
        let work = inst(&mut arena, 0);
        let extra = inst(&mut arena, 1);
        let brk = arena.break_stmt();
        let guard = arena.if_else(c, brk, None);
        let body = arena.sequence(vec![work, extra, guard]);
        let lp = arena.endless_loop(body);
        let wrapper = arena.sequence(vec![lp]);

        let once = simplify_statement(&mut arena, wrapper);
        let snapshot = format!("{:?}", arena.stmt(once));
        let twice = simplify_statement(&mut arena, once);
        assert_eq!(once, twice);
        assert_eq!(snapshot, format!("{:?}", arena.stmt(twice)));
    }
}
