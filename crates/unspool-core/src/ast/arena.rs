//! Arena for AST nodes, with canonicalizing constructors.

use std::collections::HashMap;

use crate::entity::PrimaryMap;
use crate::ir::{InstId, ValueId};

use super::node::{BinOp, Expr, ExprId, LoopPosition, Stmt, StmtId, UnaryOp};

/// Owns every expression and statement built during one module-level run.
///
/// Ids are stable until [`clear`](AstArena::clear). `Value` expressions are
/// memoized per function so that the same predicate value always yields the
/// same `ExprId`; condition simplification depends on that identity.
#[derive(Default)]
pub struct AstArena {
    exprs: PrimaryMap<ExprId, Expr>,
    stmts: PrimaryMap<StmtId, Stmt>,
    value_memo: HashMap<ValueId, ExprId>,
    break_stmt: Option<StmtId>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every node. All previously handed out ids become invalid.
    pub fn clear(&mut self) {
        self.exprs.clear();
        self.stmts.clear();
        self.value_memo.clear();
        self.break_stmt = None;
    }

    /// Reset per-function state (the value memo table). Value ids are only
    /// unique within one function.
    pub fn begin_function(&mut self) {
        self.value_memo.clear();
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    /// The canonical expression for an IR value. Memoized: the same value
    /// returns the same id for the duration of a function.
    pub fn value(&mut self, v: ValueId) -> ExprId {
        if let Some(&id) = self.value_memo.get(&v) {
            return id;
        }
        let id = self.exprs.push(Expr::Value(v));
        self.value_memo.insert(v, id);
        id
    }

    /// Logical negation. Unwraps an existing negation instead of stacking a
    /// second one, so `negate(negate(e)) == e` by id.
    pub fn negate(&mut self, e: ExprId) -> ExprId {
        if let Expr::Unary(UnaryOp::LogicalNot, inner) = self.exprs[e] {
            return inner;
        }
        self.exprs.push(Expr::Unary(UnaryOp::LogicalNot, e))
    }

    pub fn binary(&mut self, op: BinOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.exprs.push(Expr::Binary(op, lhs, rhs))
    }

    /// Combine two optional operands under `op`, without introducing
    /// needless nesting: if either side is absent the other is returned.
    pub fn coalesce(
        &mut self,
        op: BinOp,
        lhs: Option<ExprId>,
        rhs: Option<ExprId>,
    ) -> Option<ExprId> {
        match (lhs, rhs) {
            (None, rhs) => rhs,
            (lhs, None) => lhs,
            (Some(l), Some(r)) => Some(self.binary(op, l, r)),
        }
    }

    /// Strip at most one negation layer: `(operand, was_negated)`.
    pub fn strip_negation(&self, e: ExprId) -> (ExprId, bool) {
        match self.exprs[e] {
            Expr::Unary(UnaryOp::LogicalNot, inner) => (inner, true),
            _ => (e, false),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }

    pub fn stmt_mut(&mut self, id: StmtId) -> &mut Stmt {
        &mut self.stmts[id]
    }

    pub fn sequence(&mut self, children: Vec<StmtId>) -> StmtId {
        self.stmts.push(Stmt::Sequence(children))
    }

    pub fn if_else(&mut self, cond: ExprId, then_body: StmtId, else_body: Option<StmtId>) -> StmtId {
        self.stmts.push(Stmt::IfElse {
            cond,
            then_body,
            else_body,
        })
    }

    pub fn endless_loop(&mut self, body: StmtId) -> StmtId {
        self.stmts.push(Stmt::Loop {
            body,
            cond: None,
            position: LoopPosition::Endless,
        })
    }

    pub fn inst_stmt(&mut self, inst: InstId) -> StmtId {
        self.stmts.push(Stmt::Expr(inst))
    }

    /// The per-run `break` singleton, allocated on first use.
    pub fn break_stmt(&mut self) -> StmtId {
        match self.break_stmt {
            Some(id) => id,
            None => {
                let id = self.stmts.push(Stmt::Break);
                self.break_stmt = Some(id);
                id
            }
        }
    }

    /// Append a child to an existing `Sequence`.
    ///
    /// # Panics
    /// Panics if `seq` is not a `Sequence`.
    pub fn push_to_sequence(&mut self, seq: StmtId, child: StmtId) {
        match &mut self.stmts[seq] {
            Stmt::Sequence(children) => children.push(child),
            other => panic!("expected a sequence, found {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn value_expressions_are_memoized() {
        let mut arena = AstArena::new();
        let v = ValueId::new(3);
        let a = arena.value(v);
        let b = arena.value(v);
        assert_eq!(a, b);

        arena.begin_function();
        let c = arena.value(v);
        assert_ne!(a, c);
    }

    #[test]
    fn double_negation_folds_to_identity() {
        let mut arena = AstArena::new();
        let e = arena.value(ValueId::new(0));
        let not_e = arena.negate(e);
        assert_ne!(e, not_e);
        assert_eq!(arena.negate(not_e), e);
        assert_eq!(arena.strip_negation(not_e), (e, true));
        assert_eq!(arena.strip_negation(e), (e, false));
    }

    #[test]
    fn coalesce_skips_absent_operands() {
        let mut arena = AstArena::new();
        let a = arena.value(ValueId::new(0));
        let b = arena.value(ValueId::new(1));

        assert_eq!(arena.coalesce(BinOp::LogicalOr, None, None), None);
        assert_eq!(arena.coalesce(BinOp::LogicalOr, Some(a), None), Some(a));
        assert_eq!(arena.coalesce(BinOp::LogicalOr, None, Some(b)), Some(b));

        let both = arena.coalesce(BinOp::LogicalAnd, Some(a), Some(b)).unwrap();
        assert_eq!(*arena.expr(both), Expr::Binary(BinOp::LogicalAnd, a, b));
    }

    #[test]
    fn break_is_a_singleton_until_clear() {
        let mut arena = AstArena::new();
        let a = arena.break_stmt();
        let b = arena.break_stmt();
        assert_eq!(a, b);
        assert!(matches!(arena.stmt(a), Stmt::Break));

        arena.clear();
        let c = arena.break_stmt();
        assert!(matches!(arena.stmt(c), Stmt::Break));
    }
}
