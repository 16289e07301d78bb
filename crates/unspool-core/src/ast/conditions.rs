//! Reaching conditions: per-node boolean formulas over branch predicates.
//!
//! For a region `(entry, exit)` the builder walks every path from the entry,
//! accumulating the branch predicates taken along the way. The result per
//! node is a sum of products: the outer list is OR over paths, each inner
//! list is AND over the predicates of one path. The region entry itself gets
//! a single empty product (reached unconditionally).

use std::collections::HashMap;

use crate::error::CoreError;
use crate::ir::{Function, Terminator};

use super::arena::AstArena;
use super::grapher::AstGrapher;
use super::node::{ExprId, StmtId};

/// Sum-of-products reaching conditions for one region, keyed by AST node.
pub struct ReachingConditions {
    conditions: HashMap<StmtId, Vec<Vec<ExprId>>>,
}

impl ReachingConditions {
    /// Build conditions for a plain region: the exit is cut off entirely and
    /// receives no condition.
    pub fn for_region(
        func: &Function,
        grapher: &AstGrapher,
        arena: &mut AstArena,
        entry: StmtId,
        exit: Option<StmtId>,
    ) -> Result<Self, CoreError> {
        let mut builder = Builder {
            func,
            grapher,
            arena,
            record_sink: None,
            cond_stack: Vec::new(),
            // Pre-seeding the visit stack with the exit cuts it off.
            visit_stack: exit.into_iter().collect(),
            conditions: HashMap::new(),
        };
        builder.visit(entry)?;
        Ok(Self {
            conditions: builder.conditions,
        })
    }

    /// Build conditions for a loop region: the exit is a sink that records
    /// the condition of every path reaching it but is never entered. The
    /// structurer replaces it with a `break`.
    pub fn for_loop(
        func: &Function,
        grapher: &AstGrapher,
        arena: &mut AstArena,
        entry: StmtId,
        exit: Option<StmtId>,
    ) -> Result<Self, CoreError> {
        let mut builder = Builder {
            func,
            grapher,
            arena,
            record_sink: exit,
            cond_stack: Vec::new(),
            visit_stack: Vec::new(),
            conditions: HashMap::new(),
        };
        builder.visit(entry)?;
        Ok(Self {
            conditions: builder.conditions,
        })
    }

    pub fn get(&self, node: StmtId) -> Option<&Vec<Vec<ExprId>>> {
        self.conditions.get(&node)
    }
}

struct Builder<'a> {
    func: &'a Function,
    grapher: &'a AstGrapher,
    arena: &'a mut AstArena,
    record_sink: Option<StmtId>,
    cond_stack: Vec<ExprId>,
    visit_stack: Vec<StmtId>,
    conditions: HashMap<StmtId, Vec<Vec<ExprId>>>,
}

impl Builder<'_> {
    fn record(&mut self, node: StmtId) {
        self.conditions
            .entry(node)
            .or_default()
            .push(self.cond_stack.clone());
    }

    fn visit(&mut self, node: StmtId) -> Result<(), CoreError> {
        if Some(node) == self.record_sink {
            self.record(node);
            return Ok(());
        }
        // Cuts back edges and, when pre-seeded, the exit.
        if self.visit_stack.contains(&node) {
            return Ok(());
        }
        self.visit_stack.push(node);
        self.record(node);

        let graph_node = self
            .grapher
            .node_of(node)
            .expect("reaching-conditions walk over an unregistered AST node");
        if graph_node.is_collapsed() {
            // A structured subregion is entered sequentially; it contributes
            // no predicate of its own.
            if let Some(exit) = graph_node.exit {
                let child = self
                    .grapher
                    .stmt_from_entry(exit)
                    .expect("collapsed region exit has no AST node");
                self.visit(child)?;
            }
        } else {
            let block = graph_node.entry;
            match self.func.terminator(block) {
                Some(Terminator::Conditional {
                    cond,
                    then_target,
                    else_target,
                }) => {
                    let cond = self.arena.value(cond);
                    let then_child = self
                        .grapher
                        .stmt_from_entry(then_target)
                        .expect("branch target has no AST node");
                    self.cond_stack.push(cond);
                    self.visit(then_child)?;
                    self.cond_stack.pop();

                    let negated = self.arena.negate(cond);
                    let else_child = self
                        .grapher
                        .stmt_from_entry(else_target)
                        .expect("branch target has no AST node");
                    self.cond_stack.push(negated);
                    self.visit(else_child)?;
                    self.cond_stack.pop();
                }
                Some(Terminator::Unconditional(target)) => {
                    let child = self
                        .grapher
                        .stmt_from_entry(target)
                        .expect("branch target has no AST node");
                    self.visit(child)?;
                }
                Some(Terminator::Return(_)) | None => {}
                Some(Terminator::Other) => {
                    return Err(CoreError::UnsupportedTerminator {
                        func: self.func.name.clone(),
                        block,
                    });
                }
            }
        }

        self.visit_stack.pop();
        Ok(())
    }
}

/// Simplify a sum of products toward a product of sums.
///
/// Exact minimization is NP-complete; this uses a three-step heuristic
/// suited to nested conditions that share prefixes:
///
/// 1. Factor out terms present in every product as singleton sums.
/// 2. Expand what remains to CNF (the cartesian step the factoring keeps
///    small). A product emptied by factoring satisfies the remaining
///    disjunction outright, so expansion is skipped entirely.
/// 3. Cancel `x ∨ ¬x` pairs inside each sum; a sum that cancels away was a
///    tautology and is dropped from the product.
pub fn simplify_sum_of_products(arena: &AstArena, dnf: &[Vec<ExprId>]) -> Vec<Vec<ExprId>> {
    let mut products: Vec<Vec<ExprId>> = dnf.to_vec();
    let mut cnf: Vec<Vec<ExprId>> = Vec::new();

    // 1. Extract common factors.
    if let Some(first) = products.first().cloned() {
        for term in first {
            if products[1..].iter().all(|p| p.contains(&term)) {
                for product in &mut products {
                    if let Some(pos) = product.iter().position(|&t| t == term) {
                        product.remove(pos);
                    }
                }
                cnf.push(vec![term]);
            }
        }
    }
    if products.iter().any(|p| p.is_empty()) {
        products.clear();
    }

    // 2. Cartesian expansion.
    if !products.is_empty() {
        let mut sums: Vec<Vec<ExprId>> = vec![Vec::new()];
        for product in &products {
            let mut next = Vec::with_capacity(sums.len() * product.len());
            for sum in &sums {
                for &term in product {
                    let mut extended = sum.clone();
                    extended.push(term);
                    next.push(extended);
                }
            }
            sums = next;
        }
        cnf.extend(sums);
    }

    // 3. Tautology cancellation.
    cnf.retain_mut(|sum| {
        loop {
            let mut cancelled = None;
            'outer: for i in 0..sum.len() {
                let (base_i, neg_i) = arena.strip_negation(sum[i]);
                for j in i + 1..sum.len() {
                    let (base_j, neg_j) = arena.strip_negation(sum[j]);
                    if base_i == base_j && neg_i != neg_j {
                        cancelled = Some((i, j));
                        break 'outer;
                    }
                }
            }
            match cancelled {
                Some((i, j)) => {
                    sum.remove(j);
                    sum.remove(i);
                }
                None => break,
            }
        }
        !sum.is_empty()
    });

    cnf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;
    use crate::ir::ValueId;

    fn exprs(arena: &mut AstArena, n: u32) -> Vec<ExprId> {
        (0..n).map(|i| arena.value(ValueId::new(i))).collect()
    }

    #[test]
    fn unconditional_reachability_simplifies_to_nothing() {
        let arena = AstArena::new();
        // One empty product: reached unconditionally.
        assert!(simplify_sum_of_products(&arena, &[vec![]]).is_empty());
    }

    #[test]
    fn single_product_splits_into_singleton_sums() {
        let mut arena = AstArena::new();
        let v = exprs(&mut arena, 2);
        let cnf = simplify_sum_of_products(&arena, &[vec![v[0], v[1]]]);
        assert_eq!(cnf, vec![vec![v[0]], vec![v[1]]]);
    }

    #[test]
    fn common_prefix_is_factored_out() {
        let mut arena = AstArena::new();
        let v = exprs(&mut arena, 3);
        // (a ∧ b) ∨ (a ∧ c)  →  a ∧ (b ∨ c)
        let cnf = simplify_sum_of_products(&arena, &[vec![v[0], v[1]], vec![v[0], v[2]]]);
        assert_eq!(cnf, vec![vec![v[0]], vec![v[1], v[2]]]);
    }

    #[test]
    fn subsumed_product_leaves_only_the_factor() {
        let mut arena = AstArena::new();
        let v = exprs(&mut arena, 2);
        // a ∨ (a ∧ b)  →  a  (the emptied first product absorbs the rest)
        let cnf = simplify_sum_of_products(&arena, &[vec![v[0]], vec![v[0], v[1]]]);
        assert_eq!(cnf, vec![vec![v[0]]]);
    }

    #[test]
    fn complementary_pair_cancels_to_true() {
        let mut arena = AstArena::new();
        let a = arena.value(ValueId::new(0));
        let not_a = arena.negate(a);
        // a ∨ ¬a  →  true  (empty CNF)
        assert!(simplify_sum_of_products(&arena, &[vec![a], vec![not_a]]).is_empty());
    }

    #[test]
    fn diamond_join_condition_collapses() {
        let mut arena = AstArena::new();
        let v = exprs(&mut arena, 2);
        let (i, j) = (v[0], v[1]);
        let not_j = arena.negate(j);
        // (i ∧ j) ∨ (i ∧ ¬j)  →  i
        let cnf = simplify_sum_of_products(&arena, &[vec![i, j], vec![i, not_j]]);
        assert_eq!(cnf, vec![vec![i]]);
    }

    #[test]
    fn unrelated_products_expand_to_a_sum() {
        let mut arena = AstArena::new();
        let v = exprs(&mut arena, 2);
        // a ∨ b stays a ∨ b.
        let cnf = simplify_sum_of_products(&arena, &[vec![v[0]], vec![v[1]]]);
        assert_eq!(cnf, vec![vec![v[0], v[1]]]);
    }
}
