//! Region structuring and the per-module driving loop.
//!
//! Blocks are visited in CFG post-order. Each becomes a raw AST node; then
//! candidate regions anchored at that block are enumerated by walking up
//! the post-dominator tree, and every confirmed region is rebuilt as a
//! sequence of nodes nested under `if` statements that match their reaching
//! conditions. Back-edge destinations are wrapped in endless loops; the AST
//! simplifier rewrites a trailing `if (c) break` into do-while afterwards.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::error::CoreError;
use crate::ir::{
    back_edge_targets, build_cfg, post_order, BlockId, Cfg, DomTree, FuncId, Function, Module,
    PostDomTree,
};

use super::arena::AstArena;
use super::conditions::{simplify_sum_of_products, ReachingConditions};
use super::grapher::AstGrapher;
use super::node::{BinOp, ExprId, Stmt, StmtId};
use super::passes::simplify_statement;
use super::regions::is_region;

/// How a confirmed region is interpreted.
#[derive(Clone, Copy, PartialEq, Eq)]
enum RegionKind {
    /// Plain acyclic region: the exit is excluded entirely.
    Acyclic,
    /// Loop body: paths to the exit turn into `break` statements.
    Cyclic,
}

/// The AST back-end: runs once per module, producing one structured
/// statement tree per function.
#[derive(Default)]
pub struct AstBackEnd {
    arena: AstArena,
    asts: HashMap<FuncId, StmtId>,
}

impl AstBackEnd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structure every function in the module. Clears state from any prior
    /// run. A function with an unsupported terminator degrades to its flat
    /// instruction sequence with a logged warning; the module run goes on.
    pub fn run_on_module(&mut self, module: &Module) {
        self.arena.clear();
        self.asts.clear();
        for (id, func) in module.functions.iter() {
            self.run_on_function(id, func);
        }
    }

    /// Structure a single function. Already-processed and empty functions
    /// are skipped.
    pub fn run_on_function(&mut self, id: FuncId, func: &Function) {
        if self.asts.contains_key(&id) || func.blocks.is_empty() {
            return;
        }
        self.arena.begin_function();
        let ast = match Structurizer::new(func, &mut self.arena).run() {
            Ok(ast) => ast,
            Err(err) => {
                warn!("leaving `{}` unstructured: {err}", func.name);
                self.flat_fallback(func)
            }
        };
        self.asts.insert(id, ast);
    }

    /// The structured AST for a function, once the back-end has run.
    pub fn ast_for_function(&self, id: FuncId) -> Option<StmtId> {
        self.asts.get(&id).copied()
    }

    pub fn arena(&self) -> &AstArena {
        &self.arena
    }

    /// Every block's straight-line code concatenated in layout order — the
    /// degradation result for functions the structurer rejects.
    fn flat_fallback(&mut self, func: &Function) -> StmtId {
        let mut children = Vec::new();
        for block in func.blocks.values() {
            for &inst in &block.insts {
                if !func.insts[inst].op.is_branch() {
                    children.push(self.arena.inst_stmt(inst));
                }
            }
        }
        self.arena.sequence(children)
    }
}

struct Structurizer<'a> {
    func: &'a Function,
    arena: &'a mut AstArena,
    grapher: AstGrapher,
    cfg: Cfg,
    dom: DomTree,
    postdom: PostDomTree,
    back_edges: HashSet<BlockId>,
}

impl<'a> Structurizer<'a> {
    fn new(func: &'a Function, arena: &'a mut AstArena) -> Self {
        let cfg = build_cfg(func);
        let dom = DomTree::compute(func, &cfg);
        let postdom = PostDomTree::compute(func, &cfg);
        let back_edges = back_edge_targets(func.entry, &cfg);
        Self {
            func,
            arena,
            grapher: AstGrapher::new(),
            cfg,
            dom,
            postdom,
            back_edges,
        }
    }

    fn run(mut self) -> Result<StmtId, CoreError> {
        for &block in &post_order(self.func.entry, &self.cfg) {
            self.grapher.add_basic_block(self.func, block, self.arena);
            self.structure_candidates(block)?;
        }
        let ast = self
            .grapher
            .stmt_from_entry(self.func.entry)
            .expect("function entry has no AST node");
        // The outermost statement may itself be a fresh loop; one final
        // simplification pass covers it.
        Ok(simplify_statement(self.arena, ast))
    }

    /// Walk up the post-dominator tree from `entry`, testing each stop as
    /// the exit of a region anchored at `entry`. A collapsed region met on
    /// the way shortcuts the walk past its internals, straight to its exit.
    fn structure_candidates(&mut self, entry: BlockId) -> Result<(), CoreError> {
        let mut block = entry;
        loop {
            let node = self
                .grapher
                .node_from_entry(block)
                .expect("walk-up reached a block with no AST node");
            let exit = if node.is_collapsed() {
                node.exit
            } else {
                self.postdom.ipdom(block)
            };

            // A candidate exit that has no AST node yet is a post-order
            // ancestor still waiting for its own turn; the region around it
            // will be rebuilt from that anchor instead.
            let exit_ready = exit.map_or(true, |e| self.grapher.stmt_from_entry(e).is_some());
            if exit_ready && is_region(&self.cfg, &self.dom, &self.postdom, entry, exit) {
                if self.back_edges.contains(&entry) {
                    // Only the innermost region around a back-edge target is
                    // a loop; enclosing regions structure as plain regions.
                    self.structure_loop(entry, exit)?;
                    self.back_edges.remove(&entry);
                } else {
                    self.structure_region(entry, exit)?;
                }
            }

            match exit {
                Some(e) if self.dom.dominates(entry, e) => block = e,
                _ => break,
            }
        }
        Ok(())
    }

    fn structure_region(&mut self, entry: BlockId, exit: Option<BlockId>) -> Result<(), CoreError> {
        debug!(
            "{}: structuring region ({entry:?}, {exit:?})",
            self.func.name
        );
        let body = self.structurize_region(entry, exit, RegionKind::Acyclic)?;
        let body = simplify_statement(self.arena, body);
        self.grapher.update_region(entry, exit, body);
        Ok(())
    }

    fn structure_loop(&mut self, entry: BlockId, exit: Option<BlockId>) -> Result<(), CoreError> {
        debug!("{}: structuring loop ({entry:?}, {exit:?})", self.func.name);
        let body = self.structurize_region(entry, exit, RegionKind::Cyclic)?;
        let body = simplify_statement(self.arena, body);
        let stmt = self.arena.endless_loop(body);
        self.grapher.update_region(entry, exit, stmt);
        Ok(())
    }

    /// Rebuild the region `(entry, exit)` as a sequence whose nodes, taken
    /// in reverse post-order, are nested under `if` statements matching
    /// their reaching conditions. Consecutive nodes sharing a leading
    /// predicate coalesce under the already-open `if`.
    fn structurize_region(
        &mut self,
        entry: BlockId,
        exit: Option<BlockId>,
        kind: RegionKind,
    ) -> Result<StmtId, CoreError> {
        let entry_ast = self
            .grapher
            .stmt_from_entry(entry)
            .expect("region entry has no AST node");
        let exit_ast = exit.map(|e| {
            self.grapher
                .stmt_from_entry(e)
                .expect("region exit has no AST node")
        });

        let conditions = match kind {
            RegionKind::Acyclic => ReachingConditions::for_region(
                self.func,
                &self.grapher,
                self.arena,
                entry_ast,
                exit_ast,
            )?,
            RegionKind::Cyclic => ReachingConditions::for_loop(
                self.func,
                &self.grapher,
                self.arena,
                entry_ast,
                exit_ast,
            )?,
        };

        let order = self.reverse_post_order(entry_ast, exit_ast, kind);
        let region = self.arena.sequence(Vec::new());
        for node in order {
            let dnf = conditions
                .get(node)
                .expect("region node without a reaching condition");
            let cnf = simplify_sum_of_products(self.arena, dnf);

            let mut body = region;
            for sum in &cnf {
                let mut cond: Option<ExprId> = None;
                for &term in sum {
                    cond = self.arena.coalesce(BinOp::LogicalOr, cond, Some(term));
                }
                let cond = cond.expect("empty sum in a simplified condition");
                body = self.open_branch(body, cond);
            }

            let stmt = if kind == RegionKind::Cyclic && Some(node) == exit_ast {
                // The loop's exit is not part of the region; reaching it
                // means leaving the loop.
                self.arena.break_stmt()
            } else {
                node
            };
            self.arena.push_to_sequence(body, stmt);
        }
        Ok(region)
    }

    /// Find the `if` body that one more conjunct should live in. When the
    /// last statement of `body` is an `if` over the same predicate (up to
    /// one negation), nest under its matching branch instead of opening a
    /// sibling `if`.
    fn open_branch(&mut self, body: StmtId, cond: ExprId) -> StmtId {
        let last = match self.arena.stmt(body) {
            Stmt::Sequence(children) => children.last().copied(),
            other => panic!("expected a sequence, found {other:?}"),
        };
        if let Some(last) = last {
            if let Stmt::IfElse {
                cond: open_cond,
                then_body,
                else_body,
            } = *self.arena.stmt(last)
            {
                let (base, negated) = self.arena.strip_negation(cond);
                let (open_base, open_negated) = self.arena.strip_negation(open_cond);
                if base == open_base {
                    if negated == open_negated {
                        return then_body;
                    }
                    if let Some(else_body) = else_body {
                        return else_body;
                    }
                    let else_body = self.arena.sequence(Vec::new());
                    match self.arena.stmt_mut(last) {
                        Stmt::IfElse { else_body: slot, .. } => *slot = Some(else_body),
                        _ => unreachable!(),
                    }
                    return else_body;
                }
            }
        }
        let if_body = self.arena.sequence(Vec::new());
        let if_stmt = self.arena.if_else(cond, if_body, None);
        self.arena.push_to_sequence(body, if_stmt);
        if_body
    }

    /// Reverse post-order over the region's nodes, following the grapher's
    /// child iteration (which already respects collapsed subregions). For a
    /// loop region the exit appears as a leaf; for a plain region it is
    /// excluded.
    fn reverse_post_order(
        &self,
        entry: StmtId,
        exit: Option<StmtId>,
        kind: RegionKind,
    ) -> Vec<StmtId> {
        let mut visited = HashSet::new();
        if kind == RegionKind::Acyclic {
            if let Some(exit) = exit {
                visited.insert(exit);
            }
        }
        let mut order = Vec::new();
        self.post_order_visit(entry, exit, kind, &mut visited, &mut order);
        order.reverse();
        order
    }

    fn post_order_visit(
        &self,
        node: StmtId,
        exit: Option<StmtId>,
        kind: RegionKind,
        visited: &mut HashSet<StmtId>,
        order: &mut Vec<StmtId>,
    ) {
        if !visited.insert(node) {
            return;
        }
        let is_loop_exit = kind == RegionKind::Cyclic && Some(node) == exit;
        if !is_loop_exit {
            for child in self.grapher.children(&self.cfg, node) {
                self.post_order_visit(child, exit, kind, visited, order);
            }
        }
        order.push(node);
    }
}
