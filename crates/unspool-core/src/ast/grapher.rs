//! Bidirectional bookkeeping between basic blocks and AST nodes.
//!
//! Every basic block starts as a raw `Sequence` of its straight-line
//! instructions. When a region `(entry, exit)` is structured, the grapher
//! "collapses" it: a new node is pushed carrying the synthesized AST and
//! the region's single exit, and the entry block is rebound to it. Anyone
//! holding the old AST id can still look its node up, so the structured
//! children of a collapsed region stay reachable.

use std::collections::HashMap;

use crate::define_entity;
use crate::entity::PrimaryMap;
use crate::ir::{BlockId, Cfg, Function};

use super::arena::AstArena;
use super::node::StmtId;

define_entity!(GraphNodeId);

/// A region entry marker mapping a block (or a collapsed subregion rooted
/// at that block) to its current AST.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub ast: StmtId,
    pub entry: BlockId,
    /// `Some(entry)` for a raw block; anything else marks a collapsed
    /// region whose structured children are traversed via the exit
    /// (`None` = the region runs to the end of the function).
    pub exit: Option<BlockId>,
}

impl GraphNode {
    pub fn is_collapsed(&self) -> bool {
        self.exit != Some(self.entry)
    }
}

/// Block ↔ AST maps for one function.
#[derive(Default)]
pub struct AstGrapher {
    nodes: PrimaryMap<GraphNodeId, GraphNode>,
    stmt_by_entry: HashMap<BlockId, StmtId>,
    node_by_stmt: HashMap<StmtId, GraphNodeId>,
}

impl AstGrapher {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, node: GraphNode) -> GraphNodeId {
        let entry = node.entry;
        let ast = node.ast;
        let id = self.nodes.push(node);
        self.stmt_by_entry.insert(entry, ast);
        self.node_by_stmt.insert(ast, id);
        id
    }

    /// Materialize a raw block: a `Sequence` of its non-branch instructions,
    /// registered with `entry == exit == block`.
    pub fn add_basic_block(
        &mut self,
        func: &Function,
        block: BlockId,
        arena: &mut AstArena,
    ) -> StmtId {
        let mut children = Vec::new();
        for &inst_id in &func.blocks[block].insts {
            // Branches are dropped here; blocks carry the conditions.
            if !func.insts[inst_id].op.is_branch() {
                children.push(arena.inst_stmt(inst_id));
            }
        }
        let ast = arena.sequence(children);
        self.push_node(GraphNode {
            ast,
            entry: block,
            exit: Some(block),
        });
        ast
    }

    /// Collapse the region `(entry, exit)` into `ast`. The entry block is
    /// rebound; the previous node stays retrievable through its own AST id.
    pub fn update_region(&mut self, entry: BlockId, exit: Option<BlockId>, ast: StmtId) {
        self.push_node(GraphNode { ast, entry, exit });
    }

    pub fn node_of(&self, ast: StmtId) -> Option<&GraphNode> {
        self.node_by_stmt.get(&ast).map(|&id| &self.nodes[id])
    }

    pub fn node_from_entry(&self, block: BlockId) -> Option<&GraphNode> {
        self.stmt_from_entry(block).and_then(|ast| self.node_of(ast))
    }

    pub fn stmt_from_entry(&self, block: BlockId) -> Option<StmtId> {
        self.stmt_by_entry.get(&block).copied()
    }

    /// Child iteration for region traversals: a collapsed node has a single
    /// child, its exit; a raw block's children follow the CFG successors of
    /// its terminator.
    ///
    /// # Panics
    /// Panics if a child block has no AST node yet; callers only traverse
    /// regions whose blocks have all been added.
    pub fn children(&self, cfg: &Cfg, ast: StmtId) -> Vec<StmtId> {
        let node = self
            .node_of(ast)
            .expect("child iteration over an unregistered AST node");
        if node.is_collapsed() {
            match node.exit {
                Some(exit) => vec![self
                    .stmt_from_entry(exit)
                    .expect("collapsed region exit has no AST node")],
                None => Vec::new(),
            }
        } else {
            cfg.succs(node.entry)
                .iter()
                .map(|&succ| {
                    self.stmt_from_entry(succ)
                        .expect("CFG successor has no AST node")
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::Stmt;
    use crate::ir::{build_cfg, CmpKind, FunctionBuilder, FunctionSig, Type};

    #[test]
    fn raw_blocks_keep_straight_line_code_only() {
        let sig = FunctionSig {
            params: vec![Type::Int(64)],
            return_ty: Type::Void,
        };
        let mut fb = FunctionBuilder::new("raw", sig);
        let x = fb.param(0);
        let t = fb.create_block();
        let e = fb.create_block();

        let zero = fb.const_int(0);
        let pred = fb.cmp(CmpKind::Lt, x, zero);
        fb.br_if(pred, t, e);
        fb.switch_to_block(t);
        fb.ret(None);
        fb.switch_to_block(e);
        fb.ret(None);

        let func = fb.build();
        let mut arena = AstArena::new();
        let mut grapher = AstGrapher::new();
        let ast = grapher.add_basic_block(&func, func.entry, &mut arena);

        // const + cmp survive; the br_if does not.
        match arena.stmt(ast) {
            Stmt::Sequence(children) => assert_eq!(children.len(), 2),
            other => panic!("expected sequence, got {other:?}"),
        }
        let node = grapher.node_from_entry(func.entry).unwrap();
        assert!(!node.is_collapsed());
        assert_eq!(node.exit, Some(func.entry));
    }

    #[test]
    fn update_region_rebinds_entry_and_keeps_old_node() {
        let sig = FunctionSig {
            params: vec![],
            return_ty: Type::Void,
        };
        let mut fb = FunctionBuilder::new("collapse", sig);
        let next = fb.create_block();
        fb.br(next);
        fb.switch_to_block(next);
        fb.ret(None);

        let func = fb.build();
        let mut arena = AstArena::new();
        let mut grapher = AstGrapher::new();

        let next_ast = grapher.add_basic_block(&func, next, &mut arena);
        let raw_ast = grapher.add_basic_block(&func, func.entry, &mut arena);
        let region_ast = arena.sequence(vec![raw_ast, next_ast]);
        grapher.update_region(func.entry, None, region_ast);

        // The entry now resolves to the region...
        assert_eq!(grapher.stmt_from_entry(func.entry), Some(region_ast));
        let node = grapher.node_from_entry(func.entry).unwrap();
        assert!(node.is_collapsed());
        assert_eq!(node.exit, None);

        // ...but the raw node is still reachable through its old AST id.
        let old = grapher.node_of(raw_ast).unwrap();
        assert_eq!(old.entry, func.entry);
        assert_eq!(old.exit, Some(func.entry));
    }

    #[test]
    fn children_follow_collapse_or_cfg() {
        let sig = FunctionSig {
            params: vec![],
            return_ty: Type::Void,
        };
        let mut fb = FunctionBuilder::new("children", sig);
        let mid = fb.create_block();
        let last = fb.create_block();
        fb.br(mid);
        fb.switch_to_block(mid);
        fb.br(last);
        fb.switch_to_block(last);
        fb.ret(None);

        let func = fb.build();
        let cfg = build_cfg(&func);
        let mut arena = AstArena::new();
        let mut grapher = AstGrapher::new();

        let last_ast = grapher.add_basic_block(&func, last, &mut arena);
        let mid_ast = grapher.add_basic_block(&func, mid, &mut arena);
        let entry_ast = grapher.add_basic_block(&func, func.entry, &mut arena);

        // Raw block: children are CFG successors.
        assert_eq!(grapher.children(&cfg, entry_ast), vec![mid_ast]);
        assert_eq!(grapher.children(&cfg, last_ast), Vec::<StmtId>::new());

        // Collapsed region (mid, last): single child is the exit's node.
        let region = arena.sequence(vec![mid_ast]);
        grapher.update_region(mid, Some(last), region);
        assert_eq!(grapher.children(&cfg, region), vec![last_ast]);
    }
}
