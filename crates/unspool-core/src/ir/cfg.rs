//! CFG edge maps and block-order traversals.

use std::collections::{HashMap, HashSet};

use super::block::BlockId;
use super::func::Function;
use super::inst::Op;

/// Successor blocks named by a terminator op.
pub fn branch_targets(op: &Op) -> Vec<BlockId> {
    match op {
        Op::Br { target } => vec![*target],
        Op::BrIf {
            then_target,
            else_target,
            ..
        } => vec![*then_target, *else_target],
        Op::Switch { cases, default, .. } => {
            let mut targets: Vec<BlockId> = cases.iter().map(|(_, b)| *b).collect();
            targets.push(*default);
            targets
        }
        _ => Vec::new(),
    }
}

/// Predecessor and successor maps for a function's CFG.
pub struct Cfg {
    succs: HashMap<BlockId, Vec<BlockId>>,
    preds: HashMap<BlockId, Vec<BlockId>>,
}

impl Cfg {
    pub fn succs(&self, block: BlockId) -> &[BlockId] {
        self.succs.get(&block).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn preds(&self, block: BlockId) -> &[BlockId] {
        self.preds.get(&block).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

pub fn build_cfg(func: &Function) -> Cfg {
    let mut succs: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
    let mut preds: HashMap<BlockId, Vec<BlockId>> = HashMap::new();

    for block_id in func.blocks.keys() {
        succs.entry(block_id).or_default();
        preds.entry(block_id).or_default();
    }

    for (block_id, block) in func.blocks.iter() {
        if let Some(&last_inst) = block.insts.last() {
            for target in branch_targets(&func.insts[last_inst].op) {
                succs.entry(block_id).or_default().push(target);
                preds.entry(target).or_default().push(block_id);
            }
        }
    }

    Cfg { succs, preds }
}

/// Post-order over the blocks reachable from `entry`, deterministic given
/// the successor order.
pub fn post_order(entry: BlockId, cfg: &Cfg) -> Vec<BlockId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();

    fn dfs(b: BlockId, cfg: &Cfg, visited: &mut HashSet<BlockId>, order: &mut Vec<BlockId>) {
        if !visited.insert(b) {
            return;
        }
        for &succ in cfg.succs(b) {
            dfs(succ, cfg, visited, order);
        }
        order.push(b);
    }

    dfs(entry, cfg, &mut visited, &mut order);
    order
}

/// Destinations of back edges: targets `v` of edges `u → v` where `v` lies
/// on the DFS path from `entry` to `u`.
pub fn back_edge_targets(entry: BlockId, cfg: &Cfg) -> HashSet<BlockId> {
    let mut visited = HashSet::new();
    let mut on_path = HashSet::new();
    let mut targets = HashSet::new();

    fn dfs(
        b: BlockId,
        cfg: &Cfg,
        visited: &mut HashSet<BlockId>,
        on_path: &mut HashSet<BlockId>,
        targets: &mut HashSet<BlockId>,
    ) {
        visited.insert(b);
        on_path.insert(b);
        for &succ in cfg.succs(b) {
            if on_path.contains(&succ) {
                targets.insert(succ);
            } else if !visited.contains(&succ) {
                dfs(succ, cfg, visited, on_path, targets);
            }
        }
        on_path.remove(&b);
    }

    dfs(entry, cfg, &mut visited, &mut on_path, &mut targets);
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::FunctionBuilder;
    use crate::ir::ty::{FunctionSig, Type};

    fn bool_sig() -> FunctionSig {
        FunctionSig {
            params: vec![Type::Bool],
            return_ty: Type::Void,
        }
    }

    #[test]
    fn post_order_visits_successors_first() {
        //   entry: br_if cond, a, b
        //   a:     br merge
        //   b:     br merge
        //   merge: return
        let mut fb = FunctionBuilder::new("diamond", bool_sig());
        let cond = fb.param(0);

        let a = fb.create_block();
        let b = fb.create_block();
        let merge = fb.create_block();

        fb.br_if(cond, a, b);
        fb.switch_to_block(a);
        fb.br(merge);
        fb.switch_to_block(b);
        fb.br(merge);
        fb.switch_to_block(merge);
        fb.ret(None);

        let func = fb.build();
        let cfg = build_cfg(&func);
        let order = post_order(func.entry, &cfg);

        assert_eq!(order, vec![merge, a, b, func.entry]);
    }

    #[test]
    fn back_edges_of_self_loop() {
        //   entry: br spin
        //   spin:  br spin
        let mut fb = FunctionBuilder::new("spin", bool_sig());
        let spin = fb.create_block();
        fb.br(spin);
        fb.switch_to_block(spin);
        fb.br(spin);

        let func = fb.build();
        let cfg = build_cfg(&func);
        let targets = back_edge_targets(func.entry, &cfg);

        assert_eq!(targets.len(), 1);
        assert!(targets.contains(&spin));
    }

    #[test]
    fn acyclic_graph_has_no_back_edges() {
        let mut fb = FunctionBuilder::new("straight", bool_sig());
        let next = fb.create_block();
        fb.br(next);
        fb.switch_to_block(next);
        fb.ret(None);

        let func = fb.build();
        let cfg = build_cfg(&func);
        assert!(back_edge_targets(func.entry, &cfg).is_empty());
    }
}
