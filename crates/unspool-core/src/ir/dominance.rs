//! Dominator and post-dominator trees (iterative Cooper-Harvey-Kennedy).

use std::collections::{HashMap, HashSet};

use super::block::BlockId;
use super::cfg::{post_order, Cfg};
use super::func::Function;

/// Dominator tree over a function's CFG.
pub struct DomTree {
    idom: HashMap<BlockId, BlockId>,
    entry: BlockId,
}

impl DomTree {
    pub fn compute(func: &Function, cfg: &Cfg) -> Self {
        let entry = func.entry;
        let mut rpo = post_order(entry, cfg);
        rpo.reverse();
        let rpo_number: HashMap<BlockId, usize> =
            rpo.iter().enumerate().map(|(i, &b)| (b, i)).collect();

        let mut idom: HashMap<BlockId, BlockId> = HashMap::new();
        idom.insert(entry, entry);

        let intersect =
            |mut a: BlockId, mut b: BlockId, idom: &HashMap<BlockId, BlockId>| -> BlockId {
                while a != b {
                    while rpo_number[&a] > rpo_number[&b] {
                        a = idom[&a];
                    }
                    while rpo_number[&b] > rpo_number[&a] {
                        b = idom[&b];
                    }
                }
                a
            };

        let mut changed = true;
        while changed {
            changed = false;
            for &b in &rpo {
                if b == entry {
                    continue;
                }
                let mut new_idom: Option<BlockId> = None;
                for &p in cfg.preds(b) {
                    if !idom.contains_key(&p) {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(current) => intersect(p, current, &idom),
                    });
                }
                if let Some(new) = new_idom {
                    if idom.get(&b) != Some(&new) {
                        idom.insert(b, new);
                        changed = true;
                    }
                }
            }
        }

        Self { idom, entry }
    }

    /// Immediate dominator; `None` for the entry and for unreachable blocks.
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        if block == self.entry {
            return None;
        }
        self.idom.get(&block).copied()
    }

    /// Check if `a` dominates `b`.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            match self.idom.get(&cur) {
                Some(&parent) if parent != cur => cur = parent,
                _ => return false,
            }
        }
    }
}

/// Post-dominator tree over the reverse CFG.
///
/// The root is a virtual exit representing "function end", written `None`
/// throughout: it is the immediate post-dominator of every return block and
/// of blocks that reach no return at all (endless loops), and it
/// post-dominates everything.
pub struct PostDomTree {
    ipdom: HashMap<BlockId, Option<BlockId>>,
}

impl PostDomTree {
    pub fn compute(func: &Function, cfg: &Cfg) -> Self {
        // Blocks with no successors feed the virtual exit.
        let exits: Vec<BlockId> = func
            .blocks
            .keys()
            .filter(|&b| cfg.succs(b).is_empty())
            .collect();

        // Post-order of the reverse CFG, rooted (conceptually) at the
        // virtual exit; rpo number 0 is reserved for it.
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        fn rev_dfs(
            b: BlockId,
            cfg: &Cfg,
            visited: &mut HashSet<BlockId>,
            order: &mut Vec<BlockId>,
        ) {
            if !visited.insert(b) {
                return;
            }
            for &pred in cfg.preds(b) {
                rev_dfs(pred, cfg, visited, order);
            }
            order.push(b);
        }
        for &exit in &exits {
            rev_dfs(exit, cfg, &mut visited, &mut order);
        }
        order.reverse();
        let rpo_number: HashMap<BlockId, usize> =
            order.iter().enumerate().map(|(i, &b)| (b, i + 1)).collect();

        let mut ipdom: HashMap<BlockId, Option<BlockId>> = HashMap::new();
        for &exit in &exits {
            ipdom.insert(exit, None);
        }

        let number = |n: Option<BlockId>| n.map_or(0, |b| rpo_number[&b]);
        let intersect = |mut a: Option<BlockId>,
                         mut b: Option<BlockId>,
                         ipdom: &HashMap<BlockId, Option<BlockId>>|
         -> Option<BlockId> {
            while a != b {
                while number(a) > number(b) {
                    a = ipdom[&a.unwrap()];
                }
                while number(b) > number(a) {
                    b = ipdom[&b.unwrap()];
                }
            }
            a
        };

        let mut changed = true;
        while changed {
            changed = false;
            for &b in &order {
                if cfg.succs(b).is_empty() {
                    continue;
                }
                // Predecessors in the reverse CFG are forward successors.
                let mut new_ipdom: Option<Option<BlockId>> = None;
                for &s in cfg.succs(b) {
                    if !ipdom.contains_key(&s) {
                        continue;
                    }
                    new_ipdom = Some(match new_ipdom {
                        None => Some(s),
                        Some(current) => intersect(Some(s), current, &ipdom),
                    });
                }
                if let Some(new) = new_ipdom {
                    if ipdom.get(&b) != Some(&new) {
                        ipdom.insert(b, new);
                        changed = true;
                    }
                }
            }
        }

        // Blocks that reach no exit hang directly off the virtual exit.
        for b in func.blocks.keys() {
            ipdom.entry(b).or_insert(None);
        }

        Self { ipdom }
    }

    /// Immediate post-dominator; `None` means the virtual exit.
    pub fn ipdom(&self, block: BlockId) -> Option<BlockId> {
        self.ipdom.get(&block).copied().flatten()
    }

    /// Check if `a` post-dominates `b`. `a = None` is the virtual exit,
    /// which post-dominates everything.
    pub fn dominates(&self, a: Option<BlockId>, b: BlockId) -> bool {
        let Some(a) = a else {
            return true;
        };
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            match self.ipdom.get(&cur) {
                Some(&Some(parent)) => cur = parent,
                _ => return false,
            }
        }
    }
}
