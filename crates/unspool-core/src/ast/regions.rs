//! Classical single-entry single-exit region detection.

use std::collections::HashSet;

use crate::ir::{BlockId, Cfg, DomTree, PostDomTree};

/// Decide whether `(entry, exit)` bounds a classical SESE region:
/// every block reachable from `entry` without passing through `exit` must
/// be dominated by `entry` and post-dominated by `exit`. The exit itself is
/// excluded (half-open); `exit = None` stands for the end of the function
/// and post-dominates everything.
pub fn is_region(
    cfg: &Cfg,
    dom: &DomTree,
    postdom: &PostDomTree,
    entry: BlockId,
    exit: Option<BlockId>,
) -> bool {
    let mut visited: HashSet<BlockId> = exit.into_iter().collect();
    let mut to_visit = vec![entry];

    while let Some(block) = to_visit.pop() {
        if visited.contains(&block) {
            continue;
        }
        if !dom.dominates(entry, block) {
            return false;
        }
        if !postdom.dominates(exit, block) {
            return false;
        }
        visited.insert(block);
        for &succ in cfg.succs(block) {
            if !visited.contains(&succ) {
                to_visit.push(succ);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{build_cfg, FunctionBuilder, FunctionSig, Type};

    fn bool_sig() -> FunctionSig {
        FunctionSig {
            params: vec![Type::Bool],
            return_ty: Type::Void,
        }
    }

    #[test]
    fn diamond_bounds_a_region() {
        //   entry → a, b; a → merge; b → merge; merge → return
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
        let dom = DomTree::compute(&func, &cfg);
        let pdom = PostDomTree::compute(&func, &cfg);

        assert!(is_region(&cfg, &dom, &pdom, func.entry, Some(merge)));
        assert!(is_region(&cfg, &dom, &pdom, func.entry, None));
        assert!(is_region(&cfg, &dom, &pdom, a, Some(merge)));
        // `a` does not dominate `merge`'s other predecessor side.
        assert!(!is_region(&cfg, &dom, &pdom, a, None));
    }

    #[test]
    fn function_end_region_requires_dominating_everything_reachable() {
        //   entry → a, join; a → join; join → return
        // (entry, None) holds; (a, None) fails since join is shared.
        let mut fb = FunctionBuilder::new("skewed", bool_sig());
        let cond = fb.param(0);
        let a = fb.create_block();
        let join = fb.create_block();

        fb.br_if(cond, a, join);
        fb.switch_to_block(a);
        fb.br(join);
        fb.switch_to_block(join);
        fb.ret(None);

        let func = fb.build();
        let cfg = build_cfg(&func);
        let dom = DomTree::compute(&func, &cfg);
        let pdom = PostDomTree::compute(&func, &cfg);

        assert!(is_region(&cfg, &dom, &pdom, func.entry, None));
        assert!(!is_region(&cfg, &dom, &pdom, a, None));
    }
}
