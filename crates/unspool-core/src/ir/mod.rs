pub mod block;
pub mod builder;
pub mod cfg;
pub mod dominance;
pub mod func;
pub mod inst;
pub mod module;
pub mod printer;
pub mod ty;
pub mod value;

pub use block::{Block, BlockId};
pub use builder::{FunctionBuilder, ModuleBuilder};
pub use cfg::{back_edge_targets, branch_targets, build_cfg, post_order, Cfg};
pub use dominance::{DomTree, PostDomTree};
pub use func::{FuncId, Function, Terminator};
pub use inst::{CmpKind, Inst, InstId, Op};
pub use module::Module;
pub use ty::{FunctionSig, Type};
pub use value::{Constant, ValueId};
