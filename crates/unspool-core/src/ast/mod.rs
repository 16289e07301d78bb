pub mod arena;
pub mod conditions;
pub mod grapher;
pub mod node;
pub mod passes;
pub mod printer;
pub mod regions;
pub mod structurize;

pub use arena::AstArena;
pub use conditions::{simplify_sum_of_products, ReachingConditions};
pub use grapher::{AstGrapher, GraphNode, GraphNodeId};
pub use node::{BinOp, Expr, ExprId, LoopPosition, Stmt, StmtId, UnaryOp};
pub use passes::simplify_statement;
pub use printer::AstPrinter;
pub use regions::is_region;
pub use structurize::AstBackEnd;
