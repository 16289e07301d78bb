use serde::{Deserialize, Serialize};

use crate::define_entity;

use super::block::BlockId;
use super::value::{Constant, ValueId};

define_entity!(InstId);

/// An IR instruction: an operation with an optional result value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inst {
    pub op: Op,
    /// The value produced by this instruction, if any.
    pub result: Option<ValueId>,
}

/// Comparison kind for relational operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpKind {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// IR operations.
///
/// The last instruction of every block is its terminator: `Br`, `BrIf`,
/// `Switch`, or `Return`. Everything else is straight-line code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Op {
    /// Load a compile-time constant.
    Const(Constant),

    // -- Arithmetic --
    Add(ValueId, ValueId),
    Sub(ValueId, ValueId),
    Mul(ValueId, ValueId),
    Div(ValueId, ValueId),

    // -- Comparison & logic --
    Cmp(CmpKind, ValueId, ValueId),
    Not(ValueId),

    // -- Memory --
    /// Load from a pointer/reference.
    Load(ValueId),
    /// Store to a pointer/reference.
    Store { ptr: ValueId, value: ValueId },

    // -- Calls --
    /// Direct function call.
    Call { func: String, args: Vec<ValueId> },

    // -- Control flow --
    /// Unconditional branch.
    Br { target: BlockId },
    /// Conditional branch.
    BrIf {
        cond: ValueId,
        then_target: BlockId,
        else_target: BlockId,
    },
    /// Multi-way switch. Recognized by the IR, rejected by the structurer;
    /// a lowering pass must turn these into branch chains first.
    Switch {
        value: ValueId,
        cases: Vec<(Constant, BlockId)>,
        default: BlockId,
    },
    /// Return from function.
    Return(Option<ValueId>),
}

impl Op {
    /// Whether this op transfers control to another block. `Return` is a
    /// terminator too, but it carries no successor edge and is still
    /// materialized as a statement in the output.
    pub fn is_branch(&self) -> bool {
        matches!(self, Op::Br { .. } | Op::BrIf { .. } | Op::Switch { .. })
    }
}
