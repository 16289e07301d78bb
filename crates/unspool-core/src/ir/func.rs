use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::define_entity;
use crate::entity::PrimaryMap;

use super::block::{Block, BlockId};
use super::inst::{Inst, InstId, Op};
use super::ty::{FunctionSig, Type};
use super::value::ValueId;

define_entity!(FuncId);

/// A function in the IR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub sig: FunctionSig,
    pub blocks: PrimaryMap<BlockId, Block>,
    pub insts: PrimaryMap<InstId, Inst>,
    pub value_types: PrimaryMap<ValueId, Type>,
    /// Entry block — always the first block.
    pub entry: BlockId,
    /// Optional debug names for values (from source-level variable names).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub value_names: HashMap<ValueId, String>,
}

/// Classification of a block's terminator, as seen by the structurer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Two-way branch on a boolean predicate.
    Conditional {
        cond: ValueId,
        then_target: BlockId,
        else_target: BlockId,
    },
    /// Single-successor branch.
    Unconditional(BlockId),
    /// Terminal sink; the return instruction itself stays in the block's
    /// statement sequence.
    Return(Option<ValueId>),
    /// Anything the structurer does not handle (e.g. `Switch`).
    Other,
}

impl Function {
    /// Classify the terminator of `block`. `None` for an empty block.
    pub fn terminator(&self, block: BlockId) -> Option<Terminator> {
        let &last = self.blocks[block].insts.last()?;
        Some(match self.insts[last].op {
            Op::Br { target } => Terminator::Unconditional(target),
            Op::BrIf {
                cond,
                then_target,
                else_target,
            } => Terminator::Conditional {
                cond,
                then_target,
                else_target,
            },
            Op::Return(value) => Terminator::Return(value),
            _ => Terminator::Other,
        })
    }
}
