use serde::{Deserialize, Serialize};

use crate::define_entity;

use super::inst::InstId;

define_entity!(BlockId);

/// A basic block: a linear run of instructions ending in a terminator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub insts: Vec<InstId>,
}
