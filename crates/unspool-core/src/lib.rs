//! Control-flow structuring back-end for lifted machine code.
//!
//! The input is a per-function CFG of basic blocks over a small
//! three-address IR ([`ir`]). The output is a structured, goto-free-where-
//! possible AST per function ([`ast`]) built from sequences, if/else, and
//! loops, using reaching conditions over branch predicates in the spirit of
//! Yakdan et al.'s "No More Gotos".

pub mod ast;
pub mod entity;
pub mod error;
pub mod ir;

pub use error::CoreError;
