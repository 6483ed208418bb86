//! SQL AST, helpers for building it, and conversion to parameterized SQL strings.

pub mod ast;
pub mod convert;
pub mod helpers;
pub mod string;
