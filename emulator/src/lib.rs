pub mod compiler;
pub mod constants;
pub mod opcodes;
pub mod parser;
pub mod runtime;

pub use self::{compiler::compile, parser::assemble};
