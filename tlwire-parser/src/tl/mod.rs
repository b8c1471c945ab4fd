//! Rust types representing the Abstract Syntax Tree of a TL definition.

mod category;
mod definition;
mod parameter;
mod ty;

pub use category::Category;
pub use definition::Definition;
pub use parameter::{Flag, Parameter, ParameterType};
pub use ty::Type;
