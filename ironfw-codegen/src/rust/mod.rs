//! Rust code generation modules.

pub mod codec;
pub mod ident;
pub mod types;

pub use codec::CodecGenerator;
pub use types::TypeGenerator;
