//! Declarative macros for try-this.

mod helpers;

// `try_of!` is exported at the crate root by #[macro_export]
#[macro_use]
mod try_of;

pub use helpers::*;
