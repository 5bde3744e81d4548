//! Proc macros for the try-this crate.

use proc_macro::TokenStream;

mod resource;

/// Derive `try_this::Resource` for a struct.
///
/// Each field must implement `Resource`. `close` closes the fields in
/// reverse declaration order; the first failure is returned and later ones
/// are suppressed under it. Fields marked `#[resource(skip)]` are not closed,
/// only dropped.
///
/// The struct must not implement `Drop`, since closing moves its fields out.
#[proc_macro_derive(Resource, attributes(resource))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    resource::derive(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
