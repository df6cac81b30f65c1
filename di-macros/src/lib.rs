//! Compile-time dependency injection derives for contentgraph.
//!
//! - `#[derive(Context)]` exposes every field of a root context through
//!   `FromRef`, so services can pull out the handles they need.
//! - `#[derive(FromContext)]` builds a service by resolving each of its
//!   fields from a context.
//!
//! Generated code refers to `crate::FromRef`, so the consuming crate must
//! re-export the trait at its root.

use proc_macro::TokenStream;

mod context;
mod fields;
mod from_context;

/// Derive `FromRef<Self>` for the type of every named field.
///
/// Fields must be `Clone`; extraction clones the handle out of the context.
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub store: AppStore,
///     pub config: AppConfig,
/// }
///
/// // impl FromRef<Context> for AppStore { ... }
/// // impl FromRef<Context> for AppConfig { ... }
/// ```
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    context::derive_context_impl(input)
}

/// Derive `FromRef<Context>` for a service whose fields all resolve from
/// the context.
///
/// The context type defaults to `Context`. Override it with
/// `#[from_context(Context = "path::to::Ctx")]`.
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct PaperService {
///     store: AppStore,
///     config: AppConfig,
/// }
///
/// let service = PaperService::from_ref(&ctx);
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    from_context::derive_from_context_impl(input)
}
