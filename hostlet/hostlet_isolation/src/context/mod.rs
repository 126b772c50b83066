//! Guest class resolution.
//!
//! The host registers guest factories once in a shared [`GuestRegistry`].
//! Each session gets its own [`LoadContext`] parented to that registry,
//! holding the classes its module packages ([`PackagedClasses`]).

mod load_context;
mod packaged;
mod registry;

pub use load_context::LoadContext;
pub use packaged::PackagedClasses;
pub use registry::GuestRegistry;
