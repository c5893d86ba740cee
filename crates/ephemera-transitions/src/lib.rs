//! Ephemera — transition choreography.
//!
//! Awaitable fade, dissolve and emerge primitives used between moments. The
//! choreographer only handles timing and opacity/offset; it knows nothing
//! about moments or fragments.

pub mod choreographer;

pub use choreographer::{FadeDirection, TransitionChoreographer, TransitionConfig};
