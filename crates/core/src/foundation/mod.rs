pub mod marker;
pub mod traits;

pub use marker::Marker;
pub use traits::{ResolveScoped, ResolveSingleton, ResolveTransient};
