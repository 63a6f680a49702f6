use crate::container::descriptor::ServiceDescriptor;
use crate::discovery::descriptor::TypeKey;

/// Container operations the auto-resolver relies on
pub trait ServiceBinder {
    /// Add `descriptor` unless its service key is already registered.
    ///
    /// Returns `true` when the descriptor was added.
    fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool;

    /// Check if a registration exists for `service`
    fn contains(&self, service: &TypeKey) -> bool;
}
