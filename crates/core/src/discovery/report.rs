use crate::discovery::classifier::{Classification, RegistrationBinding};
use crate::discovery::descriptor::TypeKey;
use crate::discovery::universe::UnresolvedModule;
use crate::errors::{CoreError, Diagnostic};
use crate::foundation::Marker;
use serde::Serialize;

/// Everything one scan discovered, ready to be emitted into a container
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub modules: Vec<String>,
    pub type_count: usize,
    pub bindings: Vec<RegistrationBinding>,
    pub unresolved_modules: Vec<UnresolvedModule>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanReport {
    /// Fold one marker's classification into the report
    pub fn absorb(&mut self, classification: Classification) {
        self.bindings.extend(classification.bindings);
        self.diagnostics.extend(classification.diagnostics);
    }

    /// Bindings discovered for `marker`
    pub fn bindings_for(&self, marker: Marker) -> impl Iterator<Item = &RegistrationBinding> {
        self.bindings.iter().filter(move |binding| binding.marker == marker)
    }

    /// First binding registered under `key`
    pub fn binding(&self, key: &TypeKey) -> Option<&RegistrationBinding> {
        self.bindings.iter().find(|binding| &binding.key == key)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Render the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
