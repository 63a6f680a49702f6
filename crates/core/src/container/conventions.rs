use crate::config::AutoResolveConfig;
use crate::container::binding::ServiceBinder;
use crate::container::descriptor::ServiceDescriptor;
use crate::discovery::classifier::Classifier;
use crate::discovery::descriptor::TypeKey;
use crate::discovery::report::ScanReport;
use crate::discovery::universe::TypeUniverse;
use crate::errors::{CoreError, Diagnostic};
use crate::foundation::Marker;
use serde::Serialize;

/// Outcome of applying a scan report to a container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmitSummary {
    /// Bindings added to the container
    pub added: usize,
    /// Bindings skipped because their key was already registered
    pub skipped: usize,
}

/// Discovers marker-carrying types and registers them with a container
#[derive(Debug, Clone, Default)]
pub struct AutoResolver {
    config: AutoResolveConfig,
}

impl AutoResolver {
    pub fn new(config: AutoResolveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutoResolveConfig {
        &self.config
    }

    /// Load the universe and classify it for every marker
    pub fn scan<U>(&self, universe: &U) -> Result<ScanReport, CoreError>
    where
        U: TypeUniverse + ?Sized,
    {
        let loaded = universe.load()?;

        tracing::info!(
            "Scanning {} types from {} modules for auto-resolvable services",
            loaded.len(),
            loaded.modules().len()
        );

        let mut report = ScanReport {
            modules: loaded.modules().to_vec(),
            type_count: loaded.len(),
            ..Default::default()
        };

        for unresolved in loaded.unresolved() {
            let error = unresolved.to_error();
            if self.config.fail_on_unresolved_module {
                return Err(error);
            }
            tracing::warn!("{}", error);
            report.diagnostics.push(Diagnostic::from(&error));
            report.unresolved_modules.push(unresolved.clone());
        }

        let classifier = Classifier::new(&loaded, self.config.strictness);
        for marker in Marker::ALL {
            let classification = classifier.classify(marker)?;
            tracing::info!(
                "Discovered {} {} bindings",
                classification.bindings.len(),
                marker
            );
            report.absorb(classification);
        }

        Ok(report)
    }

    /// Add every binding of `report` that is not already registered.
    ///
    /// Required bindings are checked first, so a failing check leaves
    /// `binder` untouched.
    pub fn emit<B>(&self, report: &ScanReport, binder: &mut B) -> Result<EmitSummary, CoreError>
    where
        B: ServiceBinder + ?Sized,
    {
        for required in &self.config.required_bindings {
            let key = TypeKey::new(required.as_str());
            if !binder.contains(&key) && report.binding(&key).is_none() {
                return Err(CoreError::RequiredBindingMissing {
                    service_type: required.clone(),
                });
            }
        }

        let mut summary = EmitSummary::default();

        for binding in &report.bindings {
            if binder.try_add(ServiceDescriptor::from_binding(binding)) {
                summary.added += 1;
            } else {
                tracing::debug!(
                    "Keeping existing registration for '{}'; skipped {} binding to '{}'",
                    binding.key,
                    binding.marker,
                    binding.implementation
                );
                summary.skipped += 1;
            }
        }

        tracing::info!(
            "Auto-resolve registered {} services ({} already registered)",
            summary.added,
            summary.skipped
        );

        Ok(summary)
    }

    /// Scan `universe` and apply the result to `binder`
    pub fn apply<U, B>(&self, universe: &U, binder: &mut B) -> Result<ScanReport, CoreError>
    where
        U: TypeUniverse + ?Sized,
        B: ServiceBinder + ?Sized,
    {
        let report = self.scan(universe)?;
        self.emit(&report, binder)?;
        Ok(report)
    }
}

/// Extends any container with auto-discovered bindings
pub trait AutoResolveExt: ServiceBinder {
    /// Register every marker-carrying type of `universe` with the default configuration
    fn add_auto_resolver<U>(&mut self, universe: &U) -> Result<&mut Self, CoreError>
    where
        U: TypeUniverse + ?Sized,
    {
        self.add_auto_resolver_with(universe, &AutoResolveConfig::default())
    }

    /// Register every marker-carrying type of `universe`
    fn add_auto_resolver_with<U>(
        &mut self,
        universe: &U,
        config: &AutoResolveConfig,
    ) -> Result<&mut Self, CoreError>
    where
        U: TypeUniverse + ?Sized,
    {
        AutoResolver::new(config.clone()).apply(universe, self)?;
        Ok(self)
    }
}

impl<B: ServiceBinder> AutoResolveExt for B {}
