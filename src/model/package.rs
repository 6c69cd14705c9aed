//! Package source metadata as handed over by the package-manager layer.

use serde::{Deserialize, Serialize};

use super::locator::Locator;

/// A package and where its source code lives.
///
/// `declared` is what upstream metadata states; `processed` is always derived
/// from it by [`Locator::process`]. To change the source location build a new
/// package with [`Package::with_declared`] rather than editing `processed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeclaredPackage")]
pub struct Package {
    /// Package identifier, e.g. `Gem::rails:7.1.0`.
    pub id: String,

    /// Locator as stated by upstream metadata.
    pub declared: Locator,

    /// Machine-derived, normalized locator.
    processed: Locator,
}

/// Serialized form accepted on input; `processed` is never read back.
#[derive(Deserialize)]
struct DeclaredPackage {
    id: String,
    #[serde(default)]
    declared: Locator,
}

impl From<DeclaredPackage> for Package {
    fn from(value: DeclaredPackage) -> Self {
        Package::new(value.id, value.declared)
    }
}

impl Package {
    /// Create a package and derive its processed locator.
    pub fn new(id: impl Into<String>, declared: Locator) -> Self {
        let processed = declared.process();
        Self {
            id: id.into(),
            declared,
            processed,
        }
    }

    /// The normalized locator derived from the declared one.
    pub fn processed(&self) -> &Locator {
        &self.processed
    }

    /// Return a copy with a new declared locator and a recomputed processed one.
    pub fn with_declared(&self, declared: Locator) -> Self {
        Self::new(self.id.clone(), declared)
    }
}
