//! Provenance ranking for metadata declarations.

use serde::{Deserialize, Serialize};

/// The trust level at which a metadata element was declared.
///
/// Forms a total order: convention inference is the weakest claim, explicit
/// code the strongest. Every builder operation funnels its precedence
/// decision through [`ConfigurationSource::overrides`]; an element's recorded
/// source is only ever raised, never lowered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConfigurationSource {
    /// Inferred by a convention pass.
    Convention,
    /// Declared via an annotation.
    DataAnnotation,
    /// Declared explicitly in code.
    Explicit,
}

impl ConfigurationSource {
    /// Check whether a declaration at this source may create, override or
    /// remove an element whose recorded source is `existing`.
    ///
    /// An absent recorded source never blocks; otherwise the requesting
    /// source must be at least as strong.
    pub fn overrides(self, existing: Option<ConfigurationSource>) -> bool {
        existing.map_or(true, |recorded| self >= recorded)
    }
}

impl std::fmt::Display for ConfigurationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationSource::Convention => write!(f, "convention"),
            ConfigurationSource::DataAnnotation => write!(f, "data annotation"),
            ConfigurationSource::Explicit => write!(f, "explicit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ordering() {
        assert!(ConfigurationSource::Convention < ConfigurationSource::DataAnnotation);
        assert!(ConfigurationSource::DataAnnotation < ConfigurationSource::Explicit);
    }

    #[test]
    fn test_overrides() {
        let convention = ConfigurationSource::Convention;
        let annotation = ConfigurationSource::DataAnnotation;
        let explicit = ConfigurationSource::Explicit;

        assert!(convention.overrides(None));
        assert!(convention.overrides(Some(convention)));
        assert!(!convention.overrides(Some(annotation)));
        assert!(annotation.overrides(Some(convention)));
        assert!(explicit.overrides(Some(explicit)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigurationSource::Convention.to_string(), "convention");
        assert_eq!(
            ConfigurationSource::DataAnnotation.to_string(),
            "data annotation"
        );
        assert_eq!(ConfigurationSource::Explicit.to_string(), "explicit");
    }
}
