#![forbid(unsafe_code)]

//! Construction-time configuration for observable decorators.

/// Configuration fixed when a decorator is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObservableConfig {
    /// Report `clear()` as a single multi-item `Remove` carrying every
    /// cleared item, instead of an opaque `Reset`. Observers that only
    /// understand incremental removal keep working across clears.
    pub treat_clear_as_remove: bool,
}

impl ObservableConfig {
    /// Default configuration: clears are reported as `Reset`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            treat_clear_as_remove: false,
        }
    }

    /// Configuration reporting clears as `Remove`.
    #[must_use]
    pub const fn clear_as_remove() -> Self {
        Self {
            treat_clear_as_remove: true,
        }
    }

    /// Set whether clears are reported as `Remove`.
    #[must_use]
    pub const fn with_treat_clear_as_remove(mut self, enabled: bool) -> Self {
        self.treat_clear_as_remove = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reports_reset() {
        assert!(!ObservableConfig::default().treat_clear_as_remove);
        assert_eq!(ObservableConfig::new(), ObservableConfig::default());
    }

    #[test]
    fn builder_toggles() {
        let config = ObservableConfig::new().with_treat_clear_as_remove(true);
        assert_eq!(config, ObservableConfig::clear_as_remove());
        assert!(!config.with_treat_clear_as_remove(false).treat_clear_as_remove);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_use_defaults() {
        let config: ObservableConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ObservableConfig::default());
        let json = serde_json::to_string(&ObservableConfig::clear_as_remove()).unwrap();
        assert_eq!(json, r#"{"treat_clear_as_remove":true}"#);
    }
}
