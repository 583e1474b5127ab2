//! Device-level attribution identifier.

/// Synchronous access to the attribution SDK's device identifier.
pub trait AttributionSource: Send + Sync {
    /// Identifier if the SDK has produced one.
    fn attribution_id(&self) -> Option<String>;
}

/// Fixed identifier, used when the identifier is known up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticAttribution {
    id: Option<String>,
}

impl StaticAttribution {
    /// Wrap a known identifier; blank identifiers read as absent.
    #[must_use]
    pub fn new(id: Option<String>) -> Self {
        Self {
            id: id.filter(|value| !value.trim().is_empty()),
        }
    }
}

impl AttributionSource for StaticAttribution {
    fn attribution_id(&self) -> Option<String> {
        self.id.clone()
    }
}
