use serde::{Deserialize, Serialize};

/// The default capacity of the channel between a concurrent axis worker and
/// its consumer.
pub const DEFAULT_CONCURRENT_BUFFER: usize = 64;

/// Settings for a [`DocumentScope`](crate::DocumentScope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// The base URI of the document, used when no `xml:base` attribute is in
    /// scope. Also reported as the system identifier of every node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,

    /// A fixed document number. When absent, one is allocated from a
    /// process-wide counter so that every open document is distinct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<u64>,

    /// How many node keys a concurrent axis may read ahead of its consumer.
    pub concurrent_buffer: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            base_uri: None,
            document_number: None,
            concurrent_buffer: DEFAULT_CONCURRENT_BUFFER,
        }
    }
}

impl NavigationConfig {
    /// Sets the base URI of the document.
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Fixes the document number instead of allocating one.
    pub fn with_document_number(mut self, document_number: u64) -> Self {
        self.document_number = Some(document_number);
        self
    }
}
