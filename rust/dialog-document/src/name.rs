use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A prefixed, namespace-qualified node name.
///
/// Namespace nodes use this in a degenerate form: `local_name` holds the
/// declared prefix (empty for a default namespace declaration), `prefix` is
/// empty and `namespace_uri` holds the URI being bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QualifiedName {
    /// The prefix as written in the document, possibly empty
    pub prefix: String,
    /// The local part of the name
    pub local_name: String,
    /// The namespace URI the name belongs to, possibly empty
    pub namespace_uri: String,
}

impl QualifiedName {
    /// Creates a fully specified name.
    pub fn new(
        prefix: impl Into<String>,
        local_name: impl Into<String>,
        namespace_uri: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            local_name: local_name.into(),
            namespace_uri: namespace_uri.into(),
        }
    }

    /// Creates a name with no prefix and no namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self::new("", local_name, "")
    }

    /// Creates a name in the `xml` namespace, e.g. `xml:base`.
    pub fn xml(local_name: impl Into<String>) -> Self {
        Self::new("xml", local_name, XML_NAMESPACE)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        QualifiedName::local(value)
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{}:{}", self.prefix, self.local_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_prefixed_and_unprefixed_names() {
        assert_eq!(QualifiedName::local("a").to_string(), "a");
        assert_eq!(QualifiedName::xml("base").to_string(), "xml:base");
    }

    #[test]
    fn it_round_trips_through_json() -> anyhow::Result<()> {
        let name = QualifiedName::new("p", "item", "urn:example");
        let json = serde_json::to_string(&name)?;
        assert_eq!(serde_json::from_str::<QualifiedName>(&json)?, name);
        Ok(())
    }
}
