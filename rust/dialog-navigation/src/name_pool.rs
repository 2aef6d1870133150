use std::sync::atomic::{AtomicI32, Ordering};

use dashmap::{DashMap, mapref::entry::Entry};
use dialog_document::QualifiedName;
use parking_lot::RwLock;

use crate::NavigationError;

/// An integer allocated for a (prefix, namespace URI, local name) triple.
pub type NameCode = i32;

/// The prefix-independent part of a [`NameCode`], identifying the expanded
/// name (namespace URI, local name).
pub type Fingerprint = i32;

/// An integer allocated for a (prefix, namespace URI) binding.
pub type NamespaceCode = i32;

/// Masks a [`NameCode`] down to its [`Fingerprint`].
pub const FINGERPRINT_MASK: NameCode = 0xfffff;

/// Written after the last namespace code when a caller-supplied buffer is
/// longer than the list of declarations.
pub const NAMESPACE_LIST_END: NamespaceCode = -1;

const PREFIX_SHIFT: u32 = 20;
const PREFIX_MASK: i32 = 0x3ff;
const NAMESPACE_PREFIX_SHIFT: u32 = 16;
const NAMESPACE_URI_MASK: i32 = 0xffff;

// Prefix codes are shared by name codes and namespace codes, so they are
// bounded by the narrower of the two fields.
const PREFIX_LIMIT: i32 = PREFIX_MASK;
const NAMESPACE_URI_LIMIT: i32 = NAMESPACE_URI_MASK;

/// The interning contract used to turn names into integer codes.
///
/// Codes are stable only within one pool instance. Pools are shared between
/// every node of a document (and usually across documents), so
/// implementations must be safe to use from many threads.
///
/// A pool never hands out a code it cannot encode without aliasing another
/// one. Once a field of the encoding is used up, allocating a new name fails
/// with [`NavigationError::NamePoolExhausted`]; names already in the pool
/// keep resolving.
pub trait NamePool: Send + Sync {
    /// Allocates (or finds) the name code for a prefixed expanded name.
    fn allocate(
        &self,
        prefix: &str,
        namespace_uri: &str,
        local_name: &str,
    ) -> Result<NameCode, NavigationError>;

    /// Allocates (or finds) the code of a namespace binding. The result is
    /// never negative, so it cannot collide with [`NAMESPACE_LIST_END`].
    fn allocate_namespace_code(
        &self,
        prefix: &str,
        namespace_uri: &str,
    ) -> Result<NamespaceCode, NavigationError>;

    /// Finds the fingerprint of an expanded name without allocating one.
    fn fingerprint(&self, namespace_uri: &str, local_name: &str) -> Option<Fingerprint>;

    /// The expanded name a fingerprint was allocated for. The prefix of the
    /// returned name is always empty.
    fn expanded_name(&self, fingerprint: Fingerprint) -> Option<QualifiedName>;
}

/// A [`NamePool`] that can be shared freely between threads.
#[derive(Debug)]
pub struct SharedNamePool {
    fingerprints: DashMap<(String, String), Fingerprint>,
    names: RwLock<Vec<(String, String)>>,
    prefixes: DashMap<String, i32>,
    prefix_count: AtomicI32,
    uris: DashMap<String, i32>,
    uri_count: AtomicI32,
}

impl Default for SharedNamePool {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedNamePool {
    /// Creates a pool where the empty prefix and the empty namespace both
    /// have code zero.
    pub fn new() -> Self {
        Self {
            fingerprints: DashMap::new(),
            names: RwLock::new(Vec::new()),
            prefixes: DashMap::from_iter([(String::new(), 0)]),
            prefix_count: AtomicI32::new(1),
            uris: DashMap::from_iter([(String::new(), 0)]),
            uri_count: AtomicI32::new(1),
        }
    }

    fn prefix_code(&self, prefix: &str) -> Result<i32, NavigationError> {
        intern(&self.prefixes, &self.prefix_count, prefix, PREFIX_LIMIT, "prefix")
    }

    fn uri_code(&self, namespace_uri: &str) -> Result<i32, NavigationError> {
        intern(
            &self.uris,
            &self.uri_count,
            namespace_uri,
            NAMESPACE_URI_LIMIT,
            "namespace URI",
        )
    }

    fn allocate_fingerprint(
        &self,
        namespace_uri: &str,
        local_name: &str,
    ) -> Result<Fingerprint, NavigationError> {
        if let Some(fingerprint) = self.fingerprint(namespace_uri, local_name) {
            return Ok(fingerprint);
        }
        match self
            .fingerprints
            .entry((namespace_uri.to_owned(), local_name.to_owned()))
        {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let mut names = self.names.write();
                let fingerprint = Fingerprint::try_from(names.len())
                    .ok()
                    .filter(|fingerprint| *fingerprint <= FINGERPRINT_MASK)
                    .ok_or(NavigationError::NamePoolExhausted {
                        field: "fingerprint",
                    })?;
                names.push(entry.key().clone());
                entry.insert(fingerprint);
                Ok(fingerprint)
            }
        }
    }
}

/// Finds the code of `value`, or hands out the next one while it is at most
/// `limit`.
fn intern(
    codes: &DashMap<String, i32>,
    count: &AtomicI32,
    value: &str,
    limit: i32,
    field: &'static str,
) -> Result<i32, NavigationError> {
    if let Some(code) = codes.get(value) {
        return Ok(*code);
    }
    match codes.entry(value.to_owned()) {
        Entry::Occupied(entry) => Ok(*entry.get()),
        Entry::Vacant(entry) => {
            let code = count
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
                    (next <= limit).then_some(next + 1)
                })
                .map_err(|_| NavigationError::NamePoolExhausted { field })?;
            entry.insert(code);
            Ok(code)
        }
    }
}

impl NamePool for SharedNamePool {
    fn allocate(
        &self,
        prefix: &str,
        namespace_uri: &str,
        local_name: &str,
    ) -> Result<NameCode, NavigationError> {
        let fingerprint = self.allocate_fingerprint(namespace_uri, local_name)?;
        let prefix = self.prefix_code(prefix)?;
        Ok((prefix << PREFIX_SHIFT) | fingerprint)
    }

    fn allocate_namespace_code(
        &self,
        prefix: &str,
        namespace_uri: &str,
    ) -> Result<NamespaceCode, NavigationError> {
        let prefix = self.prefix_code(prefix)?;
        let uri = self.uri_code(namespace_uri)?;
        Ok((prefix << NAMESPACE_PREFIX_SHIFT) | uri)
    }

    fn fingerprint(&self, namespace_uri: &str, local_name: &str) -> Option<Fingerprint> {
        self.fingerprints
            .get(&(namespace_uri.to_owned(), local_name.to_owned()))
            .map(|fingerprint| *fingerprint)
    }

    fn expanded_name(&self, fingerprint: Fingerprint) -> Option<QualifiedName> {
        let index = usize::try_from(fingerprint).ok()?;
        self.names
            .read()
            .get(index)
            .map(|(namespace_uri, local_name)| {
                QualifiedName::new("", local_name.clone(), namespace_uri.clone())
            })
    }
}
