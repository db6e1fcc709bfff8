//! Type descriptors and the registry that issues their identities.
//!
//! A [`TypeDescriptor`] is compared by its id, never by its path. Ids are
//! drawn from one process-wide counter, so descriptors from different
//! registries (or clones of one registry) never compare equal. Two
//! descriptors registered under the same path are still different types.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ModelError, Result};

/// Paths of the built-in types, in registration order.
pub const PRIMITIVE_PATHS: [&str; 9] = [
    "boolean", "byte", "short", "char", "int", "long", "float", "double", "object",
];

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u64);

impl TypeId {
    fn fresh() -> Self {
        Self(NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    path: Arc<str>,
}

impl TypeDescriptor {
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Path segment used when building configuration keys.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl std::hash::Hash for TypeDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with [`PRIMITIVE_PATHS`].
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        for path in PRIMITIVE_PATHS {
            registry.types.push(TypeDescriptor {
                id: TypeId::fresh(),
                path: Arc::from(path),
            });
        }
        registry
    }

    /// Registers a new type. Always issues a fresh identity.
    ///
    /// Paths must be non-empty and may not contain `-`, which separates key
    /// segments.
    pub fn register(&mut self, path: impl Into<String>) -> Result<TypeDescriptor> {
        let path = path.into();
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed.contains('-') {
            return Err(ModelError::InvalidTypePath(path));
        }
        let descriptor = TypeDescriptor {
            id: TypeId::fresh(),
            path: Arc::from(trimmed),
        };
        self.types.push(descriptor.clone());
        Ok(descriptor)
    }

    /// First descriptor registered under `path`.
    pub fn lookup(&self, path: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|ty| ty.path() == path)
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.iter().find(|ty| ty.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One concrete `(key, value)` pair. Single-type families use the key for
/// both sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instantiation {
    pub key: TypeDescriptor,
    pub value: TypeDescriptor,
}

impl Instantiation {
    pub fn new(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self { key, value }
    }

    pub fn single(ty: TypeDescriptor) -> Self {
        Self {
            key: ty.clone(),
            value: ty,
        }
    }

    /// Every `(key, value)` pair over `types`, key-major.
    pub fn all(types: &[TypeDescriptor]) -> Vec<Instantiation> {
        let mut pairs = Vec::with_capacity(types.len() * types.len());
        for key in types {
            for value in types {
                pairs.push(Instantiation::new(key.clone(), value.clone()));
            }
        }
        pairs
    }
}

impl fmt::Display for Instantiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_not_structural() {
        let mut registry = TypeRegistry::new();
        let first = registry.register("Object").unwrap();
        let second = registry.register("Object").unwrap();
        assert_eq!(first.path(), second.path());
        assert_ne!(first, second);
        assert_eq!(first, first.clone());
        assert_eq!(registry.lookup("Object"), Some(&first));
    }

    #[test]
    fn registries_never_share_identities() {
        let primitives = TypeRegistry::with_primitives();
        let boolean = primitives.lookup("boolean").unwrap();
        let string = TypeRegistry::new().register("String").unwrap();
        assert_ne!(boolean, &string);
        assert_ne!(
            TypeRegistry::with_primitives().lookup("int"),
            primitives.lookup("int")
        );
        assert_eq!(primitives.get(string.id()), None);
    }

    #[test]
    fn clones_issue_distinct_identities() {
        let original = TypeRegistry::with_primitives();
        let mut left = original.clone();
        let mut right = original.clone();
        assert_eq!(left.lookup("int"), original.lookup("int"));
        let x = left.register("X").unwrap();
        let y = right.register("Y").unwrap();
        assert_ne!(x, y);
        assert_eq!(left.get(x.id()), Some(&x));
        assert_eq!(right.get(x.id()), None);
    }

    #[test]
    fn rejects_separator_in_path() {
        let mut registry = TypeRegistry::new();
        assert_eq!(
            registry.register("int-long"),
            Err(ModelError::InvalidTypePath("int-long".to_string()))
        );
        assert!(registry.register("   ").is_err());
    }

    #[test]
    fn primitives_are_registered_in_order() {
        let registry = TypeRegistry::with_primitives();
        let paths: Vec<&str> = registry.iter().map(TypeDescriptor::path).collect();
        assert_eq!(paths, PRIMITIVE_PATHS);
        let int = registry.lookup("int").unwrap();
        assert_eq!(registry.get(int.id()), Some(int));
    }

    #[test]
    fn all_pairs_are_key_major() {
        let registry = TypeRegistry::with_primitives();
        let int = registry.lookup("int").unwrap().clone();
        let long = registry.lookup("long").unwrap().clone();
        let pairs = Instantiation::all(&[int.clone(), long.clone()]);
        let rendered: Vec<String> = pairs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["int-int", "int-long", "long-int", "long-long"]);
        assert_eq!(Instantiation::single(int.clone()).value, int);
    }
}
