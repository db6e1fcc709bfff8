//! Requirement edges and the type pair each shape evaluates its target at.

use std::fmt;

use primgen_model::TypeDescriptor;

use crate::NodeId;

/// How a requirement derives the target's type pair from the dependent's
/// `(key, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementShape {
    /// Target at `(key, key)`.
    Key,
    /// Target at `(value, value)`.
    Value,
    /// Target at `(key, value)`.
    Entry,
    /// Target at `(ty, ty)` regardless of the dependent's pair.
    Typed(TypeDescriptor),
    /// Like [`RequirementShape::Typed`], unless `ty` is the very type on the
    /// checked side (`key` when `use_key`, else `value`). In that case the
    /// requirement is trivially satisfied and has no key.
    OptionalTyped { ty: TypeDescriptor, use_key: bool },
}

impl RequirementShape {
    /// Type pair the target is evaluated at, or `None` when the requirement
    /// is trivially satisfied.
    pub fn derive<'a>(
        &'a self,
        key: &'a TypeDescriptor,
        value: &'a TypeDescriptor,
    ) -> Option<(&'a TypeDescriptor, &'a TypeDescriptor)> {
        match self {
            RequirementShape::Key => Some((key, key)),
            RequirementShape::Value => Some((value, value)),
            RequirementShape::Entry => Some((key, value)),
            RequirementShape::Typed(ty) => Some((ty, ty)),
            RequirementShape::OptionalTyped { ty, use_key } => {
                let side = if *use_key { key } else { value };
                if ty == side { None } else { Some((ty, ty)) }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequirementShape::Key => "key",
            RequirementShape::Value => "value",
            RequirementShape::Entry => "entry",
            RequirementShape::Typed(_) => "typed",
            RequirementShape::OptionalTyped { .. } => "optional-typed",
        }
    }
}

impl fmt::Display for RequirementShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementShape::Typed(ty) => write!(f, "typed({ty})"),
            RequirementShape::OptionalTyped { ty, use_key } => {
                let side = if *use_key { "key" } else { "value" };
                write!(f, "optional-typed({ty}, {side})")
            }
            other => f.write_str(other.label()),
        }
    }
}

/// Edge from a dependent node to the node it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementLink {
    pub target: NodeId,
    pub shape: RequirementShape,
}

impl RequirementLink {
    pub fn new(target: NodeId, shape: RequirementShape) -> Self {
        Self { target, shape }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primgen_model::TypeRegistry;

    fn paths(pair: Option<(&TypeDescriptor, &TypeDescriptor)>) -> Option<(String, String)> {
        pair.map(|(k, v)| (k.path().to_string(), v.path().to_string()))
    }

    #[test]
    fn shapes_derive_expected_pairs() {
        let registry = TypeRegistry::with_primitives();
        let int = registry.lookup("int").unwrap();
        let long = registry.lookup("long").unwrap();
        let object = registry.lookup("object").unwrap();
        let pair = |a: &str, b: &str| Some((a.to_string(), b.to_string()));

        assert_eq!(paths(RequirementShape::Key.derive(int, long)), pair("int", "int"));
        assert_eq!(paths(RequirementShape::Value.derive(int, long)), pair("long", "long"));
        assert_eq!(paths(RequirementShape::Entry.derive(int, long)), pair("int", "long"));
        assert_eq!(
            paths(RequirementShape::Typed(object.clone()).derive(int, long)),
            pair("object", "object")
        );
    }

    #[test]
    fn optional_typed_is_trivial_for_the_same_identity() {
        let mut registry = TypeRegistry::with_primitives();
        let int = registry.lookup("int").unwrap().clone();
        let long = registry.lookup("long").unwrap().clone();
        let shadow = registry.register("int").unwrap();

        let on_key = RequirementShape::OptionalTyped {
            ty: int.clone(),
            use_key: true,
        };
        assert_eq!(on_key.derive(&int, &long), None);
        assert!(on_key.derive(&long, &int).is_some());
        // Same path, different identity.
        assert!(on_key.derive(&shadow, &long).is_some());

        let on_value = RequirementShape::OptionalTyped {
            ty: int.clone(),
            use_key: false,
        };
        assert_eq!(on_value.derive(&long, &int), None);
        assert!(on_value.derive(&int, &long).is_some());
    }
}
