use std::any::{type_name, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A process-wide unique identity for a concrete type
///
/// Two indexes compare equal exactly when they were created for the same type.
/// The type name is carried along for diagnostics only and takes no part in
/// comparison or hashing.
#[derive(Clone, Copy)]
pub struct TypeIndex {
    id: TypeId,
    name: &'static str,
}

impl TypeIndex {
    /// Returns the identity of `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The identity reported by an empty container
    pub fn void() -> Self {
        Self::of::<()>()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The compiler-provided name of the type
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeIndex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIndex {}

impl Hash for TypeIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl PartialEq<TypeId> for TypeIndex {
    fn eq(&self, other: &TypeId) -> bool {
        self.id == *other
    }
}

impl fmt::Debug for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIndex({})", self.name)
    }
}

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity() {
        assert_eq!(TypeIndex::of::<i32>(), TypeIndex::of::<i32>());
        assert_ne!(TypeIndex::of::<i32>(), TypeIndex::of::<u32>());
        assert!(TypeIndex::void().is::<()>());
        assert_eq!(TypeIndex::of::<String>(), TypeId::of::<String>());
    }

    #[test]
    fn test_display_uses_type_name() {
        assert_eq!(TypeIndex::of::<i32>().to_string(), "i32");
        assert!(format!("{:?}", TypeIndex::of::<String>()).contains("String"));
    }

    #[test]
    fn test_hash_set_membership() {
        let mut seen = HashSet::new();
        seen.insert(TypeIndex::of::<i32>());
        seen.insert(TypeIndex::of::<i32>());
        seen.insert(TypeIndex::of::<f64>());
        assert_eq!(seen.len(), 2);
    }
}
