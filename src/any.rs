use crate::any_value::{AnyVisitable, ConversionSet, DataVisitable, Slot, Visitable};
use crate::error::AnyError;
use crate::type_list::{Filter, Filtered};
use crate::views::{MutableView, ViewList};
use crate::{Shared, TypeIndex};
use std::fmt;

/// A container holding a value of any type.
///
/// The value can be retrieved as its own type or as any view the type declares
/// through [`AnyVisitable`]: numeric conversions, base types, the pointee of a
/// reference or shared pointer. Cloning an `Any` aliases the stored value
/// rather than copying it.
///
/// # Examples
///
/// ```
/// use sovran_any::{Any, AnyError};
///
/// let any = Any::new(5i32);
/// assert_eq!(any.get::<i32>()?, 5);
/// assert_eq!(any.get::<f64>()?, 5.0);
///
/// any.with_mut(|value: &mut i32| *value += 1)?;
/// assert_eq!(any.get::<i64>()?, 6);
///
/// assert!(matches!(any.get::<String>(), Err(AnyError::TypeMismatch { .. })));
/// assert_eq!(any.try_get::<String>(), None);
/// # Ok::<(), AnyError>(())
/// ```
#[derive(Clone, Default)]
pub struct Any {
    data: Option<Slot>,
}

impl Any {
    /// Creates a container holding `value`
    pub fn new<T: AnyVisitable>(value: T) -> Self {
        let mut any = Self::default();
        any.set(value);
        any
    }

    /// Creates a container holding `value` with the explicit view list `L`.
    ///
    /// Use this for types without an [`AnyVisitable`] implementation.
    pub fn with_views<T, L>(value: T) -> Self
    where
        T: Send + Sync + 'static,
        L: ViewList<T> + Filter<MutableView>,
        Filtered<L, MutableView>: ViewList<T>,
    {
        let mut any = Self::default();
        any.set_with_views::<T, L>(value);
        any
    }

    /// Creates a container holding a custom storage adapter
    pub fn from_visitable<V: Visitable>(storage: V) -> Self {
        let mut any = Self::default();
        any.set_visitable(storage);
        any
    }

    pub(crate) fn from_slot(slot: Slot) -> Self {
        Self { data: Some(slot) }
    }

    /// Replaces the held value.
    ///
    /// The previous value is released once no other alias refers to it.
    pub fn set<T: AnyVisitable>(&mut self, value: T) -> &mut Self {
        self.set_visitable(value.into_visitable())
    }

    /// Replaces the held value, storing it with the explicit view list `L`
    pub fn set_with_views<T, L>(&mut self, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
        L: ViewList<T> + Filter<MutableView>,
        Filtered<L, MutableView>: ViewList<T>,
    {
        self.set_visitable(DataVisitable::<T, Filtered<L, MutableView>, L>::new(value))
    }

    /// Replaces the held value with a custom storage adapter
    pub fn set_visitable<V: Visitable>(&mut self, storage: V) -> &mut Self {
        let slot = Slot::new(storage);
        tracing::trace!(stored = %slot.type_index(), "storing value");
        self.data = Some(slot);
        self
    }

    /// Makes this container alias the value held by `other`
    pub fn set_reference(&mut self, other: &Any) -> &mut Self {
        self.data = other.data.clone();
        self
    }

    fn slot(&self) -> Result<&Slot, AnyError> {
        self.data.as_ref().ok_or(AnyError::Empty)
    }

    /// Returns a copy of the value viewed as a `T`.
    ///
    /// `T` may be the stored type, a declared view of it, a conversion target,
    /// a [`Shared`] handle to any of those, or `Any` itself.
    ///
    /// # Errors
    ///
    /// - Returns `AnyError::Empty` if the container holds no value
    /// - Returns `AnyError::TypeMismatch` if the value has no `T` view
    /// - Returns `AnyError::LockError` if the value is mutably borrowed elsewhere
    pub fn get<T: Clone + 'static>(&self) -> Result<T, AnyError> {
        let slot = self.slot()?;
        if let Some(this) = (self as &dyn std::any::Any).downcast_ref::<T>() {
            return Ok(this.clone());
        }
        slot.extract::<T>()
    }

    /// Like [`get`](Self::get), but returns `None` instead of an error
    pub fn try_get<T: Clone + 'static>(&self) -> Option<T> {
        self.get().ok()
    }

    /// Runs `f` with a shared reference to the value viewed as a `T`
    ///
    /// # Errors
    ///
    /// - Returns `AnyError::Empty` if the container holds no value
    /// - Returns `AnyError::TypeMismatch` if the value has no `T` reference view
    /// - Returns `AnyError::LockError` if the value is mutably borrowed elsewhere
    pub fn with<T: 'static, F, R>(&self, f: F) -> Result<R, AnyError>
    where
        F: FnOnce(&T) -> R,
    {
        self.slot()?.visit(f)
    }

    /// Runs `f` with a mutable reference to the value viewed as a `T`.
    ///
    /// Mutation is visible through every alias of the value.
    ///
    /// # Errors
    ///
    /// - Returns `AnyError::Empty` if the container holds no value
    /// - Returns `AnyError::TypeMismatch` if the value has no mutable `T` view
    /// - Returns `AnyError::LockError` if the value is borrowed elsewhere
    pub fn with_mut<T: 'static, F, R>(&self, f: F) -> Result<R, AnyError>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.slot()?.visit_mut(f)
    }

    pub fn try_with<T: 'static, F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        self.with(f).ok()
    }

    pub fn try_with_mut<T: 'static, F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.with_mut(f).ok()
    }

    /// Returns a handle to the value viewed as a `T`, or `None` if it has no such view.
    ///
    /// The handle shares ownership of the whole stored value.
    pub fn get_shared<T: 'static>(&self) -> Option<Shared<T>> {
        let slot = self.data.as_ref()?;
        if slot.supports::<T>() {
            Some(slot.share())
        } else {
            None
        }
    }

    /// The type of the stored value, or `()` when empty
    pub fn type_index(&self) -> TypeIndex {
        self.data
            .as_ref()
            .map_or_else(TypeIndex::void, Slot::type_index)
    }

    pub fn has_value(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Drops this container's reference to the value
    pub fn reset(&mut self) {
        self.data = None;
    }

    /// The view types the stored value supports
    pub fn conversion_set(&self) -> Result<ConversionSet, AnyError> {
        self.slot()?.conversion_set()
    }

    /// Whether both containers alias the same value
    pub fn ptr_eq(&self, other: &Any) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<T: AnyVisitable> From<T> for Any {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(slot) => write!(f, "Any({})", slot.type_index()),
            None => f.write_str("Any(<empty>)"),
        }
    }
}

/// Creates an `Any` holding `value`
pub fn make_any<T: AnyVisitable>(value: T) -> Any {
    Any::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{type_list, ConstRef, Ref};
    use std::sync::Arc;

    #[test]
    fn test_empty_container() {
        let any = Any::default();
        assert!(any.is_empty());
        assert!(!any.has_value());
        assert_eq!(any.type_index(), TypeIndex::void());
        assert_eq!(any.get::<i32>(), Err(AnyError::Empty));
        assert_eq!(any.get::<Any>().err(), Some(AnyError::Empty));
        assert_eq!(any.with(|_: &i32| ()), Err(AnyError::Empty));
        assert_eq!(any.try_get::<i32>(), None);
        assert!(any.get_shared::<i32>().is_none());
        assert_eq!(format!("{:?}", any), "Any(<empty>)");
    }

    #[test]
    fn test_reference_mutation_is_visible() -> Result<(), AnyError> {
        let any = Any::new(3usize);
        any.with_mut(|value: &mut usize| *value = 4)?;
        assert_eq!(any.with(|value: &usize| *value)?, 4);
        Ok(())
    }

    #[test]
    fn test_set_replaces_value_and_type() -> Result<(), AnyError> {
        let mut any = Any::new(1i8);
        assert_eq!(any.type_index(), TypeIndex::of::<i8>());

        any.set(String::from("text"));
        assert_eq!(any.type_index(), TypeIndex::of::<String>());
        assert_eq!(any.get::<String>()?, "text");
        assert!(any.get::<i8>().is_err());
        Ok(())
    }

    #[test]
    fn test_set_does_not_affect_old_aliases() -> Result<(), AnyError> {
        let mut a = Any::new(1u32);
        let b = a.clone();
        a.set(2u32);
        assert_eq!(a.get::<u32>()?, 2);
        assert_eq!(b.get::<u32>()?, 1);
        Ok(())
    }

    #[test]
    fn test_reset() {
        let mut any = Any::new(true);
        assert!(any.has_value());
        any.reset();
        assert!(any.is_empty());
    }

    #[test]
    fn test_get_any_returns_alias() -> Result<(), AnyError> {
        let any = Any::new(10i16);
        let alias = any.get::<Any>()?;
        assert!(alias.ptr_eq(&any));
        Ok(())
    }

    #[test]
    fn test_get_shared_handle_by_value() -> Result<(), AnyError> {
        let any = Any::new(vec![1, 2, 3]);
        let handle = any.get::<Shared<Vec<i32>>>()?;
        handle.with_mut(|values| values.push(4))?;
        assert_eq!(any.get::<Vec<i32>>()?, vec![1, 2, 3, 4]);
        Ok(())
    }

    #[derive(Clone)]
    struct Meters(f64);

    struct Route {
        length: Meters,
        name: String,
    }

    impl AsRef<Meters> for Route {
        fn as_ref(&self) -> &Meters {
            &self.length
        }
    }

    impl AsMut<Meters> for Route {
        fn as_mut(&mut self) -> &mut Meters {
            &mut self.length
        }
    }

    impl AsRef<String> for Route {
        fn as_ref(&self) -> &String {
            &self.name
        }
    }

    #[test]
    fn test_with_views_without_trait_impl() -> Result<(), AnyError> {
        let any = Any::with_views::<Route, type_list![Ref<Meters>, ConstRef<String>]>(Route {
            length: Meters(12.5),
            name: "river".to_string(),
        });

        assert_eq!(any.get::<Meters>()?.0, 12.5);
        assert_eq!(any.get::<String>()?, "river");
        any.with_mut(|meters: &mut Meters| meters.0 = 13.0)?;
        assert_eq!(any.with(|meters: &Meters| meters.0)?, 13.0);

        // the name is const-only
        assert!(matches!(
            any.with_mut(|_: &mut String| ()),
            Err(AnyError::TypeMismatch { .. })
        ));

        let set = any.conversion_set()?;
        assert_eq!(set.mutable.len(), 2);
        assert_eq!(set.constant.len(), 3);
        Ok(())
    }

    #[test]
    fn test_arc_round_trip_aliases_allocation() -> Result<(), AnyError> {
        let shared = Arc::new(String::from("shared"));
        let any = Any::new(Arc::clone(&shared));

        let back = any.get::<Arc<String>>()?;
        assert!(Arc::ptr_eq(&shared, &back));
        assert_eq!(any.get::<String>()?, "shared");
        assert_eq!(any.type_index(), TypeIndex::of::<Arc<String>>());
        Ok(())
    }

    #[test]
    fn test_from_and_make_any() -> Result<(), AnyError> {
        let any: Any = 2.5f32.into();
        assert_eq!(any.get::<f32>()?, 2.5);
        assert_eq!(make_any('x').get::<char>()?, 'x');
        Ok(())
    }
}
