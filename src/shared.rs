use crate::any_value::Slot;
use crate::error::AnyError;
use crate::{Any, TypeIndex};
use std::fmt;
use std::marker::PhantomData;

/// A shared-ownership handle exposing a stored value as a `T`.
///
/// The handle keeps the whole storage alive, even when `T` is only one of the
/// stored value's views (a base type, for example). Clones and the `Any` it was
/// obtained from all alias the same value, so a write through one is visible
/// through all of them. The storage is released when the last alias is dropped.
///
/// ```
/// use sovran_any::{Any, AnyError};
///
/// let any = Any::new(5i32);
/// let handle = any.get_shared::<i32>().unwrap();
/// handle.set(7)?;
/// assert_eq!(any.get::<i32>()?, 7);
///
/// drop(any);
/// assert_eq!(handle.get()?, 7);
/// # Ok::<(), AnyError>(())
/// ```
pub struct Shared<T> {
    slot: Slot,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Shared<T> {
    pub(crate) fn from_slot(slot: Slot) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }

    pub(crate) fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Runs `f` with a shared reference to the value
    ///
    /// # Errors
    ///
    /// - Returns `AnyError::LockError` if the value is mutably borrowed elsewhere
    /// - Returns `AnyError::TypeMismatch` if the value no longer supports `T`
    pub fn with<F, R>(&self, f: F) -> Result<R, AnyError>
    where
        F: FnOnce(&T) -> R,
    {
        self.slot.visit(f)
    }

    /// Runs `f` with a mutable reference to the value
    ///
    /// # Errors
    ///
    /// - Returns `AnyError::LockError` if the value is borrowed elsewhere
    /// - Returns `AnyError::TypeMismatch` if `T` is only available by shared reference
    pub fn with_mut<F, R>(&self, f: F) -> Result<R, AnyError>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.slot.visit_mut(f)
    }

    /// Returns a copy of the value
    pub fn get(&self) -> Result<T, AnyError>
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Overwrites the value in place
    pub fn set(&self, value: T) -> Result<(), AnyError> {
        self.with_mut(|current| *current = value)
    }

    /// The concrete type of the referenced storage
    pub fn type_index(&self) -> TypeIndex {
        self.slot.type_index()
    }

    /// Number of handles (`Any`, `Shared` or stored wrappers) keeping the storage alive
    pub fn use_count(&self) -> usize {
        self.slot.use_count()
    }

    /// Whether both handles refer to the same storage
    pub fn ptr_eq<U: 'static>(&self, other: &Shared<U>) -> bool {
        self.slot.ptr_eq(&other.slot)
    }

    /// An `Any` aliasing the referenced storage
    pub fn to_any(&self) -> Any {
        Any::from_slot(self.slot.clone())
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("view", &TypeIndex::of::<T>())
            .field("stored", &self.slot.type_index())
            .finish()
    }
}

/// Re-exposes the value behind `handle` as a `T`.
///
/// On success the returned handle aliases the same storage as `handle`; the
/// value is neither copied nor sliced. Returns `None` if the value has no `T`
/// view, leaving `handle` untouched.
pub fn visitor_pointer_cast<T: 'static, V: 'static>(handle: &Shared<V>) -> Option<Shared<T>> {
    if handle.slot.supports::<T>() {
        Some(Shared::from_slot(handle.slot.clone()))
    } else {
        None
    }
}
