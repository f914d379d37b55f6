use crate::error::AnyError;
use crate::type_list::Nil;
use crate::views::{
    share_as, view_reference_targets, view_targets, visit_views, visit_views_mut, NumericViews,
    ViewList,
};
use crate::{Shared, TypeIndex};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A storage adapter: owns a value and answers view requests for it.
///
/// `accept` and `accept_mut` are the two halves of the visitor protocol. The
/// caller names the type it wants by `TypeId` and the adapter calls `visitor`
/// with a reference of exactly that type, returning whether it did so.
/// `convert` produces views that only exist by value, such as numeric
/// conversions and aliasing [`Shared`] handles created from `slot`.
///
/// Adapters that reach into other storage report that storage's errors
/// (`AnyError::LockError` in particular) instead of answering `false`.
pub trait Visitable: Send + Sync + 'static {
    /// The concrete type that was stored
    fn visitable_type(&self) -> TypeIndex;

    fn accept(&self, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> Result<bool, AnyError>;

    fn accept_mut(
        &mut self,
        target: TypeId,
        visitor: &mut dyn FnMut(&mut dyn Any),
    ) -> Result<bool, AnyError>;

    fn convert(&self, _target: TypeId, _slot: &Slot) -> Result<Option<Box<dyn Any>>, AnyError> {
        Ok(None)
    }

    /// The view types this adapter supports
    fn conversion_set(&self) -> ConversionSet {
        ConversionSet::identity(self.visitable_type())
    }

    /// The types `accept` can borrow the value as.
    ///
    /// Fixed for the lifetime of the adapter; recorded once when it is stored.
    fn reference_views(&self) -> Vec<TypeIndex> {
        vec![self.visitable_type()]
    }
}

/// The view types a stored value can be retrieved as.
///
/// `mutable` lists the views reachable through a mutable borrow, `constant`
/// the ones reachable through a shared borrow. The stored type itself is
/// always the first entry of both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSet {
    pub mutable: Vec<TypeIndex>,
    pub constant: Vec<TypeIndex>,
}

impl ConversionSet {
    pub fn identity(index: TypeIndex) -> Self {
        Self {
            mutable: vec![index],
            constant: vec![index],
        }
    }

    pub fn contains(&self, index: TypeIndex) -> bool {
        self.constant.contains(&index) || self.mutable.contains(&index)
    }
}

pub(crate) struct Holder<V: ?Sized> {
    type_index: TypeIndex,
    reference_views: Vec<TypeIndex>,
    value: RwLock<V>,
}

/// Reference-counted storage shared by every `Any` and `Shared` aliasing one value
#[derive(Clone)]
pub struct Slot {
    inner: Arc<Holder<dyn Visitable>>,
}

impl Slot {
    pub(crate) fn new<V: Visitable>(value: V) -> Self {
        let inner: Arc<Holder<dyn Visitable>> = Arc::new(Holder {
            type_index: value.visitable_type(),
            reference_views: value.reference_views(),
            value: RwLock::new(value),
        });
        Self { inner }
    }

    /// The concrete type held by this slot
    pub fn type_index(&self) -> TypeIndex {
        self.inner.type_index
    }

    /// Creates a handle exposing this slot's value as a `T`.
    ///
    /// The handle is not checked here; accessing it fails with
    /// `AnyError::TypeMismatch` if the value has no `T` view.
    pub fn share<T: 'static>(&self) -> Shared<T> {
        Shared::from_slot(self.clone())
    }

    pub(crate) fn use_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub(crate) fn ptr_eq(&self, other: &Slot) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, dyn Visitable>, AnyError> {
        self.inner.value.try_read().map_err(|_| AnyError::LockError)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, dyn Visitable>, AnyError> {
        self.inner.value.try_write().map_err(|_| AnyError::LockError)
    }

    pub(crate) fn mismatch<T: ?Sized + 'static>(&self) -> AnyError {
        let from = self.type_index();
        let to = TypeIndex::of::<T>();
        tracing::debug!(%from, %to, "value does not support the requested view");
        AnyError::TypeMismatch { from, to }
    }

    /// Whether the value can be borrowed as a `T`, without taking the lock
    pub(crate) fn supports<T: 'static>(&self) -> bool {
        self.inner.reference_views.contains(&TypeIndex::of::<T>())
    }

    pub(crate) fn visit<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, AnyError> {
        let guard = self.read()?;
        let mut f = Some(f);
        let mut out = None;
        guard.accept(TypeId::of::<T>(), &mut |value: &dyn Any| {
            if let Some(value) = value.downcast_ref::<T>() {
                out = f.take().map(|f| f(value));
            }
        })?;
        out.ok_or_else(|| self.mismatch::<T>())
    }

    pub(crate) fn visit_mut<T: 'static, R>(
        &self,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, AnyError> {
        let mut guard = self.write()?;
        let mut f = Some(f);
        let mut out = None;
        guard.accept_mut(TypeId::of::<T>(), &mut |value: &mut dyn Any| {
            if let Some(value) = value.downcast_mut::<T>() {
                out = f.take().map(|f| f(value));
            }
        })?;
        out.ok_or_else(|| self.mismatch::<T>())
    }

    /// Copies the value out as a `T`, through a reference view or a conversion
    pub(crate) fn extract<T: Clone + 'static>(&self) -> Result<T, AnyError> {
        let guard = self.read()?;
        let target = TypeId::of::<T>();
        let mut out: Option<T> = None;
        guard.accept(target, &mut |value: &dyn Any| {
            out = value.downcast_ref::<T>().cloned();
        })?;
        if out.is_none() {
            out = guard
                .convert(target, self)?
                .and_then(|value| value.downcast::<T>().ok())
                .map(|value| *value);
        }
        out.ok_or_else(|| self.mismatch::<T>())
    }

    pub(crate) fn conversion_set(&self) -> Result<ConversionSet, AnyError> {
        Ok(self.read()?.conversion_set())
    }
}

/// Adapter embedding a `T`, with mutable views `V` and const views `C`
pub struct DataVisitable<T, V = Nil, C = Nil> {
    value: T,
    _views: PhantomData<fn() -> (V, C)>,
}

impl<T, V, C> DataVisitable<T, V, C> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            _views: PhantomData,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, V, C> Visitable for DataVisitable<T, V, C>
where
    T: Send + Sync + 'static,
    V: ViewList<T>,
    C: ViewList<T>,
{
    fn visitable_type(&self) -> TypeIndex {
        TypeIndex::of::<T>()
    }

    fn accept(&self, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> Result<bool, AnyError> {
        Ok(visit_views::<T, C>(&self.value, target, visitor))
    }

    fn accept_mut(
        &mut self,
        target: TypeId,
        visitor: &mut dyn FnMut(&mut dyn Any),
    ) -> Result<bool, AnyError> {
        Ok(visit_views_mut::<T, V>(&mut self.value, target, visitor))
    }

    fn convert(&self, target: TypeId, slot: &Slot) -> Result<Option<Box<dyn Any>>, AnyError> {
        Ok(share_as::<T>(target, slot).or_else(|| C::convert(&self.value, target, slot)))
    }

    fn conversion_set(&self) -> ConversionSet {
        ConversionSet {
            mutable: view_targets::<T, V>(),
            constant: view_targets::<T, C>(),
        }
    }

    fn reference_views(&self) -> Vec<TypeIndex> {
        view_reference_targets::<T, C>()
    }
}

/// Views of an adapter wrapping a `T`: the wrapper type, then `T` and its views
fn wrapper_conversion_set<T: AnyVisitable>(wrapper: TypeIndex) -> ConversionSet {
    let mut mutable = vec![wrapper];
    mutable.extend(view_targets::<T, T::Views>());
    let mut constant = vec![wrapper];
    constant.extend(view_targets::<T, T::ConstViews>());
    ConversionSet { mutable, constant }
}

fn wrapper_reference_views<T: AnyVisitable>(wrapper: TypeIndex) -> Vec<TypeIndex> {
    let mut views = vec![wrapper];
    views.extend(view_reference_targets::<T, T::ConstViews>());
    views
}

/// Adapter for a stored [`Shared<T>`]: a reference to another value's storage.
///
/// Retrieving `Shared<T>` yields the handle itself; retrieving `T` or one of
/// `T`'s views reaches into the referenced storage.
pub struct ReferenceVisitable<T> {
    handle: Shared<T>,
}

impl<T: AnyVisitable> Visitable for ReferenceVisitable<T> {
    fn visitable_type(&self) -> TypeIndex {
        TypeIndex::of::<Shared<T>>()
    }

    fn accept(&self, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> Result<bool, AnyError> {
        if target == TypeId::of::<Shared<T>>() {
            visitor(&self.handle as &dyn Any);
            return Ok(true);
        }
        self.handle
            .slot()
            .visit(|pointee: &T| visit_views::<T, T::ConstViews>(pointee, target, visitor))
    }

    fn accept_mut(
        &mut self,
        target: TypeId,
        visitor: &mut dyn FnMut(&mut dyn Any),
    ) -> Result<bool, AnyError> {
        if target == TypeId::of::<Shared<T>>() {
            visitor(&mut self.handle as &mut dyn Any);
            return Ok(true);
        }
        self.handle
            .slot()
            .visit_mut(|pointee: &mut T| visit_views_mut::<T, T::Views>(pointee, target, visitor))
    }

    fn convert(&self, target: TypeId, slot: &Slot) -> Result<Option<Box<dyn Any>>, AnyError> {
        self.handle
            .slot()
            .visit(|pointee: &T| <T::ConstViews as ViewList<T>>::convert(pointee, target, slot))
    }

    fn conversion_set(&self) -> ConversionSet {
        wrapper_conversion_set::<T>(self.visitable_type())
    }

    fn reference_views(&self) -> Vec<TypeIndex> {
        wrapper_reference_views::<T>(self.visitable_type())
    }
}

/// Adapter for a stored `Arc<T>`.
///
/// Retrieving `Arc<T>` clones the handle, so it always points at the same
/// allocation. The pointee is available by shared reference; it is only
/// available mutably while this is the sole owner of the `Arc`.
pub struct SharedVisitable<T> {
    value: Arc<T>,
}

impl<T: AnyVisitable> Visitable for SharedVisitable<T> {
    fn visitable_type(&self) -> TypeIndex {
        TypeIndex::of::<Arc<T>>()
    }

    fn accept(&self, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> Result<bool, AnyError> {
        if target == TypeId::of::<Arc<T>>() {
            visitor(&self.value as &dyn Any);
            return Ok(true);
        }
        Ok(visit_views::<T, T::ConstViews>(&*self.value, target, visitor))
    }

    fn accept_mut(
        &mut self,
        target: TypeId,
        visitor: &mut dyn FnMut(&mut dyn Any),
    ) -> Result<bool, AnyError> {
        if target == TypeId::of::<Arc<T>>() {
            visitor(&mut self.value as &mut dyn Any);
            return Ok(true);
        }
        Ok(match Arc::get_mut(&mut self.value) {
            Some(pointee) => visit_views_mut::<T, T::Views>(pointee, target, visitor),
            None => false,
        })
    }

    fn convert(&self, target: TypeId, slot: &Slot) -> Result<Option<Box<dyn Any>>, AnyError> {
        Ok(share_as::<T>(target, slot)
            .or_else(|| <T::ConstViews as ViewList<T>>::convert(&*self.value, target, slot)))
    }

    fn conversion_set(&self) -> ConversionSet {
        wrapper_conversion_set::<T>(self.visitable_type())
    }

    fn reference_views(&self) -> Vec<TypeIndex> {
        wrapper_reference_views::<T>(self.visitable_type())
    }
}

/// Declares how a type is stored in an [`Any`](crate::Any) and which views it supports.
///
/// Most types implement this through [`any_visitable!`](crate::any_visitable).
pub trait AnyVisitable: Sized + Send + Sync + 'static {
    /// Views reachable through `&mut Self`
    type Views: ViewList<Self>;
    /// Views reachable through `&Self`
    type ConstViews: ViewList<Self>;
    type Storage: Visitable;

    fn into_visitable(self) -> Self::Storage;
}

/// Implements [`AnyVisitable`] for plain types.
///
/// ```
/// use sovran_any::{any_visitable, Any, Ref};
///
/// #[derive(Clone)]
/// struct Animal { legs: u8 }
///
/// #[derive(Clone)]
/// struct Dog { animal: Animal }
///
/// impl AsRef<Animal> for Dog {
///     fn as_ref(&self) -> &Animal { &self.animal }
/// }
/// impl AsMut<Animal> for Dog {
///     fn as_mut(&mut self) -> &mut Animal { &mut self.animal }
/// }
///
/// any_visitable!(Animal);
/// any_visitable!(Dog: [Ref<Animal>]);
///
/// let any = Any::new(Dog { animal: Animal { legs: 4 } });
/// assert_eq!(any.with(|animal: &Animal| animal.legs).unwrap(), 4);
/// ```
#[macro_export]
macro_rules! any_visitable {
    ($ty:ty: [$($view:ty),* $(,)?]) => {
        impl $crate::AnyVisitable for $ty {
            type Views = $crate::type_list::Filtered<$crate::type_list![$($view),*], $crate::MutableView>;
            type ConstViews = $crate::type_list![$($view),*];
            type Storage = $crate::DataVisitable<$ty, Self::Views, Self::ConstViews>;

            fn into_visitable(self) -> Self::Storage {
                $crate::DataVisitable::new(self)
            }
        }
    };
    ($($ty:ty),+ $(,)?) => {
        $( $crate::any_visitable!($ty: []); )+
    };
}

macro_rules! impl_scalar_visitable {
    ($($ty:ty),*) => {
        $(
            impl AnyVisitable for $ty {
                type Views = NumericViews;
                type ConstViews = NumericViews;
                type Storage = DataVisitable<$ty, NumericViews, NumericViews>;

                fn into_visitable(self) -> Self::Storage {
                    DataVisitable::new(self)
                }
            }
        )*
    };
}

impl_scalar_visitable!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

crate::any_visitable!(bool, char, String, Box<str>);

/// String literals are captured as an owned `String`
impl AnyVisitable for &'static str {
    type Views = Nil;
    type ConstViews = Nil;
    type Storage = DataVisitable<String>;

    fn into_visitable(self) -> Self::Storage {
        DataVisitable::new(self.to_owned())
    }
}

impl<T: Send + Sync + 'static> AnyVisitable for Vec<T> {
    type Views = Nil;
    type ConstViews = Nil;
    type Storage = DataVisitable<Vec<T>>;

    fn into_visitable(self) -> Self::Storage {
        DataVisitable::new(self)
    }
}

impl<T: Send + Sync + 'static> AnyVisitable for Option<T> {
    type Views = Nil;
    type ConstViews = Nil;
    type Storage = DataVisitable<Option<T>>;

    fn into_visitable(self) -> Self::Storage {
        DataVisitable::new(self)
    }
}

impl<K, V, S> AnyVisitable for HashMap<K, V, S>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    type Views = Nil;
    type ConstViews = Nil;
    type Storage = DataVisitable<HashMap<K, V, S>>;

    fn into_visitable(self) -> Self::Storage {
        DataVisitable::new(self)
    }
}

impl<T: AnyVisitable> AnyVisitable for Shared<T> {
    type Views = Nil;
    type ConstViews = Nil;
    type Storage = ReferenceVisitable<T>;

    fn into_visitable(self) -> Self::Storage {
        ReferenceVisitable { handle: self }
    }
}

impl<T: AnyVisitable> AnyVisitable for Arc<T> {
    type Views = Nil;
    type ConstViews = Nil;
    type Storage = SharedVisitable<T>;

    fn into_visitable(self) -> Self::Storage {
        SharedVisitable { value: self }
    }
}
