use crate::any_value::Slot;
use crate::type_list::{Cons, False, Merged, Nil, Predicate, Transformed, True, TypeFn, TypeList};
use crate::TypeIndex;
use std::any::{Any, TypeId};
use std::marker::PhantomData;

/// A view of `T` as a `B` reachable by shared and mutable reference.
///
/// Requires `T: AsRef<B> + AsMut<B>`, which is how a derived type declares its base.
pub struct Ref<B>(PhantomData<fn() -> B>);

/// A view of `T` as a `B` reachable by shared reference only
pub struct ConstRef<B>(PhantomData<fn() -> B>);

/// A by-value conversion of `T` into `U`, see [`CastTo`]
pub struct Value<U>(PhantomData<fn() -> U>);

/// A checked conversion used by [`Value`] views.
///
/// Returns `None` when the value cannot be represented in the target type.
pub trait CastTo<U> {
    fn cast_to(&self) -> Option<U>;
}

/// One entry of a conversion set
pub trait View<T: 'static>: 'static {
    /// The type this entry makes `T` available as
    fn target() -> TypeIndex;

    /// Whether the target can be borrowed, rather than only produced by value
    fn by_reference() -> bool {
        false
    }

    fn accept(_value: &T, _target: TypeId, _visitor: &mut dyn FnMut(&dyn Any)) -> bool {
        false
    }

    fn accept_mut(_value: &mut T, _target: TypeId, _visitor: &mut dyn FnMut(&mut dyn Any)) -> bool {
        false
    }

    fn convert(_value: &T, _target: TypeId, _slot: &Slot) -> Option<Box<dyn Any>> {
        None
    }
}

impl<T, B> View<T> for Ref<B>
where
    T: AsRef<B> + AsMut<B> + 'static,
    B: 'static,
{
    fn target() -> TypeIndex {
        TypeIndex::of::<B>()
    }

    fn by_reference() -> bool {
        true
    }

    fn accept(value: &T, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> bool {
        if target != TypeId::of::<B>() {
            return false;
        }
        visitor(<T as AsRef<B>>::as_ref(value) as &dyn Any);
        true
    }

    fn accept_mut(value: &mut T, target: TypeId, visitor: &mut dyn FnMut(&mut dyn Any)) -> bool {
        if target != TypeId::of::<B>() {
            return false;
        }
        visitor(<T as AsMut<B>>::as_mut(value) as &mut dyn Any);
        true
    }

    fn convert(_value: &T, target: TypeId, slot: &Slot) -> Option<Box<dyn Any>> {
        share_as::<B>(target, slot)
    }
}

impl<T, B> View<T> for ConstRef<B>
where
    T: AsRef<B> + 'static,
    B: 'static,
{
    fn target() -> TypeIndex {
        TypeIndex::of::<B>()
    }

    fn by_reference() -> bool {
        true
    }

    fn accept(value: &T, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> bool {
        if target != TypeId::of::<B>() {
            return false;
        }
        visitor(<T as AsRef<B>>::as_ref(value) as &dyn Any);
        true
    }

    fn convert(_value: &T, target: TypeId, slot: &Slot) -> Option<Box<dyn Any>> {
        share_as::<B>(target, slot)
    }
}

impl<T, U> View<T> for Value<U>
where
    T: CastTo<U> + 'static,
    U: 'static,
{
    fn target() -> TypeIndex {
        TypeIndex::of::<U>()
    }

    fn convert(value: &T, target: TypeId, _slot: &Slot) -> Option<Box<dyn Any>> {
        if target != TypeId::of::<U>() {
            return None;
        }
        value.cast_to().map(|converted| Box::new(converted) as Box<dyn Any>)
    }
}

/// An aliasing `Shared<B>` handle, if that is what `target` asks for
pub(crate) fn share_as<B: 'static>(target: TypeId, slot: &Slot) -> Option<Box<dyn Any>> {
    if target == TypeId::of::<crate::Shared<B>>() {
        Some(Box::new(slot.share::<B>()))
    } else {
        None
    }
}

/// A type-level list of [`View`] entries for `T`, searched front to back
pub trait ViewList<T: 'static>: TypeList {
    fn accept(value: &T, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> bool;

    fn accept_mut(value: &mut T, target: TypeId, visitor: &mut dyn FnMut(&mut dyn Any)) -> bool;

    fn convert(value: &T, target: TypeId, slot: &Slot) -> Option<Box<dyn Any>>;

    fn targets(out: &mut Vec<TypeIndex>);

    fn reference_targets(out: &mut Vec<TypeIndex>);
}

impl<T: 'static> ViewList<T> for Nil {
    fn accept(_value: &T, _target: TypeId, _visitor: &mut dyn FnMut(&dyn Any)) -> bool {
        false
    }

    fn accept_mut(_value: &mut T, _target: TypeId, _visitor: &mut dyn FnMut(&mut dyn Any)) -> bool {
        false
    }

    fn convert(_value: &T, _target: TypeId, _slot: &Slot) -> Option<Box<dyn Any>> {
        None
    }

    fn targets(_out: &mut Vec<TypeIndex>) {}

    fn reference_targets(_out: &mut Vec<TypeIndex>) {}
}

impl<T: 'static, H: View<T>, R: ViewList<T>> ViewList<T> for Cons<H, R> {
    fn accept(value: &T, target: TypeId, visitor: &mut dyn FnMut(&dyn Any)) -> bool {
        H::accept(value, target, visitor) || R::accept(value, target, visitor)
    }

    fn accept_mut(value: &mut T, target: TypeId, visitor: &mut dyn FnMut(&mut dyn Any)) -> bool {
        H::accept_mut(value, target, visitor) || R::accept_mut(value, target, visitor)
    }

    fn convert(value: &T, target: TypeId, slot: &Slot) -> Option<Box<dyn Any>> {
        H::convert(value, target, slot).or_else(|| R::convert(value, target, slot))
    }

    fn targets(out: &mut Vec<TypeIndex>) {
        out.push(H::target());
        R::targets(out);
    }

    fn reference_targets(out: &mut Vec<TypeIndex>) {
        if H::by_reference() {
            out.push(H::target());
        }
        R::reference_targets(out);
    }
}

/// Visits `value` as itself or through one of the views in `L`
pub(crate) fn visit_views<T: 'static, L: ViewList<T>>(
    value: &T,
    target: TypeId,
    visitor: &mut dyn FnMut(&dyn Any),
) -> bool {
    if target == TypeId::of::<T>() {
        visitor(value as &dyn Any);
        return true;
    }
    L::accept(value, target, visitor)
}

pub(crate) fn visit_views_mut<T: 'static, L: ViewList<T>>(
    value: &mut T,
    target: TypeId,
    visitor: &mut dyn FnMut(&mut dyn Any),
) -> bool {
    if target == TypeId::of::<T>() {
        visitor(value as &mut dyn Any);
        return true;
    }
    L::accept_mut(value, target, visitor)
}

/// The identity of `T` followed by the targets of `L`
pub(crate) fn view_targets<T: 'static, L: ViewList<T>>() -> Vec<TypeIndex> {
    let mut out = Vec::with_capacity(L::LEN + 1);
    out.push(TypeIndex::of::<T>());
    L::targets(&mut out);
    out
}

/// The identity of `T` followed by the targets of `L` that can be borrowed
pub(crate) fn view_reference_targets<T: 'static, L: ViewList<T>>() -> Vec<TypeIndex> {
    let mut out = vec![TypeIndex::of::<T>()];
    L::reference_targets(&mut out);
    out
}

/// Predicate selecting the entries of a view list usable through `&mut T`
pub struct MutableView;

impl<B> Predicate<Ref<B>> for MutableView {
    type Result = True;
}

impl<B> Predicate<ConstRef<B>> for MutableView {
    type Result = False;
}

impl<U> Predicate<Value<U>> for MutableView {
    type Result = True;
}

/// Maps a type `U` to the view entry `Value<U>`
pub struct AsValue;

impl<U: 'static> TypeFn<U> for AsValue {
    type Output = Value<U>;
}

pub type Integers = crate::type_list![i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize];

pub type Floats = crate::type_list![f32, f64];

/// The arithmetic types every scalar can be converted between
pub type NumericTypes = Merged<Integers, Floats>;

/// `Value<U>` for every `U` in [`NumericTypes`]
pub type NumericViews = Transformed<NumericTypes, AsValue>;

macro_rules! impl_numeric_casts {
    (@from $from:ty; $($to:ty),*) => {
        $(
            impl CastTo<$to> for $from {
                fn cast_to(&self) -> Option<$to> {
                    num::cast::<$from, $to>(*self)
                }
            }
        )*
    };
    ($($from:ty),*) => {
        $(
            impl_numeric_casts!(@from $from;
                i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
        )*
    };
}

impl_numeric_casts!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views_cover_whitelist() {
        let targets = view_targets::<i32, NumericViews>();
        // identity first, then every numeric type
        assert_eq!(targets.len(), 15);
        assert_eq!(targets[0], TypeIndex::of::<i32>());
        assert!(targets.contains(&TypeIndex::of::<f64>()));
        assert!(targets.contains(&TypeIndex::of::<u128>()));
    }

    #[test]
    fn test_checked_casts() {
        assert_eq!(CastTo::<f64>::cast_to(&5i32), Some(5.0));
        assert_eq!(CastTo::<i32>::cast_to(&5.9f64), Some(5));
        assert_eq!(CastTo::<i32>::cast_to(&-5.9f64), Some(-5));
        assert_eq!(CastTo::<u8>::cast_to(&300i32), None);
        assert_eq!(CastTo::<u32>::cast_to(&-1i64), None);
        assert_eq!(CastTo::<i32>::cast_to(&f64::NAN), None);
    }

    struct Base(u8);
    struct Derived(Base);

    impl AsRef<Base> for Derived {
        fn as_ref(&self) -> &Base {
            &self.0
        }
    }

    impl AsMut<Base> for Derived {
        fn as_mut(&mut self) -> &mut Base {
            &mut self.0
        }
    }

    #[test]
    fn test_ref_view_visits_base() {
        type L = crate::type_list![Ref<Base>];
        let mut derived = Derived(Base(3));

        let mut seen = None;
        let found = visit_views::<Derived, L>(&derived, TypeId::of::<Base>(), &mut |value: &dyn Any| {
            seen = value.downcast_ref::<Base>().map(|base| base.0);
        });
        assert!(found);
        assert_eq!(seen, Some(3));

        let found = visit_views_mut::<Derived, L>(&mut derived, TypeId::of::<Base>(), &mut |value: &mut dyn Any| {
            if let Some(base) = value.downcast_mut::<Base>() {
                base.0 = 4;
            }
        });
        assert!(found);
        assert_eq!(derived.0 .0, 4);

        assert!(!visit_views::<Derived, L>(&derived, TypeId::of::<u8>(), &mut |_: &dyn Any| {}));
    }

    impl AsRef<u8> for Derived {
        fn as_ref(&self) -> &u8 {
            &self.0 .0
        }
    }

    impl CastTo<u16> for Derived {
        fn cast_to(&self) -> Option<u16> {
            Some(u16::from(self.0 .0))
        }
    }

    #[test]
    fn test_reference_targets_skip_conversions() {
        type L = crate::type_list![Ref<Base>, Value<u16>, ConstRef<u8>];
        assert_eq!(
            view_reference_targets::<Derived, L>(),
            vec![
                TypeIndex::of::<Derived>(),
                TypeIndex::of::<Base>(),
                TypeIndex::of::<u8>()
            ]
        );
        assert_eq!(view_reference_targets::<i32, NumericViews>(), vec![TypeIndex::of::<i32>()]);
    }

    #[test]
    fn test_const_ref_is_not_mutable() {
        type L = crate::type_list![ConstRef<Base>];
        let mut derived = Derived(Base(1));
        assert!(visit_views::<Derived, L>(&derived, TypeId::of::<Base>(), &mut |_: &dyn Any| {}));
        assert!(!visit_views_mut::<Derived, L>(
            &mut derived,
            TypeId::of::<Base>(),
            &mut |_: &mut dyn Any| {}
        ));
    }

    #[test]
    fn test_mutable_filter_drops_const_refs() {
        type All = crate::type_list![Ref<Base>, ConstRef<u8>, Value<u16>];
        type Mutable = crate::type_list::Filtered<All, MutableView>;
        assert_eq!(<Mutable as TypeList>::LEN, 2);
        assert_eq!(
            <Mutable as TypeList>::type_indexes(),
            vec![TypeIndex::of::<Ref<Base>>(), TypeIndex::of::<Value<u16>>()]
        );
    }
}
