//! Type-level lists.
//!
//! A list is either [`Nil`] or a [`Cons`] of a head type and a tail list. Lists
//! never hold values; all operations on them are resolved by the compiler.
//! They are used to declare the set of views a stored type can be cast to.
//!
//! ```
//! use sovran_any::type_list::{Filtered, Merged, Predicate, True, False, TypeList};
//! use sovran_any::{type_list, TypeIndex};
//!
//! struct IsSigned;
//! impl Predicate<i32> for IsSigned { type Result = True; }
//! impl Predicate<u8> for IsSigned { type Result = False; }
//! impl Predicate<i64> for IsSigned { type Result = True; }
//!
//! type Small = type_list![i32, u8];
//! type Both = Merged<Small, type_list![i64]>;
//! type Signed = Filtered<Both, IsSigned>;
//!
//! assert_eq!(<Both as TypeList>::LEN, 3);
//! assert_eq!(
//!     <Signed as TypeList>::type_indexes(),
//!     vec![TypeIndex::of::<i32>(), TypeIndex::of::<i64>()]
//! );
//! ```

use crate::TypeIndex;
use std::marker::PhantomData;

/// The empty list
pub struct Nil;

/// A list with head `H` followed by the list `T`
pub struct Cons<H, T>(PhantomData<fn() -> (H, T)>);

/// Implemented by every type-level list
pub trait TypeList: 'static {
    /// Number of elements, duplicates included
    const LEN: usize;

    /// Identities of the elements, in list order
    fn type_indexes() -> Vec<TypeIndex> {
        let mut out = Vec::with_capacity(Self::LEN);
        Self::collect(&mut out);
        out
    }

    #[doc(hidden)]
    fn collect(out: &mut Vec<TypeIndex>);
}

impl TypeList for Nil {
    const LEN: usize = 0;

    fn collect(_out: &mut Vec<TypeIndex>) {}
}

impl<H: 'static, T: TypeList> TypeList for Cons<H, T> {
    const LEN: usize = T::LEN + 1;

    fn collect(out: &mut Vec<TypeIndex>) {
        out.push(TypeIndex::of::<H>());
        T::collect(out);
    }
}

/// Builds a list from its elements: `type_list![A, B, C]`
#[macro_export]
macro_rules! type_list {
    () => { $crate::type_list::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::type_list::Cons<$head, $crate::type_list!($($tail),*)>
    };
}

/// Concatenation of `Self` followed by `Other`
pub trait Merge<Other: TypeList>: TypeList {
    type Output: TypeList;
}

impl<L: TypeList> Merge<L> for Nil {
    type Output = L;
}

impl<H: 'static, T: Merge<L>, L: TypeList> Merge<L> for Cons<H, T> {
    type Output = Cons<H, <T as Merge<L>>::Output>;
}

pub type Merged<A, B> = <A as Merge<B>>::Output;

/// `L` with `X` appended at the end
pub type Pushed<L, X> = Merged<L, Cons<X, Nil>>;

/// Concatenates any number of lists from left to right: `merge_lists![A, B, C]`
#[macro_export]
macro_rules! merge_lists {
    ($only:ty $(,)?) => { $only };
    ($first:ty, $($rest:ty),+ $(,)?) => {
        $crate::type_list::Merged<$first, $crate::merge_lists!($($rest),+)>
    };
}

/// Type-level `true`
pub struct True;

/// Type-level `false`
pub struct False;

pub trait Bool {
    const VALUE: bool;
}

impl Bool for True {
    const VALUE: bool = true;
}

impl Bool for False {
    const VALUE: bool = false;
}

/// A type-level predicate, implemented by the predicate marker for each
/// element type it can judge
pub trait Predicate<T> {
    type Result: Bool;
}

#[doc(hidden)]
pub trait Select<H, Rest: TypeList> {
    type Output: TypeList;
}

impl<H: 'static, Rest: TypeList> Select<H, Rest> for True {
    type Output = Cons<H, Rest>;
}

impl<H, Rest: TypeList> Select<H, Rest> for False {
    type Output = Rest;
}

/// The elements of `Self` for which `P` holds, in order
pub trait Filter<P>: TypeList {
    type Output: TypeList;
}

impl<P> Filter<P> for Nil {
    type Output = Nil;
}

impl<P, H: 'static, T> Filter<P> for Cons<H, T>
where
    P: Predicate<H>,
    T: Filter<P>,
    <P as Predicate<H>>::Result: Select<H, <T as Filter<P>>::Output>,
{
    type Output = <<P as Predicate<H>>::Result as Select<H, <T as Filter<P>>::Output>>::Output;
}

pub type Filtered<L, P> = <L as Filter<P>>::Output;

/// A type-level function from `T` to `Output`
pub trait TypeFn<T> {
    type Output: 'static;
}

/// `Self` with every element mapped through `F`
pub trait Transform<F>: TypeList {
    type Output: TypeList;
}

impl<F> Transform<F> for Nil {
    type Output = Nil;
}

impl<F, H: 'static, T: Transform<F>> Transform<F> for Cons<H, T>
where
    F: TypeFn<H>,
{
    type Output = Cons<<F as TypeFn<H>>::Output, <T as Transform<F>>::Output>;
}

pub type Transformed<L, F> = <L as Transform<F>>::Output;
