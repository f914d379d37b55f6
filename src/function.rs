use crate::any_value::AnyVisitable;
use crate::error::AnyError;
use crate::{Any, TypeIndex};
use std::fmt;
use std::sync::Arc;

/// Positional arguments for an [`AnyFunction`]
pub type AnyArguments = Vec<Any>;

type Invoker = dyn Fn(&[Any]) -> Result<Any, AnyError> + Send + Sync;

struct Descriptor {
    return_type: TypeIndex,
    // `None` for functions taking the erased argument slice
    arguments: Option<Vec<TypeIndex>>,
    invoke: Box<Invoker>,
}

/// A type-erased callable.
///
/// The signature is captured once, when the function is created. Calls convert
/// each `Any` argument to the declared parameter type with [`Any::get`], so a
/// parameter accepts anything the argument can be viewed as.
///
/// ```
/// use sovran_any::{Any, AnyError, AnyFunction};
///
/// let add = AnyFunction::new(|a: i32, b: f64| f64::from(a) + b);
/// assert_eq!(add.argument_count(), Some(2));
///
/// let sum = add.call(&[Any::new(1i32), Any::new(2u8)])?;
/// assert_eq!(sum.get::<f64>()?, 3.0);
///
/// let sum = add.call_with((4i64, 0.5f32))?;
/// assert_eq!(sum.get::<f64>()?, 4.5);
///
/// assert!(matches!(
///     add.call(&[Any::new(1i32)]),
///     Err(AnyError::ArgumentCount { expected: 2, actual: 1 })
/// ));
/// # Ok::<(), AnyError>(())
/// ```
#[derive(Clone)]
pub struct AnyFunction {
    inner: Arc<Descriptor>,
}

impl AnyFunction {
    /// Wraps a closure or function taking up to eight parameters
    pub fn new<F, Marker>(f: F) -> Self
    where
        F: IntoAnyFunction<Marker>,
    {
        f.into_any_function()
    }

    /// Wraps a closure receiving the raw argument list.
    ///
    /// The function accepts any number of arguments and checks them itself.
    pub fn erased<F, R>(f: F) -> Self
    where
        F: Fn(&[Any]) -> R + Send + Sync + 'static,
        R: IntoAny,
    {
        Self::from_parts(R::return_type(), None, move |args| f(args).into_any())
    }

    fn from_parts<F>(return_type: TypeIndex, arguments: Option<Vec<TypeIndex>>, invoke: F) -> Self
    where
        F: Fn(&[Any]) -> Result<Any, AnyError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Descriptor {
                return_type,
                arguments,
                invoke: Box::new(invoke),
            }),
        }
    }

    /// Calls the function.
    ///
    /// Returns the result wrapped in an `Any`, or an empty `Any` for functions
    /// returning `()`.
    ///
    /// # Errors
    ///
    /// - Returns `AnyError::ArgumentCount` if `args` does not match the arity
    /// - Returns the first error raised while converting an argument
    pub fn call(&self, args: &[Any]) -> Result<Any, AnyError> {
        if let Some(expected) = self.argument_count() {
            if args.len() != expected {
                tracing::debug!(expected, actual = args.len(), "argument count mismatch");
                return Err(AnyError::ArgumentCount {
                    expected,
                    actual: args.len(),
                });
            }
        }
        tracing::trace!(function = %self, "calling");
        (self.inner.invoke)(args)
    }

    /// Wraps each element of a tuple in an `Any` and calls the function
    pub fn call_with<A: IntoAnyArguments>(&self, args: A) -> Result<Any, AnyError> {
        let args = args.into_any_arguments()?;
        self.call(&args)
    }

    /// Number of parameters, or `None` for erased functions
    pub fn argument_count(&self) -> Option<usize> {
        self.inner.arguments.as_ref().map(Vec::len)
    }

    pub fn return_type(&self) -> TypeIndex {
        self.inner.return_type
    }

    /// The type of parameter `index`.
    ///
    /// Erased functions report `Any` for every index.
    ///
    /// # Errors
    ///
    /// Returns `AnyError::ArgumentIndex` if `index` is out of range.
    pub fn argument_type(&self, index: usize) -> Result<TypeIndex, AnyError> {
        match &self.inner.arguments {
            None => Ok(TypeIndex::of::<Any>()),
            Some(arguments) => arguments.get(index).copied().ok_or(AnyError::ArgumentIndex {
                index,
                count: arguments.len(),
            }),
        }
    }
}

impl fmt::Display for AnyFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        match &self.inner.arguments {
            None => f.write_str("..")?,
            Some(arguments) => {
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
            }
        }
        write!(f, ") -> {}", self.inner.return_type)
    }
}

impl fmt::Debug for AnyFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyFunction({})", self)
    }
}

crate::any_visitable!(AnyFunction);

/// Values a wrapped function may return
pub trait IntoAny: Sized + 'static {
    /// The type reported by [`AnyFunction::return_type`]
    fn return_type() -> TypeIndex {
        TypeIndex::of::<Self>()
    }

    fn into_any(self) -> Result<Any, AnyError>;
}

impl<T: AnyVisitable> IntoAny for T {
    fn into_any(self) -> Result<Any, AnyError> {
        Ok(Any::new(self))
    }
}

impl IntoAny for () {
    fn into_any(self) -> Result<Any, AnyError> {
        Ok(Any::default())
    }
}

impl IntoAny for Any {
    fn into_any(self) -> Result<Any, AnyError> {
        Ok(self)
    }
}

impl<T: IntoAny> IntoAny for Result<T, AnyError> {
    fn return_type() -> TypeIndex {
        T::return_type()
    }

    fn into_any(self) -> Result<Any, AnyError> {
        self.and_then(IntoAny::into_any)
    }
}

/// Converts a callable into an [`AnyFunction`].
///
/// `Marker` only keeps the implementations for different arities apart.
pub trait IntoAnyFunction<Marker> {
    fn into_any_function(self) -> AnyFunction;
}

macro_rules! impl_into_any_function {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> IntoAnyFunction<fn($($arg,)*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoAny,
            $($arg: Clone + 'static,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_any_function(self) -> AnyFunction {
                let arguments = vec![$(TypeIndex::of::<$arg>()),*];
                let expected = arguments.len();
                AnyFunction::from_parts(R::return_type(), Some(arguments), move |args: &[Any]| {
                    let actual = args.len();
                    let mut args = args.iter();
                    $(
                        let $arg = args
                            .next()
                            .ok_or(AnyError::ArgumentCount { expected, actual })?
                            .get::<$arg>()?;
                    )*
                    (self)($($arg),*).into_any()
                })
            }
        }
    };
}

impl_into_any_function!();
impl_into_any_function!(A1);
impl_into_any_function!(A1, A2);
impl_into_any_function!(A1, A2, A3);
impl_into_any_function!(A1, A2, A3, A4);
impl_into_any_function!(A1, A2, A3, A4, A5);
impl_into_any_function!(A1, A2, A3, A4, A5, A6);
impl_into_any_function!(A1, A2, A3, A4, A5, A6, A7);
impl_into_any_function!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Argument lists accepted by [`AnyFunction::call_with`]
pub trait IntoAnyArguments {
    fn into_any_arguments(self) -> Result<AnyArguments, AnyError>;
}

impl IntoAnyArguments for AnyArguments {
    fn into_any_arguments(self) -> Result<AnyArguments, AnyError> {
        Ok(self)
    }
}

macro_rules! impl_into_any_arguments {
    ($($arg:ident),*) => {
        impl<$($arg: IntoAny,)*> IntoAnyArguments for ($($arg,)*) {
            #[allow(non_snake_case)]
            fn into_any_arguments(self) -> Result<AnyArguments, AnyError> {
                let ($($arg,)*) = self;
                Ok(vec![$($arg.into_any()?),*])
            }
        }
    };
}

impl_into_any_arguments!();
impl_into_any_arguments!(A1);
impl_into_any_arguments!(A1, A2);
impl_into_any_arguments!(A1, A2, A3);
impl_into_any_arguments!(A1, A2, A3, A4);
impl_into_any_arguments!(A1, A2, A3, A4, A5);
impl_into_any_arguments!(A1, A2, A3, A4, A5, A6);
impl_into_any_arguments!(A1, A2, A3, A4, A5, A6, A7);
impl_into_any_arguments!(A1, A2, A3, A4, A5, A6, A7, A8);
