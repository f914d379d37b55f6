//! # sovran-any
//!
//! A thread-safe, type-erased value container with relation-aware casting.
//!
//! `sovran-any` stores a value of any declared type in an [`Any`] and lets it be
//! retrieved not only as its own type but as any type it is related to: a
//! numeric type it converts to, a base type it embeds, the pointee of an `Arc`
//! or of a [`Shared`] handle. The set of views a type supports is declared once,
//! as a type-level list, and checked at runtime on every retrieval.
//!
//! ## Key Features
//!
//! - **Relation-aware**: Values convert along declared relations, not only by exact type
//! - **Aliasing**: Cloning an `Any` shares the value; writes are visible through every alias
//! - **Thread-safe**: Storage is `Arc`-counted and lock-protected, and never blocks
//! - **Type-erased functions**: [`AnyFunction`] calls closures with `Any` arguments
//! - **Type lists**: Compile-time list algebra for declaring conversion sets
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_any::{Any, AnyError};
//!
//! fn main() -> Result<(), AnyError> {
//!     let any = Any::new(42i32);
//!
//!     // Numeric values convert to every other arithmetic type
//!     let wide = any.get::<i64>()?;
//!     let float = any.get::<f64>()?;
//!     println!("Wide: {}, float: {}", wide, float);
//!
//!     // Handle errors properly
//!     match any.get::<String>() {
//!         Ok(value) => println!("Value: {}", value),
//!         Err(AnyError::Empty) => println!("Nothing stored"),
//!         Err(AnyError::TypeMismatch { from, to }) => println!("{} is not a {}", from, to),
//!         Err(e) => println!("Other error: {}", e),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Using with_mut to Modify Values In-Place
//!
//! ```rust
//! use sovran_any::{Any, AnyError};
//! use std::collections::HashMap;
//!
//! fn main() -> Result<(), AnyError> {
//!     let mut counters = HashMap::new();
//!     counters.insert("visits".to_string(), 0);
//!     let any = Any::new(counters);
//!
//!     // Every clone aliases the same map
//!     let alias = any.clone();
//!     alias.with_mut(|counters: &mut HashMap<String, i32>| {
//!         *counters.entry("visits".to_string()).or_insert(0) += 1;
//!     })?;
//!
//!     let visits = any.with(|counters: &HashMap<String, i32>| {
//!         counters.get("visits").copied().unwrap_or(0)
//!     })?;
//!     assert_eq!(visits, 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Declaring Base Types
//!
//! A type is viewable as one of its parts when it implements `AsRef` (and
//! `AsMut` for mutable access) and lists the view in [`any_visitable!`].
//!
//! ```rust
//! use sovran_any::{any_visitable, visitor_pointer_cast, Any, AnyError, ConstRef, Ref};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Animal {
//!     name: String,
//! }
//!
//! #[derive(Clone)]
//! struct Dog {
//!     animal: Animal,
//!     tricks: Vec<String>,
//! }
//!
//! impl AsRef<Animal> for Dog {
//!     fn as_ref(&self) -> &Animal { &self.animal }
//! }
//! impl AsMut<Animal> for Dog {
//!     fn as_mut(&mut self) -> &mut Animal { &mut self.animal }
//! }
//! impl AsRef<Vec<String>> for Dog {
//!     fn as_ref(&self) -> &Vec<String> { &self.tricks }
//! }
//!
//! any_visitable!(Animal);
//! any_visitable!(Dog: [Ref<Animal>, ConstRef<Vec<String>>]);
//!
//! fn main() -> Result<(), AnyError> {
//!     let any = Any::new(Dog {
//!         animal: Animal { name: "Rex".to_string() },
//!         tricks: vec!["sit".to_string()],
//!     });
//!
//!     // Mutate through the base view
//!     any.with_mut(|animal: &mut Animal| animal.name.push_str(" II"))?;
//!     assert_eq!(any.get::<Animal>()?.name, "Rex II");
//!
//!     // Tricks are read-only
//!     assert_eq!(any.with(|tricks: &Vec<String>| tricks.len())?, 1);
//!     assert!(any.with_mut(|tricks: &mut Vec<String>| tricks.clear()).is_err());
//!
//!     // A handle to the base can be cast back to the full value
//!     let animal = any.get_shared::<Animal>().ok_or(AnyError::Empty)?;
//!     let dog = visitor_pointer_cast::<Dog, _>(&animal).ok_or(AnyError::Empty)?;
//!     assert_eq!(dog.with(|dog| dog.tricks.clone())?, vec!["sit".to_string()]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Sharing Values Between Components
//!
//! ```rust
//! use sovran_any::{Any, AnyError, Shared};
//! use std::thread;
//!
//! fn main() -> Result<(), AnyError> {
//!     let log = Any::new(Vec::<String>::new());
//!
//!     // Storing a handle makes the new container refer to the original value
//!     let handle: Shared<Vec<String>> = log.get()?;
//!     let reference = Any::new(handle);
//!
//!     let worker = thread::spawn(move || {
//!         reference.with_mut(|lines: &mut Vec<String>| lines.push("from worker".to_string()))
//!     });
//!     worker.join().map_err(|_| AnyError::LockError)??;
//!
//!     assert_eq!(log.get::<Vec<String>>()?, vec!["from worker".to_string()]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Calling Functions with Any Arguments
//!
//! ```rust
//! use sovran_any::{Any, AnyError, AnyFunction};
//!
//! fn main() -> Result<(), AnyError> {
//!     let greet = AnyFunction::new(|name: String, times: usize| name.repeat(times));
//!
//!     let result = greet.call(&[Any::new("hi "), Any::new(2u8)])?;
//!     assert_eq!(result.get::<String>()?, "hi hi ");
//!
//!     match greet.call(&[Any::new("hi")]) {
//!         Err(AnyError::ArgumentCount { expected, actual }) => {
//!             println!("expected {} arguments, got {}", expected, actual)
//!         }
//!         other => println!("unexpected: {:?}", other),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `trace` when a value is stored or a
//! function is called, `debug` when a view or an argument count does not match.
//! Install any `tracing` subscriber to see them.

mod any;
mod any_value;
mod error;
mod function;
mod shared;
mod type_index;
pub mod type_list;
mod views;

#[cfg(test)]
mod function_tests;

pub use any::{make_any, Any};
pub use any_value::{
    AnyVisitable, ConversionSet, DataVisitable, ReferenceVisitable, SharedVisitable, Slot,
    Visitable,
};
pub use error::AnyError;
pub use function::{AnyArguments, AnyFunction, IntoAny, IntoAnyArguments, IntoAnyFunction};
pub use shared::{visitor_pointer_cast, Shared};
pub use type_index::TypeIndex;
pub use views::{
    AsValue, CastTo, ConstRef, Floats, Integers, MutableView, NumericTypes, NumericViews, Ref,
    Value, View, ViewList,
};
