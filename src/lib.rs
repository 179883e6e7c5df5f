//! # Runtime inversion of control.
//!
//! A [`Registry`] maps abstractions (usually trait objects like
//! `dyn Database`) to resolvers: plain functions that produce an instance of
//! the abstraction and take their own dependencies as parameters. Asking the
//! registry for an abstraction runs the matching resolver, resolving its
//! parameters first, and hands back a [`Svc<T>`] pointer to the instance.
//!
//! ## Bindings
//!
//! Each binding pairs an abstraction and a name with a resolver and a
//! [`Lifecycle`]:
//!
//! - **Singleton:** the resolver runs on the first resolution only. That
//!   instance is returned for every later resolution until the registry is
//!   [reset](Registry::reset).
//! - **Transient:** the resolver runs on every resolution.
//!
//! The empty name is the default binding of an abstraction. Other names hold
//! independent bindings of the same abstraction and can be visited together
//! with [`Registry::for_each_named`].
//!
//! ## Hierarchies
//!
//! A [child](Registry::child) registry falls back to its parent for
//! abstractions it does not bind itself. Its own bindings shadow the
//! parent's for the child and its descendants without changing the parent.
//!
//! ## Thread safety
//!
//! Registries are `Send + Sync` and cheap to clone. Declarations take the
//! table exclusively; resolutions only read it. Each singleton binding has its
//! own guard, so concurrent first resolutions of one binding run its resolver
//! once while resolutions of other bindings carry on.
//!
//! Dependency cycles are not detected. A singleton that depends on itself
//! blocks forever, and a transient cycle overflows the stack.
//!
//! ## Example
//!
//! ```
//! use runtime_container::{Registry, Svc};
//! use std::sync::atomic::{AtomicI32, Ordering};
//!
//! trait Shape: Send + Sync {
//!     fn set_area(&self, area: i32);
//!     fn area(&self) -> i32;
//! }
//!
//! struct Circle(AtomicI32);
//!
//! impl Shape for Circle {
//!     fn set_area(&self, area: i32) {
//!         self.0.store(area, Ordering::SeqCst);
//!     }
//!
//!     fn area(&self) -> i32 {
//!         self.0.load(Ordering::SeqCst)
//!     }
//! }
//!
//! trait Database: Send + Sync {
//!     fn connect(&self) -> bool;
//! }
//!
//! struct MySql;
//!
//! impl Database for MySql {
//!     fn connect(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry
//!     .singleton(|| Svc::new(Circle(AtomicI32::new(5))) as Svc<dyn Shape>)
//!     .unwrap();
//!
//! // Resolvers can depend on other abstractions.
//! registry
//!     .transient(|shape: Svc<dyn Shape>| {
//!         assert!(shape.area() > 0);
//!         Svc::new(MySql) as Svc<dyn Database>
//!     })
//!     .unwrap();
//!
//! let mut first: Option<Svc<dyn Shape>> = None;
//! let mut second: Option<Svc<dyn Shape>> = None;
//! registry.fill(&mut first).unwrap();
//! registry.fill(&mut second).unwrap();
//!
//! first.unwrap().set_area(6);
//! assert_eq!(6, second.unwrap().area());
//!
//! registry
//!     .invoke(|database: Svc<dyn Database>| assert!(database.connect()))
//!     .unwrap();
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

mod builder;
mod iter;
mod registry;
mod requests;
mod services;

#[cfg(feature = "global")]
pub mod global;

pub use builder::*;
pub use iter::*;
pub use registry::*;
pub use requests::*;
pub use services::*;

#[cfg(test)]
mod tests;
