//! A process-wide default registry and free functions that forward to it.
//!
//! The default registry is created on first use. Registries built with
//! [`Registry::new`] never share anything with it, so tests can use isolated
//! registries without touching global state.
//!
//! ```
//! use runtime_container::{global, Svc};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_owned()
//!     }
//! }
//!
//! global::singleton(|| Svc::new(English) as Svc<dyn Greeter>).unwrap();
//!
//! let mut greeter: Option<Svc<dyn Greeter>> = None;
//! global::fill(&mut greeter).unwrap();
//! assert_eq!("hello", greeter.unwrap().greet());
//! ```

use crate::{
    Callback, InjectResult, Interface, Receiver, Registry, Request, Resolver,
    Svc,
};
use once_cell::sync::Lazy;

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut builder = Registry::builder();
    builder.label("global");
    builder.build()
});

/// Borrows the default registry.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Declares a default singleton binding in the default registry.
pub fn singleton<D, F>(resolver: F) -> InjectResult<()>
where
    D: 'static,
    F: Resolver<D>,
{
    REGISTRY.singleton(resolver)
}

/// Declares a named singleton binding in the default registry.
pub fn singleton_named<D, F>(name: &str, resolver: F) -> InjectResult<()>
where
    D: 'static,
    F: Resolver<D>,
{
    REGISTRY.singleton_named(name, resolver)
}

/// Declares a default transient binding in the default registry.
pub fn transient<D, F>(resolver: F) -> InjectResult<()>
where
    D: 'static,
    F: Resolver<D>,
{
    REGISTRY.transient(resolver)
}

/// Declares a named transient binding in the default registry.
pub fn transient_named<D, F>(name: &str, resolver: F) -> InjectResult<()>
where
    D: 'static,
    F: Resolver<D>,
{
    REGISTRY.transient_named(name, resolver)
}

/// Calls `consumer` for every named binding in the default registry.
pub fn for_each_named<T, F>(consumer: F) -> InjectResult<()>
where
    T: Request,
    F: FnMut(T),
{
    REGISTRY.for_each_named(consumer)
}

/// Removes every binding in the default registry.
pub fn reset() {
    REGISTRY.reset();
}

/// Resolves into a receiver from the default registry.
pub fn make<'a>(receiver: impl Into<Receiver<'a>>) -> InjectResult<()> {
    REGISTRY.make(receiver)
}

/// Resolves into a receiver from the named bindings of the default registry.
pub fn make_named<'a>(
    name: &str,
    receiver: impl Into<Receiver<'a>>,
) -> InjectResult<()> {
    REGISTRY.make_named(name, receiver)
}

/// Fills a slot from the default registry.
pub fn fill<I: ?Sized + Interface>(slot: &mut Option<Svc<I>>) -> InjectResult<()> {
    REGISTRY.fill(slot)
}

/// Fills a slot from a named binding of the default registry.
pub fn fill_named<I: ?Sized + Interface>(
    name: &str,
    slot: &mut Option<Svc<I>>,
) -> InjectResult<()> {
    REGISTRY.fill_named(name, slot)
}

/// Calls `callback` with its parameters resolved from the default registry.
pub fn invoke<D, C>(callback: C) -> InjectResult<C::Output>
where
    C: Callback<D>,
{
    REGISTRY.invoke(callback)
}

/// Resolves the default binding of `I` from the default registry.
pub fn get<I: ?Sized + Interface>() -> InjectResult<Svc<I>> {
    REGISTRY.get()
}

/// Resolves a named binding of `I` from the default registry.
pub fn get_named<I: ?Sized + Interface>(name: &str) -> InjectResult<Svc<I>> {
    REGISTRY.get_named(name)
}
