use crate::{InjectResult, Interface, Registry, RequestInfo, Svc};
use std::{marker::PhantomData, vec::IntoIter};

/// Lazily resolves the named bindings of an abstraction. Each item is the
/// binding name together with the result of resolving it, so a failing
/// binding does not stop the others from being visited.
///
/// The names are collected when the iterator is created; bindings declared
/// afterwards are not visited.
///
/// ```
/// use runtime_container::{Registry, Svc};
///
/// trait Concrete: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
///
/// struct A;
/// impl Concrete for A {
///     fn name(&self) -> &'static str { "A" }
/// }
///
/// let registry = Registry::new();
/// registry.singleton_named("a", || Svc::new(A) as Svc<dyn Concrete>).unwrap();
///
/// for (name, concrete) in registry.named::<dyn Concrete>() {
///     assert_eq!("a", name);
///     assert_eq!("A", concrete.unwrap().name());
/// }
/// ```
pub struct NamedServices<I: ?Sized + Interface> {
    registry: Registry,
    names: IntoIter<String>,
    marker: PhantomData<fn() -> Svc<I>>,
}

impl<I: ?Sized + Interface> NamedServices<I> {
    pub(crate) fn new(registry: Registry, names: Vec<String>) -> Self {
        NamedServices {
            registry,
            names: names.into_iter(),
            marker: PhantomData,
        }
    }
}

impl<I: ?Sized + Interface> Iterator for NamedServices<I> {
    type Item = (String, InjectResult<Svc<I>>);

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        let service = self.registry.resolve(&RequestInfo::named(&name));
        Some((name, service))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl<I: ?Sized + Interface> ExactSizeIterator for NamedServices<I> {}
