use crate::{
    Abstractions, Binding, Callback, DependencyScope, DynSvc, InjectError,
    InjectResult, Interface, Lifecycle, NamedServices, Receiver,
    RegistryBuilder, Request, RequestInfo, Resolver, ResolverOutput,
    ServiceInfo, Svc,
};
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Debug, Formatter},
};
use tracing::{debug, trace};

pub(crate) type BindingMap =
    HashMap<ServiceInfo, BTreeMap<String, Svc<Binding>>>;

struct RegistryInner {
    label: String,
    parent: Option<Registry>,
    dependency_scope: DependencyScope,
    bindings: RwLock<BindingMap>,
}

/// A runtime inversion-of-control container. This holds the bindings between
/// abstractions (plus an optional name) and the resolvers that produce their
/// instances, and may fall back to a parent registry for abstractions it
/// does not bind itself.
///
/// # Sharing the registry
///
/// Cloning the registry does not clone the bindings inside of it. Instead,
/// both handles use the same table, so a registry can be passed to other
/// threads or requested as a parameter by a resolver. It does not need to be
/// declared beforehand.
///
/// ```
/// use runtime_container::{InjectResult, Registry, Svc};
///
/// struct FloatFactory(Registry);
///
/// impl FloatFactory {
///     pub fn get(&self) -> InjectResult<f32> {
///         let int: Svc<i32> = self.0.get()?;
///         Ok(*int as f32)
///     }
/// }
///
/// let registry = Registry::new();
/// registry.transient(|| Svc::new(4i32)).unwrap();
/// registry
///     .singleton(|registry: Registry| Svc::new(FloatFactory(registry)))
///     .unwrap();
///
/// let factory: Svc<FloatFactory> = registry.get().unwrap();
/// assert_eq!(4.0, factory.get().unwrap());
/// ```
///
/// # Hierarchies
///
/// A child registry resolves its own bindings first and falls back to its
/// parent. A child keeps its parent alive, while the parent never refers to
/// its children.
///
/// ```
/// use runtime_container::{Registry, Svc};
///
/// let parent = Registry::new();
/// parent.singleton(|| Svc::new(5i32)).unwrap();
///
/// let child = parent.child();
/// let inherited: Svc<i32> = child.get().unwrap();
/// assert_eq!(5, *inherited);
///
/// child.singleton(|| Svc::new(6i32)).unwrap();
/// let shadowed: Svc<i32> = child.get().unwrap();
/// let original: Svc<i32> = parent.get().unwrap();
/// assert_eq!((6, 5), (*shadowed, *original));
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Svc<RegistryInner>,
}

impl Registry {
    /// Creates a new, empty registry with no parent.
    #[must_use]
    pub fn new() -> Self {
        Registry::builder().build()
    }

    /// Creates a builder for a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub(crate) fn new_from_parts(
        label: String,
        parent: Option<Registry>,
        dependency_scope: DependencyScope,
    ) -> Self {
        debug!(
            registry = %label,
            parent = parent.as_ref().map(Registry::label),
            ?dependency_scope,
            "created registry"
        );

        Registry {
            inner: Svc::new(RegistryInner {
                label,
                parent,
                dependency_scope,
                bindings: RwLock::new(BindingMap::new()),
            }),
        }
    }

    /// Creates an empty registry that falls back to this one. The child
    /// inherits this registry's [`DependencyScope`].
    #[must_use]
    pub fn child(&self) -> Registry {
        let mut builder = Registry::builder();
        builder.parent(self.clone());
        builder.dependency_scope(self.dependency_scope());
        builder.build()
    }

    /// The registry this one falls back to, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Registry> {
        self.inner.parent.as_ref()
    }

    /// The label used in this registry's log events.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Which registry the parameters of inherited bindings are resolved
    /// from.
    #[must_use]
    pub fn dependency_scope(&self) -> DependencyScope {
        self.inner.dependency_scope
    }

    /// Returns whether two handles refer to the same registry.
    #[must_use]
    pub fn ptr_eq(this: &Registry, other: &Registry) -> bool {
        Svc::ptr_eq(&this.inner, &other.inner)
    }

    /// Declares a binding for every abstraction the resolver produces. The
    /// whole declaration fails, leaving the table untouched, if any of those
    /// abstractions is already bound under `name` in this registry.
    pub fn declare<D, F>(
        &self,
        name: &str,
        lifecycle: Lifecycle,
        resolver: F,
    ) -> InjectResult<()>
    where
        D: 'static,
        F: Resolver<D>,
    {
        let service_infos = <F::Output as Abstractions>::service_infos();
        if service_infos.is_empty() {
            return Err(InjectError::InvalidResolverKind {
                resolver: std::any::type_name::<F>(),
            });
        }

        let resolver = Svc::new(resolver);
        let mut bindings = self.inner.bindings.write();
        for (index, service_info) in service_infos.iter().enumerate() {
            let exists = service_infos[..index].contains(service_info)
                || bindings
                    .get(service_info)
                    .map_or(false, |named| named.contains_key(name));
            if exists {
                return Err(InjectError::DuplicateBinding {
                    service_info: *service_info,
                    name: name.to_owned(),
                });
            }
        }

        for (index, service_info) in service_infos.into_iter().enumerate() {
            let provider = ResolverOutput::<D, F>::new(
                resolver.clone(),
                index,
                service_info,
            );
            let binding =
                Binding::new(service_info, lifecycle, Box::new(provider));
            bindings
                .entry(service_info)
                .or_default()
                .insert(name.to_owned(), Svc::new(binding));

            debug!(
                abstraction = service_info.name(),
                name,
                ?lifecycle,
                registry = self.label(),
                "declared binding"
            );
        }

        Ok(())
    }

    /// Declares a default singleton binding. The resolver runs the first time
    /// its abstraction is resolved, and that instance is reused afterwards.
    ///
    /// ```
    /// use runtime_container::{Registry, Svc};
    ///
    /// #[derive(Default)]
    /// struct Foo;
    ///
    /// let registry = Registry::new();
    /// registry.singleton(|| Svc::new(Foo)).unwrap();
    ///
    /// let foo1: Svc<Foo> = registry.get().unwrap();
    /// let foo2: Svc<Foo> = registry.get().unwrap();
    /// assert!(Svc::ptr_eq(&foo1, &foo2));
    /// ```
    pub fn singleton<D, F>(&self, resolver: F) -> InjectResult<()>
    where
        D: 'static,
        F: Resolver<D>,
    {
        self.declare("", Lifecycle::Singleton, resolver)
    }

    /// Declares a named singleton binding.
    pub fn singleton_named<D, F>(
        &self,
        name: &str,
        resolver: F,
    ) -> InjectResult<()>
    where
        D: 'static,
        F: Resolver<D>,
    {
        self.declare(name, Lifecycle::Singleton, resolver)
    }

    /// Declares a default transient binding. The resolver runs every time its
    /// abstraction is resolved.
    ///
    /// ```
    /// use runtime_container::{Registry, Svc};
    ///
    /// struct Foo;
    ///
    /// let registry = Registry::new();
    /// registry.transient(|| Svc::new(Foo)).unwrap();
    ///
    /// let foo1: Svc<Foo> = registry.get().unwrap();
    /// let foo2: Svc<Foo> = registry.get().unwrap();
    /// assert!(!Svc::ptr_eq(&foo1, &foo2));
    /// ```
    pub fn transient<D, F>(&self, resolver: F) -> InjectResult<()>
    where
        D: 'static,
        F: Resolver<D>,
    {
        self.declare("", Lifecycle::Transient, resolver)
    }

    /// Declares a named transient binding.
    pub fn transient_named<D, F>(
        &self,
        name: &str,
        resolver: F,
    ) -> InjectResult<()>
    where
        D: 'static,
        F: Resolver<D>,
    {
        self.declare(name, Lifecycle::Transient, resolver)
    }

    /// Removes every binding in this registry, including cached singletons.
    /// Parents and children keep their own bindings.
    pub fn reset(&self) {
        let mut bindings = self.inner.bindings.write();
        let removed: usize = bindings.values().map(BTreeMap::len).sum();
        bindings.clear();

        debug!(registry = self.label(), removed, "reset bindings");
    }

    /// Returns whether `I` is bound under `name` in this registry or any of
    /// its parents.
    #[must_use]
    pub fn is_bound<I: ?Sized + Interface>(&self, name: &str) -> bool {
        let service_info = ServiceInfo::of::<I>();
        let mut current = Some(self);
        while let Some(registry) = current {
            if registry.binding(service_info, name).is_some() {
                return true;
            }
            current = registry.parent();
        }

        false
    }

    /// The number of bindings declared in this registry itself.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.bindings.read().values().map(BTreeMap::len).sum()
    }

    /// Returns whether this registry itself has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves the default binding of `I`.
    pub fn get<I: ?Sized + Interface>(&self) -> InjectResult<Svc<I>> {
        self.resolve(&RequestInfo::new())
    }

    /// Resolves the binding of `I` with the given name.
    pub fn get_named<I: ?Sized + Interface>(
        &self,
        name: &str,
    ) -> InjectResult<Svc<I>> {
        self.resolve(&RequestInfo::named(name))
    }

    /// Resolves the default binding of `I` and writes it into `slot`. The
    /// slot is left untouched if resolution fails.
    pub fn fill<I: ?Sized + Interface>(
        &self,
        slot: &mut Option<Svc<I>>,
    ) -> InjectResult<()> {
        self.fill_named("", slot)
    }

    /// Resolves the binding of `I` with the given name and writes it into
    /// `slot`.
    pub fn fill_named<I: ?Sized + Interface>(
        &self,
        name: &str,
        slot: &mut Option<Svc<I>>,
    ) -> InjectResult<()> {
        *slot = Some(self.resolve(&RequestInfo::named(name))?);
        Ok(())
    }

    /// Calls `callback` with each of its parameters resolved from their
    /// default bindings, and returns what it returns.
    ///
    /// ```
    /// use runtime_container::{Registry, Svc};
    ///
    /// let registry = Registry::new();
    /// registry.singleton(|| Svc::new(2i32)).unwrap();
    /// registry.singleton(|| Svc::new(3i64)).unwrap();
    ///
    /// let sum = registry
    ///     .invoke(|a: Svc<i32>, b: Svc<i64>| i64::from(*a) + *b)
    ///     .unwrap();
    /// assert_eq!(5, sum);
    /// ```
    pub fn invoke<D, C>(&self, callback: C) -> InjectResult<C::Output>
    where
        C: Callback<D>,
    {
        callback.call_with(self, &RequestInfo::new())
    }

    /// Calls `callback` with each of its parameters resolved from the
    /// bindings with the given name.
    pub fn invoke_named<D, C>(
        &self,
        name: &str,
        callback: C,
    ) -> InjectResult<C::Output>
    where
        C: Callback<D>,
    {
        callback.call_with(self, &RequestInfo::named(name))
    }

    /// Resolves into a [`Receiver`] using default bindings: a slot is filled
    /// with the instance of its abstraction, a callback is called with its
    /// parameters resolved.
    pub fn make<'a>(&self, receiver: impl Into<Receiver<'a>>) -> InjectResult<()> {
        self.make_named("", receiver)
    }

    /// Resolves into a [`Receiver`] using the bindings with the given name.
    pub fn make_named<'a>(
        &self,
        name: &str,
        receiver: impl Into<Receiver<'a>>,
    ) -> InjectResult<()> {
        let info = RequestInfo::named(name);
        match receiver.into() {
            Receiver::Slot(slot) => {
                let service_info = slot
                    .target()
                    .ok_or(InjectError::CannotDetermineReceiverType)?;
                let instance = self.resolve_dyn(service_info, &info)?;
                slot.put(instance)
            }
            Receiver::Callback(callback) => callback(self, &info),
            Receiver::Value(receiver) => {
                Err(InjectError::InvalidReceiver { receiver })
            }
        }
    }

    /// Lazily resolves every named binding of `I` declared in this registry
    /// itself, in ascending name order. The default binding and the parent's
    /// bindings are skipped.
    #[must_use]
    pub fn named<I: ?Sized + Interface>(&self) -> NamedServices<I> {
        NamedServices::new(self.clone(), self.names(ServiceInfo::of::<I>()))
    }

    /// Calls `consumer` once for every named binding declared in this
    /// registry itself for the abstraction the consumer accepts, in ascending
    /// name order. The default binding and the parent's bindings are skipped.
    ///
    /// The consumer must accept exactly one abstraction (a [`Svc<I>`]).
    ///
    /// ```
    /// use runtime_container::{Registry, Svc};
    ///
    /// let registry = Registry::new();
    /// registry.singleton(|| Svc::new(String::from("default"))).unwrap();
    /// registry.singleton_named("a", || Svc::new(String::from("A"))).unwrap();
    /// registry.transient_named("b", || Svc::new(String::from("B"))).unwrap();
    ///
    /// let mut seen = Vec::new();
    /// registry
    ///     .for_each_named(|value: Svc<String>| seen.push(value.to_string()))
    ///     .unwrap();
    /// assert_eq!(vec!["A", "B"], seen);
    /// ```
    pub fn for_each_named<T, F>(&self, mut consumer: F) -> InjectResult<()>
    where
        T: Request,
        F: FnMut(T),
    {
        let service_info = T::abstraction().ok_or(
            InjectError::InvalidConsumerSignature {
                consumer: std::any::type_name::<F>(),
            },
        )?;

        for name in self.names(service_info) {
            let value = T::request(self, &RequestInfo::named(&name))?;
            consumer(value);
        }

        Ok(())
    }

    pub(crate) fn resolve<I: ?Sized + Interface>(
        &self,
        info: &RequestInfo,
    ) -> InjectResult<Svc<I>> {
        let service_info = ServiceInfo::of::<I>();
        let instance = self.resolve_dyn(service_info, info)?;
        instance
            .downcast_ref::<Svc<I>>()
            .cloned()
            .ok_or(InjectError::InvalidProvider { service_info })
    }

    /// Walks this registry and its parents for a binding, then instantiates
    /// it. Parameters of the binding's resolver are resolved according to
    /// this registry's [`DependencyScope`].
    pub(crate) fn resolve_dyn(
        &self,
        service_info: ServiceInfo,
        info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let mut current = Some(self);
        while let Some(registry) = current {
            if let Some(binding) = registry.binding(service_info, info.name()) {
                trace!(
                    abstraction = service_info.name(),
                    name = info.name(),
                    lifecycle = ?binding.lifecycle(),
                    registry = registry.label(),
                    initiator = self.label(),
                    "resolving binding"
                );

                let scope = match self.dependency_scope() {
                    DependencyScope::Initiating => self,
                    DependencyScope::Declaring => registry,
                };
                return binding.instantiate(scope, info);
            }

            current = registry.parent();
            if let Some(parent) = current {
                trace!(
                    abstraction = service_info.name(),
                    name = info.name(),
                    registry = registry.label(),
                    parent = parent.label(),
                    "delegating to parent"
                );
            }
        }

        Err(InjectError::UnboundAbstraction {
            service_info,
            name: info.name().to_owned(),
        })
    }

    /// Finds a local binding. The table lock is released before returning so
    /// resolvers can use the registry while they run.
    fn binding(
        &self,
        service_info: ServiceInfo,
        name: &str,
    ) -> Option<Svc<Binding>> {
        self.inner
            .bindings
            .read()
            .get(&service_info)
            .and_then(|named| named.get(name))
            .cloned()
    }

    /// Names of the local named bindings of an abstraction.
    fn names(&self, service_info: ServiceInfo) -> Vec<String> {
        self.inner
            .bindings
            .read()
            .get(&service_info)
            .map(|named| {
                named.keys().filter(|name| !name.is_empty()).cloned().collect()
            })
            .unwrap_or_default()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let bindings = self.inner.bindings.read();
        f.debug_struct("Registry")
            .field("label", &self.label())
            .field("dependency_scope", &self.dependency_scope())
            .field(
                "bindings",
                &bindings
                    .iter()
                    .map(|(service_info, named)| {
                        (service_info.name(), named.keys().collect::<Vec<_>>())
                    })
                    .collect::<BTreeMap<_, _>>(),
            )
            .field("parent", &self.parent().map(Registry::label))
            .finish()
    }
}
