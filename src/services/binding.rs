use crate::{
    Abstractions, DynSvc, InjectError, InjectResult, Registry, RequestInfo,
    Resolver, ServiceInfo, Svc,
};
use parking_lot::Mutex;
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};
use tracing::debug;

/// How long an instance produced by a binding lives.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Lifecycle {
    /// The resolver runs on the first resolution only, and that instance is
    /// returned until the registry is reset.
    Singleton,
    /// The resolver runs on every resolution.
    Transient,
}

/// Weakly typed source of instances for a single binding.
pub(crate) trait Provider: Send + Sync {
    /// Creates a new instance of the bound abstraction.
    fn provide(
        &self,
        registry: &Registry,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc>;
}

/// Provides one output of a (possibly multi-output) resolver.
pub(crate) struct ResolverOutput<D, F> {
    resolver: Svc<F>,
    index: usize,
    service_info: ServiceInfo,
    marker: PhantomData<fn(D)>,
}

impl<D, F> ResolverOutput<D, F>
where
    F: Resolver<D>,
{
    pub fn new(resolver: Svc<F>, index: usize, service_info: ServiceInfo) -> Self {
        ResolverOutput {
            resolver,
            index,
            service_info,
            marker: PhantomData,
        }
    }
}

impl<D, F> Provider for ResolverOutput<D, F>
where
    D: 'static,
    F: Resolver<D>,
{
    fn provide(
        &self,
        registry: &Registry,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let output = self
            .resolver
            .invoke(registry, &request_info.with_request(self.service_info))?;

        output
            .into_instances()
            .into_iter()
            .nth(self.index)
            .flatten()
            .ok_or_else(|| InjectError::UnboundAbstraction {
                service_info: self.service_info,
                name: request_info.name().to_owned(),
            })
    }
}

/// A declared mapping from an abstraction and name to a provider.
pub(crate) struct Binding {
    service_info: ServiceInfo,
    lifecycle: Lifecycle,
    provider: Box<dyn Provider>,
    instance: Mutex<Option<DynSvc>>,
}

impl Binding {
    pub fn new(
        service_info: ServiceInfo,
        lifecycle: Lifecycle,
        provider: Box<dyn Provider>,
    ) -> Self {
        Binding {
            service_info,
            lifecycle,
            provider,
            instance: Mutex::new(None),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns an instance of the bound abstraction. The guard on the cached
    /// instance is held while a singleton is first created, so concurrent
    /// first resolutions invoke the resolver once.
    pub fn instantiate(
        &self,
        registry: &Registry,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        match self.lifecycle {
            Lifecycle::Transient => self.provider.provide(registry, request_info),
            Lifecycle::Singleton => {
                let mut instance = self.instance.lock();
                if let Some(ref instance) = *instance {
                    return Ok(instance.clone());
                }

                let created = self.provider.provide(registry, request_info)?;
                debug!(
                    abstraction = self.service_info.name(),
                    name = request_info.name(),
                    registry = registry.label(),
                    "instantiated singleton"
                );
                *instance = Some(created.clone());
                Ok(created)
            }
        }
    }

    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        self.instance.lock().is_some()
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("abstraction", &self.service_info.name())
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}
