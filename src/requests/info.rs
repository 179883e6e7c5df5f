use crate::ServiceInfo;

/// Information about an active request.
///
/// The name selects which binding of an abstraction is resolved. It only
/// applies to the top-level request: the parameters of a resolver are always
/// resolved with the default (unnamed) binding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestInfo {
    name: String,
    service_path: Vec<ServiceInfo>,
}

impl RequestInfo {
    /// Creates a new request for the default (unnamed) binding.
    #[must_use]
    pub fn new() -> Self {
        RequestInfo::default()
    }

    /// Creates a new request for the binding with the given name. An empty
    /// name selects the default binding.
    #[must_use]
    pub fn named(name: &str) -> Self {
        RequestInfo {
            name: name.to_owned(),
            service_path: Vec::new(),
        }
    }

    /// Creates a child request made while resolving `service`. The child
    /// requests the default binding and has `service` appended to its path.
    #[must_use]
    pub fn with_request(&self, service: ServiceInfo) -> Self {
        let mut service_path = self.service_path.clone();
        service_path.push(service);
        RequestInfo {
            name: String::new(),
            service_path,
        }
    }

    /// The binding name being requested. Empty for the default binding.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the current request path. This can be used to configure an
    /// instance based on what it's being injected into.
    ///
    /// # Example
    ///
    /// ```
    /// use runtime_container::{Registry, RequestInfo, ServiceInfo, Svc};
    ///
    /// struct Foo(Svc<Baz>);
    /// struct Baz(i32);
    ///
    /// let registry = Registry::new();
    /// registry
    ///     .transient(|info: RequestInfo| {
    ///         let value = match info.service_path().first() {
    ///             Some(root) if *root == ServiceInfo::of::<Foo>() => 1,
    ///             _ => 0,
    ///         };
    ///         Svc::new(Baz(value))
    ///     })
    ///     .unwrap();
    /// registry.transient(|baz: Svc<Baz>| Svc::new(Foo(baz))).unwrap();
    ///
    /// let foo: Svc<Foo> = registry.get().unwrap();
    /// let baz: Svc<Baz> = registry.get().unwrap();
    ///
    /// assert_eq!(1, foo.0.0);
    /// assert_eq!(0, baz.0);
    /// ```
    #[must_use]
    pub fn service_path(&self) -> &[ServiceInfo] {
        &self.service_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_request_uses_default_name() {
        let info = RequestInfo::named("primary");
        let child = info.with_request(ServiceInfo::of::<i32>());

        assert_eq!("primary", info.name());
        assert_eq!("", child.name());
        assert_eq!(&[ServiceInfo::of::<i32>()], child.service_path());
    }
}
