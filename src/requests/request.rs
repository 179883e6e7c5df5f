use crate::{
    InjectError, InjectResult, Interface, Registry, RequestInfo, ServiceInfo,
    Svc,
};

/// A request to a registry. Every parameter of a resolver or callback is a
/// request.
///
/// # Grouping requests
///
/// Requests can be grouped together by using tuples to make multiple requests
/// at once. Since there is a limit of 12 supported parameters for resolvers,
/// tuples can also be used to get around that limitation.
///
/// ```
/// use runtime_container::{Registry, Svc};
///
/// struct Bar;
/// struct Baz;
/// struct Foo(Svc<Bar>, Svc<Baz>);
///
/// let registry = Registry::new();
/// registry.singleton(|| Svc::new(Bar)).unwrap();
/// registry.singleton(|| Svc::new(Baz)).unwrap();
/// registry
///     .singleton(|(bar, baz): (Svc<Bar>, Svc<Baz>)| Svc::new(Foo(bar, baz)))
///     .unwrap();
///
/// let _foo: Svc<Foo> = registry.get().unwrap();
/// ```
pub trait Request: Sized + 'static {
    /// Performs the request to the registry.
    fn request(registry: &Registry, info: &RequestInfo) -> InjectResult<Self>;

    /// The abstraction this request resolves, if it resolves exactly one.
    fn abstraction() -> Option<ServiceInfo> {
        None
    }
}

/// Requests the registry that initiated the resolution.
impl Request for Registry {
    fn request(registry: &Registry, _info: &RequestInfo) -> InjectResult<Self> {
        Ok(registry.clone())
    }
}

/// Requests the information about the current request.
impl Request for RequestInfo {
    fn request(_registry: &Registry, info: &RequestInfo) -> InjectResult<Self> {
        Ok(info.clone())
    }
}

/// Requests an instance of an abstraction.
impl<I: ?Sized + Interface> Request for Svc<I> {
    fn request(registry: &Registry, info: &RequestInfo) -> InjectResult<Self> {
        registry.resolve(info)
    }

    fn abstraction() -> Option<ServiceInfo> {
        Some(ServiceInfo::of::<I>())
    }
}

/// Tries to request an instance of an abstraction. If nothing is bound to it,
/// then returns `None`. Failures while resolving the dependencies of the
/// binding are still returned as errors.
impl<I: ?Sized + Interface> Request for Option<Svc<I>> {
    fn request(registry: &Registry, info: &RequestInfo) -> InjectResult<Self> {
        match registry.resolve::<I>(info) {
            Ok(service) => Ok(Some(service)),
            Err(InjectError::UnboundAbstraction { service_info, .. })
                if service_info == ServiceInfo::of::<I>() =>
            {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

macro_rules! impl_tuple_request {
    () => {
        impl_tuple_request!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_tuple_request!(@impl ($first $(, $rest)*));
        impl_tuple_request!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        /// Performs multiple requests at once. This is useful for grouping
        /// together related requests.
        impl<$($type_name),*> Request for ($($type_name,)*)
        where
            $($type_name: Request,)*
        {
            #[allow(unused_variables)]
            fn request(registry: &Registry, info: &RequestInfo) -> InjectResult<Self> {
                Ok(($(<$type_name as Request>::request(registry, info)?,)*))
            }
        }
    };
}

impl_tuple_request!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
