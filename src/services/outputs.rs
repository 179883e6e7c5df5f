use crate::{DynSvc, Interface, ServiceInfo, Svc};

/// A single value produced by a resolver. Each one becomes its own binding.
///
/// Returning `None` from a resolver means the resolver had nothing to
/// produce. The binding then fails with
/// [`InjectError::UnboundAbstraction`](crate::InjectError::UnboundAbstraction)
/// and a singleton binding stays uncached.
pub trait Abstraction: Sized + 'static {
    /// The abstraction this value is bound to.
    fn service_info() -> ServiceInfo;

    /// Erases the value so it can be cached by the registry.
    fn into_instance(self) -> Option<DynSvc>;
}

impl<I: ?Sized + Interface> Abstraction for Svc<I> {
    fn service_info() -> ServiceInfo {
        ServiceInfo::of::<I>()
    }

    fn into_instance(self) -> Option<DynSvc> {
        Some(Svc::new(self) as DynSvc)
    }
}

impl<I: ?Sized + Interface> Abstraction for Option<Svc<I>> {
    fn service_info() -> ServiceInfo {
        ServiceInfo::of::<I>()
    }

    fn into_instance(self) -> Option<DynSvc> {
        self.map(|service| Svc::new(service) as DynSvc)
    }
}

/// Every abstraction produced by a resolver. A resolver returning a tuple is
/// bound once per element, and each binding only keeps its own element.
///
/// ```
/// use runtime_container::{Registry, Svc};
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
///
/// struct File;
/// impl Reader for File {}
/// impl Writer for File {}
///
/// let registry = Registry::new();
/// registry
///     .singleton(|| {
///         let file = Svc::new(File);
///         (file.clone() as Svc<dyn Reader>, file as Svc<dyn Writer>)
///     })
///     .unwrap();
///
/// let _reader: Svc<dyn Reader> = registry.get().unwrap();
/// let _writer: Svc<dyn Writer> = registry.get().unwrap();
/// ```
pub trait Abstractions: Sized + 'static {
    /// The abstractions this output is bound to, in output order.
    fn service_infos() -> Vec<ServiceInfo>;

    /// Erases each produced value, in output order.
    fn into_instances(self) -> Vec<Option<DynSvc>>;
}

impl<I: ?Sized + Interface> Abstractions for Svc<I> {
    fn service_infos() -> Vec<ServiceInfo> {
        vec![<Self as Abstraction>::service_info()]
    }

    fn into_instances(self) -> Vec<Option<DynSvc>> {
        vec![self.into_instance()]
    }
}

impl<I: ?Sized + Interface> Abstractions for Option<Svc<I>> {
    fn service_infos() -> Vec<ServiceInfo> {
        vec![<Self as Abstraction>::service_info()]
    }

    fn into_instances(self) -> Vec<Option<DynSvc>> {
        vec![self.into_instance()]
    }
}

macro_rules! impl_tuple_abstractions {
    () => {
        impl_tuple_abstractions!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_tuple_abstractions!(@impl ($first $(, $rest)*));
        impl_tuple_abstractions!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        impl<$($type_name),*> Abstractions for ($($type_name,)*)
        where
            $($type_name: Abstraction,)*
        {
            fn service_infos() -> Vec<ServiceInfo> {
                vec![$(<$type_name as Abstraction>::service_info()),*]
            }

            #[allow(non_snake_case)]
            fn into_instances(self) -> Vec<Option<DynSvc>> {
                let ($($type_name,)*) = self;
                vec![$($type_name.into_instance()),*]
            }
        }
    };
}

impl_tuple_abstractions!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
