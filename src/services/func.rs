use crate::{Abstractions, InjectResult, Registry, Request, RequestInfo};

/// A factory for creating instances of one or more abstractions. All
/// functions of arity 12 or less are automatically resolvers if each of their
/// parameters is a valid [`Request`] and their return value implements
/// [`Abstractions`].
///
/// Parameters are resolved by type with the default (unnamed) binding, in
/// parameter order, before the function is called.
///
/// ## Type parameters
/// * `D` - Tuple of this resolver's dependencies.
///
/// ## Example
///
/// ```
/// use runtime_container::{Registry, RequestInfo, Resolver, Svc};
///
/// trait Database: Send + Sync {}
/// struct MySql;
/// impl Database for MySql {}
///
/// fn connect(_port: Svc<u16>) -> Svc<dyn Database> {
///     Svc::new(MySql)
/// }
///
/// let registry = Registry::new();
/// registry.singleton(|| Svc::new(3306u16)).unwrap();
///
/// let database = connect.invoke(&registry, &RequestInfo::new());
/// assert!(database.is_ok());
/// ```
pub trait Resolver<D>: Send + Sync + 'static {
    /// The abstractions produced by invoking this resolver.
    type Output: Abstractions;

    /// Resolves the parameters of this resolver and invokes it.
    fn invoke(
        &self,
        registry: &Registry,
        request_info: &RequestInfo,
    ) -> InjectResult<Self::Output>;
}

/// A function called once with its parameters resolved from a registry. All
/// functions of arity 12 or less whose parameters are valid requests are
/// callbacks. See [`Registry::invoke`].
pub trait Callback<D> {
    /// The value returned by the callback.
    type Output;

    /// Resolves the parameters of this callback and calls it.
    fn call_with(
        self,
        registry: &Registry,
        request_info: &RequestInfo,
    ) -> InjectResult<Self::Output>;
}

macro_rules! impl_function {
    () => {
        impl_function!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_function!(@impl ($first $(, $rest)*));
        impl_function!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        impl<F, R $(, $type_name)*> Resolver<($($type_name,)*)> for F
        where
            F: Fn($($type_name),*) -> R + Send + Sync + 'static,
            R: Abstractions,
            $($type_name: Request,)*
        {
            type Output = R;

            #[allow(unused_variables)]
            fn invoke(
                &self,
                registry: &Registry,
                request_info: &RequestInfo,
            ) -> InjectResult<Self::Output> {
                Ok(self($(<$type_name as Request>::request(registry, request_info)?),*))
            }
        }

        impl<F, R $(, $type_name)*> Callback<($($type_name,)*)> for F
        where
            F: FnOnce($($type_name),*) -> R,
            $($type_name: Request,)*
        {
            type Output = R;

            #[allow(unused_variables)]
            fn call_with(
                self,
                registry: &Registry,
                request_info: &RequestInfo,
            ) -> InjectResult<Self::Output> {
                Ok(self($(<$type_name as Request>::request(registry, request_info)?),*))
            }
        }
    };
}

impl_function!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
