#![allow(clippy::used_underscore_binding)]

use derive_more::{Display, Error};
use std::{
    any::{Any, TypeId},
    fmt::{Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
};

/// A reference-counted pointer holding an instance of an abstraction.
pub type Svc<T> = std::sync::Arc<T>;

/// A type-erased service pointer. The pointee is always the [`Svc<I>`] that
/// was produced for the abstraction `I`, which lets the registry hand back
/// pointers to unsized abstractions like `dyn Trait`.
pub type DynSvc = Svc<dyn Any + Send + Sync>;

/// A result from attempting to declare or resolve a binding.
pub type InjectResult<T> = Result<T, InjectError>;

/// Implemented automatically on every type that can be used as an
/// abstraction. Trait objects are the usual choice, in which case the trait
/// needs [`Send`] and [`Sync`] as supertraits:
///
/// ```
/// use runtime_container::{Interface, ServiceInfo};
///
/// trait Database: Send + Sync {
///     fn connect(&self) -> bool;
/// }
///
/// fn assert_interface<I: ?Sized + Interface>() -> ServiceInfo {
///     ServiceInfo::of::<I>()
/// }
///
/// assert!(assert_interface::<dyn Database>().name().contains("Database"));
/// ```
pub trait Interface: Any + Send + Sync {}
impl<T: ?Sized + Any + Send + Sync> Interface for T {}

/// Type information about an abstraction. Two infos are equal exactly when
/// they describe the same type; the name is only kept for messages.
#[derive(Clone, Copy, Debug)]
pub struct ServiceInfo {
    id: TypeId,
    name: &'static str,
}

impl ServiceInfo {
    /// Creates a [`ServiceInfo`] for the given type.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        ServiceInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Gets the [`TypeId`] for this abstraction.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Gets the type name of this abstraction.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceInfo {}

impl Hash for ServiceInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for ServiceInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}

/// An error that has occurred while declaring or resolving a binding.
#[derive(Debug, Display, Error)]
#[display(fmt = "an error occurred during injection: {}")]
#[non_exhaustive]
pub enum InjectError {
    /// The resolver does not produce any abstraction, so there is nothing to
    /// bind it to.
    #[display(fmt = "the resolver {} does not produce any abstraction", resolver)]
    InvalidResolverKind {
        /// The type name of the rejected resolver.
        resolver: &'static str,
    },

    /// A binding for the abstraction and name already exists in the
    /// registry's own table.
    #[display(
        fmt = "a binding already exists for the abstraction: {}{}",
        "service_info.name()",
        "fmt_name(name)"
    )]
    DuplicateBinding {
        /// The abstraction that was declared.
        service_info: ServiceInfo,
        /// The binding name. Empty for the default binding.
        name: String,
    },

    /// No binding was found anywhere in the registry chain, or the resolver
    /// of the binding produced nothing.
    #[display(
        fmt = "no binding found for the abstraction: {}{}",
        "service_info.name()",
        "fmt_name(name)"
    )]
    UnboundAbstraction {
        /// The abstraction that was requested.
        service_info: ServiceInfo,
        /// The binding name. Empty for the default binding.
        name: String,
    },

    /// The receiver is neither a slot nor a callback.
    #[display(
        fmt = "the receiver must be either a slot or a callback, got {}",
        receiver
    )]
    InvalidReceiver {
        /// The type name of the rejected receiver.
        receiver: &'static str,
    },

    /// The slot does not carry the type of the abstraction to resolve.
    #[display(fmt = "cannot determine the abstraction the receiver expects")]
    CannotDetermineReceiverType,

    /// The consumer passed to `for_each_named` does not accept exactly one
    /// abstraction.
    #[display(
        fmt = "the consumer {} must accept exactly one abstraction",
        consumer
    )]
    InvalidConsumerSignature {
        /// The type name of the rejected consumer.
        consumer: &'static str,
    },

    /// A binding produced an instance of the wrong type. This is usually
    /// caused by a bug in the library itself.
    #[display(
        fmt = "the binding for {} produced the wrong type",
        "service_info.name()"
    )]
    InvalidProvider {
        /// The abstraction that was requested.
        service_info: ServiceInfo,
    },
}

fn fmt_name(name: &str) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!(" (named {:?})", name)
    }
}
