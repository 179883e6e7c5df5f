use crate::{
    Callback, DynSvc, InjectError, InjectResult, Interface, Registry,
    RequestInfo, ServiceInfo, Svc,
};
use std::fmt::{Debug, Formatter};

/// A place a resolved instance can be written to.
pub trait Slot {
    /// The abstraction this slot holds, or `None` if it carries no type.
    fn target(&self) -> Option<ServiceInfo>;

    /// Stores a resolved instance of [`Slot::target`] in this slot.
    fn put(&mut self, instance: DynSvc) -> InjectResult<()>;
}

impl<I: ?Sized + Interface> Slot for Option<Svc<I>> {
    fn target(&self) -> Option<ServiceInfo> {
        Some(ServiceInfo::of::<I>())
    }

    fn put(&mut self, instance: DynSvc) -> InjectResult<()> {
        let service = instance.downcast_ref::<Svc<I>>().cloned().ok_or(
            InjectError::InvalidProvider {
                service_info: ServiceInfo::of::<I>(),
            },
        )?;
        *self = Some(service);
        Ok(())
    }
}

/// A slot holding a type-erased instance. It carries no abstraction of its
/// own, so it can only be read from and never filled by a registry.
#[derive(Clone, Debug, Default)]
pub struct AnySlot {
    instance: Option<DynSvc>,
}

impl AnySlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        AnySlot::default()
    }

    /// Creates a slot already holding an instance.
    #[must_use]
    pub fn with_instance(instance: DynSvc) -> Self {
        AnySlot {
            instance: Some(instance),
        }
    }

    /// Gets the instance in this slot, if any.
    #[must_use]
    pub fn instance(&self) -> Option<&DynSvc> {
        self.instance.as_ref()
    }
}

impl Slot for AnySlot {
    fn target(&self) -> Option<ServiceInfo> {
        None
    }

    fn put(&mut self, instance: DynSvc) -> InjectResult<()> {
        self.instance = Some(instance);
        Ok(())
    }
}

/// Type-erased callback created by [`Receiver::callback`].
type DynCallback<'a> =
    Box<dyn FnOnce(&Registry, &RequestInfo) -> InjectResult<()> + 'a>;

/// Anything that can receive resolved instances through
/// [`Registry::make`].
///
/// ```
/// use runtime_container::{InjectError, Receiver, Registry, Svc};
///
/// trait Shape: Send + Sync {
///     fn area(&self) -> i32;
/// }
///
/// struct Circle(i32);
/// impl Shape for Circle {
///     fn area(&self) -> i32 {
///         self.0
///     }
/// }
///
/// let registry = Registry::new();
/// registry.singleton(|| Svc::new(Circle(5)) as Svc<dyn Shape>).unwrap();
///
/// // Fill a slot
/// let mut shape: Option<Svc<dyn Shape>> = None;
/// registry.make(&mut shape).unwrap();
/// assert_eq!(5, shape.unwrap().area());
///
/// // Call a function with its parameters resolved
/// registry
///     .make(Receiver::callback(|shape: Svc<dyn Shape>| {
///         assert_eq!(5, shape.area());
///     }))
///     .unwrap();
///
/// // Anything else is rejected
/// let result = registry.make(Receiver::value(&"STRING!"));
/// assert!(matches!(result, Err(InjectError::InvalidReceiver { .. })));
/// ```
pub enum Receiver<'a> {
    /// A slot filled with the resolved instance of its abstraction.
    Slot(&'a mut dyn Slot),
    /// A callback called with each of its parameters resolved.
    Callback(DynCallback<'a>),
    /// A value that is neither, identified by its type name.
    Value(&'static str),
}

impl<'a> Receiver<'a> {
    /// Creates a receiver that fills the given slot.
    pub fn slot(slot: &'a mut dyn Slot) -> Self {
        Receiver::Slot(slot)
    }

    /// Creates a receiver that calls the given callback. Whatever the
    /// callback returns is discarded.
    pub fn callback<D, C>(callback: C) -> Self
    where
        C: Callback<D> + 'a,
    {
        Receiver::Callback(Box::new(move |registry: &Registry, info: &RequestInfo| {
            callback.call_with(registry, info).map(drop)
        }))
    }

    /// Creates a receiver for a value that cannot receive anything. Making
    /// it always fails with [`InjectError::InvalidReceiver`].
    pub fn value<T: ?Sized>(_value: &T) -> Self {
        Receiver::Value(std::any::type_name::<T>())
    }
}

impl<'a, I: ?Sized + Interface> From<&'a mut Option<Svc<I>>> for Receiver<'a> {
    fn from(slot: &'a mut Option<Svc<I>>) -> Self {
        Receiver::Slot(slot)
    }
}

impl<'a> From<&'a mut AnySlot> for Receiver<'a> {
    fn from(slot: &'a mut AnySlot) -> Self {
        Receiver::Slot(slot)
    }
}

impl Debug for Receiver<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Receiver::Slot(slot) => f
                .debug_tuple("Slot")
                .field(&slot.target().map(|target| target.name()))
                .finish(),
            Receiver::Callback(_) => f.write_str("Callback"),
            Receiver::Value(receiver) => {
                f.debug_tuple("Value").field(receiver).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_slot_targets_its_abstraction() {
        let mut slot: Option<Svc<i32>> = None;
        assert_eq!(Some(ServiceInfo::of::<i32>()), slot.target());

        slot.put(Svc::new(Svc::new(4)) as DynSvc).unwrap();
        assert_eq!(Some(4), slot.as_deref().copied());
    }

    #[test]
    fn typed_slot_rejects_wrong_instance() {
        let mut slot: Option<Svc<i32>> = None;
        let result = slot.put(Svc::new(Svc::new(4u8)) as DynSvc);
        assert!(matches!(result, Err(InjectError::InvalidProvider { .. })));
        assert!(slot.is_none());
    }

    #[test]
    fn value_receiver_keeps_type_name() {
        match Receiver::value(&5u64) {
            Receiver::Value(name) => assert_eq!("u64", name),
            receiver => panic!("unexpected receiver {:?}", receiver),
        }
    }
}
