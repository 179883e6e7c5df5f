use crate::{
    AnySlot, DependencyScope, InjectError, InjectResult, Receiver, Registry,
    ServiceInfo, Svc,
};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicI32, AtomicUsize, Ordering},
        Barrier, Mutex,
    },
    thread,
    time::Duration,
};

trait Shape: Send + Sync {
    fn set_area(&self, area: i32);
    fn area(&self) -> i32;
}

struct Circle(AtomicI32);

impl Circle {
    fn with_area(area: i32) -> Svc<dyn Shape> {
        Svc::new(Circle(AtomicI32::new(area)))
    }
}

impl Shape for Circle {
    fn set_area(&self, area: i32) {
        self.0.store(area, Ordering::SeqCst);
    }

    fn area(&self) -> i32 {
        self.0.load(Ordering::SeqCst)
    }
}

trait Database: Send + Sync {
    fn connect(&self) -> bool;
}

struct MySql;

impl Database for MySql {
    fn connect(&self) -> bool {
        true
    }
}

trait Concrete: Send + Sync {
    fn name(&self) -> &'static str;
}

struct ConcreteA;
struct ConcreteB;
struct ConcreteC;

impl Concrete for ConcreteA {
    fn name(&self) -> &'static str {
        "A"
    }
}

impl Concrete for ConcreteB {
    fn name(&self) -> &'static str {
        "B"
    }
}

impl Concrete for ConcreteC {
    fn name(&self) -> &'static str {
        "C"
    }
}

fn assert_unbound<T>(result: InjectResult<T>, expected: ServiceInfo) {
    match result {
        Err(InjectError::UnboundAbstraction { service_info, .. })
            if service_info == expected => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => panic!("{} should not have been resolved", expected),
    }
}

#[test]
fn singleton_fills_same_instance() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();

    let mut first: Option<Svc<dyn Shape>> = None;
    let mut second: Option<Svc<dyn Shape>> = None;
    registry.fill(&mut first).unwrap();
    registry.fill(&mut second).unwrap();

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!((5, 5), (first.area(), second.area()));

    first.set_area(6);
    assert_eq!(6, second.area());
    assert!(Svc::ptr_eq(&first, &second));
}

#[test]
fn transient_fills_new_instances() {
    let registry = Registry::new();
    registry.transient(|| Circle::with_area(5)).unwrap();

    let mut first: Option<Svc<dyn Shape>> = None;
    let mut second: Option<Svc<dyn Shape>> = None;
    registry.fill(&mut first).unwrap();
    registry.fill(&mut second).unwrap();

    let (first, second) = (first.unwrap(), second.unwrap());
    first.set_area(6);
    assert_eq!(5, second.area());
}

#[test]
fn singleton_visible_through_callbacks() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();

    registry.invoke(|shape: Svc<dyn Shape>| shape.set_area(6)).unwrap();
    let area = registry.invoke(|shape: Svc<dyn Shape>| shape.area()).unwrap();
    assert_eq!(6, area);
}

#[test]
fn named_singleton_differs_from_default() {
    let registry = Registry::new();
    registry
        .singleton(|| Svc::new(ConcreteA) as Svc<dyn Concrete>)
        .unwrap();
    registry
        .singleton_named("named", || Svc::new(ConcreteB) as Svc<dyn Concrete>)
        .unwrap();

    let mut default: Option<Svc<dyn Concrete>> = None;
    let mut named: Option<Svc<dyn Concrete>> = None;
    registry.fill(&mut default).unwrap();
    registry.fill_named("named", &mut named).unwrap();

    assert_eq!("A", default.unwrap().name());
    assert_eq!("B", named.unwrap().name());
}

#[test]
fn named_bindings_are_cached_independently() {
    let registry = Registry::new();
    registry.singleton_named("A", || Circle::with_area(1)).unwrap();
    registry.singleton_named("B", || Circle::with_area(2)).unwrap();

    let a1: Svc<dyn Shape> = registry.get_named("A").unwrap();
    let b1: Svc<dyn Shape> = registry.get_named("B").unwrap();
    let a2: Svc<dyn Shape> = registry.get_named("A").unwrap();

    assert!(!Svc::ptr_eq(&a1, &b1));
    assert!(Svc::ptr_eq(&a1, &a2));
    assert_eq!((1, 2), (a1.area(), b1.area()));
    assert_unbound(registry.get::<dyn Shape>(), ServiceInfo::of::<dyn Shape>());
}

#[test]
fn transient_named_differs_from_default() {
    let registry = Registry::new();
    registry
        .transient(|| Svc::new(ConcreteA) as Svc<dyn Concrete>)
        .unwrap();
    registry
        .transient_named("named", || Svc::new(ConcreteB) as Svc<dyn Concrete>)
        .unwrap();

    let default: Svc<dyn Concrete> = registry.get().unwrap();
    let named: Svc<dyn Concrete> = registry.get_named("named").unwrap();
    assert_eq!(("A", "B"), (default.name(), named.name()));
}

#[test]
fn duplicate_declaration_fails() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();

    match registry.transient(|| Circle::with_area(6)) {
        Err(InjectError::DuplicateBinding { service_info, name })
            if service_info == ServiceInfo::of::<dyn Shape>()
                && name.is_empty() => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => panic!("the default binding was declared twice"),
    }

    let shape: Svc<dyn Shape> = registry.get().unwrap();
    assert_eq!(5, shape.area());
    registry
        .singleton_named("other", || Circle::with_area(6))
        .unwrap();
}

#[test]
fn resolver_parameters_are_resolved() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();
    registry
        .singleton(|shape: Svc<dyn Shape>| {
            assert_eq!(5, shape.area());
            Svc::new(MySql) as Svc<dyn Database>
        })
        .unwrap();

    let database: Svc<dyn Database> = registry.get().unwrap();
    assert!(database.connect());
}

#[test]
fn callback_with_multiple_parameters() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();
    registry
        .singleton(|| Svc::new(MySql) as Svc<dyn Database>)
        .unwrap();

    let (area, connected) = registry
        .invoke(|shape: Svc<dyn Shape>, database: Svc<dyn Database>| {
            (shape.area(), database.connect())
        })
        .unwrap();
    assert_eq!((5, true), (area, connected));
}

#[test]
fn callback_with_unbound_parameter_fails() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();

    let called = AtomicUsize::new(0);
    let result = registry.invoke(|_: Svc<dyn Shape>, _: Svc<dyn Database>| {
        called.fetch_add(1, Ordering::SeqCst);
    });

    assert_unbound(result, ServiceInfo::of::<dyn Database>());
    assert_eq!(0, called.load(Ordering::SeqCst));
}

#[test]
fn unbound_error_propagates_from_dependencies() {
    let registry = Registry::new();
    registry
        .transient(|_: Svc<dyn Database>| Circle::with_area(5))
        .unwrap();

    let mut shape: Option<Svc<dyn Shape>> = None;
    assert_unbound(registry.fill(&mut shape), ServiceInfo::of::<dyn Database>());
    assert!(shape.is_none());
}

#[test]
fn make_accepts_slots_and_callbacks() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();
    registry
        .singleton_named("named", || Circle::with_area(7))
        .unwrap();

    let mut shape: Option<Svc<dyn Shape>> = None;
    registry.make(&mut shape).unwrap();
    assert_eq!(5, shape.unwrap().area());

    let area = AtomicI32::new(0);
    registry
        .make_named(
            "named",
            Receiver::callback(|shape: Svc<dyn Shape>| {
                area.store(shape.area(), Ordering::SeqCst);
            }),
        )
        .unwrap();
    assert_eq!(7, area.load(Ordering::SeqCst));
}

#[test]
fn make_rejects_unsupported_receiver() {
    let registry = Registry::new();
    match registry.make(Receiver::value("STRING!")) {
        Err(InjectError::InvalidReceiver { receiver }) => {
            assert_eq!("str", receiver);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => panic!("a string cannot receive anything"),
    }
}

#[test]
fn make_rejects_untyped_slot() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();

    let mut slot = AnySlot::new();
    match registry.make(&mut slot) {
        Err(InjectError::CannotDetermineReceiverType) => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => panic!("an untyped slot was filled"),
    }
    assert!(slot.instance().is_none());
}

#[test]
fn reset_unbinds_everything() {
    let registry = Registry::new();
    registry.singleton(|| Circle::with_area(5)).unwrap();
    let _shape: Svc<dyn Shape> = registry.get().unwrap();

    registry.reset();

    let mut shape: Option<Svc<dyn Shape>> = None;
    assert_unbound(registry.make(&mut shape), ServiceInfo::of::<dyn Shape>());
    assert!(registry.is_empty());

    registry.singleton(|| Circle::with_area(6)).unwrap();
    assert_eq!(6, registry.get::<dyn Shape>().unwrap().area());
}

#[test]
fn reset_leaves_parent_and_siblings() {
    let parent = Registry::new();
    parent.singleton(|| Circle::with_area(5)).unwrap();

    let child = parent.child();
    let sibling = parent.child();
    child.singleton(|| Svc::new(MySql) as Svc<dyn Database>).unwrap();
    sibling
        .singleton(|| Svc::new(MySql) as Svc<dyn Database>)
        .unwrap();

    child.reset();

    assert_unbound(child.get::<dyn Database>(), ServiceInfo::of::<dyn Database>());
    assert!(sibling.get::<dyn Database>().is_ok());
    assert_eq!(5, child.get::<dyn Shape>().unwrap().area());

    parent.reset();
    assert_unbound(child.get::<dyn Shape>(), ServiceInfo::of::<dyn Shape>());
    assert!(sibling.get::<dyn Database>().is_ok());
}

#[test]
fn for_each_named_visits_named_concretes_only() {
    let registry = Registry::new();
    registry
        .singleton(|| Svc::new(ConcreteA) as Svc<dyn Concrete>)
        .unwrap();
    registry
        .singleton_named("B", || Svc::new(ConcreteB) as Svc<dyn Concrete>)
        .unwrap();
    registry
        .transient_named("C", || Svc::new(ConcreteC) as Svc<dyn Concrete>)
        .unwrap();
    registry.singleton_named("B", || Circle::with_area(1)).unwrap();

    let mut seen = HashSet::new();
    registry
        .for_each_named(|concrete: Svc<dyn Concrete>| {
            assert!(seen.insert(concrete.name()));
        })
        .unwrap();

    assert_eq!(2, seen.len());
    assert!(seen.contains("B"));
    assert!(seen.contains("C"));
}

#[test]
fn for_each_named_respects_lifecycle() {
    let calls = Svc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    let counter = calls.clone();
    registry
        .singleton_named("once", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Circle::with_area(1)
        })
        .unwrap();

    for _ in 0..3 {
        registry.for_each_named(|_: Svc<dyn Shape>| {}).unwrap();
    }
    assert_eq!(1, calls.load(Ordering::SeqCst));
}

#[test]
fn for_each_named_rejects_other_consumers() {
    let registry = Registry::new();
    registry.singleton_named("a", || Circle::with_area(1)).unwrap();

    let result = registry.for_each_named(|_: (Svc<dyn Shape>, Svc<dyn Database>)| {});
    assert!(matches!(
        result,
        Err(InjectError::InvalidConsumerSignature { .. })
    ));

    let result = registry.for_each_named(|_: Option<Svc<dyn Shape>>| {});
    assert!(matches!(
        result,
        Err(InjectError::InvalidConsumerSignature { .. })
    ));
}

#[test]
fn each_registry_resolves_from_itself() {
    let parent = Registry::new();
    parent.singleton(|| Circle::with_area(5)).unwrap();
    let child = parent.child();
    child.singleton(|| Circle::with_area(6)).unwrap();

    let mut shape: Option<Svc<dyn Shape>> = None;
    parent.fill(&mut shape).unwrap();
    assert_eq!(5, shape.as_ref().unwrap().area());

    child.fill(&mut shape).unwrap();
    assert_eq!(6, shape.unwrap().area());

    let grandchild = child.child();
    assert_eq!(6, grandchild.get::<dyn Shape>().unwrap().area());
}

#[test]
fn child_resolves_from_parent() {
    let parent = Registry::new();
    parent.singleton(|| Circle::with_area(5)).unwrap();
    let child = parent.child();

    let from_child: Svc<dyn Shape> = child.get().unwrap();
    let from_parent: Svc<dyn Shape> = parent.get().unwrap();
    assert!(Svc::ptr_eq(&from_child, &from_parent));
}

#[test]
fn empty_output_is_unbound_without_fallback() {
    let parent = Registry::new();
    parent.transient(|| Circle::with_area(5)).unwrap();
    let child = parent.child();
    child.singleton(|| None::<Svc<dyn Shape>>).unwrap();

    let mut shape: Option<Svc<dyn Shape>> = None;
    assert_unbound(child.make(&mut shape), ServiceInfo::of::<dyn Shape>());
    assert!(shape.is_none());
}

#[test]
fn initiating_scope_uses_child_dependencies() {
    let parent = Registry::new();
    parent.singleton(|| Svc::new(1i32)).unwrap();
    parent
        .transient(|value: Svc<i32>| Circle::with_area(*value))
        .unwrap();

    let child = parent.child();
    child.singleton(|| Svc::new(2i32)).unwrap();

    assert_eq!(DependencyScope::Initiating, child.dependency_scope());
    assert_eq!(2, child.get::<dyn Shape>().unwrap().area());
    assert_eq!(1, parent.get::<dyn Shape>().unwrap().area());
}

#[test]
fn declaring_scope_uses_parent_dependencies() {
    let parent = Registry::new();
    parent.singleton(|| Svc::new(1i32)).unwrap();
    parent
        .transient(|value: Svc<i32>| Circle::with_area(*value))
        .unwrap();

    let mut builder = Registry::builder();
    builder.parent(parent.clone());
    builder.dependency_scope(DependencyScope::Declaring);
    let child = builder.build();
    child.singleton(|| Svc::new(2i32)).unwrap();

    assert_eq!(1, child.get::<dyn Shape>().unwrap().area());
    assert_eq!(2, *child.get::<i32>().unwrap());
}

#[test]
fn resolvers_can_request_the_registry() {
    let registry = Registry::new();
    registry.transient(|| Svc::new(3i32)).unwrap();
    registry
        .singleton(|inner: Registry| {
            let value = inner.get::<i32>().map_or(0, |value| *value);
            Circle::with_area(value)
        })
        .unwrap();

    assert_eq!(3, registry.get::<dyn Shape>().unwrap().area());
}

#[test]
fn resolvers_can_declare_while_running() {
    let registry = Registry::new();
    registry
        .singleton(|inner: Registry| {
            inner.singleton(|| Svc::new(MySql) as Svc<dyn Database>).unwrap();
            Circle::with_area(1)
        })
        .unwrap();

    let _shape: Svc<dyn Shape> = registry.get().unwrap();
    assert!(registry.get::<dyn Database>().unwrap().connect());
}

#[test]
fn concurrent_singleton_resolution_invokes_once() {
    const THREADS: usize = 8;

    let calls = Svc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    let counter = calls.clone();
    registry
        .singleton(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Circle::with_area(5)
        })
        .unwrap();

    let barrier = Svc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.get::<dyn Shape>().unwrap()
            })
        })
        .collect();

    let shapes: Vec<Svc<dyn Shape>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(1, calls.load(Ordering::SeqCst));
    assert!(shapes.windows(2).all(|pair| Svc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn different_singletons_do_not_serialize() {
    let registry = Registry::new();
    let order = Svc::new(Mutex::new(Vec::new()));
    let barrier = Svc::new(Barrier::new(2));

    let (slow_order, slow_barrier) = (order.clone(), barrier.clone());
    registry
        .singleton_named("slow", move || {
            slow_barrier.wait();
            slow_order.lock().unwrap().push("slow");
            Circle::with_area(1)
        })
        .unwrap();
    let fast_order = order.clone();
    registry
        .singleton_named("fast", move || {
            fast_order.lock().unwrap().push("fast");
            Circle::with_area(2)
        })
        .unwrap();

    let slow = {
        let registry = registry.clone();
        thread::spawn(move || registry.get_named::<dyn Shape>("slow").unwrap())
    };

    // The slow resolver waits on the barrier while holding its own guard.
    let fast: Svc<dyn Shape> = registry.get_named("fast").unwrap();
    barrier.wait();
    let slow = slow.join().unwrap();

    assert_eq!((1, 2), (slow.area(), fast.area()));
    assert_eq!(vec!["fast", "slow"], *order.lock().unwrap());
}
