use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chained_di::prelude::*;

pub struct Counter {
    created: AtomicUsize,
}

impl Counter {
    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

pub struct Service;

fn collection(lifetime: ServiceLifetime) -> (ServiceCollection, Arc<Counter>) {
    let counter = Arc::new(Counter {
        created: AtomicUsize::new(0),
    });

    let mut services = ServiceCollection::new();
    let created = Arc::clone(&counter);
    services.add_factory::<Service, _>(lifetime, move |_| {
        created.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Service))
    });
    (services, counter)
}

fn create_scope(provider: &dyn ServiceProvider) -> Box<dyn ServiceScope> {
    provider
        .required_service::<dyn ServiceScopeFactory>()
        .unwrap()
        .create_scope()
        .unwrap()
}

#[test]
fn singleton_lifetime_succeeds() {
    let (services, counter) = collection(ServiceLifetime::Singleton);
    let provider = services.build_service_provider().unwrap();
    let scope = create_scope(&provider);

    let first = provider.required_service::<Service>().unwrap();
    let second = scope.service_provider().required_service::<Service>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(counter.created(), 1);
}

#[test]
fn scoped_lifetime_succeeds() {
    let (services, counter) = collection(ServiceLifetime::Scoped);
    let provider = services.build_service_provider().unwrap();
    let first_scope = create_scope(&provider);
    let second_scope = create_scope(&provider);

    let first = first_scope.service_provider();
    let second = second_scope.service_provider();
    let a = first.required_service::<Service>().unwrap();
    let b = first.required_service::<Service>().unwrap();
    let c = second.required_service::<Service>().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(counter.created(), 2);
}

#[test]
fn transient_lifetime_succeeds() {
    let (services, counter) = collection(ServiceLifetime::Transient);
    let provider = services.build_service_provider().unwrap();

    let a = provider.required_service::<Service>().unwrap();
    let b = provider.required_service::<Service>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(counter.created(), 2);
}

#[test]
fn scope_disposal_releases_scoped_services() {
    let (services, _) = collection(ServiceLifetime::Scoped);
    let provider = services.build_service_provider().unwrap();
    let scope = create_scope(&provider);

    let service = Arc::downgrade(&scope.service_provider().required_service::<Service>().unwrap());
    assert!(service.upgrade().is_some());

    scope.dispose().unwrap();
    assert!(service.upgrade().is_none());
    scope.dispose().unwrap();
}

#[test]
fn disposed_scope_refuses_requests() {
    let (services, _) = collection(ServiceLifetime::Transient);
    let provider = services.build_service_provider().unwrap();
    let child = provider.scope().create_child_scope().unwrap();

    child.dispose().unwrap();
    assert!(child.is_disposed());
    assert!(matches!(
        child.get::<Service>(),
        Err(InjectorError::ScopeDisposed { .. })
    ));
    assert!(matches!(
        child.create_child_scope(),
        Err(InjectorError::ScopeDisposed { .. })
    ));
    assert!(provider.required_service::<Service>().is_ok());
}

#[test]
fn multiple_registrations_succeeds() {
    let mut services = ServiceCollection::new();
    services
        .add_instance::<str>(Arc::from("first"))
        .add_instance::<str>(Arc::from("second"));
    let provider = services.build_service_provider().unwrap();

    assert_eq!(&*provider.required_service::<str>().unwrap(), "second");
    let all: Vec<_> = provider.services::<str>().unwrap();
    let all: Vec<_> = all.iter().map(|s| &**s).collect();
    assert_eq!(all, ["first", "second"]);
    assert!(provider.services::<u8>().unwrap().is_empty());
}
