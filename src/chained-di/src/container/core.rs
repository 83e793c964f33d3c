use std::collections::HashMap;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};

use crate::container::dispose::{Disposable, DisposalList, DisposeError};
use crate::container::handle::{ContainerOptions, InjectionScope, ScopeId};
use crate::container::injector::{CallContext, InjectorError};
use crate::container::object_map::{ExportId, ObjectMap};
use crate::container::registry::{Registrations, StrategyMap};
use crate::container::Instance;
use crate::key::{RequestKind, ServiceKey};
use crate::lifestyle::Lifestyle;
use crate::strategy::missing::{InjectionContext, MissingExportStrategyProvider};
use crate::strategy::{ActivationContext, Export};

/// One node of the scope tree.
///
/// A child keeps its parent alive, while a parent only keeps weak references
/// to its children so that it can dispose the live ones together with itself.
pub struct ScopeCore {
    id: ScopeId,
    parent: Option<Arc<Self>>,
    children: Mutex<Vec<Weak<Self>>>,
    exports: StrategyMap,
    missing: Arc<[Arc<dyn MissingExportStrategyProvider>]>,
    options: ContainerOptions,
    managed: RwLock<SharedManagedObjectData>,
    disposal: DisposalList,
    disposed: AtomicBool,
}

impl ScopeCore {
    pub fn new_root(registrations: Registrations, options: ContainerOptions) -> Self {
        let core = Self::new_impl(
            None,
            registrations.exports,
            registrations.missing.into(),
            options,
        );
        tracing::trace!(scope = %core.id, "created root scope");
        core
    }

    pub fn new_child(self: &Arc<Self>) -> Result<Arc<Self>, InjectorError> {
        let mut children = self.children.lock();
        // Checked under the lock, so that a concurrent `dispose` either sees
        // the new child or makes this call fail.
        self.ensure_alive()?;

        let child = Arc::new(Self::new_impl(
            Some(Arc::clone(self)),
            StrategyMap::new(),
            Arc::clone(&self.missing),
            self.options,
        ));
        children.retain(|child| child.strong_count() > 0);
        children.push(Arc::downgrade(&child));

        tracing::trace!(scope = %child.id, parent = %self.id, "created child scope");
        Ok(child)
    }

    fn new_impl(
        parent: Option<Arc<Self>>,
        exports: StrategyMap,
        missing: Arc<[Arc<dyn MissingExportStrategyProvider>]>,
        options: ContainerOptions,
    ) -> Self {
        Self {
            id: ScopeId::next(),
            parent,
            children: Mutex::new(Vec::new()),
            exports,
            missing,
            options,
            managed: RwLock::new(SharedManagedObjectData::new()),
            disposal: DisposalList::new(),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Returns the last export registered in this very scope for the service
    /// of `key`. Ancestors are not searched.
    pub fn get_strategy(&self, key: &ServiceKey) -> Option<&Export> {
        self.exports.last(key).map(|(_, export)| export)
    }

    pub fn track_disposable(&self, disposable: Arc<dyn Disposable>) -> Result<(), InjectorError> {
        match self.disposal.track(disposable) {
            Ok(()) => Ok(()),
            Err(disposable) => {
                if let Err(err) = disposable.dispose() {
                    tracing::warn!(scope = %self.id, error = %err, "could not dispose a late disposable");
                }
                Err(InjectorError::ScopeDisposed { scope: self.id })
            }
        }
    }

    pub fn locate(self: &Arc<Self>, context: &CallContext<'_>) -> Result<Instance, InjectorError> {
        self.ensure_alive()?;
        match context.key().kind() {
            RequestKind::Single => self.locate_single(context),
            RequestKind::Sequence => self.locate_sequence(context),
        }
    }

    fn ensure_alive(&self) -> Result<(), InjectorError> {
        if self.is_disposed() {
            Err(InjectorError::ScopeDisposed { scope: self.id })
        } else {
            Ok(())
        }
    }

    fn root(self: &Arc<Self>) -> &Arc<Self> {
        let mut scope = self;
        while let Some(parent) = scope.parent.as_ref() {
            scope = parent;
        }
        scope
    }

    fn locate_single(self: &Arc<Self>, context: &CallContext<'_>) -> Result<Instance, InjectorError> {
        let key = context.key();
        if let Some((declaring, index, export)) = self.find_registration(key) {
            let id = ExportId::Registered {
                scope: declaring.id,
                key: *key,
                index,
            };
            return self.activate(declaring, id, export, context);
        }

        match self.locate_missing(context)? {
            Some(instance) => Ok(instance),
            None => Err(InjectorError::not_found(*key)),
        }
    }

    /// Finds the nearest scope, starting from `self`, with a registration for
    /// the service of `key`.
    fn find_registration(
        self: &Arc<Self>,
        key: &ServiceKey,
    ) -> Option<(&Arc<Self>, usize, &Export)> {
        let mut scope = self;
        loop {
            if let Some((index, export)) = scope.exports.last(key) {
                return Some((scope, index, export));
            }
            scope = scope.parent.as_ref()?;
        }
    }

    fn locate_sequence(
        self: &Arc<Self>,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError> {
        if let Some(instance) = self.locate_missing(context)? {
            return Ok(instance);
        }

        let element = context.key().element();
        let call = context.append(&element);

        let mut chain = Vec::new();
        let mut scope = Some(self);
        while let Some(current) = scope {
            chain.push(current);
            scope = current.parent.as_ref();
        }

        let mut objects = Vec::new();
        for declaring in chain.into_iter().rev() {
            for (index, export) in declaring.exports.all(&element).iter().enumerate() {
                let id = ExportId::Registered {
                    scope: declaring.id,
                    key: element,
                    index,
                };
                match self.activate(declaring, id, export, &call)? {
                    Instance::Single(object) => objects.push(object),
                    Instance::Sequence(_) => return Err(InjectorError::TypeMismatch { key: element }),
                }
            }
        }
        Ok(Instance::Sequence(objects))
    }

    /// Consults the missing export providers in order and activates the first
    /// candidate contributed.
    fn locate_missing(
        self: &Arc<Self>,
        context: &CallContext<'_>,
    ) -> Result<Option<Instance>, InjectorError> {
        if self.missing.is_empty() {
            return Ok(None);
        }

        let key = context.key();
        let scope = InjectionScope::from_core(Arc::clone(self));
        let injection = InjectionContext::new(&scope);

        for provider in self.missing.iter() {
            let Some(export) = provider.provide_exports(&injection, key)?.into_iter().next() else {
                continue;
            };
            let id = ExportId::Contributed { key: *key };
            return self.activate(self.root(), id, &export, context).map(Some);
        }
        Ok(None)
    }

    /// Activates `export` according to its lifestyle. Per-scope objects are
    /// owned by `self`, singletons by the `declaring` scope.
    fn activate(
        self: &Arc<Self>,
        declaring: &Arc<Self>,
        id: ExportId,
        export: &Export,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError> {
        match export.lifestyle() {
            Lifestyle::Transient => self.get_unbounded_object(export, context),
            Lifestyle::SingletonPerScope => self.get_shared_object(id, export, context),
            Lifestyle::Singleton => declaring.get_shared_object(id, export, context),
        }
    }

    fn get_unbounded_object(
        self: &Arc<Self>,
        export: &Export,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError> {
        let key = context.key();
        if context.trace().previous_exist_key(key) {
            Err(InjectorError::CyclicDependency { key: *key })
        } else {
            self.activate_in_self(export, context)
        }
    }

    fn activate_in_self(
        self: &Arc<Self>,
        export: &Export,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError> {
        let scope = InjectionScope::from_core(Arc::clone(self));
        let activation = ActivationContext::new(&scope, context);
        export.strategy().dyn_activate(&activation)
    }

    fn get_shared_object(
        self: &Arc<Self>,
        id: ExportId,
        export: &Export,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError> {
        if let Some(object) = self.managed.read().objects.get(&id) {
            return Ok(object.clone());
        }

        let mut managed = self.managed.write();
        if let Some(object) = managed.objects.get(&id) {
            return Ok(object.clone());
        }

        if let Some(context) = managed.constructing.get_mut(&id) {
            if context.is_constructed_by_current_thread() {
                Err(self.stop_construction_on_cyclic_dependency(managed, &id))
            } else {
                self.wait_for_constructed_object(managed, &id)
            }
        } else {
            self.construct_shared_object(managed, id, export, context)
        }
    }

    fn stop_construction_on_cyclic_dependency(
        &self,
        managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: &ExportId,
    ) -> InjectorError {
        let err = InjectorError::CyclicDependency { key: *id.key() };
        let response = WaitResponse::Error(err.clone());
        self.notify_waiters(managed, id, response);
        err
    }

    fn wait_for_constructed_object(
        &self,
        managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: &ExportId,
    ) -> Result<Instance, InjectorError> {
        let receiver = self.register_waiter_on_object_context(managed, id);
        self.get_object_on_object_context_response(receiver, id)
    }

    fn register_waiter_on_object_context(
        &self,
        mut managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: &ExportId,
    ) -> Receiver<WaitResponse> {
        let (sender, receiver) = oneshot::channel();
        if let Some(context) = managed.constructing.get_mut(id) {
            context.register_waiter(sender);
        }
        receiver
    }

    fn get_object_on_object_context_response(
        &self,
        receiver: Receiver<WaitResponse>,
        id: &ExportId,
    ) -> Result<Instance, InjectorError> {
        match receiver.recv() {
            Ok(WaitResponse::Constructed(object)) => Ok(object),
            Ok(WaitResponse::Error(err)) => Err(err),
            Err(_) => Err(InjectorError::construction(
                *id.key(),
                "the constructing thread gave up without a result",
            )),
        }
    }

    fn construct_shared_object(
        self: &Arc<Self>,
        mut managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: ExportId,
        export: &Export,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError> {
        let on_thread = thread::current().id();
        managed
            .constructing
            .insert(id, ConstructingObjectContext::new(on_thread));
        drop(managed);

        match self.activate_in_self(export, context) {
            Ok(object) => {
                let mut managed = self.managed.write();
                managed.objects.insert(id, object.clone());
                self.notify_waiters(managed, &id, WaitResponse::Constructed(object.clone()));
                tracing::trace!(scope = %self.id, export = %id, "cached shared object");
                Ok(object)
            }
            Err(err) => {
                let managed = self.managed.write();
                self.notify_waiters(managed, &id, WaitResponse::Error(err.clone()));
                Err(err)
            }
        }
    }

    fn notify_waiters(
        &self,
        mut managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: &ExportId,
        response: WaitResponse,
    ) {
        if let Some(context) = managed.constructing.remove(id) {
            drop(managed);
            context.notify(response);
        }
    }

    /// Disposes the live children (most recent first), then the tracked
    /// disposables, then drops the cached objects. Only the first call has
    /// any effect.
    pub fn dispose(&self) -> Result<(), DisposeError> {
        let children = {
            let mut children = self.children.lock();
            if self.disposed.swap(true, Ordering::AcqRel) {
                return Ok(());
            }
            mem::take(&mut *children)
        };
        tracing::trace!(scope = %self.id, "disposing scope");

        let mut first_error = None;
        let mut record = |result: Result<(), DisposeError>| {
            if let Err(err) = result {
                if first_error.is_none() {
                    first_error = Some(err);
                } else {
                    tracing::warn!(scope = %self.id, error = %err, "another disposal error after the first one");
                }
            }
        };

        for child in children.iter().rev().filter_map(Weak::upgrade) {
            record(child.dispose());
        }
        record(self.disposal.dispose());

        let objects = mem::take(&mut self.managed.write().objects);
        drop(objects);

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for ScopeCore {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            tracing::warn!(scope = %self.id, error = %err, "could not dispose a dropped scope");
        }
    }
}

struct SharedManagedObjectData {
    objects: ObjectMap,
    constructing: HashMap<ExportId, ConstructingObjectContext>,
}

impl SharedManagedObjectData {
    fn new() -> Self {
        Self {
            objects: ObjectMap::new(),
            constructing: HashMap::new(),
        }
    }
}

struct ConstructingObjectContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingObjectContext {
    fn new(on_thread: ThreadId) -> Self {
        Self {
            on_thread,
            waiters: Vec::new(),
        }
    }

    fn is_constructed_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn register_waiter(&mut self, sender: Sender<WaitResponse>) {
        self.waiters.push(sender);
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response.clone());
        }
    }
}

#[derive(Debug, Clone)]
enum WaitResponse {
    Constructed(Instance),
    Error(InjectorError),
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::sync::atomic::AtomicUsize;

    use crate::container::dispose::MockDisposable;
    use crate::container::injector::TypedInjector;
    use crate::container::registry::{Configurer, TypedConfigurer};
    use crate::container::Container;
    use crate::key;
    use crate::module::Module;
    use crate::strategy::factory::FactoryStrategy;
    use crate::strategy::instance::InstanceStrategy;

    use super::*;

    struct Leaf {
        id: u32,
    }

    struct Branch {
        left: Arc<Leaf>,
        right: Arc<Leaf>,
    }

    struct Chain;

    impl Module for Chain {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            let ids = Arc::new(AtomicUsize::new(0));
            configurer.register(
                FactoryStrategy::<Leaf>::new(move |_| {
                    let id = ids.fetch_add(1, Ordering::SeqCst) as u32;
                    Ok(Arc::new(Leaf { id }))
                }),
                Lifestyle::Singleton,
            );
            configurer.register(
                FactoryStrategy::<Branch>::new(|injector| {
                    Ok(Arc::new(Branch {
                        left: injector.get::<Leaf>()?,
                        right: injector.get::<Leaf>()?,
                    }))
                }),
                Lifestyle::Singleton,
            );
            Ok(())
        }
    }

    struct Counted {
        serial: usize,
    }

    struct Lifestyles {
        counter: Arc<AtomicUsize>,
    }

    impl Module for Lifestyles {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            let counter = Arc::clone(&self.counter);
            configurer.register(
                FactoryStrategy::<Counted>::new(move |_| {
                    let serial = counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(Counted { serial }))
                }),
                Lifestyle::SingletonPerScope,
            );
            configurer.register(InstanceStrategy::new(Arc::new(1i32)), Lifestyle::Transient);
            configurer.register(InstanceStrategy::new(Arc::new(2i32)), Lifestyle::Transient);
            Ok(())
        }
    }

    struct SelfDependent;

    impl Module for SelfDependent {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            configurer.register(
                FactoryStrategy::<Leaf>::new(|injector| {
                    let inner = injector.get::<Leaf>()?;
                    Ok(Arc::new(Leaf { id: inner.id + 1 }))
                }),
                Lifestyle::Singleton,
            );
            configurer.register(
                FactoryStrategy::<u64>::new(|injector| Ok(Arc::new(*injector.get::<u64>()? + 1))),
                Lifestyle::Transient,
            );
            Ok(())
        }
    }

    #[test]
    fn scope_locate_succeeds_when_singleton_declared_in_ancestor() {
        let container = Container::init(Chain).unwrap();
        let child = container.root().create_child_scope().unwrap();

        let branch = child.get::<Branch>().unwrap();
        assert!(Arc::ptr_eq(&branch.left, &branch.right));
        assert_eq!(branch.left.id, 0);
        assert!(Arc::ptr_eq(&branch, &container.root().get::<Branch>().unwrap()));

        assert_eq!(container.root().core().managed.read().objects.len(), 2);
        assert_eq!(child.core().managed.read().objects.len(), 0);
    }

    #[test]
    fn scope_locate_succeeds_when_accessed_concurrently() {
        let container = Container::init(Chain).unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let scope = container.root().clone();
                thread::spawn(move || scope.get::<Branch>().unwrap())
            })
            .collect();

        let objects: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("Each thread should not `panic!()`"))
            .collect();
        assert!(objects.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn scope_locate_succeeds_per_scope() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::init(Lifestyles {
            counter: Arc::clone(&counter),
        })
        .unwrap();
        let first = container.root().create_child_scope().unwrap();
        let second = container.root().create_child_scope().unwrap();

        let a = first.get::<Counted>().unwrap();
        let b = first.get::<Counted>().unwrap();
        let c = second.get::<Counted>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_ne!(a.serial, c.serial);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn scope_locate_resolves_last_single_and_every_element() {
        let container = Container::init(Lifestyles {
            counter: Arc::new(AtomicUsize::new(0)),
        })
        .unwrap();
        let child = container.root().create_child_scope().unwrap();

        assert_eq!(*child.get::<i32>().unwrap(), 2);
        let all = child.get_all::<i32>().unwrap();
        assert_eq!(all.iter().map(|v| **v).collect::<Vec<_>>(), vec![1, 2]);
        assert!(child.get_all::<u8>().unwrap().is_empty());
    }

    #[test]
    fn scope_locate_fails_when_there_exists_cyclic_dependency() {
        let container = Container::init(SelfDependent).unwrap();

        assert!(matches!(
            container.root().get::<Leaf>(),
            Err(InjectorError::CyclicDependency { .. })
        ));
        assert!(matches!(
            container.root().get::<u64>(),
            Err(InjectorError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn scope_locate_fails_when_key_not_found() {
        let container = Container::empty();

        assert!(matches!(
            container.root().get::<i32>(),
            Err(InjectorError::NotFound { key }) if key == key::of::<i32>()
        ));
    }

    #[test]
    fn scope_dispose_cascades_to_children_once() {
        let container = Container::empty();
        let child = container.root().create_child_scope().unwrap();
        let grandchild = child.create_child_scope().unwrap();

        let mut disposable = MockDisposable::new();
        disposable.expect_dispose().times(1).returning(|| Ok(()));
        grandchild.track_disposable(Arc::new(disposable)).unwrap();

        child.dispose().unwrap();
        child.dispose().unwrap();

        assert!(grandchild.is_disposed());
        assert!(!container.root().is_disposed());
        assert!(matches!(
            grandchild.get::<i32>(),
            Err(InjectorError::ScopeDisposed { scope }) if scope == grandchild.id()
        ));
        assert!(matches!(
            child.create_child_scope(),
            Err(InjectorError::ScopeDisposed { .. })
        ));
    }

    #[test]
    fn scope_track_disposable_fails_when_disposed() {
        let scope = Container::empty().into_root();
        scope.dispose().unwrap();

        let mut late = MockDisposable::new();
        late.expect_dispose().times(1).returning(|| Ok(()));
        assert!(matches!(
            scope.track_disposable(Arc::new(late)),
            Err(InjectorError::ScopeDisposed { .. })
        ));
    }

    #[test]
    fn scope_drop_disposes_tracked_objects() {
        let mut disposable = MockDisposable::new();
        disposable.expect_dispose().times(1).returning(|| Ok(()));

        let scope = Container::empty().into_root();
        let child = scope.create_child_scope().unwrap();
        child.track_disposable(Arc::new(disposable)).unwrap();
        drop(child);
    }
}
