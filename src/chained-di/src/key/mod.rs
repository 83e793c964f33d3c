use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

/// Whether a request asks for one service or for every registered service of
/// a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Resolves to one `Arc<S>`.
    Single,
    /// Resolves to a `Vec<Arc<S>>`, possibly empty.
    Sequence,
}

/// Identifies a request against a container or a service provider.
///
/// A key is made of the service type `S` (usually a `dyn Trait` or a concrete
/// type) and a [`RequestKind`]. Objects resolved for a key of service `S`
/// are always `Arc<S>`, or a list of them for [`RequestKind::Sequence`].
///
/// # Examples
///
/// ```rust
/// # use chained_di::key::{self, RequestKind};
/// let single = key::of::<str>();
/// let sequence = key::all::<str>();
///
/// assert_eq!(single.kind(), RequestKind::Single);
/// assert_eq!(sequence.element(), single);
/// assert_ne!(single, sequence);
/// ```
#[derive(Clone, Copy)]
pub struct ServiceKey {
    service: TypeId,
    name: &'static str,
    kind: RequestKind,
}

impl ServiceKey {
    pub fn new<S>(kind: RequestKind) -> Self
    where
        S: ?Sized + 'static,
    {
        Self {
            service: TypeId::of::<S>(),
            name: any::type_name::<S>(),
            kind,
        }
    }

    /// The [`TypeId`] of the service type, regardless of the request kind.
    pub fn service_type(&self) -> TypeId {
        self.service
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn is_sequence(&self) -> bool {
        self.kind == RequestKind::Sequence
    }

    /// Returns the single-service key of the same service type.
    pub fn element(&self) -> Self {
        Self {
            kind: RequestKind::Single,
            ..*self
        }
    }

    /// Returns the sequence key of the same service type.
    pub fn sequence(&self) -> Self {
        Self {
            kind: RequestKind::Sequence,
            ..*self
        }
    }

    pub fn is<S>(&self) -> bool
    where
        S: ?Sized + 'static,
    {
        self.service == TypeId::of::<S>()
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.service == other.service && self.kind == other.kind
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.service.hash(state);
        self.kind.hash(state);
    }
}

impl Debug for ServiceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for ServiceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            RequestKind::Single => write!(f, "{}", self.name),
            RequestKind::Sequence => write!(f, "[{}]", self.name),
        }
    }
}

/// Returns the key requesting one service of type `S`.
pub fn of<S>() -> ServiceKey
where
    S: ?Sized + 'static,
{
    ServiceKey::new::<S>(RequestKind::Single)
}

/// Returns the key requesting all services of type `S`.
pub fn all<S>() -> ServiceKey
where
    S: ?Sized + 'static,
{
    ServiceKey::new::<S>(RequestKind::Sequence)
}
