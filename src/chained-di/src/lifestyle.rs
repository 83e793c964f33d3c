use std::fmt::{Display, Formatter, Result as FmtResult};

/// How long an object created by a container is reused.
///
/// A shared object (see [`Lifestyle::is_shared`]) is cached by the scope
/// that owns it and handed out again on later requests. Its creation happens
/// at most once per owning scope, even if several threads request it at the
/// same time. A transient object is created on every request and only its
/// construction is managed by the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifestyle {
    /// A new object for every request.
    #[default]
    Transient,
    /// One object for each scope, owned by the requesting scope.
    SingletonPerScope,
    /// One object for the lifetime of the scope declaring the export, which
    /// is the root scope for everything registered at container creation.
    Singleton,
}

impl Lifestyle {
    pub fn is_shared(self) -> bool {
        !matches!(self, Self::Transient)
    }

    /// Returns the name of the lifestyle in a string literal.
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Transient => "Transient",
            Self::SingletonPerScope => "SingletonPerScope",
            Self::Singleton => "Singleton",
        }
    }
}

impl Display for Lifestyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}
