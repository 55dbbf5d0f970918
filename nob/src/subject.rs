//! Subject identities tracked by the Coordinator

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of an observable entity
///
/// The Coordinator only compares and hashes these; it never looks at the
/// entity behind them. The nil UUID names no entity and is rejected on
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectRef(Uuid);

impl SubjectRef {
    /// Mint a fresh, time-ordered identity
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The nil identity, which never satisfies the subject capability
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this identity can be registered
    pub fn is_valid(&self) -> bool {
        !self.0.is_nil()
    }
}

impl Default for SubjectRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subject-{}", self.0)
    }
}

impl FromStr for SubjectRef {
    type Err = uuid::Error;

    /// Accepts both the bare UUID and the `subject-` prefixed display form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("subject-").unwrap_or(s);
        Uuid::parse_str(raw).map(Self)
    }
}

impl From<Uuid> for SubjectRef {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Anything the Coordinator can track
///
/// Implement this for your own entity types so they can be passed straight to
/// [`Coordinator::register`](crate::Coordinator::register) and friends.
pub trait Subject {
    fn subject_ref(&self) -> SubjectRef;
}

impl Subject for SubjectRef {
    fn subject_ref(&self) -> SubjectRef {
        *self
    }
}

impl<T: Subject + ?Sized> Subject for &T {
    fn subject_ref(&self) -> SubjectRef {
        (**self).subject_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        id: SubjectRef,
    }

    impl Subject for Node {
        fn subject_ref(&self) -> SubjectRef {
            self.id
        }
    }

    #[test]
    fn test_new_identities_are_distinct_and_valid() {
        let a = SubjectRef::new();
        let b = SubjectRef::new();
        assert_ne!(a, b);
        assert!(a.is_valid());
        assert!(b.is_valid());
    }

    #[test]
    fn test_nil_is_invalid() {
        assert!(!SubjectRef::nil().is_valid());
        assert_eq!(SubjectRef::nil().as_uuid(), &Uuid::nil());
    }

    #[test]
    fn test_display_and_parse() {
        let subject = SubjectRef::new();
        let shown = subject.to_string();
        assert!(shown.starts_with("subject-"));

        assert_eq!(shown.parse::<SubjectRef>().unwrap(), subject);
        assert_eq!(subject.as_uuid().to_string().parse::<SubjectRef>().unwrap(), subject);
        assert!("subject-not-a-uuid".parse::<SubjectRef>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let subject = SubjectRef::new();
        let json = serde_json::to_string(&subject).unwrap();
        assert_eq!(json, format!("\"{}\"", subject.as_uuid()));
    }

    #[test]
    fn test_entity_identity_comes_from_subject_ref() {
        let id = SubjectRef::new();
        let node = Node { id };
        assert_eq!(node.subject_ref(), id);
        assert_eq!((&node).subject_ref(), id);
    }
}
