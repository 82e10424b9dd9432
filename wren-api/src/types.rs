use std::any::Any;
use std::fmt;

use uuid::Uuid;

/// An untyped message. The runtime never looks inside it.
pub type BoxedMessage = Box<dyn Any + Send>;

/// Opaque identity of one actor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generates a fresh, process-unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines and thread names readable.
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ActorId::new();
        let b = ActorId::new();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_display_is_short() {
        let id = ActorId::new();
        assert_eq!(id.to_string().len(), 8);
        assert!(id.as_uuid().simple().to_string().starts_with(&id.to_string()));
    }
}
