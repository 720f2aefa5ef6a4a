//! Session identity: the correlation token shared by every request of one
//! workflow instance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-workflow correlation token (random v4 UUID).
///
/// Created once when a workflow starts and never changed afterwards. The
/// backend uses it to stitch otherwise-stateless calls into one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_v4_and_distinct() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id: SessionId = "8f14e45f-ceea-467f-a0e6-6b2a9c1d3e4f".parse().unwrap();
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"8f14e45f-ceea-467f-a0e6-6b2a9c1d3e4f\""
        );
        assert_eq!(id.to_string(), "8f14e45f-ceea-467f-a0e6-6b2a9c1d3e4f");
    }

    #[test]
    fn rejects_garbage() {
        assert!("not-a-session".parse::<SessionId>().is_err());
    }
}
