use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque identifier of an authenticated user as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Returns `None` for blank identifiers; a subject must always be addressable.
    pub fn new<S: Into<String>>(raw: S) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str { &self.0 }
}
