use serde::Serialize;

/// Outcome of an upstream fetch that is never allowed to fail.
///
/// Either the value came from the upstream (`Extracted`) or the fetch failed
/// and a fallback was substituted (`Defaulted`). Both carry a usable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Fetched<T> {
    Extracted(T),
    Defaulted { value: T, reason: String },
}

impl<T> Fetched<T> {
    pub fn defaulted(value: T, reason: impl Into<String>) -> Self {
        Self::Defaulted {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Extracted(value) => value,
            Self::Defaulted { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Extracted(value) => value,
            Self::Defaulted { value, .. } => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }

    /// Why the fallback was used, if it was
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Extracted(_) => None,
            Self::Defaulted { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Extracted(value) => Fetched::Extracted(f(value)),
            Self::Defaulted { value, reason } => Fetched::Defaulted {
                value: f(value),
                reason,
            },
        }
    }
}
