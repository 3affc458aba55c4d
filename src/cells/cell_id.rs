use std::{fmt, sync::Arc};

/// Stable key for a grid cell.
/// Keeps the original id text (with leading zeros) but avoids repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(Arc<str>);

impl CellId {
    pub fn new(id: &str) -> Self { Self(Arc::from(id)) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CellId {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for CellId {
    fn from(id: String) -> Self { Self(Arc::from(id)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_leading_zeros() {
        assert_eq!(CellId::new("000123").as_str(), "000123");
        assert_eq!(CellId::from(String::from("007")).to_string(), "007");
    }

    #[test]
    fn clones_share_storage() {
        let a = CellId::new("r12c4");
        let b = a.clone();
        assert_eq!(a, b);
        assert!(std::ptr::eq(a.as_str(), b.as_str()));
    }
}
