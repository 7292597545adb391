use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn is_asc(self) -> bool {
        matches!(self, Self::Asc)
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

///
/// SortKey
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SortKey {
    pub path: String,
    pub direction: Direction,
}

impl SortKey {
    #[must_use]
    pub fn new(path: impl Into<String>, direction: Direction) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }

    #[must_use]
    pub fn asc(path: impl Into<String>) -> Self {
        Self::new(path, Direction::Asc)
    }

    #[must_use]
    pub fn desc(path: impl Into<String>) -> Self {
        Self::new(path, Direction::Desc)
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.path.clone(), self.direction.reverse())
    }
}

///
/// SortSpec
///
/// Ordered sort keys, most significant first. Empty means "identifier order".
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, IntoIterator, PartialEq, Serialize)]
#[into_iterator(owned, ref)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn asc(mut self, path: impl Into<String>) -> Self {
        self.0.push(SortKey::asc(path));
        self
    }

    #[must_use]
    pub fn desc(mut self, path: impl Into<String>) -> Self {
        self.0.push(SortKey::desc(path));
        self
    }

    pub fn push(&mut self, key: SortKey) {
        self.0.push(key);
    }

    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        self.0.iter().any(|key| key.path == path)
    }

    /// First occurrence of each path wins; later repeats can never decide
    /// the order.
    #[must_use]
    pub fn deduped(&self) -> Self {
        let mut out = Self::new();
        for key in &self.0 {
            if !out.contains_path(&key.path) {
                out.push(key.clone());
            }
        }

        out
    }

    /// Append identifier leaf paths (ascending) that are not already keys,
    /// making the order total.
    #[must_use]
    pub fn with_tiebreak<S: AsRef<str>>(&self, identifier_paths: &[S]) -> Self {
        let mut out = self.deduped();
        for path in identifier_paths {
            let path = path.as_ref();
            if !out.contains_path(path) {
                out.push(SortKey::asc(path));
            }
        }

        out
    }

    /// Every key flipped; the order for walking the list backwards.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().map(SortKey::reversed).collect())
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(|key| key.path.clone()).collect()
    }
}

impl FromIterator<SortKey> for SortSpec {
    fn from_iter<I: IntoIterator<Item = SortKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }
}
