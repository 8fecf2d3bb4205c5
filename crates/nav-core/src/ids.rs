//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash`.  The inner integer is `pub` so the loaders
//! can build them straight from decoded records, but indexing code should go
//! through `.index()`.
//!
//! `EdgeId` indexes the contracted graph's edge array, while
//! `OriginalEdgeId` indexes the pre-contraction metadata arrays.  The two
//! spaces are unrelated; keeping them as distinct types stops one being used
//! to index the other.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Dense index of a graph vertex, `0..node_count`.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index into the contracted graph's edge array.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Index into the original (pre-contraction) edge metadata arrays.
    pub struct OriginalEdgeId(u32);
}

typed_id! {
    /// Street-name identifier.  `NameId(0)` is the empty name.
    pub struct NameId(u32);
}

impl NameId {
    /// The name id reported by backends that cannot resolve names.
    pub const EMPTY: NameId = NameId(0);
}
