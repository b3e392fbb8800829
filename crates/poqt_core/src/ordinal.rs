//! Integer encoding of enumerated task attributes at the storage boundary.
//!
//! The mapping is versioned: `ORDINAL_VERSION` is written to the config table
//! when a database is created, and a database written by a newer mapping is
//! refused on open rather than misread.

/// Current version of every `Ordinal` mapping in this crate.
pub const ORDINAL_VERSION: u32 = 1;

/// An enum with a stable integer encoding.
pub trait Ordinal: Sized + Copy {
    /// Column name used in error messages when decoding fails.
    const COLUMN: &'static str;

    fn to_ordinal(self) -> i64;

    fn from_ordinal(ordinal: i64) -> Option<Self>;
}

/// Decode an ordinal read from a row, reporting the column on failure.
pub fn decode<T: Ordinal>(ordinal: i64) -> crate::Result<T> {
    T::from_ordinal(ordinal).ok_or_else(|| {
        crate::PoqtError::Storage(format!(
            "unknown {} ordinal {} (ordinal version {})",
            T::COLUMN,
            ordinal,
            ORDINAL_VERSION
        ))
    })
}
