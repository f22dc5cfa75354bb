//! Opaque qubit handles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a live qubit
///
/// Handles are 128-bit random tokens: they carry no information about the
/// qubit's bit position, which only the registry knows. Copyable and cheap
/// to hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitHandle(u128);

impl QubitHandle {
    /// Wrap a raw token value
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// The raw token value
    pub fn as_raw(&self) -> u128 {
        self.0
    }
}

impl fmt::Debug for QubitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QubitHandle({:#034x})", self.0)
    }
}

impl fmt::Display for QubitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is enough to tell handles apart in logs
        write!(f, "q:{:08x}", (self.0 >> 96) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        let h = QubitHandle::from_raw(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(h.as_raw(), 0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
    }

    #[test]
    fn test_display_is_short() {
        let h = QubitHandle::from_raw(u128::MAX);
        assert_eq!(format!("{}", h), "q:ffffffff");
    }
}
