/*!
Identifiers for the different kinds of memory known to hmem.
*/

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, ErrorOrigin, Result};

/// Identifies the kind of memory an address belongs to.
///
/// The numeric value of each variant is its index into the operation table
/// of a [`HmemContext`](crate::hmem::HmemContext).
/// `System` is the fallback kind and always has the lowest value.
/// Classification gives precedence to higher values.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum HmemIface {
    /// Ordinary host memory.
    System = 0,
    /// NVIDIA CUDA device memory.
    Cuda = 1,
    /// AMD ROCr device memory.
    Rocr = 2,
    /// Intel oneAPI Level Zero device memory.
    Ze = 3,
}

impl HmemIface {
    /// Number of memory kinds, i.e. the size of every operation table.
    pub const COUNT: usize = 4;

    /// All memory kinds in ascending order.
    pub const ALL: [HmemIface; HmemIface::COUNT] = [
        HmemIface::System,
        HmemIface::Cuda,
        HmemIface::Rocr,
        HmemIface::Ze,
    ];

    /// Returns the index of this kind in the operation table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the kind stored at the given table index.
    pub fn from_index(idx: usize) -> Result<Self> {
        Self::ALL
            .get(idx)
            .copied()
            .ok_or(Error(ErrorOrigin::HmemIface, ErrorKind::InvalidKind))
    }

    /// Returns a static string representing the memory kind.
    pub const fn to_str(self) -> &'static str {
        match self {
            HmemIface::System => "system",
            HmemIface::Cuda => "cuda",
            HmemIface::Rocr => "rocr",
            HmemIface::Ze => "ze",
        }
    }

    /// Returns true for every kind except the host fallback.
    #[inline]
    pub const fn is_device(self) -> bool {
        !matches!(self, HmemIface::System)
    }
}

impl Default for HmemIface {
    fn default() -> Self {
        HmemIface::System
    }
}

impl TryFrom<u32> for HmemIface {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        Self::from_index(raw as usize)
    }
}

impl From<HmemIface> for u32 {
    fn from(iface: HmemIface) -> Self {
        iface as u32
    }
}

impl FromStr for HmemIface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|iface| iface.to_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(Error(ErrorOrigin::HmemIface, ErrorKind::InvalidKind))
    }
}

impl fmt::Display for HmemIface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
