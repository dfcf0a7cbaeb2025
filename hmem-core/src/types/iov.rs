/*!
Scatter-gather segment type.
*/

use super::Address;

/// A single segment of a scattered memory region.
///
/// A list of segments describes one logical, contiguous byte range.
/// Segments only describe memory, they neither own it nor keep it alive.
///
/// # Examples
///
/// ```
/// use hmem_core::types::{iov_total_len, HmemIov};
///
/// let mut first = [0u8; 4];
/// let mut second = [0u8; 8];
/// let iov = [HmemIov::from(&mut first[..]), HmemIov::from(&mut second[..])];
///
/// assert_eq!(iov_total_len(&iov), 12);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HmemIov {
    pub base: Address,
    pub len: usize,
}

impl HmemIov {
    pub const fn new(base: Address, len: usize) -> Self {
        Self { base, len }
    }

    /// Returns the address one past the last byte of this segment.
    #[inline]
    pub fn end(&self) -> Address {
        self.base + self.len
    }

    /// Checks wether `addr` lies within this segment.
    #[inline]
    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.base && addr < self.end()
    }
}

impl<'a> From<&'a mut [u8]> for HmemIov {
    fn from(buf: &'a mut [u8]) -> Self {
        Self::new(Address::from(buf.as_mut_ptr()), buf.len())
    }
}

/// Returns the combined length of all segments.
pub fn iov_total_len(iov: &[HmemIov]) -> usize {
    iov.iter().map(|v| v.len).sum()
}
