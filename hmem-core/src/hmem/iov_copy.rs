/*!
Scatter-gather copies between a contiguous host buffer and a list of segments.
*/

use std::ops::Range;

use log::trace;

use super::{HmemContext, HmemIface};
use crate::error::{PartialError, PartialResult, Result};
use crate::types::{Address, HmemIov};

#[cfg(test)]
mod tests;

impl HmemContext {
    /// Copies `src` into the logical byte range described by `iov`, starting `iov_offset`
    /// bytes into it. Every segment must be memory of kind `iface`.
    ///
    /// Returns the number of bytes copied. This is less than `src.len()` if the segments
    /// starting at `iov_offset` are too short to hold all of `src`.
    ///
    /// If a backend copy fails the copy stops immediately and the error is returned
    /// as `PartialError::PartialCopy` together with the number of bytes copied before
    /// the failing segment. Nothing is rolled back.
    ///
    /// # Safety
    ///
    /// Every segment in `iov` must describe memory of kind `iface` that is valid for writes
    /// of the segment's full length.
    pub unsafe fn copy_to_hmem_iov(
        &self,
        iov: &[HmemIov],
        iface: HmemIface,
        iov_offset: usize,
        src: &[u8],
    ) -> PartialResult<usize> {
        let backend = self.iface_backend(iface)?;
        copy_hmem_iov_buf(iov, iov_offset, src.len(), |addr, range| {
            backend.copy_to_hmem(addr, &src[range])
        })
    }

    /// Fills `dest` from the logical byte range described by `iov`, starting `iov_offset`
    /// bytes into it. Every segment must be memory of kind `iface`.
    ///
    /// Returns the number of bytes copied. This is less than `dest.len()` if the segments
    /// starting at `iov_offset` hold fewer bytes; the remainder of `dest` is left untouched.
    ///
    /// If a backend copy fails the copy stops immediately and the error is returned
    /// as `PartialError::PartialCopy` together with the number of bytes copied before
    /// the failing segment. The contents of `dest` past that count are unspecified.
    ///
    /// # Safety
    ///
    /// Every segment in `iov` must describe memory of kind `iface` that is valid for reads
    /// of the segment's full length.
    pub unsafe fn copy_from_hmem_iov(
        &self,
        dest: &mut [u8],
        iov: &[HmemIov],
        iface: HmemIface,
        iov_offset: usize,
    ) -> PartialResult<usize> {
        let backend = self.iface_backend(iface)?;
        let size = dest.len();
        copy_hmem_iov_buf(iov, iov_offset, size, |addr, range| {
            backend.copy_from_hmem(&mut dest[range], addr)
        })
    }
}

/// Walks `iov` and calls `copy` once for every segment touched by the
/// range `[iov_offset, iov_offset + size)`.
///
/// `copy` receives the address inside the segment and the matching range of the host buffer.
///
/// A segment is only skipped if the remaining offset is strictly larger than its length.
/// An offset equal to the segment length visits the segment with an empty range.
fn copy_hmem_iov_buf<F>(
    iov: &[HmemIov],
    iov_offset: usize,
    size: usize,
    mut copy: F,
) -> PartialResult<usize>
where
    F: FnMut(Address, Range<usize>) -> Result<()>,
{
    let mut offset = iov_offset;
    let mut size = size;
    let mut done = 0;

    for (i, v) in iov.iter().enumerate() {
        if size == 0 {
            break;
        }

        if offset > v.len {
            offset -= v.len;
            continue;
        }

        let addr = v.base + offset;
        let len = (v.len - offset).min(size);

        trace!("iov[{}]: copying {:x} bytes at {:x}", i, len, addr);

        if let Err(err) = copy(addr, done..done + len) {
            trace!("iov[{}]: copy failed after {:x} bytes: {}", i, done, err);
            return Err(PartialError::PartialCopy(done, err));
        }

        offset = 0;
        size -= len;
        done += len;
    }

    Ok(done)
}
