/*!
Backend for ordinary host memory.
*/

use std::ptr;

use super::HmemBackend;
use crate::error::Result;
use crate::types::Address;

/// The fallback backend for memory directly accessible by the host.
///
/// Initialization and cleanup are no-ops and copies are plain memory moves.
/// It does not claim any address, every address no device backend claims is host memory.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemBackend;

impl HmemBackend for SystemBackend {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    #[inline]
    unsafe fn copy_to_hmem(&self, dest: Address, src: &[u8]) -> Result<()> {
        if !src.is_empty() {
            ptr::copy(src.as_ptr(), dest.as_mut_ptr(), src.len());
        }
        Ok(())
    }

    #[inline]
    unsafe fn copy_from_hmem(&self, dest: &mut [u8], src: Address) -> Result<()> {
        if !dest.is_empty() {
            ptr::copy(src.as_ptr(), dest.as_mut_ptr(), dest.len());
        }
        Ok(())
    }
}
