use crate::error::{Error, ErrorKind, ErrorOrigin, Result};
use crate::types::Address;

/// The `HmemBackend` trait is implemented by every kind of memory hmem can copy from and to.
///
/// A backend provides the lifecycle hooks for its memory kind
/// (e.g. loading a driver and creating a device context), a copy function for each direction
/// and a predicate that tells wether an address belongs to the memory it manages.
///
/// `init` and `cleanup` are only ever called while the owning
/// [`HmemContext`](super::HmemContext) has exclusive access to the backend.
/// All other functions may be called concurrently from multiple threads.
///
/// # Examples
///
/// Implementing `HmemBackend` for memory that is directly accessible by the host:
/// ```
/// use hmem_core::hmem::HmemBackend;
/// use hmem_core::types::Address;
/// use hmem_core::error::Result;
///
/// pub struct PinnedHost;
///
/// impl HmemBackend for PinnedHost {
///     fn init(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn cleanup(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     unsafe fn copy_to_hmem(&self, dest: Address, src: &[u8]) -> Result<()> {
///         std::ptr::copy(src.as_ptr(), dest.as_mut_ptr(), src.len());
///         Ok(())
///     }
///
///     unsafe fn copy_from_hmem(&self, dest: &mut [u8], src: Address) -> Result<()> {
///         std::ptr::copy(src.as_ptr(), dest.as_mut_ptr(), dest.len());
///         Ok(())
///     }
/// }
/// ```
pub trait HmemBackend: Send + Sync {
    /// Sets up the backend. A failure marks the memory kind as unavailable.
    fn init(&mut self) -> Result<()>;

    /// Tears the backend down. Only called if `init` succeeded.
    fn cleanup(&mut self) -> Result<()>;

    /// Copies all of `src` into the memory at `dest`.
    ///
    /// Either every byte is copied or an error is returned.
    ///
    /// # Safety
    ///
    /// `dest` must point to memory owned by this backend that is valid for writes
    /// of `src.len()` bytes.
    unsafe fn copy_to_hmem(&self, dest: Address, src: &[u8]) -> Result<()>;

    /// Fills all of `dest` with the memory at `src`.
    ///
    /// Either every byte is copied or an error is returned.
    ///
    /// # Safety
    ///
    /// `src` must point to memory owned by this backend that is valid for reads
    /// of `dest.len()` bytes.
    unsafe fn copy_from_hmem(&self, dest: &mut [u8], src: Address) -> Result<()>;

    /// Returns true if `addr` lies within memory owned by this backend.
    ///
    /// Must be free of side effects. The default implementation claims no address,
    /// which is what the host fallback relies on.
    fn is_addr_valid(&self, _addr: Address) -> bool {
        false
    }
}

/// Type of a boxed backend as stored in the operation table.
pub type HmemBackendBox = Box<dyn HmemBackend>;

// forward impls
impl<T: HmemBackend + ?Sized> HmemBackend for Box<T> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn cleanup(&mut self) -> Result<()> {
        (**self).cleanup()
    }

    unsafe fn copy_to_hmem(&self, dest: Address, src: &[u8]) -> Result<()> {
        (**self).copy_to_hmem(dest, src)
    }

    unsafe fn copy_from_hmem(&self, dest: &mut [u8], src: Address) -> Result<()> {
        (**self).copy_from_hmem(dest, src)
    }

    fn is_addr_valid(&self, addr: Address) -> bool {
        (**self).is_addr_valid(addr)
    }
}

/// Placeholder for memory kinds without a registered backend.
///
/// Initialization always fails, so the memory kind stays unavailable for the lifetime
/// of the context.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnavailableBackend;

impl HmemBackend for UnavailableBackend {
    fn init(&mut self) -> Result<()> {
        Err(Error(ErrorOrigin::Backend, ErrorKind::DeviceNotFound))
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    unsafe fn copy_to_hmem(&self, _dest: Address, _src: &[u8]) -> Result<()> {
        Err(Error(ErrorOrigin::Backend, ErrorKind::NotSupported))
    }

    unsafe fn copy_from_hmem(&self, _dest: &mut [u8], _src: Address) -> Result<()> {
        Err(Error(ErrorOrigin::Backend, ErrorKind::NotSupported))
    }
}
