use crate::error::{Error, ErrorKind, ErrorOrigin, Result};
use crate::hmem::HmemBackend;
use crate::types::{size, Address, HmemIov};

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rand::{thread_rng, Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

const NO_FAILURE: usize = usize::MAX;

struct DeviceMemory {
    base: Address,
    mem: Box<[UnsafeCell<u8>]>,

    fail_init: AtomicBool,
    fail_copy_at: AtomicUsize,

    init_calls: AtomicUsize,
    cleanup_calls: AtomicUsize,
    copy_calls: AtomicUsize,
    addr_checks: AtomicUsize,
}

// Accesses go through raw pointers only. Overlapping concurrent copies
// are excluded by the safety contract of the copy functions.
unsafe impl Sync for DeviceMemory {}

/// A simulated device memory backend.
///
/// The memory lives in a host buffer but is exposed at a fake address range in the upper half
/// of the address space that the host can not dereference. Only the copy functions of the
/// backend translate these addresses back into the buffer, with bounds checking.
///
/// Clones share the same memory and statistics, so a clone can be kept around to inspect a
/// device after handing it over to a [`HmemContext`](crate::hmem::HmemContext).
///
/// # Examples
///
/// ```
/// use hmem_core::dummy::DummyDevice;
/// use hmem_core::hmem::{HmemContext, HmemIface};
/// use hmem_core::types::size;
///
/// let dev = DummyDevice::new(size::kb(4));
/// let ctx = HmemContext::builder()
///     .backend(HmemIface::Cuda, dev.clone())
///     .build()
///     .unwrap();
///
/// assert_eq!(ctx.classify(dev.base() + 0x10), HmemIface::Cuda);
///
/// let iov = [dev.iov(0x10, 4).unwrap()];
/// let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Cuda, 0, &[1, 2, 3, 4]) }.unwrap();
/// assert_eq!(done, 4);
/// assert_eq!(dev.read_raw(0x10, 4).unwrap(), vec![1, 2, 3, 4]);
/// ```
#[derive(Clone)]
pub struct DummyDevice {
    inner: Arc<DeviceMemory>,
}

impl DummyDevice {
    /// Creates a new device with `size` bytes of zeroed memory at a random base address.
    pub fn new(size: usize) -> Self {
        let mut rng = XorShiftRng::seed_from_u64(thread_rng().gen());

        // place the device on a power of two boundary in the upper half of the address space
        let align = size.max(size::kb(4)).next_power_of_two();
        let upper_half = usize::MAX / 2 + 1;
        let slots = (usize::MAX - upper_half) / align;
        let base = Address::from(upper_half + rng.gen_range(0, slots) * align);

        Self::with_base(base, size)
    }

    /// Creates a new device with `size` bytes of zeroed memory at the given base address.
    pub fn with_base(base: Address, size: usize) -> Self {
        let mem = (0..size)
            .map(|_| UnsafeCell::new(0u8))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            inner: Arc::new(DeviceMemory {
                base,
                mem,
                fail_init: AtomicBool::new(false),
                fail_copy_at: AtomicUsize::new(NO_FAILURE),
                init_calls: AtomicUsize::new(0),
                cleanup_calls: AtomicUsize::new(0),
                copy_calls: AtomicUsize::new(0),
                addr_checks: AtomicUsize::new(0),
            }),
        }
    }

    /// Makes every following call to `init` fail, as if no device was present.
    pub fn failing_init(self) -> Self {
        self.inner.fail_init.store(true, Ordering::SeqCst);
        self
    }

    /// Makes the copy call with the given zero based number fail.
    ///
    /// Calls are counted over both directions.
    pub fn failing_copy_at(self, call: usize) -> Self {
        self.inner.fail_copy_at.store(call, Ordering::SeqCst);
        self
    }

    pub fn base(&self) -> Address {
        self.inner.base
    }

    pub fn size(&self) -> usize {
        self.inner.mem.len()
    }

    /// Returns a segment covering `len` bytes of device memory starting at `offset`.
    pub fn iov(&self, offset: usize, len: usize) -> Result<HmemIov> {
        self.check_range(offset, len)?;
        Ok(HmemIov::new(self.base() + offset, len))
    }

    /// Reads device memory directly, bypassing the backend interface.
    ///
    /// Not synchronized with copies that are in flight.
    pub fn read_raw(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.check_range(offset, len)?;
        let mut out = vec![0u8; len];
        unsafe { ptr::copy(self.mem_ptr().add(offset), out.as_mut_ptr(), len) };
        Ok(out)
    }

    /// Writes device memory directly, bypassing the backend interface.
    ///
    /// Not synchronized with copies that are in flight.
    pub fn write_raw(&self, offset: usize, data: &[u8]) -> Result<()> {
        self.check_range(offset, data.len())?;
        unsafe { ptr::copy(data.as_ptr(), self.mem_ptr().add(offset), data.len()) };
        Ok(())
    }

    /// Number of times `init` was called.
    pub fn init_calls(&self) -> usize {
        self.inner.init_calls.load(Ordering::SeqCst)
    }

    /// Number of times `cleanup` was called.
    pub fn cleanup_calls(&self) -> usize {
        self.inner.cleanup_calls.load(Ordering::SeqCst)
    }

    /// Number of times one of the copy functions was called.
    pub fn copy_calls(&self) -> usize {
        self.inner.copy_calls.load(Ordering::SeqCst)
    }

    /// Number of times `is_addr_valid` was called.
    pub fn addr_checks(&self) -> usize {
        self.inner.addr_checks.load(Ordering::SeqCst)
    }

    fn mem_ptr(&self) -> *mut u8 {
        // UnsafeCell<u8> has the same in-memory representation as u8
        self.inner.mem.as_ptr() as *mut u8
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(Error(ErrorOrigin::Backend, ErrorKind::OutOfBounds)),
        }
    }

    fn translate(&self, addr: Address, len: usize) -> Result<*mut u8> {
        if addr < self.base() {
            return Err(Error(ErrorOrigin::Backend, ErrorKind::OutOfBounds));
        }
        let offset = addr - self.base();
        self.check_range(offset, len)?;
        Ok(unsafe { self.mem_ptr().add(offset) })
    }

    fn next_copy(&self, kind: ErrorKind) -> Result<()> {
        let call = self.inner.copy_calls.fetch_add(1, Ordering::SeqCst);
        if call == self.inner.fail_copy_at.load(Ordering::SeqCst) {
            Err(Error(ErrorOrigin::Backend, kind))
        } else {
            Ok(())
        }
    }
}

impl HmemBackend for DummyDevice {
    fn init(&mut self) -> Result<()> {
        self.inner.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_init.load(Ordering::SeqCst) {
            Err(Error(ErrorOrigin::Backend, ErrorKind::DeviceNotFound))
        } else {
            Ok(())
        }
    }

    fn cleanup(&mut self) -> Result<()> {
        self.inner.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    unsafe fn copy_to_hmem(&self, dest: Address, src: &[u8]) -> Result<()> {
        self.next_copy(ErrorKind::UnableToWriteMemory)?;
        let dest = self.translate(dest, src.len())?;
        ptr::copy(src.as_ptr(), dest, src.len());
        Ok(())
    }

    unsafe fn copy_from_hmem(&self, dest: &mut [u8], src: Address) -> Result<()> {
        self.next_copy(ErrorKind::UnableToReadMemory)?;
        let src = self.translate(src, dest.len())?;
        ptr::copy(src, dest.as_mut_ptr(), dest.len());
        Ok(())
    }

    fn is_addr_valid(&self, addr: Address) -> bool {
        self.inner.addr_checks.fetch_add(1, Ordering::SeqCst);
        HmemIov::new(self.base(), self.size()).contains(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_base_in_upper_half() {
        let dev = DummyDevice::new(size::kb(64));
        assert!(dev.base().as_usize() > usize::MAX / 2);
        assert_eq!(dev.base().as_usize() % size::kb(64), 0);
        assert!(dev.base().checked_add(dev.size()).is_some());
    }

    #[test]
    fn addr_valid_range() {
        let dev = DummyDevice::with_base(Address::from(0x10_0000usize), 0x100);
        assert!(dev.is_addr_valid(Address::from(0x10_0000usize)));
        assert!(dev.is_addr_valid(Address::from(0x10_00ffusize)));
        assert!(!dev.is_addr_valid(Address::from(0x10_0100usize)));
        assert!(!dev.is_addr_valid(Address::from(0x0f_ffffusize)));
        assert_eq!(dev.addr_checks(), 4);
    }

    #[test]
    fn copy_bounds() {
        let dev = DummyDevice::new(0x100);
        let out_of_range = unsafe { dev.copy_to_hmem(dev.base() + 0xfe, &[1, 2, 3]) };
        assert_eq!(
            out_of_range,
            Err(Error(ErrorOrigin::Backend, ErrorKind::OutOfBounds))
        );

        unsafe { dev.copy_to_hmem(dev.base() + 0xfd, &[1, 2, 3]) }.unwrap();
        let mut out = [0u8; 3];
        unsafe { dev.copy_from_hmem(&mut out, dev.base() + 0xfd) }.unwrap();
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(dev.copy_calls(), 3);
    }

    #[test]
    fn clones_share_memory() {
        let dev = DummyDevice::new(0x10);
        let other = dev.clone();
        other.write_raw(4, &[0xaa]).unwrap();
        assert_eq!(dev.read_raw(4, 1).unwrap(), vec![0xaa]);
        assert!(dev.read_raw(0x10, 1).is_err());
    }

    #[test]
    fn injected_failures() {
        let mut dev = DummyDevice::new(0x10).failing_init().failing_copy_at(1);
        assert!(dev.init().is_err());
        assert_eq!(dev.init_calls(), 1);

        unsafe { dev.copy_to_hmem(dev.base(), &[1]) }.unwrap();
        assert_eq!(
            unsafe { dev.copy_to_hmem(dev.base(), &[1]) },
            Err(Error(ErrorOrigin::Backend, ErrorKind::UnableToWriteMemory))
        );
        unsafe { dev.copy_to_hmem(dev.base(), &[1]) }.unwrap();
    }
}
