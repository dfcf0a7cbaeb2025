/*!
Abstraction over an address that may belong to host or device memory.
*/

use std::fmt;
use std::ops;

/// This type represents an address in the process' address space.
///
/// The address is not necessarily dereferencable by the host. Device backends
/// hand out addresses of their own memory which can only be accessed through
/// the backend's copy functions.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(usize);

impl Address {
    pub const NULL: Address = Address(0);

    #[inline]
    pub const fn null() -> Self {
        Address::NULL
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Converts the address into a host pointer.
    ///
    /// The pointer is only valid to dereference if the address belongs to host memory.
    #[inline]
    pub const fn as_ptr(self) -> *const u8 {
        self.0 as *const u8
    }

    /// Converts the address into a mutable host pointer.
    ///
    /// The pointer is only valid to dereference if the address belongs to host memory.
    #[inline]
    pub const fn as_mut_ptr(self) -> *mut u8 {
        self.0 as *mut u8
    }

    /// Adds `len` to the address, returning `None` if the result wraps around
    /// the address space.
    #[inline]
    pub const fn checked_add(self, len: usize) -> Option<Self> {
        match self.0.checked_add(len) {
            Some(v) => Some(Address(v)),
            None => None,
        }
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::null()
    }
}

impl From<usize> for Address {
    #[inline(always)]
    fn from(item: usize) -> Self {
        Self(item)
    }
}

impl<T> From<*const T> for Address {
    #[inline(always)]
    fn from(ptr: *const T) -> Self {
        Self(ptr as usize)
    }
}

impl<T> From<*mut T> for Address {
    #[inline(always)]
    fn from(ptr: *mut T) -> Self {
        Self(ptr as usize)
    }
}

impl<'a, T> From<&'a [T]> for Address {
    #[inline(always)]
    fn from(buf: &'a [T]) -> Self {
        Self(buf.as_ptr() as usize)
    }
}

impl ops::Add<usize> for Address {
    type Output = Self;

    fn add(self, other: usize) -> Self {
        Self(self.0 + other)
    }
}

/// Distance in bytes between two addresses.
///
/// # Examples
///
/// ```
/// use hmem_core::types::Address;
///
/// assert_eq!(Address::from(0x1010usize) - Address::from(0x1000usize), 0x10);
/// ```
impl ops::Sub for Address {
    type Output = usize;

    fn sub(self, other: Self) -> usize {
        self.0 - other.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}
