/*!
The per-process table of memory kinds and their backends.
*/

use log::{debug, info, warn};

use super::{HmemArgs, HmemBackend, HmemBackendBox, HmemIface, SystemBackend, UnavailableBackend};
use crate::error::{Error, ErrorKind, ErrorOrigin, Result};
use crate::types::Address;


/// Operation table entry of a single memory kind.
pub struct HmemOps {
    iface: HmemIface,
    initialized: bool,
    backend: HmemBackendBox,
}

impl HmemOps {
    fn new(iface: HmemIface, backend: HmemBackendBox) -> Self {
        Self {
            iface,
            initialized: false,
            backend,
        }
    }

    pub fn iface(&self) -> HmemIface {
        self.iface
    }

    /// Returns true if the backend's init hook succeeded.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    fn init(&mut self) {
        match self.backend.init() {
            Ok(()) => {
                info!("initialized hmem iface {}", self.iface);
                self.initialized = true;
            }
            Err(err) if self.iface == HmemIface::System => {
                warn!(
                    "failed to initialize hmem iface {}: {}, falling back to plain host copies",
                    self.iface, err
                );
                self.backend = Box::new(SystemBackend);
                self.initialized = true;
            }
            Err(err) => {
                warn!("failed to initialize hmem iface {}: {}", self.iface, err);
            }
        }
    }

    fn cleanup(&mut self) {
        if !self.initialized {
            return;
        }

        match self.backend.cleanup() {
            Ok(()) => debug!("cleaned up hmem iface {}", self.iface),
            Err(err) => warn!("failed to clean up hmem iface {}: {}", self.iface, err),
        }
    }

    fn backend(&self) -> Result<&dyn HmemBackend> {
        if self.initialized {
            Ok(&*self.backend)
        } else {
            Err(Error(ErrorOrigin::HmemIface, ErrorKind::Uninitialized))
        }
    }
}

/// Holds the backends of all memory kinds and their initialization state.
///
/// Constructing a context through [`HmemContextBuilder::build`] initializes every backend,
/// dropping it cleans up every backend that was initialized successfully.
/// Once constructed the context is read-only, so it can be shared between threads
/// and all classification and copy functions can be called concurrently.
///
/// # Examples
///
/// ```
/// use hmem_core::hmem::{HmemContext, HmemIface};
/// use hmem_core::types::HmemIov;
///
/// let ctx = HmemContext::builder().build().unwrap();
///
/// let mut device = [0u8; 8];
/// let iov = [HmemIov::from(&mut device[..])];
///
/// assert_eq!(ctx.classify(iov[0].base), HmemIface::System);
///
/// let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::System, 2, &[1, 2, 3]) }.unwrap();
/// assert_eq!(done, 3);
/// assert_eq!(device, [0, 0, 1, 2, 3, 0, 0, 0]);
/// ```
pub struct HmemContext {
    ops: Vec<HmemOps>,
}

impl HmemContext {
    /// Returns a new builder for a context with the host backend pre-registered.
    pub fn builder() -> HmemContextBuilder {
        HmemContextBuilder::new()
    }

    /// Creates a context that only knows about host memory.
    pub fn system_only() -> Self {
        Self::with_backends(Default::default(), &[true; HmemIface::COUNT])
    }

    fn with_backends(
        mut backends: [Option<HmemBackendBox>; HmemIface::COUNT],
        enabled: &[bool; HmemIface::COUNT],
    ) -> Self {
        let ops = HmemIface::ALL
            .iter()
            .map(|iface| {
                let backend = backends[iface.index()]
                    .take()
                    .unwrap_or_else(|| default_backend(*iface));
                HmemOps::new(*iface, backend)
            })
            .collect::<Vec<_>>();

        let mut ctx = Self { ops };
        ctx.init_all(enabled);
        ctx
    }

    /// Runs the init hook of every enabled memory kind in ascending order.
    ///
    /// Failures are logged and leave the memory kind uninitialized.
    fn init_all(&mut self, enabled: &[bool; HmemIface::COUNT]) {
        for ops in self.ops.iter_mut() {
            if enabled[ops.iface.index()] {
                ops.init();
            } else {
                info!("hmem iface {} disabled by configuration", ops.iface);
            }
        }
    }

    /// Runs the cleanup hook of every initialized memory kind.
    fn cleanup_all(&mut self) {
        for ops in self.ops.iter_mut() {
            ops.cleanup();
        }
    }

    #[inline]
    fn ops(&self, iface: HmemIface) -> &HmemOps {
        &self.ops[iface.index()]
    }

    /// Returns the backend of an initialized memory kind.
    pub(crate) fn iface_backend(&self, iface: HmemIface) -> Result<&dyn HmemBackend> {
        self.ops(iface).backend()
    }

    /// Returns true if the given memory kind was initialized successfully.
    pub fn is_initialized(&self, iface: HmemIface) -> bool {
        self.ops(iface).initialized()
    }

    /// Returns all memory kinds that were initialized successfully, in ascending order.
    pub fn initialized_ifaces(&self) -> impl Iterator<Item = HmemIface> + '_ {
        self.ops
            .iter()
            .filter(|ops| ops.initialized())
            .map(HmemOps::iface)
    }

    /// Determines which kind of memory `addr` belongs to.
    ///
    /// Device kinds are asked from the highest to the lowest, the first one claiming the
    /// address wins. Uninitialized kinds are never asked. Addresses no device claims are
    /// host memory.
    pub fn classify(&self, addr: Address) -> HmemIface {
        let iface = self
            .ops
            .iter()
            .skip(HmemIface::System.index() + 1)
            .rev()
            .find(|ops| ops.initialized && ops.backend.is_addr_valid(addr))
            .map(HmemOps::iface)
            .unwrap_or(HmemIface::System);

        debug!("classified {:x} as {}", addr, iface);
        iface
    }

    /// Copies `src` into memory of kind `iface` at `dest`.
    ///
    /// The result of the backend is returned unchanged.
    /// Fails with `ErrorKind::Uninitialized` if the memory kind is not available.
    ///
    /// # Safety
    ///
    /// `dest` must point to memory of kind `iface` that is valid for writes of `src.len()` bytes.
    #[inline]
    pub unsafe fn copy_to_hmem(&self, iface: HmemIface, dest: Address, src: &[u8]) -> Result<()> {
        self.iface_backend(iface)?.copy_to_hmem(dest, src)
    }

    /// Fills `dest` from memory of kind `iface` at `src`.
    ///
    /// The result of the backend is returned unchanged.
    /// Fails with `ErrorKind::Uninitialized` if the memory kind is not available.
    ///
    /// # Safety
    ///
    /// `src` must point to memory of kind `iface` that is valid for reads of `dest.len()` bytes.
    #[inline]
    pub unsafe fn copy_from_hmem(
        &self,
        iface: HmemIface,
        dest: &mut [u8],
        src: Address,
    ) -> Result<()> {
        self.iface_backend(iface)?.copy_from_hmem(dest, src)
    }
}

impl Default for HmemContext {
    fn default() -> Self {
        Self::system_only()
    }
}

impl Drop for HmemContext {
    fn drop(&mut self) {
        self.cleanup_all();
    }
}

fn default_backend(iface: HmemIface) -> HmemBackendBox {
    match iface {
        HmemIface::System => Box::new(SystemBackend),
        _ => Box::new(UnavailableBackend),
    }
}

/// The builder interface for constructing a `HmemContext` object.
pub struct HmemContextBuilder {
    backends: [Option<HmemBackendBox>; HmemIface::COUNT],
    args: HmemArgs,
}

impl HmemContextBuilder {
    /// Creates a new `HmemContext` builder.
    ///
    /// Host memory is always backed by [`SystemBackend`] unless replaced.
    /// Device kinds without a registered backend will fail to initialize.
    pub fn new() -> Self {
        Self {
            backends: Default::default(),
            args: HmemArgs::default(),
        }
    }

    /// Registers the backend for a memory kind, replacing any previously registered one.
    ///
    /// Host memory must stay usable without setup. If a backend registered for
    /// `HmemIface::System` fails to initialize it is replaced by [`SystemBackend`].
    pub fn backend<B: HmemBackend + 'static>(mut self, iface: HmemIface, backend: B) -> Self {
        self.backends[iface.index()] = Some(Box::new(backend));
        self
    }

    /// Sets the arguments used to enable or disable memory kinds.
    pub fn args(mut self, args: HmemArgs) -> Self {
        self.args = args;
        self
    }

    /// Builds the context and initializes all enabled memory kinds.
    ///
    /// Only invalid arguments make this function fail. A backend failing to initialize
    /// is logged and leaves its memory kind unavailable.
    pub fn build(self) -> Result<HmemContext> {
        self.args.validate()?;

        let mut enabled = [true; HmemIface::COUNT];
        for iface in HmemIface::ALL.iter() {
            enabled[iface.index()] = self.args.is_enabled(*iface)?;
        }

        Ok(HmemContext::with_backends(self.backends, &enabled))
    }
}

impl Default for HmemContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
