use ::log::info;
use ::std::sync::atomic::{AtomicU64, Ordering};
use ::std::sync::Mutex;
use ::std::time::{Duration, Instant};

use super::HmemBackend;
use crate::error::Result;
use crate::types::Address;

/// The metrics middleware collects metrics data (latency and number of bytes) for all copies
/// in both directions.
/// Additionally metrics are outputted via `::log::info` in regular intervals and when the
/// backend is cleaned up.
///
/// Since this middleware implements [`HmemBackend`] it can be registered in a
/// [`HmemContext`](super::HmemContext) in place of the backend it wraps.
pub struct HmemMetrics<T> {
    backend: T,
    to_hmem: CopyHistory,
    from_hmem: CopyHistory,
    interval: coarsetime::Duration,
    last_info: Mutex<coarsetime::Instant>,
}

impl<T: HmemBackend> HmemMetrics<T> {
    /// Constructs a new middleware that logs at most once per second.
    pub fn new(backend: T) -> Self {
        Self::with_interval(backend, coarsetime::Duration::from_secs(1))
    }

    /// Constructs a new middleware with a custom logging interval.
    pub fn with_interval(backend: T, interval: coarsetime::Duration) -> Self {
        Self {
            backend,
            to_hmem: CopyHistory::default(),
            from_hmem: CopyHistory::default(),
            interval,
            last_info: Mutex::new(coarsetime::Instant::now()),
        }
    }

    /// Returns the metrics of all copies into the wrapped memory.
    pub fn to_hmem(&self) -> CopyMetrics {
        self.to_hmem.snapshot()
    }

    /// Returns the metrics of all copies out of the wrapped memory.
    pub fn from_hmem(&self) -> CopyMetrics {
        self.from_hmem.snapshot()
    }

    /// Consumes self and returns the wrapped backend.
    ///
    /// # Examples
    /// ```
    /// use hmem_core::hmem::{HmemBackend, HmemMetrics, SystemBackend};
    ///
    /// fn build<T: HmemBackend>(backend: T) -> T {
    ///     let middleware = HmemMetrics::new(backend);
    ///
    ///     // use the middleware...
    ///     let mut value = [0u8; 4];
    ///     let src = [1u8, 2, 3, 4];
    ///     unsafe { middleware.copy_from_hmem(&mut value, (&src[..]).into()) }.unwrap();
    ///     assert_eq!(value, src);
    ///     assert_eq!(middleware.from_hmem().bytes, 4);
    ///
    ///     // retrieve ownership of the backend and return it back
    ///     middleware.into_inner()
    /// }
    /// # build(SystemBackend);
    /// ```
    pub fn into_inner(self) -> T {
        self.backend
    }

    fn maybe_log(&self) {
        // skip if another thread is logging right now
        if let Ok(mut last_info) = self.last_info.try_lock() {
            if last_info.elapsed() >= self.interval {
                self.log_metrics();
                *last_info = coarsetime::Instant::now();
            }
        }
    }

    fn log_metrics(&self) {
        for (name, metrics) in [("to", self.to_hmem()), ("from", self.from_hmem())].iter() {
            info!(
                "Copy {} hmem metrics: copies={} failures={} bytes={} average_latency={:.4}ms average_bytes={}",
                name,
                metrics.count,
                metrics.failures,
                metrics.bytes,
                metrics.average_latency().unwrap_or_default().as_secs_f64() * 1000f64,
                metrics.average_bytes().unwrap_or_default(),
            );
        }
    }
}

impl<T: HmemBackend> HmemBackend for HmemMetrics<T> {
    #[inline]
    fn init(&mut self) -> Result<()> {
        self.backend.init()
    }

    fn cleanup(&mut self) -> Result<()> {
        self.log_metrics();
        self.backend.cleanup()
    }

    #[inline]
    unsafe fn copy_to_hmem(&self, dest: Address, src: &[u8]) -> Result<()> {
        let start_time = Instant::now();
        let result = self.backend.copy_to_hmem(dest, src);
        self.to_hmem.add(start_time.elapsed(), src.len(), result.is_ok());
        self.maybe_log();
        result
    }

    #[inline]
    unsafe fn copy_from_hmem(&self, dest: &mut [u8], src: Address) -> Result<()> {
        let start_time = Instant::now();
        let len = dest.len();
        let result = self.backend.copy_from_hmem(dest, src);
        self.from_hmem.add(start_time.elapsed(), len, result.is_ok());
        self.maybe_log();
        result
    }

    #[inline]
    fn is_addr_valid(&self, addr: Address) -> bool {
        self.backend.is_addr_valid(addr)
    }
}

/// Accumulated metrics of all copies in one direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CopyMetrics {
    /// Number of copies, including failed ones.
    pub count: u64,
    /// Number of copies the backend reported an error for.
    pub failures: u64,
    /// Number of bytes copied successfully.
    pub bytes: u64,
    /// Time spent inside the backend.
    pub latency: Duration,
}

impl CopyMetrics {
    pub fn average_latency(&self) -> Option<Duration> {
        if self.count > 0 {
            Some(Duration::from_nanos((self.latency.as_nanos() / self.count as u128) as u64))
        } else {
            None
        }
    }

    pub fn average_bytes(&self) -> Option<u64> {
        let succeeded = self.count.saturating_sub(self.failures);
        if succeeded > 0 {
            Some(self.bytes / succeeded)
        } else {
            None
        }
    }
}

#[derive(Default)]
struct CopyHistory {
    count: AtomicU64,
    failures: AtomicU64,
    bytes: AtomicU64,
    latency_ns: AtomicU64,
}

impl CopyHistory {
    fn add(&self, latency: Duration, bytes: usize, ok: bool) {
        self.count.fetch_add(1, Ordering::Relaxed);
        if ok {
            self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.latency_ns.fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CopyMetrics {
        CopyMetrics {
            count: self.count.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            latency: Duration::from_nanos(self.latency_ns.load(Ordering::Relaxed)),
        }
    }
}
