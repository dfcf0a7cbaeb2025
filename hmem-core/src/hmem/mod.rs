/*!
This module covers the memory kind registry and the copy functions built on top of it.

Every kind of memory is identified by a [`HmemIface`] and served by a [`HmemBackend`].
A [`HmemContext`] owns one backend per kind, tracks which of them initialized
successfully and routes classification and copy requests to them.
*/

pub mod args;
pub mod backend;
pub mod context;
pub mod iface;
pub mod iov_copy;
pub mod system;

#[cfg(feature = "std")]
pub mod metrics;

#[doc(hidden)]
pub use args::HmemArgs;
#[doc(hidden)]
pub use backend::{HmemBackend, HmemBackendBox, UnavailableBackend};
#[doc(hidden)]
pub use context::{HmemContext, HmemContextBuilder, HmemOps};
#[doc(hidden)]
pub use iface::HmemIface;
#[doc(hidden)]
pub use system::SystemBackend;

#[cfg(feature = "std")]
#[doc(hidden)]
pub use metrics::{CopyMetrics, HmemMetrics};
