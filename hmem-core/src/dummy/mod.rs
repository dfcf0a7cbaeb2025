/*!
Simulated backends for testing and benchmarking.
*/

pub mod device;
#[doc(hidden)]
pub use device::DummyDevice;
