/*!
This crate contains the foundation for copying data between host memory and
memory that may reside on a different device, such as GPU memory.

It contains [basic types](types/index.html) for addresses and scatter-gather segments,
the [memory kind registry](hmem/index.html) together with the scatter-gather copy engine
and [simulated backends](dummy/index.html) for testing.

# Examples

```
use hmem_core::hmem::{HmemContext, HmemIface};
use hmem_core::types::HmemIov;

let ctx = HmemContext::builder().build().unwrap();

let mut first = [0u8; 4];
let mut second = [0u8; 4];
let iov = [HmemIov::from(&mut first[..]), HmemIov::from(&mut second[..])];

let mut out = [0u8; 8];
let done = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::System, 0) }.unwrap();
assert_eq!(done, 8);
```
*/

pub mod error;
#[doc(hidden)]
pub use error::*;

pub mod types;
#[doc(hidden)]
pub use types::*;

pub mod hmem;
#[doc(hidden)]
pub use hmem::*;

#[cfg(any(test, feature = "dummy_mem"))]
pub mod dummy;
