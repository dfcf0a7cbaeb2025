/*!
Module with basic types used in hmem.

This module contains the address type, the scatter-gather segment type
and it exposes different size helpers.
*/

pub mod address;
#[doc(hidden)]
pub use address::Address;

pub mod size;

pub mod iov;
#[doc(hidden)]
pub use iov::{iov_total_len, HmemIov};
