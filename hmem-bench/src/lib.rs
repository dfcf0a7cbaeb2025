pub mod classify;
pub mod iov;
pub mod target;

pub use target::CopyTarget;
