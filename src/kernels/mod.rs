//! Kernel files: binary SPK reader, text kernels and the pool holding them.

pub mod daf;
pub mod pool;
pub mod scoped;
pub mod text_kernel;

pub use pool::{KernelKind, KernelPool};
pub use scoped::KernelSet;
