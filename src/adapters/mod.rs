// Adapters layer: concrete implementations of the domain ports.

pub mod print_host;
pub mod session;

pub use print_host::FsPrintHost;
pub use session::MemorySession;
