//! # pydb-core
//!
//! Read-only, out-of-process introspection of a Python 3.5 runtime.
//!
//! Given a [`RemoteProcess`] supplied by a host debugger (a live process or
//! a core file), this crate walks the runtime's interpreter, thread, and
//! frame lists and decodes frame objects into function, file, and line. It
//! never writes to or runs code in the inspected process.
//!
//! ## Layers
//!
//! - [`remote`]: the collaborator trait the host implements
//! - [`layout`]: structure offsets for 32-bit and 64-bit targets
//! - [`reader`] and [`decode`]: typed record reads and string decoding
//! - [`lnotab`]: bytecode offset to source line
//! - [`iter`]: interpreter, thread, and frame list walks
//! - [`Agent`]: the per-process facade tying these together
//!
//! ## Cross data-model inspection
//!
//! The target's pointer width may differ from the debugger's. It is queried
//! once per agent and selects the layout every later read uses.

pub mod agent;
pub mod config;
pub mod decode;
pub mod error;
mod frame;
pub mod iter;
pub mod layout;
pub mod lnotab;
pub mod reader;
pub mod remote;
pub mod types;

pub use agent::Agent;
pub use config::AgentConfig;
pub use decode::StringKind;
pub use error::{PydbError, PydbResult};
pub use iter::{IterKind, IterState, RemoteIter};
pub use remote::{RemoteFault, RemoteProcess};
pub use types::{Address, DataModel, FrameInfo, SymbolInfo};

/// Protocol version callers must pass to [`Agent::create`].
///
/// Changes to the public interface bump this number.
pub const PYDB_VERSION: u32 = 1;

/// Crate version for diagnostics.
pub fn version() -> &'static str
{
    env!("CARGO_PKG_VERSION")
}
