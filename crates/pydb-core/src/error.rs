//! # Error Types
//!
//! Error handling for runtime introspection.
//!
//! Every failure that originates in foreign memory is recoverable: the
//! inspected process may be corrupt, half torn down, or still running, so
//! nothing in this crate panics on bad data. Each variant carries the remote
//! address that could not be decoded so the host debugger can report it.
//!
//! We use `thiserror` to generate the `Error` implementations.

use thiserror::Error;

use crate::remote::RemoteFault;
use crate::types::Address;

/// Main error type for introspection operations
///
/// ## Error Categories
///
/// 1. **Agent errors**: `UnsupportedVersion`, `ModelDetectionFailed`
/// 2. **Memory errors**: `ReadFault`, `TableReadFault`
/// 3. **Decode errors**: `NotAnAsciiString`, `StringDecodeFault`, `LineDecodeFault`
/// 4. **Symbol errors**: `SymbolNotFound`, `PcOutOfRange`
/// 5. **Caller errors**: `InvalidArgument`
#[derive(Error, Debug)]
pub enum PydbError
{
    /// The caller speaks a different protocol version than this library
    #[error("Unsupported protocol version {requested} (library version is {supported})")]
    UnsupportedVersion
    {
        /// Version passed by the caller
        requested: u32,
        /// Version compiled into this library
        supported: u32,
    },

    /// The collaborator could not tell us the target's pointer width
    #[error("Failed to detect target data model: {0}")]
    ModelDetectionFailed(#[source] RemoteFault),

    /// A read of foreign memory was rejected by the collaborator
    #[error("Failed to read {len} bytes at {address}: {source}")]
    ReadFault
    {
        /// Start of the rejected range
        address: Address,
        /// Length of the rejected range
        len: usize,
        /// Collaborator failure
        #[source]
        source: RemoteFault,
    },

    /// Precondition violation (empty destination buffer, null root address)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The string object's state flags are not compact, ascii, and ready
    #[error("Object at {0} is not a compact ASCII string")]
    NotAnAsciiString(Address),

    /// A code object's name or filename could not be decoded
    #[error("Failed to decode string object at {address}: {source}")]
    StringDecodeFault
    {
        /// Address of the string object
        address: Address,
        /// Underlying decode failure
        #[source]
        source: Box<PydbError>,
    },

    /// A frame's source line could not be computed
    #[error("Failed to decode line number from table at {address}: {source}")]
    LineDecodeFault
    {
        /// Address of the line-number table object
        address: Address,
        /// Underlying failure
        #[source]
        source: Box<PydbError>,
    },

    /// A required symbol is absent from both the runtime library and the executable
    #[error("Symbol {symbol} not found in {object}: {source}")]
    SymbolNotFound
    {
        /// Object searched first
        object: String,
        /// Symbol name
        symbol: String,
        /// Collaborator failure from the last lookup attempted
        #[source]
        source: RemoteFault,
    },

    /// The program counter is not inside the frame evaluator
    #[error("PC {pc} is outside {symbol} [{start}, {end}]")]
    PcOutOfRange
    {
        /// Program counter supplied by the caller
        pc: Address,
        /// Symbol the PC was checked against
        symbol: String,
        /// First address of the symbol
        start: Address,
        /// Last address of the symbol (inclusive)
        end: Address,
    },

    /// The line-number table object could not be read
    #[error("Failed to read line number table at {address}: {source}")]
    TableReadFault
    {
        /// Address of the table object
        address: Address,
        /// Underlying read failure
        #[source]
        source: Box<PydbError>,
    },
}

impl PydbError
{
    /// Wrap a collaborator failure for a rejected read of `len` bytes at `address`.
    pub(crate) fn read_fault(address: Address, len: usize, source: RemoteFault) -> Self
    {
        PydbError::ReadFault { address, len, source }
    }
}

/// Convenience type alias for `Result<T, PydbError>`
///
/// ```rust
/// use pydb_core::error::PydbResult;
/// fn foo() -> PydbResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type PydbResult<T> = std::result::Result<T, PydbError>;
