//! # Remote Process Interface
//!
//! The capability the host debugger lends us for one inspected process.
//!
//! Everything this crate knows about the target comes through this trait:
//! byte-range reads, symbol lookups, and the data-model query. The host owns
//! attachment, symbol tables, and any timeout policy. A read that hangs here
//! hangs the caller.
//!
//! ## Thread Safety
//!
//! The trait takes `&self` everywhere. Whether two agents may share one
//! implementation across threads is up to the implementation (`Sync` or
//! external locking); this crate adds no synchronisation of its own.

use thiserror::Error;

use crate::types::{Address, DataModel, SymbolInfo};

/// Object name that denotes the main executable in symbol lookups.
pub const EXECUTABLE_OBJECT: &str = "a.out";

/// Failure reported by the host debugger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteFault
{
    /// Part of the requested range is not mapped in the target.
    #[error("address {0} is not mapped")]
    Unmapped(Address),

    /// The range is mapped but could not be read.
    #[error("{len} bytes at {address} are not readable")]
    Unreadable
    {
        /// Start of the range
        address: Address,
        /// Length of the range
        len: usize,
    },

    /// The object or symbol does not exist.
    #[error("no symbol {symbol} in {object}")]
    NoSymbol
    {
        /// Load object searched
        object: String,
        /// Symbol name
        symbol: String,
    },

    /// The target's data model could not be determined.
    #[error("data model unavailable: {0}")]
    DataModel(String),

    /// Any other host-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Read-only view of an inspected process (live or core file)
///
/// ## Implementing
///
/// Only [`read`](RemoteProcess::read),
/// [`lookup_global_symbol_info`](RemoteProcess::lookup_global_symbol_info)
/// and [`data_model`](RemoteProcess::data_model) are required;
/// [`lookup_global_symbol`](RemoteProcess::lookup_global_symbol) defaults to
/// the address half of the symbol info.
pub trait RemoteProcess
{
    /// Fill `buf` with the bytes at `address`.
    ///
    /// Must fail rather than short-read: either the whole range is copied or
    /// an error is returned.
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<(), RemoteFault>;

    /// Address of global `symbol` in load object `object`.
    fn lookup_global_symbol(&self, object: &str, symbol: &str) -> Result<Address, RemoteFault>
    {
        self.lookup_global_symbol_info(object, symbol).map(|info| info.address)
    }

    /// Address and size of global `symbol` in load object `object`.
    fn lookup_global_symbol_info(&self, object: &str, symbol: &str) -> Result<SymbolInfo, RemoteFault>;

    /// Pointer width of the inspected process.
    fn data_model(&self) -> Result<DataModel, RemoteFault>;
}

impl<T: RemoteProcess + ?Sized> RemoteProcess for &T
{
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<(), RemoteFault>
    {
        (**self).read(address, buf)
    }

    fn lookup_global_symbol(&self, object: &str, symbol: &str) -> Result<Address, RemoteFault>
    {
        (**self).lookup_global_symbol(object, symbol)
    }

    fn lookup_global_symbol_info(&self, object: &str, symbol: &str) -> Result<SymbolInfo, RemoteFault>
    {
        (**self).lookup_global_symbol_info(object, symbol)
    }

    fn data_model(&self) -> Result<DataModel, RemoteFault>
    {
        (**self).data_model()
    }
}
