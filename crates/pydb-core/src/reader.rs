//! # Remote Reader
//!
//! Typed reads of remote records through a [`RemoteProcess`], bound to one
//! [`Layout`].
//!
//! A [`Reader`] is the decoder set chosen for a target: it pairs the
//! borrowed process handle with the layout table for the detected data
//! model. Every record is re-read from the target on each call; nothing is
//! cached, since the process may have changed since the last read.

use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::error::{PydbError, PydbResult};
use crate::layout::Layout;
use crate::remote::RemoteProcess;
use crate::types::{Address, DataModel};

/// Inline capacity of a [`Record`]; every modeled prefix fits.
pub(crate) const INLINE_RECORD: usize = 128;

/// Local copy of the fixed-size prefix of one remote structure.
#[derive(Debug, Clone)]
pub struct Record
{
    address: Address,
    model: DataModel,
    bytes: SmallVec<[u8; INLINE_RECORD]>,
}

impl Record
{
    /// Remote address the record was read from.
    pub fn address(&self) -> Address
    {
        self.address
    }

    /// Raw bytes of the record.
    pub fn bytes(&self) -> &[u8]
    {
        &self.bytes
    }

    fn field<const N: usize>(&self, offset: usize) -> [u8; N]
    {
        let mut out = [0u8; N];
        match self.bytes.get(offset..offset + N) {
            Some(src) => out.copy_from_slice(src),
            None => debug_assert!(false, "field at {offset} outside {}-byte record", self.bytes.len()),
        }
        out
    }

    /// Pointer-sized field at `offset`.
    pub fn pointer(&self, offset: usize) -> Address
    {
        match self.model {
            DataModel::Ilp32 => Address::from(u64::from(u32::from_ne_bytes(self.field(offset)))),
            DataModel::Lp64 => Address::from(u64::from_ne_bytes(self.field(offset))),
        }
    }

    /// `Py_ssize_t` field at `offset`, sign-extended.
    pub fn ssize(&self, offset: usize) -> i64
    {
        match self.model {
            DataModel::Ilp32 => i64::from(i32::from_ne_bytes(self.field(offset))),
            DataModel::Lp64 => i64::from_ne_bytes(self.field(offset)),
        }
    }

    /// C `int` field at `offset`.
    pub fn int(&self, offset: usize) -> i32
    {
        i32::from_ne_bytes(self.field(offset))
    }

    /// 32-bit unsigned field at `offset`.
    pub fn uint(&self, offset: usize) -> u32
    {
        u32::from_ne_bytes(self.field(offset))
    }
}

/// Borrowed process handle plus the layout for its data model.
pub struct Reader<'p, P: ?Sized>
{
    process: &'p P,
    layout: &'static Layout,
}

impl<P: ?Sized> Clone for Reader<'_, P>
{
    fn clone(&self) -> Self
    {
        *self
    }
}

impl<P: ?Sized> Copy for Reader<'_, P> {}

impl<'p, P: RemoteProcess + ?Sized> Reader<'p, P>
{
    pub fn new(process: &'p P, layout: &'static Layout) -> Self
    {
        Self { process, layout }
    }

    pub fn process(&self) -> &'p P
    {
        self.process
    }

    pub fn layout(&self) -> &'static Layout
    {
        self.layout
    }

    pub fn model(&self) -> DataModel
    {
        self.layout.model
    }

    /// Fill `buf` from `address`. Empty reads succeed without touching the target.
    pub fn read_into(&self, address: Address, buf: &mut [u8]) -> PydbResult<()>
    {
        if buf.is_empty() {
            return Ok(());
        }
        let len = buf.len();
        self.process.read(address, buf).map_err(|fault| {
            trace!(%address, len, %fault, "remote read rejected");
            PydbError::read_fault(address, len, fault)
        })
    }

    /// Read `size` bytes at `address` as one record.
    pub fn read_record(&self, address: Address, size: usize) -> PydbResult<Record>
    {
        let mut bytes: SmallVec<[u8; INLINE_RECORD]> = smallvec![0; size];
        self.read_into(address, &mut bytes)?;
        Ok(Record {
            address,
            model: self.layout.model,
            bytes,
        })
    }

    /// Read one target-sized pointer stored at `address`.
    pub fn read_pointer(&self, address: Address) -> PydbResult<Address>
    {
        let record = self.read_record(address, self.layout.model.pointer_size())?;
        Ok(record.pointer(0))
    }
}
