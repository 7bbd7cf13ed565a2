//! # Object Decoders
//!
//! Copy the character data of remote string objects into local buffers.
//!
//! Two encodings exist in the runtime:
//!
//! - **Bytes objects** (`PyBytesObject`): a var-object header whose `ob_size`
//!   counts the payload bytes stored inline at `ob_sval`. Also used as a raw
//!   byte buffer, e.g. for line-number tables.
//! - **Compact ASCII strings** (`PyASCIIObject`): a header with a `length`
//!   and a state bitfield, followed by the characters. Only valid when the
//!   `compact`, `ascii`, and `ready` bits are all set; other unicode
//!   representations keep their data elsewhere and are rejected.
//!
//! The declared size is taken straight from the object header. The object's
//! type pointer is never followed, since that costs another remote read per
//! string; a corrupt header therefore yields a short or garbled copy, never
//! an over-read, because the copy is always bounded by the caller's buffer.

use crate::error::{PydbError, PydbResult};
use crate::layout::{STATE_ASCII, STATE_COMPACT, STATE_READY};
use crate::reader::Reader;
use crate::remote::RemoteProcess;
use crate::types::Address;

/// Which object layout a string is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind
{
    /// `PyBytesObject`
    Bytes,
    /// `PyASCIIObject` with compact, ascii, and ready set
    CompactAscii,
}

/// Number of payload bytes to copy for a header-declared length.
///
/// Negative lengths only occur in corrupt headers and copy nothing.
fn copy_len(declared: i64, buf_len: usize) -> usize
{
    usize::try_from(declared).map_or(0, |declared| declared.min(buf_len))
}

fn check_buffer(buf: &[u8]) -> PydbResult<()>
{
    if buf.is_empty() {
        return Err(PydbError::InvalidArgument("destination buffer is empty".into()));
    }
    Ok(())
}

impl<P: RemoteProcess + ?Sized> Reader<'_, P>
{
    /// Payload copy shared by the bytes decoder and the line-table reader.
    ///
    /// Returns `(copied, declared)`.
    pub(crate) fn bytes_payload(&self, address: Address, buf: &mut [u8]) -> PydbResult<(usize, i64)>
    {
        let layout = self.layout().bytes;
        let header = self.read_record(address, layout.ob_sval)?;
        let declared = header.ssize(layout.ob_size);
        let len = copy_len(declared, buf.len());
        self.read_into(address + layout.ob_sval as u64, &mut buf[..len])?;
        Ok((len, declared))
    }

    /// Copy the payload of the bytes object at `address` into `buf`.
    ///
    /// Returns the number of bytes copied: the smaller of the object's
    /// `ob_size` and `buf.len()`. No terminator is written.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: `buf` is empty
    /// - `ReadFault`: the header or the payload could not be read
    pub fn read_bytes_object(&self, address: Address, buf: &mut [u8]) -> PydbResult<usize>
    {
        check_buffer(buf)?;
        self.bytes_payload(address, buf).map(|(copied, _)| copied)
    }

    /// Copy the characters of the compact ASCII string at `address` into `buf`.
    ///
    /// Nothing is written to `buf` unless the state flags check out.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: `buf` is empty
    /// - `ReadFault`: the header or the characters could not be read
    /// - `NotAnAsciiString`: `compact`, `ascii`, or `ready` is clear
    pub fn read_ascii_unicode_object(&self, address: Address, buf: &mut [u8]) -> PydbResult<usize>
    {
        check_buffer(buf)?;

        let layout = self.layout().ascii;
        let header = self.read_record(address, layout.size)?;
        let wanted = STATE_COMPACT | STATE_ASCII | STATE_READY;
        if header.uint(layout.state) & wanted != wanted {
            return Err(PydbError::NotAnAsciiString(address));
        }

        let len = copy_len(header.ssize(layout.length), buf.len());
        self.read_into(address + layout.size as u64, &mut buf[..len])?;
        Ok(len)
    }

    /// Decode a string of either kind.
    pub fn read_object_data(&self, address: Address, buf: &mut [u8], kind: StringKind) -> PydbResult<usize>
    {
        match kind {
            StringKind::Bytes => self.read_bytes_object(address, buf),
            StringKind::CompactAscii => self.read_ascii_unicode_object(address, buf),
        }
    }

    /// Decode a string into `buf` and NUL-terminate it.
    ///
    /// At most `buf.len() - 1` characters are kept so the terminator always
    /// fits. Returns the string length, i.e. the index of the terminator.
    pub fn read_cstring(&self, address: Address, buf: &mut [u8], kind: StringKind) -> PydbResult<usize>
    {
        let copied = self.read_object_data(address, buf, kind)?;
        let len = copied.min(buf.len() - 1);
        buf[len] = 0;
        Ok(len)
    }

    /// Decode a string into an owned `String` of at most `capacity - 1` bytes.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn read_string(&self, address: Address, kind: StringKind, capacity: usize) -> PydbResult<String>
    {
        let mut buf = vec![0u8; capacity];
        let len = self.read_cstring(address, &mut buf, kind)?;
        Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
    }
}
