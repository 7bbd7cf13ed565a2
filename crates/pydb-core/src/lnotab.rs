//! # Line-Number Tables
//!
//! Map a bytecode offset to a source line using a code object's `co_lnotab`.
//!
//! The table is a bytes object holding `(offset delta, line delta)` byte
//! pairs. Starting from `co_firstlineno` at offset 0, each pair advances the
//! bytecode offset and the line. The line reported for an instruction is the
//! one in effect after the last pair whose accumulated offset does not pass
//! the instruction, so a run of instructions maps to one line:
//!
//! ```text
//! table  (2,0) (4,1)     first line 10
//! offset 0..=5 -> 10     offset 6.. -> 11
//! ```
//!
//! Both deltas are unsigned in this runtime generation.

use tracing::warn;

use crate::error::{PydbError, PydbResult};
use crate::reader::Reader;
use crate::remote::RemoteProcess;
use crate::types::Address;

/// Source line for bytecode offset `last_instruction`.
///
/// A trailing unpaired byte is ignored. A negative `last_instruction` (frame
/// not yet started) resolves to `first_line`.
pub fn line_for_offset(table: &[u8], first_line: i32, last_instruction: i32) -> i32
{
    let target = i64::from(last_instruction);
    let mut offset: i64 = 0;
    let mut line = first_line;

    for pair in table.chunks_exact(2) {
        let next = offset + i64::from(pair[0]);
        if next > target {
            break;
        }
        offset = next;
        line = line.saturating_add(i32::from(pair[1]));
    }

    line
}

impl<P: RemoteProcess + ?Sized> Reader<'_, P>
{
    /// Read the table object at `table` and resolve `last_instruction`.
    ///
    /// At most `max_table` bytes of the table are read. A longer table is
    /// truncated, which can only under-report the line for instructions
    /// beyond the cut.
    ///
    /// ## Errors
    ///
    /// - `TableReadFault`: the table object could not be read
    pub fn read_line_number(
        &self,
        table: Address,
        first_line: i32,
        last_instruction: i32,
        max_table: usize,
    ) -> PydbResult<i32>
    {
        let mut buf = vec![0u8; max_table];
        let (len, declared) = self
            .bytes_payload(table, &mut buf)
            .map_err(|err| PydbError::TableReadFault {
                address: table,
                source: Box::new(err),
            })?;

        if usize::try_from(declared).is_ok_and(|declared| declared > len) {
            warn!(%table, declared, kept = len, "line number table truncated");
        }

        Ok(line_for_offset(&buf[..len], first_line, last_instruction))
    }
}
