//! # Frame Descriptions
//!
//! Decode a frame object into function name, file, and line.
//!
//! A description is assembled from four remote objects: the frame, its code
//! object, the code object's name and filename strings, and its line-number
//! table. Any failure discards everything decoded so far.

use tracing::trace;

use crate::agent::Agent;
use crate::decode::StringKind;
use crate::error::{PydbError, PydbResult};
use crate::remote::RemoteProcess;
use crate::types::{Address, FrameInfo};

impl<P: RemoteProcess + ?Sized> Agent<'_, P>
{
    /// Decode the frame object at `frame`.
    ///
    /// ## Errors
    ///
    /// - `ReadFault`: the frame or its code object could not be read
    /// - `StringDecodeFault`: the function name or filename could not be decoded
    /// - `LineDecodeFault`: the line-number table could not be read
    pub fn frame_info(&self, frame: Address) -> PydbResult<FrameInfo>
    {
        let reader = self.reader();
        let layout = reader.layout();
        let config = self.config();

        let frame_record = reader.read_record(frame, layout.frame.size)?;
        let code = frame_record.pointer(layout.frame.f_code);
        let last_instruction = frame_record.int(layout.frame.f_lasti);

        let code_record = reader.read_record(code, layout.code.size)?;

        let decode_string = |address: Address| {
            reader
                .read_string(address, StringKind::CompactAscii, config.string_buffer_size)
                .map_err(|err| PydbError::StringDecodeFault {
                    address,
                    source: Box::new(err),
                })
        };
        let function = decode_string(code_record.pointer(layout.code.co_name))?;
        let filename = decode_string(code_record.pointer(layout.code.co_filename))?;

        let table = code_record.pointer(layout.code.co_lnotab);
        let line = reader
            .read_line_number(
                table,
                code_record.int(layout.code.co_firstlineno),
                last_instruction,
                config.max_line_table,
            )
            .map_err(|err| PydbError::LineDecodeFault {
                address: table,
                source: Box::new(err),
            })?;

        trace!(%frame, %code, function = %function, line, "frame decoded");
        Ok(FrameInfo {
            address: frame,
            function,
            filename,
            line,
        })
    }

    /// Describe the frame at `frame` as one line of stack trace.
    ///
    /// The line reads `<addr> <file>:<line> <func>()` followed by a newline,
    /// with the address padded to the target's pointer width and the file
    /// reduced to its basename unless `verbose` is set.
    pub fn describe_frame(&self, frame: Address, verbose: bool) -> PydbResult<String>
    {
        let info = self.frame_info(frame)?;
        Ok(info.to_line(self.data_model(), verbose))
    }

    /// Decode `frame` only if `pc` is inside the frame evaluator.
    ///
    /// Used while unwinding native frames: a candidate frame pointer found
    /// in a native frame is only a frame object if that native frame is
    /// running the evaluator. The evaluator's range is closed at both ends.
    ///
    /// ## Errors
    ///
    /// - `SymbolNotFound`: the evaluator is in neither the runtime library nor the executable
    /// - `PcOutOfRange`: `pc` is outside the evaluator
    /// - any error of [`Agent::frame_info`]
    pub fn frame_info_if_valid_pc(&self, pc: Address, frame: Address) -> PydbResult<FrameInfo>
    {
        let symbol = &self.config().eval_symbol;
        let eval = self.lookup_symbol_info(symbol)?;
        if !eval.contains(pc) {
            return Err(PydbError::PcOutOfRange {
                pc,
                symbol: symbol.clone(),
                start: eval.address,
                end: eval.end(),
            });
        }
        self.frame_info(frame)
    }

    /// Describe `frame` as `[ <file>:<line> (<func>) ]` if `pc` is inside the evaluator.
    ///
    /// The full filename is always printed.
    pub fn describe_frame_if_valid_pc(&self, pc: Address, frame: Address) -> PydbResult<String>
    {
        self.frame_info_if_valid_pc(pc, frame).map(|info| info.to_annotation())
    }

    /// Decode every frame of the thread state at `thread`, innermost first.
    ///
    /// The walk stops like [`Agent::frame_iter`]; a frame that fails to
    /// decode fails the whole call.
    pub fn frames_of_thread(&self, thread: Address) -> PydbResult<Vec<FrameInfo>>
    {
        self.frame_iter(thread)?.map(|frame| self.frame_info(frame)).collect()
    }
}
