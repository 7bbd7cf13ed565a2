//! Decoded frame descriptor.

use super::{Address, DataModel};

/// Function, file, and line of one interpreter frame
///
/// Built only when every part of the frame decoded successfully; there is no
/// partially filled `FrameInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo
{
    /// Address of the frame object in the inspected process.
    pub address: Address,
    /// Name of the code object (`co_name`).
    pub function: String,
    /// Source path of the code object (`co_filename`).
    pub filename: String,
    /// Source line of the last executed instruction.
    pub line: i32,
}

impl FrameInfo
{
    /// Final path component of [`FrameInfo::filename`].
    pub fn basename(&self) -> &str
    {
        self.filename.rsplit('/').next().unwrap_or(&self.filename)
    }

    /// One stack-trace line: `<addr> <file>:<line> <func>()`.
    ///
    /// The address is zero padded to the target's pointer width. Only the
    /// basename of the file is printed unless `verbose` is set.
    pub fn to_line(&self, model: DataModel, verbose: bool) -> String
    {
        let file = if verbose { self.filename.as_str() } else { self.basename() };
        format!(
            "{:0width$x} {}:{} {}()\n",
            self.address,
            file,
            self.line,
            self.function,
            width = model.address_digits()
        )
    }

    /// Annotation for a native frame that is running this interpreter frame.
    pub fn to_annotation(&self) -> String
    {
        format!("[ {}:{} ({}) ]\n", self.filename, self.line, self.function)
    }
}
