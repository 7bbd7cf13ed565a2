//! # Layout Models
//!
//! Byte offsets of the runtime structures this crate decodes, one table per
//! data model.
//!
//! Only the fields we read are described. Each `size` is the length of the
//! prefix that covers those fields, not the full `sizeof` of the structure,
//! so a read never touches more remote memory than needed.
//!
//! The offsets describe the 3.5 runtime (`PyInterpreterState`,
//! `PyThreadState`, `PyBytesObject`, `PyASCIIObject`, `PyFrameObject`,
//! `PyCodeObject`). Other runtime versions are not modeled.
//!
//! A decoder never mixes tables: the [`Agent`](crate::Agent) picks one with
//! [`Layout::for_model`] at creation and hands the same `&'static Layout` to
//! every reader and iterator it creates.

use crate::types::DataModel;

/// `PyASCIIObject.state.compact`
pub const STATE_COMPACT: u32 = 1 << 5;
/// `PyASCIIObject.state.ascii`
pub const STATE_ASCII: u32 = 1 << 6;
/// `PyASCIIObject.state.ready`
pub const STATE_READY: u32 = 1 << 7;

/// `PyInterpreterState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterStateLayout
{
    pub next: usize,
    pub tstate_head: usize,
    pub size: usize,
}

/// `PyThreadState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadStateLayout
{
    pub prev: usize,
    pub next: usize,
    pub interp: usize,
    pub frame: usize,
    pub size: usize,
}

/// `PyBytesObject`: a var-object header followed by inline character data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytesObjectLayout
{
    /// `ob_size`, the number of payload bytes.
    pub ob_size: usize,
    /// `ob_sval`, first payload byte. Also the header length.
    pub ob_sval: usize,
}

/// `PyASCIIObject`: compact ASCII strings store their data right after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiObjectLayout
{
    pub length: usize,
    /// 32-bit state bitfield (`interned:2, kind:3, compact:1, ascii:1, ready:1`).
    pub state: usize,
    /// `sizeof(PyASCIIObject)`; the character data starts here.
    pub size: usize,
}

/// `PyFrameObject`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameObjectLayout
{
    pub f_back: usize,
    pub f_code: usize,
    pub f_lasti: usize,
    pub f_lineno: usize,
    pub size: usize,
}

/// `PyCodeObject`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeObjectLayout
{
    pub co_filename: usize,
    pub co_name: usize,
    pub co_firstlineno: usize,
    pub co_lnotab: usize,
    pub size: usize,
}

/// Complete set of offsets for one data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout
{
    pub model: DataModel,
    pub interpreter: InterpreterStateLayout,
    pub thread: ThreadStateLayout,
    pub bytes: BytesObjectLayout,
    pub ascii: AsciiObjectLayout,
    pub frame: FrameObjectLayout,
    pub code: CodeObjectLayout,
}

/// 64-bit process.
pub static LP64: Layout = Layout {
    model: DataModel::Lp64,
    interpreter: InterpreterStateLayout {
        next: 0,
        tstate_head: 8,
        size: 16,
    },
    thread: ThreadStateLayout {
        prev: 0,
        next: 8,
        interp: 16,
        frame: 24,
        size: 32,
    },
    bytes: BytesObjectLayout { ob_size: 16, ob_sval: 32 },
    ascii: AsciiObjectLayout {
        length: 16,
        state: 32,
        size: 48,
    },
    frame: FrameObjectLayout {
        f_back: 24,
        f_code: 32,
        f_lasti: 120,
        f_lineno: 124,
        size: 128,
    },
    code: CodeObjectLayout {
        co_filename: 96,
        co_name: 104,
        co_firstlineno: 112,
        co_lnotab: 120,
        size: 128,
    },
};

/// 32-bit process.
pub static ILP32: Layout = Layout {
    model: DataModel::Ilp32,
    interpreter: InterpreterStateLayout {
        next: 0,
        tstate_head: 4,
        size: 8,
    },
    thread: ThreadStateLayout {
        prev: 0,
        next: 4,
        interp: 8,
        frame: 12,
        size: 16,
    },
    bytes: BytesObjectLayout { ob_size: 8, ob_sval: 16 },
    ascii: AsciiObjectLayout {
        length: 8,
        state: 16,
        size: 24,
    },
    frame: FrameObjectLayout {
        f_back: 12,
        f_code: 16,
        f_lasti: 60,
        f_lineno: 64,
        size: 68,
    },
    code: CodeObjectLayout {
        co_filename: 56,
        co_name: 60,
        co_firstlineno: 64,
        co_lnotab: 68,
        size: 72,
    },
};

impl Layout
{
    /// Offsets for `model`.
    pub fn for_model(model: DataModel) -> &'static Layout
    {
        match model {
            DataModel::Ilp32 => &ILP32,
            DataModel::Lp64 => &LP64,
        }
    }

    /// Largest record prefix read in a single call.
    pub fn max_record_size(&self) -> usize
    {
        [
            self.interpreter.size,
            self.thread.size,
            self.bytes.ob_sval,
            self.ascii.size,
            self.frame.size,
            self.code.size,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}
