//! Target data model (pointer width) and symbol types.

use std::fmt;

use super::Address;

/// Pointer width and structure layout convention of the inspected process
///
/// The inspected process may use a different data model than the debugger:
/// a 64-bit debugger can examine a 32-bit process. The data model is queried
/// once when an [`Agent`](crate::Agent) is created and selects which
/// [`Layout`](crate::layout::Layout) every later decode uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataModel
{
    /// 32-bit `int`, `long`, and pointers
    Ilp32,
    /// 32-bit `int`, 64-bit `long` and pointers
    Lp64,
}

impl DataModel
{
    /// Data model of the process running this code.
    pub const fn native() -> Self
    {
        if cfg!(target_pointer_width = "64") {
            DataModel::Lp64
        } else {
            DataModel::Ilp32
        }
    }

    /// Size of a pointer (and of `Py_ssize_t`) in bytes.
    pub const fn pointer_size(self) -> usize
    {
        match self {
            DataModel::Ilp32 => 4,
            DataModel::Lp64 => 8,
        }
    }

    /// Returns `true` for 64-bit pointers.
    pub const fn is_wide(self) -> bool
    {
        matches!(self, DataModel::Lp64)
    }

    /// Number of hex digits needed to print a full pointer.
    pub const fn address_digits(self) -> usize
    {
        self.pointer_size() * 2
    }
}

impl fmt::Display for DataModel
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            DataModel::Ilp32 => "ilp32",
            DataModel::Lp64 => "lp64",
        };
        write!(f, "{label}")
    }
}

/// Address and size of a symbol in the inspected process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo
{
    /// First byte of the symbol.
    pub address: Address,
    /// Size of the symbol in bytes.
    pub size: u64,
}

impl SymbolInfo
{
    pub const fn new(address: Address, size: u64) -> Self
    {
        Self { address, size }
    }

    /// Last address considered part of the symbol.
    ///
    /// The range is closed at both ends: a return address pointing just
    /// past the final instruction still belongs to the function.
    pub fn end(&self) -> Address
    {
        self.address + self.size
    }

    /// Returns `true` if `pc` lies in `[address, address + size]`.
    pub fn contains(&self, pc: Address) -> bool
    {
        pc >= self.address && pc <= self.end()
    }
}
