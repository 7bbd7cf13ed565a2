//! Remote memory address type.

use std::fmt;
use std::ops::Add;

/// Strongly typed address in the inspected process
///
/// Addresses are always stored as `u64`, even when the target uses 32-bit
/// pointers, so one type covers both data models. Arithmetic wraps rather
/// than panics: an offset added to a corrupt pointer yields another bogus
/// address that the collaborator will reject, which is the failure we want.
///
/// ## Example
///
/// ```rust
/// use pydb_core::types::Address;
///
/// let frame = Address::from(0x1000);
/// let f_back = frame + 0x18; // field offset
/// assert_eq!(f_back.value(), 0x1018);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// Every remote linked list ends in a null link, so this doubles as the
    /// end-of-chain marker.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// ```rust
    /// use pydb_core::types::Address;
    ///
    /// const INTERP_HEAD: Address = Address::new(0x7f00_0000_1000);
    /// ```
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Returns `true` for the null address.
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use pydb_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

/// Lower-hex without prefix, honouring width and zero-fill flags.
impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}
