//! Pluggable "empty bucket" value.
//!
//! The window advancer never writes a literal `0`; it asks a [`ZeroValue`]
//! for every slot it vacates. Plain closures work out of the box:
//!
//! ```rust
//! use bucket_window_core::ZeroValue;
//!
//! let zero = || 0_i64;
//! assert_eq!(zero.zero(), 0);
//! ```

/// Produces the value a freshly vacated bucket starts with.
pub trait ZeroValue<T> {
    fn zero(&self) -> T;
}

impl<T, F> ZeroValue<T> for F
where
    F: Fn() -> T,
{
    #[inline]
    fn zero(&self) -> T {
        self()
    }
}

/// Uses [`Default::default`] as the empty value.
///
/// ```rust
/// use bucket_window_core::{DefaultZero, ZeroValue};
///
/// let zero: u32 = DefaultZero.zero();
/// assert_eq!(zero, 0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultZero;

impl<T: Default> ZeroValue<T> for DefaultZero {
    #[inline]
    fn zero(&self) -> T {
        T::default()
    }
}
