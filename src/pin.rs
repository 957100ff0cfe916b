use std::convert::TryFrom;
use std::fmt;

use crate::{ArgumentError, BoardError, BoardResult};

/// Identifier of a SoC GPIO line, guaranteed to be in `0..=53`.
///
/// This is the only way to name a GPIO line when talking to a driver (see `gpio::PinAccess`), so an
/// out-of-range pin can't reach the register layer. Physical header positions are translated into
/// `PinId`s by `HeaderLayout`.
///
/// # Example
/// ```
/// use rpi_board::PinId;
///
/// let pin = PinId::new(17)?;
/// assert_eq!(pin.value(), 17);
/// assert!(PinId::new(54).is_err());
/// # Ok::<(), rpi_board::BoardError>(())
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PinId(u8);

impl PinId {
    pub const MAX: u8 = 53;

    /// Fails with `InvalidArgument` unless `0 <= n <= 53`.
    pub fn new(n: i64) -> BoardResult<Self> {
        if (0..=i64::from(Self::MAX)).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(BoardError::InvalidArgument(ArgumentError::PinOutOfRange(n)))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PinId {
    type Error = BoardError;

    fn try_from(n: u8) -> BoardResult<Self> {
        Self::new(i64::from(n))
    }
}

impl TryFrom<i32> for PinId {
    type Error = BoardError;

    fn try_from(n: i32) -> BoardResult<Self> {
        Self::new(i64::from(n))
    }
}

impl TryFrom<u32> for PinId {
    type Error = BoardError;

    fn try_from(n: u32) -> BoardResult<Self> {
        Self::new(i64::from(n))
    }
}

impl From<PinId> for u8 {
    fn from(pin: PinId) -> u8 {
        pin.0
    }
}

impl From<PinId> for u32 {
    fn from(pin: PinId) -> u32 {
        u32::from(pin.0)
    }
}

impl PartialEq<u8> for PinId {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_gpio_line() {
        for n in 0..=53 {
            let pin = PinId::new(n).unwrap();
            assert_eq!(i64::from(pin.value()), n);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        for &n in [-1, 54, 255, i64::MIN, i64::MAX].iter() {
            assert_eq!(
                PinId::new(n),
                Err(BoardError::InvalidArgument(ArgumentError::PinOutOfRange(n)))
            );
        }
        assert!(PinId::try_from(54u8).is_err());
        assert!(PinId::try_from(-1i32).is_err());
        assert!(PinId::try_from(u32::MAX).is_err());
    }

    #[test]
    fn compares_like_its_value() {
        let low = PinId::try_from(4u8).unwrap();
        let high = PinId::try_from(27u8).unwrap();

        assert!(low < high);
        assert_eq!(low, PinId::new(4).unwrap());
        assert_eq!(low, 4u8);
        assert_eq!(u8::from(high), 27);
        assert_eq!(high.to_string(), "GPIO27");
    }
}
