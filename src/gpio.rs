//! Seam between board identification and a GPIO register driver.
//!
//! This crate doesn't touch GPIO registers. A driver implements `PinAccess`, handing out
//! [`embedded_hal`](https://crates.io/crates/embedded-hal) digital pins for validated `PinId`s, and
//! `Header` puts the board's header layout in front of it so programs can ask for pins by their
//! physical position:
//!
//! ```ignore
//! let mut header = Header::detect(MyDriver::open()?)?;
//! let mut led = header.output_pin(11)?;
//! led.set_high()?;
//! ```
use embedded_hal::digital::v2 as eh;

use crate::{board_info, BoardError, BoardResult, HeaderLayout, PinId};

/// A GPIO driver able to configure SoC GPIO lines as inputs or outputs.
///
/// The driver's error type must be able to carry a `BoardError`, so that header lookups and driver
/// failures come out of `Header` through a single error type.
pub trait PinAccess {
    type Error: From<BoardError>;
    type Input: eh::InputPin;
    type Output: eh::OutputPin;

    /// Configures `pin` for reading.
    fn input_pin(&mut self, pin: PinId) -> Result<Self::Input, Self::Error>;

    /// Configures `pin` for writing.
    fn output_pin(&mut self, pin: PinId) -> Result<Self::Output, Self::Error>;
}

/// A GPIO driver addressed by physical header position.
#[derive(Debug)]
pub struct Header<A> {
    layout: HeaderLayout,
    access: A,
}

impl<A: PinAccess> Header<A> {
    pub fn new(layout: HeaderLayout, access: A) -> Self {
        Self { layout, access }
    }

    /// Uses the header layout of the board this process runs on.
    ///
    /// Fails with `UnknownBoard` when the board couldn't be identified or has no standard header.
    pub fn detect(access: A) -> BoardResult<Self> {
        Ok(Self::new(board_info().header_layout()?, access))
    }

    pub fn layout(&self) -> HeaderLayout {
        self.layout
    }

    /// Configures the GPIO wired to `physical_pin` for reading.
    ///
    /// Fails with `InvalidArgument` (converted to the driver's error) when the pin has no GPIO.
    pub fn input_pin(&mut self, physical_pin: u8) -> Result<A::Input, A::Error> {
        let pin = self.layout.map(physical_pin)?;
        self.access.input_pin(pin)
    }

    /// Configures the GPIO wired to `physical_pin` for writing.
    pub fn output_pin(&mut self, physical_pin: u8) -> Result<A::Output, A::Error> {
        let pin = self.layout.map(physical_pin)?;
        self.access.output_pin(pin)
    }

    pub fn into_inner(self) -> A {
        self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgumentError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum MockError {
        Board(BoardError),
        Busy(PinId),
    }

    impl From<BoardError> for MockError {
        fn from(err: BoardError) -> Self {
            MockError::Board(err)
        }
    }

    type Levels = Rc<RefCell<HashMap<PinId, bool>>>;

    struct MockPin {
        pin: PinId,
        levels: Levels,
    }

    impl eh::OutputPin for MockPin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.borrow_mut().insert(self.pin, false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.borrow_mut().insert(self.pin, true);
            Ok(())
        }
    }

    impl eh::InputPin for MockPin {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Self::Error> {
            Ok(self.levels.borrow().get(&self.pin).copied().unwrap_or(false))
        }

        fn is_low(&self) -> Result<bool, Self::Error> {
            self.is_high().map(|v| !v)
        }
    }

    #[derive(Default)]
    struct MockDriver {
        levels: Levels,
        busy: Vec<PinId>,
        requested: Vec<PinId>,
    }

    impl MockDriver {
        fn lease(&mut self, pin: PinId) -> Result<MockPin, MockError> {
            if self.busy.contains(&pin) {
                return Err(MockError::Busy(pin));
            }
            self.requested.push(pin);
            Ok(MockPin {
                pin,
                levels: Rc::clone(&self.levels),
            })
        }
    }

    impl PinAccess for MockDriver {
        type Error = MockError;
        type Input = MockPin;
        type Output = MockPin;

        fn input_pin(&mut self, pin: PinId) -> Result<MockPin, MockError> {
            self.lease(pin)
        }

        fn output_pin(&mut self, pin: PinId) -> Result<MockPin, MockError> {
            self.lease(pin)
        }
    }

    #[test]
    fn hands_out_pins_by_header_position() {
        use eh::{InputPin, OutputPin};

        let mut header = Header::new(HeaderLayout::V1, MockDriver::default());
        let mut led = header.output_pin(13).unwrap();
        let button = header.input_pin(13).unwrap();

        led.set_high().unwrap();
        assert!(button.is_high().unwrap());
        led.set_low().unwrap();
        assert!(button.is_low().unwrap());

        let gpio_21 = PinId::new(21).unwrap();
        assert_eq!(header.into_inner().requested, vec![gpio_21, gpio_21]);
    }

    #[test]
    fn layout_decides_the_gpio_line() {
        let mut header = Header::new(HeaderLayout::V2, MockDriver::default());
        header.output_pin(3).unwrap();

        assert_eq!(header.layout(), HeaderLayout::V2);
        assert_eq!(header.into_inner().requested, vec![PinId::new(2).unwrap()]);
    }

    #[test]
    fn header_errors_arrive_as_driver_errors() {
        let mut header = Header::new(HeaderLayout::V2, MockDriver::default());

        assert_eq!(
            header.output_pin(6).err(),
            Some(MockError::Board(BoardError::InvalidArgument(
                ArgumentError::NoGpioOnHeaderPin(6)
            )))
        );
        assert_eq!(
            header.input_pin(30).err(),
            Some(MockError::Board(BoardError::InvalidArgument(
                ArgumentError::HeaderPinOutOfRange(30)
            )))
        );
        assert!(header.into_inner().requested.is_empty());
    }

    #[test]
    fn driver_errors_pass_through() {
        let gpio_4 = PinId::new(4).unwrap();
        let driver = MockDriver {
            busy: vec![gpio_4],
            ..MockDriver::default()
        };
        let mut header = Header::new(HeaderLayout::J8, driver);

        assert_eq!(header.output_pin(7).err(), Some(MockError::Busy(gpio_4)));
    }
}
