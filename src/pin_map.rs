use crate::{ArgumentError, BoardError, BoardResult, PinId};

/// Mapping from physical positions on the expansion header to SoC GPIO lines.
///
/// The first 26-pin boards (`V1`) wired pins 3, 5 and 13 to GPIO 0, 1 and 21. Every later 26-pin
/// board (`V2`) moved them to GPIO 2, 3 and 27. The 40-pin `J8` header keeps the `V2` layout for
/// its first 26 pins. Power, ground and the reserved ID EEPROM pins (27 and 28 on J8) have no GPIO.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HeaderLayout {
    V1,
    V2,
    J8,
}

const NC: Option<u8> = None;

// Indexed by physical pin number; pin numbering starts at 1.
const V1_PINS: [Option<u8>; 27] = [
    NC,
    NC,       // 1   3.3V
    NC,       // 2   5V
    Some(0),  // 3
    NC,       // 4   5V
    Some(1),  // 5
    NC,       // 6   GND
    Some(4),  // 7
    Some(14), // 8
    NC,       // 9   GND
    Some(15), // 10
    Some(17), // 11
    Some(18), // 12
    Some(21), // 13
    NC,       // 14  GND
    Some(22), // 15
    Some(23), // 16
    NC,       // 17  3.3V
    Some(24), // 18
    Some(10), // 19
    NC,       // 20  GND
    Some(9),  // 21
    Some(25), // 22
    Some(11), // 23
    Some(8),  // 24
    NC,       // 25  GND
    Some(7),  // 26
];

const V2_PINS: [Option<u8>; 27] = [
    NC,
    NC,
    NC,
    Some(2),
    NC,
    Some(3),
    NC,
    Some(4),
    Some(14),
    NC,
    Some(15),
    Some(17),
    Some(18),
    Some(27),
    NC,
    Some(22),
    Some(23),
    NC,
    Some(24),
    Some(10),
    NC,
    Some(9),
    Some(25),
    Some(11),
    Some(8),
    NC,
    Some(7),
];

const J8_PINS: [Option<u8>; 41] = [
    NC,
    NC,
    NC,
    Some(2),
    NC,
    Some(3),
    NC,
    Some(4),
    Some(14),
    NC,
    Some(15),
    Some(17),
    Some(18),
    Some(27),
    NC,
    Some(22),
    Some(23),
    NC,
    Some(24),
    Some(10),
    NC,
    Some(9),
    Some(25),
    Some(11),
    Some(8),
    NC,
    Some(7),
    NC,       // 27  ID_SD
    NC,       // 28  ID_SC
    Some(5),  // 29
    NC,       // 30  GND
    Some(6),  // 31
    Some(12), // 32
    Some(13), // 33
    NC,       // 34  GND
    Some(19), // 35
    Some(16), // 36
    Some(26), // 37
    Some(20), // 38
    NC,       // 39  GND
    Some(21), // 40
];

impl HeaderLayout {
    /// Layout of the 26-pin header for a major board generation (1 or 2).
    pub fn from_generation(generation: u8) -> BoardResult<Self> {
        match generation {
            1 => Ok(HeaderLayout::V1),
            2 => Ok(HeaderLayout::V2),
            _ => Err(BoardError::InvalidArgument(
                ArgumentError::UnknownGeneration(generation),
            )),
        }
    }

    fn table(self) -> &'static [Option<u8>] {
        match self {
            HeaderLayout::V1 => &V1_PINS,
            HeaderLayout::V2 => &V2_PINS,
            HeaderLayout::J8 => &J8_PINS,
        }
    }

    /// Number of physical pins on the header.
    pub fn pin_count(self) -> u8 {
        (self.table().len() - 1) as u8
    }

    /// Translates a physical header pin into the GPIO line wired to it.
    ///
    /// Fails with `InvalidArgument` when the header has no such pin or the pin carries no GPIO.
    pub fn map(self, physical_pin: u8) -> BoardResult<PinId> {
        use ArgumentError::*;

        let entry = self
            .table()
            .get(usize::from(physical_pin))
            .ok_or(BoardError::InvalidArgument(HeaderPinOutOfRange(physical_pin)))?;
        let gpio = (*entry).ok_or(BoardError::InvalidArgument(NoGpioOnHeaderPin(physical_pin)))?;

        PinId::new(i64::from(gpio))
    }

    /// Physical header pin wired to `pin`, if the header exposes it.
    pub fn physical_pin(self, pin: PinId) -> Option<u8> {
        self.table()
            .iter()
            .position(|entry| *entry == Some(pin.value()))
            .map(|position| position as u8)
    }

    /// Every `(physical pin, GPIO line)` pair of the header, in header order.
    pub fn gpio_pins(self) -> impl Iterator<Item = (u8, PinId)> {
        self.table()
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let pin = PinId::new(i64::from((*entry)?)).ok()?;
                Some((position as u8, pin))
            })
    }
}

/// Translates a physical header pin into a GPIO line for a major board generation (1 or 2).
///
/// # Example
/// ```
/// use rpi_board::map_header_pin;
///
/// assert_eq!(map_header_pin(1, 13)?.value(), 21);
/// assert_eq!(map_header_pin(2, 13)?.value(), 27);
/// # Ok::<(), rpi_board::BoardError>(())
/// ```
pub fn map_header_pin(generation: u8, physical_pin: u8) -> BoardResult<PinId> {
    HeaderLayout::from_generation(generation)?.map(physical_pin)
}
