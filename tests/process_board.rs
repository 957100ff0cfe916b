use rpi_board::gpio::{Header, PinAccess};
use rpi_board::{
    board_info, set_reader, BoardError, BoardInfo, HeaderLayout, Maker, Model, PinId, Processor,
    RamClass,
};
use std::convert::Infallible;
use std::thread;

struct LoggingDriver {
    requested: Vec<PinId>,
}

struct NullPin;

impl embedded_hal::digital::v2::OutputPin for NullPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_hal::digital::v2::InputPin for NullPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

impl PinAccess for LoggingDriver {
    type Error = BoardError;
    type Input = NullPin;
    type Output = NullPin;

    fn input_pin(&mut self, pin: PinId) -> Result<NullPin, BoardError> {
        self.requested.push(pin);
        Ok(NullPin)
    }

    fn output_pin(&mut self, pin: PinId) -> Result<NullPin, BoardError> {
        self.requested.push(pin);
        Ok(NullPin)
    }
}

// Everything touching the process-wide snapshot lives in one test so the order is fixed.
#[test]
fn installed_reader_is_frozen_after_first_query() {
    let _ = env_logger::builder().is_test(true).try_init();

    assert!(set_reader(Box::new(|| 0x0002_u32)).is_ok());
    // A later installation before the first query wins.
    assert!(set_reader(Box::new(|| 0x0010_u32 | (1 << 24))).is_ok());

    let board = board_info();
    assert_eq!(board.model(), Ok(Model::BPlus));
    assert_eq!(board.processor(), Ok(Processor::Bcm2835));
    assert_eq!(board.ram_class(), Ok(RamClass::Mib512));
    assert_eq!(board.maker(), Ok(Maker::Sony));
    assert_eq!(board.pcb_version(), Ok(1));
    assert_eq!(board.turbo(), Ok(true));
    assert_eq!(board.warranty_void(), Ok(true));
    assert_eq!(
        board.raw_word(),
        1 + (3 << 4) + (1 << 20) + (1 << 23) + (1 << 24) + (1 << 25)
    );

    assert!(set_reader(Box::new(|| 0x0002_u32)).is_err());
    assert!(std::ptr::eq(board_info(), board));

    let snapshots: Vec<BoardInfo> = (0..8)
        .map(|_| thread::spawn(|| *board_info()))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(snapshots.iter().all(|snapshot| snapshot == board));

    let mut header = Header::detect(LoggingDriver { requested: vec![] }).unwrap();
    assert_eq!(header.layout(), HeaderLayout::J8);
    header.output_pin(13).unwrap();
    header.input_pin(37).unwrap();
    assert_eq!(
        header.into_inner().requested,
        vec![PinId::new(27).unwrap(), PinId::new(26).unwrap()]
    );
}
