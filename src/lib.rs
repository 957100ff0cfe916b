//! This crate identifies the BCM2835-family Raspberry Pi board it is running on and maps the board's
//! expansion header onto SoC GPIO lines.
//!
//! The board revision is read once per process from `/proc/cpuinfo` (or the device tree on kernels
//! that no longer print it there), decoded into a `RevisionWord` and exposed through `BoardInfo`.
//! Boards made before 2014 report a legacy numeric revision, which is translated into the newer
//! bit-field layout before decoding.
//!
//! GPIO identifiers handed to a driver are always `PinId`s, which can only hold legal SoC GPIO lines
//! (0 to 53). `HeaderLayout` translates physical header positions, which moved between board
//! revisions, into `PinId`s.
//!
//! The crate does not drive GPIO registers itself. Drivers plug in behind the `gpio::PinAccess`
//! trait, which hands out [`embedded_hal`](https://crates.io/crates/embedded-hal) digital pins.

use thiserror::Error;

mod board;
pub mod gpio;
mod pin;
mod pin_map;
mod revision;

pub use board::reader::{CpuInfoReader, DeviceTreeReader, RevisionSource, SystemReader};
pub use board::{board_info, set_reader, BoardInfo};
pub use pin::PinId;
pub use pin_map::{map_header_pin, HeaderLayout};
pub use revision::field::{self, Field};
pub use revision::legacy::{major_generation, translate_legacy};
pub use revision::{
    ram_bytes_for_class, DecodePolicy, Maker, Model, Processor, RamClass, RevisionParts,
    RevisionWord,
};

/// Details of a value refused by one of this crate's constructors or lookups.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("{0} is not a GPIO line (0..={max})", max = PinId::MAX)]
    PinOutOfRange(i64),
    #[error("PCB version {0} does not fit in 4 bits")]
    PcbVersionOutOfRange(u8),
    #[error("header has no pin {0}")]
    HeaderPinOutOfRange(u8),
    /// The header pin is power, ground or reserved.
    #[error("header pin {0} is not connected to a GPIO")]
    NoGpioOnHeaderPin(u8),
    /// Only board generations 1 and 2 have a known header layout.
    #[error("unknown board generation {0}")]
    UnknownGeneration(u8),
}

/// Main error type for this crate.
///
/// `InvalidArgument` means the caller supplied a value the type refuses. `UnknownBoard` means the
/// environment is not a recognized board: the revision could not be read, or it names a board
/// this crate doesn't know. Neither kind wraps another error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid argument: {0}")]
    InvalidArgument(ArgumentError),
    #[error("unknown board revision {0:#x}")]
    UnknownBoard(u32),
}

pub type BoardResult<T> = Result<T, BoardError>;
