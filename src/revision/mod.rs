//! Revision word codec.
//!
//! Boards made since 2014 report a 26-bit revision word with bit 23 set, whose fields are described
//! in `field`. Older boards report a small legacy number, which `legacy` translates into the same
//! layout. `RevisionWord` only ever holds a word whose every field decodes to a defined value.
use derive_try_from_primitive::TryFromPrimitive;
use std::convert::TryFrom;
use std::fmt;

use crate::{ArgumentError, BoardError, BoardResult};

pub mod field;
pub mod legacy;

/// Board models known to the revision word.
#[repr(u8)]
#[derive(TryFromPrimitive, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Model {
    A = 0,
    B = 1,
    APlus = 2,
    BPlus = 3,
    TwoB = 4,
    Alpha = 5,
    ComputeModule = 6,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Model::A => write!(f, "Raspberry Pi Model A"),
            Model::B => write!(f, "Raspberry Pi Model B"),
            Model::APlus => write!(f, "Raspberry Pi Model A+"),
            Model::BPlus => write!(f, "Raspberry Pi Model B+"),
            Model::TwoB => write!(f, "Raspberry Pi 2 Model B"),
            Model::Alpha => write!(f, "Raspberry Pi Alpha"),
            Model::ComputeModule => write!(f, "Raspberry Pi Compute Module"),
        }
    }
}

#[repr(u8)]
#[derive(TryFromPrimitive, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Processor {
    Bcm2835 = 0,
    Bcm2836 = 1,
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Processor::Bcm2835 => write!(f, "BCM2835"),
            Processor::Bcm2836 => write!(f, "BCM2836"),
        }
    }
}

/// Amount of RAM fitted to the board.
#[repr(u8)]
#[derive(TryFromPrimitive, Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum RamClass {
    Mib256 = 0,
    Mib512 = 1,
    Mib1024 = 2,
}

impl RamClass {
    pub fn mib(self) -> u32 {
        256 << (self as u32)
    }

    pub fn bytes(self) -> u64 {
        u64::from(self.mib()) << 20
    }
}

impl fmt::Display for RamClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} MiB", self.mib())
    }
}

/// Resolves a raw `ram` field value to a byte count. Values with no defined class give 0.
pub fn ram_bytes_for_class(class: u32) -> u64 {
    u8::try_from(class)
        .ok()
        .and_then(|ordinal| RamClass::try_from(ordinal).ok())
        .map_or(0, RamClass::bytes)
}

/// Board manufacturer. `Unknown` is a manufacturer code the foundation reserved, not a decode failure.
#[repr(u8)]
#[derive(TryFromPrimitive, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Maker {
    Sony = 0,
    Egoman = 1,
    Embest = 2,
    Unknown = 3,
    Embest2 = 4,
    Qisda = 5,
}

impl fmt::Display for Maker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Maker::Sony => write!(f, "Sony"),
            Maker::Egoman => write!(f, "Egoman"),
            Maker::Embest | Maker::Embest2 => write!(f, "Embest"),
            Maker::Unknown => write!(f, "unknown"),
            Maker::Qisda => write!(f, "Qisda"),
        }
    }
}

/// How `RevisionWord::unpack_with` treats a field holding an ordinal with no defined variant.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecodePolicy {
    /// Reject the word with `BoardError::UnknownBoard`.
    Strict,
    /// Substitute the nearest defined variant, which is always the last one.
    Nearest,
}

impl Default for DecodePolicy {
    fn default() -> Self {
        DecodePolicy::Strict
    }
}

trait Enumerant: Copy + TryFrom<u8> {
    const LAST: Self;
}

impl Enumerant for Model {
    const LAST: Self = Model::ComputeModule;
}

impl Enumerant for Processor {
    const LAST: Self = Processor::Bcm2836;
}

impl Enumerant for RamClass {
    const LAST: Self = RamClass::Mib1024;
}

impl Enumerant for Maker {
    const LAST: Self = Maker::Qisda;
}

fn decode<T: Enumerant>(word: u32, field: field::Field, policy: DecodePolicy) -> BoardResult<T> {
    // Every enumerated field is at most 8 bits wide.
    let ordinal = field.get(word) as u8;

    match (T::try_from(ordinal), policy) {
        (Ok(value), _) => Ok(value),
        (Err(_), DecodePolicy::Nearest) => Ok(T::LAST),
        (Err(_), DecodePolicy::Strict) => Err(BoardError::UnknownBoard(word)),
    }
}

/// Decoded attributes of a board, as stored in a revision word.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RevisionParts {
    pub model: Model,
    pub processor: Processor,
    pub ram: RamClass,
    pub maker: Maker,
    pub pcb_version: u8,
    pub turbo: bool,
    pub warranty_void: bool,
}

impl RevisionParts {
    /// Parts of a board with neither the turbo nor the warranty flag set.
    pub fn new(model: Model, processor: Processor, ram: RamClass, maker: Maker, pcb_version: u8) -> Self {
        Self {
            model,
            processor,
            ram,
            maker,
            pcb_version,
            turbo: false,
            warranty_void: false,
        }
    }

    pub fn with_turbo(mut self, turbo: bool) -> Self {
        self.turbo = turbo;
        self
    }

    pub fn with_warranty_void(mut self, warranty_void: bool) -> Self {
        self.warranty_void = warranty_void;
        self
    }
}

/// A validated revision word in the new bit-field layout.
///
/// The new-scheme flag (bit 23) is always set and every enumerated field holds a defined variant.
/// The word is immutable once constructed.
///
/// # Example
/// ```
/// use rpi_board::{Model, RamClass, RevisionWord};
///
/// let word = RevisionWord::from_raw(0x0010)?;
/// assert_eq!(word.model(), Model::BPlus);
/// assert_eq!(word.ram(), RamClass::Mib512);
/// # Ok::<(), rpi_board::BoardError>(())
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RevisionWord {
    raw: u32,
    parts: RevisionParts,
}

impl RevisionWord {
    /// Packs typed attributes into a word. Fails with `InvalidArgument` when `pcb_version` exceeds 15.
    pub fn pack(
        model: Model,
        processor: Processor,
        ram: RamClass,
        maker: Maker,
        pcb_version: u8,
        turbo: bool,
        warranty_void: bool,
    ) -> BoardResult<Self> {
        use field::*;

        if u32::from(pcb_version) > PCB_VERSION.max() {
            return Err(BoardError::InvalidArgument(
                ArgumentError::PcbVersionOutOfRange(pcb_version),
            ));
        }

        let mut raw = NEW_SCHEME.set(0, 1);
        raw = PCB_VERSION.set(raw, u32::from(pcb_version));
        raw = MODEL.set(raw, model as u32);
        raw = PROCESSOR.set(raw, processor as u32);
        raw = MANUFACTURER.set(raw, maker as u32);
        raw = RAM.set(raw, ram as u32);
        raw = TURBO.set(raw, turbo as u32);
        raw = WARRANTY_VOID.set(raw, warranty_void as u32);

        Ok(Self {
            raw,
            parts: RevisionParts {
                model,
                processor,
                ram,
                maker,
                pcb_version,
                turbo,
                warranty_void,
            },
        })
    }

    pub fn from_parts(parts: RevisionParts) -> BoardResult<Self> {
        Self::pack(
            parts.model,
            parts.processor,
            parts.ram,
            parts.maker,
            parts.pcb_version,
            parts.turbo,
            parts.warranty_void,
        )
    }

    /// Builds a word from an integer of unknown origin.
    ///
    /// Integers with bit 23 clear are legacy revisions and go through `translate_legacy`. Others are
    /// decoded strictly; bits above bit 25 are ignored. The flag alone decides, so 0x800000 is the
    /// new-scheme word for a Sony Model A rather than an out-of-range legacy code.
    pub fn from_raw(raw: u32) -> BoardResult<Self> {
        if field::NEW_SCHEME.is_set(raw) {
            let raw = raw & field::WORD_MASK;
            let parts = Self::unpack(raw)?;
            Ok(Self { raw, parts })
        } else {
            legacy::translate_legacy(raw)
        }
    }

    /// Splits a new-scheme word into its attributes, rejecting undefined ordinals.
    ///
    /// The new-scheme flag itself is not inspected.
    pub fn unpack(raw: u32) -> BoardResult<RevisionParts> {
        Self::unpack_with(raw, DecodePolicy::Strict)
    }

    pub fn unpack_with(raw: u32, policy: DecodePolicy) -> BoardResult<RevisionParts> {
        use field::*;

        Ok(RevisionParts {
            model: decode(raw, MODEL, policy)?,
            processor: decode(raw, PROCESSOR, policy)?,
            ram: decode(raw, RAM, policy)?,
            maker: decode(raw, MANUFACTURER, policy)?,
            pcb_version: PCB_VERSION.get(raw) as u8,
            turbo: TURBO.is_set(raw),
            warranty_void: WARRANTY_VOID.is_set(raw),
        })
    }

    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn parts(&self) -> RevisionParts {
        self.parts
    }

    pub fn model(&self) -> Model {
        self.parts.model
    }

    pub fn processor(&self) -> Processor {
        self.parts.processor
    }

    pub fn ram(&self) -> RamClass {
        self.parts.ram
    }

    pub fn ram_bytes(&self) -> u64 {
        ram_bytes_for_class(field::RAM.get(self.raw))
    }

    pub fn maker(&self) -> Maker {
        self.parts.maker
    }

    pub fn pcb_version(&self) -> u8 {
        self.parts.pcb_version
    }

    pub fn turbo(&self) -> bool {
        self.parts.turbo
    }

    pub fn warranty_void(&self) -> bool {
        self.parts.warranty_void
    }
}

impl TryFrom<u32> for RevisionWord {
    type Error = BoardError;

    fn try_from(raw: u32) -> BoardResult<Self> {
        Self::from_raw(raw)
    }
}

impl From<RevisionWord> for u32 {
    fn from(word: RevisionWord) -> u32 {
        word.raw
    }
}

impl fmt::Display for RevisionWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} rev {} ({}, {}, {})",
            self.model(),
            self.pcb_version(),
            self.processor(),
            self.ram(),
            self.maker()
        )
    }
}
