use log::{debug, warn};
use once_cell::sync::{Lazy, OnceCell};
use std::sync::{Mutex, PoisonError};

use crate::revision::legacy;
use crate::{
    BoardError, BoardResult, HeaderLayout, Maker, Model, PinId, Processor, RamClass, RevisionWord,
};

pub mod reader;

use reader::{RevisionSource, SystemReader};

/// Typed, read-only view of the board revision.
///
/// A `BoardInfo` is a snapshot taken from a single `RevisionSource` read. If the read produced a
/// revision the codec recognizes, every query succeeds; otherwise every query fails with
/// `BoardError::UnknownBoard` and `raw_word` returns 0. Queries never touch the source again.
///
/// Most programs use the process-wide snapshot returned by `board_info`. `from_reader` builds a
/// private one, which is handy in tests.
///
/// # Example
/// ```
/// use rpi_board::{BoardInfo, Model};
///
/// let board = BoardInfo::from_reader(&|| 0x000e_u32);
/// assert_eq!(board.model()?, Model::B);
/// assert_eq!(board.map_header_pin(13)?.value(), 27);
/// # Ok::<(), rpi_board::BoardError>(())
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoardInfo {
    raw: u32,
    word: Option<RevisionWord>,
}

impl BoardInfo {
    /// Reads the revision from `reader` exactly once and decodes it.
    pub fn from_reader<R: RevisionSource + ?Sized>(reader: &R) -> Self {
        Self::from_revision(reader.read_revision())
    }

    /// Decodes a revision integer that has already been read.
    pub fn from_revision(raw: u32) -> Self {
        match RevisionWord::from_raw(raw) {
            Ok(word) => {
                debug!("detected {} (revision {:#x})", word, raw);
                Self {
                    raw,
                    word: Some(word),
                }
            }
            Err(_) => {
                warn!("unrecognized board revision {:#x}", raw);
                Self { raw, word: None }
            }
        }
    }

    /// Whether the revision was read and recognized.
    pub fn is_known(&self) -> bool {
        self.word.is_some()
    }

    pub fn revision(&self) -> BoardResult<&RevisionWord> {
        self.word.as_ref().ok_or(BoardError::UnknownBoard(self.raw))
    }

    pub fn model(&self) -> BoardResult<Model> {
        self.revision().map(RevisionWord::model)
    }

    pub fn processor(&self) -> BoardResult<Processor> {
        self.revision().map(RevisionWord::processor)
    }

    pub fn ram_class(&self) -> BoardResult<RamClass> {
        self.revision().map(RevisionWord::ram)
    }

    pub fn ram_mib(&self) -> BoardResult<u32> {
        self.ram_class().map(RamClass::mib)
    }

    pub fn ram_bytes(&self) -> BoardResult<u64> {
        self.revision().map(RevisionWord::ram_bytes)
    }

    pub fn maker(&self) -> BoardResult<Maker> {
        self.revision().map(RevisionWord::maker)
    }

    pub fn pcb_version(&self) -> BoardResult<u8> {
        self.revision().map(RevisionWord::pcb_version)
    }

    pub fn turbo(&self) -> BoardResult<bool> {
        self.revision().map(RevisionWord::turbo)
    }

    pub fn warranty_void(&self) -> BoardResult<bool> {
        self.revision().map(RevisionWord::warranty_void)
    }

    /// The decoded revision word, or 0 when the board is unknown.
    pub fn raw_word(&self) -> u32 {
        self.word.map_or(0, |word| word.raw())
    }

    /// The integer exactly as the source reported it, before any translation.
    pub fn raw_revision(&self) -> u32 {
        self.raw
    }

    /// 1-based major generation from the legacy revision number (see `major_generation`).
    ///
    /// Only first and second generation Model B boards have one, over-volted or not; every other
    /// board, including all new-scheme boards, gives `UnknownBoard`. Prefer `header_layout` or the
    /// typed queries.
    pub fn major_generation(&self) -> BoardResult<u8> {
        self.revision()?;
        legacy::major_generation(self.raw & !legacy::OVERVOLTAGE)
            .map_err(|_| BoardError::UnknownBoard(self.raw))
    }

    /// 0-based counterpart of `major_generation`.
    pub fn index_generation(&self) -> BoardResult<u8> {
        self.major_generation().map(|generation| generation - 1)
    }

    /// Expansion header fitted to this board.
    ///
    /// Fails with `UnknownBoard` for boards without a standard header (compute module, alpha).
    pub fn header_layout(&self) -> BoardResult<HeaderLayout> {
        let word = self.revision()?;

        match word.model() {
            Model::B if word.pcb_version() <= 1 => Ok(HeaderLayout::V1),
            Model::A | Model::B => Ok(HeaderLayout::V2),
            Model::APlus | Model::BPlus | Model::TwoB => Ok(HeaderLayout::J8),
            Model::Alpha | Model::ComputeModule => Err(BoardError::UnknownBoard(self.raw)),
        }
    }

    /// Translates a physical header pin of this board into a GPIO line.
    pub fn map_header_pin(&self, physical_pin: u8) -> BoardResult<PinId> {
        self.header_layout()?.map(physical_pin)
    }
}

type BoxedSource = Box<dyn RevisionSource + Send>;

/// Reader waiting for the first `board_info` call. Once taken, the slot stays frozen.
#[derive(Default)]
struct ReaderSlot {
    reader: Option<BoxedSource>,
    frozen: bool,
}

impl ReaderSlot {
    fn install(&mut self, reader: BoxedSource) -> Result<(), BoxedSource> {
        if self.frozen {
            return Err(reader);
        }
        self.reader = Some(reader);
        Ok(())
    }

    fn take(&mut self) -> Option<BoxedSource> {
        self.frozen = true;
        self.reader.take()
    }
}

static READER: Lazy<Mutex<ReaderSlot>> = Lazy::new(|| Mutex::new(ReaderSlot::default()));
static BOARD: OnceCell<BoardInfo> = OnceCell::new();

/// Replaces the source `board_info` reads from.
///
/// Only takes effect before the first `board_info` call starts reading; from then on the snapshot
/// is frozen and the reader is handed back. A reader that was accepted is always the one used.
pub fn set_reader(reader: BoxedSource) -> Result<(), BoxedSource> {
    READER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .install(reader)
}

/// Process-wide board snapshot.
///
/// The first call reads the revision (from `SystemReader` unless `set_reader` installed another
/// source); concurrent first calls block until that single read completes. Later calls return the
/// same snapshot without locking.
pub fn board_info() -> &'static BoardInfo {
    BOARD.get_or_init(|| {
        let installed = READER.lock().unwrap_or_else(PoisonError::into_inner).take();

        match installed {
            Some(reader) => BoardInfo::from_reader(reader.as_ref()),
            None => BoardInfo::from_reader(&SystemReader::default()),
        }
    })
}
