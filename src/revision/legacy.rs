//! Revision numbers of boards made before the bit-field scheme (bit 23 clear).
//!
//! Codes run from 0x02 to 0x12 with a hole at 0x0a..=0x0c. Bit 24 marks a board whose owner has
//! enabled over-voltage, which both turns on turbo mode and voids the warranty.
use super::field::{TURBO, WARRANTY_VOID};
use super::{Maker, Model, Processor, RamClass, RevisionWord};
use crate::{BoardError, BoardResult};

pub(crate) const OVERVOLTAGE: u32 = 1 << 24;
const LAST_CODE: u32 = 0x12;
const RESERVED_CODES: [u32; 5] = [0x00, 0x01, 0x0a, 0x0b, 0x0c];
const HOLE_END: u32 = 0x0c;
const HOLE_LEN: u32 = 3;

#[derive(Copy, Clone, Debug)]
struct LegacyBoard {
    model: Model,
    ram: RamClass,
    maker: Maker,
    pcb_version: u8,
}

const fn board(model: Model, ram: RamClass, maker: Maker, pcb_version: u8) -> LegacyBoard {
    LegacyBoard {
        model,
        ram,
        maker,
        pcb_version,
    }
}

// Indexed by code - 2, skipping the hole. All legacy boards carry a BCM2835.
const LEGACY_BOARDS: [LegacyBoard; 14] = [
    board(Model::B, RamClass::Mib256, Maker::Egoman, 1), // 0x02
    board(Model::B, RamClass::Mib256, Maker::Egoman, 1), // 0x03
    board(Model::B, RamClass::Mib256, Maker::Sony, 2),   // 0x04
    board(Model::B, RamClass::Mib256, Maker::Qisda, 2),  // 0x05
    board(Model::B, RamClass::Mib256, Maker::Egoman, 2), // 0x06
    board(Model::A, RamClass::Mib256, Maker::Egoman, 2), // 0x07
    board(Model::A, RamClass::Mib256, Maker::Sony, 2),   // 0x08
    board(Model::A, RamClass::Mib256, Maker::Qisda, 2),  // 0x09
    board(Model::B, RamClass::Mib512, Maker::Egoman, 2), // 0x0d
    board(Model::B, RamClass::Mib512, Maker::Sony, 2),   // 0x0e
    board(Model::B, RamClass::Mib512, Maker::Egoman, 2), // 0x0f
    board(Model::BPlus, RamClass::Mib512, Maker::Sony, 1), // 0x10
    board(Model::ComputeModule, RamClass::Mib512, Maker::Sony, 1), // 0x11
    board(Model::APlus, RamClass::Mib256, Maker::Sony, 1), // 0x12
];

/// Translates a legacy revision number into a new-scheme word.
///
/// Fails with `UnknownBoard` for reserved codes and anything above 0x12 once the over-voltage bit
/// is cleared.
pub fn translate_legacy(raw: u32) -> BoardResult<RevisionWord> {
    let mut code = raw;
    let mut flags = 0;

    if code & OVERVOLTAGE != 0 {
        flags = TURBO.set(flags, 1);
        flags = WARRANTY_VOID.set(flags, 1);
        code &= !OVERVOLTAGE;
    }

    if code > LAST_CODE || RESERVED_CODES.contains(&code) {
        return Err(BoardError::UnknownBoard(raw));
    }

    let mut index = code - 2;
    if code > HOLE_END {
        index -= HOLE_LEN;
    }

    let entry = LEGACY_BOARDS[index as usize];
    let packed = RevisionWord::pack(
        entry.model,
        Processor::Bcm2835,
        entry.ram,
        entry.maker,
        entry.pcb_version,
        false,
        false,
    )?;

    RevisionWord::from_raw(packed.raw() | flags)
}

/// Maps a raw legacy revision number straight to the board's major generation.
///
/// Codes 1 to 3 are first generation boards and 4 to 6 second generation. Anything else, including
/// every new-scheme word, is `UnknownBoard`. Kept for clients written against the old `rpi_info`
/// surface; `BoardInfo::header_layout` covers every board.
pub fn major_generation(raw: u32) -> BoardResult<u8> {
    match raw {
        1..=3 => Ok(1),
        4..=6 => Ok(2),
        _ => Err(BoardError::UnknownBoard(raw)),
    }
}
