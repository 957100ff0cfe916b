//! Bit-field descriptors of the 26-bit revision word.
//!
//! ```text
//!  25  24  23  22..20  19..16  15..12  11..4  3..0
//!  W   T   N   RAM     MAKER   PROC    MODEL  PCB
//! ```

/// One field of the revision word, `width` bits starting at bit `shift`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub shift: u32,
    pub width: u32,
}

impl Field {
    pub const fn new(name: &'static str, shift: u32, width: u32) -> Self {
        Self { name, shift, width }
    }

    /// Mask of the field in place.
    pub const fn mask(&self) -> u32 {
        ((1 << self.width) - 1) << self.shift
    }

    /// Largest value the field can hold.
    pub const fn max(&self) -> u32 {
        (1 << self.width) - 1
    }

    pub const fn get(&self, word: u32) -> u32 {
        (word & self.mask()) >> self.shift
    }

    /// Returns `word` with this field replaced by `value`. Bits of `value` wider than the field are dropped.
    pub const fn set(&self, word: u32, value: u32) -> u32 {
        (word & !self.mask()) | ((value << self.shift) & self.mask())
    }

    pub const fn is_set(&self, word: u32) -> bool {
        self.get(word) != 0
    }
}

pub const PCB_VERSION: Field = Field::new("pcb_version", 0, 4);
pub const MODEL: Field = Field::new("model", 4, 8);
pub const PROCESSOR: Field = Field::new("processor", 12, 4);
pub const MANUFACTURER: Field = Field::new("manufacturer", 16, 4);
pub const RAM: Field = Field::new("ram", 20, 3);
pub const NEW_SCHEME: Field = Field::new("new_scheme", 23, 1);
pub const TURBO: Field = Field::new("turbo", 24, 1);
pub const WARRANTY_VOID: Field = Field::new("warranty_void", 25, 1);

/// Every bit that belongs to a field.
pub const WORD_MASK: u32 = (1 << 26) - 1;
