pub type Address = u16;
pub type Byte = u8;
pub type Word = u16;

/// Size of the RAM region, mapped from `0x0000`
pub const RAM_SIZE: usize = 0x8000;

/// Size of the ROM region, mapped right after the RAM
pub const ROM_SIZE: usize = 0x8000;

/// First address served by the ROM
pub const ROM_START: Address = 0x8000;

/// Address of the reset vector (high byte, the low byte follows)
pub const RESET_VECTOR: Address = 0xFFFE;

/// Where the loader places the first instruction of a program
pub const PROGRAM_START: Address = 0x0000;

/// Value of the ROM cells that were never programmed
pub const ROM_FILL: Byte = 0xFF;

/// Condition codes after a reset: only the IRQ mask is set
pub const RESET_CONDITION_CODES: Byte = 0x10;
