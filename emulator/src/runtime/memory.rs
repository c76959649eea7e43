use tracing::trace;

use crate::constants::{Address, Byte, Word, RAM_SIZE, RESET_VECTOR, ROM_FILL, ROM_SIZE, ROM_START};

/// Writable memory, zero-filled on reset
#[derive(Clone, PartialEq, Eq)]
pub struct Ram {
    inner: Box<[Byte; RAM_SIZE]>,
}

impl Default for Ram {
    fn default() -> Self {
        Self {
            inner: Box::new([0; RAM_SIZE]),
        }
    }
}

impl Ram {
    /// Read a byte. Out of range offsets read as zero.
    #[must_use]
    pub fn read(&self, offset: usize) -> Byte {
        self.inner.get(offset).copied().unwrap_or(0)
    }

    /// Write a byte. Out of range offsets are ignored.
    pub fn write(&mut self, offset: usize, value: Byte) {
        if let Some(cell) = self.inner.get_mut(offset) {
            *cell = value;
        }
    }

    pub fn reset(&mut self) {
        self.inner.fill(0);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Byte] {
        self.inner.as_slice()
    }
}

/// Read-only memory
///
/// The only way to change its content is a reset, which fills it with `0xFF`
/// and programs the reset vector.
#[derive(Clone, PartialEq, Eq)]
pub struct Rom {
    inner: Box<[Byte; ROM_SIZE]>,
}

impl Default for Rom {
    fn default() -> Self {
        let mut rom = Self {
            inner: Box::new([ROM_FILL; ROM_SIZE]),
        };
        rom.program_reset_vector(crate::constants::PROGRAM_START);
        rom
    }
}

impl Rom {
    /// Read a byte. Out of range offsets read as zero.
    #[must_use]
    pub fn read(&self, offset: usize) -> Byte {
        self.inner.get(offset).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.inner.fill(ROM_FILL);
        self.program_reset_vector(crate::constants::PROGRAM_START);
    }

    fn program_reset_vector(&mut self, target: Address) {
        let offset = usize::from(RESET_VECTOR - ROM_START);
        let [high, low] = target.to_be_bytes();
        self.inner[offset] = high;
        self.inner[offset + 1] = low;
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Byte] {
        self.inner.as_slice()
    }
}

/// The 16-bit address space: RAM from `0x0000`, ROM from `0x8000`
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Memory {
    ram: Ram,
    rom: Rom,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory {{ ram: [...], rom: [...] }}")
    }
}

impl Memory {
    /// Read the byte at an address
    #[must_use]
    pub fn read(&self, address: Address) -> Byte {
        if address < ROM_START {
            self.ram.read(usize::from(address))
        } else {
            self.rom.read(usize::from(address - ROM_START))
        }
    }

    /// Write a byte at an address
    ///
    /// Writes to the ROM region are silently discarded.
    pub fn write(&mut self, address: Address, value: Byte) {
        if address < ROM_START {
            self.ram.write(usize::from(address), value);
        } else {
            trace!(address, value, "Ignoring write to ROM");
        }
    }

    /// Read a big-endian word, the low byte being at `address + 1`
    #[must_use]
    pub fn read_word(&self, address: Address) -> Word {
        let high = self.read(address);
        let low = self.read(address.wrapping_add(1));
        Word::from_be_bytes([high, low])
    }

    /// Write a big-endian word, high byte first
    pub fn write_word(&mut self, address: Address, value: Word) {
        let [high, low] = value.to_be_bytes();
        self.write(address, high);
        self.write(address.wrapping_add(1), low);
    }

    /// Restore the power-on content of both regions
    pub fn reset(&mut self) {
        self.ram.reset();
        self.rom.reset();
    }

    /// Copy `len` bytes starting at `start`, wrapping around the address space
    #[must_use]
    pub fn dump(&self, start: Address, len: usize) -> Vec<Byte> {
        (0..len)
            .map(|i| {
                // Truncation is the wrap-around we want here
                let offset: Address = (i & 0xFFFF).try_into().unwrap_or_default();
                self.read(start.wrapping_add(offset))
            })
            .collect()
    }

    #[must_use]
    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    #[must_use]
    pub fn rom(&self) -> &Rom {
        &self.rom
    }
}
