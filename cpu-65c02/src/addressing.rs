//! 65C02 addressing modes.
//!
//! The 65C02 carries the thirteen NMOS modes plus zero-page indirect:
//! - Implied: no operand (e.g., CLC, RTS)
//! - Accumulator: operates on A (e.g., ASL A)
//! - Immediate: #$nn
//! - Zero Page: $nn
//! - Zero Page,X / Zero Page,Y: $nn,X - wraps within page zero
//! - Absolute: $nnnn
//! - Absolute,X / Absolute,Y: may cross a page (penalty cycle on reads)
//! - Indirect: ($nnnn) - JMP only, no NMOS page-wrap bug on the 65C02
//! - Indexed Indirect: ($nn,X)
//! - Indirect Indexed: ($nn),Y
//! - Zero Page Indirect: ($nn) - 65C02 addition
//! - Absolute Indexed Indirect: ($nnnn,X) - JMP only, 65C02 addition
//! - Relative: branch offset (-128 to +127)

use crate::Cpu65c02;
use mesa_core::Bus;

impl Cpu65c02 {
    /// Fetch the next byte at PC and increment PC.
    pub(crate) fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Fetch a 16-bit word (little-endian) at PC.
    pub(crate) fn fetch_word(&mut self, bus: &mut impl Bus) -> u16 {
        let low = self.fetch(bus);
        let high = self.fetch(bus);
        u16::from_le_bytes([low, high])
    }

    /// Read a 16-bit word from memory (little-endian).
    pub(crate) fn read_word(&self, bus: &mut impl Bus, addr: u16) -> u16 {
        let low = bus.read(addr);
        let high = bus.read(addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Push a byte onto the stack (page 1).
    pub(crate) fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Pull a byte from the stack.
    pub(crate) fn pull(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | u16::from(self.sp))
    }

    /// Push a 16-bit word onto the stack (high byte first).
    pub(crate) fn push_word(&mut self, bus: &mut impl Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    /// Pull a 16-bit word from the stack (low byte first).
    pub(crate) fn pull_word(&mut self, bus: &mut impl Bus) -> u16 {
        let low = self.pull(bus);
        let high = self.pull(bus);
        u16::from_le_bytes([low, high])
    }

    // =========================================================================
    // Addressing mode helpers
    // =========================================================================

    /// Zero Page: $nn
    pub(crate) fn addr_zero_page(&mut self, bus: &mut impl Bus) -> u16 {
        u16::from(self.fetch(bus))
    }

    /// Zero Page,X: $nn,X (wraps within zero page)
    pub(crate) fn addr_zero_page_x(&mut self, bus: &mut impl Bus) -> u16 {
        let base = self.fetch(bus);
        u16::from(base.wrapping_add(self.x))
    }

    /// Zero Page,Y: $nn,Y (wraps within zero page)
    pub(crate) fn addr_zero_page_y(&mut self, bus: &mut impl Bus) -> u16 {
        let base = self.fetch(bus);
        u16::from(base.wrapping_add(self.y))
    }

    /// Absolute: $nnnn
    pub(crate) fn addr_absolute(&mut self, bus: &mut impl Bus) -> u16 {
        self.fetch_word(bus)
    }

    /// Absolute,X: $nnnn,X
    /// Returns (address, page_crossed) - crossing costs a cycle on reads.
    pub(crate) fn addr_absolute_x(&mut self, bus: &mut impl Bus) -> (u16, bool) {
        let base = self.fetch_word(bus);
        let addr = base.wrapping_add(u16::from(self.x));
        let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
        (addr, page_crossed)
    }

    /// Absolute,X with the write/RMW dummy read at the partial address.
    ///
    /// The partial-address read is observable on I/O-mapped targets, so it
    /// goes through the bus rather than being elided.
    pub(crate) fn addr_absolute_x_rmw(&mut self, bus: &mut impl Bus) -> u16 {
        let base = self.fetch_word(bus);
        let addr = base.wrapping_add(u16::from(self.x));
        let partial = (base & 0xFF00) | (addr & 0x00FF);
        bus.read(partial);
        addr
    }

    /// Absolute,Y: $nnnn,Y
    pub(crate) fn addr_absolute_y(&mut self, bus: &mut impl Bus) -> (u16, bool) {
        let base = self.fetch_word(bus);
        let addr = base.wrapping_add(u16::from(self.y));
        let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
        (addr, page_crossed)
    }

    /// Absolute,Y with the write dummy read at the partial address.
    pub(crate) fn addr_absolute_y_rmw(&mut self, bus: &mut impl Bus) -> u16 {
        let base = self.fetch_word(bus);
        let addr = base.wrapping_add(u16::from(self.y));
        let partial = (base & 0xFF00) | (addr & 0x00FF);
        bus.read(partial);
        addr
    }

    /// Indexed Indirect: ($nn,X)
    /// The pointer is at zero page address (operand + X), wrapping within ZP.
    pub(crate) fn addr_indexed_indirect(&mut self, bus: &mut impl Bus) -> u16 {
        let base = self.fetch(bus);
        let ptr = base.wrapping_add(self.x);
        let low = bus.read(u16::from(ptr));
        let high = bus.read(u16::from(ptr.wrapping_add(1)));
        u16::from_le_bytes([low, high])
    }

    /// Indirect Indexed: ($nn),Y
    /// Returns (address, page_crossed).
    pub(crate) fn addr_indirect_indexed(&mut self, bus: &mut impl Bus) -> (u16, bool) {
        let ptr = self.fetch(bus);
        let low = bus.read(u16::from(ptr));
        let high = bus.read(u16::from(ptr.wrapping_add(1)));
        let base = u16::from_le_bytes([low, high]);
        let addr = base.wrapping_add(u16::from(self.y));
        let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
        (addr, page_crossed)
    }

    /// Indirect Indexed: ($nn),Y with the write dummy read.
    pub(crate) fn addr_indirect_indexed_rmw(&mut self, bus: &mut impl Bus) -> u16 {
        let ptr = self.fetch(bus);
        let low = bus.read(u16::from(ptr));
        let high = bus.read(u16::from(ptr.wrapping_add(1)));
        let base = u16::from_le_bytes([low, high]);
        let addr = base.wrapping_add(u16::from(self.y));
        let partial = (base & 0xFF00) | (addr & 0x00FF);
        bus.read(partial);
        addr
    }

    /// Zero Page Indirect: ($nn) - 65C02 addition, wraps within ZP.
    pub(crate) fn addr_zero_page_indirect(&mut self, bus: &mut impl Bus) -> u16 {
        let ptr = self.fetch(bus);
        let low = bus.read(u16::from(ptr));
        let high = bus.read(u16::from(ptr.wrapping_add(1)));
        u16::from_le_bytes([low, high])
    }

    /// Execute a branch if the condition holds.
    /// Returns extra cycles (1 if taken, 2 if taken across a page).
    pub(crate) fn branch_if(&mut self, bus: &mut impl Bus, condition: bool) -> u32 {
        let offset = self.fetch(bus) as i8;
        let target = self.pc.wrapping_add(offset as u16);
        if condition {
            let page_crossed = (self.pc & 0xFF00) != (target & 0xFF00);
            self.pc = target;
            if page_crossed {
                2
            } else {
                1
            }
        } else {
            0
        }
    }
}
