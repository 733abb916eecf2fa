//! ACIA-style serial card.
//!
//! UART with RX/TX FIFOs and cycle-accurate transmit pacing: one byte
//! leaves the TX queue every `(frequency / baud) * 10` CPU cycles (8 data
//! bits + start + stop). Transmitted bytes collect in an outbound queue
//! the machine drains into the host callback.
//!
//! # Registers (low 2 address bits)
//!
//! | Reg | Read   | Write            |
//! |-----|--------|------------------|
//! | $0  | RX data| TX data          |
//! | $1  | status | programmed reset |
//! | $2  | command| command          |
//! | $3  | control| control          |

use std::collections::VecDeque;

// Status bits
pub const STATUS_PARITY: u8 = 0x01;
pub const STATUS_FRAMING: u8 = 0x02;
pub const STATUS_OVERRUN: u8 = 0x04;
pub const STATUS_RDRF: u8 = 0x08;
pub const STATUS_TDRE: u8 = 0x10;
pub const STATUS_DCD: u8 = 0x20;
pub const STATUS_DSR: u8 = 0x40;
pub const STATUS_IRQ: u8 = 0x80;

// Command bits
const CMD_RX_IRQ_DISABLE: u8 = 0x02;
const CMD_TX_CONTROL: u8 = 0x0C;
const CMD_TX_IRQ_ENABLED: u8 = 0x04;
const CMD_ECHO: u8 = 0x20;

/// Baud rates selected by control register bits 3..0. Code 0 is the
/// external-clock position and passes bytes at the top rate.
const BAUD_RATES: [u32; 16] = [
    115_200, 50, 75, 110, 134, 150, 300, 600, 1200, 1800, 2400, 3600, 4800, 7200, 9600, 19_200,
];

/// ACIA-style UART.
pub struct Acia {
    /// Receive FIFO (host -> guest).
    rx: VecDeque<u8>,
    /// Transmit FIFO (guest -> host), drained by baud pacing.
    tx: VecDeque<u8>,
    /// Bytes that completed transmission, awaiting the host callback.
    transmitted: Vec<u8>,

    /// Overrun latch: a byte arrived while RDRF was set.
    overrun: bool,
    /// Transmit data register empty.
    tdre: bool,
    /// Interrupt latch.
    irq: bool,

    /// Command register.
    command: u8,
    /// Control register (baud code, word length, stop bits).
    control: u8,

    /// Cycles accumulated toward the next TX byte.
    tx_counter: u64,
    /// Optional host-side baud override.
    baud_override: Option<u32>,
}

impl Acia {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: VecDeque::new(),
            transmitted: Vec::new(),
            overrun: false,
            tdre: true,
            irq: false,
            command: 0,
            control: 0,
            tx_counter: 0,
            baud_override: None,
        }
    }

    /// Pin the line rate regardless of the guest's control register.
    pub fn set_baud_override(&mut self, baud: Option<u32>) {
        self.baud_override = baud.filter(|&b| (50..=115_200).contains(&b));
    }

    /// Hardware reset: clears FIFOs and registers.
    pub fn reset(&mut self) {
        self.rx.clear();
        self.tx.clear();
        self.transmitted.clear();
        self.overrun = false;
        self.tdre = true;
        self.irq = false;
        self.command = 0;
        self.control = 0;
        self.tx_counter = 0;
    }

    /// Current line rate in bits per second.
    #[must_use]
    pub fn baud(&self) -> u32 {
        self.baud_override
            .unwrap_or(BAUD_RATES[usize::from(self.control & 0x0F)])
    }

    /// Whether the card asserts its IRQ line.
    #[must_use]
    pub fn irq_active(&self) -> bool {
        self.irq
    }

    /// A byte arrived from the host.
    pub fn receive(&mut self, byte: u8) {
        if !self.rx.is_empty() {
            self.overrun = true;
        }
        self.rx.push_back(byte);
        if self.command & CMD_RX_IRQ_DISABLE == 0 {
            self.irq = true;
        }
        if self.command & CMD_ECHO != 0 {
            self.tx.push_back(byte);
            self.tdre = false;
        }
    }

    /// Drain bytes that finished transmitting.
    pub fn take_transmitted(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.transmitted)
    }

    /// Advance transmit pacing by `cycles` CPU cycles.
    pub fn tick(&mut self, cycles: u32, frequency: u32) {
        if self.tx.is_empty() {
            self.tx_counter = 0;
            return;
        }

        // Start + 8 data + stop = 10 bit times per byte
        let cycles_per_byte = u64::from(frequency) / u64::from(self.baud()) * 10;
        self.tx_counter += u64::from(cycles);

        while self.tx_counter >= cycles_per_byte {
            self.tx_counter -= cycles_per_byte;
            if let Some(byte) = self.tx.pop_front() {
                self.transmitted.push(byte);
            }
            if self.tx.is_empty() {
                self.tx_counter = 0;
                self.tdre = true;
                if self.command & CMD_TX_CONTROL == CMD_TX_IRQ_ENABLED {
                    self.irq = true;
                }
                break;
            }
        }
    }

    /// Read a register.
    pub fn read(&mut self, reg: u8) -> u8 {
        match reg & 0x03 {
            0x00 => {
                let byte = self.rx.pop_front().unwrap_or(0);
                if self.rx.is_empty() {
                    self.irq = false;
                }
                byte
            }
            0x01 => self.status(),
            0x02 => self.command,
            0x03 => self.control,
            _ => unreachable!(),
        }
    }

    /// Write a register.
    pub fn write(&mut self, reg: u8, value: u8) {
        match reg & 0x03 {
            0x00 => {
                self.tx.push_back(value);
                self.tdre = false;
            }
            0x01 => {
                // Programmed reset: errors and IRQ clear, FIFOs survive
                self.overrun = false;
                self.irq = false;
                self.tdre = true;
            }
            0x02 => self.command = value,
            0x03 => self.control = value,
            _ => unreachable!(),
        }
    }

    fn status(&self) -> u8 {
        let mut status = 0;
        if self.overrun {
            status |= STATUS_OVERRUN;
        }
        if !self.rx.is_empty() {
            status |= STATUS_RDRF;
        }
        if self.tdre {
            status |= STATUS_TDRE;
        }
        if self.irq {
            status |= STATUS_IRQ;
        }
        // DCD and DSR report ready (low); parity/framing never set
        status
    }
}

impl Default for Acia {
    fn default() -> Self {
        Self::new()
    }
}
