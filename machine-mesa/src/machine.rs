//! The Mesa-8 machine: construction, device wiring, the scheduler that
//! fans device time out around the CPU, and the wall-clock pacing loop.
//!
//! Scheduling contract: within one instruction the CPU's bus accesses
//! settle first; the serial card then receives the instruction's exact
//! cycle count; the remaining cards run in 128-cycle batches through an
//! accumulator. Interrupt lines are sampled between instructions, so a
//! device raising IRQ mid-batch is observed at the next boundary. The
//! IRQ line is level-sensitive: it is offered to the CPU at every
//! boundary while any card asserts it, and the CPU's own disable flag
//! decides whether it is taken. Only the watchdog NMI is an edge.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpu_65c02::Cpu65c02;
use mesa_core::{Cpu, MasterClock};
use via_65c22::AttachmentHandle;

use crate::attachments::{Joystick, JoystickPort, KeyboardEncoder, KeyboardMatrix};
use crate::bus::IoBus;
use crate::config::{MachineConfig, ResetKind};
use crate::MachineError;

/// CPU cycles between device tick batches (serial excepted).
pub const TICK_INTERVAL: u32 = 128;

/// Catch-up ceiling: never owe more than this much wall-clock time.
const CATCHUP_CAP_MICROS: u64 = 250_000;

type RenderCallback = Box<dyn FnMut(&[u8])>;
type AudioCallback = Box<dyn FnMut(&[f32])>;
type TransmitCallback = Box<dyn FnMut(u8)>;

/// Clonable handle that ends a running [`Mesa::run`] loop at its next
/// iteration.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// The Mesa-8 machine.
pub struct Mesa {
    cpu: Cpu65c02,
    bus: IoBus,
    config: MachineConfig,

    /// Cycles accumulated toward the next device tick batch.
    tick_acc: u32,
    /// Wall-clock debt in microseconds.
    pending_micros: u64,
    /// Loop-alive flag shared with [`StopHandle`]s.
    alive: Arc<AtomicBool>,

    render: Option<RenderCallback>,
    audio: Option<AudioCallback>,
    transmit: Option<TransmitCallback>,

    keyboard: Rc<RefCell<KeyboardMatrix>>,
    encoder: Rc<RefCell<KeyboardEncoder>>,
    joystick: Rc<RefCell<Joystick>>,
}

impl Mesa {
    /// Build the machine, wire the input devices onto the VIA, load the
    /// optional CF backing file, and apply the configured reset.
    #[must_use]
    pub fn new(config: MachineConfig) -> Self {
        let mut bus = IoBus::new(config.sample_rate);
        bus.acia.set_baud_override(config.host_baud);

        let keyboard = Rc::new(RefCell::new(KeyboardMatrix::new()));
        let encoder = Rc::new(RefCell::new(KeyboardEncoder::new()));
        let joystick = Rc::new(RefCell::new(Joystick::new(JoystickPort::B)));

        // The matrix reads rows on port A and watches column selects on
        // port B; the encoder answers on either port; the joystick sits
        // on port B.
        bus.via
            .attach_port_a(Rc::clone(&keyboard) as AttachmentHandle);
        bus.via
            .attach_port_b(Rc::clone(&keyboard) as AttachmentHandle);
        bus.via
            .attach_port_a(Rc::clone(&encoder) as AttachmentHandle);
        bus.via
            .attach_port_b(Rc::clone(&encoder) as AttachmentHandle);
        bus.via
            .attach_port_b(Rc::clone(&joystick) as AttachmentHandle);

        if let Some(path) = &config.storage_path {
            match std::fs::read(path) {
                Ok(image) => {
                    if let Err(err) = bus.storage.load_image(&image) {
                        log::warn!("ignoring CF backing file {}: {err}", path.display());
                    }
                }
                Err(err) => {
                    log::info!("CF backing file {} not loaded: {err}", path.display());
                }
            }
        }

        let mut machine = Self {
            cpu: Cpu65c02::new(),
            bus,
            tick_acc: 0,
            pending_micros: 0,
            alive: Arc::new(AtomicBool::new(true)),
            render: None,
            audio: None,
            transmit: None,
            keyboard,
            encoder,
            joystick,
            config,
        };
        machine.reset(machine.config.reset);
        machine
    }

    /// Machine configuration.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Direct bus access (loading images, diagnostics, tests).
    #[must_use]
    pub fn bus(&self) -> &IoBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut IoBus {
        &mut self.bus
    }

    /// CPU state access.
    #[must_use]
    pub fn cpu(&self) -> &Cpu65c02 {
        &self.cpu
    }

    // --- Host callback surface ---

    /// Called once per rendered frame with the 320x240 RGBA buffer.
    pub fn on_render(&mut self, callback: impl FnMut(&[u8]) + 'static) {
        self.render = Some(Box::new(callback));
    }

    /// Called with batches of mono f32 samples.
    pub fn on_audio(&mut self, callback: impl FnMut(&[f32]) + 'static) {
        self.audio = Some(Box::new(callback));
    }

    /// Called for each byte leaving the serial card.
    pub fn on_transmit(&mut self, callback: impl FnMut(u8) + 'static) {
        self.transmit = Some(Box::new(callback));
    }

    // --- Host inputs ---

    /// A byte arrived on the host serial side.
    pub fn receive(&mut self, byte: u8) {
        self.bus.acia.receive(byte);
    }

    /// A key went down (HID usage ID).
    pub fn key_down(&mut self, usage: u8) {
        self.keyboard.borrow_mut().key_down(usage);
        self.encoder.borrow_mut().key_down(usage);
    }

    /// A key came up.
    pub fn key_up(&mut self, usage: u8) {
        self.keyboard.borrow_mut().key_up(usage);
        self.encoder.borrow_mut().key_up(usage);
    }

    /// Replace the joystick button state (see `mesa_core::joystick`).
    pub fn set_joystick(&mut self, buttons: u8) {
        self.joystick.borrow_mut().set_state(buttons);
    }

    // --- Images ---

    /// Load the system ROM. A wrong-sized image is refused; the machine
    /// keeps running with the previous (or all-zero) contents.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), MachineError> {
        match self.bus.rom.load(image) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("ROM not loaded: {err}");
                Err(err)
            }
        }
    }

    /// Insert a cartridge. Replaces any existing one on success.
    pub fn load_cart(&mut self, image: &[u8]) -> Result<(), MachineError> {
        let mut cart = crate::memory::Rom::new();
        match cart.load(image) {
            Ok(()) => {
                self.bus.cart = Some(cart);
                Ok(())
            }
            Err(MachineError::RomSize { expected, got }) => {
                let err = MachineError::CartSize { expected, got };
                log::warn!("cartridge not loaded: {err}");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Remove the cartridge.
    pub fn remove_cart(&mut self) {
        self.bus.cart = None;
    }

    /// Write the CF store back to the configured backing file.
    pub fn save_storage(&self) -> Result<(), MachineError> {
        let Some(path) = &self.config.storage_path else {
            return Ok(());
        };
        std::fs::write(path, self.bus.storage.data()).map_err(|err| {
            log::warn!("CF backing file {} not saved: {err}", path.display());
            MachineError::Io(err)
        })
    }

    // --- Reset and the scheduler ---

    /// Reset the machine. Cold clears memory and reseeds the clock; warm
    /// preserves memory and time, clearing volatile device state.
    pub fn reset(&mut self, kind: ResetKind) {
        match kind {
            ResetKind::Cold => {
                self.bus.ram.fill(0);
                self.bus.ram1.cold_reset();
                self.bus.ram2.cold_reset();
                self.bus.vdp.reset(true);
                self.bus.rtc.cold_reset();
            }
            ResetKind::Warm => {
                self.bus.vdp.reset(false);
                self.bus.rtc.warm_reset();
            }
        }
        self.bus.sid.reset();
        self.bus.via.reset();
        self.bus.acia.reset();
        self.bus.acia.set_baud_override(self.config.host_baud);
        self.bus.storage.reset();
        self.tick_acc = 0;
        self.cpu.reset(&mut self.bus);
    }

    /// Execute one instruction plus its device fan-out. Returns the cycles
    /// consumed, including any interrupt entry.
    pub fn step(&mut self) -> u32 {
        let mut cycles = 0;

        // Interrupts posted by devices during earlier batches are taken
        // here, at the instruction boundary. The combined line is
        // level-sensitive: while any card asserts it, the CPU is offered
        // the interrupt every boundary and its disable flag masks it
        // inside the handler. Handlers drop the line by acknowledging
        // their device (status/flag reads).
        if self.irq_line() {
            cycles += self.cpu.irq(&mut self.bus);
        }
        if self.bus.rtc.take_nmi() {
            cycles += self.cpu.nmi(&mut self.bus);
        }

        cycles += self.cpu.step(&mut self.bus);

        self.dispatch_device_time(cycles);
        self.drain_outputs();
        cycles
    }

    /// Run at least `cycles` CPU cycles. Returns the cycles consumed.
    pub fn run_cycles(&mut self, cycles: u64) -> u64 {
        let mut consumed = 0u64;
        while consumed < cycles && self.alive.load(Ordering::Relaxed) {
            consumed += u64::from(self.step());
        }
        consumed
    }

    /// A handle that stops [`run`](Self::run) from callbacks or other
    /// parts of the host.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.alive))
    }

    /// Pace the machine against the wall clock until stopped.
    ///
    /// Each iteration converts elapsed time into owed CPU cycles, clamps
    /// the debt at the catch-up ceiling, runs that many cycles, and keeps
    /// the fractional remainder.
    pub fn run(&mut self) {
        let clock = MasterClock::new(self.config.cpu_frequency_hz);
        self.alive.store(true, Ordering::Relaxed);
        let mut last = Instant::now();

        while self.alive.load(Ordering::Relaxed) {
            let now = Instant::now();
            self.pending_micros += now.duration_since(last).as_micros() as u64;
            last = now;

            if self.pending_micros > CATCHUP_CAP_MICROS {
                self.pending_micros = CATCHUP_CAP_MICROS;
            }

            let owed = clock.cycles_for_micros(self.pending_micros);
            if owed > 0 {
                let consumed = self.run_cycles(owed);
                self.pending_micros = self
                    .pending_micros
                    .saturating_sub(consumed * 1_000_000 / u64::from(clock.frequency_hz));
            }

            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn irq_line(&self) -> bool {
        self.bus.via.irq_active()
            || self.bus.acia.irq_active()
            || self.bus.rtc.irq_active()
            || self.bus.vdp.irq_active()
    }

    /// Hand the instruction's cycles to the devices: the serial card gets
    /// every cycle, the rest run in TICK_INTERVAL batches.
    fn dispatch_device_time(&mut self, cycles: u32) {
        let frequency = self.config.cpu_frequency_hz;
        self.bus.acia.tick(cycles, frequency);

        self.tick_acc += cycles;
        while self.tick_acc >= TICK_INTERVAL {
            self.tick_acc -= TICK_INTERVAL;
            self.bus.via.tick(TICK_INTERVAL);
            self.bus.vdp.tick(TICK_INTERVAL, frequency);
            self.bus.sid.tick();
            self.bus.rtc.tick(TICK_INTERVAL, frequency);
        }
    }

    /// Forward device output to the host between CPU instructions.
    fn drain_outputs(&mut self) {
        if self.bus.vdp.take_frame_ready() {
            if let Some(render) = &mut self.render {
                render(self.bus.vdp.framebuffer());
            }
        }

        if self.bus.sid.buffered_samples() > 0 {
            let samples = self.bus.sid.take_samples();
            if let Some(audio) = &mut self.audio {
                audio(&samples);
            }
        }

        let outgoing = self.bus.acia.take_transmitted();
        if let Some(transmit) = &mut self.transmit {
            for byte in outgoing {
                transmit(byte);
            }
        }
    }
}
