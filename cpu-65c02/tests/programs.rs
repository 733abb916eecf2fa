//! Whole-program tests for the 65C02 core.
//!
//! Programs are poked into a flat RAM bus with the vectors set up by hand,
//! then stepped instruction by instruction.

use cpu_65c02::Cpu65c02;
use mesa_core::{Bus, Cpu, SimpleBus};

/// Build a bus with a program at $8000 and the reset vector pointing at it.
fn boot_with(program: &[u8]) -> (Cpu65c02, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x8000, program);
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    (cpu, bus)
}

#[test]
fn count_up_loop() {
    // LDA #$00; LDX #$05
    // loop: CLC; ADC #$01; DEX; BNE loop
    let (mut cpu, mut bus) = boot_with(&[
        0xA9, 0x00, // LDA #$00
        0xA2, 0x05, // LDX #$05
        0x18, // CLC
        0x69, 0x01, // ADC #$01
        0xCA, // DEX
        0xD0, 0xFA, // BNE -6
    ]);

    // Step until X reaches zero (cap the loop to catch runaways)
    for _ in 0..64 {
        cpu.step(&mut bus);
        if cpu.x() == 0 && Cpu::<SimpleBus>::pc(&cpu) == 0x800A {
            break;
        }
    }

    assert_eq!(cpu.a(), 0x05, "Loop should have added 1 five times");
    assert_eq!(cpu.x(), 0x00);
}

#[test]
fn irq_stack_frame_and_vector() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0xA0);

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0x8000);
    assert_eq!(cpu.sp(), 0xFD);

    let before = Cpu::<SimpleBus>::total_cycles(&cpu);
    let cycles = cpu.irq(&mut bus);

    assert_eq!(cycles, 7);
    assert_eq!(Cpu::<SimpleBus>::total_cycles(&cpu) - before, 7);
    assert_eq!(cpu.sp(), 0xFA, "IRQ pushes three bytes");
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0xA000);
    assert_ne!(cpu.status() & 0x04, 0, "I raised for the handler");

    // Stack frame, bottom to top: status, PCL, PCH. The stacked status
    // is the pre-interrupt one (I still clear) with B clear, so RTI
    // re-enables interrupts.
    assert_eq!(bus.read(0x01FB), 0x20, "Pushed status is pre-interrupt, B clear");
    assert_eq!(bus.read(0x01FC), 0x00);
    assert_eq!(bus.read(0x01FD), 0x80);
}

#[test]
fn interrupts_survive_an_rti() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0xA0);
    bus.load(0x8000, &[0xEA, 0xEA, 0xEA]);
    bus.load(0xA000, &[0x40]); // handler: RTI

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    cpu.step(&mut bus); // NOP

    // First interrupt: vectored, serviced, returned
    assert_eq!(cpu.irq(&mut bus), 7);
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0xA000);
    cpu.step(&mut bus); // RTI
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0x8001, "RTI returns to the interrupted spot");
    assert_eq!(cpu.status() & 0x04, 0, "RTI restores I clear");

    // A still-asserted line must be serviceable again
    assert_eq!(cpu.irq(&mut bus), 7, "Second IRQ is entered after RTI");
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0xA000);
    cpu.step(&mut bus); // RTI
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0x8001);
    assert_eq!(cpu.status() & 0x04, 0);
}

#[test]
fn irq_masked_by_interrupt_disable() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    bus.load(0x8000, &[0x78]); // SEI

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(cpu.irq(&mut bus), 0, "Masked IRQ is a no-op");
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0x8001);
    assert_eq!(cpu.sp(), 0xFD);
}

#[test]
fn nmi_ignores_interrupt_disable() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    bus.write(0xFFFA, 0x00);
    bus.write(0xFFFB, 0xC0);
    bus.load(0x8000, &[0x78]); // SEI

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(cpu.nmi(&mut bus), 7);
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0xC000);
}

#[test]
fn brk_uses_irq_vector_with_b_set() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0xA0);
    bus.load(0x8000, &[0x00, 0xEA]); // BRK + padding

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    let cycles = cpu.step(&mut bus);

    assert_eq!(cycles, 7 + 7, "Reset prologue plus BRK");
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0xA000);
    let pushed_status = bus.read(0x01FB);
    assert_ne!(pushed_status & 0x10, 0, "B flag set on BRK's pushed status");
    // Return address skips the padding byte
    assert_eq!(bus.read(0x01FC), 0x02);
    assert_eq!(bus.read(0x01FD), 0x80);
}

#[test]
fn stack_pointer_wraps_on_underflow() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    // LDX #$00; TXS; PHA
    bus.load(0x8000, &[0xA2, 0x00, 0x9A, 0x48]);

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }

    assert_eq!(cpu.sp(), 0xFF, "PHA at SP=0 wraps to $FF");
}

#[test]
fn backward_branch_arithmetic() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    // SEC at $8000; BCS -4 at $8001
    bus.load(0x8000, &[0x38, 0xB0, 0xFC]);

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    cpu.step(&mut bus); // SEC
    let branch_pc = Cpu::<SimpleBus>::pc(&cpu);
    cpu.step(&mut bus); // BCS taken

    // Offset $FC (-4) from the post-operand PC (branch_pc + 2)
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), branch_pc.wrapping_add(2).wrapping_sub(4));
}

#[test]
fn dex_from_zero_wraps_negative() {
    let (mut cpu, mut bus) = boot_with(&[0xA2, 0x00, 0xCA]); // LDX #$00; DEX
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(cpu.x(), 0xFF);
    assert_ne!(cpu.status() & 0x80, 0, "N set after DEX from 0");
}

#[test]
fn step_returns_total_cycle_delta() {
    // A spread of addressing modes and costs.
    let (mut cpu, mut bus) = boot_with(&[
        0xA9, 0x10, // LDA #     (2)
        0x85, 0x20, // STA zp    (3)
        0xA2, 0x01, // LDX #     (2)
        0xBD, 0xFF, 0x00, // LDA abs,X crossing a page (5)
        0x20, 0x10, 0x80, // JSR (6)
    ]);

    for _ in 0..5 {
        let before = Cpu::<SimpleBus>::total_cycles(&cpu);
        let returned = cpu.step(&mut bus);
        assert_eq!(
            u64::from(returned),
            Cpu::<SimpleBus>::total_cycles(&cpu) - before,
            "step() must return the total-cycle delta"
        );
    }
}

#[test]
fn rti_restores_status_and_pc() {
    let mut bus = SimpleBus::new();
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0xA0);
    bus.load(0x8000, &[0xEA, 0xEA]); // NOPs at the interrupted point
    bus.load(0xA000, &[0x40]); // RTI

    let mut cpu = Cpu65c02::new();
    cpu.reset(&mut bus);
    cpu.step(&mut bus); // NOP, PC = $8001
    cpu.irq(&mut bus);
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0xA000);

    cpu.step(&mut bus); // RTI
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0x8001, "RTI returns to the interrupted PC");
}

#[test]
fn jsr_rts_round_trip() {
    let (mut cpu, mut bus) = boot_with(&[
        0x20, 0x10, 0x80, // JSR $8010
        0xA9, 0x55, // LDA #$55 (after return)
    ]);
    bus.load(0x8010, &[0x60]); // RTS

    cpu.step(&mut bus); // JSR
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0x8010);
    cpu.step(&mut bus); // RTS
    assert_eq!(Cpu::<SimpleBus>::pc(&cpu), 0x8003);
    cpu.step(&mut bus);
    assert_eq!(cpu.a(), 0x55);
}
