//! End-to-end tests: assemble source text, load it and run it.

use indoc::indoc;
use m6809_emulator::opcodes::disassemble;
use m6809_emulator::parser::AssemblyError;
use m6809_emulator::runtime::{ConditionCodes, Computer, Memory, Trace};
use m6809_emulator::{assemble, compile};
use pretty_assertions::assert_eq;

fn run_source(source: &str) -> Computer {
    let program = assemble(source).expect("program to assemble");
    let mut computer = compile(&program);
    computer.run();
    computer
}

#[test]
fn test_add_and_store() {
    let computer = run_source("LDA #$05\nADDA #$03\nSTA $20\nEND");
    assert!(computer.is_halted());
    assert_eq!(computer.registers().a, 0x08);
    assert_eq!(computer.memory().read(0x0020), 0x08);
}

#[test]
fn test_borrow() {
    let computer = run_source("SUBA #$01\nEND");
    assert_eq!(computer.registers().a, 0xFF);
    assert!(computer.registers().cc.contains(ConditionCodes::CARRY));
    assert!(computer.registers().cc.contains(ConditionCodes::NEGATIVE));
}

#[test]
fn test_multiply_by_repeated_addition() {
    // B = 6 * 7, using A as the loop counter
    let computer = run_source(indoc! {"
        ; multiply 6 by 7
        LDA #6
        LDB #0
        ADDB #7      ; loop body at $0004
        DECA
        BNE -5
        STB $40
        END
    "});

    assert_eq!(computer.registers().b, 42);
    assert_eq!(computer.memory().read(0x0040), 42);
    assert_eq!(computer.registers().a, 0);
    assert!(computer.registers().cc.contains(ConditionCodes::ZERO));
}

#[test]
fn test_copy_word() {
    let source = indoc! {"
        LDX #$BEEF
        STX $1000
        LDX #0
        LDX $1000
        END
    "};
    let computer = run_source(source);
    assert_eq!(computer.registers().x, 0xBEEF);
    assert_eq!(computer.memory().read(0x1000), 0xBE);
    assert_eq!(computer.memory().read(0x1001), 0xEF);
}

#[test]
fn test_rom_is_never_written() {
    let computer = run_source("LDA #$42\nSTA $8000\nSTA $FFFE\nEND");
    assert_eq!(computer.memory().read(0x8000), 0xFF);
    assert_eq!(computer.memory().read_word(0xFFFE), 0x0000);
}

#[test]
fn test_failed_assembly_keeps_previous_program() {
    let program = assemble("INCA\nEND").unwrap();
    let mut computer = compile(&program);

    let result = assemble("INCA\nLDA #$05");
    assert_eq!(result, Err(AssemblyError::MissingEnd));

    computer.run();
    assert_eq!(computer.registers().a, 1);
}

#[test]
fn test_unknown_instruction_halts_at_runtime() {
    // STA has no immediate mode, so it is encoded as END
    let program = assemble("LDA #1\nSTA #2\nINCA\nEND").unwrap();
    let mut computer = compile(&program);

    computer.step();
    assert_eq!(computer.step(), Trace::End);
    assert_eq!(computer.registers().a, 1);
}

#[test]
fn test_trace_lines() {
    let program = assemble(indoc! {"
        LDA #0
        BEQ 1
        INCA
        INCA
        BNE -4
        END
    "})
    .unwrap();
    let mut computer = compile(&program);

    let mut lines = Vec::new();
    for _ in 0..6 {
        lines.push(computer.step().to_string());
    }

    assert_eq!(
        lines,
        vec![
            "LDA #$00",
            "BEQ $0005 (taken)",
            "INCA",
            "BNE $0004 (taken)",
            "INCA",
            "INCA",
        ]
    );
}

#[test]
fn test_listing_matches_memory() {
    let source = "LDA #5\nSTA $1234\nLDX #$BEEF\nDECB\nEND";
    let program = assemble(source).unwrap();
    let computer = compile(&program);

    let mut listing = Vec::new();
    let mut address = 0;
    for _ in 0..program.instructions().len() {
        let instruction = disassemble(computer.memory(), address);
        address += u16::try_from(instruction.len()).unwrap();
        listing.push(instruction.to_string());
    }

    let expected: Vec<_> = program.instructions().iter().map(ToString::to_string).collect();
    assert_eq!(listing, expected);
}

#[test]
fn test_fresh_memory() {
    let memory = Memory::default();
    assert_eq!(memory.read(0x0000), 0x00);
    assert_eq!(memory.read(0x7FFF), 0x00);
    assert_eq!(memory.read(0x8000), 0xFF);
    assert_eq!(memory.read_word(0xFFFE), 0x0000);
}
