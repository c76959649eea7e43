#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

use m6809_emulator::constants as C;
use m6809_emulator::parser::AssemblyError;
use m6809_emulator::runtime::Computer;
use serde::Serialize;
use tracing::{info, warn};
use tsify::Tsify;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Error returned to JavaScript when a program does not assemble
#[derive(Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct AssemblyReport {
    message: String,
    line: Option<usize>,
}

impl From<AssemblyError> for AssemblyReport {
    fn from(error: AssemblyError) -> Self {
        Self {
            message: error.to_string(),
            line: error.line(),
        }
    }
}

#[derive(Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ListingLine {
    address: u16,
    bytes: Vec<u8>,
    text: String,
}

#[derive(Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Listing {
    lines: Vec<ListingLine>,
    size: usize,
}

#[derive(Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct StepResult {
    trace: String,
    halted: bool,
}

#[derive(Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct RunResult {
    traces: Vec<String>,
    halted: bool,
}

#[derive(Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Registers {
    a: u8,
    b: u8,
    d: u16,
    dp: u8,
    cc: u8,
    /// Condition codes as `EFHINZVC`, with dashes for cleared flags
    flags: String,
    x: u16,
    y: u16,
    s: u16,
    u: u16,
    pc: u16,
}

#[derive(Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct MemoryView {
    start: u32,
    end: u32,
    bytes: Vec<u8>,
}

/// A processor with its memory, driven from JavaScript
#[wasm_bindgen]
#[derive(Default)]
pub struct Simulator {
    computer: Computer,
}

#[wasm_bindgen]
impl Simulator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a program, load it and reset the processor
    ///
    /// On error, the previously loaded program is kept.
    pub fn assemble(&mut self, source: &str) -> Result<Listing, JsValue> {
        let program = m6809_emulator::assemble(source).map_err(|e| {
            warn!(error = %e, "Assembly failed");
            serde_wasm_bindgen::to_value(&AssemblyReport::from(e)).unwrap_or_else(Into::into)
        })?;

        self.computer = m6809_emulator::compile(&program);
        info!(bytes = program.len(), "Program loaded");

        let lines = program
            .layout()
            .map(|(address, instruction)| ListingLine {
                address,
                bytes: instruction.bytes(),
                text: instruction.to_string(),
            })
            .collect();

        Ok(Listing {
            lines,
            size: program.len(),
        })
    }

    pub fn step(&mut self) -> StepResult {
        let trace = self.computer.step();
        StepResult {
            trace: trace.to_string(),
            halted: self.computer.is_halted(),
        }
    }

    /// Step until the processor halts, at most `max_steps` times
    pub fn run(&mut self, max_steps: u32) -> RunResult {
        let mut traces = Vec::new();
        for _ in 0..max_steps {
            if self.computer.is_halted() {
                break;
            }
            traces.push(self.computer.step().to_string());
        }

        RunResult {
            traces,
            halted: self.computer.is_halted(),
        }
    }

    pub fn reset(&mut self) {
        self.computer.reset();
    }

    #[wasm_bindgen(getter)]
    pub fn halted(&self) -> bool {
        self.computer.is_halted()
    }

    #[wasm_bindgen(getter)]
    pub fn registers(&self) -> Registers {
        let registers = self.computer.registers();
        Registers {
            a: registers.a,
            b: registers.b,
            d: registers.d(),
            dp: registers.dp,
            cc: registers.cc.bits(),
            flags: registers.cc.to_string(),
            x: registers.x,
            y: registers.y,
            s: registers.s,
            u: registers.u,
            pc: registers.pc,
        }
    }

    /// Read the bytes in `start..end`
    pub fn memory_view(&self, start: u32, end: u32) -> Result<MemoryView, JsValue> {
        let address_space = C::RAM_SIZE + C::ROM_SIZE;
        let (Ok(first), Ok(len)) = (
            C::Address::try_from(start),
            usize::try_from(end.saturating_sub(start)),
        ) else {
            return Err(format!("invalid memory range {start}..{end}").into());
        };

        if start > end || usize::from(first) + len > address_space {
            return Err(format!("invalid memory range {start}..{end}").into());
        }

        Ok(MemoryView {
            start,
            end,
            bytes: self.computer.memory().dump(first, len),
        })
    }
}
