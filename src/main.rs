use std::process::ExitCode;

use log::{LevelFilter, Log, Metadata, Record};
use nes6502::cpu::core::hex_bytes;
use nes6502::{Machine, MachineConfig, StopReason};

/// Minimal stderr sink for the `log` facade.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[{:<5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

fn init_logging(level: LevelFilter) {
    // Only fails if a logger is already installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    let (rom, config) = match MachineConfig::from_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    init_logging(config.log_level);

    let mut machine = match Machine::from_ines_file(&rom, config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}: {e}", rom.display());
            return ExitCode::FAILURE;
        }
    };

    let cart = machine.cartridge();
    println!(
        "{}: mapper {}, PRG {} KiB, CHR {} KiB{}, {:?} mirroring",
        rom.display(),
        cart.mapper_id(),
        cart.prg_rom_len() / 1024,
        cart.chr_len() / 1024,
        if cart.chr_is_ram() { " (RAM)" } else { "" },
        cart.mirroring()
    );

    println!("-- disassembly at {:04X}", machine.registers().pc);
    for entry in machine.lookahead(machine.config().lookahead) {
        match entry {
            Ok(op) => println!("{:04X}  {:<8}  {}", op.at, hex_bytes(&op), op),
            Err(e) => println!("      {e}"),
        }
    }

    let summary = machine.run();
    println!(
        "-- ran {} instructions, {} cycles ({} illegal bytes skipped)",
        summary.instructions, summary.cycles, summary.skipped
    );
    println!("{}", machine.registers());

    match summary.stop {
        StopReason::BudgetExhausted => ExitCode::SUCCESS,
        StopReason::Halted(e) => {
            eprintln!("halted: {e}");
            ExitCode::FAILURE
        }
    }
}
