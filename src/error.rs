/*!
Error taxonomy for the emulator core.

Three layers, each with its own enum:
- `MemoryError`    : a bounds-checked memory block was addressed outside `[0, len)`.
- `CartridgeError` : an iNES image could not be turned into a `Cartridge`.
- `CpuError`       : a single decode/execute step failed.

`Error` is the crate-level union used by `Machine`, so driving code can use `?`
across load time and run time alike. Load-time errors are fatal for that image;
per-step errors are recoverable and the caller decides whether to halt or skip.
*/

use std::{fmt, io};

/// Failure of a bounds-checked memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    AddressOutOfRange { addr: usize, len: usize },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressOutOfRange { addr, len } => {
                write!(f, "address {addr:#06X} out of range for {len}-byte block")
            }
        }
    }
}

impl std::error::Error for MemoryError {}

/// Failure while parsing an iNES image.
#[derive(Debug)]
pub enum CartridgeError {
    MalformedHeader(&'static str),
    TruncatedImage { expected: usize, actual: usize },
    UnsupportedMapper(u16),
    Io(io::Error),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader(why) => write!(f, "malformed iNES header: {why}"),
            Self::TruncatedImage { expected, actual } => write!(
                f,
                "truncated iNES image: header declares {expected} bytes, file has {actual}"
            ),
            Self::UnsupportedMapper(id) => write!(
                f,
                "unsupported mapper id {id} (only NROM / mapper 0 is supported)"
            ),
            Self::Io(e) => write!(f, "failed to read ROM file: {e}"),
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CartridgeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failure of one CPU step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    IllegalOpcode { opcode: u8, addr: u16 },
    Memory(MemoryError),
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalOpcode { opcode, addr } => {
                write!(f, "illegal opcode {opcode:#04X} at {addr:#06X}")
            }
            Self::Memory(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CpuError {}

impl From<MemoryError> for CpuError {
    fn from(e: MemoryError) -> Self {
        Self::Memory(e)
    }
}

/// Crate-level error. Displays as the wrapped error.
#[derive(Debug)]
pub enum Error {
    Cartridge(CartridgeError),
    Cpu(CpuError),
    Memory(MemoryError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cartridge(e) => e.fmt(f),
            Self::Cpu(e) => e.fmt(f),
            Self::Memory(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cartridge(e) => e.source(),
            Self::Cpu(_) | Self::Memory(_) => None,
        }
    }
}

impl From<CartridgeError> for Error {
    fn from(e: CartridgeError) -> Self {
        Self::Cartridge(e)
    }
}

impl From<CpuError> for Error {
    fn from(e: CpuError) -> Self {
        Self::Cpu(e)
    }
}

impl From<MemoryError> for Error {
    fn from(e: MemoryError) -> Self {
        Self::Memory(e)
    }
}
