//! Per-compilation state and configuration.
//!
//! One [`CompileState`] value exists per compilation. It is created by the
//! driver, passed as `&mut` to every validator and to the translator, and
//! discarded afterwards; no state survives across compilations. Semantic
//! diagnostics accumulate inside it and are drained by the caller, which
//! owns the go/no-go decision.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SemanticError;
use crate::instruction::InstructionList;

/// What kind of artifact the compilation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// A standalone executable; requires an entry-point function.
    Executable,
    /// A library; no entry point required.
    Library,
}

/// The fixed, language-defined emission strategies.
///
/// Ordered from no padding up to whole-body elision. These are not
/// optimisations in the usual sense: `O1`–`O3` insert filler, `Os` appends an
/// oversized alignment directive, and `Omax` deletes function bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptimisationLevel {
    /// No padding.
    None,
    /// One `nop` after every emitted instruction.
    O1,
    /// A `push`/`pop` of a scratch register after every emitted instruction.
    O2,
    /// A save/restore of a wide register to the stack after every emitted
    /// instruction.
    O3,
    /// No padding, but one oversized alignment directive at end of output.
    /// Deliberately inflates the final binary.
    Os,
    /// Emit only function declarations, each followed by a two-instruction
    /// stub that zeroes the return value and returns.
    Omax,
}

/// Driver-facing logging verbosity.
///
/// The driver that owns CLI handling initializes the global `log` filter
/// from this; core code logs through the `log` facade unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Normal,
    Info,
    Debug,
}

/// Target platform, selected at compile configuration time.
///
/// Only chooses among fixed string templates: the entry-point symbol name,
/// section directives, external symbol declarations, and the runtime support
/// routine variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The entry-point function name an executable must define.
    pub fn entry_point(&self) -> &'static str {
        match self {
            Platform::MacOs => "_main",
            _ => "main",
        }
    }
}

/// State threaded through one compilation.
#[derive(Debug)]
pub struct CompileState {
    /// The parsed, source-ordered instruction list.
    pub instructions: InstructionList,
    /// Executable or library.
    pub mode: CompileMode,
    /// Selected emission strategy.
    pub optimisation: OptimisationLevel,
    /// Whether debug-symbol records are interleaved into the output.
    pub debug_info: bool,
    /// Driver-facing verbosity.
    pub log_level: LogLevel,
    /// Target platform.
    pub platform: Platform,
    /// Origin source file, recorded in the debug preamble record.
    pub source_path: PathBuf,
    /// Epoch seconds captured at state creation, printed in the header
    /// banner. Captured once so repeated emission from the same state is
    /// byte-identical.
    timestamp: u64,
    /// Accumulated semantic diagnostics.
    errors: Vec<SemanticError>,
}

impl CompileState {
    /// Create a state with default configuration: executable, no padding,
    /// no debug info, Linux.
    pub fn new(instructions: InstructionList, source_path: impl Into<PathBuf>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            instructions,
            mode: CompileMode::Executable,
            optimisation: OptimisationLevel::None,
            debug_info: false,
            log_level: LogLevel::Normal,
            platform: Platform::Linux,
            source_path: source_path.into(),
            timestamp,
            errors: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_optimisation(mut self, level: OptimisationLevel) -> Self {
        self.optimisation = level;
        self
    }

    pub fn with_debug_info(mut self) -> Self {
        self.debug_info = true;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// The banner timestamp (epoch seconds).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Append a diagnostic to the shared sink.
    pub fn report(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    /// Diagnostics reported so far, in discovery order.
    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drain the accumulated diagnostics, leaving the sink empty.
    pub fn take_errors(&mut self) -> Vec<SemanticError> {
        std::mem::take(&mut self.errors)
    }
}
