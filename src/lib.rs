//! Opal
//!
//! Facade over the Opal compiler core: semantic analysis and x86-64 code
//! generation for the Opal opcode language. The heavy lifting lives in the
//! member crates:
//!
//! - [`opal_core`]: compile state, instruction list, opcode catalog,
//!   structured diagnostics
//! - [`opal_compiler`]: the analyzer (validators) and the translator
//!   (assembly emitter)
//!
//! Lexing/parsing, CLI handling, logger initialization, and the dead-code
//! pass are upstream collaborators; this crate consumes a fully decoded
//! instruction list and produces assembly text plus diagnostics.

use std::io::{self, Write};

use log::debug;

pub use opal_compiler::{analyzer, translator};
pub use opal_core::{
    CompileMode, CompileState, InstructionList, LogLevel, OptimisationLevel, ParsedInstruction,
    Platform, SemanticError, Side, catalog,
};

/// What one compilation produced.
#[derive(Debug)]
pub struct CompileOutcome {
    /// Diagnostics reported by the analyzer, in discovery order.
    pub diagnostics: Vec<SemanticError>,
    /// Whether assembly was emitted (only when no diagnostics were found).
    pub emitted: bool,
}

/// Run the analyzer and, if the program is clean, emit its assembly.
///
/// The exit-code decision stays with the caller: diagnostics are returned
/// either way, and a driver that wants to emit despite errors can call
/// [`translator::emit`] directly.
pub fn compile_to_assembly<W: Write>(
    state: &mut CompileState,
    out: &mut W,
) -> io::Result<CompileOutcome> {
    analyzer::run(state);
    let diagnostics = state.take_errors();
    debug!("analysis finished with {} diagnostics", diagnostics.len());

    let emitted = diagnostics.is_empty();
    if emitted {
        translator::emit(state, out)?;
    }
    Ok(CompileOutcome {
        diagnostics,
        emitted,
    })
}
