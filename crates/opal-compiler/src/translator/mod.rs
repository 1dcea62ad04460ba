//! Instruction translator: lowers the validated instruction list into
//! x86-64 assembly text (Intel syntax, GAS directives).
//!
//! One forward pass, no backtracking, one emission per `translate == true`
//! instruction. The translator assumes the list has already been validated
//! and never raises semantic errors; its only lookaheads use checked access
//! and fall back to omitting a debug label at the end of the list.
//!
//! Besides the per-instruction loop, whole-file emission writes the header
//! banner, global symbol declarations, the fixed data-section scratch
//! symbols, platform-specific external symbols, the two runtime support
//! routines, and — when enabled — the interleaved STABS records.

pub mod stabs;

use std::io::{self, Write};

use log::debug;

use opal_core::catalog::{self, CatalogEntry};
use opal_core::{CompileState, OptimisationLevel, ParsedInstruction, Platform};

use stabs::TranslatorState;

/// Emit the whole assembly file for `state` into `out`.
///
/// Precondition: the analyzer ran and the caller decided the diagnostics are
/// acceptable. Validators report but do not delete offending instructions,
/// so emission over an invalid list produces assembly that reflects the
/// invalid structure rather than failing.
pub fn emit<W: Write>(state: &CompileState, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "#\n# Generated by the Opal compiler {} at {}\n#",
        env!("CARGO_PKG_VERSION"),
        state.timestamp()
    )?;
    writeln!(out, ".intel_syntax noprefix")?;

    // Every surviving function becomes a global symbol.
    for inst in state.instructions.iter() {
        if inst.opcode == catalog::FUNC_DECL && inst.translate {
            writeln!(out, ".global {}", inst.parameters[0])?;
        }
    }

    if state.platform == Platform::Windows {
        writeln!(out, "\n.extern GetStdHandle\n.extern WriteFile\n.extern ReadFile")?;
    }

    match state.platform {
        Platform::MacOs => write!(out, "\n.data\n\t")?,
        _ => write!(out, "\n.section .data\n\t")?,
    }
    writeln!(
        out,
        ".LCharacter: .ascii \"a\"\n\t.Ltmp64: .byte 0, 0, 0, 0, 0, 0, 0, 0"
    )?;

    if state.debug_info {
        stabs::write_file_record(out, &state.source_path)?;
    }

    match state.platform {
        Platform::MacOs => write!(out, "\n\n.text\n\t")?,
        _ => writeln!(out, "\n\n.section .text")?,
    }
    writeln!(out, "\n\n.Ltext0:")?;

    let mut translator_state = TranslatorState::new();
    for (index, inst) in state.instructions.iter().enumerate() {
        // The runtime-random jump target exists at this textual position no
        // matter what occupies the slot or whether it survived pruning.
        if index == state.instructions.random_slot {
            write!(out, "\t.LRandomJump: ")?;
        }
        if inst.translate {
            debug!("translating index {index} (line {})", inst.line);
            translate_instruction(state, &mut translator_state, index, out)?;
        }
    }

    // With every body stubbed out nothing can call the support routines.
    if state.optimisation != OptimisationLevel::Omax {
        write_support_routines(state.platform, out)?;
    }

    if state.debug_info {
        for inst in state.instructions.iter() {
            if inst.opcode == catalog::FUNC_DECL && inst.translate {
                stabs::write_function_record(out, &inst.parameters[0])?;
            }
        }
        stabs::write_eof_record(out)?;
    }

    // Deliberate quirk of the size-minimized level: one oversized alignment
    // directive that inflates the final binary.
    if state.optimisation == OptimisationLevel::Os {
        writeln!(out, ".align 536870912")?;
    }

    Ok(())
}

/// Translate one instruction: debug labels, template substitution,
/// optimisation padding, and the function-end record bookkeeping.
fn translate_instruction<W: Write>(
    state: &CompileState,
    translator_state: &mut TranslatorState,
    index: usize,
    out: &mut W,
) -> io::Result<()> {
    let inst = &state.instructions.as_slice()[index];
    let is_declaration = inst.opcode == catalog::FUNC_DECL;

    // At the maximum level whole function bodies are elided; only
    // declarations survive, each followed by the stub below.
    if !is_declaration && state.optimisation == OptimisationLevel::Omax {
        debug!("\tnot a declaration, elided at maximum level");
        return Ok(());
    }

    let entry = catalog::entry(inst.opcode);

    if state.debug_info {
        if is_declaration {
            translator_state.current_function = Some(inst.parameters[0].clone());
        } else if !entry.line_bearing {
            // Pre-emit the next instruction's line label so the debugger
            // does not stop at the breakpoint address twice, and suppress
            // that instruction's own label.
            if let Some(next) = state.instructions.get(index + 1) {
                stabs::write_line_label(out, next.line)?;
                translator_state.suppress_line_label = true;
            }
        } else if !translator_state.suppress_line_label {
            stabs::write_line_label(out, inst.line)?;
        } else {
            translator_state.suppress_line_label = false;
        }
    }

    let text = substitute(entry, inst);
    debug!("\temitting: {text}");
    if !is_declaration {
        write!(out, "\t")?;
    }
    writeln!(out, "{text}")?;

    match state.optimisation {
        OptimisationLevel::O1 => writeln!(out, "\tnop")?,
        OptimisationLevel::O2 => writeln!(out, "\tpush rax\n\tpop rax")?,
        OptimisationLevel::O3 => {
            writeln!(out, "\tmovups [rsp + 8], xmm0\n\tmovups xmm0, [rsp + 8]")?
        }
        // Only reached for a declaration: the body stub.
        OptimisationLevel::Omax => writeln!(out, "\txor rax, rax\n\tret")?,
        OptimisationLevel::None | OptimisationLevel::Os => {}
    }

    if state.debug_info && !is_declaration {
        // A return that ends the file or runs into the next declaration
        // closes the current function; its end label must precede the line
        // record.
        let next = state.instructions.get(index + 1);
        let closes_function = catalog::is_return(inst.opcode)
            && next.is_none_or(|n| n.opcode == catalog::FUNC_DECL);
        if closes_function {
            stabs::write_function_end_label(out, translator_state)?;
        }
        if entry.line_bearing {
            stabs::write_line_record(out, inst.line)?;
        }
    }

    Ok(())
}

/// Substitute an instruction's parameters into its catalog template.
///
/// Placeholder digits below the entry's arity select a parameter; the
/// pointer parameter is wrapped in memory-operand brackets. The buffer is
/// pre-sized for the worst case of every parameter plus bracket overhead.
fn substitute(entry: &CatalogEntry, inst: &ParsedInstruction) -> String {
    let template = entry.translation;

    let mut capacity = template.len();
    for byte in template.bytes() {
        if let Some(d) = placeholder(byte, entry.arity) {
            capacity += inst.parameters[d].len() + 2;
        }
    }

    let mut text = String::with_capacity(capacity);
    for byte in template.bytes() {
        if let Some(d) = placeholder(byte, entry.arity) {
            let parameter = &inst.parameters[d];
            if inst.pointer_param == d as u8 + 1 {
                text.push('[');
                text.push_str(parameter);
                text.push(']');
            } else {
                text.push_str(parameter);
            }
        } else {
            text.push(byte as char);
        }
    }
    text
}

/// Which parameter a template byte selects, if it is a live placeholder.
fn placeholder(byte: u8, arity: u8) -> Option<usize> {
    if byte >= b'0' && byte < b'0' + arity {
        Some((byte - b'0') as usize)
    } else {
        None
    }
}

/// Append the two fixed runtime support routines for one-character console
/// I/O. Linux and macOS differ only in syscall numbers; Windows goes through
/// its API and needs the external symbols declared at the top of the file.
fn write_support_routines<W: Write>(platform: Platform, out: &mut W) -> io::Result<()> {
    match platform {
        Platform::Windows => {
            write!(
                out,
                "\n\nwritechar:\n\
                 \tpush rcx\n\tpush rax\n\tpush rdx\n\tpush r8\n\tpush r9\n\
                 \tsub rsp, 32\n\
                 \tmov rcx, -11\n\
                 \tcall GetStdHandle\n\
                 \tmov rcx, rax\n\
                 \tlea rdx, [rip + .LCharacter]\n\
                 \tmov r8, 1\n\
                 \tlea r9, [rip + .Ltmp64]\n\
                 \tmov QWORD PTR [rsp + 32], 0\n\
                 \tcall WriteFile\n\
                 \tadd rsp, 32\n\
                 \tpop r9\n\tpop r8\n\tpop rdx\n\tpop rax\n\tpop rcx\n\
                 \tret\n"
            )?;
            write!(
                out,
                "\n\nreadchar:\n\
                 \tpush rcx\n\tpush rax\n\tpush rdx\n\tpush r8\n\tpush r9\n\
                 \tsub rsp, 32\n\
                 \tmov rcx, -10\n\
                 \tcall GetStdHandle\n\
                 \tmov rcx, rax\n\
                 \tlea rdx, [rip + .LCharacter]\n\
                 \tmov r8, 1\n\
                 \tlea r9, [rip + .Ltmp64]\n\
                 \tmov QWORD PTR [rsp + 32], 0\n\
                 \tcall ReadFile\n\
                 \tadd rsp, 32\n\
                 \tpop r9\n\tpop r8\n\tpop rdx\n\tpop rax\n\tpop rcx\n\
                 \tret\n"
            )
        }
        Platform::Linux | Platform::MacOs => {
            let (write_nr, read_nr) = match platform {
                Platform::Linux => ("1", "0"),
                _ => ("0x2000004", "0x2000003"),
            };
            write!(
                out,
                "\n\nwritechar:\n\
                 \tpush rcx\n\tpush r11\n\tpush rax\n\tpush rdi\n\tpush rsi\n\tpush rdx\n\
                 \tmov rdx, 1\n\
                 \tlea rsi, [rip + .LCharacter]\n\
                 \tmov rdi, 1\n\
                 \tmov rax, {write_nr}\n\
                 \tsyscall\n\
                 \tpop rdx\n\tpop rsi\n\tpop rdi\n\tpop rax\n\tpop r11\n\tpop rcx\n\
                 \tret\n"
            )?;
            write!(
                out,
                "\n\nreadchar:\n\
                 \tpush rcx\n\tpush r11\n\tpush rax\n\tpush rdi\n\tpush rsi\n\tpush rdx\n\
                 \tmov rdx, 1\n\
                 \tlea rsi, [rip + .LCharacter]\n\
                 \tmov rdi, 0\n\
                 \tmov rax, {read_nr}\n\
                 \tsyscall\n\
                 \tpop rdx\n\tpop rsi\n\tpop rdi\n\tpop rax\n\tpop r11\n\tpop rcx\n\
                 \tret\n"
            )
        }
    }
}
