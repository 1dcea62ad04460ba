//! Function structure validator.
//!
//! Segments the instruction list into functions delimited by the declaration
//! opcode and its three consecutive return-variant opcodes, then runs
//! cross-function checks over the resulting set. The function set is
//! transient; it lives only long enough for the duplicate-name and
//! entry-point checks.

use log::debug;

use opal_core::{CompileMode, CompileState, ParsedInstruction, SemanticError};

/// A segmented function.
struct Function {
    name: String,
    line: u32,
    /// Offset of the last return variant from the declaration. Functions may
    /// contain several returns; only the final one bounds the body.
    body_len: usize,
}

/// Validate function segmentation, duplicate names, and entry-point presence.
///
/// `declaration_opcode + 1 ..= declaration_opcode + 3` are the return
/// variants (catalog contract). Tolerates zero functions: everything becomes
/// an orphan statement, followed by a missing-entry-point error in
/// executable mode.
pub fn validate_functions(state: &mut CompileState, declaration_opcode: u8) {
    let (functions, errors) = segment(state.instructions.as_slice(), declaration_opcode);
    for function in &functions {
        debug!(
            "segmented function '{}' (line {}, {} body instructions)",
            function.name, function.line, function.body_len
        );
    }
    for error in errors {
        state.report(error);
    }

    let entry_point = state.platform.entry_point();
    let mut entry_point_found = false;
    for (i, function) in functions.iter().enumerate() {
        if function.name == entry_point {
            entry_point_found = true;
        }
        for other in &functions[i + 1..] {
            if function.name == other.name {
                state.report(SemanticError::DuplicateFunction {
                    name: other.name.clone(),
                    line: other.line,
                    previous_line: function.line,
                });
            }
        }
    }

    if state.mode == CompileMode::Executable && !entry_point_found {
        state.report(SemanticError::MissingEntryPoint {
            name: entry_point.to_string(),
        });
    }
}

/// One linear pass splitting the list into functions.
///
/// Two states: between functions, where every non-declaration instruction is
/// an orphan, and inside a function, where return variants update the
/// candidate end but only a new declaration (or list exhaustion) closes the
/// function. The cursor then resumes right after the last return, so the
/// trailing instructions of a return-less function are scanned again as
/// orphans.
fn segment(
    instructions: &[ParsedInstruction],
    declaration_opcode: u8,
) -> (Vec<Function>, Vec<SemanticError>) {
    let mut functions = Vec::new();
    let mut errors = Vec::new();

    let mut cursor = 0;
    while cursor < instructions.len() {
        // Between functions: skip to the next declaration, flagging orphans.
        while let Some(inst) = instructions.get(cursor) {
            if inst.opcode == declaration_opcode {
                break;
            }
            errors.push(SemanticError::OrphanStatement { line: inst.line });
            cursor += 1;
        }
        let Some(head) = instructions.get(cursor) else {
            break;
        };
        debug!("parsing function '{}' at line {}", head.parameters[0], head.line);

        // Inside a function: find the last return before the next declaration.
        let mut last_return = None;
        let mut offset = 1;
        while let Some(inst) = instructions.get(cursor + offset) {
            if inst.opcode == declaration_opcode {
                if last_return.is_none() {
                    errors.push(SemanticError::MissingReturn { line: inst.line });
                }
                break;
            }
            if inst.opcode > declaration_opcode && inst.opcode <= declaration_opcode + 3 {
                last_return = Some(offset);
            }
            offset += 1;
        }
        if cursor + offset >= instructions.len() && last_return.is_none() {
            errors.push(SemanticError::MissingReturnAtEof {
                name: head.parameters[0].clone(),
                line: head.line,
            });
        }

        let body_len = last_return.unwrap_or(0);
        functions.push(Function {
            name: head.parameters[0].clone(),
            line: head.line,
            body_len,
        });
        cursor += body_len + 1;
    }

    (functions, errors)
}
