//! STABS debug-symbol records.
//!
//! The translator interleaves these records with the emitted assembly when
//! debug info is enabled: a file-origin record at the top, a line label and
//! line record per line-bearing instruction, a function-info block per
//! emitted function, and an end-of-file record at the bottom.

use std::io::{self, Write};
use std::path::Path;

/// Source file record type.
pub const N_SO: u32 = 100;
/// Source line record type.
pub const N_SLINE: u32 = 68;
/// Function record type.
pub const N_FUN: u32 = 36;
/// Function begin bracket.
pub const N_LBRAC: u32 = 0xc0;
/// Function end bracket.
pub const N_RBRAC: u32 = 0xe0;

/// Debug bookkeeping for one emission pass.
///
/// Owned solely by the translator for a single run and discarded afterwards.
pub struct TranslatorState {
    /// Name of the function currently being emitted, for the return label
    /// the function-info record points at.
    pub current_function: Option<String>,
    /// Set after a non-line-bearing instruction pre-emitted the next
    /// instruction's line label, so that instruction does not emit the label
    /// a second time. One-shot.
    pub suppress_line_label: bool,
}

impl TranslatorState {
    pub fn new() -> Self {
        Self {
            current_function: None,
            suppress_line_label: false,
        }
    }
}

impl Default for TranslatorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the file-origin record. A relative source path is resolved against
/// the current working directory.
pub fn write_file_record<W: Write>(out: &mut W, source_path: &Path) -> io::Result<()> {
    if source_path.is_absolute() {
        writeln!(out, ".stabs \"{}\", {N_SO}, 0, 0, .Ltext0", source_path.display())
    } else {
        let resolved = std::env::current_dir()?.join(source_path);
        writeln!(out, ".stabs \"{}\", {N_SO}, 0, 0, .Ltext0", resolved.display())
    }
}

/// Write the label a line record points at.
pub fn write_line_label<W: Write>(out: &mut W, line: u32) -> io::Result<()> {
    writeln!(out, "\t.Lcmd_{line}:")
}

/// Write the line record for an emitted instruction.
pub fn write_line_record<W: Write>(out: &mut W, line: u32) -> io::Result<()> {
    writeln!(out, "\t.stabn {N_SLINE}, 0, {line}, .Lcmd_{line}")
}

/// Write the label the function-info block's end bracket points at. Called
/// after the final return of a function.
pub fn write_function_end_label<W: Write>(
    out: &mut W,
    state: &TranslatorState,
) -> io::Result<()> {
    if let Some(name) = &state.current_function {
        writeln!(out, "\t.Lret_{name}:")?;
    }
    Ok(())
}

/// Write one function's info block: the function record and its brackets.
pub fn write_function_record<W: Write>(out: &mut W, name: &str) -> io::Result<()> {
    writeln!(out, ".stabs \"{name}:F1\", {N_FUN}, 0, 0, {name}")?;
    writeln!(out, ".stabn {N_LBRAC}, 0, 0, {name}")?;
    writeln!(out, ".stabn {N_RBRAC}, 0, 0, .Lret_{name}")
}

/// Write the end-of-file record.
pub fn write_eof_record<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n.LEOF:")?;
    writeln!(out, ".stabs \"\", {N_SO}, 0, 0, .LEOF")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn line_record_points_at_its_label() {
        let label = capture(|out| write_line_label(out, 12));
        let record = capture(|out| write_line_record(out, 12));
        assert_eq!(label, "\t.Lcmd_12:\n");
        assert_eq!(record, "\t.stabn 68, 0, 12, .Lcmd_12\n");
    }

    #[test]
    fn function_record_brackets_the_return_label() {
        let block = capture(|out| write_function_record(out, "main"));
        assert!(block.contains(".stabs \"main:F1\", 36, 0, 0, main"));
        assert!(block.contains(".stabn 192, 0, 0, main"));
        assert!(block.contains(".stabn 224, 0, 0, .Lret_main"));
    }

    #[test]
    fn absolute_paths_are_recorded_verbatim() {
        let text = capture(|out| write_file_record(out, Path::new("/src/prog.opal")));
        assert_eq!(text, ".stabs \"/src/prog.opal\", 100, 0, 0, .Ltext0\n");
    }

    #[test]
    fn relative_paths_are_resolved_against_cwd() {
        let text = capture(|out| write_file_record(out, Path::new("prog.opal")));
        let cwd = std::env::current_dir().unwrap();
        assert!(text.contains(&format!("{}", cwd.join("prog.opal").display())));
    }

    #[test]
    fn end_label_needs_a_current_function() {
        let idle = TranslatorState::new();
        assert_eq!(capture(|out| write_function_end_label(out, &idle)), "");

        let mut active = TranslatorState::new();
        active.current_function = Some("main".into());
        assert_eq!(
            capture(|out| write_function_end_label(out, &active)),
            "\t.Lret_main:\n"
        );
    }
}
