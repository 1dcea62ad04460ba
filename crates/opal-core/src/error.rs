//! Semantic diagnostics reported by the analyzer.
//!
//! Every diagnostic carries the primary source line and, where a conflicting
//! prior declaration exists, that line too. Diagnostics are recoverable:
//! validators report every instance and return normally; aggregation and the
//! go/no-go compilation decision belong to the caller.

use thiserror::Error;

/// Which operand of a comparison a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}

/// A semantic error found during validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    /// A comparison jump label is declared more than once.
    #[error("line {line}: comparison jump label '{label}' is already defined at line {previous_line}")]
    DuplicateLabel {
        /// The label text.
        label: String,
        /// Where the later declaration is.
        line: u32,
        /// Where the earlier declaration is.
        previous_line: u32,
    },

    /// A comparison operand names a label that is never declared.
    #[error("line {line}: no comparison jump label defined for the {side} operand '{label}'")]
    UndefinedLabelReference {
        /// The operand text that matched no label.
        label: String,
        /// Which operand.
        side: Side,
        /// Where the comparison is.
        line: u32,
    },

    /// A single-label comparison is used but its label is never declared.
    #[error("line {line}: the branch label for this comparison is not declared anywhere")]
    MissingLabelDeclaration {
        /// Where the comparison is.
        line: u32,
    },

    /// An instruction appears outside any function.
    #[error("line {line}: statement does not belong to any function")]
    OrphanStatement {
        /// Where the statement is.
        line: u32,
    },

    /// A new function is declared before the previous one returned.
    #[error("line {line}: expected a return statement, but got a new function definition")]
    MissingReturn {
        /// Where the new declaration is.
        line: u32,
    },

    /// The instruction list ends inside a function that never returned.
    #[error("line {line}: function '{name}' has no return statement")]
    MissingReturnAtEof {
        /// The unterminated function.
        name: String,
        /// Where that function is declared.
        line: u32,
    },

    /// Two functions share a name.
    #[error("line {line}: duplicate definition of function '{name}', first defined at line {previous_line}")]
    DuplicateFunction {
        /// The duplicated name.
        name: String,
        /// Where the later definition is.
        line: u32,
        /// Where the earlier definition is.
        previous_line: u32,
    },

    /// Executable mode requires an entry-point function.
    #[error("line 1: an executable cannot be created without a '{name}' function")]
    MissingEntryPoint {
        /// The platform's entry-point name.
        name: String,
    },
}

impl SemanticError {
    /// The primary line this diagnostic points at.
    pub fn line(&self) -> u32 {
        match self {
            SemanticError::DuplicateLabel { line, .. } => *line,
            SemanticError::UndefinedLabelReference { line, .. } => *line,
            SemanticError::MissingLabelDeclaration { line } => *line,
            SemanticError::OrphanStatement { line } => *line,
            SemanticError::MissingReturn { line } => *line,
            SemanticError::MissingReturnAtEof { line, .. } => *line,
            SemanticError::DuplicateFunction { line, .. } => *line,
            SemanticError::MissingEntryPoint { .. } => 1,
        }
    }

    /// The conflicting prior declaration's line, if this diagnostic has one.
    pub fn related_line(&self) -> Option<u32> {
        match self {
            SemanticError::DuplicateLabel { previous_line, .. } => Some(*previous_line),
            SemanticError::DuplicateFunction { previous_line, .. } => Some(*previous_line),
            _ => None,
        }
    }
}
