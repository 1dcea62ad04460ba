//! Opal Core
//!
//! Shared data model for the Opal compiler: the compile state threaded
//! through every pass, the decoded instruction list produced by the parser,
//! the static opcode catalog, and the structured semantic diagnostics.
//!
//! ## Modules
//!
//! - [`catalog`]: Static opcode catalog (templates, arities, parameter kinds)
//! - [`error`]: Semantic diagnostics reported by the analyzer
//! - [`instruction`]: Decoded instructions and the ordered instruction list
//! - [`state`]: Per-compilation state and configuration

pub mod catalog;
pub mod error;
pub mod instruction;
pub mod state;

pub use catalog::{Analysis, CatalogEntry, ParamKind};
pub use error::{SemanticError, Side};
pub use instruction::{InstructionList, ParsedInstruction};
pub use state::{CompileMode, CompileState, LogLevel, OptimisationLevel, Platform};
