//! Opal Compiler
//!
//! The semantic-analysis and code-generation core: validates structural and
//! referential invariants the grammar cannot enforce, then lowers the
//! instruction list into x86-64 assembly text.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ analyzer                                                   │
//! │   - catalog-driven dispatch, one validator per opcode      │
//! │     family (comparisons, single-label, functions)          │
//! │   - accumulates diagnostics in the CompileState, never     │
//! │     short-circuits                                         │
//! └────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼  (caller decides go/no-go)
//! ┌────────────────────────────────────────────────────────────┐
//! │ translator                                                 │
//! │   - single forward pass over the validated list            │
//! │   - template substitution + optimisation-level padding     │
//! │   - interleaved STABS debug records                        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both subsystems read and mutate one shared [`CompileState`]; everything
//! is single-threaded and runs to completion synchronously.
//!
//! [`CompileState`]: opal_core::CompileState

pub mod analyzer;
pub mod translator;

pub use analyzer::run as analyze;
pub use translator::emit;
