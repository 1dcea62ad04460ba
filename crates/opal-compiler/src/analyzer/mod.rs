//! Semantic analyzer: catalog-driven validation of the instruction list.
//!
//! The catalog tags at most one opcode per family with the analysis that
//! family requires; [`run`] walks the catalog once and dispatches each tag at
//! this single site. Validators read disjoint derived views of the
//! instruction list, so their relative order does not matter, and none of
//! them short-circuits: every instance of every error is reported into the
//! shared [`CompileState`] sink.

pub mod comparisons;
pub mod functions;

use opal_core::CompileState;
use opal_core::catalog::{self, Analysis};

/// Run every registered validator over the instruction list.
pub fn run(state: &mut CompileState) {
    for (opcode, entry) in catalog::catalog().iter().enumerate() {
        let opcode = opcode as u8;
        match entry.analysis {
            Analysis::None => {}
            Analysis::Functions => functions::validate_functions(state, opcode),
            Analysis::ComparisonPairs => comparisons::validate_comparison_pairs(state, opcode),
            Analysis::LabelExistence => comparisons::validate_label_existence(state, opcode),
        }
    }
}
