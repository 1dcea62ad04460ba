//! Paired-construct validators for the two comparison families.
//!
//! Both validators rely on the catalog's adjacency contract: the jump-label
//! opcode of a comparison family is exactly `comparison_opcode + 1`. Each
//! builds its own transient projection of the instruction list and discards
//! it before returning; nothing is shared across validators.

use log::debug;

use opal_core::{CompileState, SemanticError, Side};

/// A two-operand comparison occurrence.
struct Comparison {
    a: String,
    b: String,
    line: u32,
}

/// A comparison jump-label declaration.
struct ComparisonLabel {
    param: String,
    line: u32,
}

/// Validate the two-label comparison family.
///
/// Checks that no jump label is declared twice and that both operands of
/// every comparison name a declared label. Every instance is reported, in
/// discovery order; the scan is quadratic on purpose, the label set is
/// expected to be small.
pub fn validate_comparison_pairs(state: &mut CompileState, comparison_opcode: u8) {
    debug!("comparison pair check for opcode {comparison_opcode}");
    let label_opcode = comparison_opcode + 1;

    let mut comparisons = Vec::new();
    let mut labels = Vec::new();
    for inst in state.instructions.iter() {
        if inst.opcode == comparison_opcode {
            comparisons.push(Comparison {
                a: inst.parameters[0].clone(),
                b: inst.parameters[1].clone(),
                line: inst.line,
            });
        } else if inst.opcode == label_opcode {
            labels.push(ComparisonLabel {
                param: inst.parameters[0].clone(),
                line: inst.line,
            });
        }
    }
    debug!(
        "found {} comparisons and {} jump labels",
        comparisons.len(),
        labels.len()
    );

    // One report per unordered pair of equal labels.
    for i in 0..labels.len() {
        for j in (i + 1)..labels.len() {
            if labels[i].param == labels[j].param {
                state.report(SemanticError::DuplicateLabel {
                    label: labels[j].param.clone(),
                    line: labels[j].line,
                    previous_line: labels[i].line,
                });
            }
        }
    }

    // Each operand must match some label, case-sensitively. A comparison can
    // produce zero, one, or two reports.
    for cmp in &comparisons {
        let mut a_defined = false;
        let mut b_defined = false;
        for label in &labels {
            if cmp.a == label.param {
                a_defined = true;
            }
            if cmp.b == label.param {
                b_defined = true;
            }
        }
        if !a_defined {
            state.report(SemanticError::UndefinedLabelReference {
                label: cmp.a.clone(),
                side: Side::First,
                line: cmp.line,
            });
        }
        if !b_defined {
            state.report(SemanticError::UndefinedLabelReference {
                label: cmp.b.clone(),
                side: Side::Second,
                line: cmp.line,
            });
        }
    }
}

/// Validate the single-label comparison family.
///
/// The shared label only has to exist somewhere if the comparison opcode is
/// used at all; labels are not paired per comparison and duplicates are not
/// restricted. With no label declared, every comparison occurrence gets its
/// own report.
pub fn validate_label_existence(state: &mut CompileState, comparison_opcode: u8) {
    debug!("label existence check for opcode {comparison_opcode}");
    let label_opcode = comparison_opcode + 1;

    let mut label_line = None;
    for inst in state.instructions.iter() {
        if inst.opcode == label_opcode {
            label_line = Some(inst.line);
        }
    }
    if let Some(line) = label_line {
        debug!("label declared at line {line}, nothing to check");
        return;
    }

    let missing: Vec<u32> = state
        .instructions
        .iter()
        .filter(|inst| inst.opcode == comparison_opcode)
        .map(|inst| inst.line)
        .collect();
    for line in missing {
        state.report(SemanticError::MissingLabelDeclaration { line });
    }
}
