//! Whole-file emission: layout, platform templates, optimisation levels,
//! debug records, and determinism.

use opal::catalog::{BREAKPOINT, CMP_WINS, FUNC_DECL, MOV, PUTC, RET_PLAIN, RET_ZERO};
use opal::{
    CompileState, InstructionList, OptimisationLevel, ParsedInstruction, Platform, translator,
};

fn inst(opcode: u8, parameters: &[&str], line: u32) -> ParsedInstruction {
    ParsedInstruction::new(opcode, parameters, line)
}

fn state_of(instructions: Vec<ParsedInstruction>) -> CompileState {
    CompileState::new(InstructionList::new(instructions), "prog.opal")
}

fn emit(state: &CompileState) -> String {
    let mut out = Vec::new();
    translator::emit(state, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn two_function_program() -> Vec<ParsedInstruction> {
    vec![
        inst(FUNC_DECL, &["main"], 1),
        inst(MOV, &["rax", "7"], 2),
        inst(RET_ZERO, &[], 3),
        inst(FUNC_DECL, &["helper"], 4),
        inst(PUTC, &["al"], 5),
        inst(RET_PLAIN, &[], 6),
    ]
}

#[test]
fn emission_is_deterministic() {
    let state = state_of(two_function_program()).with_debug_info();
    assert_eq!(emit(&state), emit(&state));
}

#[test]
fn file_layout_is_ordered() {
    let state = state_of(two_function_program());
    let asm = emit(&state);

    let banner = asm.find("# Generated by the Opal compiler").unwrap();
    let syntax = asm.find(".intel_syntax noprefix").unwrap();
    let globals = asm.find(".global main").unwrap();
    let data = asm.find(".section .data").unwrap();
    let scratch = asm.find(".LCharacter: .ascii \"a\"").unwrap();
    let tmp = asm.find(".Ltmp64: .byte 0, 0, 0, 0, 0, 0, 0, 0").unwrap();
    let text = asm.find(".section .text").unwrap();
    let anchor = asm.find(".Ltext0:").unwrap();
    let writechar = asm.find("\nwritechar:").unwrap();
    let readchar = asm.find("\nreadchar:").unwrap();

    assert!(banner < syntax);
    assert!(syntax < globals);
    assert!(globals < data);
    assert!(data < scratch);
    assert!(scratch < tmp);
    assert!(tmp < text);
    assert!(text < anchor);
    assert!(anchor < writechar);
    assert!(writechar < readchar);

    // One global per function, and the translated body in between.
    assert!(asm.contains(".global helper"));
    assert!(asm.contains("main:\n"));
    assert!(asm.contains("\tmov rax, 7\n"));
    assert!(asm.contains("\tcall writechar"));
}

#[test]
fn pruned_function_loses_its_global() {
    let mut instructions = two_function_program();
    instructions[3].translate = false;
    let asm = emit(&state_of(instructions));
    assert!(asm.contains(".global main"));
    assert!(!asm.contains(".global helper"));
}

#[test]
fn windows_declares_api_externs() {
    let state = state_of(two_function_program()).with_platform(Platform::Windows);
    let asm = emit(&state);
    assert!(asm.contains(".extern GetStdHandle"));
    assert!(asm.contains(".extern WriteFile"));
    assert!(asm.contains(".extern ReadFile"));
    assert!(asm.contains("call WriteFile"));
    assert!(!asm.contains("syscall"));
}

#[test]
fn macos_uses_short_section_directives() {
    let state = state_of(two_function_program()).with_platform(Platform::MacOs);
    let asm = emit(&state);
    assert!(asm.contains("\n.data\n"));
    assert!(asm.contains("\n.text\n"));
    assert!(!asm.contains(".section .data"));
    assert!(asm.contains("mov rax, 0x2000004"));
}

#[test]
fn linux_uses_syscalls() {
    let asm = emit(&state_of(two_function_program()));
    assert!(asm.contains("syscall"));
    assert!(!asm.contains("GetStdHandle"));
}

#[test]
fn maximum_level_emits_exactly_two_instructions_per_function() {
    let state = state_of(two_function_program()).with_optimisation(OptimisationLevel::Omax);
    let asm = emit(&state);

    let text = &asm[asm.find(".Ltext0:").unwrap()..];
    assert!(text.contains("main:\n\txor rax, rax\n\tret\nhelper:\n\txor rax, rax\n\tret\n"));
    assert!(!text.contains("mov rax, 7"));
    assert!(!text.contains("call writechar"));
    // The support scaffolding is skipped entirely.
    assert!(!asm.contains("\nwritechar:"));
    assert!(!asm.contains("\nreadchar:"));
}

#[test]
fn size_minimized_level_ends_with_the_align_directive() {
    let state = state_of(two_function_program()).with_optimisation(OptimisationLevel::Os);
    let asm = emit(&state);
    assert!(asm.ends_with(".align 536870912\n"));
    assert_eq!(asm.matches(".align").count(), 1);
}

#[test]
fn random_slot_label_is_emitted_at_its_position() {
    let mut state = state_of(two_function_program());
    state.instructions.random_slot = 1;
    let asm = emit(&state);
    assert!(asm.contains(".LRandomJump: \tmov rax, 7"));
}

#[test]
fn random_slot_label_ignores_the_slots_translate_flag() {
    let mut instructions = two_function_program();
    instructions[1].translate = false;
    let mut state = state_of(instructions);
    state.instructions.random_slot = 1;
    let asm = emit(&state);
    assert!(asm.contains(".LRandomJump: "));
    assert!(!asm.contains("mov rax, 7"));
}

#[test]
fn debug_records_bracket_the_file() {
    let state = state_of(two_function_program()).with_debug_info();
    let asm = emit(&state);

    let cwd = std::env::current_dir().unwrap();
    let origin = format!(
        ".stabs \"{}\", 100, 0, 0, .Ltext0",
        cwd.join("prog.opal").display()
    );
    let origin_at = asm.find(&origin).unwrap();
    let eof_at = asm.find(".stabs \"\", 100, 0, 0, .LEOF").unwrap();
    assert!(origin_at < eof_at);

    // One function-info block per function, after the code.
    assert!(asm.contains(".stabs \"main:F1\", 36, 0, 0, main"));
    assert!(asm.contains(".stabs \"helper:F1\", 36, 0, 0, helper"));
    assert!(asm.contains(".stabn 224, 0, 0, .Lret_main"));
    assert!(asm.contains(".stabn 224, 0, 0, .Lret_helper"));

    // Line labels and records for the body instructions.
    assert!(asm.contains("\t.Lcmd_2:\n\tmov rax, 7"));
    assert!(asm.contains("\t.stabn 68, 0, 2, .Lcmd_2"));

    // Function-end labels precede each return's line record.
    let ret_main = asm.find("\t.Lret_main:").unwrap();
    let line_3 = asm.find("\t.stabn 68, 0, 3, .Lcmd_3").unwrap();
    assert!(ret_main < line_3);
}

#[test]
fn no_debug_records_without_the_toggle() {
    let asm = emit(&state_of(two_function_program()));
    assert!(!asm.contains(".stabs"));
    assert!(!asm.contains(".stabn"));
    assert!(!asm.contains(".Lcmd_"));
}

#[test]
fn breakpoint_suppresses_exactly_one_label() {
    let state = state_of(vec![
        inst(FUNC_DECL, &["main"], 1),
        inst(BREAKPOINT, &[], 2),
        inst(MOV, &["rax", "7"], 3),
        inst(MOV, &["rbx", "8"], 4),
        inst(RET_PLAIN, &[], 5),
    ])
    .with_debug_info();
    let asm = emit(&state);

    // Pre-emitted once by the breakpoint, not again by the mov itself.
    assert_eq!(asm.matches("\t.Lcmd_3:\n").count(), 1);
    // The following instruction labels normally again.
    assert_eq!(asm.matches("\t.Lcmd_4:\n").count(), 1);
    // The breakpoint has no line of its own.
    assert!(!asm.contains(".Lcmd_2"));
    assert!(!asm.contains(".stabn 68, 0, 2,"));
}

#[test]
fn padding_follows_every_emitted_instruction() {
    let state = state_of(vec![
        inst(FUNC_DECL, &["main"], 1),
        inst(MOV, &["rax", "7"], 2),
        inst(RET_PLAIN, &[], 3),
    ])
    .with_optimisation(OptimisationLevel::O2);
    let asm = emit(&state);
    assert_eq!(asm.matches("\tpush rax\n\tpop rax\n").count(), 3);
}

#[test]
fn pointer_parameters_emit_memory_operands() {
    let state = state_of(vec![
        inst(FUNC_DECL, &["main"], 1),
        inst(MOV, &["rax", "rbx"], 2).with_pointer(1),
        inst(RET_PLAIN, &[], 3),
    ]);
    let asm = emit(&state);
    assert!(asm.contains("\tmov [rax], rbx\n"));
}

#[test]
fn comparison_labels_derive_from_parameters() {
    let state = state_of(vec![
        inst(FUNC_DECL, &["main"], 1),
        inst(CMP_WINS, &["rax", "rbx"], 2),
        inst(CMP_WINS + 1, &["rax"], 3),
        inst(CMP_WINS + 1, &["rbx"], 4),
        inst(RET_PLAIN, &[], 5),
    ]);
    let asm = emit(&state);
    assert!(asm.contains("\tcmp rax, rbx\n\tjae .Lwin_rax\n\tjmp .Lwin_rbx\n"));
    assert!(asm.contains("\t.Lwin_rax:\n"));
    assert!(asm.contains("\t.Lwin_rbx:\n"));
}
