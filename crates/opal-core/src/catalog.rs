//! Static opcode catalog for the Opal language.
//!
//! Every decoded instruction selects one [`CatalogEntry`] by opcode. The
//! catalog is read-only data produced ahead of time; the parser has already
//! checked each instruction's parameters against the entry's arity and
//! allowed parameter kinds, so consumers here trust both.
//!
//! Two layout contracts are baked into the opcode numbering and relied on by
//! the analyzer and translator:
//!
//! - the three return variants occupy the three opcodes immediately after
//!   the function declaration opcode, and
//! - a paired comparison opcode is immediately followed by its jump-label
//!   opcode.

use bitflags::bitflags;
use lazy_static::lazy_static;

bitflags! {
    /// Parameter kinds a single opcode parameter position accepts.
    ///
    /// Operand classification against this mask happens upstream during
    /// parsing; the catalog only carries the mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamKind: u8 {
        /// 64-bit general purpose register.
        const REG64 = 1;
        /// 32-bit general purpose register.
        const REG32 = 1 << 1;
        /// 16-bit general purpose register.
        const REG16 = 1 << 2;
        /// 8-bit general purpose register.
        const REG8 = 1 << 3;
        /// Decimal immediate.
        const DECIMAL = 1 << 4;
        /// Character literal (including escape sequences) or ASCII code.
        const CHAR = 1 << 5;
        /// Jump label name.
        const LABEL = 1 << 6;
        /// Function name.
        const FUNC_NAME = 1 << 7;
    }
}

/// Which semantic analysis a catalog entry's opcode family requires.
///
/// Replaces a per-opcode analysis function pointer with a tagged variant
/// resolved at a single dispatch site in the analyzer. At most one opcode of
/// a family carries the tag; the analysis receives that opcode and derives
/// the rest of the family from the layout contracts above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    /// No semantic analysis for this opcode.
    None,
    /// Function segmentation and structure checks.
    Functions,
    /// Two-label comparison: duplicate labels and per-side references.
    ComparisonPairs,
    /// Single-label comparison: some label must exist if the comparison is used.
    LabelExistence,
}

/// One opcode's catalog entry.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Source-level pattern the parser matches (carried as data only).
    pub pattern: &'static str,
    /// Emission template: literal text plus placeholder digits `0`/`1`.
    ///
    /// A digit `d` with `d < arity` is replaced by the instruction's
    /// parameter `d`; every other character is copied verbatim.
    pub translation: &'static str,
    /// Number of parameters (0–2).
    pub arity: u8,
    /// Allowed parameter kinds per position; unused positions are empty.
    pub param_kinds: [ParamKind; 2],
    /// Whether the instruction gets its own debug line record. The
    /// breakpoint must not: the debugger would stop at it twice.
    pub line_bearing: bool,
    /// Semantic analysis dispatched for this opcode.
    pub analysis: Analysis,
}

/// Opcode of the function declaration. Opcodes `1..=3` are its return variants.
pub const FUNC_DECL: u8 = 0;
/// First return variant: return zero.
pub const RET_ZERO: u8 = 1;
/// Second return variant: return a value.
pub const RET_VALUE: u8 = 2;
/// Third return variant: plain return.
pub const RET_PLAIN: u8 = 3;
/// Two-label comparison; its jump label is the next opcode.
pub const CMP_WINS: u8 = 4;
/// Jump label of the two-label comparison.
pub const CMP_WINS_LABEL: u8 = 5;
/// Single-label equality comparison; its shared label is the next opcode.
pub const CMP_SAME: u8 = 6;
/// Shared label of the equality comparison.
pub const CMP_SAME_LABEL: u8 = 7;
/// Generic jump mark declaration.
pub const MARK: u8 = 8;
/// Unconditional jump to a mark.
pub const JUMP: u8 = 9;
/// Register/immediate move.
pub const MOV: u8 = 10;
/// Addition.
pub const ADD: u8 = 11;
/// Subtraction.
pub const SUB: u8 = 12;
/// Write one character to stdout.
pub const PUTC: u8 = 13;
/// Read one character from stdin.
pub const GETC: u8 = 14;
/// Debugger breakpoint. Not line-bearing.
pub const BREAKPOINT: u8 = 15;
/// No-op.
pub const NOP: u8 = 16;

/// Whether `opcode` is one of the three return variants.
pub fn is_return(opcode: u8) -> bool {
    opcode > FUNC_DECL && opcode <= FUNC_DECL + 3
}

const fn no_params() -> [ParamKind; 2] {
    [ParamKind::empty(), ParamKind::empty()]
}

lazy_static! {
    static ref CATALOG: Vec<CatalogEntry> = {
        let reg = ParamKind::REG64 | ParamKind::REG32 | ParamKind::REG16 | ParamKind::REG8;
        let value = reg | ParamKind::DECIMAL | ParamKind::CHAR;
        let one = |k: ParamKind| [k, ParamKind::empty()];
        vec![
            // 0: function declaration; emits the function's label.
            CatalogEntry {
                pattern: "fn 0",
                translation: "0:",
                arity: 1,
                param_kinds: one(ParamKind::FUNC_NAME),
                line_bearing: true,
                analysis: Analysis::Functions,
            },
            // 1..=3: return variants.
            CatalogEntry {
                pattern: "return",
                translation: "xor rax, rax\n\tret",
                arity: 0,
                param_kinds: no_params(),
                line_bearing: true,
                analysis: Analysis::None,
            },
            CatalogEntry {
                pattern: "return 0",
                translation: "mov rax, 0\n\tret",
                arity: 1,
                param_kinds: one(value),
                line_bearing: true,
                analysis: Analysis::None,
            },
            CatalogEntry {
                pattern: "leave",
                translation: "ret",
                arity: 0,
                param_kinds: no_params(),
                line_bearing: true,
                analysis: Analysis::None,
            },
            // 4/5: two-label comparison and its jump label.
            CatalogEntry {
                pattern: "wins 0 1",
                translation: "cmp 0, 1\n\tjae .Lwin_0\n\tjmp .Lwin_1",
                arity: 2,
                param_kinds: [value, value],
                line_bearing: true,
                analysis: Analysis::ComparisonPairs,
            },
            CatalogEntry {
                pattern: "winner 0",
                translation: ".Lwin_0:",
                arity: 1,
                param_kinds: one(value),
                line_bearing: true,
                analysis: Analysis::None,
            },
            // 6/7: equality comparison and its single shared label.
            CatalogEntry {
                pattern: "same 0 1",
                translation: "cmp 0, 1\n\tje .Lsame",
                arity: 2,
                param_kinds: [value, value],
                line_bearing: true,
                analysis: Analysis::LabelExistence,
            },
            CatalogEntry {
                pattern: "proceed",
                translation: ".Lsame:",
                arity: 0,
                param_kinds: no_params(),
                line_bearing: true,
                analysis: Analysis::None,
            },
            // 8/9: generic mark and jump.
            CatalogEntry {
                pattern: "mark 0",
                translation: ".Lmark_0:",
                arity: 1,
                param_kinds: one(ParamKind::LABEL),
                line_bearing: true,
                analysis: Analysis::None,
            },
            CatalogEntry {
                pattern: "jump 0",
                translation: "jmp .Lmark_0",
                arity: 1,
                param_kinds: one(ParamKind::LABEL),
                line_bearing: true,
                analysis: Analysis::None,
            },
            // 10..=12: data movement and arithmetic.
            CatalogEntry {
                pattern: "set 0 1",
                translation: "mov 0, 1",
                arity: 2,
                param_kinds: [reg, value],
                line_bearing: true,
                analysis: Analysis::None,
            },
            CatalogEntry {
                pattern: "add 0 1",
                translation: "add 0, 1",
                arity: 2,
                param_kinds: [reg, value],
                line_bearing: true,
                analysis: Analysis::None,
            },
            CatalogEntry {
                pattern: "sub 0 1",
                translation: "sub 0, 1",
                arity: 2,
                param_kinds: [reg, value],
                line_bearing: true,
                analysis: Analysis::None,
            },
            // 13/14: character I/O through the runtime support routines.
            CatalogEntry {
                pattern: "print 0",
                translation: "mov [rip + .LCharacter], 0\n\tcall writechar",
                arity: 1,
                param_kinds: one(ParamKind::REG8 | ParamKind::CHAR),
                line_bearing: true,
                analysis: Analysis::None,
            },
            CatalogEntry {
                pattern: "read 0",
                translation: "call readchar\n\tmov 0, [rip + .LCharacter]",
                arity: 1,
                param_kinds: one(ParamKind::REG8),
                line_bearing: true,
                analysis: Analysis::None,
            },
            // 15: breakpoint. Pre-emits the next instruction's line label instead
            // of its own, hence not line-bearing.
            CatalogEntry {
                pattern: "break",
                translation: "int3",
                arity: 0,
                param_kinds: no_params(),
                line_bearing: false,
                analysis: Analysis::None,
            },
            // 16: no-op.
            CatalogEntry {
                pattern: "wait",
                translation: "nop",
                arity: 0,
                param_kinds: no_params(),
                line_bearing: true,
                analysis: Analysis::None,
            },
        ]
    };
}

/// The full catalog, indexed by opcode.
pub fn catalog() -> &'static [CatalogEntry] {
    CATALOG.as_slice()
}

/// Look up one entry. Opcodes index valid entries by the parser's contract.
pub fn entry(opcode: u8) -> &'static CatalogEntry {
    &CATALOG[opcode as usize]
}
