//! Stable rule identifiers attached to every diagnostic, grouped by the
//! pipeline stage that raises them. These strings are part of the compiler's
//! public contract: tooling (the out-of-scope LSP/lint collaborators) keys
//! off them, so once published a rule id is never renamed, only retired.

pub const LEX_INVALID_CHARACTER: &str = "lex.invalid-character";
pub const LEX_UNTERMINATED_STRING: &str = "lex.unterminated-string";
pub const LEX_UNTERMINATED_COMMENT: &str = "lex.unterminated-comment";
pub const LEX_UNBALANCED_INTERPOLATION: &str = "lex.unbalanced-interpolation";

pub const PARSE_UNEXPECTED_TOKEN: &str = "parse.unexpected-token";
pub const PARSE_MISSING_TOKEN: &str = "parse.missing-token";
pub const PARSE_MALFORMED_CONSTRUCT: &str = "parse.malformed-construct";
pub const PARSE_NESTED_INTERPOLATION: &str = "parse.nested-interpolation";

pub const SEM_UNRESOLVED_NAME: &str = "sem.unresolved-name";
pub const SEM_UNKNOWN_EFFECT: &str = "sem.unknown-effect";
pub const SEM_EFFECT_MISSING: &str = "sem.effect-missing";
pub const SEM_PURITY_VIOLATED: &str = "sem.purity-violated";
pub const SEM_PROPAGATION_OUTSIDE_RESULT: &str = "sem.propagation-outside-result";
pub const SEM_PROPAGATION_ERROR_MISMATCH: &str = "sem.propagation-error-mismatch";
pub const SEM_NON_EXHAUSTIVE_MATCH: &str = "sem.non-exhaustive-match";
pub const SEM_GUARD_NOT_TERMINATING: &str = "sem.guard-not-terminating";
pub const SEM_TYPE_MISMATCH: &str = "sem.type-mismatch";
pub const SEM_DUPLICATE_PARAMETER: &str = "sem.duplicate-parameter";
pub const SEM_DUPLICATE_EXPORT: &str = "sem.duplicate-export";
pub const SEM_UNKNOWN_MODULE: &str = "sem.unknown-module";
pub const SEM_UNEXPORTED_IMPORT: &str = "sem.unexported-import";

pub const GEN_UNSUPPORTED_NODE: &str = "gen.unsupported-node";
