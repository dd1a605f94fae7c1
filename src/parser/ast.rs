use crate::diagnostics::Span;

/// Identifies one [`Expr`] node for the semantic checker's side tables
/// (spec §3 Lifecycle: the AST is immutable once parsed, so resolved types
/// and resolved callees live in `NodeId`-keyed maps instead of being
/// written back onto the tree).
pub type NodeId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Module(ModuleDecl),
    Import(ImportDecl),
    Function(FunctionDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: String,
    pub items: Vec<Item>,
    /// `None` means every module-scope function is exported (spec §3).
    pub exports: Option<Vec<String>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportShape {
    All,
    Only(Vec<String>),
    Bare,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub module_name: String,
    pub shape: ImportShape,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub is_pure: bool,
    pub params: Vec<Param>,
    pub return_type: Type,
    /// `None` means no `uses [...]` clause was written (an empty effect set).
    pub effects: Option<Vec<EffectRef>>,
    pub body: Vec<Stmt>,
    pub spec: Option<SpecBlock>,
    pub span: Span,
}

/// An effect name as written in source, before the semantic checker has
/// validated it against the closed alphabet (spec §3/§4.3 check 4).
#[derive(Debug, Clone, PartialEq)]
pub struct EffectRef {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    String,
    Bool,
    Result(Box<Type>, Box<Type>),
    Option(Box<Type>),
    List(Box<Type>),
    Named(String),
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Result(ok, err) => write!(f, "Result<{ok}, {err}>"),
            Type::Option(inner) => write!(f, "Option<{inner}>"),
            Type::List(inner) => write!(f, "List<{inner}>"),
            Type::Named(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Let { name: String, value: Expr },
    Return(Option<Expr>),
    If { cond: Expr, then_block: Vec<Stmt>, else_block: Option<Vec<Stmt>> },
    Guard { cond: Expr, else_block: Vec<Stmt> },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    IntLit(i64),
    StringLit(String),
    BoolLit(bool),
    InterpolatedString(Vec<InterpolatedPart>),
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    QualifiedCall { module: String, name: String, args: Vec<Expr> },
    ListLit(Vec<Expr>),
    Index { target: Box<Expr>, index: Box<Expr> },
    Ok(Box<Expr>),
    Error(Box<Expr>),
    Some(Box<Expr>),
    None,
    /// Postfix `?`.
    ErrorPropagation(Box<Expr>),
    Match { scrutinee: Box<Expr>, arms: Vec<MatchArm> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterpolatedPart {
    Literal(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ok(String),
    Error(String),
    Some(String),
    None,
    Literal(Literal),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    String(String),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Precedence level, high binds tighter. Matches the grammar's
    /// `or < and < eq < cmp < add < mul` chain (spec §4.2).
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A parsed `/*spec ... */` block, carried through to codegen as XML docs
/// (spec §4.1/§4.4). The lexer hands back raw text; parsing the
/// YAML-like `key: value` body is this type's job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecBlock {
    pub intent: Option<String>,
    pub rules: Vec<String>,
    pub postconditions: Vec<String>,
    pub source_doc: Option<String>,
}

impl SpecBlock {
    /// Parses the informal `key: value` / `key:\n  - item` body of a
    /// `/*spec ... */` block. Unknown keys are ignored rather than
    /// rejected, since the spec payload format is explicitly not parsed
    /// by the lexer and is meant to preserve human intent, not be
    /// validated grammar.
    pub fn parse(raw: &str) -> SpecBlock {
        let mut block = SpecBlock::default();
        let mut current_key: Option<&'static str> = None;

        for line in raw.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix('-') {
                let item = rest.trim().trim_matches('"').to_string();
                match current_key {
                    Some("rules") => block.rules.push(item),
                    Some("postconditions") => block.postconditions.push(item),
                    _ => {}
                }
                continue;
            }
            if let Some((key, value)) = trimmed.split_once(':') {
                let key = key.trim();
                let value = value.trim().trim_matches('"');
                match key {
                    "intent" => {
                        block.intent = Some(value.to_string());
                        current_key = None;
                    }
                    "rules" => {
                        current_key = Some("rules");
                        if !value.is_empty() {
                            block.rules.push(value.to_string());
                        }
                    }
                    "postconditions" => {
                        current_key = Some("postconditions");
                        if !value.is_empty() {
                            block.postconditions.push(value.to_string());
                        }
                    }
                    "source_doc" => {
                        block.source_doc = Some(value.to_string());
                        current_key = None;
                    }
                    _ => current_key = None,
                }
            }
        }

        block
    }
}
