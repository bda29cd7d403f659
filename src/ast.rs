//! The AST consumed by the analyzer and evaluator. The parser (out of scope
//! for this crate) is responsible for producing these nodes; nothing here
//! parses source text.

use serde::{Deserialize, Serialize};

/// A 1-based source position, used only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A node paired with the span it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T> WithSpan<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

/// A type name token, as written by the user (`number`, `MyStruct`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyLabel {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignMode {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOperator {
    pub fn class(self) -> OperatorClass {
        use BinaryOperator::*;
        match self {
            Add | Sub | Mul | Div | Rem => OperatorClass::Arithmetic,
            Lt | Le | Gt | Ge => OperatorClass::Ordering,
            Eq | Ne => OperatorClass::Equivalence,
            And | Or => OperatorClass::Logical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    Ordering,
    Equivalence,
    Logical,
}

// ---------------------------------------------------------------------
// File-level declarations
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnDeclParam {
    pub name: String,
    pub ty: TyLabel,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<FnDeclParam>,
    pub return_ty: Option<TyLabel>,
    pub body: Vec<WithSpan<Step>>,
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDeclField {
    pub name: String,
    pub ty: TyLabel,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<StructDeclField>,
    pub exported: bool,
    pub span: Span,
}

/// The root of a parsed source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub functions: Vec<FunctionDecl>,
    pub structs: Vec<StructDecl>,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub ty: Option<TyLabel>,
    pub body: Option<WithSpan<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignStatement {
    pub target: WithSpan<ReferenceExpr>,
    pub mode: AssignMode,
    pub body: WithSpan<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStatement {
    pub cond: Box<WithSpan<Expr>>,
    pub then_block: Vec<WithSpan<Step>>,
    pub else_block: Option<Vec<WithSpan<Step>>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopStatement {
    pub block: Vec<WithSpan<Step>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub expr: Option<WithSpan<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakStatement {
    pub span: Span,
}

/// Either a statement or an expression used as a step inside a block. A
/// block's type (and runtime result) comes from its final step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Step {
    VariableDecl(VariableDecl),
    AssignStatement(AssignStatement),
    IfStatement(IfStatement),
    LoopStatement(LoopStatement),
    ReturnStatement(ReturnStatement),
    BreakStatement(BreakStatement),
    ExprStatement(WithSpan<Expr>),
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

/// An expression that produces an L-value: the only expressions that can
/// appear as an assignment target or be read as a mutable binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReferenceExpr {
    Identifier { name: String },
    FieldAccess {
        target: Box<WithSpan<Expr>>,
        name: String,
    },
    IndexAccess {
        target: Box<WithSpan<Expr>>,
        index: Box<WithSpan<Expr>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructExprField {
    pub name: String,
    pub body: WithSpan<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    NumberLiteral(f64),
    BoolLiteral(bool),
    CharLiteral(String),
    StringLiteral(String),
    Identifier(String),
    FieldAccess {
        target: Box<WithSpan<Expr>>,
        name: String,
    },
    IndexAccess {
        target: Box<WithSpan<Expr>>,
        index: Box<WithSpan<Expr>>,
    },
    Call {
        callee: Box<WithSpan<Expr>>,
        args: Vec<WithSpan<Expr>>,
    },
    BinaryOp {
        operator: BinaryOperator,
        left: Box<WithSpan<Expr>>,
        right: Box<WithSpan<Expr>>,
    },
    UnaryNot(Box<WithSpan<Expr>>),
    StructExpr {
        name: String,
        fields: Vec<StructExprField>,
    },
    ArrayNode(Vec<WithSpan<Expr>>),
    IfExpr {
        cond: Box<WithSpan<Expr>>,
        then_block: Vec<WithSpan<Step>>,
        else_block: Vec<WithSpan<Step>>,
    },
}

impl Expr {
    /// View this expression as a reference expression, if it is one. Used by
    /// the analyzer/evaluator when an `Expr` appears where an L-value is
    /// required (assignment targets, `FieldAccess`/`IndexAccess` receivers).
    pub fn as_reference(&self) -> Option<ReferenceExpr> {
        match self {
            Expr::Identifier(name) => Some(ReferenceExpr::Identifier { name: name.clone() }),
            Expr::FieldAccess { target, name } => Some(ReferenceExpr::FieldAccess {
                target: target.clone(),
                name: name.clone(),
            }),
            Expr::IndexAccess { target, index } => Some(ReferenceExpr::IndexAccess {
                target: target.clone(),
                index: index.clone(),
            }),
            _ => None,
        }
    }
}
