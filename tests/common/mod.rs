//! Small hand-rolled AST builders. The parser lives outside this crate,
//! so integration tests construct `SourceFile`s directly instead of going
//! through source text.

use uguisu::ast::{
    AssignMode, AssignStatement, BinaryOperator, BreakStatement, Expr, FnDeclParam, FunctionDecl,
    IfStatement, LoopStatement, ReferenceExpr, ReturnStatement, SourceFile, Span, Step,
    StructDecl, StructDeclField, StructExprField, TyLabel, VariableDecl, WithSpan,
};

pub fn sp() -> Span {
    Span::new(1, 1)
}

pub fn ws<T>(value: T) -> WithSpan<T> {
    WithSpan::new(value, sp())
}

pub fn ty(name: &str) -> TyLabel {
    TyLabel { name: name.to_string(), span: sp() }
}

pub fn ident(name: &str) -> WithSpan<Expr> {
    ws(Expr::Identifier(name.to_string()))
}

pub fn num(n: f64) -> WithSpan<Expr> {
    ws(Expr::NumberLiteral(n))
}

pub fn string_lit(s: &str) -> WithSpan<Expr> {
    ws(Expr::StringLiteral(s.to_string()))
}

pub fn bin(op: BinaryOperator, left: WithSpan<Expr>, right: WithSpan<Expr>) -> WithSpan<Expr> {
    ws(Expr::BinaryOp { operator: op, left: Box::new(left), right: Box::new(right) })
}

pub fn call(callee: WithSpan<Expr>, args: Vec<WithSpan<Expr>>) -> WithSpan<Expr> {
    ws(Expr::Call { callee: Box::new(callee), args })
}

pub fn field(target: WithSpan<Expr>, name: &str) -> WithSpan<Expr> {
    ws(Expr::FieldAccess { target: Box::new(target), name: name.to_string() })
}

pub fn var_decl(name: &str, ty: Option<TyLabel>, body: Option<WithSpan<Expr>>) -> WithSpan<Step> {
    ws(Step::VariableDecl(VariableDecl { name: name.to_string(), ty, body, span: sp() }))
}

pub fn assign(target: ReferenceExpr, body: WithSpan<Expr>) -> WithSpan<Step> {
    ws(Step::AssignStatement(AssignStatement { target: ws(target), mode: AssignMode::Assign, body, span: sp() }))
}

pub fn ret(expr: Option<WithSpan<Expr>>) -> WithSpan<Step> {
    ws(Step::ReturnStatement(ReturnStatement { expr, span: sp() }))
}

pub fn expr_stmt(expr: WithSpan<Expr>) -> WithSpan<Step> {
    ws(Step::ExprStatement(expr))
}

pub fn if_stmt(cond: WithSpan<Expr>, then_block: Vec<WithSpan<Step>>, else_block: Option<Vec<WithSpan<Step>>>) -> WithSpan<Step> {
    ws(Step::IfStatement(IfStatement { cond: Box::new(cond), then_block, else_block, span: sp() }))
}

pub fn loop_stmt(block: Vec<WithSpan<Step>>) -> WithSpan<Step> {
    ws(Step::LoopStatement(LoopStatement { block, span: sp() }))
}

pub fn break_stmt() -> WithSpan<Step> {
    ws(Step::BreakStatement(BreakStatement { span: sp() }))
}

pub fn param(name: &str, ty_name: &str) -> FnDeclParam {
    FnDeclParam { name: name.to_string(), ty: ty(ty_name), span: sp() }
}

pub fn func(name: &str, params: Vec<FnDeclParam>, return_ty: Option<&str>, body: Vec<WithSpan<Step>>) -> FunctionDecl {
    FunctionDecl {
        name: name.to_string(),
        params,
        return_ty: return_ty.map(ty),
        body,
        exported: false,
        span: sp(),
    }
}

pub fn main_fn(body: Vec<WithSpan<Step>>) -> FunctionDecl {
    func("main", vec![], None, body)
}

pub fn file(functions: Vec<FunctionDecl>, structs: Vec<StructDecl>) -> SourceFile {
    SourceFile { functions, structs }
}

pub fn struct_decl(name: &str, fields: Vec<(&str, &str)>) -> StructDecl {
    StructDecl {
        name: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(n, t)| StructDeclField { name: n.to_string(), ty: ty(t), span: sp() })
            .collect(),
        exported: false,
        span: sp(),
    }
}

pub fn struct_field(name: &str, body: WithSpan<Expr>) -> StructExprField {
    StructExprField { name: name.to_string(), body, span: sp() }
}

pub fn struct_expr(name: &str, fields: Vec<StructExprField>) -> WithSpan<Expr> {
    ws(Expr::StructExpr { name: name.to_string(), fields })
}

pub fn array_node(items: Vec<WithSpan<Expr>>) -> WithSpan<Expr> {
    ws(Expr::ArrayNode(items))
}

pub fn index(target: WithSpan<Expr>, index: WithSpan<Expr>) -> WithSpan<Expr> {
    ws(Expr::IndexAccess { target: Box::new(target), index: Box::new(index) })
}
