//! The semantic analyzer: three passes over a `SourceFile` — declare,
//! resolve, analyze — producing an `AnalysisResult` of accumulated
//! diagnostics. Analysis never halts on error; every error is recorded and
//! analysis continues with `Type::Invalid` standing in for the broken spot,
//! rather than short-circuiting on the first one.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::ast::{
    AssignMode, AssignStatement, BinaryOperator, BreakStatement, Expr, FunctionDecl, IfStatement,
    LoopStatement, OperatorClass, ReferenceExpr, ReturnStatement, SourceFile, Span, Step,
    StructExprField, TyLabel, VariableDecl, WithSpan,
};
use crate::builtins::register_builtin_symbols;
use crate::env::Environment;
use crate::errors::{self, AnalysisMessage};
use crate::symbol::{FnParam, FnVar, Symbol};
use crate::types::{compare, supports_arithmetic, supports_index, supports_logical, supports_ordering, type_string, Type};

/// Options controlling a single `analyze` call. Currently empty; a place to
/// hang future knobs (e.g. a "treat warnings as errors" switch) without
/// breaking the `analyze` signature.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {}

/// The public result of analysis: whether it succeeded, plus the rendered
/// text of every accumulated diagnostic.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub success: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

const PRIMITIVE_TYPE_NAMES: [&str; 5] = ["number", "bool", "char", "string", "array"];

fn is_struct_type(ty: &Type) -> bool {
    matches!(ty, Type::Named { name, .. } if !PRIMITIVE_TYPE_NAMES.contains(&name.as_str()))
}

struct ReferenceInfo {
    ty: Type,
    /// `Some(name)` when this reference is a plain local variable binding —
    /// the only shape eligible for the "adopt the initializer's type on
    /// first assignment" rule.
    variable_name: Option<String>,
    is_defined: bool,
}

/// Runs the three-pass analysis and returns the rendered diagnostics.
pub fn analyze(file: &SourceFile, _options: &AnalyzeOptions) -> AnalysisResult {
    let mut analyzer = Analyzer::new();
    analyzer.declare_pass(file);
    analyzer.resolve_pass(file);
    analyzer.analyze_pass(file);
    analyzer.finish()
}

struct Analyzer {
    env: Environment<Symbol>,
    symbol_table: HashMap<Span, Symbol>,
    errors: Vec<AnalysisMessage>,
    warnings: Vec<AnalysisMessage>,
    saw_index_access: bool,
}

impl Analyzer {
    fn new() -> Self {
        let env = Environment::new();
        register_builtin_symbols(&env);
        Self {
            env,
            symbol_table: HashMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            saw_index_access: false,
        }
    }

    fn error(&mut self, message: AnalysisMessage) {
        self.errors.push(message);
    }

    fn warn(&mut self, message: AnalysisMessage) {
        self.warnings.push(message);
    }

    fn finish(self) -> AnalysisResult {
        AnalysisResult {
            success: self.errors.is_empty(),
            errors: self.errors.iter().map(ToString::to_string).collect(),
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
        }
    }

    // -----------------------------------------------------------------
    // Pass 1: declare
    // -----------------------------------------------------------------

    fn declare_pass(&mut self, file: &SourceFile) {
        for func in &file.functions {
            let symbol = Symbol::Fn {
                params: func.params.iter().map(|p| FnParam { name: p.name.clone() }).collect(),
                ty: Type::Unresolved,
                vars: Vec::new(),
            };
            if self.env.set(func.name.clone(), symbol).is_err() {
                self.error(errors::duplicate_declaration(&func.name, func.span));
                continue;
            }
            self.symbol_table.insert(func.span, self.env.get(&func.name).unwrap());
            if func.exported {
                self.warn(errors::exported_not_supported_warning(func.span));
            }
        }

        for decl in &file.structs {
            let fields = decl
                .fields
                .iter()
                .map(|f| (f.name.clone(), Symbol::Variable { ty: Type::Unresolved, is_defined: true }))
                .collect();
            let symbol = Symbol::Struct { name: decl.name.clone(), fields };
            if self.env.set(decl.name.clone(), symbol).is_err() {
                self.error(errors::duplicate_declaration(&decl.name, decl.span));
                continue;
            }
            self.symbol_table.insert(decl.span, self.env.get(&decl.name).unwrap());
            if decl.exported {
                self.warn(errors::exported_not_supported_warning(decl.span));
            }
        }
    }

    // -----------------------------------------------------------------
    // Pass 2: resolve
    // -----------------------------------------------------------------

    fn resolve_ty_label(&mut self, label: &TyLabel) -> Type {
        if PRIMITIVE_TYPE_NAMES.contains(&label.name.as_str()) {
            return Type::named(label.name.clone());
        }
        match self.env.get(&label.name) {
            Some(Symbol::Struct { name, .. }) => Type::named(name),
            Some(_) => {
                self.error(errors::invalid_type_name(&label.name, label.span));
                Type::Invalid
            }
            None => {
                self.error(errors::unknown_type_name(&label.name, label.span));
                Type::Invalid
            }
        }
    }

    fn resolve_pass(&mut self, file: &SourceFile) {
        for decl in &file.structs {
            let mut fields = indexmap::IndexMap::new();
            for field in &decl.fields {
                let ty = self.resolve_ty_label(&field.ty);
                fields.insert(field.name.clone(), Symbol::Variable { ty, is_defined: true });
            }
            let symbol = Symbol::Struct { name: decl.name.clone(), fields };
            self.env.assign(&decl.name, symbol.clone());
            self.symbol_table.insert(decl.span, symbol);
        }

        for func in &file.functions {
            let param_types: Vec<Type> = func.params.iter().map(|p| self.resolve_ty_label(&p.ty)).collect();
            let return_type = match &func.return_ty {
                Some(label) => self.resolve_ty_label(label),
                None => Type::Void,
            };
            let ty = Type::Function {
                is_method: false,
                type_params: Vec::new(),
                param_types,
                return_type: Box::new(return_type),
            };
            let symbol = Symbol::Fn {
                params: func.params.iter().map(|p| FnParam { name: p.name.clone() }).collect(),
                ty,
                vars: Vec::new(),
            };
            self.env.assign(&func.name, symbol.clone());
            self.symbol_table.insert(func.span, symbol);
        }
    }

    // -----------------------------------------------------------------
    // Pass 3: analyze
    // -----------------------------------------------------------------

    fn analyze_pass(&mut self, file: &SourceFile) {
        for func in &file.functions {
            self.analyze_function(func);
        }
    }

    fn analyze_function(&mut self, func: &FunctionDecl) {
        let symbol = self.env.get(&func.name).expect("declared in pass 1");
        let (param_types, return_type) = match symbol.ty() {
            Type::Function { param_types, return_type, .. } => (param_types, *return_type),
            _ => return,
        };
        if param_types.iter().any(|t| matches!(t, Type::Invalid)) {
            return;
        }

        self.env.enter();
        for (param, ty) in func.params.iter().zip(param_types.iter()) {
            let _ = self.env.set(param.name.clone(), Symbol::Variable { ty: ty.clone(), is_defined: true });
        }
        let block_ty = self.analyze_steps(&func.body, false, &return_type);
        if !matches!(block_ty, Type::Never) && !compare(&return_type, &block_ty).is_compatible() {
            self.error(errors::type_mismatch(&return_type, &block_ty, func.span));
        }
        let vars = self
            .env
            .top_frame_entries()
            .into_iter()
            .map(|(name, sym)| FnVar { name, ty: sym.ty() })
            .collect();
        self.env.leave().expect("function frame was just entered");

        let updated = Symbol::Fn {
            params: func.params.iter().map(|p| FnParam { name: p.name.clone() }).collect(),
            ty: Type::Function {
                is_method: false,
                type_params: Vec::new(),
                param_types,
                return_type: Box::new(return_type),
            },
            vars,
        };
        self.env.assign(&func.name, updated);
    }

    /// Analyzes a nested block: its own frame, entered and left on every
    /// path (including early error returns — there is none here, since
    /// `analyze_steps` never early-returns).
    fn analyze_block(&mut self, steps: &[WithSpan<Step>], allow_jump: bool, return_ty: &Type) -> Type {
        self.env.enter();
        let ty = self.analyze_steps(steps, allow_jump, return_ty);
        self.env.leave().expect("block frame was just entered");
        ty
    }

    fn analyze_steps(&mut self, steps: &[WithSpan<Step>], allow_jump: bool, return_ty: &Type) -> Type {
        let mut result = Type::Void;
        let last = steps.len().saturating_sub(1);
        for (i, step) in steps.iter().enumerate() {
            let ty = self.analyze_step(step, allow_jump, return_ty);
            if i == last {
                result = ty;
            } else if !compare(&Type::Void, &ty).is_compatible() {
                self.error(errors::type_mismatch(&Type::Void, &ty, step.span));
            }
        }
        result
    }

    fn analyze_step(&mut self, step: &WithSpan<Step>, allow_jump: bool, return_ty: &Type) -> Type {
        match &step.value {
            Step::VariableDecl(decl) => self.analyze_variable_decl(decl, allow_jump, return_ty),
            Step::AssignStatement(assign) => self.analyze_assign(assign, allow_jump, return_ty),
            Step::IfStatement(ifs) => self.analyze_if_statement(ifs, allow_jump, return_ty),
            Step::LoopStatement(loops) => self.analyze_loop(loops, return_ty),
            Step::ReturnStatement(ret) => self.analyze_return(ret, allow_jump, return_ty),
            Step::BreakStatement(brk) => self.analyze_break(brk, allow_jump),
            Step::ExprStatement(expr) => self.analyze_expr(expr, allow_jump, return_ty),
        }
    }

    fn analyze_variable_decl(&mut self, decl: &VariableDecl, allow_jump: bool, return_ty: &Type) -> Type {
        let declared_ty = decl.ty.as_ref().map(|label| self.resolve_ty_label(label));
        let init_ty = decl.body.as_ref().map(|body| {
            let ty = self.analyze_expr(body, allow_jump, return_ty);
            if matches!(ty, Type::Void) {
                self.error(errors::void_as_expression(body.span));
            }
            ty
        });

        let final_ty = match (declared_ty, &init_ty) {
            (Some(declared), Some(init)) => {
                if !compare(&declared, init).is_compatible() {
                    let span = decl.body.as_ref().map(|b| b.span).unwrap_or(decl.span);
                    self.error(errors::type_mismatch(&declared, init, span));
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(init)) => init.clone(),
            (None, None) => Type::Invalid,
        };

        let is_defined = decl.body.is_some();
        if self
            .env
            .set(decl.name.clone(), Symbol::Variable { ty: final_ty, is_defined })
            .is_err()
        {
            self.error(errors::duplicate_declaration(&decl.name, decl.span));
        }
        Type::Void
    }

    fn analyze_reference_target(&mut self, target: &WithSpan<ReferenceExpr>, allow_jump: bool, return_ty: &Type) -> ReferenceInfo {
        match &target.value {
            ReferenceExpr::Identifier { name } => match self.env.get(name) {
                Some(Symbol::Variable { ty, is_defined }) => ReferenceInfo { ty, variable_name: Some(name.clone()), is_defined },
                Some(_) => {
                    self.error(errors::invalid_assign_target(target.span));
                    ReferenceInfo { ty: Type::Invalid, variable_name: None, is_defined: true }
                }
                None => {
                    self.error(errors::unknown_identifier(name, target.span));
                    ReferenceInfo { ty: Type::Invalid, variable_name: None, is_defined: true }
                }
            },
            ReferenceExpr::FieldAccess { target: inner, name } => {
                let ty = self.analyze_field_access(inner, name, target.span, allow_jump, return_ty);
                ReferenceInfo { ty, variable_name: None, is_defined: true }
            }
            ReferenceExpr::IndexAccess { .. } => {
                self.error(errors::invalid_assign_target(target.span));
                ReferenceInfo { ty: Type::Invalid, variable_name: None, is_defined: true }
            }
        }
    }

    fn analyze_assign(&mut self, assign: &AssignStatement, allow_jump: bool, return_ty: &Type) -> Type {
        let body_ty = self.analyze_expr(&assign.body, allow_jump, return_ty);
        if matches!(body_ty, Type::Void) {
            self.error(errors::void_as_expression(assign.body.span));
        }
        let target = self.analyze_reference_target(&assign.target, allow_jump, return_ty);

        match assign.mode {
            AssignMode::Assign => {
                if let Some(name) = &target.variable_name {
                    if !target.is_defined {
                        self.env.assign(name, Symbol::Variable { ty: body_ty, is_defined: true });
                        return Type::Void;
                    }
                }
                if !compare(&target.ty, &body_ty).is_compatible() {
                    self.error(errors::type_mismatch(&target.ty, &body_ty, assign.body.span));
                }
            }
            _ => {
                if !supports_arithmetic(&target.ty) {
                    self.error(errors::type_mismatch(&Type::number(), &target.ty, assign.target.span));
                }
                if !supports_arithmetic(&body_ty) {
                    self.error(errors::type_mismatch(&Type::number(), &body_ty, assign.body.span));
                }
            }
        }
        Type::Void
    }

    fn analyze_if(
        &mut self,
        cond: &WithSpan<Expr>,
        then_block: &[WithSpan<Step>],
        else_block: Option<&[WithSpan<Step>]>,
        allow_jump: bool,
        return_ty: &Type,
    ) -> Type {
        let cond_ty = self.analyze_expr(cond, allow_jump, return_ty);
        if !supports_logical(&cond_ty) {
            self.error(errors::type_mismatch(&Type::bool_(), &cond_ty, cond.span));
        }
        let then_ty = self.analyze_block(then_block, allow_jump, return_ty);
        let else_ty = match else_block {
            Some(block) => self.analyze_block(block, allow_jump, return_ty),
            None => Type::Void,
        };
        if matches!(then_ty, Type::Never) {
            return else_ty;
        }
        if matches!(else_ty, Type::Never) {
            return then_ty;
        }
        if compare(&then_ty, &else_ty).is_compatible() {
            then_ty
        } else {
            self.error(errors::type_mismatch(&then_ty, &else_ty, cond.span));
            Type::Invalid
        }
    }

    fn analyze_if_statement(&mut self, ifs: &IfStatement, allow_jump: bool, return_ty: &Type) -> Type {
        self.analyze_if(&ifs.cond, &ifs.then_block, ifs.else_block.as_deref(), allow_jump, return_ty)
    }

    fn analyze_loop(&mut self, loops: &LoopStatement, return_ty: &Type) -> Type {
        let body_ty = self.analyze_block(&loops.block, true, return_ty);
        if !matches!(body_ty, Type::Void | Type::Never) {
            self.error(errors::type_mismatch(&Type::Void, &body_ty, loops.span));
        }
        Type::Void
    }

    fn analyze_return(&mut self, ret: &ReturnStatement, allow_jump: bool, return_ty: &Type) -> Type {
        match &ret.expr {
            Some(expr) => {
                let ty = self.analyze_expr(expr, allow_jump, return_ty);
                if !compare(return_ty, &ty).is_compatible() {
                    self.error(errors::type_mismatch(return_ty, &ty, expr.span));
                }
            }
            None => {
                if !compare(return_ty, &Type::Void).is_compatible() {
                    self.error(errors::type_mismatch(return_ty, &Type::Void, ret.span));
                }
            }
        }
        Type::Never
    }

    fn analyze_break(&mut self, brk: &BreakStatement, allow_jump: bool) -> Type {
        if !allow_jump {
            self.error(errors::break_outside_loop(brk.span));
        }
        Type::Never
    }

    /// `target_ty` being `Named` is not enough on its own: built-in
    /// namespaces (`number`, `string`, ...) and user structs are both
    /// `Named` and both resolve through a `Symbol::Struct`'s field map, so
    /// the real test is whether the name resolves to one.
    fn analyze_field_access(&mut self, target: &WithSpan<Expr>, field: &str, span: Span, allow_jump: bool, return_ty: &Type) -> Type {
        let target_ty = self.analyze_expr(target, allow_jump, return_ty);
        match &target_ty {
            Type::Named { name, .. } => match self.env.get(name) {
                Some(Symbol::Struct { fields, .. }) => match fields.get(field) {
                    Some(field_sym) => field_sym.ty(),
                    None => {
                        self.error(errors::unknown_field(name, field, span));
                        Type::Invalid
                    }
                },
                _ => {
                    self.error(errors::unknown_field(name, field, span));
                    Type::Invalid
                }
            },
            Type::Invalid => Type::Invalid,
            _ => {
                self.error(errors::unknown_field(&type_string(&target_ty), field, span));
                Type::Invalid
            }
        }
    }

    fn analyze_index_access(&mut self, target: &WithSpan<Expr>, index: &WithSpan<Expr>, allow_jump: bool, return_ty: &Type) -> Type {
        let target_ty = self.analyze_expr(target, allow_jump, return_ty);
        if !matches!(target_ty, Type::Invalid) && !compare(&Type::array(), &target_ty).is_compatible() {
            self.error(errors::type_mismatch(&Type::array(), &target_ty, target.span));
        }
        let index_ty = self.analyze_expr(index, allow_jump, return_ty);
        if !supports_index(&index_ty) {
            self.error(errors::type_mismatch(&Type::number(), &index_ty, index.span));
        }
        if !self.saw_index_access {
            self.saw_index_access = true;
            self.warn(errors::array_element_type_unchecked_warning());
        }
        Type::Any
    }

    fn resolve_callee(&mut self, callee: &WithSpan<Expr>, allow_jump: bool, return_ty: &Type) -> Type {
        match &callee.value {
            Expr::Identifier(name) => match self.env.get(name) {
                Some(Symbol::Struct { name: struct_name, .. }) => {
                    self.error(errors::struct_not_callable(&struct_name, callee.span));
                    Type::Invalid
                }
                Some(sym) => {
                    let ty = sym.ty();
                    if matches!(ty, Type::Function { .. }) {
                        ty
                    } else {
                        self.error(errors::invalid_callee(callee.span));
                        Type::Invalid
                    }
                }
                None => {
                    self.error(errors::unknown_identifier(name, callee.span));
                    Type::Invalid
                }
            },
            Expr::FieldAccess { target, name } => {
                let ty = self.analyze_field_access(target, name, callee.span, allow_jump, return_ty);
                if matches!(ty, Type::Function { .. } | Type::Invalid) {
                    ty
                } else {
                    self.error(errors::invalid_callee(callee.span));
                    Type::Invalid
                }
            }
            _ => {
                self.error(errors::invalid_callee(callee.span));
                Type::Invalid
            }
        }
    }

    fn analyze_call(&mut self, callee: &WithSpan<Expr>, args: &[WithSpan<Expr>], span: Span, allow_jump: bool, return_ty: &Type) -> Type {
        let callee_ty = self.resolve_callee(callee, allow_jump, return_ty);
        let (param_types, fn_return_ty) = match &callee_ty {
            Type::Function { param_types, return_type, .. } => (param_types.clone(), (**return_type).clone()),
            _ => (Vec::new(), Type::Invalid),
        };

        if !matches!(callee_ty, Type::Invalid) && args.len() != param_types.len() {
            self.error(errors::argument_count_mismatch(param_types.len(), args.len(), span));
        }

        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.analyze_expr(arg, allow_jump, return_ty);
            if matches!(arg_ty, Type::Void) {
                self.error(errors::void_as_expression(arg.span));
                continue;
            }
            if let Some(expected) = param_types.get(i) {
                if !compare(expected, &arg_ty).is_compatible() {
                    self.error(errors::type_mismatch(expected, &arg_ty, arg.span));
                }
            }
        }

        self.symbol_table.insert(span, Symbol::Expr { ty: fn_return_ty.clone() });
        fn_return_ty
    }

    fn analyze_binary_op(&mut self, operator: BinaryOperator, left: &WithSpan<Expr>, right: &WithSpan<Expr>, span: Span, allow_jump: bool, return_ty: &Type) -> Type {
        let left_ty = self.analyze_expr(left, allow_jump, return_ty);
        let right_ty = self.analyze_expr(right, allow_jump, return_ty);
        if matches!(left_ty, Type::Void) {
            self.error(errors::void_as_expression(left.span));
        }
        if matches!(right_ty, Type::Void) {
            self.error(errors::void_as_expression(right.span));
        }

        let result = match operator.class() {
            OperatorClass::Logical => {
                if !supports_logical(&left_ty) {
                    self.error(errors::type_mismatch(&Type::bool_(), &left_ty, left.span));
                }
                if !supports_logical(&right_ty) {
                    self.error(errors::type_mismatch(&Type::bool_(), &right_ty, right.span));
                }
                left_ty.clone()
            }
            OperatorClass::Ordering => {
                if !supports_ordering(&left_ty) {
                    self.error(errors::type_mismatch(&Type::number(), &left_ty, left.span));
                }
                if !supports_ordering(&right_ty) {
                    self.error(errors::type_mismatch(&Type::number(), &right_ty, right.span));
                }
                Type::bool_()
            }
            OperatorClass::Arithmetic => {
                if !supports_arithmetic(&left_ty) {
                    self.error(errors::type_mismatch(&Type::number(), &left_ty, left.span));
                }
                if !supports_arithmetic(&right_ty) {
                    self.error(errors::type_mismatch(&Type::number(), &right_ty, right.span));
                }
                left_ty.clone()
            }
            OperatorClass::Equivalence => {
                if is_struct_type(&left_ty) || is_struct_type(&right_ty) {
                    self.error(errors::struct_equality_unsupported(span));
                    Type::Invalid
                } else {
                    if !compare(&left_ty, &right_ty).is_compatible() {
                        self.error(errors::type_mismatch(&left_ty, &right_ty, span));
                    }
                    Type::bool_()
                }
            }
        };

        self.symbol_table.insert(span, Symbol::Expr { ty: result.clone() });
        result
    }

    fn analyze_unary_not(&mut self, inner: &WithSpan<Expr>, allow_jump: bool, return_ty: &Type) -> Type {
        let ty = self.analyze_expr(inner, allow_jump, return_ty);
        if !supports_logical(&ty) {
            self.error(errors::type_mismatch(&Type::bool_(), &ty, inner.span));
        }
        ty
    }

    fn analyze_struct_expr(&mut self, name: &str, fields: &[StructExprField], span: Span, allow_jump: bool, return_ty: &Type) -> Type {
        let decl_fields = match self.env.get(name) {
            Some(Symbol::Struct { fields, .. }) => fields,
            Some(_) => {
                self.error(errors::invalid_type_name(name, span));
                return Type::Invalid;
            }
            None => {
                self.error(errors::unknown_identifier(name, span));
                return Type::Invalid;
            }
        };

        let mut seen = std::collections::HashSet::new();
        for field in fields {
            if !seen.insert(field.name.clone()) {
                self.error(errors::duplicate_struct_field(&field.name, field.span));
            }
            let body_ty = self.analyze_expr(&field.body, allow_jump, return_ty);
            match decl_fields.get(&field.name) {
                Some(decl_field) => {
                    let expected = decl_field.ty();
                    if !compare(&expected, &body_ty).is_compatible() {
                        self.error(errors::type_mismatch(&expected, &body_ty, field.body.span));
                    }
                }
                None => {
                    self.error(errors::unknown_field(name, &field.name, field.span));
                }
            }
        }
        for field_name in decl_fields.keys() {
            if !seen.contains(field_name) {
                self.error(errors::missing_struct_field(name, field_name, span));
            }
        }

        Type::named(name)
    }

    fn analyze_expr(&mut self, expr: &WithSpan<Expr>, allow_jump: bool, return_ty: &Type) -> Type {
        match &expr.value {
            Expr::NumberLiteral(_) => Type::number(),
            Expr::BoolLiteral(_) => Type::bool_(),
            Expr::CharLiteral(text) => {
                if text.graphemes(true).count() != 1 {
                    self.error(errors::invalid_char_literal(text, expr.span));
                    Type::Invalid
                } else {
                    Type::char_()
                }
            }
            Expr::StringLiteral(_) => Type::string(),
            Expr::Identifier(name) => match self.env.get(name) {
                Some(Symbol::Variable { ty, is_defined }) => {
                    if !is_defined {
                        self.error(errors::use_before_assign(expr.span));
                    }
                    ty
                }
                Some(sym) => sym.ty(),
                None => {
                    self.error(errors::unknown_identifier(name, expr.span));
                    Type::Invalid
                }
            },
            Expr::FieldAccess { target, name } => self.analyze_field_access(target, name, expr.span, allow_jump, return_ty),
            Expr::IndexAccess { target, index } => self.analyze_index_access(target, index, allow_jump, return_ty),
            Expr::Call { callee, args } => self.analyze_call(callee, args, expr.span, allow_jump, return_ty),
            Expr::BinaryOp { operator, left, right } => self.analyze_binary_op(*operator, left, right, expr.span, allow_jump, return_ty),
            Expr::UnaryNot(inner) => self.analyze_unary_not(inner, allow_jump, return_ty),
            Expr::StructExpr { name, fields } => self.analyze_struct_expr(name, fields, expr.span, allow_jump, return_ty),
            Expr::ArrayNode(items) => {
                for item in items {
                    self.analyze_expr(item, allow_jump, return_ty);
                }
                Type::array()
            }
            Expr::IfExpr { cond, then_block, else_block } => {
                self.analyze_if(cond, then_block, Some(else_block.as_slice()), allow_jump, return_ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FnDeclParam, Span};
    use pretty_assertions::assert_eq;

    fn span(line: u32) -> Span {
        Span::new(line, 1)
    }

    fn num_lit(n: f64, line: u32) -> WithSpan<Expr> {
        WithSpan::new(Expr::NumberLiteral(n), span(line))
    }

    #[test]
    fn empty_file_succeeds() {
        let file = SourceFile::default();
        let result = analyze(&file, &AnalyzeOptions::default());
        assert!(result.success);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn duplicate_function_is_an_error() {
        let func = FunctionDecl {
            name: "main".to_string(),
            params: vec![],
            return_ty: None,
            body: vec![],
            exported: false,
            span: span(1),
        };
        let mut second = func.clone();
        second.span = span(2);
        let file = SourceFile { functions: vec![func, second], structs: vec![] };
        let result = analyze(&file, &AnalyzeOptions::default());
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn unknown_return_type_is_invalid() {
        let func = FunctionDecl {
            name: "main".to_string(),
            params: vec![],
            return_ty: Some(TyLabel { name: "Nonexistent".to_string(), span: span(1) }),
            body: vec![WithSpan::new(Step::ExprStatement(num_lit(1.0, 2)), span(2))],
            exported: false,
            span: span(1),
        };
        let file = SourceFile { functions: vec![func], structs: vec![] };
        let result = analyze(&file, &AnalyzeOptions::default());
        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.contains("unknown type")));
    }

    #[test]
    fn break_outside_loop_is_reported() {
        let func = FunctionDecl {
            name: "main".to_string(),
            params: vec![],
            return_ty: None,
            body: vec![WithSpan::new(
                Step::BreakStatement(BreakStatement { span: span(2) }),
                span(2),
            )],
            exported: false,
            span: span(1),
        };
        let file = SourceFile { functions: vec![func], structs: vec![] };
        let result = analyze(&file, &AnalyzeOptions::default());
        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.contains("break")));
    }

    #[test]
    fn well_typed_function_has_no_errors() {
        let param = FnDeclParam {
            name: "n".to_string(),
            ty: TyLabel { name: "number".to_string(), span: span(1) },
            span: span(1),
        };
        let func = FunctionDecl {
            name: "identity".to_string(),
            params: vec![param],
            return_ty: Some(TyLabel { name: "number".to_string(), span: span(1) }),
            body: vec![WithSpan::new(
                Step::ReturnStatement(ReturnStatement {
                    expr: Some(WithSpan::new(Expr::Identifier("n".to_string()), span(2))),
                    span: span(2),
                }),
                span(2),
            )],
            exported: false,
            span: span(1),
        };
        let file = SourceFile { functions: vec![func], structs: vec![] };
        let result = analyze(&file, &AnalyzeOptions::default());
        assert!(result.success, "{:?}", result.errors);
    }

    #[test]
    fn array_element_type_warning_is_emitted_once_per_analysis() {
        let array_lit = WithSpan::new(Expr::ArrayNode(vec![num_lit(1.0, 1)]), span(1));
        let index_access = |line: u32| {
            WithSpan::new(
                Expr::IndexAccess {
                    target: Box::new(array_lit.clone()),
                    index: Box::new(num_lit(0.0, line)),
                },
                span(line),
            )
        };
        let func = FunctionDecl {
            name: "main".to_string(),
            params: vec![],
            return_ty: None,
            body: vec![
                WithSpan::new(Step::ExprStatement(index_access(2)), span(2)),
                WithSpan::new(Step::ExprStatement(index_access(3)), span(3)),
            ],
            exported: false,
            span: span(1),
        };
        let file = SourceFile { functions: vec![func], structs: vec![] };
        let result = analyze(&file, &AnalyzeOptions::default());
        assert!(result.success, "{:?}", result.errors);
        let warning_count = result.warnings.iter().filter(|w| w.contains("array elements")).count();
        assert_eq!(warning_count, 1, "{:?}", result.warnings);
    }
}
