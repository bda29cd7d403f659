//! Analysis-time symbols. The evaluator's environment stores runtime
//! bindings instead (see `value::Binding`); the two share the same
//! `Environment<T>` scoping mechanism (`env.rs`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::Type;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnParam {
    pub name: String,
}

/// A local variable observed while analyzing a function body; kept for
/// diagnostics and for tooling built on top of the analyzer (e.g. an
/// editor wanting a function's local symbol table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnVar {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Symbol {
    Fn {
        params: Vec<FnParam>,
        ty: Type,
        vars: Vec<FnVar>,
    },
    NativeFn {
        params: Vec<FnParam>,
        ty: Type,
    },
    Struct {
        name: String,
        fields: IndexMap<String, Symbol>,
    },
    Variable {
        ty: Type,
        is_defined: bool,
    },
    /// Attached to call sites and binary-op nodes so later passes (and
    /// tests) can read the inferred type of an expression node.
    Expr {
        ty: Type,
    },
}

impl Symbol {
    pub fn ty(&self) -> Type {
        match self {
            Symbol::Fn { ty, .. } => ty.clone(),
            Symbol::NativeFn { ty, .. } => ty.clone(),
            Symbol::Struct { name, .. } => Type::named(name.clone()),
            Symbol::Variable { ty, .. } => ty.clone(),
            Symbol::Expr { ty } => ty.clone(),
        }
    }

    pub fn as_struct(&self) -> Option<(&str, &IndexMap<String, Symbol>)> {
        match self {
            Symbol::Struct { name, fields } => Some((name.as_str(), fields)),
            _ => None,
        }
    }
}
