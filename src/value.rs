//! Runtime values. Structs and arrays use shared, interior mutability so
//! that two bindings that alias the same struct/array observe each
//! other's writes.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::FunctionDecl;
use crate::env::Environment;
use crate::errors::EvalError;
use crate::host::HostOptions;

/// A mutable cell holding an optional runtime value: models a
/// declared-but-unassigned variable or struct field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot(pub Option<Value>);

impl Slot {
    pub fn empty() -> Self {
        Slot(None)
    }

    pub fn filled(value: Value) -> Self {
        Slot(Some(value))
    }

    pub fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    pub fn read(&self) -> Option<&Value> {
        self.0.as_ref()
    }
}

/// The payload an evaluator `Environment` stores per name.
pub type Binding = Slot;

pub type StructValue = Rc<RefCell<IndexMap<String, Slot>>>;
pub type ArrayValue = Rc<RefCell<Vec<Slot>>>;

/// A native function implementation, supplied by the host.
pub type NativeHandler = Rc<dyn Fn(&[Value], &mut HostOptions) -> Result<Value, EvalError>>;

#[derive(Clone)]
pub enum FunctionValue {
    User {
        decl: Rc<FunctionDecl>,
        captured_env: Environment<Binding>,
    },
    Native {
        name: String,
        handler: NativeHandler,
    },
}

impl std::fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionValue::User { decl, .. } => {
                write!(f, "FunctionValue::User({})", decl.name)
            }
            FunctionValue::Native { name, .. } => write!(f, "FunctionValue::Native({name})"),
        }
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionValue::User { decl: a, .. }, FunctionValue::User { decl: b, .. }) => {
                Rc::ptr_eq(a, b)
            }
            (
                FunctionValue::Native { handler: a, .. },
                FunctionValue::Native { handler: b, .. },
            ) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Number(f64),
    Bool(bool),
    /// A single grapheme cluster.
    Char(String),
    String(String),
    Struct(StructValue),
    Array(ArrayValue),
    Function(FunctionValue),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "void",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Struct(_) => "struct",
            Value::Array(_) => "array",
            Value::Function(_) => "fn",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "void"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Struct(_) => write!(f, "<struct>"),
            Value::Array(items) => {
                let items = items.borrow();
                write!(
                    f,
                    "[{}]",
                    items
                        .iter()
                        .map(|s| s.read().map(ToString::to_string).unwrap_or_default())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Function(_) => write!(f, "<fn>"),
        }
    }
}
