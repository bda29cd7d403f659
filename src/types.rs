//! The closed algebraic type lattice used by the semantic analyzer.
//! Stateless: every operation here is a pure function of its arguments.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    /// Produced after an error; absorbs further errors.
    Invalid,
    /// Placeholder while inference is pending.
    Unresolved,
    /// Element type of arrays; compatible with everything except `Void`.
    Any,
    /// Absence of a value.
    Void,
    /// An expression that cannot complete normally (diverges via return or
    /// break); compatible with any expected type.
    Never,
    Named {
        name: String,
        type_params: Vec<Type>,
    },
    Function {
        is_method: bool,
        type_params: Vec<Type>,
        param_types: Vec<Type>,
        return_type: Box<Type>,
    },
}

impl Type {
    pub fn named(name: impl Into<String>) -> Type {
        Type::Named {
            name: name.into(),
            type_params: Vec::new(),
        }
    }

    pub fn number() -> Type {
        Type::named("number")
    }

    pub fn bool_() -> Type {
        Type::named("bool")
    }

    pub fn char_() -> Type {
        Type::named("char")
    }

    pub fn string() -> Type {
        Type::named("string")
    }

    pub fn array() -> Type {
        Type::named("array")
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Type::Named { name, .. } if name == "number")
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Named { name, .. } if name == "bool")
    }
}

/// The three-valued result of comparing two types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Compatible,
    Incompatible,
    Unknown,
}

impl Compare {
    pub fn is_compatible(self) -> bool {
        matches!(self, Compare::Compatible)
    }
}

/// Compares `expected` against `actual`: does a value/expression of type
/// `actual` satisfy a position that requires `expected`?
pub fn compare(expected: &Type, actual: &Type) -> Compare {
    if matches!(expected, Type::Invalid | Type::Unresolved)
        || matches!(actual, Type::Invalid | Type::Unresolved)
    {
        return Compare::Unknown;
    }
    if matches!(actual, Type::Never) || matches!(expected, Type::Never) {
        return Compare::Compatible;
    }
    if matches!(expected, Type::Any) || matches!(actual, Type::Any) {
        return if matches!(expected, Type::Void) || matches!(actual, Type::Void) {
            Compare::Incompatible
        } else {
            Compare::Compatible
        };
    }
    match (expected, actual) {
        (Type::Void, Type::Void) => Compare::Compatible,
        (
            Type::Named {
                name: n1,
                type_params: p1,
            },
            Type::Named {
                name: n2,
                type_params: p2,
            },
        ) => {
            if n1 != n2 || p1.len() != p2.len() {
                return Compare::Incompatible;
            }
            for (a, b) in p1.iter().zip(p2.iter()) {
                match compare(a, b) {
                    Compare::Compatible => {}
                    other => return other,
                }
            }
            Compare::Compatible
        }
        (
            Type::Function {
                is_method: m1,
                param_types: p1,
                return_type: r1,
                ..
            },
            Type::Function {
                is_method: m2,
                param_types: p2,
                return_type: r2,
                ..
            },
        ) => {
            if m1 != m2 || p1.len() != p2.len() {
                return Compare::Incompatible;
            }
            for (a, b) in p1.iter().zip(p2.iter()) {
                match compare(a, b) {
                    Compare::Compatible => {}
                    other => return other,
                }
            }
            compare(r1, r2)
        }
        _ => Compare::Incompatible,
    }
}

/// Renders a type for diagnostics.
pub fn type_string(ty: &Type) -> String {
    match ty {
        Type::Invalid | Type::Unresolved => "?".to_string(),
        Type::Any => "any".to_string(),
        Type::Void => "void".to_string(),
        Type::Never => "never".to_string(),
        Type::Named { name, type_params } => {
            if type_params.is_empty() {
                name.clone()
            } else {
                let inner: Vec<String> = type_params.iter().map(type_string).collect();
                format!("{}<{}>", name, inner.join(", "))
            }
        }
        Type::Function {
            param_types,
            return_type,
            ..
        } => {
            let params: Vec<String> = param_types.iter().map(type_string).collect();
            format!("fn({}) -> {}", params.join(", "), type_string(return_type))
        }
    }
}

pub fn supports_logical(ty: &Type) -> bool {
    compare(&Type::bool_(), ty).is_compatible()
}

pub fn supports_ordering(ty: &Type) -> bool {
    compare(&Type::number(), ty).is_compatible()
}

pub fn supports_arithmetic(ty: &Type) -> bool {
    compare(&Type::number(), ty).is_compatible()
}

pub fn supports_index(ty: &Type) -> bool {
    compare(&Type::number(), ty).is_compatible()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reflexive_for_complete_types() {
        for ty in [
            Type::Void,
            Type::number(),
            Type::bool_(),
            Type::array(),
            Type::Function {
                is_method: false,
                type_params: vec![],
                param_types: vec![Type::number()],
                return_type: Box::new(Type::bool_()),
            },
        ] {
            assert_eq!(compare(&ty, &ty), Compare::Compatible, "{ty:?}");
        }
    }

    #[test]
    fn any_incompatible_with_void_only() {
        assert_eq!(compare(&Type::Any, &Type::Void), Compare::Incompatible);
        assert_eq!(compare(&Type::Void, &Type::Any), Compare::Incompatible);
        assert_eq!(compare(&Type::Any, &Type::number()), Compare::Compatible);
        assert_eq!(compare(&Type::string(), &Type::Any), Compare::Compatible);
    }

    #[test]
    fn never_compatible_with_anything() {
        assert_eq!(compare(&Type::number(), &Type::Never), Compare::Compatible);
        assert_eq!(compare(&Type::Never, &Type::Void), Compare::Compatible);
    }

    #[test]
    fn unresolved_and_invalid_are_unknown() {
        assert_eq!(compare(&Type::Unresolved, &Type::number()), Compare::Unknown);
        assert_eq!(compare(&Type::number(), &Type::Invalid), Compare::Unknown);
    }

    #[test]
    fn named_struct_mismatch_is_incompatible() {
        assert_eq!(
            compare(&Type::named("Point"), &Type::named("Vector")),
            Compare::Incompatible
        );
    }

    #[test]
    fn type_string_formats() {
        assert_eq!(type_string(&Type::Any), "any");
        assert_eq!(type_string(&Type::Unresolved), "?");
        assert_eq!(
            type_string(&Type::Function {
                is_method: false,
                type_params: vec![],
                param_types: vec![Type::number(), Type::bool_()],
                return_type: Box::new(Type::string()),
            }),
            "fn(number, bool) -> string"
        );
    }
}
