//! The host-provided built-in surface: pure functions over runtime
//! `Value`s, grouped into pseudo-struct bindings
//! (`number`, `char`, `string`, `array`, `console`) plus the top-level
//! `getUnixtime`. Implementations of `console.write`/`console.writeNum`/
//! `console.read` are the only ones that touch `HostOptions`; everything
//! else is a pure primitive, the same way a standard library's `len` or
//! `parse` belongs with the language runtime rather than with host I/O
//! wiring.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::env::Environment;
use crate::errors::EvalError;
use crate::host::HostOptions;
use crate::symbol::{FnParam, Symbol};
use crate::types::Type;
use crate::value::{Binding, FunctionValue, NativeHandler, Slot, Value};

struct BuiltinFn {
    name: &'static str,
    params: Vec<&'static str>,
    param_types: Vec<Type>,
    return_type: Type,
    handler: NativeHandler,
}

fn fn_type(b: &BuiltinFn) -> Type {
    Type::Function {
        is_method: false,
        type_params: vec![],
        param_types: b.param_types.clone(),
        return_type: Box::new(b.return_type.clone()),
    }
}

fn arg_number(args: &[Value], i: usize) -> Result<f64, EvalError> {
    args.get(i)
        .and_then(Value::as_number)
        .ok_or_else(|| EvalError::General {
            message: format!("expected a number argument at position {i}"),
        })
}

fn arg_string<'a>(args: &'a [Value], i: usize) -> Result<&'a str, EvalError> {
    match args.get(i) {
        Some(Value::String(s)) => Ok(s.as_str()),
        _ => Err(EvalError::General {
            message: format!("expected a string argument at position {i}"),
        }),
    }
}

fn arg_char<'a>(args: &'a [Value], i: usize) -> Result<&'a str, EvalError> {
    match args.get(i) {
        Some(Value::Char(c)) => Ok(c.as_str()),
        _ => Err(EvalError::General {
            message: format!("expected a char argument at position {i}"),
        }),
    }
}

fn arg_array(args: &[Value], i: usize) -> Result<crate::value::ArrayValue, EvalError> {
    match args.get(i) {
        Some(Value::Array(a)) => Ok(a.clone()),
        _ => Err(EvalError::General {
            message: format!("expected an array argument at position {i}"),
        }),
    }
}

fn native(
    name: &'static str,
    params: &[&'static str],
    param_types: Vec<Type>,
    return_type: Type,
    handler: impl Fn(&[Value], &mut HostOptions) -> Result<Value, EvalError> + 'static,
) -> BuiltinFn {
    BuiltinFn {
        name,
        params: params.to_vec(),
        param_types,
        return_type,
        handler: Rc::new(handler),
    }
}

/// A second name for an existing entry, sharing its handler — e.g.
/// `string.fromArray` is just another name for `string.fromChars`.
fn alias(name: &'static str, original: &BuiltinFn) -> BuiltinFn {
    BuiltinFn {
        name,
        params: original.params.clone(),
        param_types: original.param_types.clone(),
        return_type: original.return_type.clone(),
        handler: Rc::clone(&original.handler),
    }
}

fn number_builtins() -> Vec<BuiltinFn> {
    vec![
        native(
            "parse",
            &["text"],
            vec![Type::string()],
            Type::number(),
            |args, _| {
                let text = arg_string(args, 0)?;
                Ok(Value::Number(text.trim().parse::<f64>().unwrap_or(f64::NAN)))
            },
        ),
        native(
            "toString",
            &["value"],
            vec![Type::number()],
            Type::string(),
            |args, _| Ok(Value::String(arg_number(args, 0)?.to_string())),
        ),
        native(
            "assertEq",
            &["expected", "actual"],
            vec![Type::number(), Type::number()],
            Type::Void,
            |args, _| {
                let a = arg_number(args, 0)?;
                let b = arg_number(args, 1)?;
                if a == b {
                    Ok(Value::None)
                } else {
                    Err(EvalError::General {
                        message: format!("assertion failed: {a} != {b}"),
                    })
                }
            },
        ),
    ]
}

fn char_builtins() -> Vec<BuiltinFn> {
    vec![
        native(
            "fromNumber",
            &["code"],
            vec![Type::number()],
            Type::char_(),
            |args, _| {
                let n = arg_number(args, 0)?;
                let code = n as u32;
                let ch = char::from_u32(code).ok_or_else(|| EvalError::General {
                    message: format!("{code} is not a valid unicode code point"),
                })?;
                Ok(Value::Char(ch.to_string()))
            },
        ),
        native(
            "toNumber",
            &["c"],
            vec![Type::char_()],
            Type::number(),
            |args, _| {
                let c = arg_char(args, 0)?;
                let code = c.chars().next().map(|c| c as u32).unwrap_or(0);
                Ok(Value::Number(code as f64))
            },
        ),
        native(
            "toString",
            &["c"],
            vec![Type::char_()],
            Type::string(),
            |args, _| Ok(Value::String(arg_char(args, 0)?.to_string())),
        ),
    ]
}

fn string_builtins() -> Vec<BuiltinFn> {
    let from_chars = native(
        "fromChars",
        &["items"],
        vec![Type::array()],
        Type::string(),
        |args, _| {
            let items = arg_array(args, 0)?;
            let items = items.borrow();
            let mut out = String::new();
            for slot in items.iter() {
                match slot.read() {
                    Some(Value::Char(c)) => out.push_str(c),
                    Some(Value::String(s)) => out.push_str(s),
                    _ => {
                        return Err(EvalError::General {
                            message: "string.fromChars expects chars or strings".to_string(),
                        })
                    }
                }
            }
            Ok(Value::String(out))
        },
    );
    let to_chars = native(
        "toChars",
        &["text"],
        vec![Type::string()],
        Type::array(),
        |args, _| {
            let text = arg_string(args, 0)?;
            let items: Vec<Slot> = text
                .graphemes(true)
                .map(|g| Slot::filled(Value::Char(g.to_string())))
                .collect();
            Ok(Value::Array(Rc::new(RefCell::new(items))))
        },
    );
    let from_array = alias("fromArray", &from_chars);
    let to_array = alias("toArray", &to_chars);
    vec![
        native(
            "concat",
            &["a", "b"],
            vec![Type::string(), Type::string()],
            Type::string(),
            |args, _| {
                let a = arg_string(args, 0)?;
                let b = arg_string(args, 1)?;
                Ok(Value::String(format!("{a}{b}")))
            },
        ),
        from_chars,
        to_chars,
        from_array,
        to_array,
        native(
            "assertEq",
            &["expected", "actual"],
            vec![Type::string(), Type::string()],
            Type::Void,
            |args, _| {
                let a = arg_string(args, 0)?;
                let b = arg_string(args, 1)?;
                if a == b {
                    Ok(Value::None)
                } else {
                    Err(EvalError::General {
                        message: format!("assertion failed: \"{a}\" != \"{b}\""),
                    })
                }
            },
        ),
    ]
}

fn array_builtins() -> Vec<BuiltinFn> {
    vec![
        native(
            "insert",
            &["items", "index", "value"],
            vec![Type::array(), Type::number(), Type::Any],
            Type::Void,
            |args, _| {
                let items = arg_array(args, 0)?;
                let index = arg_number(args, 1)? as usize;
                let value = args.get(2).cloned().unwrap_or(Value::None);
                let mut items = items.borrow_mut();
                if index > items.len() {
                    return Err(EvalError::General {
                        message: format!("index {index} out of bounds"),
                    });
                }
                items.insert(index, Slot::filled(value));
                Ok(Value::None)
            },
        ),
        native(
            "add",
            &["items", "value"],
            vec![Type::array(), Type::Any],
            Type::Void,
            |args, _| {
                let items = arg_array(args, 0)?;
                let value = args.get(1).cloned().unwrap_or(Value::None);
                items.borrow_mut().push(Slot::filled(value));
                Ok(Value::None)
            },
        ),
        native(
            "removeAt",
            &["items", "index"],
            vec![Type::array(), Type::number()],
            Type::Void,
            |args, _| {
                let items = arg_array(args, 0)?;
                let index = arg_number(args, 1)? as usize;
                let mut items = items.borrow_mut();
                if index >= items.len() {
                    return Err(EvalError::General {
                        message: format!("index {index} out of bounds"),
                    });
                }
                items.remove(index);
                Ok(Value::None)
            },
        ),
        native(
            "count",
            &["items"],
            vec![Type::array()],
            Type::number(),
            |args, _| Ok(Value::Number(arg_array(args, 0)?.borrow().len() as f64)),
        ),
    ]
}

fn console_builtins() -> Vec<BuiltinFn> {
    vec![
        native(
            "write",
            &["text"],
            vec![Type::string()],
            Type::Void,
            |args, host| {
                let text = arg_string(args, 0)?;
                host.write_stdout(text);
                Ok(Value::None)
            },
        ),
        native(
            "writeNum",
            &["value"],
            vec![Type::number()],
            Type::Void,
            |args, host| {
                let n = arg_number(args, 0)?;
                host.write_stdout(&n.to_string());
                Ok(Value::None)
            },
        ),
        native(
            "read",
            &[],
            vec![],
            Type::string(),
            |_args, host| Ok(Value::String(host.read_stdin()?)),
        ),
    ]
}

fn unix_time_builtin() -> BuiltinFn {
    native("getUnixtime", &[], vec![], Type::number(), |_args, _| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Ok(Value::Number(secs))
    })
}

fn namespaces() -> Vec<(&'static str, Vec<BuiltinFn>)> {
    vec![
        ("number", number_builtins()),
        ("char", char_builtins()),
        ("string", string_builtins()),
        ("array", array_builtins()),
        ("console", console_builtins()),
    ]
}

/// Registers the `number`/`char`/`string`/`array`/`console` struct symbols
/// and `getUnixtime` into an analyzer environment's root frame.
pub fn register_builtin_symbols(env: &Environment<Symbol>) {
    for (namespace, fns) in namespaces() {
        let mut fields = IndexMap::new();
        for f in &fns {
            fields.insert(
                f.name.to_string(),
                Symbol::NativeFn {
                    params: f.params.iter().map(|p| FnParam { name: p.to_string() }).collect(),
                    ty: fn_type(f),
                },
            );
        }
        env.set(
            namespace,
            Symbol::Struct {
                name: namespace.to_string(),
                fields,
            },
        )
        .expect("builtin namespaces are registered once into a fresh root frame");
    }
    let top = unix_time_builtin();
    env.set(
        "getUnixtime",
        Symbol::NativeFn {
            params: vec![],
            ty: fn_type(&top),
        },
    )
    .expect("builtin namespaces are registered once into a fresh root frame");
}

/// Registers the matching runtime bindings into an evaluator environment's
/// root frame.
pub fn register_builtin_bindings(env: &Environment<Binding>) {
    for (namespace, fns) in namespaces() {
        let mut fields = IndexMap::new();
        for f in fns {
            fields.insert(
                f.name.to_string(),
                Slot::filled(Value::Function(FunctionValue::Native {
                    name: format!("{namespace}.{}", f.name),
                    handler: f.handler,
                })),
            );
        }
        env.set(
            namespace,
            Slot::filled(Value::Struct(Rc::new(RefCell::new(fields)))),
        )
        .expect("builtin namespaces are registered once into a fresh root frame");
    }
    let top = unix_time_builtin();
    env.set(
        "getUnixtime",
        Slot::filled(Value::Function(FunctionValue::Native {
            name: "getUnixtime".to_string(),
            handler: top.handler,
        })),
    )
    .expect("builtin namespaces are registered once into a fresh root frame");
}
