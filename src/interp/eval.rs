//! Tree-walking evaluator
//!
//! Every node evaluates against a [`Closure`] (the current scope) and a
//! [`Context`] (the output sink). Evaluation threads an [`Unwind`] channel:
//! `return` raises `Unwind::Return`, which every sequencing node propagates
//! with `?` and only [`Stmt::MethodBody`] consumes. Runtime failures travel
//! the same channel as `Unwind::Error` and pass through method bodies
//! untouched.

use std::io::{self, Write};

use crate::ast::{BinaryOp, Expr, Stmt};
use crate::diagnostics::RuntimeError;

use super::context::{Context, DummyContext};
use super::ops;
use super::value::{
    is_true, Closure, Instance, Value, ValueRef, ADD_METHOD, INIT_METHOD, SELF, STR_METHOD,
};

/// Non-local transfer raised during evaluation.
#[derive(Debug)]
pub enum Unwind {
    /// A `return` travelling to the enclosing method body.
    Return(ValueRef),
    /// A runtime failure travelling to the top-level caller.
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Unwind {
        Unwind::Error(error)
    }
}

impl From<io::Error> for Unwind {
    fn from(error: io::Error) -> Unwind {
        Unwind::Error(RuntimeError::Output(error))
    }
}

/// Execute a statement.
pub fn eval_stmt(
    stmt: &Stmt,
    env: &mut Closure,
    ctx: &mut dyn Context,
) -> Result<ValueRef, Unwind> {
    match stmt {
        Stmt::Assignment { name, value } => {
            let value = eval_expr(value, env, ctx)?;
            let alias = value.share();
            env.insert(name.clone(), value);
            Ok(alias)
        }

        Stmt::FieldAssignment {
            object,
            field,
            value,
        } => {
            let object = eval_expr(object, env, ctx)?;
            let Some(instance) = object.as_instance() else {
                return Err(RuntimeError::NotAnObject.into());
            };
            let value = eval_expr(value, env, ctx)?;
            let alias = value.share();
            instance.set_field(field, value);
            Ok(alias)
        }

        Stmt::Print(args) => {
            let mut last = ValueRef::none();
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(ctx.output(), " ")?;
                }
                last = eval_expr(arg, env, ctx)?;
                let mut rendered = Vec::new();
                write_value(&last, &mut rendered, ctx)?;
                ctx.output().write_all(&rendered).map_err(Unwind::from)?;
            }
            writeln!(ctx.output())?;
            Ok(last)
        }

        Stmt::Expression(expr) => eval_expr(expr, env, ctx),

        Stmt::Compound(stmts) => {
            for stmt in stmts {
                eval_stmt(stmt, env, ctx)?;
            }
            Ok(ValueRef::none())
        }

        Stmt::IfElse {
            condition,
            then_body,
            else_body,
        } => {
            let condition = eval_expr(condition, env, ctx)?;
            if is_true(&condition) {
                eval_stmt(then_body, env, ctx)
            } else if let Some(else_body) = else_body {
                eval_stmt(else_body, env, ctx)
            } else {
                Ok(ValueRef::none())
            }
        }

        Stmt::ClassDefinition(class) => {
            let value = ValueRef::own(Value::Class(class.clone()));
            let alias = value.share();
            env.insert(class.name().to_string(), value);
            Ok(alias)
        }

        Stmt::Return(expr) => {
            let value = match expr {
                Some(expr) => eval_expr(expr, env, ctx)?,
                None => ValueRef::none(),
            };
            Err(Unwind::Return(value))
        }

        Stmt::MethodBody(body) => match eval_stmt(body, env, ctx) {
            Ok(_) => Ok(ValueRef::none()),
            Err(Unwind::Return(value)) => Ok(value),
            Err(error) => Err(error),
        },
    }
}

/// Evaluate an expression.
pub fn eval_expr(
    expr: &Expr,
    env: &mut Closure,
    ctx: &mut dyn Context,
) -> Result<ValueRef, Unwind> {
    match expr {
        Expr::None => Ok(ValueRef::own(Value::None)),
        Expr::Number(n) => Ok(ValueRef::own(Value::Number(*n))),
        Expr::Bool(b) => Ok(ValueRef::own(Value::Bool(*b))),
        Expr::Str(s) => Ok(ValueRef::own(Value::String(s.clone()))),

        Expr::Variable(path) => Ok(lookup_variable(path, env)?),

        Expr::Stringify(argument) => {
            let value = eval_expr(argument, env, ctx)?;
            let mut buffer = Vec::new();
            let mut dummy = DummyContext::new();
            write_value(&value, &mut buffer, &mut dummy)?;
            Ok(ValueRef::own(Value::String(buffer)))
        }

        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, env, ctx)?;

            // Short-circuit before touching the right-hand side.
            match op {
                BinaryOp::And => {
                    if !is_true(&lhs) {
                        return Ok(ValueRef::own(Value::Bool(false)));
                    }
                    let rhs = eval_expr(rhs, env, ctx)?;
                    return Ok(ValueRef::own(Value::Bool(is_true(&rhs))));
                }
                BinaryOp::Or => {
                    if is_true(&lhs) {
                        return Ok(ValueRef::own(Value::Bool(true)));
                    }
                    let rhs = eval_expr(rhs, env, ctx)?;
                    return Ok(ValueRef::own(Value::Bool(is_true(&rhs))));
                }
                _ => {}
            }

            let rhs = eval_expr(rhs, env, ctx)?;
            Ok(eval_binary(*op, &lhs, &rhs, ctx)?)
        }

        Expr::Comparison { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, env, ctx)?;
            let rhs = eval_expr(rhs, env, ctx)?;
            let result = ops::compare(*op, &lhs, &rhs, ctx)?;
            Ok(ValueRef::own(Value::Bool(result)))
        }

        Expr::Not(argument) => {
            let value = eval_expr(argument, env, ctx)?;
            Ok(ValueRef::own(Value::Bool(!is_true(&value))))
        }

        Expr::NewInstance { class, args } => {
            let instance = ValueRef::own(Value::Instance(Instance::new(class.clone())));
            let has_init = class
                .method(INIT_METHOD)
                .is_some_and(|method| method.formal_params.len() == args.len());
            if has_init {
                let mut actuals = Vec::with_capacity(args.len());
                for arg in args {
                    actuals.push(eval_expr(arg, env, ctx)?);
                }
                call_method(&instance, INIT_METHOD, actuals, ctx)?;
            }
            Ok(instance)
        }

        Expr::MethodCall {
            object,
            method,
            args,
        } => {
            let object = eval_expr(object, env, ctx)?;
            let mut actuals = Vec::with_capacity(args.len());
            for arg in args {
                actuals.push(eval_expr(arg, env, ctx)?);
            }
            Ok(call_method(&object, method, actuals, ctx)?)
        }
    }
}

/// Resolve a dotted name: the head in the scope, every further segment in
/// the fields of the instance reached so far.
fn lookup_variable(path: &[String], env: &Closure) -> Result<ValueRef, RuntimeError> {
    let Some((first, rest)) = path.split_first() else {
        return Err(RuntimeError::UnknownVariable(String::new()));
    };
    let mut value = env
        .get(first)
        .ok_or_else(|| RuntimeError::UnknownVariable(first.clone()))?
        .share();
    for segment in rest {
        let next = {
            let Some(instance) = value.as_instance() else {
                return Err(RuntimeError::NotAnObject);
            };
            instance
                .field(segment)
                .ok_or_else(|| RuntimeError::UnknownField(segment.clone()))?
        };
        value = next;
    }
    Ok(value)
}

/// Arithmetic dispatch. `+` also concatenates strings and delegates to
/// `__add__` on an instance left-hand side; the rest are number-only.
fn eval_binary(
    op: BinaryOp,
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<ValueRef, RuntimeError> {
    match op {
        BinaryOp::Add => match (lhs.get(), rhs.get()) {
            (Some(Value::Number(a)), Some(Value::Number(b))) => {
                Ok(ValueRef::own(Value::Number(a.wrapping_add(*b))))
            }
            (Some(Value::String(a)), Some(Value::String(b))) => {
                let mut bytes = a.clone();
                bytes.extend_from_slice(b);
                Ok(ValueRef::own(Value::String(bytes)))
            }
            (Some(Value::Instance(instance)), _) if instance.has_method(ADD_METHOD, 1) => {
                call_method(lhs, ADD_METHOD, vec![rhs.share()], ctx)
            }
            _ => Err(RuntimeError::InvalidArguments { op: op.as_str() }),
        },
        BinaryOp::Sub => match (lhs.get(), rhs.get()) {
            (Some(Value::Number(a)), Some(Value::Number(b))) => {
                Ok(ValueRef::own(Value::Number(a.wrapping_sub(*b))))
            }
            _ => Err(RuntimeError::InvalidArguments { op: op.as_str() }),
        },
        BinaryOp::Mul => match (lhs.get(), rhs.get()) {
            (Some(Value::Number(a)), Some(Value::Number(b))) => {
                Ok(ValueRef::own(Value::Number(a.wrapping_mul(*b))))
            }
            _ => Err(RuntimeError::InvalidArguments { op: op.as_str() }),
        },
        BinaryOp::Div => match (lhs.get(), rhs.get()) {
            (Some(Value::Number(a)), Some(Value::Number(b))) => {
                if *b == 0 {
                    return Err(RuntimeError::DivideByZero);
                }
                // Truncates toward zero; MIN / -1 wraps instead of trapping.
                Ok(ValueRef::own(Value::Number(a.wrapping_div(*b))))
            }
            _ => Err(RuntimeError::InvalidArguments { op: op.as_str() }),
        },
        // Non-short-circuit fallback; normally intercepted in `eval_expr`.
        BinaryOp::And => Ok(ValueRef::own(Value::Bool(is_true(lhs) && is_true(rhs)))),
        BinaryOp::Or => Ok(ValueRef::own(Value::Bool(is_true(lhs) || is_true(rhs)))),
    }
}

/// Dispatch `method` on `object`, which must be an instance.
///
/// The call frame is fresh: formal parameters bound to the actuals, plus
/// `self` aliasing the receiver. The caller's scope is never visible to
/// the method body.
pub fn call_method(
    object: &ValueRef,
    method: &str,
    actuals: Vec<ValueRef>,
    ctx: &mut dyn Context,
) -> Result<ValueRef, RuntimeError> {
    let Some(instance) = object.as_instance() else {
        return Err(RuntimeError::NotAnObject);
    };
    let found = instance
        .class()
        .method(method)
        .filter(|m| m.formal_params.len() == actuals.len());
    let Some(method) = found else {
        return Err(RuntimeError::MethodNotImplemented(method.to_string()));
    };

    let mut frame = Closure::default();
    for (param, value) in method.formal_params.iter().zip(actuals) {
        frame.insert(param.clone(), value);
    }
    frame.insert(SELF.to_string(), object.share());

    match eval_stmt(&method.body, &mut frame, ctx) {
        Ok(value) => Ok(value),
        Err(Unwind::Return(value)) => Ok(value),
        Err(Unwind::Error(error)) => Err(error),
    }
}

/// Render a value into `out` exactly as `print` would.
///
/// An instance with a `__str__/0` method is rendered through it; the
/// method body runs under `ctx`, so passing a [`DummyContext`] suppresses
/// any output it would produce. An instance without one is rendered as an
/// identity string.
pub fn write_value(
    value: &ValueRef,
    out: &mut dyn Write,
    ctx: &mut dyn Context,
) -> Result<(), RuntimeError> {
    match value.get() {
        None | Some(Value::None) => write!(out, "None")?,
        Some(Value::Number(n)) => write!(out, "{}", n)?,
        Some(Value::Bool(b)) => write!(out, "{}", if *b { "True" } else { "False" })?,
        Some(Value::String(s)) => out.write_all(s)?,
        Some(Value::Class(class)) => write!(out, "Class {}", class.name())?,
        Some(Value::Instance(instance)) => {
            if instance.has_method(STR_METHOD, 0) {
                let rendered = call_method(value, STR_METHOD, Vec::new(), ctx)?;
                write_value(&rendered, out, ctx)?;
            } else {
                write!(
                    out,
                    "<{} object at {:p}>",
                    instance.class().name(),
                    instance as *const Instance
                )?;
            }
        }
    }
    Ok(())
}
