//! Polymorphic comparison operators
//!
//! `==` and `<` are the primitives: they consult `__eq__`/`__lt__` on an
//! instance left-hand side, fall back to pairwise comparison of numbers,
//! strings and booleans, and treat two null handles as equal. The other
//! four comparators are derived, so `>=` and `<=` never consult a
//! `__gt__`/`__ge__` hook.

use crate::ast::CmpOp;
use crate::diagnostics::RuntimeError;

use super::context::Context;
use super::eval::call_method;
use super::value::{is_true, Value, ValueRef, EQ_METHOD, LT_METHOD};

/// `lhs == rhs`
pub fn equal(
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<bool, RuntimeError> {
    if let Some(instance) = lhs.as_instance() {
        if instance.has_method(EQ_METHOD, 1) {
            let result = call_method(lhs, EQ_METHOD, vec![rhs.share()], ctx)?;
            return Ok(is_true(&result));
        }
    }

    // The null handle and the `None` value are indistinguishable here.
    if is_none(lhs) && is_none(rhs) {
        return Ok(true);
    }

    match (lhs.get(), rhs.get()) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => Ok(a == b),
        (Some(Value::String(a)), Some(Value::String(b))) => Ok(a == b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => Ok(a == b),
        _ => Err(RuntimeError::Comparison),
    }
}

fn is_none(value: &ValueRef) -> bool {
    value.is_null() || matches!(value.get(), Some(Value::None))
}

/// `lhs < rhs`
pub fn less(
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<bool, RuntimeError> {
    if let Some(instance) = lhs.as_instance() {
        if instance.has_method(LT_METHOD, 1) {
            let result = call_method(lhs, LT_METHOD, vec![rhs.share()], ctx)?;
            return Ok(is_true(&result));
        }
    }

    match (lhs.get(), rhs.get()) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => Ok(a < b),
        (Some(Value::String(a)), Some(Value::String(b))) => Ok(a < b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => Ok(a < b),
        _ => Err(RuntimeError::Comparison),
    }
}

/// `lhs != rhs`
pub fn not_equal(
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<bool, RuntimeError> {
    Ok(!equal(lhs, rhs, ctx)?)
}

/// `lhs <= rhs`
pub fn less_or_equal(
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<bool, RuntimeError> {
    Ok(less(lhs, rhs, ctx)? || equal(lhs, rhs, ctx)?)
}

/// `lhs > rhs`
pub fn greater(
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<bool, RuntimeError> {
    Ok(!less_or_equal(lhs, rhs, ctx)?)
}

/// `lhs >= rhs`
pub fn greater_or_equal(
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<bool, RuntimeError> {
    Ok(!less(lhs, rhs, ctx)?)
}

/// Apply the comparator selected by `op`.
pub fn compare(
    op: CmpOp,
    lhs: &ValueRef,
    rhs: &ValueRef,
    ctx: &mut dyn Context,
) -> Result<bool, RuntimeError> {
    match op {
        CmpOp::Eq => equal(lhs, rhs, ctx),
        CmpOp::NotEq => not_equal(lhs, rhs, ctx),
        CmpOp::Less => less(lhs, rhs, ctx),
        CmpOp::Greater => greater(lhs, rhs, ctx),
        CmpOp::LessEq => less_or_equal(lhs, rhs, ctx),
        CmpOp::GreaterEq => greater_or_equal(lhs, rhs, ctx),
    }
}
