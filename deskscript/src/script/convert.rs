//! Marshaling between script values and host types.
//!
//! Every script-facing entry point funnels its loosely-typed arguments
//! through here: strings-or-arrays become `Vec<String>`, callbacks become
//! host closures, and host errors become thrown script exceptions.

use crate::element::UIElement;
use crate::errors::AutomationError;
use rquickjs::{Array, Ctx, Function, Value};

use super::bindings::ElementJs;

/// A positional script argument after classification. The scripting surface
/// accepts a bare string where an array of strings is expected (and vice
/// versa), and a function wherever a predicate or action is expected.
pub(crate) enum ScriptArg<'js> {
    Scalar(Value<'js>),
    Sequence(Array<'js>),
    Callback(Function<'js>),
}

impl<'js> ScriptArg<'js> {
    pub(crate) fn classify(value: Value<'js>) -> Self {
        if let Some(function) = value.as_function() {
            ScriptArg::Callback(function.clone())
        } else if let Some(array) = value.as_array() {
            ScriptArg::Sequence(array.clone())
        } else {
            ScriptArg::Scalar(value)
        }
    }

    /// Coerce to a list of strings: a scalar becomes a one-element list,
    /// an array contributes each element. Non-string content throws.
    pub(crate) fn into_strings(self, ctx: &Ctx<'js>) -> rquickjs::Result<Vec<String>> {
        match self {
            ScriptArg::Scalar(value) => Ok(vec![coerce_string(ctx, &value)?]),
            ScriptArg::Sequence(array) => {
                let mut strings = Vec::with_capacity(array.len());
                for item in array.iter::<Value>() {
                    strings.push(coerce_string(ctx, &item?)?);
                }
                Ok(strings)
            }
            ScriptArg::Callback(_) => Err(throw_message(
                ctx,
                "expected a string or an array of strings, got a function",
            )),
        }
    }

    /// The argument as a callback, or a thrown type complaint.
    pub(crate) fn into_callback(self, ctx: &Ctx<'js>) -> rquickjs::Result<Function<'js>> {
        match self {
            ScriptArg::Callback(function) => Ok(function),
            _ => Err(throw_message(ctx, "expected a function")),
        }
    }
}

pub(crate) fn coerce_string<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> rquickjs::Result<String> {
    match value.as_string() {
        Some(s) => s.to_string(),
        None => Err(throw_message(ctx, "expected a string")),
    }
}

/// Call a script predicate with the element and interpret the result by
/// script truthiness, so `(e) -> e.name()` works as a non-empty check.
pub(crate) fn call_predicate<'js>(
    ctx: &Ctx<'js>,
    predicate: &Function<'js>,
    element: &UIElement,
) -> rquickjs::Result<bool> {
    let argument = rquickjs::Class::<ElementJs>::instance(ctx.clone(), ElementJs::wrap(element.clone()))?;
    let verdict: Value = predicate.call((argument,))?;
    Ok(is_truthy(&verdict))
}

/// Call a script action with the element, discarding the return value.
pub(crate) fn call_action<'js>(
    ctx: &Ctx<'js>,
    action: &Function<'js>,
    element: &UIElement,
) -> rquickjs::Result<()> {
    let argument = rquickjs::Class::<ElementJs>::instance(ctx.clone(), ElementJs::wrap(element.clone()))?;
    action.call::<_, ()>((argument,))
}

fn is_truthy(value: &Value) -> bool {
    if value.is_undefined() || value.is_null() {
        false
    } else if let Some(b) = value.as_bool() {
        b
    } else if let Some(n) = value.as_number() {
        n != 0.0 && !n.is_nan()
    } else if let Some(s) = value.as_string() {
        s.to_string().map(|s| !s.is_empty()).unwrap_or(false)
    } else {
        true
    }
}

/// Throw a plain message as a script exception.
pub(crate) fn throw_message<'js>(ctx: &Ctx<'js>, message: &str) -> rquickjs::Error {
    match rquickjs::String::from_str(ctx.clone(), message) {
        Ok(text) => ctx.throw(text.into()),
        Err(e) => e,
    }
}

/// Surface a host-side automation failure as a script exception carrying
/// the error's display text.
pub(crate) fn throw_automation<'js>(ctx: &Ctx<'js>, error: AutomationError) -> rquickjs::Error {
    throw_message(ctx, &error.to_string())
}
