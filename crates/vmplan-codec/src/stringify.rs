use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

/// Best-effort rendering for log lines and diagnostics.
///
/// Tries the JSON form first (which carries `_typeName` discriminators for
/// the device model), falls back to `Debug` when serialization errors or
/// panics, and never fails itself. `None` renders as the literal `null`.
pub fn stringify<T>(value: Option<&T>) -> String
where
    T: Serialize + fmt::Debug,
{
    let Some(value) = value else {
        return "null".to_owned();
    };

    let json = catch_unwind(AssertUnwindSafe(|| serde_json::to_string(value).ok()));
    if let Ok(Some(text)) = json {
        return text;
    }

    catch_unwind(AssertUnwindSafe(|| format!("{value:?}")))
        .unwrap_or_else(|_| "<unprintable>".to_owned())
}
