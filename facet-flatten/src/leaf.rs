//! Conversion of scalar leaves into [`Value`]s.

use alloc::format;
use alloc::string::ToString;

use facet_core::ScalarType;
use facet_reflect::Peek;
use facet_value::Value;

/// Converts a leaf into a [`Value`].
///
/// Returns `None` for types that have neither a known scalar representation
/// nor a `Display`/`Debug` implementation.
pub(crate) fn leaf_value(peek: Peek<'_, '_>) -> Option<Value> {
    if let Ok(value) = peek.get::<Value>() {
        return Some(value.clone());
    }

    if let Some(scalar_type) = peek.scalar_type()
        && let Some(value) = typed_scalar(scalar_type, peek)
    {
        return Some(value);
    }

    // Unit variants are leaves named after the variant.
    if let Ok(enum_) = peek.into_enum()
        && let Ok(variant) = enum_.active_variant()
    {
        return Some(Value::from(variant.effective_name()));
    }

    if let Some(s) = peek.as_str() {
        return Some(Value::from(s));
    }

    let vtable = &peek.shape().vtable;
    if vtable.has_display() {
        return Some(Value::from(peek.to_string()));
    }
    if vtable.has_debug() {
        return Some(Value::from(format!("{peek:?}")));
    }
    None
}

fn typed_scalar(scalar_type: ScalarType, peek: Peek<'_, '_>) -> Option<Value> {
    let value = match scalar_type {
        ScalarType::Unit => Value::NULL,
        ScalarType::Bool => Value::from(*peek.get::<bool>().ok()?),
        ScalarType::Char => Value::from(peek.get::<char>().ok()?.to_string()),
        ScalarType::Str | ScalarType::String | ScalarType::CowStr => Value::from(peek.as_str()?),
        ScalarType::F32 => float(f64::from(*peek.get::<f32>().ok()?)),
        ScalarType::F64 => float(*peek.get::<f64>().ok()?),
        ScalarType::U8 => Value::from(*peek.get::<u8>().ok()?),
        ScalarType::U16 => Value::from(*peek.get::<u16>().ok()?),
        ScalarType::U32 => Value::from(*peek.get::<u32>().ok()?),
        ScalarType::U64 => Value::from(*peek.get::<u64>().ok()?),
        ScalarType::USize => Value::from(*peek.get::<usize>().ok()?),
        ScalarType::I8 => Value::from(*peek.get::<i8>().ok()?),
        ScalarType::I16 => Value::from(*peek.get::<i16>().ok()?),
        ScalarType::I32 => Value::from(*peek.get::<i32>().ok()?),
        ScalarType::I64 => Value::from(*peek.get::<i64>().ok()?),
        ScalarType::ISize => Value::from(*peek.get::<isize>().ok()?),
        ScalarType::U128 => {
            let n = *peek.get::<u128>().ok()?;
            match u64::try_from(n) {
                Ok(n) => Value::from(n),
                Err(_) => Value::from(n.to_string()),
            }
        }
        ScalarType::I128 => {
            let n = *peek.get::<i128>().ok()?;
            match i64::try_from(n) {
                Ok(n) => Value::from(n),
                Err(_) => Value::from(n.to_string()),
            }
        }
        _ => return None,
    };
    Some(value)
}

/// Non-finite floats have no number representation and become null.
fn float(f: f64) -> Value {
    if f.is_finite() {
        Value::from(f)
    } else {
        Value::NULL
    }
}
