//! The builtin functions the evaluator knows without a frame binding.

use crate::evaluator::RuntimeError;
use crate::values::coerce::highest_rank;
use crate::values::{Logical, Value};
use crate::{ToString, Vec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Control transfer out of the program with the given value.
    Return,
    /// Combine values into one vector.
    Combine,
    Length,
    IsNa,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "return" => Some(Builtin::Return),
            "c" => Some(Builtin::Combine),
            "length" => Some(Builtin::Length),
            "is.na" => Some(Builtin::IsNa),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Return => "return",
            Builtin::Combine => "c",
            Builtin::Length => "length",
            Builtin::IsNa => "is.na",
        }
    }
}

pub fn is_builtin(name: &str) -> bool {
    Builtin::lookup(name).is_some()
}

/// Checks the argument list of `return` and yields the returned value.
pub fn return_value(mut args: Vec<Value>) -> Result<Value, RuntimeError> {
    match args.len() {
        0 => Ok(Value::Null),
        1 => Ok(args.swap_remove(0)),
        _ => Err(RuntimeError::InvalidArgument {
            function: "return".into(),
            message: "multi-argument returns are not permitted".to_string(),
        }),
    }
}

/// `c(...)`: concatenates, coercing to the highest rank. `NULL`s vanish.
pub fn combine(args: &[Value]) -> Value {
    match highest_rank(args) {
        None => Value::Null,
        Some(rank) => Value::vector_of(rank, args.iter().flat_map(|arg| arg.elements())),
    }
}

pub fn length(args: &[Value]) -> Result<Value, RuntimeError> {
    let [value] = args else {
        return Err(arity_error(Builtin::Length, args.len()));
    };
    let len = i32::try_from(value.len()).map_err(|_| RuntimeError::InvalidArgument {
        function: "length".into(),
        message: "length does not fit in an integer".to_string(),
    })?;
    Ok(Value::Int(len))
}

/// Element-wise missingness. Scalars stay scalars.
pub fn is_na(args: &[Value]) -> Result<Value, RuntimeError> {
    let [value] = args else {
        return Err(arity_error(Builtin::IsNa, args.len()));
    };
    if value.is_scalar() {
        return Ok(Value::logical(value.is_missing_at(0)));
    }
    Ok(Value::logical_vec(
        value.elements().map(|elem| Logical::from(elem.is_missing())),
    ))
}

fn arity_error(builtin: Builtin, given: usize) -> RuntimeError {
    RuntimeError::InvalidArgument {
        function: builtin.name().into(),
        message: crate::format!("expected 1 argument, got {}", given),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::NA_INTEGER;
    use crate::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_combine_coerces_to_highest_rank() {
        let args = [Value::logical(true), Value::int(2), Value::Null];
        assert_eq!(combine(&args), Value::int_vec([1, 2]));

        let args = [Value::int_vec([1, NA_INTEGER]), Value::double(0.5)];
        let combined = combine(&args);
        assert_eq!(combined.len(), 3);
        assert!(combined.is_missing_at(1));

        assert_eq!(combine(&[]), Value::Null);
        assert_eq!(combine(&[Value::Null]), Value::Null);
    }

    #[test]
    fn test_combine_of_one_scalar_is_a_vector() {
        assert_eq!(combine(&[Value::double(1.0)]), Value::double_vec([1.0]));
    }

    #[test]
    fn test_length_and_is_na() {
        assert_eq!(length(&[Value::Null]), Ok(Value::int(0)));
        assert_eq!(length(&[Value::int_vec([1, 2, 3])]), Ok(Value::int(3)));
        assert!(length(&[]).is_err());

        assert_eq!(is_na(&[Value::na()]), Ok(Value::logical(true)));
        assert_eq!(
            is_na(&[Value::double_vec([1.0, f64::NAN])]),
            Ok(Value::logical_vec([Logical::False, Logical::True]))
        );
    }

    #[test]
    fn test_return_value() {
        assert_eq!(return_value(vec![]), Ok(Value::Null));
        assert_eq!(return_value(vec![Value::int(1)]), Ok(Value::int(1)));
        assert!(return_value(vec![Value::int(1), Value::int(2)]).is_err());
    }
}
