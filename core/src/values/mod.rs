//! Runtime values: logical, integer and double data in scalar and vector form.
//!
//! Every element slot can hold the missing marker `NA`:
//! - logical: [`Logical::Na`]
//! - integer: [`NA_INTEGER`] (`i32::MIN`)
//! - double: [`NA_REAL`], a dedicated NaN payload. Strict consumers treat any
//!   NaN as missing.
//!
//! Scalars are kept apart from vectors so the common single-value case never
//! touches a heap buffer. A length-1 vector is still a vector; only operations
//! whose inputs are all scalars produce scalars.

pub mod coerce;
pub mod extract;

pub use extract::{EmptyExtent, Extent};

use core::fmt;
use ecow::EcoVec;

/// Missing marker for integer slots.
pub const NA_INTEGER: i32 = i32::MIN;

/// Missing marker for double slots.
pub const NA_REAL: f64 = f64::from_bits(0x7FF0_0000_0000_07A2);

/// Returns true for the `NA` payload specifically (not for other NaNs).
pub fn is_na_real(value: f64) -> bool {
    value.to_bits() == NA_REAL.to_bits()
}

/// Tri-state logical element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logical {
    False,
    True,
    Na,
}

impl Logical {
    pub fn is_na(self) -> bool {
        matches!(self, Logical::Na)
    }

    /// `None` for `NA`.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Logical::True => Some(true),
            Logical::False => Some(false),
            Logical::Na => None,
        }
    }

    pub fn not(self) -> Logical {
        match self {
            Logical::True => Logical::False,
            Logical::False => Logical::True,
            Logical::Na => Logical::Na,
        }
    }
}

impl From<bool> for Logical {
    fn from(value: bool) -> Self {
        if value { Logical::True } else { Logical::False }
    }
}

/// Coercion rank. Ordering is significant: `Logical < Integer < Double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Logical,
    Integer,
    Double,
}

impl Rank {
    pub fn name(self) -> &'static str {
        match self {
            Rank::Logical => "logical",
            Rank::Integer => "integer",
            Rank::Double => "double",
        }
    }
}

/// A single element pulled out of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Logical(Logical),
    Int(i32),
    Double(f64),
}

impl Scalar {
    pub fn rank(self) -> Rank {
        match self {
            Scalar::Logical(_) => Rank::Logical,
            Scalar::Int(_) => Rank::Integer,
            Scalar::Double(_) => Rank::Double,
        }
    }

    pub fn is_missing(self) -> bool {
        match self {
            Scalar::Logical(l) => l.is_na(),
            Scalar::Int(i) => i == NA_INTEGER,
            Scalar::Double(d) => d.is_nan(),
        }
    }

    pub fn to_logical(self) -> Logical {
        match self {
            Scalar::Logical(l) => l,
            Scalar::Int(i) => coerce::int_to_logical(i),
            Scalar::Double(d) => coerce::double_to_logical(d),
        }
    }

    pub fn to_int(self) -> i32 {
        match self {
            Scalar::Logical(l) => coerce::logical_to_int(l),
            Scalar::Int(i) => i,
            Scalar::Double(d) => coerce::double_to_int(d),
        }
    }

    pub fn to_double(self) -> f64 {
        match self {
            Scalar::Logical(l) => coerce::logical_to_double(l),
            Scalar::Int(i) => coerce::int_to_double(i),
            Scalar::Double(d) => d,
        }
    }

    /// Converts to `rank`; up-rank conversions keep missingness.
    pub fn coerce_to(self, rank: Rank) -> Scalar {
        match rank {
            Rank::Logical => Scalar::Logical(self.to_logical()),
            Rank::Integer => Scalar::Int(self.to_int()),
            Rank::Double => Scalar::Double(self.to_double()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Scalar::Logical(l) => Value::Logical(l),
            Scalar::Int(i) => Value::Int(i),
            Scalar::Double(d) => Value::Double(d),
        }
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The empty value: length 0, no rank.
    Null,
    Logical(Logical),
    Int(i32),
    Double(f64),
    LogicalVec(EcoVec<Logical>),
    IntVec(EcoVec<i32>),
    DoubleVec(EcoVec<f64>),
}

impl Value {
    // ============================================================================
    // Construction
    // ============================================================================

    pub fn logical(value: bool) -> Self {
        Value::Logical(value.into())
    }

    pub fn na() -> Self {
        Value::Logical(Logical::Na)
    }

    pub fn int(value: i32) -> Self {
        Value::Int(value)
    }

    pub fn double(value: f64) -> Self {
        Value::Double(value)
    }

    pub fn logical_vec(items: impl IntoIterator<Item = Logical>) -> Self {
        Value::LogicalVec(items.into_iter().collect())
    }

    pub fn int_vec(items: impl IntoIterator<Item = i32>) -> Self {
        Value::IntVec(items.into_iter().collect())
    }

    pub fn double_vec(items: impl IntoIterator<Item = f64>) -> Self {
        Value::DoubleVec(items.into_iter().collect())
    }

    /// Builds a vector of `rank` from scalars, coercing each element.
    pub fn vector_of(rank: Rank, items: impl IntoIterator<Item = Scalar>) -> Self {
        let items = items.into_iter();
        match rank {
            Rank::Logical => Value::LogicalVec(items.map(Scalar::to_logical).collect()),
            Rank::Integer => Value::IntVec(items.map(Scalar::to_int).collect()),
            Rank::Double => Value::DoubleVec(items.map(Scalar::to_double).collect()),
        }
    }

    // ============================================================================
    // Shape
    // ============================================================================

    /// `None` only for `NULL`.
    pub fn rank(&self) -> Option<Rank> {
        match self {
            Value::Null => None,
            Value::Logical(_) | Value::LogicalVec(_) => Some(Rank::Logical),
            Value::Int(_) | Value::IntVec(_) => Some(Rank::Integer),
            Value::Double(_) | Value::DoubleVec(_) => Some(Rank::Double),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Logical(_) | Value::Int(_) | Value::Double(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Logical(_) | Value::Int(_) | Value::Double(_) => 1,
            Value::LogicalVec(v) => v.len(),
            Value::IntVec(v) => v.len(),
            Value::DoubleVec(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index`, or `None` past the end.
    pub fn element_at(&self, index: usize) -> Option<Scalar> {
        match self {
            Value::Null => None,
            Value::Logical(l) => (index == 0).then_some(Scalar::Logical(*l)),
            Value::Int(i) => (index == 0).then_some(Scalar::Int(*i)),
            Value::Double(d) => (index == 0).then_some(Scalar::Double(*d)),
            Value::LogicalVec(v) => v.get(index).map(|l| Scalar::Logical(*l)),
            Value::IntVec(v) => v.get(index).map(|i| Scalar::Int(*i)),
            Value::DoubleVec(v) => v.get(index).map(|d| Scalar::Double(*d)),
        }
    }

    /// Whether element `index` is missing; `false` past the end.
    pub fn is_missing_at(&self, index: usize) -> bool {
        self.element_at(index).is_some_and(Scalar::is_missing)
    }

    /// Iterates over all elements in order.
    pub fn elements(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(move |i| self.element_at(i))
    }

    /// Name of the value's kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        self.rank().map_or("NULL", Rank::name)
    }
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logical::True => write!(f, "TRUE"),
            Logical::False => write!(f, "FALSE"),
            Logical::Na => write!(f, "NA"),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Logical(l) => write!(f, "{}", l),
            Scalar::Int(i) if *i == NA_INTEGER => write!(f, "NA"),
            Scalar::Int(i) => write!(f, "{}L", i),
            Scalar::Double(d) => format_double(f, *d),
        }
    }
}

fn format_double(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if is_na_real(value) {
        write!(f, "NA")
    } else if value.is_nan() {
        write!(f, "NaN")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "Inf")
        } else {
            write!(f, "-Inf")
        }
    } else {
        write!(f, "{}", value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Logical(_) | Value::Int(_) | Value::Double(_) => {
                let Some(scalar) = self.element_at(0) else {
                    return Ok(());
                };
                write!(f, "{}", scalar)
            }
            _ if self.is_empty() => write!(f, "{}(0)", self.kind_name()),
            _ => {
                write!(f, "c(")?;
                for (i, elem) in self.elements().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
        }
    }
}
