//! Dense numeric tensors decoded from JSON arrays.
//!
//! JSON carries no dtype, so the element type is inferred from the numbers
//! themselves: all non-negative integers → [`ElementType::UInt`], integers
//! with at least one negative → [`ElementType::Int`], anything with a
//! fraction or exponent → [`ElementType::Float`].

use serde_json::Value;

use scscore_core::{Result, ScscoreError};

/// Element type of a tensor as written in the weight document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    UInt,
    Int,
    Float,
}

impl ElementType {
    /// The narrowest type able to hold both `self` and `other`.
    fn widen(self, other: ElementType) -> ElementType {
        use ElementType::*;
        match (self, other) {
            (Float, _) | (_, Float) => Float,
            (Int, _) | (_, Int) => Int,
            (UInt, UInt) => UInt,
        }
    }

    pub fn is_unsigned_integer(self) -> bool {
        self == ElementType::UInt
    }
}

/// A row-major tensor of `f64` values with a recorded element type.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
    dtype: ElementType,
}

impl Tensor {
    /// Build a tensor from flat row-major data.
    pub fn new(shape: Vec<usize>, data: Vec<f64>, dtype: ElementType) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(ScscoreError::InvalidInput(format!(
                "shape {shape:?} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Tensor { shape, data, dtype })
    }

    /// Decode a (nested) JSON array of numbers.
    ///
    /// Nested arrays must be rectangular. A bare number is a 0-d tensor.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut shape = Vec::new();
        let mut probe = value;
        while let Value::Array(items) = probe {
            shape.push(items.len());
            match items.first() {
                Some(first) => probe = first,
                None => break,
            }
        }

        let mut data = Vec::with_capacity(shape.iter().product());
        let mut dtype = None;
        flatten(value, &shape, &mut data, &mut dtype)?;
        Tensor::new(shape, data, dtype.unwrap_or(ElementType::Float))
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn dtype(&self) -> ElementType {
        self.dtype
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn into_data(self) -> Vec<f64> {
        self.data
    }
}

fn flatten(
    value: &Value,
    shape: &[usize],
    out: &mut Vec<f64>,
    dtype: &mut Option<ElementType>,
) -> Result<()> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(ScscoreError::InvalidInput(format!(
                    "ragged array: expected {len} elements, found {}",
                    items.len()
                )));
            }
            for item in items {
                flatten(item, rest, out, dtype)?;
            }
            Ok(())
        }
        (Value::Number(num), None) => {
            let (v, t) = if num.is_u64() {
                (num.as_u64().unwrap_or_default() as f64, ElementType::UInt)
            } else if num.is_i64() {
                (num.as_i64().unwrap_or_default() as f64, ElementType::Int)
            } else {
                let v = num.as_f64().ok_or_else(|| {
                    ScscoreError::InvalidInput(format!("number {num} is not representable"))
                })?;
                (v, ElementType::Float)
            };
            *dtype = Some(dtype.map_or(t, |d| d.widen(t)));
            out.push(v);
            Ok(())
        }
        (Value::Array(_), None) | (Value::Number(_), Some(_)) => Err(ScscoreError::InvalidInput(
            "ragged array: inconsistent nesting depth".into(),
        )),
        (other, _) => Err(ScscoreError::InvalidInput(format!(
            "expected a number or array, found {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
