// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Nested array literal parsing.

use crate::{Result, ShowcaseError};
use serde_json::Value;

/// Parse a literal such as `[[1, 2], [3, 4]]` into flat values and the
/// inferred shape. A bare number parses as a scalar with an empty shape.
///
/// Ragged nesting, non-numeric elements and invalid syntax are
/// [`ShowcaseError::Parse`].
pub fn parse_tensor_literal(literal: &str) -> Result<(Vec<f32>, Vec<usize>)> {
    let value: Value = serde_json::from_str(literal.trim())
        .map_err(|e| ShowcaseError::parse(format!("invalid tensor literal: {e}")))?;

    let shape = infer_shape(&value);
    let mut values = Vec::with_capacity(shape.iter().product());
    flatten(&value, &shape, &mut values)?;
    Ok((values, shape))
}

fn infer_shape(value: &Value) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut cursor = value;
    while let Value::Array(items) = cursor {
        shape.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }
    shape
}

fn flatten(value: &Value, shape: &[usize], out: &mut Vec<f32>) -> Result<()> {
    match (value, shape.split_first()) {
        (Value::Number(n), None) => {
            let v = n
                .as_f64()
                .ok_or_else(|| ShowcaseError::parse(format!("unrepresentable number {n}")))?;
            out.push(v as f32);
            Ok(())
        }
        (Value::Array(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(ShowcaseError::parse(format!(
                    "ragged tensor literal: expected {len} elements, found {}",
                    items.len()
                )));
            }
            for item in items {
                flatten(item, rest, out)?;
            }
            Ok(())
        }
        (Value::Array(_), None) | (Value::Number(_), Some(_)) => Err(ShowcaseError::parse(
            "ragged tensor literal: inconsistent nesting depth",
        )),
        (other, _) => Err(ShowcaseError::parse(format!(
            "tensor elements must be numbers, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matrix() {
        let (values, shape) = parse_tensor_literal("[[1, 2, 3], [4, 5, 6]]").unwrap();
        assert_eq!(shape, vec![2, 3]);
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_scalar() {
        let (values, shape) = parse_tensor_literal(" 3.5 ").unwrap();
        assert!(shape.is_empty());
        assert_eq!(values, vec![3.5]);
    }

    #[test]
    fn test_parse_empty_vector() {
        let (values, shape) = parse_tensor_literal("[]").unwrap();
        assert_eq!(shape, vec![0]);
        assert!(values.is_empty());
    }

    #[test]
    fn test_rejects_ragged() {
        let err = parse_tensor_literal("[[1, 2], [3]]").unwrap_err();
        assert!(err.is_parse());
        let err = parse_tensor_literal("[[1, 2], 3]").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(parse_tensor_literal("[1, \"two\"]").unwrap_err().is_parse());
        assert!(parse_tensor_literal("[1, 2").unwrap_err().is_parse());
    }
}
