//! Empirical key checks: type compatibility and inner-join cardinality.

use polars::prelude::*;

/// How a key pair must be prepared before the two sides can be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCast {
    /// Both columns already share a dtype.
    Exact,
    /// Both are numeric but differ in width or kind; compare as `Float64`.
    Float64,
}

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

/// Whether two key columns can be compared, and how.
///
/// Columns of the `Null` dtype (entirely empty in the source) are never keys.
pub fn key_cast(left: &DataType, right: &DataType) -> Option<KeyCast> {
    if matches!(left, DataType::Null) || matches!(right, DataType::Null) {
        return None;
    }
    if left == right {
        return Some(KeyCast::Exact);
    }
    (is_numeric(left) && is_numeric(right)).then_some(KeyCast::Float64)
}

/// A key pair resolved to column names of the two frames being joined.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinKey {
    pub left: String,
    pub right: String,
    pub cast: KeyCast,
}

fn key_frame(frame: &DataFrame, column: &str, cast: KeyCast) -> LazyFrame {
    let key = match cast {
        KeyCast::Exact => col(column),
        KeyCast::Float64 => col(column).cast(DataType::Float64),
    };
    frame
        .clone()
        .lazy()
        .select([key])
        .filter(col(column).is_not_null())
}

/// Rows produced by inner-joining the two frames on a single key, after
/// dropping rows whose key is null on either side.
pub fn probe_cardinality(left: &DataFrame, right: &DataFrame, key: &JoinKey) -> PolarsResult<usize> {
    let joined = key_frame(left, &key.left, key.cast)
        .join(
            key_frame(right, &key.right, key.cast),
            [col(key.left.as_str())],
            [col(key.right.as_str())],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;
    Ok(joined.height())
}

/// Inner-joins two frames on one or more keys, keeping both key columns.
///
/// The frames must not share column names. Output columns are the left
/// columns followed by the right columns.
pub fn inner_join(left: DataFrame, right: DataFrame, keys: &[JoinKey]) -> PolarsResult<DataFrame> {
    let output: Vec<Expr> = left
        .get_column_names()
        .into_iter()
        .chain(right.get_column_names())
        .map(|name| col(name.clone()))
        .collect();

    let mut left_lf = left.lazy();
    let mut right_lf = right.lazy();
    let mut left_on = Vec::with_capacity(keys.len());
    let mut right_on = Vec::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        match key.cast {
            KeyCast::Exact => {
                left_on.push(col(key.left.as_str()));
                right_on.push(col(key.right.as_str()));
            }
            KeyCast::Float64 => {
                let left_key = format!("__left_key_{index}");
                let right_key = format!("__right_key_{index}");
                left_lf = left_lf.with_column(
                    col(key.left.as_str())
                        .cast(DataType::Float64)
                        .alias(left_key.as_str()),
                );
                right_lf = right_lf.with_column(
                    col(key.right.as_str())
                        .cast(DataType::Float64)
                        .alias(right_key.as_str()),
                );
                left_on.push(col(left_key.as_str()));
                right_on.push(col(right_key.as_str()));
            }
        }
    }

    let mut args = JoinArgs::new(JoinType::Inner).with_coalesce(JoinCoalesce::KeepColumns);
    args.maintain_order = MaintainOrderJoin::LeftRight;
    left_lf
        .join(right_lf, left_on, right_on, args)
        .select(output)
        .collect()
}
