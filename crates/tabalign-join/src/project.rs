//! Final projection onto the schema columns.

use std::collections::HashMap;

use polars::prelude::*;
use tabalign_model::{AlignError, Result};

/// Selects `schema` columns, in order, from `frame`.
///
/// `sources` maps each schema column to the frame column that supplies it; a
/// frame column may supply several schema columns. Duplicate rows are dropped
/// (first occurrence kept) when `dedupe` is set, then the row limit applies.
pub fn project(
    frame: &DataFrame,
    schema: &[String],
    sources: &HashMap<&str, String>,
    dedupe: bool,
    limit: Option<usize>,
) -> Result<DataFrame> {
    let mut exprs = Vec::with_capacity(schema.len());
    for schema_column in schema {
        let source = sources
            .get(schema_column.as_str())
            .ok_or_else(|| AlignError::NoMatch {
                schema_column: schema_column.clone(),
            })?;
        exprs.push(col(source.as_str()).alias(schema_column.as_str()));
    }

    let mut lf = frame.clone().lazy().select(exprs);
    if dedupe {
        lf = lf.unique_stable(None, UniqueKeepStrategy::First);
    }
    let df = lf.collect().map_err(AlignError::frame)?;
    Ok(match limit {
        Some(rows) => df.head(Some(rows)),
        None => df,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(s, c)| (*s, (*c).to_string())).collect()
    }

    #[test]
    fn one_source_feeds_two_schema_columns() {
        let frame = df!("capital" => ["Boise", "Boise"], "pop" => [1, 1]).unwrap();
        let schema = vec!["city".to_string(), "town".to_string()];
        let out = project(
            &frame,
            &schema,
            &sources(&[("city", "capital"), ("town", "capital")]),
            true,
            None,
        )
        .unwrap();
        assert_eq!(out.get_column_names_str(), vec!["city", "town"]);
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn limit_truncates_after_dedupe() {
        let frame = df!("x" => [1, 1, 2, 3]).unwrap();
        let schema = vec!["x".to_string()];
        let out = project(&frame, &schema, &sources(&[("x", "x")]), true, Some(2)).unwrap();
        let values: Vec<Option<i32>> = out.column("x").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1), Some(2)]);
    }

    #[test]
    fn missing_source_is_no_match() {
        let frame = df!("x" => [1]).unwrap();
        let schema = vec!["y".to_string()];
        let err = project(&frame, &schema, &HashMap::new(), false, None).unwrap_err();
        assert!(matches!(err, AlignError::NoMatch { ref schema_column } if schema_column == "y"));
    }
}
