//! End-to-end alignment over small on-disk tables.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tabalign_ingest::{TableState, TableStore};
use tabalign_join::{Alignment, JoinPlanner, MultiTableJoin, align};
use tabalign_map::{EmbeddingSpace, PhraseScorer, ProvidedMatch, ProvidedMatchScorer, SchemaMatcher};
use tabalign_model::{
    AlignError, AlignOptions, ColumnMatch, FileAssignment, JoinEdge, JoinPlan, KeyCandidate,
    MatchedSource, Plan, Stage, TableId,
};
use tempfile::TempDir;

fn scorer() -> PhraseScorer {
    PhraseScorer::new(EmbeddingSpace::from_entries([
        ("rain", vec![1.0, 0.1, 0.0, 0.0]),
        ("precipitation", vec![0.9, 0.2, 0.0, 0.0]),
        ("city", vec![0.0, 1.0, 0.2, 0.0]),
        ("capital", vec![0.1, 0.9, 0.3, 0.0]),
        ("name", vec![0.0, 0.0, 1.0, 0.0]),
        ("population", vec![0.0, 0.0, 0.1, 1.0]),
    ]))
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn schema(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| (*c).to_string()).collect()
}

fn strings(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .unwrap()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

#[test]
fn weather_and_states_join_on_state_name() {
    let dir = TempDir::new().unwrap();
    let weather = write(
        dir.path(),
        "weather.csv",
        "precipitation,state_name\n12.5,Ohio\n30.1,Iowa\n8.0,Utah\n",
    );
    let states = write(
        dir.path(),
        "states.csv",
        "capital,name\nColumbus,Ohio\nDes Moines,Iowa\nBoise,Idaho\n",
    );
    let scorer = scorer();

    let mut alignment = align(
        &schema(&["rain", "city"]),
        &[weather, states],
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap();

    let Plan::Join(plan) = alignment.plan() else {
        panic!("expected a join plan");
    };
    assert_eq!(plan.edges().len(), 1);
    let keys: Vec<_> = plan.edges()[0]
        .candidates
        .iter()
        .map(|c| (c.left_column.as_str(), c.right_column.as_str(), c.score))
        .collect();
    assert_eq!(keys, vec![("state_name", "name", 1.0)]);

    let result = alignment.result().unwrap();
    assert_eq!(result.get_column_names_str(), vec!["rain", "city"]);
    assert_eq!(strings(result, "city"), vec!["Columbus", "Des Moines"]);
    assert_eq!(strings(result, "rain"), vec!["12.5", "30.1"]);
    for table in [TableId(0), TableId(1)] {
        assert_eq!(
            alignment.store().get(table).unwrap().state(),
            TableState::Evicted
        );
    }
}

#[test]
fn exact_headers_use_single_table_projection() {
    let dir = TempDir::new().unwrap();
    let table = write(dir.path(), "xyz.csv", "x,y,z\n1,2,3\n1,2,3\n4,5,6\n");
    let scorer = scorer();

    let mut alignment = align(
        &schema(&["x", "y", "z"]),
        &[table],
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap();

    assert_eq!(alignment.plan(), &Plan::Single(TableId(0)));
    assert_eq!(alignment.store().loads(), 1);
    let result = alignment.result().unwrap();
    assert_eq!(result.get_column_names_str(), vec!["x", "y", "z"]);
    assert_eq!(strings(result, "x"), vec!["1", "4"]);
}

#[test]
fn irrelevant_table_is_never_joined_or_read() {
    let dir = TempDir::new().unwrap();
    let weather = write(
        dir.path(),
        "weather.csv",
        "precipitation,state_name\n12.5,Ohio\n30.1,Iowa\n",
    );
    let census = write(dir.path(), "census.csv", "population\n100\n200\n");
    let states = write(
        dir.path(),
        "states.csv",
        "capital,name\nColumbus,Ohio\nDes Moines,Iowa\n",
    );
    let scorer = scorer();
    let options = AlignOptions::default().with_min_match_score(Some(0.5));

    let mut alignment = align(
        &schema(&["rain", "city"]),
        &[weather, census, states],
        &scorer,
        &options,
    )
    .unwrap();

    assert!(!alignment.report().assignment.contains(TableId(1)));
    let Plan::Join(plan) = alignment.plan() else {
        panic!("expected a join plan");
    };
    assert_eq!(plan.tables().collect::<Vec<_>>(), vec![TableId(0), TableId(2)]);
    assert_eq!(alignment.result().unwrap().height(), 2);
    assert_eq!(
        alignment.store().get(TableId(1)).unwrap().state(),
        TableState::Unloaded
    );
}

#[test]
fn zero_cardinality_key_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let weather = write(
        dir.path(),
        "weather.csv",
        "precipitation,state_name\n12.5,Ohio\n30.1,Iowa\n",
    );
    let states = write(
        dir.path(),
        "states.csv",
        "capital,name\nBoise,Idaho\nSalem,Oregon\n",
    );
    let output = dir.path().join("out.csv");
    let scorer = scorer();

    let mut alignment = Alignment::prepare(
        &schema(&["rain", "city"]),
        &[weather, states],
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap();
    let err = alignment.persist(&output).unwrap_err();

    assert_eq!(err.stage(), Stage::Execution);
    assert_eq!(
        err.reason(),
        &AlignError::UnviableKey {
            left: "weather".to_string(),
            right: "states".to_string(),
        }
    );
    assert!(!output.exists());
    assert_eq!(
        alignment.store().get(TableId(0)).unwrap().state(),
        TableState::Evicted
    );

    let again = alignment.result().unwrap_err();
    assert_eq!(again, err);
}

fn year_tables(dir: &Path) -> Vec<PathBuf> {
    vec![
        write(
            dir,
            "weather.csv",
            "state_name,Year,precipitation\nOhio,2020,12.5\nIowa,2021,30.1\n",
        ),
        write(
            dir,
            "states.csv",
            "name,Year,capital\nOhio,1803,Columbus\nIowa,1846,Des Moines\n",
        ),
    ]
}

#[test]
fn shared_column_names_are_prefixed_before_merge() {
    let dir = TempDir::new().unwrap();
    let sources = year_tables(dir.path());
    let scorer = scorer();
    let options = AlignOptions::default();
    let schema = schema(&["rain", "city", "Year"]);

    let mut store = TableStore::open(&sources).unwrap();
    let headers = store.headers();
    let report = SchemaMatcher::new(&scorer, &options)
        .match_schema(&schema, &headers)
        .unwrap();
    let Plan::Join(plan) = JoinPlanner::new(&scorer, &options)
        .plan(&report.assignment, &headers)
        .unwrap()
    else {
        panic!("expected a join plan");
    };
    let mut join = MultiTableJoin::new(plan, report.assignment.clone(), schema, options);
    let joined = join.join_all(&mut store).unwrap();

    let names = joined.get_column_names_str();
    assert!(names.contains(&"weather_Year"));
    assert!(names.contains(&"states_Year"));
    assert!(!names.contains(&"Year"));
    assert_eq!(strings(&joined, "weather_Year"), vec!["2020", "2021"]);
    assert_eq!(strings(&joined, "states_Year"), vec!["1803", "1846"]);
}

#[test]
fn renamed_columns_still_project_to_schema() {
    let dir = TempDir::new().unwrap();
    let sources = year_tables(dir.path());
    let scorer = scorer();

    let mut alignment = align(
        &schema(&["rain", "city", "Year"]),
        &sources,
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap();
    let result = alignment.result().unwrap();

    assert_eq!(result.get_column_names_str(), vec!["rain", "city", "Year"]);
    assert_eq!(strings(result, "Year"), vec!["2020", "2021"]);
}

#[test]
fn result_is_memoized() {
    let dir = TempDir::new().unwrap();
    let sources = year_tables(dir.path());
    let scorer = scorer();

    let mut alignment = align(
        &schema(&["rain", "city"]),
        &sources,
        &scorer,
        &AlignOptions::default().with_limit_rows(Some(1)),
    )
    .unwrap();
    let first = alignment.result().unwrap().clone();
    let second = alignment.result().unwrap().clone();

    assert_eq!(first.height(), 1);
    assert!(first.equals_missing(&second));
    assert_eq!(alignment.store().loads(), 2);
}

#[test]
fn unmatched_schema_column_fails_planning() {
    let dir = TempDir::new().unwrap();
    let table = write(dir.path(), "t.csv", "precipitation\n1\n");
    let scorer = scorer();

    let err = align(
        &schema(&["rain", "ISO3"]),
        &[table],
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.stage(), Stage::Planning);
    assert_eq!(
        err.reason(),
        &AlignError::NoMatch {
            schema_column: "ISO3".to_string()
        }
    );
}

#[test]
fn failed_single_table_read_is_reported_again() {
    let dir = TempDir::new().unwrap();
    let table = write(dir.path(), "t.csv", "x,y\n1,2\n");
    let scorer = scorer();

    let mut alignment = Alignment::prepare(
        &schema(&["x", "y"]),
        &[table.clone()],
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap();
    std::fs::remove_file(&table).unwrap();

    let first = alignment.result().unwrap_err();
    let second = alignment.result().unwrap_err();

    assert_eq!(first.stage(), Stage::Execution);
    assert!(matches!(first.reason(), AlignError::Parse { .. }));
    assert_eq!(first, second);
}

/// A `left` table keyed by `key_a` and `ref`, and a `right` table keyed by
/// `key_b` and `ref_id`. `key_a = key_b` scores higher than `ref = ref_id`.
fn two_key_tables(dir: &Path, key_b: [u32; 3]) -> (Vec<PathBuf>, ProvidedMatchScorer) {
    let left = write(
        dir,
        "left.csv",
        "key_a,ref,rain\n1,10,5\n2,20,6\n3,30,7\n",
    );
    let right = write(
        dir,
        "right.csv",
        &format!(
            "key_b,ref_id,city\n{},10,Boise\n{},20,Salem\n{},30,Provo\n",
            key_b[0], key_b[1], key_b[2]
        ),
    );
    let scorer = ProvidedMatchScorer::new([
        ProvidedMatch {
            schema_column: "key_a".to_string(),
            source_column: "key_b".to_string(),
            confidence: 0.95,
        },
        ProvidedMatch {
            schema_column: "ref".to_string(),
            source_column: "ref_id".to_string(),
            confidence: 0.92,
        },
    ]);
    (vec![left, right], scorer)
}

#[test]
fn key_with_more_matching_rows_beats_higher_score() {
    let dir = TempDir::new().unwrap();
    let (sources, scorer) = two_key_tables(dir.path(), [1, 9, 8]);

    let mut alignment = align(
        &schema(&["rain", "city"]),
        &sources,
        &scorer,
        &AlignOptions::default().with_max_join_keys(1),
    )
    .unwrap();
    let Plan::Join(plan) = alignment.plan() else {
        panic!("expected a join plan");
    };
    assert_eq!(plan.edges()[0].candidates[0].left_column, "key_a");

    let result = alignment.result().unwrap();
    assert_eq!(strings(result, "city"), vec!["Boise", "Salem", "Provo"]);
}

#[test]
fn composite_key_joins_on_both_columns() {
    let dir = TempDir::new().unwrap();
    let (sources, scorer) = two_key_tables(dir.path(), [1, 9, 8]);

    let mut alignment = align(
        &schema(&["rain", "city"]),
        &sources,
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap();
    let result = alignment.result().unwrap();

    assert_eq!(strings(result, "city"), vec!["Boise"]);
    assert_eq!(strings(result, "rain"), vec!["5"]);
}

#[test]
fn key_without_matching_rows_is_dropped() {
    let dir = TempDir::new().unwrap();
    let (sources, scorer) = two_key_tables(dir.path(), [7, 8, 9]);

    let mut alignment = align(
        &schema(&["rain", "city"]),
        &sources,
        &scorer,
        &AlignOptions::default(),
    )
    .unwrap();
    let result = alignment.result().unwrap();

    assert_eq!(strings(result, "city"), vec!["Boise", "Salem", "Provo"]);
    assert_eq!(strings(result, "rain"), vec!["5", "6", "7"]);
}

#[test]
fn plan_missing_an_edge_fails_execution() {
    let dir = TempDir::new().unwrap();
    let sources = vec![
        write(dir.path(), "a.csv", "id,x\n1,10\n"),
        write(dir.path(), "b.csv", "id,y\n1,20\n"),
        write(dir.path(), "c.csv", "z\n30\n"),
    ];
    let mut store = TableStore::open(&sources).unwrap();

    let matched = |schema_column: &str, table: usize| ColumnMatch {
        schema_column: schema_column.to_string(),
        source: Some(MatchedSource {
            table: TableId(table),
            column: schema_column.to_string(),
            score: 1.0,
        }),
    };
    let assignment =
        FileAssignment::from_matches(&[matched("x", 0), matched("y", 1), matched("z", 2)])
            .unwrap();
    let names = [(0, "a"), (1, "b"), (2, "c")]
        .into_iter()
        .map(|(id, name)| (TableId(id), name.to_string()))
        .collect();
    let plan = JoinPlan::new(
        names,
        vec![JoinEdge {
            left: TableId(0),
            right: TableId(1),
            candidates: vec![KeyCandidate {
                left_column: "id".to_string(),
                right_column: "id".to_string(),
                score: 1.0,
            }],
        }],
    );
    let mut join = MultiTableJoin::new(
        plan,
        assignment,
        schema(&["x", "y", "z"]),
        AlignOptions::default(),
    );

    let err = join.result(&mut store).unwrap_err();

    assert_eq!(
        err,
        AlignError::DisconnectedJoinGraph {
            orphaned: vec!["c".to_string()]
        }
    );
    assert_eq!(store.get(TableId(2)).unwrap().state(), TableState::Unloaded);
}
