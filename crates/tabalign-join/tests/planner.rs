//! Join planning over header lists, without reading any rows.

use tabalign_join::JoinPlanner;
use tabalign_map::{ColumnScorer, FuzzyScorer, ProvidedMatch, ProvidedMatchScorer, SchemaMatcher};
use tabalign_model::{AlignError, AlignOptions, FileAssignment, Plan, TableHeaders, TableId};

fn headers(id: usize, name: &str, columns: &[&str]) -> TableHeaders {
    TableHeaders {
        id: TableId(id),
        name: name.to_string(),
        columns: columns.iter().map(|c| (*c).to_string()).collect(),
    }
}

fn assignment_for(
    scorer: &dyn ColumnScorer,
    schema: &[&str],
    tables: &[TableHeaders],
) -> FileAssignment {
    let schema: Vec<String> = schema.iter().map(|c| (*c).to_string()).collect();
    SchemaMatcher::new(scorer, &AlignOptions::default())
        .match_schema(&schema, tables)
        .unwrap()
        .assignment
}

#[test]
fn chain_of_three_tables() {
    let tables = vec![
        headers(0, "orders", &["order_id", "customer_id", "amount"]),
        headers(1, "customers", &["customer_id", "region_code", "customer_name"]),
        headers(2, "regions", &["region_code", "region_label"]),
    ];
    let scorer = FuzzyScorer;
    let assignment = assignment_for(&scorer, &["amount", "customer_name", "region_label"], &tables);

    let plan = JoinPlanner::new(&scorer, &AlignOptions::default())
        .plan(&assignment, &tables)
        .unwrap();
    let Plan::Join(plan) = plan else {
        panic!("expected a join plan");
    };

    assert_eq!(plan.table_count(), 3);
    assert_eq!(plan.edges().len(), 2);
    let edges: Vec<_> = plan
        .edges()
        .iter()
        .map(|e| (plan.name(e.left), plan.name(e.right)))
        .collect();
    assert_eq!(
        edges,
        vec![("orders", "customers"), ("customers", "regions")]
    );
    let first = &plan.edges()[0].candidates[0];
    assert_eq!(
        (first.left_column.as_str(), first.right_column.as_str()),
        ("customer_id", "customer_id")
    );
}

#[test]
fn unrelated_tables_are_disconnected() {
    let tables = vec![
        headers(0, "weather", &["precipitation"]),
        headers(1, "prices", &["price"]),
    ];
    let scorer = ProvidedMatchScorer::new([
        ProvidedMatch {
            schema_column: "rain".to_string(),
            source_column: "precipitation".to_string(),
            confidence: 0.9,
        },
        ProvidedMatch {
            schema_column: "cost".to_string(),
            source_column: "price".to_string(),
            confidence: 0.8,
        },
    ]);
    let assignment = assignment_for(&scorer, &["rain", "cost"], &tables);

    let err = JoinPlanner::new(&scorer, &AlignOptions::default())
        .plan(&assignment, &tables)
        .unwrap_err();

    assert_eq!(
        err,
        AlignError::DisconnectedJoinGraph {
            orphaned: vec!["prices".to_string()]
        }
    );
    insta::assert_snapshot!(err.to_string(), @"join graph is disconnected; orphaned tables: prices");
}

#[test]
fn single_assigned_table_short_circuits() {
    let tables = vec![
        headers(0, "extra", &["unrelated"]),
        headers(1, "main", &["x", "y"]),
    ];
    let scorer = ProvidedMatchScorer::default();
    let assignment = assignment_for(&scorer, &["x", "y"], &tables);

    let plan = JoinPlanner::new(&scorer, &AlignOptions::default())
        .plan(&assignment, &tables)
        .unwrap();
    assert_eq!(plan, Plan::Single(TableId(1)));
}

#[test]
fn plan_display_lists_edges() {
    let tables = vec![
        headers(0, "weather", &["precipitation", "state"]),
        headers(1, "states", &["state", "capital"]),
    ];
    let scorer = ProvidedMatchScorer::new([
        ProvidedMatch {
            schema_column: "rain".to_string(),
            source_column: "precipitation".to_string(),
            confidence: 0.95,
        },
        ProvidedMatch {
            schema_column: "city".to_string(),
            source_column: "capital".to_string(),
            confidence: 0.9,
        },
    ]);
    let assignment = assignment_for(&scorer, &["rain", "city"], &tables);

    let Plan::Join(plan) = JoinPlanner::new(&scorer, &AlignOptions::default())
        .plan(&assignment, &tables)
        .unwrap()
    else {
        panic!("expected a join plan");
    };
    insta::assert_snapshot!(plan.to_string().trim_end(), @"weather <-> states: (state = state, 1.000)");
}
