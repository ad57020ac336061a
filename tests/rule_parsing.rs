use lsystem_engine::engines::rules::{RuleParser, RuleTable, TableSettings};
use lsystem_engine::engines::stepping::SystemBuilder;
use lsystem_engine::{CharSymbolMap, LSystemError, SourceSpan};

fn build(rules: &[&str]) -> Result<(), LSystemError> {
    SystemBuilder::new()
        .rules(rules.iter().copied())
        .build()
        .map(|_| ())
}

#[test]
fn test_parser_reports_offsets_relative_to_rule() {
    let mut map = CharSymbolMap::with_branches('[', ']');
    let branches = map.branch_symbols('[', ']').unwrap();
    let parser = RuleParser::new(&[], branches);
    let err = parser.parse("A(x) -> B(x +)", &mut map).unwrap_err();
    match err {
        LSystemError::Syntax { span, .. } => assert_eq!(span, SourceSpan::new(12, 1)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_probability_must_be_constant() {
    let err = build(&["P(x) | A(x) -> B", "P(0.5) | A(x) -> C"]).unwrap_err();
    assert!(matches!(err, LSystemError::Syntax { .. }));
}

#[test]
fn test_probability_within_epsilon() {
    assert!(build(&["P(0.33333) | A -> B", "P(0.33333) | A -> C", "P(0.33334) | A -> D"]).is_ok());
    let strict = SystemBuilder::new()
        .rules(["P(0.3333) | A -> B", "P(0.3333) | A -> C", "P(0.3333) | A -> D"])
        .probability_epsilon(1e-6)
        .build();
    assert!(matches!(strict.err(), Some(LSystemError::Probability { .. })));
}

#[test]
fn test_probability_groups_are_per_context() {
    assert!(build(&["P(1) | A -> B", "P(0.5) | B < A -> C", "P(0.5) | B < A -> D"]).is_ok());
    let err = build(&["P(0.5) | A -> B", "P(0.5) | B < A -> C"]).unwrap_err();
    match err {
        LSystemError::Probability { spans, .. } => assert_eq!(spans, vec![SourceSpan::new(0, 6)]),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_negative_probability_is_rejected() {
    let err = build(&["P(-0.5) | A -> B", "P(1.5) | A -> C"]).unwrap_err();
    assert!(matches!(err, LSystemError::Probability { .. }));
}

#[test]
fn test_conditions_split_signatures() {
    assert!(build(&["A(x) : x < 1 -> B", "A(x) : x >= 1 -> C"]).is_ok());
    let err = build(&["A(x) : x < 1 -> B", "A(y) : x < 1 -> C"]).unwrap_err();
    assert!(matches!(err, LSystemError::Syntax { .. }));
    assert!(matches!(
        build(&["A(x) : x < 1 -> B", "A(x) : x < 1 -> C"]),
        Err(LSystemError::Conflict { .. })
    ));
}

#[test]
fn test_reserved_characters_cannot_be_ignored() {
    let result = SystemBuilder::new().rule("A -> B").ignore("<").build();
    assert!(result.is_err());
}

#[test]
fn test_table_indexes_by_target() {
    let mut map = CharSymbolMap::with_branches('[', ']');
    let branches = map.branch_symbols('[', ']').unwrap();
    let globals = vec!["t".to_string()];
    let table = RuleTable::compile(
        &["A -> B(t)", "B(x) -> A", "C < B(x) -> C"],
        &globals,
        TableSettings::new(branches),
        &mut map,
    )
    .unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.global_parameter_count(), 1);
    let b = map.symbol('B').unwrap();
    let specificity: Vec<usize> = table.candidates(b).map(|r| r.specificity()).collect();
    assert_eq!(specificity, vec![1, 0]);
    assert_eq!(table.candidates(map.symbol('C').unwrap()).count(), 0);
}

#[test]
fn test_branch_target_is_rejected() {
    assert!(matches!(build(&["[ -> A"]), Err(LSystemError::Syntax { .. })));
}

#[test]
fn test_custom_branch_symbols() {
    let mut compiled = SystemBuilder::new()
        .rule("A > C -> X")
        .branch_symbols('{', '}')
        .build()
        .unwrap();
    let state = compiled.reset("A{B}C", 0).unwrap();
    let next = compiled.step(&state, &[]).unwrap();
    assert_eq!(compiled.display(next.symbols()), "X{B}C");
}
