use lsystem_engine::config::SteppingConfig;
use lsystem_engine::engines::stepping::{
    CancellationToken, ChannelStepObserver, CompiledSystem, StepMessage, SystemBuilder,
};
use lsystem_engine::LSystemError;

fn system(rules: &[&str]) -> CompiledSystem {
    SystemBuilder::new().rules(rules.iter().copied()).build().unwrap()
}

fn generations(compiled: &mut CompiledSystem, axiom: &str, steps: usize) -> Vec<String> {
    let mut state = compiled.reset(axiom, 0).unwrap();
    let mut out = Vec::new();
    for _ in 0..steps {
        state = compiled.step(&state, &[]).unwrap();
        out.push(compiled.display(state.symbols()));
    }
    out
}

#[test]
fn test_algae_growth() {
    let mut compiled = system(&["A -> AB", "B -> A"]);
    assert_eq!(
        generations(&mut compiled, "B", 4),
        vec!["A", "AB", "ABA", "ABAAB"]
    );
}

#[test]
fn test_unmatched_symbols_pass_through() {
    let mut compiled = system(&["Q -> R"]);
    let state = compiled.reset("A(1, 2)[B]C", 0).unwrap();
    let next = compiled.step(&state, &[]).unwrap();
    assert_eq!(next.symbols(), state.symbols());
    assert_eq!(next.step(), 1);
}

#[test]
fn test_context_sensitive_growth() {
    let mut compiled = system(&["A -> AB", "B -> CDC", "D > C -> A", "D < C > D -> B"]);
    assert_eq!(
        generations(&mut compiled, "A", 5),
        vec![
            "AB",
            "ABCDC",
            "ABCDCCAC",
            "ABCDCCACCABC",
            "ABCDCCACCABCCABCDCC",
        ]
    );
}

#[test]
fn test_parameters_thread_through_generations() {
    let mut compiled = system(&["A(x) -> A(x + 1)"]);
    assert_eq!(
        generations(&mut compiled, "A(1)", 3),
        vec!["A(2)", "A(3)", "A(4)"]
    );
}

#[test]
fn test_multiple_parameters() {
    let mut compiled = system(&["A(x, y) -> A(x + y, x * y)"]);
    assert_eq!(
        generations(&mut compiled, "A(1, 1)", 4),
        vec!["A(2, 1)", "A(3, 2)", "A(5, 6)", "A(11, 30)"]
    );
}

#[test]
fn test_fibonacci_through_two_sided_context() {
    let mut compiled = system(&["A(x) > B(y) -> A(x + y)", "A(x) < B(y) -> B(x)"]);
    assert_eq!(
        generations(&mut compiled, "A(1)B(1)", 4),
        vec!["A(2)B(1)", "A(3)B(2)", "A(5)B(3)", "A(8)B(5)"]
    );
}

#[test]
fn test_condition_gates_rule() {
    let mut compiled = system(&["A(x) : x < 6 -> A(x + 1)"]);
    assert_eq!(
        generations(&mut compiled, "A(4)", 3),
        vec!["A(5)", "A(6)", "A(6)"]
    );
}

#[test]
fn test_arity_mismatch_is_not_a_match() {
    let mut compiled = system(&["A(x) -> B"]);
    assert_eq!(generations(&mut compiled, "AA(1)", 1), vec!["AB"]);
}

#[test]
fn test_empty_replacement_deletes_symbol() {
    let mut compiled = system(&["B ->", "A > A ->"]);
    assert_eq!(generations(&mut compiled, "ABAAB", 1), vec!["AA"]);
}

#[test]
fn test_most_specific_rule_wins() {
    let mut compiled = system(&[
        "A -> B",
        "A > A -> C",
        "A > ABCD -> F",
        "A > ABC -> E",
        "A > AB -> D",
    ]);
    assert_eq!(generations(&mut compiled, "AABCD", 1), vec!["FBBCD"]);
}

#[test]
fn test_equal_specificity_keeps_definition_order() {
    let mut forward = system(&["A > A -> B", "A < A -> C"]);
    assert_eq!(generations(&mut forward, "AAA", 1), vec!["BBC"]);

    let mut reversed = system(&["A < A -> C", "A > A -> B"]);
    assert_eq!(generations(&mut reversed, "AAA", 1), vec!["BCC"]);
}

#[test]
fn test_ignored_symbols_are_invisible_to_context() {
    let mut compiled = SystemBuilder::new()
        .rules(["A -> A1B2", "B -> 3A4", "A > A -> 5", "A < A -> 6B7"])
        .ignore("1234567")
        .build()
        .unwrap();
    assert_eq!(
        generations(&mut compiled, "B", 3),
        vec!["3A4", "3A1B24", "3A1B213A424"]
    );
}

#[test]
fn test_global_parameters_are_visible_to_expressions() {
    let mut compiled = SystemBuilder::new()
        .rule("A(x) -> A(x * scale + offset)")
        .global("scale")
        .global("offset")
        .build()
        .unwrap();
    let state = compiled.reset("A(1)", 0).unwrap();
    let next = compiled.step(&state, &[3.0, 0.5]).unwrap();
    assert_eq!(compiled.display(next.symbols()), "A(3.5)");
}

#[test]
fn test_global_parameter_count_must_match() {
    let mut compiled = SystemBuilder::new()
        .rule("A(x) -> A(x * scale)")
        .global("scale")
        .build()
        .unwrap();
    let state = compiled.reset("A(1)", 0).unwrap();
    let err = compiled.step(&state, &[]).unwrap_err();
    assert!(matches!(
        err,
        LSystemError::GlobalParameterMismatch {
            expected: 1,
            actual: 0
        }
    ));
    assert!(compiled.step(&state, &[1.0, 2.0]).is_err());
}

#[test]
fn test_unbalanced_axiom_is_rejected() {
    let mut compiled = system(&["A -> B"]);
    let axiom = compiled.parse_axiom("A[B").unwrap_err();
    assert!(matches!(axiom, LSystemError::Syntax { .. }));

    let symbols = compiled.symbols.clone();
    let open = symbols.symbol('[').unwrap();
    let a = symbols.symbol('A').unwrap();
    let raw = lsystem_engine::SymbolString::from_symbols(&[a, open]);
    assert!(matches!(
        compiled.system.reset_state(raw, 0),
        Err(LSystemError::MalformedString(_))
    ));
}

#[test]
fn test_cancelled_step_returns_error() {
    let mut compiled = system(&["A -> AB"]);
    let state = compiled.reset("A", 0).unwrap();
    let token = CancellationToken::new();
    token.cancel();
    let err = compiled
        .system
        .step_with(&state, &[], &mut (), Some(&token))
        .unwrap_err();
    assert!(matches!(err, LSystemError::Cancelled { step: 0 }));
}

#[test]
fn test_channel_observer_reports_each_phase() {
    let mut compiled = system(&["A -> AB", "B -> A"]);
    let state = compiled.reset("A", 0).unwrap();
    let (sender, receiver) = std::sync::mpsc::channel();
    let mut observer = ChannelStepObserver::new(sender);
    let last = compiled.system.run(state, &[], 3, &mut observer).unwrap();
    assert_eq!(compiled.display(last.symbols()), "ABAAB");

    let messages: Vec<StepMessage> = receiver.try_iter().collect();
    assert_eq!(messages.len(), 9);
    match messages.last() {
        Some(StepMessage::StepComplete { step, length }) => {
            assert_eq!(*step, 2);
            assert_eq!(*length, 5);
        }
        _ => panic!("last message should complete step 2"),
    }
    assert!(matches!(
        messages[1],
        StepMessage::MatchComplete { step: 0, rewritten: 1 }
    ));
}

#[test]
fn test_dedicated_worker_pool() {
    let stepping = SteppingConfig {
        parallel: true,
        batch_size: 2,
        worker_threads: Some(2),
    };
    let mut compiled = SystemBuilder::new()
        .rules(["A -> AB", "B -> A"])
        .stepping(stepping)
        .build()
        .unwrap();
    assert_eq!(
        generations(&mut compiled, "B", 6),
        vec!["A", "AB", "ABA", "ABAAB", "ABAABABA", "ABAABABAABAAB"]
    );
}
