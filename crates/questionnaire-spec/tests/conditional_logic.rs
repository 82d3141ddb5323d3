use questionnaire_spec::{
    Answers, Condition, ConditionOperator, ConditionValue, ConditionalLogic, LogicOperator,
    evaluate_condition, evaluate_conditional_logic,
};

fn answers(pairs: &[(&str, &str)]) -> Answers {
    pairs.iter().map(|(key, value)| (*key, *value)).collect()
}

fn equals(key: &str, value: &str) -> Condition {
    Condition::new(key, ConditionOperator::Equals, value)
}

#[test]
fn equals_compares_string_forms() {
    let condition = equals("a", "yes");
    assert!(evaluate_condition(&condition, &answers(&[("a", "yes")])));
    assert!(!evaluate_condition(&condition, &answers(&[("a", "no")])));

    let mut numeric = Answers::new();
    numeric.insert("a", 5_i64);
    assert!(evaluate_condition(&equals("a", "5"), &numeric));
}

#[test]
fn missing_answer_compares_as_empty_string() {
    let empty = Answers::new();
    assert!(evaluate_condition(&equals("a", ""), &empty));
    assert!(!evaluate_condition(&equals("a", "yes"), &empty));
    assert!(evaluate_condition(
        &Condition::new("a", ConditionOperator::NotEquals, "yes"),
        &empty
    ));
}

#[test]
fn contains_matches_list_elements_or_substrings() {
    let condition = Condition::new("a", ConditionOperator::Contains, "x");
    let mut list = Answers::new();
    list.insert("a", vec!["x", "y"]);
    assert!(evaluate_condition(&condition, &list));

    let mut partial = Answers::new();
    partial.insert("a", vec!["xx"]);
    assert!(!evaluate_condition(&condition, &partial));

    let substring = Condition::new("a", ConditionOperator::Contains, "ell");
    assert!(evaluate_condition(&substring, &answers(&[("a", "hello")])));
    assert!(!evaluate_condition(&substring, &answers(&[("a", "help")])));
}

#[test]
fn numeric_comparisons_coerce_both_sides() {
    let greater = Condition::new("a", ConditionOperator::GreaterThan, "5");
    let less = Condition::new("a", ConditionOperator::LessThan, "5");

    let mut ten = Answers::new();
    ten.insert("a", 10_i64);
    assert!(evaluate_condition(&greater, &ten));
    assert!(!evaluate_condition(&less, &ten));

    let three = answers(&[("a", "3")]);
    assert!(!evaluate_condition(&greater, &three));
    assert!(evaluate_condition(&less, &three));
}

#[test]
fn numeric_comparisons_fail_on_missing_or_non_numeric_answers() {
    let greater = Condition::new("a", ConditionOperator::GreaterThan, "-100");
    let less = Condition::new("a", ConditionOperator::LessThan, "100");

    let empty = Answers::new();
    assert!(!evaluate_condition(&greater, &empty));
    assert!(!evaluate_condition(&less, &empty));

    let text = answers(&[("a", "abc")]);
    assert!(!evaluate_condition(&greater, &text));
    assert!(!evaluate_condition(&less, &text));

    let bad_threshold = Condition::new("a", ConditionOperator::GreaterThan, "many");
    assert!(!evaluate_condition(&bad_threshold, &answers(&[("a", "3")])));
}

#[test]
fn membership_with_list_values() {
    let within = Condition::new("a", ConditionOperator::In, vec!["x", "y"]);
    let outside = Condition::new("a", ConditionOperator::NotIn, vec!["x", "y"]);

    assert!(evaluate_condition(&within, &answers(&[("a", "x")])));
    assert!(!evaluate_condition(&within, &answers(&[("a", "z")])));
    assert!(evaluate_condition(&outside, &answers(&[("a", "z")])));
    assert!(!evaluate_condition(&outside, &answers(&[("a", "x")])));
}

#[test]
fn membership_with_single_value_is_asymmetric() {
    let within = Condition::new("a", ConditionOperator::In, "x");
    let outside = Condition::new("a", ConditionOperator::NotIn, "x");

    for set in [answers(&[("a", "x")]), answers(&[("a", "z")]), Answers::new()] {
        assert!(!evaluate_condition(&within, &set));
        assert!(evaluate_condition(&outside, &set));
    }
}

#[test]
fn unrecognized_operator_never_matches() {
    let condition: Condition = serde_json::from_str(
        r#"{ "fieldKey": "a", "operator": "STARTS_WITH", "value": "x" }"#,
    )
    .expect("deserialize");
    assert_eq!(condition.operator, ConditionOperator::Unknown);
    assert!(!evaluate_condition(&condition, &answers(&[("a", "x")])));
}

#[test]
fn missing_or_empty_logic_is_always_visible() {
    let set = answers(&[("a", "1")]);
    assert!(evaluate_conditional_logic(None, &set));
    assert!(evaluate_conditional_logic(None, &Answers::new()));

    let empty_show = ConditionalLogic::show(LogicOperator::And, vec![]);
    let empty_hide = ConditionalLogic::hide(LogicOperator::Or, vec![]);
    assert!(evaluate_conditional_logic(Some(&empty_show), &set));
    assert!(evaluate_conditional_logic(Some(&empty_hide), &set));
}

#[test]
fn show_and_requires_every_condition() {
    let logic = ConditionalLogic::show(LogicOperator::And, vec![equals("a", "1"), equals("b", "2")]);
    assert!(logic.is_visible(&answers(&[("a", "1"), ("b", "2")])));
    assert!(!logic.is_visible(&answers(&[("a", "1"), ("b", "3")])));
}

#[test]
fn show_or_requires_any_condition() {
    let logic = ConditionalLogic::show(LogicOperator::Or, vec![equals("a", "1"), equals("b", "2")]);
    assert!(logic.is_visible(&answers(&[("a", "1"), ("b", "3")])));
    assert!(!logic.is_visible(&answers(&[("a", "0"), ("b", "0")])));
}

#[test]
fn hide_negates_combined_result() {
    let logic = ConditionalLogic::hide(LogicOperator::And, vec![equals("a", "1")]);
    assert!(!evaluate_conditional_logic(Some(&logic), &answers(&[("a", "1")])));
    assert!(evaluate_conditional_logic(Some(&logic), &answers(&[("a", "2")])));
}

#[test]
fn logic_deserializes_from_designer_json() {
    let logic: ConditionalLogic = serde_json::from_str(
        r#"{
            "action": "SHOW",
            "logicOperator": "OR",
            "conditions": [
                { "fieldKey": "role", "operator": "IN", "value": ["leader", "member"] },
                { "fieldKey": "points", "operator": "GREATER_THAN", "value": "100" }
            ]
        }"#,
    )
    .expect("deserialize");
    assert_eq!(
        logic.conditions[0].value,
        ConditionValue::List(vec!["leader".into(), "member".into()])
    );

    assert!(logic.is_visible(&answers(&[("role", "member")])));
    assert!(logic.is_visible(&answers(&[("role", "intern"), ("points", "120")])));
    assert!(!logic.is_visible(&answers(&[("role", "intern"), ("points", "80")])));
}

#[test]
fn numeric_condition_values_deserialize_as_strings() {
    let condition: Condition =
        serde_json::from_str(r#"{"fieldKey":"age","operator":"GREATER_THAN","value":18}"#)
            .expect("deserialize");
    assert_eq!(condition.value, ConditionValue::Single("18".into()));

    let mut adult = Answers::new();
    adult.insert("age", 20_i64);
    assert!(evaluate_condition(&condition, &adult));
    let mut minor = Answers::new();
    minor.insert("age", 10_i64);
    assert!(!evaluate_condition(&condition, &minor));

    let membership: Condition =
        serde_json::from_str(r#"{"fieldKey":"tier","operator":"IN","value":[1, "2", 2.5, true]}"#)
            .expect("deserialize");
    assert_eq!(
        membership.value,
        ConditionValue::List(vec!["1".into(), "2".into(), "2.5".into(), "true".into()])
    );
    assert!(evaluate_condition(&membership, &answers(&[("tier", "1")])));
    let mut numeric = Answers::new();
    numeric.insert("tier", 2_i64);
    assert!(evaluate_condition(&membership, &numeric));
    assert!(!evaluate_condition(&membership, &answers(&[("tier", "3")])));
}

#[test]
fn large_numbers_compare_in_exponent_form() {
    let mut huge = Answers::new();
    huge.insert("a", 1e21);
    assert!(evaluate_condition(&equals("a", "1e+21"), &huge));
    assert!(!evaluate_condition(&equals("a", "1000000000000000000000"), &huge));

    let greater = Condition::new("a", ConditionOperator::GreaterThan, "0x10");
    let mut twenty = Answers::new();
    twenty.insert("a", 20_i64);
    assert!(evaluate_condition(&greater, &twenty));
}

#[test]
fn evaluation_leaves_answers_untouched() {
    let set = answers(&[("a", "1")]);
    let before = set.clone();
    let logic = ConditionalLogic::show(LogicOperator::And, vec![equals("a", "1")]);
    for _ in 0..3 {
        assert!(logic.is_visible(&set));
    }
    assert_eq!(set, before);
}
