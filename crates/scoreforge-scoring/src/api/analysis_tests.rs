use super::analysis::*;
use super::weight_overrides::ConstraintWeightOverrides;
use crate::fact::{FactId, Facts};
use crate::tuple::Element;
use scoreforge_config::ScoreDirectorConfig;
use scoreforge_core::{ConstraintRef, HardSoftScore, ImpactType, Score, ScoreForgeError, SimpleScore};

#[derive(Clone, Debug)]
struct Visit {
    city: &'static str,
}

fn store() -> (Facts, FactId, FactId) {
    let mut facts = Facts::new();
    let a = facts.insert(Visit { city: "Ghent" }).id();
    let b = facts.insert(Visit { city: "Leuven" }).id();
    (facts, a, b)
}

fn matched(name: &str, score: i64, facts: &Facts, ids: &[FactId]) -> ConstraintMatch<SimpleScore> {
    let elements: Vec<Element> = ids.iter().map(|id| Element::Fact(*id)).collect();
    ConstraintMatch::new(
        ConstraintRef::new("", name),
        SimpleScore::of(score),
        ConstraintJustification::from_elements(facts, &elements),
    )
}

fn total(name: &str, score: i64, count: usize) -> ConstraintMatchTotal<SimpleScore> {
    ConstraintMatchTotal {
        constraint_ref: ConstraintRef::new("", name),
        impact_type: ImpactType::Penalty,
        weight: Some(SimpleScore::of(-1)),
        score: SimpleScore::of(score),
        match_count: count,
    }
}

// ============================================================================
// Justification
// ============================================================================

#[test]
fn test_justification_from_facts_and_values() {
    let (facts, a, _) = store();
    let elements = vec![Element::Fact(a), Element::value(3_i64)];
    let justification = ConstraintJustification::from_elements(&facts, &elements);

    assert_eq!(justification.facts.len(), 1);
    assert_eq!(justification.facts[0].type_name, "Visit");
    assert!(justification.involves(a));
    assert!(justification.description.contains("Ghent"));
    assert!(justification.description.ends_with(", 3"));
}

#[test]
fn test_empty_justification() {
    let justification = ConstraintJustification::new(Vec::new());
    assert_eq!(justification.description, "No facts");
}

// ============================================================================
// Totals and explanations
// ============================================================================

#[test]
fn test_is_hard_reads_first_level() {
    let hard = ConstraintMatchTotal {
        constraint_ref: ConstraintRef::new("", "hard"),
        impact_type: ImpactType::Penalty,
        weight: Some(HardSoftScore::of_hard(-1)),
        score: HardSoftScore::zero(),
        match_count: 0,
    };
    let soft = ConstraintMatchTotal {
        weight: Some(HardSoftScore::of_soft(-1)),
        ..hard.clone()
    };
    let dynamic = ConstraintMatchTotal {
        weight: None,
        ..hard.clone()
    };
    assert!(hard.is_hard());
    assert!(!soft.is_hard());
    assert!(!dynamic.is_hard());
}

#[test]
fn test_explanation_sorts_worst_first() {
    let explanation = ScoreExplanation::new(
        SimpleScore::of(-7),
        vec![
            ConstraintAnalysis::new(total("mild", -1, 1), Vec::new()),
            ConstraintAnalysis::new(total("zero", 0, 0), Vec::new()),
            ConstraintAnalysis::new(total("severe", -6, 3), Vec::new()),
        ],
    );
    let names: Vec<&str> = explanation
        .constraint_analyses
        .iter()
        .map(ConstraintAnalysis::name)
        .collect();
    assert_eq!(names, vec!["severe", "mild", "zero"]);
    assert_eq!(explanation.total_match_count(), 4);
    assert_eq!(explanation.non_zero_constraints().len(), 2);
}

#[test]
fn test_explanation_lookup_by_short_and_full_name() {
    let mut scoped = total("late", -2, 2);
    scoped.constraint_ref = ConstraintRef::new("visits", "late");
    let explanation =
        ScoreExplanation::new(SimpleScore::of(-2), vec![ConstraintAnalysis::new(scoped, Vec::new())]);
    assert!(explanation.get("late").is_some());
    assert!(explanation.get("visits/late").is_some());
    assert!(explanation.get("early").is_none());
}

// ============================================================================
// Indictments
// ============================================================================

#[test]
fn test_indictments_accumulate_per_fact() {
    let (facts, a, b) = store();
    let matches = vec![
        matched("pair", -2, &facts, &[a, b]),
        matched("solo", -1, &facts, &[a]),
    ];
    let map = IndictmentMap::from_matches(matches);

    assert_eq!(map.len(), 2);
    let ghent = map.get(a).unwrap();
    assert_eq!(ghent.score, SimpleScore::of(-3));
    assert_eq!(ghent.match_count(), 2);
    assert_eq!(ghent.constraint_count(), 2);
    assert_eq!(map.get(b).unwrap().score, SimpleScore::of(-2));

    let worst: Vec<FactId> = map.worst_facts().iter().map(|f| f.id).collect();
    assert_eq!(worst, vec![a, b]);
}

#[test]
fn test_fact_indicted_once_per_match() {
    let (facts, a, _) = store();
    let map = IndictmentMap::from_matches(vec![matched("self", -4, &facts, &[a, a])]);
    assert_eq!(map.get(a).unwrap().score, SimpleScore::of(-4));
    assert_eq!(map.get(a).unwrap().match_count(), 1);
}

// ============================================================================
// Weight overrides
// ============================================================================

#[test]
fn test_overrides_basic_operations() {
    let mut overrides = ConstraintWeightOverrides::<SimpleScore>::new();
    assert!(overrides.is_empty());
    overrides.put("b", SimpleScore::of(2));
    overrides.put("a", SimpleScore::of(1));
    assert_eq!(overrides.names(), vec!["a", "b"]);
    assert_eq!(overrides.get("a"), Some(SimpleScore::of(1)));
    assert_eq!(
        overrides.get_or_default("c", SimpleScore::of(9)),
        SimpleScore::of(9)
    );
    assert_eq!(overrides.remove("a"), Some(SimpleScore::of(1)));
    assert!(!overrides.contains("a"));
    overrides.clear();
    assert_eq!(overrides.len(), 0);
}

#[test]
fn test_overrides_from_config() {
    let config = ScoreDirectorConfig::new()
        .with_constraint_weight("shifts/Overlap", "-5hard/0soft")
        .with_constraint_weight("Unassigned", "0hard/-2soft");
    let overrides = ConstraintWeightOverrides::<HardSoftScore>::from_config(&config).unwrap();
    assert_eq!(overrides.get("shifts/Overlap"), Some(HardSoftScore::of(-5, 0)));
    assert_eq!(overrides.get("Unassigned"), Some(HardSoftScore::of_soft(-2)));
}

#[test]
fn test_overrides_from_config_rejects_bad_score() {
    let config = ScoreDirectorConfig::new().with_constraint_weight("Overlap", "lots");
    let err = ConstraintWeightOverrides::<HardSoftScore>::from_config(&config).unwrap_err();
    assert!(matches!(err, ScoreForgeError::Config(_)));
}
