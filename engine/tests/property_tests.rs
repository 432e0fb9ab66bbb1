//! Property-based tests for scheduling and the presentation policy

use proptest::prelude::*;
use sdk::{Confidence, TrustReport};
use serde_json::json;
use std::collections::HashMap;

use warden_engine::conductor::{execution_levels, PlanStep};
use warden_engine::conductor::verifier::extract_identities;
use warden_engine::trust::{map_confidence, PresentationAction};

/// Steps `s0..sN`, each depending only on earlier steps
fn acyclic_steps() -> impl Strategy<Value = Vec<PlanStep>> {
    prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..3), 1..12)
        .prop_map(|deps| {
            deps.into_iter()
                .enumerate()
                .map(|(i, picks)| {
                    let mut step = PlanStep::new(format!("s{i}"), "search", json!({}));
                    if i > 0 {
                        let mut ids: Vec<String> =
                            picks.iter().map(|p| format!("s{}", p.index(i))).collect();
                        ids.sort();
                        ids.dedup();
                        step.depends_on = ids;
                    }
                    step
                })
                .collect()
        })
}

/// Steps with arbitrary dependencies: cycles, self-loops and unknown ids
fn arbitrary_steps() -> impl Strategy<Value = Vec<PlanStep>> {
    prop::collection::vec(prop::collection::vec(0usize..16, 0..4), 0..12).prop_map(|deps| {
        deps.into_iter()
            .enumerate()
            .map(|(i, targets)| {
                let mut step = PlanStep::new(format!("s{i}"), "search", json!({}));
                step.depends_on = targets.iter().map(|t| format!("s{t}")).collect();
                step
            })
            .collect()
    })
}

fn confidence() -> impl Strategy<Value = Confidence> {
    prop_oneof![
        Just(Confidence::High),
        Just(Confidence::Medium),
        Just(Confidence::Low),
        Just(Confidence::None),
    ]
}

proptest! {
    #[test]
    fn test_levels_cover_every_step_once(steps in acyclic_steps()) {
        let levels = execution_levels(&steps);
        let mut seen: Vec<usize> = levels.iter().flatten().copied().collect();
        seen.sort();
        prop_assert_eq!(seen, (0..steps.len()).collect::<Vec<_>>());
        prop_assert!(levels.iter().all(|level| !level.is_empty()));
    }

    #[test]
    fn test_any_graph_is_scheduled_exactly_once(steps in arbitrary_steps()) {
        let levels = execution_levels(&steps);
        let mut seen: Vec<usize> = levels.iter().flatten().copied().collect();
        seen.sort();
        prop_assert_eq!(seen, (0..steps.len()).collect::<Vec<_>>());
        prop_assert!(levels.len() <= steps.len());
    }

    #[test]
    fn test_dependencies_run_in_earlier_levels(steps in acyclic_steps()) {
        let levels = execution_levels(&steps);
        let level_of: HashMap<&str, usize> = levels
            .iter()
            .enumerate()
            .flat_map(|(depth, level)| level.iter().map(move |&i| (i, depth)))
            .map(|(i, depth)| (steps[i].id.as_str(), depth))
            .collect();

        for step in &steps {
            for dep in &step.depends_on {
                prop_assert!(level_of[dep.as_str()] < level_of[step.id.as_str()]);
            }
        }
    }

    #[test]
    fn test_policy_is_deterministic(
        confidence in confidence(),
        weight in 0.0f64..1.0,
        depth in 0u32..8,
    ) {
        let report = TrustReport {
            confidence,
            trust_weight: weight,
            path: vec!["did:key:hop".to_string()],
            depth,
        };
        let first = map_confidence(&report);
        prop_assert_eq!(&first, &map_confidence(&report));

        let (action, caveat) = first;
        prop_assert_eq!(caveat.is_none(), action == PresentationAction::Present);
        prop_assert_eq!(action == PresentationAction::Omit, confidence == Confidence::None);
    }

    #[test]
    fn test_extracted_identities_are_unique(ids in prop::collection::vec("[a-z0-9]{1,8}", 0..6)) {
        let text = ids
            .iter()
            .map(|id| format!("see did:key:{id} and"))
            .collect::<Vec<_>>()
            .join(" ");
        let found = extract_identities(&text);

        let mut unique = found.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), found.len());
        prop_assert!(found.iter().all(|id| id.starts_with("did:key:")));
    }
}
