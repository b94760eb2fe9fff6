//! Tests for HierarchyService

use rstest::{fixture, rstest};

use orgchart::application::services::HierarchyService;
use orgchart::application::ApplicationError;
use orgchart::domain::{Collaborator, DomainError, IntegrityIssue};
use orgchart::util::testing;

/// Ana{1, L1}, Bérénice{2, L2, sup 1}, Caio{3, L2, sup 1}, Davi{4, L3, sup 2}.
#[fixture]
fn org() -> Vec<Collaborator> {
    testing::init_test_setup();
    vec![
        Collaborator::new(1, "Ana Sousa", 1, 1).with_role("Director"),
        Collaborator::new(2, "Bérénice", 1, 2)
            .with_superior(1)
            .with_role("Engineering Manager"),
        Collaborator::new(3, "Caio", 1, 2).with_superior(1),
        Collaborator::new(4, "Davi", 1, 3)
            .with_superior(2)
            .with_role("Engineer"),
    ]
}

#[rstest]
fn given_unchanged_form_when_eligible_then_candidates_and_valid_current(org: Vec<Collaborator>) {
    let report = HierarchyService::new().eligible(&org, 4, 1, 3);

    assert_eq!(report.candidate_ids(), vec![1, 2, 3]);
    assert_eq!(report.current_superior, Some(2));
    assert!(report.current_superior_is_valid());
}

#[rstest]
fn given_promotion_above_superior_when_eligible_then_current_flagged(org: Vec<Collaborator>) {
    let report = HierarchyService::new().eligible(&org, 4, 1, 1);

    assert_eq!(report.candidate_ids(), vec![1]);
    assert_eq!(report.current_superior, Some(2));
    assert!(!report.current_superior_is_valid());
    let expected = DomainError::RankBelow {
        superior_id: 2,
        superior_level: 2,
        level: 1,
    }
    .to_string();
    assert_eq!(report.current_superior_problem, Some(expected));
}

#[rstest]
fn given_new_collaborator_when_eligible_then_no_current_superior(org: Vec<Collaborator>) {
    let report = HierarchyService::new().eligible(&org, 0, 1, 2);

    assert_eq!(report.candidate_ids(), vec![1, 2, 3]);
    assert_eq!(report.current_superior, None);
    assert!(report.current_superior_is_valid());
}

#[rstest]
fn given_sibling_superior_when_reassigning_then_subtree_moves(org: Vec<Collaborator>) {
    let impact = HierarchyService::new()
        .reassignment_impact(&org, 2, Some(3))
        .unwrap();

    assert_eq!(impact.node_id, 2);
    assert_eq!(impact.new_superior_id, Some(3));
    assert_eq!(impact.moved, vec![4]);
}

#[rstest]
fn given_lower_ranked_superior_when_reassigning_then_rank_error(org: Vec<Collaborator>) {
    let result = HierarchyService::new().reassignment_impact(&org, 2, Some(4));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::RankBelow { superior_id: 4, .. }))
    ));
}

#[rstest]
fn given_same_level_descendant_when_reassigning_then_cycle_error(mut org: Vec<Collaborator>) {
    org.push(Collaborator::new(5, "Eva", 1, 2).with_superior(2));

    let result = HierarchyService::new().reassignment_impact(&org, 2, Some(5));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::CycleDetected {
            node_id: 2,
            superior_id: 5
        }))
    ));
}

#[rstest]
fn given_promotion_to_root_when_reassigning_then_allowed(org: Vec<Collaborator>) {
    let impact = HierarchyService::new()
        .reassignment_impact(&org, 3, None)
        .unwrap();
    assert!(impact.moved.is_empty());
}

#[rstest]
#[case::impact(true)]
#[case::descendants(false)]
fn given_unknown_node_when_querying_then_unknown_collaborator(
    org: Vec<Collaborator>,
    #[case] impact: bool,
) {
    let service = HierarchyService::new();
    let err = if impact {
        service.reassignment_impact(&org, 99, None).unwrap_err()
    } else {
        service.descendants(&org, 99).unwrap_err()
    };
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::UnknownCollaborator(99))
    ));
}

#[rstest]
fn given_root_when_listing_descendants_then_all_others(org: Vec<Collaborator>) {
    let mut ids: Vec<_> = HierarchyService::new()
        .descendants(&org, 1)
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![2, 3, 4]);
}

#[rstest]
#[case::accent_insensitive("berenice", vec![2])]
#[case::case_insensitive("SOUSA", vec![1])]
#[case::role_match("engineer", vec![2, 4])]
#[case::no_match("zé", vec![])]
fn given_query_when_searching_then_folded_match(
    org: Vec<Collaborator>,
    #[case] query: &str,
    #[case] expected: Vec<u64>,
) {
    let found: Vec<_> = HierarchyService::new()
        .search(&org, query)
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(found, expected);
}

#[rstest]
#[case::root(None, true)]
#[case::valid(Some(1), true)]
#[case::rank(Some(3), false)]
fn given_proposal_when_validating_then_rules_applied(
    org: Vec<Collaborator>,
    #[case] superior: Option<u64>,
    #[case] ok: bool,
) {
    // Node 4 promoted to level 1.
    let result = HierarchyService::new().validate_assignment(&org, 4, 1, 1, superior);
    assert_eq!(result.is_ok(), ok);
}

#[rstest]
fn given_clean_org_when_checking_integrity_then_no_issues(org: Vec<Collaborator>) {
    assert!(HierarchyService::new().integrity(&org).is_empty());
}

#[rstest]
fn given_corrupted_org_when_checking_integrity_then_issues_serialize_with_kind(
    mut org: Vec<Collaborator>,
) {
    org[0].superior_id = Some(4);

    let issues = HierarchyService::new().integrity(&org);

    assert_eq!(
        issues,
        vec![
            IntegrityIssue::RankInversion {
                id: 1,
                superior_id: 4,
                level_id: 1,
                superior_level_id: 3
            },
            IntegrityIssue::Cycle {
                members: vec![1, 4, 2]
            },
        ]
    );
    let json = serde_json::to_value(&issues).unwrap();
    assert_eq!(json[0]["kind"], "rankInversion");
    assert_eq!(json[0]["superiorLevelId"], 3);
    assert_eq!(json[1]["members"], serde_json::json!([1, 4, 2]));
}
