use shared::domain::{Assessment, Group, GroupId, SessionId, StudySession};

use crate::{EditError, EditorState, GroupAction, InvariantViolation, SequentialIds};

fn two_group_tree() -> Vec<Group> {
    vec![
        Group {
            id: GroupId::from("g1"),
            name: "Arm A".to_string(),
            active: true,
            sessions: vec![StudySession {
                id: SessionId::from("s1"),
                name: "Baseline".to_string(),
                active: true,
                assessments: vec![Assessment::new("a0", "Flanker")],
            }],
        },
        Group {
            id: GroupId::from("g2"),
            name: "Arm B".to_string(),
            active: false,
            sessions: Vec::new(),
        },
    ]
}

#[test]
fn loading_rejects_trees_with_two_active_groups() {
    let mut groups = two_group_tree();
    groups[1].active = true;

    let err = EditorState::from_groups(groups).err().expect("must reject");
    assert_eq!(
        err,
        InvariantViolation::MultipleActiveGroups(vec![GroupId::from("g1"), GroupId::from("g2")])
    );
}

#[test]
fn rejected_dispatch_keeps_previous_tree() {
    let mut state = EditorState::from_groups(two_group_tree()).expect("state");
    let before = state.groups().to_vec();

    let err = state
        .dispatch(GroupAction::RenameGroup {
            id: GroupId::from("missing"),
            name: "x".to_string(),
        })
        .expect_err("unknown group");

    assert_eq!(err, EditError::GroupNotFound(GroupId::from("missing")));
    assert_eq!(state.groups(), before.as_slice());
}

#[test]
fn active_group_and_session_follow_dispatches() {
    let mut state = EditorState::from_groups(two_group_tree()).expect("state");
    let (group, session) = state.active_group_and_session().expect("active group");
    assert_eq!(group.id, GroupId::from("g1"));
    assert_eq!(session.map(|s| s.name.as_str()), Some("Baseline"));

    state
        .dispatch(GroupAction::SetActiveGroup {
            id: GroupId::from("g2"),
        })
        .expect("switch group");
    let (group, session) = state.active_group_and_session().expect("active group");
    assert_eq!(group.id, GroupId::from("g2"));
    assert!(session.is_none());
}

#[test]
fn new_session_is_named_after_session_count() {
    let mut state = EditorState::from_groups(two_group_tree())
        .expect("state")
        .with_id_source(SequentialIds::new("s-new-"));

    let action = state
        .new_session_in_active_group(Vec::new())
        .expect("active group");
    state.dispatch(action).expect("add session");

    let session = state.active_session().expect("new session is active");
    assert_eq!(session.name, "Session1");
    assert_eq!(session.id, SessionId::from("s-new-1"));
}

#[test]
fn add_to_active_session_appends_selection() {
    let mut state = EditorState::from_groups(two_group_tree()).expect("state");
    let action = state
        .add_to_active_session(vec![Assessment::new("a1", "Memory")])
        .expect("active session");
    state.dispatch(action).expect("update");

    let ids: Vec<_> = state
        .active_session()
        .expect("session")
        .assessments
        .iter()
        .map(|a| a.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["a0", "a1"]);
}

#[test]
fn add_to_active_session_needs_a_selection() {
    let mut state = EditorState::new();
    state
        .dispatch(GroupAction::AddGroup {
            group: None,
            is_make_active: true,
        })
        .expect("add group");

    let err = state
        .add_to_active_session(vec![Assessment::new("a1", "Memory")])
        .expect_err("no session yet");
    assert_eq!(err, EditError::NoActiveSession);
}

#[test]
fn duplicate_last_group_copies_tail() {
    let mut state = EditorState::from_groups(two_group_tree()).expect("state");
    let action = state.duplicate_last_group().expect("has groups");
    state.dispatch(action).expect("duplicate");

    let groups = state.groups();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[2].name, "Arm B");
    assert_ne!(groups[2].id, groups[1].id);
    assert!(EditorState::new().duplicate_last_group().is_none());
}

#[test]
fn replace_swaps_whole_tree() {
    let mut state = EditorState::from_groups(two_group_tree()).expect("state");
    state.replace(Vec::new()).expect("replace");
    assert!(state.groups().is_empty());
    assert!(state.active_group().is_none());
    assert!(state.into_groups().is_empty());
}
