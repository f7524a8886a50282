use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode as HttpStatus},
    routing::{get, post},
    Json, Router,
};
use editor::GroupAction;
use serde_json::json;
use shared::{
    domain::{GroupId, SessionId},
    error::{ApiError, ErrorCode},
    session::UserSessionData,
};
use tokio::{net::TcpListener, sync::Mutex};

const TOKEN: &str = "session-token";

#[derive(Clone, Default)]
struct ServerState {
    studies: Arc<Mutex<HashMap<String, Value>>>,
    saved: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TOKEN)
}

async fn handle_get_study(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (HttpStatus, Json<Value>) {
    if !authorized(&headers) {
        return (
            HttpStatus::UNAUTHORIZED,
            Json(json!({"statusCode": 401, "message": "not signed in"})),
        );
    }
    match state.studies.lock().await.get(&id) {
        Some(study) => (HttpStatus::OK, Json(study.clone())),
        None => (
            HttpStatus::NOT_FOUND,
            Json(json!({"statusCode": 404, "message": "Study not found."})),
        ),
    }
}

async fn handle_save_study(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (HttpStatus, Json<Value>) {
    let version = body["version"].as_i64().unwrap_or(0) + 1;
    state.saved.lock().await.push(body.clone());
    state.studies.lock().await.insert(id, body);
    (HttpStatus::OK, Json(json!({ "version": version })))
}

async fn handle_echo(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let token = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "params": params, "token": token }))
}

async fn handle_consent() -> (HttpStatus, Json<Value>) {
    (
        HttpStatus::PRECONDITION_FAILED,
        Json(json!({"message": "consent required", "sessionToken": "partial"})),
    )
}

async fn handle_reject() -> (HttpStatus, Json<Value>) {
    (
        HttpStatus::BAD_REQUEST,
        Json(json!({"statusCode": 400, "message": "name is required"})),
    )
}

async fn spawn_study_server(state: ServerState) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route(
            "/v5/studies/:id",
            get(handle_get_study).post(handle_save_study),
        )
        .route("/echo", get(handle_echo))
        .route("/consent", post(handle_consent))
        .route("/reject", post(handle_reject))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn client_for(base: &str) -> StudyClient {
    StudyClient::new(ClientSettings {
        endpoint: base.to_string(),
        synapse_endpoint: base.to_string(),
        ..ClientSettings::default()
    })
    .expect("client")
}

fn signed_in() -> SessionContext {
    SessionContext::start(UserSessionData {
        id: "user-1".into(),
        token: TOKEN.into(),
        first_name: None,
        org_membership: None,
        roles: Vec::new(),
        app_id: None,
    })
}

fn seeded_state() -> ServerState {
    let state = ServerState::default();
    let study = json!({
        "id": "study-1",
        "name": "Sleep",
        "version": 4,
        "phase": "design",
        "groups": [
            {
                "id": "g1",
                "name": "Arm A",
                "active": true,
                "sessions": [
                    {"id": "s1", "name": "Baseline", "active": true,
                     "assessments": [{"guid": "a0", "title": "Flanker"}]}
                ]
            }
        ]
    });
    state
        .studies
        .try_lock()
        .expect("fresh lock")
        .insert("study-1".to_string(), study);
    state
}

#[tokio::test]
async fn get_sends_fields_as_query_and_session_header() {
    let base = spawn_study_server(ServerState::default()).await;
    let client = client_for(&base);

    let response = client
        .call_endpoint::<Value>(
            "/echo",
            RestMethod::Get,
            &json!({"studyId": "abc", "pageSize": 50}),
            Some(TOKEN),
            EndpointTarget::Study,
        )
        .await
        .expect("echo");

    assert_eq!(response.status, 200);
    assert!(response.ok);
    assert_eq!(response.data["params"]["studyId"], "abc");
    assert_eq!(response.data["params"]["pageSize"], "50");
    assert_eq!(response.data["token"], TOKEN);
}

#[tokio::test]
async fn precondition_failed_is_not_an_error() {
    let base = spawn_study_server(ServerState::default()).await;
    let client = client_for(&base);

    let response = client
        .call_endpoint::<Value>(
            "/consent",
            RestMethod::Post,
            &json!({}),
            None,
            EndpointTarget::Synapse,
        )
        .await
        .expect("412 passes through");

    assert_eq!(response.status, 412);
    assert!(!response.ok);
    assert_eq!(response.data["sessionToken"], "partial");
}

#[tokio::test]
async fn error_status_carries_service_message() {
    let base = spawn_study_server(ServerState::default()).await;
    let client = client_for(&base);

    let err = client
        .call_endpoint::<Value>(
            "/reject",
            RestMethod::Post,
            &json!({"name": ""}),
            Some(TOKEN),
            EndpointTarget::Study,
        )
        .await
        .expect_err("400 fails");

    assert_eq!(err.status(), Some(400));
    assert_eq!(ApiError::from(&err).code, ErrorCode::Validation);
    match err {
        ClientError::Api { message, .. } => assert_eq!(message, "name is required"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn get_study_maps_404_to_none_and_requires_session() {
    let base = spawn_study_server(seeded_state()).await;
    let client = client_for(&base);

    let missing = client
        .get_study(&signed_in(), &StudyId::from("nope"))
        .await
        .expect("lookup");
    assert!(missing.is_none());

    let err = client
        .get_study(&SessionContext::new(), &StudyId::from("study-1"))
        .await
        .expect_err("no session");
    assert!(matches!(err, ClientError::MissingSession));
}

#[tokio::test]
async fn study_ids_are_sent_as_one_path_segment() {
    let state = seeded_state();
    for id in ["odd/id", "other?x=1", "hash#tag"] {
        state
            .studies
            .lock()
            .await
            .insert(id.to_string(), json!({"id": id, "name": id, "groups": []}));
    }
    let base = spawn_study_server(state.clone()).await;
    let client = client_for(&base);
    let session = signed_in();

    let fragment = client
        .get_study(&session, &StudyId::from("study-1#frag"))
        .await
        .expect("lookup");
    assert!(fragment.is_none());

    for id in ["odd/id", "other?x=1", "hash#tag"] {
        let study = client
            .get_study(&session, &StudyId::from(id))
            .await
            .expect("lookup")
            .expect("seeded study");
        assert_eq!(study.id.as_str(), id);
    }

    let mut study = Study::new("study-1?version=9", "Shadow");
    study.version = Some(1);
    client.save_study(&session, &study).await.expect("save");

    let studies = state.studies.lock().await;
    assert_eq!(studies["study-1?version=9"]["name"], "Shadow");
    assert_eq!(studies["study-1"]["name"], "Sleep");
}

#[tokio::test]
async fn editing_session_loads_edits_and_flushes() {
    let state = seeded_state();
    let base = spawn_study_server(state.clone()).await;
    let session = signed_in();
    let service: Arc<dyn StudyService> = Arc::new(client_for(&base));

    let mut editing = StudyEditingSession::load(service, &session, &StudyId::from("study-1"))
        .await
        .expect("load");
    assert!(!editing.is_dirty());
    assert_eq!(editing.editor().groups().len(), 1);

    editing
        .dispatch(GroupAction::UpdateSessionName {
            session_id: SessionId::from("s1"),
            session_name: "Week 1".to_string(),
        })
        .expect("rename session");
    editing
        .dispatch(GroupAction::AddGroup {
            group: None,
            is_make_active: false,
        })
        .expect("add group");
    assert!(editing.is_dirty());

    let saved = editing.save(&session).await.expect("save");
    assert_eq!(saved.version, Some(5));
    assert_eq!(saved.groups.len(), 2);
    assert!(!editing.is_dirty());

    let posted = state.saved.lock().await;
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0]["phase"], "design");
    assert_eq!(posted[0]["groups"][0]["sessions"][0]["name"], "Week 1");
    assert_eq!(posted[0]["groups"][0]["sessions"][0]["assessments"][0]["id"], "a0");
    assert_eq!(posted[0]["groups"][1]["active"], false);
}

#[tokio::test]
async fn rejected_edit_leaves_session_clean() {
    let base = spawn_study_server(seeded_state()).await;
    let service: Arc<dyn StudyService> = Arc::new(client_for(&base));

    let mut editing =
        StudyEditingSession::load(service, &signed_in(), &StudyId::from("study-1"))
            .await
            .expect("load");
    let err = editing
        .dispatch(GroupAction::RemoveGroup {
            id: GroupId::from("missing"),
        })
        .expect_err("unknown group");

    assert!(matches!(err, editor::EditError::GroupNotFound(_)));
    assert!(!editing.is_dirty());
    assert_eq!(editing.snapshot().groups.len(), 1);
}

#[tokio::test]
async fn loading_unknown_study_fails() {
    let base = spawn_study_server(ServerState::default()).await;
    let service: Arc<dyn StudyService> = Arc::new(client_for(&base));
    let err = StudyEditingSession::load(service, &signed_in(), &StudyId::from("ghost"))
        .await
        .err()
        .expect("must fail");
    assert!(err.to_string().contains("not found"));
}
