use crate::infra::{AppState, IntakeDecision, RecruitIntake};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// One document-store change event, delivered once per detected change.
#[derive(Debug, Deserialize)]
pub(crate) struct ChangeNotification {
    pub(crate) change_type: String,
    pub(crate) document_id: String,
    pub(crate) document_name: String,
    pub(crate) folder_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TriggerRequest {
    pub(crate) document_id: String,
    pub(crate) document_name: String,
}

pub(crate) fn recruit_router(intake: Arc<RecruitIntake>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/webhooks/document-store", post(document_change_endpoint))
        .route("/api/v1/recruit/trigger", post(trigger_endpoint))
        .route("/api/v1/recruit/dedup/reset", post(reset_dedup_endpoint))
        .with_state(intake)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn document_change_endpoint(
    State(intake): State<Arc<RecruitIntake>>,
    Json(change): Json<ChangeNotification>,
) -> impl IntoResponse {
    let decision = intake.handle_change(
        &change.change_type,
        &change.folder_id,
        &change.document_id,
        &change.document_name,
    );

    match decision {
        IntakeDecision::Dispatched => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "dispatched" })),
        ),
        IntakeDecision::Filtered(reason) => (
            StatusCode::OK,
            Json(json!({ "status": "ignored", "reason": reason })),
        ),
        IntakeDecision::DuplicateSuppressed => {
            (StatusCode::OK, Json(json!({ "status": "duplicate" })))
        }
        IntakeDecision::Rejected(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "rejected", "reason": reason })),
        ),
    }
}

pub(crate) async fn trigger_endpoint(
    State(intake): State<Arc<RecruitIntake>>,
    Json(request): Json<TriggerRequest>,
) -> impl IntoResponse {
    match intake.trigger(&request.document_id, &request.document_name) {
        IntakeDecision::Dispatched => {
            (StatusCode::ACCEPTED, Json(json!({ "status": "success" })))
        }
        IntakeDecision::DuplicateSuppressed => (
            StatusCode::CONFLICT,
            Json(json!({ "status": "failure", "reason": "duplicate within cooldown" })),
        ),
        IntakeDecision::Rejected(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "failure", "reason": reason })),
        ),
        IntakeDecision::Filtered(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "failure", "reason": reason })),
        ),
    }
}

pub(crate) async fn reset_dedup_endpoint(
    State(intake): State<Arc<RecruitIntake>>,
) -> Json<serde_json::Value> {
    intake.reset_dedup();
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{demo_pipeline, DEMO_RESUME_ID};
    use axum::body::Body;
    use axum::http::Request;
    use recruit_ai::workflows::recruit::{AdmissionController, RunDispatcher};
    use std::time::Duration;
    use tower::util::ServiceExt;

    const WATCHED_FOLDER: &str = "resumes-folder";

    fn intake() -> Arc<RecruitIntake> {
        let (pipeline, _mail) = demo_pipeline();
        let dispatcher = RunDispatcher::spawn(pipeline, 1, 4);
        Arc::new(RecruitIntake::new(
            Arc::new(AdmissionController::new(Duration::from_secs(60))),
            dispatcher,
            WATCHED_FOLDER.to_string(),
        ))
    }

    fn change(change_type: &str, folder: &str, name: &str) -> ChangeNotification {
        ChangeNotification {
            change_type: change_type.to_string(),
            document_id: DEMO_RESUME_ID.to_string(),
            document_name: name.to_string(),
            folder_id: folder.to_string(),
        }
    }

    #[tokio::test]
    async fn addition_in_watched_folder_is_dispatched() {
        let intake = intake();
        let response = document_change_endpoint(
            State(intake),
            Json(change("add", WATCHED_FOLDER, "resume.pdf")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn unrelated_changes_are_filtered_before_dispatch() {
        let intake = intake();

        for change in [
            change("remove", WATCHED_FOLDER, "resume.pdf"),
            change("add", "other-folder", "resume.pdf"),
            change("add", WATCHED_FOLDER, "headshot.png"),
        ] {
            let response = document_change_endpoint(State(Arc::clone(&intake)), Json(change))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn duplicate_event_within_cooldown_is_suppressed() {
        let intake = intake();

        let first = document_change_endpoint(
            State(Arc::clone(&intake)),
            Json(change("add", WATCHED_FOLDER, "resume.pdf")),
        )
        .await
        .into_response();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        let second = document_change_endpoint(
            State(Arc::clone(&intake)),
            Json(change("add", WATCHED_FOLDER, "resume.pdf")),
        )
        .await
        .into_response();
        assert_eq!(second.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn reset_allows_the_same_document_again() {
        let intake = intake();

        let request = TriggerRequest {
            document_id: DEMO_RESUME_ID.to_string(),
            document_name: "resume.pdf".to_string(),
        };
        let first = trigger_endpoint(State(Arc::clone(&intake)), Json(request))
            .await
            .into_response();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        reset_dedup_endpoint(State(Arc::clone(&intake))).await;

        let request = TriggerRequest {
            document_id: DEMO_RESUME_ID.to_string(),
            document_name: "resume.pdf".to_string(),
        };
        let again = trigger_endpoint(State(intake), Json(request))
            .await
            .into_response();
        assert_eq!(again.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn webhook_route_accepts_change_payloads() {
        let app = recruit_router(intake());
        let payload = json!({
            "change_type": "add",
            "document_id": DEMO_RESUME_ID,
            "document_name": "resume.pdf",
            "folder_id": WATCHED_FOLDER,
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhooks/document-store")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
