// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

/// Quote PDFs ride along with the job creation form.
const JOB_FORM_LIMIT: usize = 20 * 1024 * 1024;

pub fn router(app_state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login));

    // Everything else needs a bearer token
    let protected_routes = Router::new()
        .route("/api/permissions", get(handlers::rbac::my_permissions))
        .route("/api/users/me", get(handlers::auth::get_me))
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user).put(handlers::users::update_user),
        )
        .route(
            "/api/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/api/customers/{id}",
            get(handlers::customers::get_customer).delete(handlers::customers::delete_customer),
        )
        .route(
            "/api/jobs",
            get(handlers::jobs::list_jobs)
                .post(handlers::jobs::create_job)
                .layer(DefaultBodyLimit::max(JOB_FORM_LIMIT)),
        )
        .route(
            "/api/jobs/{id}",
            get(handlers::jobs::get_job)
                .put(handlers::jobs::update_job)
                .patch(handlers::jobs::patch_job)
                .delete(handlers::jobs::delete_job),
        )
        .route(
            "/api/estimates",
            get(handlers::estimates::list_estimates).post(handlers::estimates::create_estimate),
        )
        .route(
            "/api/estimates/{id}",
            get(handlers::estimates::get_estimate)
                .put(handlers::estimates::update_estimate)
                .delete(handlers::estimates::delete_estimate),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications)
                .patch(handlers::notifications::mark_notification)
                .post(handlers::notifications::notification_action)
                .delete(handlers::notifications::delete_notifications),
        )
        .route("/api/dashboard/stats", get(handlers::dashboard::get_stats))
        .route(
            "/api/maintenance/purge",
            post(handlers::maintenance::purge_deleted),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        models::auth::User,
        test_support::{wait_for_notifications, TestApp},
    };

    async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.router().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn authed(app: &TestApp, user: &User, method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token_for(user)));
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    const BOUNDARY: &str = "precast-boundary";

    fn job_form(app: &TestApp, user: &User, fields: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method(Method::POST)
            .uri("/api/jobs")
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token_for(user)))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new().await;
        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let res = app.router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = TestApp::new().await;
        let req = Request::get("/api/jobs").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));

        let req = Request::get("/api/jobs")
            .header(header::AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_returns_token_and_user() {
        let app = TestApp::new().await;
        let req = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"email": "admin@lindsay.com", "password": "Admin123"}).to_string(),
            ))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].as_str().is_some());
        assert_eq!(body["user"]["role"], json!("Admin"));
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = TestApp::new().await;
        let req = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn malformed_path_ids_are_a_bad_request() {
        let app = TestApp::new().await;
        for uri in ["/api/jobs/not-a-uuid", "/api/estimates/42", "/api/customers/x", "/api/users/nope"] {
            let (status, body) = send(&app, authed(&app, &app.admin, Method::GET, uri, None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["success"], json!(false), "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn viewer_cannot_create_jobs() {
        let app = TestApp::new().await;
        let customer_id = app.default_customer.id.to_string();
        let req = job_form(
            &app,
            &app.viewer,
            &[("jobName", "Wet Well"), ("jobNumber", "LP-001"), ("customerId", &customer_id)],
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], json!(false));
        assert!(app.store.all_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn multipart_create_then_duplicate_conflicts() {
        let app = TestApp::new().await;
        let customer_id = app.default_customer.id.to_string();
        let pm_id = app.pm.id.to_string();
        let fields = [
            ("jobName", "Wet Well"),
            ("jobNumber", "LP-001"),
            ("customerId", customer_id.as_str()),
            ("priority", "high"),
            ("quotedAmount", "12500.50"),
            ("projectManagerId", pm_id.as_str()),
            ("tags", "rush,wet well"),
        ];

        let (status, body) = send(&app, job_form(&app, &app.admin, &fields)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["jobNumber"], json!("LP-001"));
        assert_eq!(body["data"]["priority"], json!("high"));
        assert_eq!(body["data"]["status"], json!("Estimation"));
        assert_eq!(body["data"]["currentPhase"], json!("estimation"));
        assert_eq!(body["data"]["projectManager"]["id"], json!(pm_id));
        assert_eq!(body["data"]["tags"], json!(["rush", "wet well"]));

        let rows = wait_for_notifications(&app.store, 1).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, app.pm.id);
        assert_eq!(rows[0].title, "New Job Assigned");

        let (status, body) = send(&app, job_form(&app, &app.admin, &fields)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn job_list_has_pagination_envelope() {
        let app = TestApp::new().await;
        app.insert_job("LP-001", "Wet Well", app.admin.id, None).await;

        let (status, body) = send(
            &app,
            authed(&app, &app.viewer, Method::GET, "/api/jobs?status=all&limit=10", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"], json!({"total": 1, "limit": 10, "skip": 0}));
    }

    #[tokio::test]
    async fn put_rejects_job_number_changes() {
        let app = TestApp::new().await;
        let job = app.insert_job("LP-001", "Wet Well", app.admin.id, None).await;
        let uri = format!("/api/jobs/{}", job.id);
        let (status, _) = send(
            &app,
            authed(&app, &app.admin, Method::PUT, &uri, Some(json!({"jobNumber": "LP-999"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_moves_status_and_stamps_date() {
        let app = TestApp::new().await;
        let job = app.insert_job("LP-001", "Wet Well", app.pm.id, None).await;
        let uri = format!("/api/jobs/{}", job.id);
        let (status, body) = send(
            &app,
            authed(&app, &app.pm, Method::PATCH, &uri, Some(json!({"status": "In Production"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], json!("In Production"));
        assert_eq!(body["data"]["currentPhase"], json!("production"));
        assert!(body["data"]["productionStartDate"].is_string());
    }

    #[tokio::test]
    async fn pm_cannot_patch_a_job_someone_else_created() {
        let app = TestApp::new().await;
        let job = app.insert_job("LP-001", "Wet Well", app.admin.id, Some(app.pm.id)).await;
        let uri = format!("/api/jobs/{}", job.id);
        let (status, body) = send(
            &app,
            authed(&app, &app.pm, Method::PATCH, &uri, Some(json!({"priority": "urgent"}))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], json!(false));

        let (status, _) = send(&app, authed(&app, &app.pm, Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn estimate_quote_is_computed_server_side() {
        let app = TestApp::new().await;
        let job = app.insert_job("LP-001", "Wet Well", app.admin.id, None).await;
        let payload = json!({
            "jobId": job.id,
            "laborCost": 1000,
            "materialCost": 2500,
            "equipmentCost": 300,
            "overheadCost": 200
        });
        let (status, body) = send(
            &app,
            authed(&app, &app.estimator, Method::POST, "/api/estimates", Some(payload.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["version"], json!(1));
        assert_eq!(body["data"]["totalCost"], json!(4000.0));
        assert_eq!(body["data"]["quotedPrice"], json!(5200.0));

        let (status, _) = send(
            &app,
            authed(&app, &app.drafter, Method::POST, "/api/estimates", Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn oversize_estimate_costs_are_a_bad_request() {
        let app = TestApp::new().await;
        let job = app.insert_job("LP-001", "Wet Well", app.admin.id, None).await;

        let (status, body) = send(
            &app,
            authed(
                &app,
                &app.estimator,
                Method::POST,
                "/api/estimates",
                Some(json!({"jobId": job.id, "laborCost": 5e28, "materialCost": 5e28})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["details"]["labor_cost"].is_array(), "{body}");

        // Each cost is storable, their sum is not.
        let each = 900_000_000_000u64;
        let (status, body) = send(
            &app,
            authed(
                &app,
                &app.estimator,
                Method::POST,
                "/api/estimates",
                Some(json!({
                    "jobId": job.id,
                    "laborCost": each,
                    "materialCost": each,
                    "equipmentCost": each,
                    "overheadCost": each
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(app.store.all_estimates().await.is_empty());
    }

    #[tokio::test]
    async fn notification_endpoints_are_scoped_to_the_recipient() {
        let app = TestApp::new().await;
        let job = app.insert_job("LP-001", "Wet Well", app.admin.id, Some(app.pm.id)).await;
        let uri = format!("/api/jobs/{}", job.id);
        send(
            &app,
            authed(&app, &app.drafter, Method::PATCH, &uri, Some(json!({"priority": "urgent"}))),
        )
        .await;
        // Drafter is neither creator nor Admin.
        assert!(app.store.all_notifications().await.is_empty());

        send(
            &app,
            authed(&app, &app.admin, Method::PATCH, &uri, Some(json!({"priority": "urgent"}))),
        )
        .await;
        let rows = wait_for_notifications(&app.store, 1).await;
        assert_eq!(rows.len(), 1);
        let id = rows[0].id;

        let (status, body) = send(
            &app,
            authed(&app, &app.pm, Method::GET, "/api/notifications?unreadOnly=true", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["unreadCount"], json!(1));
        assert_eq!(body["data"][0]["type"], json!("job_updated"));

        // Someone else's notification looks missing.
        let (status, _) = send(
            &app,
            authed(
                &app,
                &app.viewer,
                Method::PATCH,
                "/api/notifications",
                Some(json!({"notificationId": id, "read": true})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            authed(
                &app,
                &app.pm,
                Method::POST,
                "/api/notifications",
                Some(json!({"action": "markAllRead"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(1));

        let (status, body) = send(
            &app,
            authed(&app, &app.pm, Method::DELETE, "/api/notifications", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(1));
        assert!(app.store.all_notifications().await.is_empty());
    }

    #[tokio::test]
    async fn permissions_reflect_the_callers_role() {
        let app = TestApp::new().await;
        let (status, body) = send(
            &app,
            authed(&app, &app.pm, Method::GET, "/api/permissions", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], json!("Project Manager"));
        assert_eq!(body["data"]["permissions"]["canCreateJobs"], json!(true));
        assert_eq!(body["data"]["permissions"]["canDeleteJobs"], json!(false));
    }

    #[tokio::test]
    async fn only_admins_manage_users_and_purge() {
        let app = TestApp::new().await;
        let payload = json!({
            "name": "Sarah Drafter",
            "email": "sarah@lindsay.com",
            "password": "Drafter123",
            "role": "Drafter"
        });
        let (status, _) = send(
            &app,
            authed(&app, &app.pm, Method::POST, "/api/users", Some(payload.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            authed(&app, &app.admin, Method::POST, "/api/users", Some(payload.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["email"], json!("sarah@lindsay.com"));

        let (status, _) = send(
            &app,
            authed(&app, &app.admin, Method::POST, "/api/users", Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            authed(&app, &app.pm, Method::POST, "/api/maintenance/purge", None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = send(
            &app,
            authed(&app, &app.admin, Method::POST, "/api/maintenance/purge", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["jobsPurged"], json!(0));
    }

    #[tokio::test]
    async fn weak_passwords_report_field_details() {
        let app = TestApp::new().await;
        let payload = json!({
            "name": "Sarah Drafter",
            "email": "sarah@lindsay.com",
            "password": "short",
            "role": "Drafter"
        });
        let (status, body) = send(
            &app,
            authed(&app, &app.admin, Method::POST, "/api/users", Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["password"].is_array());
    }
}
