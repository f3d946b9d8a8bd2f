// src/handlers/notifications.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::{
        error::AppError,
        extract::AppJson,
        response::ApiResponse,
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::notification::{
        AffectedResponse, DeleteNotificationQuery, ListNotificationsQuery, MarkNotificationPayload,
        Notification, NotificationAction, NotificationActionPayload, NotificationListResponse,
    },
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    params(ListNotificationsQuery),
    responses(
        (status = 200, description = "Latest 50 notifications and the unread count", body = NotificationListResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let (data, unread_count) = app_state
        .notification_service
        .inbox(user.id, query.unread_only)
        .await?;

    Ok(Json(NotificationListResponse {
        success: true,
        data,
        unread_count,
    }))
}

// PATCH /api/notifications
#[utoipa::path(
    patch,
    path = "/api/notifications",
    tag = "Notifications",
    request_body = MarkNotificationPayload,
    responses(
        (status = 200, description = "Read flag updated", body = ApiResponse<Notification>),
        (status = 404, description = "Not one of the caller's notifications")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<MarkNotificationPayload>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let notification = app_state
        .notification_service
        .set_read(payload.notification_id, user.id, payload.read)
        .await?;
    Ok(Json(ApiResponse::ok(notification)))
}

// POST /api/notifications
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notifications",
    request_body = NotificationActionPayload,
    responses(
        (status = 200, description = "Action applied", body = AffectedResponse),
        (status = 400, description = "Unknown action")
    ),
    security(("api_jwt" = []))
)]
pub async fn notification_action(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<NotificationActionPayload>,
) -> Result<Json<AffectedResponse>, AppError> {
    match payload.action {
        NotificationAction::MarkAllRead => {
            let count = app_state.notification_service.mark_all_read(user.id).await?;
            Ok(Json(AffectedResponse {
                success: true,
                message: "All notifications marked as read".into(),
                count,
            }))
        }
    }
}

// DELETE /api/notifications
#[utoipa::path(
    delete,
    path = "/api/notifications",
    tag = "Notifications",
    params(DeleteNotificationQuery),
    responses(
        (status = 200, description = "One notification deleted, or every read one cleared", body = AffectedResponse),
        (status = 404, description = "Not one of the caller's notifications")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<DeleteNotificationQuery>,
) -> Result<Json<AffectedResponse>, AppError> {
    let service = &app_state.notification_service;

    let response = match query.id {
        Some(id) => {
            service.delete(id, user.id).await?;
            AffectedResponse {
                success: true,
                message: "Notification deleted".into(),
                count: 1,
            }
        }
        None => {
            let count = service.clear_read(user.id).await?;
            AffectedResponse {
                success: true,
                message: "Read notifications cleared".into(),
                count,
            }
        }
    };

    Ok(Json(response))
}

