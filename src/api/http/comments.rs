use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::{
        comments::{
            COMMENT_CREATED_MESSAGE, COMMENT_DELETED_MESSAGE, COMMENT_UPDATED_MESSAGE,
            CommentResponse, CreateCommentRequest, UpdateCommentRequest,
        },
        flash::Flashed,
    },
    error::AppError,
    models::comments::{CommentId, ComplaintId},
};

pub async fn list_complaint_comments_handle(
    State(state): State<AppState>,
    Path(complaint_id): Path<String>,
) -> Result<Json<Flashed<Vec<CommentResponse>>>, AppError> {
    let complaint_id = ComplaintId::parse(&complaint_id).ok_or_else(|| {
        AppError::validation("complaint_id", "The complaint_id must be a valid identifier.")
    })?;
    let comments = state.comments.list_for_complaint(complaint_id).await?;
    let data = comments.into_iter().map(CommentResponse::from).collect();
    Ok(Json(Flashed::data(data)))
}

pub async fn create_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Flashed<CommentResponse>>), AppError> {
    let req = payload_or_empty(payload);
    let comment = state.comments.create(auth_user.user_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(Flashed::with_flash(
            CommentResponse::from(comment),
            COMMENT_CREATED_MESSAGE,
        )),
    ))
}

pub async fn update_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(comment_id): Path<String>,
    payload: Result<Json<UpdateCommentRequest>, JsonRejection>,
) -> Result<Json<Flashed<CommentResponse>>, AppError> {
    let comment_id = parse_comment_id(&comment_id)?;
    let req = payload_or_empty(payload);
    let comment = state
        .comments
        .update(comment_id, auth_user.user_id, req)
        .await?;
    Ok(Json(Flashed::with_flash(
        CommentResponse::from(comment),
        COMMENT_UPDATED_MESSAGE,
    )))
}

pub async fn destroy_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> Result<Json<Flashed<()>>, AppError> {
    let comment_id = parse_comment_id(&comment_id)?;
    state.comments.destroy(comment_id, auth_user.user_id).await?;
    Ok(Json(Flashed::flash_only(COMMENT_DELETED_MESSAGE)))
}

// An unreadable payload carries no fields. The service then reports the
// missing ones after its existence and ownership checks.
fn payload_or_empty<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(
                status = %rejection.status(),
                "Unreadable comment payload: {}",
                rejection.body_text()
            );
            T::default()
        }
    }
}

// A malformed id can never match a record, so it reads as absent.
fn parse_comment_id(raw: &str) -> Result<CommentId, AppError> {
    CommentId::parse(raw).ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
}
