use std::sync::Arc;

use serde_json::Value;

use crate::{
    dto::comments::{CreateCommentRequest, UpdateCommentRequest},
    error::{AppError, AppResult},
    models::comments::{Comment, CommentAction, CommentId, ComplaintId, UserId},
    repositories::{
        comments::{CommentStore, CreateCommentParams},
        complaints::ComplaintStore,
    },
    telemetry::BusinessEvent,
};

pub const MAX_COMMENT_LENGTH: usize = 1000;
const MIN_COMMENT_LENGTH: usize = 1;

/// The only component allowed to create or mutate comments.
///
/// Holds nothing but store handles; every call receives the caller identity
/// explicitly.
#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    complaints: Arc<dyn ComplaintStore>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, complaints: Arc<dyn ComplaintStore>) -> Self {
        Self {
            comments,
            complaints,
        }
    }

    /// Public read, newest first.
    pub async fn list_for_complaint(&self, complaint_id: ComplaintId) -> AppResult<Vec<Comment>> {
        self.comments.list_by_complaint(complaint_id).await
    }

    pub async fn create(&self, caller: UserId, req: CreateCommentRequest) -> AppResult<Comment> {
        let body = normalize_comment_body(req.body.as_ref())?;
        let complaint_id = self.resolve_complaint(req.complaint_id.as_ref()).await?;

        let comment = match self
            .comments
            .create(CreateCommentParams {
                complaint_id,
                author_id: caller,
                body,
            })
            .await
        {
            // The complaint vanished between the check and the insert.
            Err(AppError::NotFound(_)) => return Err(invalid_complaint()),
            result => result?,
        };

        BusinessEvent::CommentCreated {
            comment_id: comment.id,
            complaint_id: comment.complaint_id,
            author_id: caller,
        }
        .log();

        Ok(comment)
    }

    /// Existence is checked before ownership, and ownership before the body,
    /// so a caller probing someone else's comment never sees a validation error.
    pub async fn update(
        &self,
        comment_id: CommentId,
        caller: UserId,
        req: UpdateCommentRequest,
    ) -> AppResult<Comment> {
        let comment = self
            .find_owned_comment(comment_id, caller, CommentAction::Edit)
            .await?;
        let body = normalize_comment_body(req.body.as_ref())?;

        let updated = self.comments.update(comment.id, body).await?;

        BusinessEvent::CommentUpdated {
            comment_id: updated.id,
            author_id: caller,
        }
        .log();

        Ok(updated)
    }

    pub async fn destroy(&self, comment_id: CommentId, caller: UserId) -> AppResult<()> {
        let comment = self
            .find_owned_comment(comment_id, caller, CommentAction::Delete)
            .await?;

        self.comments.delete(comment.id).await?;

        BusinessEvent::CommentDeleted {
            comment_id: comment.id,
            author_id: caller,
        }
        .log();

        Ok(())
    }

    async fn find_owned_comment(
        &self,
        comment_id: CommentId,
        caller: UserId,
        action: CommentAction,
    ) -> AppResult<Comment> {
        let comment = self.comments.get_by_id(comment_id).await?;

        if !comment.is_authored_by(caller) {
            BusinessEvent::CommentMutationDenied {
                comment_id,
                caller_id: caller,
                action,
            }
            .log();
            return Err(AppError::Forbidden(denied_message(action).to_string()));
        }

        Ok(comment)
    }

    async fn resolve_complaint(&self, raw: Option<&Value>) -> AppResult<ComplaintId> {
        let raw = match raw {
            None | Some(Value::Null) => "",
            Some(Value::String(raw)) => raw.trim(),
            Some(_) => return Err(invalid_complaint()),
        };
        if raw.is_empty() {
            return Err(AppError::validation(
                "complaint_id",
                "The complaint_id field is required.",
            ));
        }

        let complaint_id = ComplaintId::parse(raw).ok_or_else(invalid_complaint)?;
        if !self.complaints.exists(complaint_id).await? {
            return Err(invalid_complaint());
        }

        Ok(complaint_id)
    }
}

fn denied_message(action: CommentAction) -> &'static str {
    match action {
        CommentAction::Edit => "You do not have permission to edit this comment.",
        CommentAction::Delete => "You do not have permission to delete this comment.",
    }
}

fn invalid_complaint() -> AppError {
    AppError::validation("complaint_id", "The selected complaint_id is invalid.")
}

fn normalize_comment_body(body: Option<&Value>) -> AppResult<String> {
    let text = match body {
        None | Some(Value::Null) => {
            return Err(AppError::validation("body", "The body field is required."));
        }
        Some(Value::String(text)) => text,
        Some(_) => {
            return Err(AppError::validation("body", "The body field must be a string."));
        }
    };

    // Postgres text columns cannot hold NUL.
    if text.contains('\0') {
        return Err(AppError::validation(
            "body",
            "The body field must not contain null characters.",
        ));
    }

    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < MIN_COMMENT_LENGTH {
        return Err(AppError::validation("body", "The body field is required."));
    }
    if len > MAX_COMMENT_LENGTH {
        return Err(AppError::validation(
            "body",
            format!("The body field must not be greater than {MAX_COMMENT_LENGTH} characters."),
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::repositories::{comments::MemoryCommentStore, complaints::MemoryComplaintStore};

    fn setup() -> (CommentService, ComplaintId) {
        let complaint_id = ComplaintId(Uuid::new_v4());
        let complaints = MemoryComplaintStore::with_ids([complaint_id]);
        let comments = MemoryCommentStore::new(complaints.clone());
        let service = CommentService::new(Arc::new(comments), Arc::new(complaints));
        (service, complaint_id)
    }

    fn user() -> UserId {
        UserId(Uuid::new_v4())
    }

    fn create_req(complaint_id: ComplaintId, body: &str) -> CreateCommentRequest {
        CreateCommentRequest::new(complaint_id.to_string(), body)
    }

    fn assert_validation_error<T: std::fmt::Debug>(result: AppResult<T>, expected_field: &str) {
        match result {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, expected_field),
            Err(other) => panic!("expected validation error, got {other:?}"),
            Ok(value) => panic!("expected error, got {value:?}"),
        }
    }

    #[test]
    fn body_is_trimmed() {
        let body = normalize_comment_body(Some(&json!("  hello "))).unwrap();
        assert_eq!(body, "hello");
    }

    #[test]
    fn body_length_counts_characters() {
        let accented = "é".repeat(MAX_COMMENT_LENGTH);
        assert!(normalize_comment_body(Some(&json!(accented))).is_ok());

        let too_long = "a".repeat(MAX_COMMENT_LENGTH + 1);
        assert_validation_error(normalize_comment_body(Some(&json!(too_long))), "body");
    }

    #[test]
    fn body_must_be_present_and_a_string() {
        assert_validation_error(normalize_comment_body(None), "body");
        assert_validation_error(normalize_comment_body(Some(&Value::Null)), "body");
        assert_validation_error(normalize_comment_body(Some(&json!("   "))), "body");
        assert_validation_error(normalize_comment_body(Some(&json!(12))), "body");
        assert_validation_error(normalize_comment_body(Some(&json!(["a"]))), "body");
    }

    #[test]
    fn body_rejects_null_characters() {
        assert_validation_error(normalize_comment_body(Some(&json!("a\u{0}b"))), "body");
        assert_validation_error(normalize_comment_body(Some(&json!("hello\u{0}"))), "body");
    }

    #[tokio::test]
    async fn null_characters_never_reach_the_store() {
        let (service, complaint_id) = setup();
        let author = user();

        let created = service
            .create(author, create_req(complaint_id, "a\u{0}b"))
            .await;
        assert_validation_error(created, "body");

        let comment = service
            .create(author, create_req(complaint_id, "hello"))
            .await
            .unwrap();
        let updated = service
            .update(comment.id, author, UpdateCommentRequest::new("x\u{0}"))
            .await;
        assert_validation_error(updated, "body");

        let stored = service.list_for_complaint(complaint_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].body, "hello");
    }

    #[tokio::test]
    async fn create_sets_author_from_caller() {
        let (service, complaint_id) = setup();
        let caller = user();

        let comment = service
            .create(caller, create_req(complaint_id, "hello"))
            .await
            .unwrap();

        assert_eq!(comment.author_id, caller);
        assert_eq!(comment.complaint_id, complaint_id);
        assert_eq!(comment.body, "hello");
    }

    #[tokio::test]
    async fn create_accepts_body_at_limit() {
        let (service, complaint_id) = setup();
        let body = "a".repeat(MAX_COMMENT_LENGTH);

        let comment = service
            .create(user(), create_req(complaint_id, &body))
            .await
            .unwrap();

        assert_eq!(comment.body.chars().count(), MAX_COMMENT_LENGTH);
    }

    #[tokio::test]
    async fn create_rejects_oversized_body_without_persisting() {
        let (service, complaint_id) = setup();
        let body = "a".repeat(MAX_COMMENT_LENGTH + 1);

        let result = service.create(user(), create_req(complaint_id, &body)).await;

        assert_validation_error(result, "body");
        assert!(service.list_for_complaint(complaint_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_or_malformed_complaint() {
        let (service, _) = setup();

        let unknown = service
            .create(user(), create_req(ComplaintId(Uuid::new_v4()), "hello"))
            .await;
        assert_validation_error(unknown, "complaint_id");

        let malformed = service
            .create(user(), CreateCommentRequest::new("not-an-id", "hello"))
            .await;
        assert_validation_error(malformed, "complaint_id");

        let missing = service
            .create(
                user(),
                CreateCommentRequest {
                    complaint_id: None,
                    body: Some(json!("hello")),
                },
            )
            .await;
        assert_validation_error(missing, "complaint_id");

        let numeric = service
            .create(
                user(),
                CreateCommentRequest {
                    complaint_id: Some(json!(7)),
                    body: Some(json!("hello")),
                },
            )
            .await;
        assert_validation_error(numeric, "complaint_id");
    }

    #[tokio::test]
    async fn create_checks_body_before_complaint() {
        let (service, _) = setup();

        let result = service
            .create(user(), CreateCommentRequest::new("not-an-id", ""))
            .await;

        assert_validation_error(result, "body");
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let (service, complaint_id) = setup();
        let author = user();
        let mut ids = Vec::new();
        for body in ["t1", "t2", "t3"] {
            let comment = service
                .create(author, create_req(complaint_id, body))
                .await
                .unwrap();
            ids.push(comment.id);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let bodies: Vec<String> = service
            .list_for_complaint(complaint_id)
            .await
            .unwrap()
            .into_iter()
            .map(|comment| comment.body)
            .collect();

        assert_eq!(bodies, vec!["t3", "t2", "t1"]);
    }

    #[tokio::test]
    async fn non_author_cannot_update_or_destroy() {
        let (service, complaint_id) = setup();
        let author = user();
        let intruder = user();
        let comment = service
            .create(author, create_req(complaint_id, "hello"))
            .await
            .unwrap();

        let update = service
            .update(comment.id, intruder, UpdateCommentRequest::new("hacked"))
            .await;
        assert!(matches!(update, Err(AppError::Forbidden(_))));

        let destroy = service.destroy(comment.id, intruder).await;
        assert!(matches!(destroy, Err(AppError::Forbidden(_))));

        let stored = service.comments.get_by_id(comment.id).await.unwrap();
        assert_eq!(stored, comment);
    }

    #[tokio::test]
    async fn ownership_is_checked_before_body_validation() {
        let (service, complaint_id) = setup();
        let comment = service
            .create(user(), create_req(complaint_id, "hello"))
            .await
            .unwrap();

        let oversized = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let result = service
            .update(comment.id, user(), UpdateCommentRequest::new(oversized))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let missing_body = service
            .update(comment.id, user(), UpdateCommentRequest::default())
            .await;
        assert!(matches!(missing_body, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn existence_is_checked_before_body_validation() {
        let (service, _) = setup();

        let result = service
            .update(CommentId::generate(), user(), UpdateCommentRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn denial_message_does_not_disclose_content() {
        let (service, complaint_id) = setup();
        let comment = service
            .create(user(), create_req(complaint_id, "secret remark"))
            .await
            .unwrap();

        let Err(AppError::Forbidden(message)) = service.destroy(comment.id, user()).await else {
            panic!("expected forbidden");
        };

        assert!(!message.contains("secret"));
        assert!(!message.contains(&comment.author_id.to_string()));
    }

    #[tokio::test]
    async fn author_update_rejects_oversized_body_and_keeps_record() {
        let (service, complaint_id) = setup();
        let author = user();
        let comment = service
            .create(author, create_req(complaint_id, "hello"))
            .await
            .unwrap();

        let oversized = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let result = service
            .update(comment.id, author, UpdateCommentRequest::new(oversized))
            .await;

        assert_validation_error(result, "body");
        assert_eq!(service.comments.get_by_id(comment.id).await.unwrap(), comment);
    }

    #[tokio::test]
    async fn destroy_twice_reports_not_found() {
        let (service, complaint_id) = setup();
        let author = user();
        let comment = service
            .create(author, create_req(complaint_id, "hello"))
            .await
            .unwrap();

        assert!(service.destroy(comment.id, author).await.is_ok());
        assert!(matches!(
            service.destroy(comment.id, author).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn comment_lifecycle_end_to_end() {
        let (service, complaint_id) = setup();
        let alice = user();
        let bob = user();

        let comment = service
            .create(alice, create_req(complaint_id, "hello"))
            .await
            .unwrap();
        assert_eq!(comment.body, "hello");
        assert_eq!(comment.author_id, alice);

        let denied = service
            .update(comment.id, bob, UpdateCommentRequest::new("hacked"))
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert_eq!(
            service.comments.get_by_id(comment.id).await.unwrap().body,
            "hello"
        );

        let edited = service
            .update(comment.id, alice, UpdateCommentRequest::new("hi there"))
            .await
            .unwrap();
        assert_eq!(edited.body, "hi there");
        assert!(edited.updated_at > comment.updated_at);
        assert_eq!(edited.created_at, comment.created_at);

        service.destroy(comment.id, alice).await.unwrap();

        let gone = service
            .update(comment.id, alice, UpdateCommentRequest::new("x"))
            .await;
        assert!(matches!(gone, Err(AppError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_are_last_writer_wins() {
        let (service, complaint_id) = setup();
        let author = user();
        let comment = service
            .create(author, create_req(complaint_id, "v0"))
            .await
            .unwrap();
        let comment_id = comment.id;

        let handles: Vec<_> = (1..=16)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .update(comment_id, author, UpdateCommentRequest::new(format!("v{i}")))
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        let last_write = results
            .iter()
            .max_by_key(|comment| comment.updated_at)
            .unwrap();
        let stored = service.comments.get_by_id(comment_id).await.unwrap();
        assert_eq!(stored.body, last_write.body);
        assert_eq!(stored.updated_at, last_write.updated_at);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn update_racing_delete_never_resurrects() {
        let (service, complaint_id) = setup();
        let author = user();
        let comment = service
            .create(author, create_req(complaint_id, "hello"))
            .await
            .unwrap();

        let (update, destroy) = tokio::join!(
            service.update(comment.id, author, UpdateCommentRequest::new("edited")),
            service.destroy(comment.id, author),
        );

        assert!(destroy.is_ok());
        assert!(matches!(update, Ok(_) | Err(AppError::NotFound(_))));
        assert!(matches!(
            service.comments.get_by_id(comment.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
