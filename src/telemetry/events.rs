use serde::Serialize;
use tracing::{info, warn};

use crate::models::comments::{CommentAction, CommentId, ComplaintId, UserId};

#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum BusinessEvent {
    CommentCreated {
        comment_id: CommentId,
        complaint_id: ComplaintId,
        author_id: UserId,
    },
    CommentUpdated {
        comment_id: CommentId,
        author_id: UserId,
    },
    CommentDeleted {
        comment_id: CommentId,
        author_id: UserId,
    },
    CommentMutationDenied {
        comment_id: CommentId,
        caller_id: UserId,
        action: CommentAction,
    },
}

impl BusinessEvent {
    pub fn log(&self) {
        let event_json = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        match self {
            BusinessEvent::CommentMutationDenied { .. } => warn!(
                target: "business_events",
                event = %event_json,
                "Business event occurred"
            ),
            _ => info!(
                target: "business_events",
                event = %event_json,
                "Business event occurred"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn events_are_tagged_with_their_type() {
        let event = BusinessEvent::CommentMutationDenied {
            comment_id: CommentId(Uuid::nil()),
            caller_id: UserId(Uuid::nil()),
            action: CommentAction::Delete,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "CommentMutationDenied");
        assert_eq!(value["action"], "delete");
        assert_eq!(value["caller_id"], Uuid::nil().to_string());
    }

    #[test]
    fn created_event_carries_complaint() {
        let complaint_id = ComplaintId(Uuid::new_v4());
        let event = BusinessEvent::CommentCreated {
            comment_id: CommentId::generate(),
            complaint_id,
            author_id: UserId(Uuid::new_v4()),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["complaint_id"], complaint_id.to_string());
    }
}
