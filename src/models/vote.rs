use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Wire shape only. Nothing in the service stores or counts votes yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub feedback_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn voter_fields_appear_only_when_known() {
        let created_at = Utc::now();
        let mut vote = Vote {
            id: 1,
            feedback_id: 10,
            user_id: Some(42),
            ip_address: Some("192.168.1.1".to_string()),
            created_at,
        };

        let identified = serde_json::to_value(&vote).expect("serialize");
        assert_eq!(identified["feedbackId"], json!(10));
        assert_eq!(identified["userId"], json!(42));
        assert_eq!(serde_json::from_value::<Vote>(identified).expect("deserialize"), vote);

        vote.user_id = None;
        vote.ip_address = None;
        let anonymous = serde_json::to_value(&vote).expect("serialize");
        let map = anonymous.as_object().expect("object");
        assert!(!map.contains_key("userId"));
        assert!(!map.contains_key("ipAddress"));
        assert_eq!(serde_json::from_value::<Vote>(anonymous).expect("deserialize"), vote);
    }
}
