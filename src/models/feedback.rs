use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{category::FeedbackCategory, sentiment::Sentiment};
use crate::error::PersistenceFailure;

pub const INITIAL_VOTES: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub category: FeedbackCategory,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackDraft {
    pub title: String,
    pub description: String,
    pub category: FeedbackCategory,
    pub tags: Vec<String>,
    pub sentiment: Sentiment,
    pub sentiment_score: Option<f64>,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFields {
    pub id: i64,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn assemble(draft: FeedbackDraft, stored: StoredFields) -> Result<Self, PersistenceFailure> {
        if stored.id <= 0 {
            return Err(PersistenceFailure::UnexpectedGenerated {
                field: "id",
                value: stored.id,
            });
        }
        if stored.votes != draft.votes {
            return Err(PersistenceFailure::UnexpectedGenerated {
                field: "votes",
                value: stored.votes,
            });
        }

        Ok(Self {
            id: stored.id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            tags: draft.tags,
            sentiment: draft.sentiment,
            sentiment_score: draft.sentiment_score,
            votes: stored.votes,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }
}

pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
