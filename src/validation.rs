use crate::error::ValidationError;
use crate::models::feedback::INITIAL_VOTES;
use crate::models::{CreateFeedbackRequest, EnumCodec, FeedbackCategory, FeedbackDraft, Sentiment};

pub fn validate_submission(request: CreateFeedbackRequest) -> Result<FeedbackDraft, ValidationError> {
    let title = match request.title {
        Some(title) if !title.trim().is_empty() => title,
        Some(_) => return Err(ValidationError::new("title", "must not be empty")),
        None => return Err(ValidationError::new("title", "is required")),
    };

    let category = match request.category {
        Some(raw) => FeedbackCategory::decode_json(raw.get().as_bytes())
            .map_err(|e| ValidationError::new("type", e.to_string()))?,
        None => return Err(ValidationError::new("type", "is required")),
    };

    let sentiment = request
        .sentiment
        .map(|raw| Sentiment::decode_json(raw.get().as_bytes()))
        .transpose()
        .map_err(|e| ValidationError::new("sentiment", e.to_string()))?
        .unwrap_or_default();

    Ok(FeedbackDraft {
        title,
        description: request.description.unwrap_or_default(),
        category,
        tags: request.tags.unwrap_or_default(),
        sentiment,
        sentiment_score: request.sentiment_score,
        votes: INITIAL_VOTES,
    })
}
