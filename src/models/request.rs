use serde::Deserialize;
use serde_json::value::RawValue;

// `type` and `sentiment` stay as raw JSON text until validation, so an undecodable value is
// reported against its field and integer literals reach the codec exactly as sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub category: Option<Box<RawValue>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub sentiment: Option<Box<RawValue>>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_read_as_absent() {
        let request: CreateFeedbackRequest = serde_json::from_str(
            r#"{ "title": "x", "type": -0, "tags": null, "sentiment": null, "sentimentScore": null }"#,
        )
        .expect("deserialize");

        assert_eq!(request.category.as_deref().map(RawValue::get), Some("-0"));
        assert!(request.tags.is_none());
        assert!(request.sentiment.is_none());
        assert!(request.sentiment_score.is_none());
    }

    #[test]
    fn wrong_field_types_fail_to_bind() {
        assert!(serde_json::from_str::<CreateFeedbackRequest>(r#"{ "title": 5 }"#).is_err());
        assert!(serde_json::from_str::<CreateFeedbackRequest>(r#"{ "tags": "ui" }"#).is_err());
    }
}
