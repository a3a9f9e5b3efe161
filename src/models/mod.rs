pub mod category;
pub mod codec;
pub mod feedback;
pub mod request;
pub mod sentiment;
pub mod vote;

pub use category::FeedbackCategory;
pub use codec::EnumCodec;
pub use feedback::{FeedbackDraft, FeedbackRecord, StoredFields};
pub use request::CreateFeedbackRequest;
pub use sentiment::Sentiment;
pub use vote::Vote;
