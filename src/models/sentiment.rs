use super::codec::{impl_codec_conversions, EnumCodec};

const KUDOS: &str = "Kudos & Carrots";
const CRITIQUES: &str = "Critiques";
const CONTEXT: &str = "Context";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sentiment {
    #[default]
    Neutral = 0,
    Positive = 1,
    Negative = 2,
}

impl Sentiment {
    pub fn category(self) -> &'static str {
        match self {
            Self::Positive => KUDOS,
            Self::Negative => CRITIQUES,
            Self::Neutral => CONTEXT,
        }
    }

    pub fn category_of(code: i64) -> &'static str {
        Self::from_code(code).map_or(CONTEXT, Self::category)
    }
}

impl EnumCodec for Sentiment {
    const KIND: &'static str = "sentiment";
    const VARIANTS: &'static [Self] = &[Self::Neutral, Self::Positive, Self::Negative];

    fn code(self) -> i64 {
        self as i64
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl_codec_conversions!(Sentiment);
