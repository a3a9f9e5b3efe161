use super::codec::{impl_codec_conversions, EnumCodec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackCategory {
    Bug = 0,
    Feature = 1,
    General = 2,
}

impl EnumCodec for FeedbackCategory {
    const KIND: &'static str = "feedback type";
    const VARIANTS: &'static [Self] = &[Self::Bug, Self::Feature, Self::General];

    fn code(self) -> i64 {
        self as i64
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::General => "general",
        }
    }
}

impl_codec_conversions!(FeedbackCategory);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_canonical_names() {
        let cases = [
            (FeedbackCategory::Bug, 0, "bug"),
            (FeedbackCategory::Feature, 1, "feature"),
            (FeedbackCategory::General, 2, "general"),
        ];

        for (category, code, tag) in cases {
            assert_eq!(category.code(), code);
            assert_eq!(FeedbackCategory::tag_of(code).unwrap(), tag);
            assert_eq!(FeedbackCategory::display_name(code), tag);
            assert_eq!(String::from_utf8(category.encode_text()).unwrap(), tag);
        }
    }

    #[test]
    fn unknown_code_reports_kind_and_raw_value() {
        let err = FeedbackCategory::tag_of(999).unwrap_err();

        assert_eq!(err.to_string(), "unknown feedback type: 999");
        assert_eq!(FeedbackCategory::display_name(999), "unknown");
    }

    #[test]
    fn empty_tag_is_rejected() {
        assert!(FeedbackCategory::code_of("").is_err());
        assert!(FeedbackCategory::decode_text(b"").is_err());
    }
}
