use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Visitor};
use serde_json::Value;

use crate::error::UnknownEnumValue;

pub const UNKNOWN_NAME: &str = "unknown";

// JSON integer grammar: optional minus, then `0` or digits without a leading zero.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
}

pub trait EnumCodec: Copy + Eq + Sized + 'static {
    const KIND: &'static str;

    const VARIANTS: &'static [Self];

    fn code(self) -> i64;

    fn tag(self) -> &'static str;

    fn from_code(code: i64) -> Result<Self, UnknownEnumValue> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.code() == code)
            .ok_or_else(|| UnknownEnumValue::new(Self::KIND, code))
    }

    fn from_tag(tag: &str) -> Result<Self, UnknownEnumValue> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.tag() == tag)
            .ok_or_else(|| UnknownEnumValue::new(Self::KIND, format!("{tag:?}")))
    }

    fn tag_of(code: i64) -> Result<&'static str, UnknownEnumValue> {
        Self::from_code(code).map(Self::tag)
    }

    fn code_of(tag: &str) -> Result<i64, UnknownEnumValue> {
        Self::from_tag(tag).map(Self::code)
    }

    fn display_name(code: i64) -> &'static str {
        Self::tag_of(code).unwrap_or(UNKNOWN_NAME)
    }

    /// Accepts a bare JSON integer code or a bare JSON string tag. Integer literals are read
    /// from the text itself and never retried as tags.
    fn decode_json(bytes: &[u8]) -> Result<Self, UnknownEnumValue> {
        let unknown = || UnknownEnumValue::new(Self::KIND, String::from_utf8_lossy(bytes).trim());
        let literal = std::str::from_utf8(bytes).map_err(|_| unknown())?.trim();

        if is_integer_literal(literal) {
            let code = literal.parse::<i64>().map_err(|_| unknown())?;
            return Self::from_code(code);
        }
        match serde_json::from_str::<Value>(literal) {
            Ok(Value::String(tag)) => Self::from_tag(&tag),
            _ => Err(unknown()),
        }
    }

    fn encode_json(self) -> Vec<u8> {
        self.code().to_string().into_bytes()
    }

    fn encode_text(self) -> Vec<u8> {
        self.tag().as_bytes().to_vec()
    }

    fn decode_text(bytes: &[u8]) -> Result<Self, UnknownEnumValue> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| UnknownEnumValue::new(Self::KIND, String::from_utf8_lossy(bytes)))?;
        Self::from_tag(text)
    }
}

pub struct CodecVisitor<T>(PhantomData<T>);

impl<T> CodecVisitor<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CodecVisitor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de, T: EnumCodec> Visitor<'de> for CodecVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an integer code or a {} tag", T::KIND)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<T, E> {
        T::from_code(value).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<T, E> {
        let code = i64::try_from(value).map_err(|_| E::custom(UnknownEnumValue::new(T::KIND, value)))?;
        self.visit_i64(code)
    }

    // serde_json hands the integer literal `-0` over as a float.
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<T, E> {
        if value == 0.0 && value.is_sign_negative() {
            return self.visit_i64(0);
        }
        Err(E::custom(UnknownEnumValue::new(T::KIND, value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<T, E> {
        T::from_tag(value).map_err(E::custom)
    }
}

macro_rules! impl_codec_conversions {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i64(<$ty as $crate::models::codec::EnumCodec>::code(*self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any($crate::models::codec::CodecVisitor::<$ty>::new())
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(<$ty as $crate::models::codec::EnumCodec>::tag(*self))
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::error::UnknownEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as $crate::models::codec::EnumCodec>::from_tag(s)
            }
        }

        impl rusqlite::types::ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(
                    <$ty as $crate::models::codec::EnumCodec>::code(*self),
                ))
            }
        }

        impl rusqlite::types::FromSql for $ty {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                let code = <i64 as rusqlite::types::FromSql>::column_result(value)?;
                <$ty as $crate::models::codec::EnumCodec>::from_code(code)
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

pub(crate) use impl_codec_conversions;
