use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body of `POST /temp`.
///
/// Decoding is lenient in the same places device firmware relies on:
/// the `data` key matches in any letter case, and a missing key, a `null`
/// value or a `null` body all read as an empty submission, which then fails
/// validation like any other bad payload. A repeated key keeps the last
/// non-null value.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct TempPayload {
    pub data: String,
}

impl<'de> Deserialize<'de> for TempPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TempPayloadVisitor;

        impl<'de> Visitor<'de> for TempPayloadVisitor {
            type Value = TempPayload;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object with a string `data` field")
            }

            fn visit_unit<E: de::Error>(self) -> Result<TempPayload, E> {
                Ok(TempPayload::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<TempPayload, E> {
                Ok(TempPayload::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<TempPayload, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut payload = TempPayload::default();
                while let Some(key) = map.next_key::<String>()? {
                    if !key.eq_ignore_ascii_case("data") {
                        map.next_value::<IgnoredAny>()?;
                        continue;
                    }
                    if let Some(data) = map.next_value::<Option<String>>()? {
                        payload.data = data;
                    }
                }
                Ok(payload)
            }
        }

        deserializer.deserialize_any(TempPayloadVisitor)
    }
}

/// Response body of a successfully parsed submission.
/// `device_id` and `formatted_time` are only serialized when `overtemp` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub overtemp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_time: Option<String>,
}

/// Response body of `GET /errors`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<String>,
}
