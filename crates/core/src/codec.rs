//! JSON body codec.
//!
//! Byte-level only; framing the bytes into requests/responses is done by the
//! client and server crates, which also set the JSON content type.

use serde::{Serialize, de::DeserializeOwned};

use crate::error::CodecError;

/// Serialize `value` into a JSON body.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// Deserialize a JSON body into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::{Value, json};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Health {
        status: String,
        checks: Vec<u32>,
    }

    #[test]
    fn encodes_struct_as_json_object() {
        let body = encode(&Health {
            status: "ok".to_string(),
            checks: vec![1, 2],
        })
        .unwrap();

        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "status": "ok", "checks": [1, 2] }));
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let err = decode::<Health>(br#"{"status": 1}"#).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let err = decode::<Value>(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn encode_fails_for_non_string_map_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], "x");

        let err = encode(&map).unwrap_err();
        assert!(matches!(err, CodecError::Encode(_)));
    }

    #[test]
    fn floats_near_the_precision_limit_round_trip() {
        for f in [1.0715660391465826e-75, -1.603964615428183e143, f64::MIN_POSITIVE, f64::MAX] {
            let back: f64 = decode(&encode(&f).unwrap()).unwrap();
            assert_eq!(back.to_bits(), f.to_bits(), "{f:e}");
        }
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            any::<f64>()
                .prop_filter("finite", |f| f.is_finite())
                .prop_map(|f| json!(f)),
            "[a-zA-Z0-9 _-]{0,16}".prop_map(Value::String),
        ];

        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn round_trip_preserves_finite_floats_exactly(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
            let bytes = encode(&f).unwrap();
            let back: f64 = decode(&bytes).unwrap();
            prop_assert_eq!(back.to_bits(), f.to_bits());
        }

        #[test]
        fn round_trip_preserves_json_values(value in json_value()) {
            let bytes = encode(&value).unwrap();
            let back: Value = decode(&bytes).unwrap();
            prop_assert_eq!(back, value);
        }
    }
}
