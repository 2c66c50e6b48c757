use crate::domain::event::DomainEvent;
use thiserror::Error;

/// シリアライゼーションエラー
#[derive(Debug, Error, Clone)]
pub enum SerializationError {
    #[error("JSON serialization failed: {message}. Event type: {event_type}")]
    JsonSerializationFailed { message: String, event_type: String },

    #[error("JSON deserialization failed: {message}. Expected type: {expected_type}, Input: {input_preview}")]
    JsonDeserializationFailed {
        message: String,
        expected_type: String,
        input_preview: String,
    },

    #[error("Schema version incompatibility: Expected version {expected}, found {actual}. Event type: {event_type}")]
    SchemaVersionIncompatible {
        expected: u32,
        actual: u32,
        event_type: String,
    },

    #[error("Missing required field: {field_name} in event type {event_type}")]
    MissingRequiredField {
        field_name: String,
        event_type: String,
    },

    #[error("Unsupported event format: {format} for event type {event_type}")]
    UnsupportedEventFormat { format: String, event_type: String },
}

impl SerializationError {
    /// 入力データのプレビューを生成（デバッグ用、最大100文字）
    fn create_input_preview(input: &str) -> String {
        if input.len() <= 100 {
            input.to_string()
        } else {
            format!("{}...", &input[..97])
        }
    }

    /// JSONデシリアライゼーションエラーを作成
    pub fn json_deserialization_failed(
        message: String,
        expected_type: String,
        input: &str,
    ) -> Self {
        Self::JsonDeserializationFailed {
            message,
            expected_type,
            input_preview: Self::create_input_preview(input),
        }
    }
}

/// イベントシリアライザー
/// ドメインイベントの安全なシリアライゼーション/デシリアライゼーションを提供
pub struct EventSerializer {
    /// サポートするスキーマバージョンの範囲
    supported_versions: std::ops::RangeInclusive<u32>,
}

impl EventSerializer {
    /// 新しいイベントシリアライザーを作成
    pub fn new() -> Self {
        Self {
            supported_versions: 1..=1, // 現在はバージョン1のみサポート
        }
    }

    /// ドメインイベントをJSONにシリアライズ
    pub fn serialize_event(&self, event: &DomainEvent) -> Result<String, SerializationError> {
        // スキーマバージョンの検証
        let event_version = event.metadata().event_version;
        if !self.supported_versions.contains(&event_version) {
            return Err(SerializationError::SchemaVersionIncompatible {
                expected: *self.supported_versions.end(),
                actual: event_version,
                event_type: event.event_type().to_string(),
            });
        }

        // 必須フィールドの事前検証
        self.validate_event_metadata(event)?;

        serde_json::to_string(event).map_err(|e| SerializationError::JsonSerializationFailed {
            message: e.to_string(),
            event_type: event.event_type().to_string(),
        })
    }

    /// JSONからドメインイベントにデシリアライズ
    pub fn deserialize_event(&self, json: &str) -> Result<DomainEvent, SerializationError> {
        // 入力の基本検証
        if json.trim().is_empty() {
            return Err(SerializationError::JsonDeserializationFailed {
                message: "Empty JSON input".to_string(),
                expected_type: "DomainEvent".to_string(),
                input_preview: "".to_string(),
            });
        }

        // JSONの構文検証
        let _: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            SerializationError::json_deserialization_failed(
                format!("Invalid JSON syntax: {}", e),
                "DomainEvent".to_string(),
                json,
            )
        })?;

        // スキーマバージョンの事前チェック
        self.validate_schema_compatibility(json)?;

        let event = serde_json::from_str::<DomainEvent>(json)
            .map_err(|e| self.analyze_deserialization_error(&e, json))?;

        // デシリアライゼーション後の検証
        self.validate_event_metadata(&event)?;

        Ok(event)
    }

    /// スキーマ互換性の検証
    fn validate_schema_compatibility(&self, json: &str) -> Result<(), SerializationError> {
        let parsed: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            SerializationError::json_deserialization_failed(
                format!("Failed to parse JSON for schema validation: {}", e),
                "JSON Value".to_string(),
                json,
            )
        })?;

        // イベントタイプの取得
        let event_type = parsed
            .get("event_type")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown");

        // メタデータからバージョン情報を取得
        let version = parsed
            .get("event_data")
            .and_then(|data| data.get("metadata"))
            .and_then(|metadata| metadata.get("event_version"))
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
            .unwrap_or(1); // デフォルトはバージョン1

        if !self.supported_versions.contains(&version) {
            return Err(SerializationError::SchemaVersionIncompatible {
                expected: *self.supported_versions.end(),
                actual: version,
                event_type: event_type.to_string(),
            });
        }

        Ok(())
    }

    /// メタデータの必須フィールド検証
    fn validate_event_metadata(&self, event: &DomainEvent) -> Result<(), SerializationError> {
        let metadata = event.metadata();

        if metadata.event_id.is_nil() {
            return Err(SerializationError::MissingRequiredField {
                field_name: "event_id".to_string(),
                event_type: event.event_type().to_string(),
            });
        }

        if metadata.correlation_id.is_nil() {
            return Err(SerializationError::MissingRequiredField {
                field_name: "correlation_id".to_string(),
                event_type: event.event_type().to_string(),
            });
        }

        Ok(())
    }

    /// デシリアライゼーションエラーの詳細分析
    fn analyze_deserialization_error(
        &self,
        serde_error: &serde_json::Error,
        json: &str,
    ) -> SerializationError {
        let error_msg = serde_error.to_string();

        if error_msg.contains("missing field") {
            let field_name = error_msg
                .split("missing field `")
                .nth(1)
                .and_then(|s| s.split('`').next())
                .unwrap_or("unknown");

            SerializationError::MissingRequiredField {
                field_name: field_name.to_string(),
                event_type: "Unknown".to_string(),
            }
        } else if error_msg.contains("unknown variant") {
            SerializationError::UnsupportedEventFormat {
                format: "Unknown event variant".to_string(),
                event_type: "Unknown".to_string(),
            }
        } else {
            SerializationError::json_deserialization_failed(
                error_msg,
                "DomainEvent".to_string(),
                json,
            )
        }
    }
}

impl Default for EventSerializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{BookingCancelled, BookingConfirmed};
    use crate::domain::model::{
        AccommodationTypeId, BookingId, CampsiteId, DateRange, GuestId, Money, SpotId,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn confirmed_event() -> DomainEvent {
        DomainEvent::BookingConfirmed(BookingConfirmed::new(
            BookingId::new(),
            GuestId::new(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            SpotId::new(1).unwrap(),
            DateRange::new(
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
            )
            .unwrap(),
            Money::dkk(dec!(1575)),
        ))
    }

    #[test]
    fn test_successful_serialization() {
        let serializer = EventSerializer::new();
        let event = confirmed_event();

        let result = serializer.serialize_event(&event);
        assert!(result.is_ok());

        let json = result.unwrap();
        assert!(json.contains("BookingConfirmed"));
        assert!(json.contains("event_type"));
        assert!(json.contains("event_data"));
    }

    #[test]
    fn test_successful_deserialization() {
        let serializer = EventSerializer::new();
        let original_event = confirmed_event();

        let json = serializer.serialize_event(&original_event).unwrap();
        let deserialized = serializer.deserialize_event(&json);

        assert!(deserialized.is_ok());
        let deserialized_event = deserialized.unwrap();
        assert_eq!(original_event.event_type(), deserialized_event.event_type());
        assert_eq!(
            original_event.metadata().event_id,
            deserialized_event.metadata().event_id
        );
    }

    #[test]
    fn test_cancelled_event_round_trip_keeps_release_flag() {
        let serializer = EventSerializer::new();
        let event = DomainEvent::BookingCancelled(BookingCancelled::new(
            BookingId::new(),
            GuestId::new(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            Some(SpotId::new(3).unwrap()),
            DateRange::new(
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            )
            .unwrap(),
            true,
        ));

        let json = serializer.serialize_event(&event).unwrap();
        let deserialized = serializer.deserialize_event(&json).unwrap();
        match deserialized {
            DomainEvent::BookingCancelled(e) => {
                assert!(e.was_confirmed);
                assert_eq!(e.spot_id, Some(SpotId::new(3).unwrap()));
            }
            other => panic!("Unexpected event type: {}", other.event_type()),
        }
    }

    #[test]
    fn test_empty_json_deserialization_error() {
        let serializer = EventSerializer::new();
        let result = serializer.deserialize_event("");

        assert!(result.is_err());
        match result.unwrap_err() {
            SerializationError::JsonDeserializationFailed { message, .. } => {
                assert!(message.contains("Empty JSON input"));
            }
            _ => panic!("Expected JsonDeserializationFailed error"),
        }
    }

    #[test]
    fn test_invalid_json_deserialization_error() {
        let serializer = EventSerializer::new();
        let invalid_json = "{ invalid json }";
        let result = serializer.deserialize_event(invalid_json);

        assert!(result.is_err());
        match result.unwrap_err() {
            SerializationError::JsonDeserializationFailed {
                message,
                input_preview,
                ..
            } => {
                assert!(message.contains("Invalid JSON syntax"));
                assert_eq!(input_preview, invalid_json);
            }
            _ => panic!("Expected JsonDeserializationFailed error"),
        }
    }

    #[test]
    fn test_unsupported_schema_version_rejected() {
        let serializer = EventSerializer::new();
        let mut event = confirmed_event();
        event.metadata_mut().event_version = 2;

        let result = serializer.serialize_event(&event);
        assert!(matches!(
            result,
            Err(SerializationError::SchemaVersionIncompatible { actual: 2, .. })
        ));
    }
}
