use serde::{Deserialize, Deserializer, Serialize};

use crate::counter::Event;
use crate::error::{Error, Result};

// On-disk layout of the window. The capitalized field name is the
// format existing state files were written with.
#[derive(Serialize, Deserialize, Debug, Default)]
struct WindowDocument {
    #[serde(
        rename = "Timestamps",
        default,
        deserialize_with = "null_as_empty"
    )]
    timestamps: Vec<Event>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Event>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamps: Option<Vec<Event>> = Option::deserialize(deserializer)?;
    Ok(timestamps.unwrap_or_default())
}

pub fn encode(events: &[Event]) -> Result<Vec<u8>> {
    let document = WindowDocument {
        timestamps: events.to_vec(),
    };
    serde_json::to_vec(&document).map_err(Error::Serialization)
}

/// An empty input means there is no prior state.
pub fn decode(bytes: &[u8]) -> Result<Vec<Event>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let document: WindowDocument = serde_json::from_slice(bytes).map_err(Error::Deserialization)?;
    Ok(document.timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn round_trips_events_in_order() {
        let start = Utc.ymd(2026, 10, 19).and_hms_nano(8, 30, 0, 123_456_789);
        let events: Vec<Event> = (0..5).map(|i| start + Duration::milliseconds(i * 250)).collect();

        let bytes = encode(&events).expect("encode");
        assert_eq!(decode(&bytes).expect("decode"), events);
    }

    #[test]
    fn round_trips_empty_window() {
        let bytes = encode(&[]).expect("encode");
        assert_eq!(bytes, br#"{"Timestamps":[]}"#.to_vec());
        assert!(decode(&bytes).expect("decode").is_empty());
    }

    #[test]
    fn empty_input_is_no_state() {
        assert!(decode(b"").expect("decode").is_empty());
    }

    #[test]
    fn null_timestamp_list_is_no_state() {
        assert!(decode(br#"{"Timestamps":null}"#).expect("decode").is_empty());
        assert!(decode(br#"{}"#).expect("decode").is_empty());
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let decoded = decode(br#"{"Timestamps":["2026-10-19T14:00:00.5+02:00"]}"#).expect("decode");
        assert_eq!(
            decoded,
            vec![Utc.ymd(2026, 10, 19).and_hms_milli(12, 0, 0, 500)]
        );
    }

    #[test]
    fn truncated_input_is_rejected() {
        let bytes = encode(&[Utc::now()]).expect("encode");
        let truncated = &bytes[..bytes.len() - 3];
        match decode(truncated) {
            Err(Error::Deserialization(_)) => (),
            other => panic!("expected deserialization error, got {:?}", other),
        }
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        match decode(br#"{"Timestamps":["yesterday"]}"#) {
            Err(Error::Deserialization(_)) => (),
            other => panic!("expected deserialization error, got {:?}", other),
        }
    }
}
