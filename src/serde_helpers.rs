use serde::{Deserialize, Deserializer, Serializer};
use time::{
    OffsetDateTime, PrimitiveDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// Serde helpers for `time::OffsetDateTime`.
///
/// Output format: RFC 3339 with the commit's own offset.
/// Input format: RFC 3339, or `YYYY-mm-dd HH:MM:SS` taken as UTC.
pub mod offset_datetime {

    use super::*;

    pub(super) const LOOSE_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month padding:zero]-[day padding:zero] [hour padding:zero]:[minute padding:zero]:[second padding:zero]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&raw, &Rfc3339)
            .or_else(|_| PrimitiveDateTime::parse(&raw, LOOSE_FORMAT).map(|pdt| pdt.assume_utc()))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::macros::datetime;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Stamp {
        #[serde(with = "offset_datetime")]
        at: OffsetDateTime,
    }

    #[test]
    fn keeps_the_offset() {
        let stamp = Stamp {
            at: datetime!(2024-03-01 12:30:00 +02:00),
        };
        let json = serde_json::to_string(&stamp).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-01T12:30:00+02:00"}"#);
        let back: Stamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stamp);
    }

    #[test]
    fn accepts_loose_input_as_utc() {
        let back: Stamp = serde_json::from_str(r#"{"at":"2024-03-01 12:30:00"}"#).unwrap();
        assert_eq!(back.at, datetime!(2024-03-01 12:30:00 UTC));
    }
}
