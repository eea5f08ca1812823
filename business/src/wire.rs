//! Lenient decoding for backend records, which are not strictly typed.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    /// Booleans, arrays and objects.
    Other(IgnoredAny),
}

/// Ids arrive as strings or numbers.
pub(crate) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) if n.fract() == 0.0 => format!("{}", n as i64),
        Some(NumberOrText::Number(n)) => n.to_string(),
        Some(NumberOrText::Text(s)) => s,
        Some(NumberOrText::Other(_)) | None => String::new(),
    })
}

/// Prices arrive as numbers, numeric strings, empty strings or null.
pub(crate) fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().replace(',', "").parse().ok(),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

/// Counts arrive as numbers or numeric strings; anything else reads as zero.
pub(crate) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) if n >= 0.0 => n as u32,
        Some(NumberOrText::Text(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Record {
        #[serde(default, deserialize_with = "super::id")]
        id: String,
        #[serde(default, deserialize_with = "super::price")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "super::count")]
        rooms: u32,
    }

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numbers_and_strings_are_both_accepted() {
        let p = record(r#"{"id": 42, "price": "250,000", "rooms": "3"}"#);
        assert_eq!(p.id, "42");
        assert_eq!(p.price, Some(250_000.0));
        assert_eq!(p.rooms, 3);

        let p = record(r#"{"id": "abc", "price": 99.5, "rooms": 2}"#);
        assert_eq!(p.id, "abc");
        assert_eq!(p.price, Some(99.5));
        assert_eq!(p.rooms, 2);
    }

    #[test]
    fn missing_or_garbage_values_fall_back() {
        let p = record(r#"{"price": "", "rooms": "many"}"#);
        assert_eq!(p.id, "");
        assert_eq!(p.price, None);
        assert_eq!(p.rooms, 0);

        let p = record(r#"{"id": null, "price": null}"#);
        assert_eq!(p.price, None);
    }

    #[test]
    fn booleans_and_objects_read_as_empty() {
        let p = record(r#"{"id": {"$oid": "x"}, "price": true, "rooms": false}"#);
        assert_eq!(p.id, "");
        assert_eq!(p.price, None);
        assert_eq!(p.rooms, 0);

        let p = record(r#"{"id": 5, "rooms": {"count": 3}}"#);
        assert_eq!(p.id, "5");
        assert_eq!(p.rooms, 0);

        let p = record(r#"{"rooms": [1, 2]}"#);
        assert_eq!(p.rooms, 0);
    }
}
