//! Decoding of a node's captured messages.
//!
//! The service ships each user's messages as a JSON-encoded string in the
//! `tweets` attribute; an inline array is accepted as well.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::SelectionDataError;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Tweet {
	#[serde(default, deserialize_with = "string_or_number")]
	pub id: String,
	#[serde(default)]
	pub text: String,
	#[serde(default)]
	pub created_at: Option<String>,
	#[serde(default, alias = "public_metrics")]
	pub metrics: TweetMetrics,
}

/// Engagement counters. Absent counters read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TweetMetrics {
	pub retweet_count: u64,
	pub reply_count: u64,
	pub like_count: u64,
	pub quote_count: u64,
}

/// Decode the raw `tweets` attribute.
pub fn parse_tweets(raw: Option<&Value>) -> Result<Vec<Tweet>, SelectionDataError> {
	match raw {
		None | Some(Value::Null) => Err(SelectionDataError::Missing),
		Some(Value::String(encoded)) => Ok(serde_json::from_str(encoded)?),
		Some(inline) => Ok(Vec::<Tweet>::deserialize(inline)?),
	}
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::String(s) => s,
		Value::Number(n) => n.to_string(),
		_ => String::new(),
	})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn decodes_an_encoded_string() {
		let raw = json!(
			r#"[{"id":"1","text":"gm","created_at":"2024-03-01T10:00:00Z","metrics":{"like_count":3,"retweet_count":1}}]"#
		);
		let tweets = parse_tweets(Some(&raw)).unwrap();

		assert_eq!(
			tweets,
			vec![Tweet {
				id: "1".into(),
				text: "gm".into(),
				created_at: Some("2024-03-01T10:00:00Z".into()),
				metrics: TweetMetrics {
					retweet_count: 1,
					like_count: 3,
					..TweetMetrics::default()
				},
			}]
		);
	}

	#[test]
	fn accepts_inline_arrays_and_public_metrics() {
		let raw = json!([{ "id": 99, "text": "hi", "public_metrics": { "reply_count": 2 } }]);
		let tweets = parse_tweets(Some(&raw)).unwrap();

		assert_eq!(tweets[0].id, "99");
		assert_eq!(tweets[0].metrics.reply_count, 2);
		assert_eq!(tweets[0].created_at, None);
	}

	#[test]
	fn absent_or_garbled_data_is_an_error() {
		assert!(matches!(parse_tweets(None), Err(SelectionDataError::Missing)));
		assert!(matches!(
			parse_tweets(Some(&json!("[{'id': '1'}]"))),
			Err(SelectionDataError::Unparseable(_))
		));
		assert!(matches!(
			parse_tweets(Some(&json!(12))),
			Err(SelectionDataError::Unparseable(_))
		));
	}
}
