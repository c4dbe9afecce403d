//! Codec for the persisted label-set field: comma-joined decimal tag ids,
//! empty string for "no labels". Everything downstream works on discrete ids;
//! the encoded form never leaves the storage boundary.

use crate::error::{AppError, AppResult};
use crate::models::entry::{Entry, EntryWithLabels};

pub fn decode(encoded: &str) -> AppResult<Vec<i64>> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    encoded
        .split(',')
        .map(|token| {
            let id = token.parse::<i64>().map_err(|_| {
                AppError::MalformedLabelSet(format!("{token:?} is not a valid tag id"))
            })?;
            if id < 0 {
                return Err(AppError::MalformedLabelSet(format!(
                    "{token:?} is not a valid tag id"
                )));
            }
            Ok(id)
        })
        .collect()
}

pub fn encode(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode every entry's label set for list views. A corrupt field surfaces as
/// `MalformedLabelSet` rather than silently producing wrong results.
pub fn decode_entries(entries: Vec<Entry>) -> AppResult<Vec<EntryWithLabels>> {
    entries
        .into_iter()
        .map(|entry| {
            let tag_ids = decode(&entry.tag_ids)?;
            Ok(EntryWithLabels { entry, tag_ids })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_empty_set() {
        assert_eq!(decode("").unwrap(), Vec::<i64>::new());
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn round_trip() {
        let ids = vec![1, 12, 31];
        assert_eq!(decode(&encode(&ids)).unwrap(), ids);
    }

    #[test]
    fn membership_uses_discrete_ids_not_substrings() {
        // "12" contains "1" as a substring; the decoded set must not.
        let set = decode("1,12").unwrap();
        assert!(set.contains(&1));

        let set = decode("2,12").unwrap();
        assert!(!set.contains(&1));
        assert!(set.contains(&12));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(decode("a"), Err(AppError::MalformedLabelSet(_))));
        assert!(matches!(decode("1,,2"), Err(AppError::MalformedLabelSet(_))));
        assert!(matches!(decode("-3"), Err(AppError::MalformedLabelSet(_))));
        assert!(matches!(decode("1, 2"), Err(AppError::MalformedLabelSet(_))));
    }
}
