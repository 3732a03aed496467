use std::collections::BTreeMap;

use crate::error::NicError;

/// Separators used to split a key-value string such as `a=b,c=d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    /// Separator between `key=value` items.
    pub item: char,
    /// Separator between a key and its value.
    pub key_value: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            item: ',',
            key_value: '=',
        }
    }
}

/// Parse `a=b,c=d` style strings into a key-ordered map.
///
/// Each item is split at the first key/value separator only, so values may
/// contain it. Later duplicate keys overwrite earlier ones.
pub fn parse_keyvals(
    input: &str,
    separators: Separators,
) -> Result<BTreeMap<String, String>, NicError> {
    let mut keyvals = BTreeMap::new();
    for item in input.split(separators.item) {
        let (key, value) = item.split_once(separators.key_value).ok_or_else(|| {
            NicError::MalformedDescriptor(format!(
                "item '{item}' has no '{}' separator",
                separators.key_value
            ))
        })?;
        keyvals.insert(key.to_string(), value.to_string());
    }
    Ok(keyvals)
}

/// Keys of a key-value string in the order they appear, duplicates kept.
///
/// Unlike [`parse_keyvals`] this never fails: an item with no key/value
/// separator is taken whole as the key.
pub fn keys_in_order(input: &str, separators: Separators) -> Vec<String> {
    input
        .split(separators.item)
        .map(|item| match item.split_once(separators.key_value) {
            Some((key, _)) => key.to_string(),
            None => item.to_string(),
        })
        .collect()
}
