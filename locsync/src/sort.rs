use crate::types::FlatResource;

/// Returns the entries ordered by ascending key, for stable file output and
/// readable diffs.
pub fn sort_flat_resources(flat: &FlatResource) -> FlatResource {
    let mut sorted = flat.clone();
    sorted.sort_keys();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlatValue;

    #[test]
    fn test_sorts_keys() {
        let mut flat = FlatResource::new();
        flat.insert("b".to_string(), FlatValue::from("2"));
        flat.insert("a".to_string(), FlatValue::from("1"));
        let sorted = sort_flat_resources(&flat);
        let keys: Vec<&str> = sorted.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(sorted["a"].text(), "1");
    }

    #[test]
    fn test_empty_input() {
        assert!(sort_flat_resources(&FlatResource::new()).is_empty());
    }

    #[test]
    fn test_byte_order_not_numeric() {
        let flat: FlatResource = ["arr.10", "arr.9", "arr.1", "B", "a"]
            .into_iter()
            .map(|k| (k.to_string(), FlatValue::from("x")))
            .collect();
        let keys: Vec<String> = sort_flat_resources(&flat).into_keys().collect();
        assert_eq!(keys, vec!["B", "a", "arr.1", "arr.10", "arr.9"]);
    }
}
