use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use crate::error::MonitorError;

/// Compile the caller-supplied deal patterns into a name-ordered set.
///
/// The result is a `BTreeMap` on purpose: when a message matches more than one
/// deal, the lexicographically smallest name wins, so the tie-break is stable
/// instead of inheriting hash-map iteration order.
pub fn compile(deals: &HashMap<String, String>) -> Result<BTreeMap<String, Regex>, MonitorError> {
    // sorted view so the "first invalid pattern" error is stable too
    let ordered: BTreeMap<&String, &String> = deals.iter().collect();

    let mut compiled = BTreeMap::new();
    for (name, expression) in ordered {
        let re = Regex::new(expression).map_err(|source| MonitorError::Pattern {
            name: name.clone(),
            source,
        })?;
        compiled.insert(name.clone(), re);
    }
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deals(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(n, p)| (n.to_string(), p.to_string()))
            .collect()
    }

    #[test]
    fn compiles_all_valid_patterns() {
        let set = compile(&deals(&[("sale", r"\bSALE\b"), ("gpu", "(?i)rtx")])).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set["sale"].is_match("Big SALE today"));
        assert!(set["gpu"].is_match("cheap RTX 4090"));
    }

    #[test]
    fn invalid_pattern_fails_and_names_the_deal() {
        let err = compile(&deals(&[("ok", "abc"), ("broken", "(unclosed")])).unwrap_err();
        match err {
            MonitorError::Pattern { name, .. } => assert_eq!(name, "broken"),
            other => panic!("expected Pattern error, got {other:?}"),
        }
    }

    #[test]
    fn iteration_order_is_lexicographic_by_name() {
        let set = compile(&deals(&[("zebra", "z"), ("apple", "a"), ("mango", "m")])).unwrap();
        let names: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn empty_input_yields_empty_set() {
        assert!(compile(&HashMap::new()).unwrap().is_empty());
    }
}
