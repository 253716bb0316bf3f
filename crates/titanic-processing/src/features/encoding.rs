//! One-hot (dummy) encoding of categorical features.

use std::collections::BTreeSet;

/// Indicator columns for one categorical feature.
///
/// Levels are the distinct values observed in the data, sorted
/// lexicographically. Missing values encode as all zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoding {
    feature: String,
    levels: Vec<String>,
}

impl OneHotEncoding {
    /// Collect the levels observed in `values`.
    pub fn fit<'a, I>(feature: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let levels: BTreeSet<&str> = values.into_iter().flatten().collect();
        Self {
            feature: feature.to_string(),
            levels: levels.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Indicator column names, `<Feature>_<level>`.
    pub fn column_names(&self) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| format!("{}_{}", self.feature, level))
            .collect()
    }

    /// Remove the indicator for `level`. Returns false if it was never observed.
    pub fn drop_level(&mut self, level: &str) -> bool {
        let before = self.levels.len();
        self.levels.retain(|l| l != level);
        self.levels.len() != before
    }

    /// Indicator values for one row, one per remaining level.
    pub fn encode(&self, value: Option<&str>) -> Vec<f64> {
        self.levels
            .iter()
            .map(|level| match value {
                Some(v) if v == level => 1.0,
                _ => 0.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_levels_sorted_and_deduplicated() {
        let encoding = OneHotEncoding::fit("Embarked", [Some("S"), Some("C"), None, Some("S"), Some("Q")]);
        assert_eq!(encoding.levels(), &["C", "Q", "S"]);
        assert_eq!(
            encoding.column_names(),
            vec!["Embarked_C", "Embarked_Q", "Embarked_S"]
        );
    }

    #[test]
    fn test_encode_row() {
        let encoding = OneHotEncoding::fit("Sex", [Some("male"), Some("female")]);
        assert_eq!(encoding.encode(Some("male")), vec![0.0, 1.0]);
        assert_eq!(encoding.encode(None), vec![0.0, 0.0]);
    }

    #[test]
    fn test_drop_level() {
        let mut encoding = OneHotEncoding::fit("Pclass", [Some("1"), Some("2"), Some("3")]);
        assert!(encoding.drop_level("3"));
        assert_eq!(encoding.column_names(), vec!["Pclass_1", "Pclass_2"]);
        assert_eq!(encoding.encode(Some("3")), vec![0.0, 0.0]);

        // Unobserved reference level leaves the encoding untouched
        assert!(!encoding.drop_level("4"));
        assert_eq!(encoding.levels().len(), 2);
    }
}
