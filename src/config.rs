// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Where the interesting cells live inside the workbook. The published
/// spreadsheet buries its table under two title rows, stacks three header rows
/// (qualification level / type / year) above the data, and spends the first
/// three data columns on the field-of-education hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub sheet_index: usize,
    pub header_skip_rows: usize,
    pub header_rows: usize,
    pub data_skip_rows: usize,
    pub subject_columns: usize,
    /// Joins the three header-row labels into one composite column name.
    /// Must not occur in any header label.
    pub separator: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        SheetLayout {
            sheet_index: 8,
            header_skip_rows: 2,
            header_rows: 3,
            data_skip_rows: 5,
            subject_columns: 3,
            separator: "|".to_string(),
        }
    }
}

/// The editorial filters: which qualifications count as degrees, which broad
/// field holds the humanities, and the hand-picked detailed subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    pub qualification_levels: Vec<String>,
    /// Qualification-type tag to keep; the domestic/international split is
    /// discarded with everything else.
    pub total_tag: String,
    /// Literal suffix marking subtotal labels, stripped before matching.
    pub subtotal_suffix: String,
    pub broad_field: String,
    pub humanities_subjects: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        FilterRules {
            qualification_levels: vec![
                "Bachelors".to_string(),
                "Postgraduate Certificate/Diploma and Honours".to_string(),
                "Masters".to_string(),
                "Doctorates".to_string(),
            ],
            total_tag: "Total".to_string(),
            subtotal_suffix: ": Total".to_string(),
            broad_field: "Society and Culture".to_string(),
            humanities_subjects: vec![
                "Society and Culture, nfd".to_string(),
                "Language and Literature, nfd".to_string(),
                "English Language".to_string(),
                "Literature".to_string(),
                "Linguistics".to_string(),
                "Translating and Interpreting".to_string(),
                "Eastern Asian Languages".to_string(),
                "Southern Asian Languages".to_string(),
                "Southeast Asian Languages".to_string(),
                "Northern European Languages".to_string(),
                "Southern European Languages".to_string(),
                "Eastern European Languages".to_string(),
                "Australian Indigenous Languages".to_string(),
                "Studies in Human Society, nfd".to_string(),
                "Anthropology".to_string(),
                "Archaeology".to_string(),
                "History".to_string(),
                "Sociology".to_string(),
                "Indigenous Studies".to_string(),
                "Gender Specific Studies".to_string(),
                "Philosophy and Religious Studies, nfd".to_string(),
                "Philosophy".to_string(),
                "Religious Studies".to_string(),
            ],
        }
    }
}

/// Knobs for the three summary views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewRules {
    pub base_year: u16,
    pub compare_year: u16,
    /// "nfd" catch-all buckets; they are real rows in the sheet but not
    /// subjects anyone chose, so the gains/losses view leaves them out.
    pub excluded_pseudo_subjects: Vec<String>,
    /// Hand-picked subjects for the bar chart. Empty means chart everything.
    pub bar_chart_subjects: Vec<String>,
}

impl Default for ViewRules {
    fn default() -> Self {
        ViewRules {
            base_year: 2008,
            compare_year: 2017,
            excluded_pseudo_subjects: vec![
                "Society and Culture, nfd".to_string(),
                "Language and Literature, nfd".to_string(),
                "Studies in Human Society, nfd".to_string(),
                "Philosophy and Religious Studies, nfd".to_string(),
            ],
            bar_chart_subjects: vec![
                "History".to_string(),
                "Philosophy".to_string(),
                "Sociology".to_string(),
                "Anthropology".to_string(),
                "Archaeology".to_string(),
                "Literature".to_string(),
                "English Language".to_string(),
                "Linguistics".to_string(),
                "Indigenous Studies".to_string(),
                "Religious Studies".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: SheetLayout,
    pub filters: FilterRules,
    pub views: ViewRules,
    pub out_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            layout: SheetLayout::default(),
            filters: FilterRules::default(),
            views: ViewRules::default(),
            out_dir: PathBuf::from("charts"),
        }
    }
}

impl Config {
    /// Load overrides from a YAML file; anything the file omits keeps its
    /// default, so a config can adjust one list without restating the rest.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_editorial_lists() {
        let config = Config::default();
        assert_eq!(config.layout.sheet_index, 8);
        assert_eq!(config.layout.header_rows, 3);
        assert_eq!(config.filters.qualification_levels.len(), 4);
        assert_eq!(config.filters.humanities_subjects.len(), 23);
        assert_eq!(config.views.excluded_pseudo_subjects.len(), 4);
        // every excluded pseudo-subject is itself whitelisted
        for name in &config.views.excluded_pseudo_subjects {
            assert!(config.filters.humanities_subjects.contains(name));
        }
        for name in &config.views.bar_chart_subjects {
            assert!(config.filters.humanities_subjects.contains(name));
        }
    }

    #[test]
    fn partial_yaml_only_overrides_named_fields() {
        let yaml = r#"
layout:
  sheet_index: 2
views:
  base_year: 2010
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.layout.sheet_index, 2);
        assert_eq!(config.layout.data_skip_rows, 5);
        assert_eq!(config.views.base_year, 2010);
        assert_eq!(config.views.compare_year, 2017);
        assert_eq!(config.filters.broad_field, "Society and Culture");
    }

    #[test]
    fn from_yaml_file_reports_missing_path() {
        let err = Config::from_yaml_file("no/such/config.yaml").unwrap_err();
        assert!(err.to_string().contains("no/such/config.yaml"));
    }
}
