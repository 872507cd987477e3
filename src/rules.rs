//! Heuristic classification of ESLint rule source files.
//!
//! Rules are never parsed. Each file is matched against ordered lists of
//! literal markers, and each category is decided independently, so a file
//! may be both a function rule and an object rule, or neither.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error_handling::{Result, SurveyError};
use crate::repository::list_files;

/// Conventional rule directories, in lookup order.
pub const RULES_DIR_CANDIDATES: [&str; 3] = ["lib/rules", "src/rules", "rules"];

const RULE_SUFFIXES: [&str; 2] = [".js", ".ts"];
const IGNORED_SUFFIXES: [&str; 5] = ["-test.js", "-test.ts", ".d.ts", ".test.js", ".test.ts"];
const IGNORED_FILES: [&str; 6] = [
    "index.js", "index.ts", "util.js", "util.ts", "utils.js", "utils.ts",
];

/// A literal substring plus, for plugin-specific helpers, the plugin that uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub text: String,
    pub origin: Option<String>,
}

impl Marker {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            origin: None,
        }
    }

    pub fn from_plugin(text: &str, plugin: &str) -> Self {
        Self {
            text: text.to_string(),
            origin: Some(plugin.to_string()),
        }
    }
}

/// Ordered set of markers; a text matches when it contains any of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    pub fn push(&mut self, marker: Marker) -> &mut Self {
        self.markers.push(marker);
        self
    }

    pub fn first_match(&self, text: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| text.contains(m.text.as_str()))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// Exports of a bare `(context) => ...` function.
    pub fn function_rule_defaults() -> Self {
        Self::new(
            [
                "export default (context) =>",
                "export default context =>",
                "export default function",
                "module.exports = (context) =>",
                "module.exports = (context,",
                "module.exports = context =>",
                "module.exports = function",
            ]
            .into_iter()
            .map(Marker::new)
            .collect(),
        )
    }

    /// Object exports and the helper wrappers plugins build them with.
    pub fn object_rule_defaults() -> Self {
        Self::new(vec![
            Marker::new("const rule: Rule = {"),
            Marker::new("createRule"),
            Marker::new("export = {"),
            Marker::new("export default createRule"),
            Marker::new("export default util.createRule"),
            Marker::new("export default {"),
            Marker::new("export {"),
            Marker::new("meta: {"),
            Marker::new("module.exports = buildRule"),
            Marker::new("module.exports = createValidPropRule"),
            Marker::new("module.exports = define("),
            Marker::new("module.exports = dependencyRule"),
            Marker::from_plugin(
                "module.exports = utils.createCollectionMethodRule",
                "eslint-plugin-no-jquery",
            ),
            Marker::from_plugin(
                "module.exports = utils.createCollectionOrUtilMethodRule",
                "eslint-plugin-no-jquery",
            ),
            Marker::from_plugin(
                "module.exports = utils.createUtilMethodRule",
                "eslint-plugin-no-jquery",
            ),
            Marker::from_plugin(
                "module.exports = utils.createUtilPropertyRule",
                "eslint-plugin-no-jquery",
            ),
            Marker::from_plugin("module.exports = wrapCoreRule", "eslint-plugin-mpx"),
            Marker::new("module.exports = {"),
            Marker::new("module.exports.create ="),
            Marker::new("module.exports.meta = {"),
        ])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleClassification {
    pub mentions_options: bool,
    pub mentions_schema: bool,
    pub is_function_rule: bool,
    pub is_object_rule: bool,
}

impl RuleClassification {
    pub fn mentions_options_without_schema(&self) -> bool {
        self.mentions_options && !self.mentions_schema
    }
}

#[derive(Debug, Clone)]
pub struct RuleClassifier {
    options_marker: String,
    schema_marker: String,
    function_markers: MarkerSet,
    object_markers: MarkerSet,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self {
            options_marker: "context.options".to_string(),
            schema_marker: "schema".to_string(),
            function_markers: MarkerSet::function_rule_defaults(),
            object_markers: MarkerSet::object_rule_defaults(),
        }
    }
}

impl RuleClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function_markers(mut self, markers: MarkerSet) -> Self {
        self.function_markers = markers;
        self
    }

    pub fn with_object_markers(mut self, markers: MarkerSet) -> Self {
        self.object_markers = markers;
        self
    }

    /// Appends extra markers to the defaults of each category.
    pub fn extended(extra_function: &[String], extra_object: &[String]) -> Self {
        let mut function_markers = MarkerSet::function_rule_defaults();
        for text in extra_function {
            function_markers.push(Marker::new(text));
        }
        let mut object_markers = MarkerSet::object_rule_defaults();
        for text in extra_object {
            object_markers.push(Marker::new(text));
        }
        Self::new()
            .with_function_markers(function_markers)
            .with_object_markers(object_markers)
    }

    pub fn classify(&self, content: &str) -> RuleClassification {
        self.classify_with_object_marker(content).0
    }

    fn classify_with_object_marker(&self, content: &str) -> (RuleClassification, Option<&Marker>) {
        let object_marker = self.object_markers.first_match(content);
        let classification = RuleClassification {
            mentions_options: content.contains(self.options_marker.as_str()),
            mentions_schema: content.contains(self.schema_marker.as_str()),
            is_function_rule: self.function_markers.matches(content),
            is_object_rule: object_marker.is_some(),
        };
        (classification, object_marker)
    }

    pub fn classify_file(&self, path: &Path) -> Result<RuleClassification> {
        let bytes = fs::read(path).map_err(|e| SurveyError::io(path, e))?;
        let content = String::from_utf8_lossy(&bytes);
        let (classification, object_marker) = self.classify_with_object_marker(&content);
        if let Some(Marker { text, origin: Some(plugin) }) = object_marker {
            debug!("{} matched helper marker '{}' from {}", path.display(), text, plugin);
        }
        debug!("Classified {}: {:?}", path.display(), classification);
        Ok(classification)
    }

    /// Classifies every candidate rule file of a repository.
    /// A repository without a rules directory has no rules.
    pub fn classify_repository(&self, repository_root: &Path) -> Result<Vec<RuleClassification>> {
        let Some(rules_dir) = find_rules_dir(repository_root) else {
            debug!("No rules directory in {}", repository_root.display());
            return Ok(Vec::new());
        };

        find_rule_files(&rules_dir)?
            .iter()
            .map(|name| self.classify_file(&rules_dir.join(name)))
            .collect()
    }
}

pub fn find_rules_dir(repository_root: &Path) -> Option<PathBuf> {
    RULES_DIR_CANDIDATES
        .iter()
        .map(|candidate| repository_root.join(candidate))
        .find(|path| path.is_dir())
}

pub fn is_rule_file(name: &str) -> bool {
    RULE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        && !IGNORED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        && !IGNORED_FILES.contains(&name)
}

/// Candidate rule file names directly inside `rules_dir`, sorted.
pub fn find_rule_files(rules_dir: &Path) -> Result<Vec<String>> {
    Ok(list_files(rules_dir)?
        .into_iter()
        .filter(|name| is_rule_file(name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_object_rule_with_schema() {
        let content = r#"
module.exports = {
  meta: {
    type: "problem",
    schema: [{ type: "object" }],
  },
  create(context) {
    const options = context.options[0] || {};
    return {};
  },
};
"#;
        let classification = RuleClassifier::new().classify(content);
        assert_eq!(
            classification,
            RuleClassification {
                mentions_options: true,
                mentions_schema: true,
                is_function_rule: false,
                is_object_rule: true,
            }
        );
        assert!(!classification.mentions_options_without_schema());
    }

    #[test]
    fn test_function_rule_with_options_but_no_schema() {
        let content = r#"
module.exports = function(context) {
  var max = context.options[0];
  return { Identifier: function(node) {} };
};
"#;
        let classification = RuleClassifier::new().classify(content);
        assert!(classification.is_function_rule);
        assert!(!classification.is_object_rule);
        assert!(classification.mentions_options_without_schema());
    }

    #[test]
    fn test_categories_are_not_exclusive() {
        let content = "module.exports = function(context) {};\nmodule.exports.meta = { docs: {} };";
        let classification = RuleClassifier::new().classify(content);
        assert!(classification.is_function_rule);
        assert!(classification.is_object_rule);
    }

    #[test]
    fn test_unknown_style_matches_neither() {
        let classification =
            RuleClassifier::new().classify("const x = require('./x');\nexports.rule = x;");
        assert!(!classification.is_function_rule);
        assert!(!classification.is_object_rule);
    }

    #[test]
    fn test_typescript_helper_is_object_rule() {
        let content = "export default util.createRule({ name: 'no-foo', meta: {} });";
        assert!(RuleClassifier::new().classify(content).is_object_rule);
    }

    #[test]
    fn test_plugin_specific_marker_carries_origin() {
        let markers = MarkerSet::object_rule_defaults();
        let marker = markers
            .first_match("module.exports = wrapCoreRule('indent');")
            .unwrap();
        assert_eq!(marker.origin.as_deref(), Some("eslint-plugin-mpx"));
    }

    #[test]
    fn test_markers_can_be_extended() {
        let mut markers = MarkerSet::object_rule_defaults();
        markers.push(Marker::from_plugin("module.exports = ruleFactory(", "eslint-plugin-example"));
        let classifier = RuleClassifier::new().with_object_markers(markers);
        assert!(classifier.classify("module.exports = ruleFactory('x');").is_object_rule);
        assert!(
            !RuleClassifier::new()
                .classify("module.exports = ruleFactory('x');")
                .is_object_rule
        );
    }

    #[test]
    fn test_extended_classifier_keeps_defaults() {
        let classifier = RuleClassifier::extended(&["exports.rule = ".to_string()], &[]);
        assert!(classifier.classify("exports.rule = (ctx) => ({});").is_function_rule);
        assert!(classifier.classify("module.exports = function(context) {}").is_function_rule);
        assert!(classifier.classify("module.exports = { meta: {} }").is_object_rule);
    }

    #[test]
    fn test_object_match_reports_helper_marker() {
        let classifier = RuleClassifier::new();
        let (classification, marker) = classifier
            .classify_with_object_marker("module.exports = utils.createUtilMethodRule('each');");
        assert!(classification.is_object_rule);
        assert_eq!(
            marker.and_then(|m| m.origin.as_deref()),
            Some("eslint-plugin-no-jquery")
        );

        let (classification, marker) = classifier.classify_with_object_marker("exports.x = 1;");
        assert!(!classification.is_object_rule);
        assert!(marker.is_none());
    }

    #[test]
    fn test_rule_file_filter() {
        for name in ["no-foo.js", "no-bar.ts", "prefer-x.js"] {
            assert!(is_rule_file(name), "{} should be a rule", name);
        }
        for name in [
            "no-foo-test.js", "no-foo.test.ts", "types.d.ts", "index.js", "utils.ts",
            "util.js", "README.md", "no-foo.jsx", "index.ts",
        ] {
            assert!(!is_rule_file(name), "{} should not be a rule", name);
        }
    }

    #[test]
    fn test_rules_dir_priority() {
        let repo = TempDir::new().unwrap();
        fs::create_dir_all(repo.path().join("rules")).unwrap();
        assert_eq!(find_rules_dir(repo.path()), Some(repo.path().join("rules")));

        fs::create_dir_all(repo.path().join("src/rules")).unwrap();
        assert_eq!(find_rules_dir(repo.path()), Some(repo.path().join("src/rules")));

        fs::create_dir_all(repo.path().join("lib/rules")).unwrap();
        assert_eq!(find_rules_dir(repo.path()), Some(repo.path().join("lib/rules")));
    }

    #[test]
    fn test_repository_without_rules_dir_has_no_rules() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("index.js"), "module.exports = {};").unwrap();
        assert!(RuleClassifier::new().classify_repository(repo.path()).unwrap().is_empty());
    }

    #[test]
    fn test_classify_repository_skips_subdirectories_and_non_rules() {
        let repo = TempDir::new().unwrap();
        let rules = repo.path().join("lib/rules");
        fs::create_dir_all(rules.join("nested.js")).unwrap();
        fs::write(rules.join("a.js"), "module.exports = { meta: {}, create() {} };").unwrap();
        fs::write(rules.join("b.ts"), "export default (context) => ({});").unwrap();
        fs::write(rules.join("index.js"), "module.exports = {};").unwrap();
        fs::write(rules.join("a.test.js"), "module.exports = {};").unwrap();

        let classified = RuleClassifier::new().classify_repository(repo.path()).unwrap();
        assert_eq!(classified.len(), 2);
        assert!(classified[0].is_object_rule);
        assert!(classified[1].is_function_rule);
    }

    #[test]
    fn test_non_utf8_content_is_read_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rule.js");
        let mut bytes = b"module.exports = { meta: {} }; // ".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        fs::write(&path, bytes).unwrap();
        assert!(RuleClassifier::new().classify_file(&path).unwrap().is_object_rule);
    }
}
