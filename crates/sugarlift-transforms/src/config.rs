//! Transform settings.
//!
//! The target language version decides which rewrites produce valid syntax;
//! individual rules can additionally be enabled or disabled.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};

/// C# language version presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageVersion {
    CSharp1,
    CSharp2,
    CSharp3,
    CSharp4,
    CSharp5,
    /// Interpolated strings.
    CSharp6,
    CSharp7,
    CSharp8,
    CSharp9,
    CSharp10,
    /// Unsigned right shift (`>>>`).
    CSharp11,
    #[default]
    Latest,
}

impl LanguageVersion {
    /// Parses a language version from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        let digits = lower
            .trim_start_matches("csharp")
            .trim_start_matches("cs")
            .trim_start_matches('c');
        match digits {
            "latest" | "preview" => Some(Self::Latest),
            "1" => Some(Self::CSharp1),
            "2" => Some(Self::CSharp2),
            "3" => Some(Self::CSharp3),
            "4" => Some(Self::CSharp4),
            "5" => Some(Self::CSharp5),
            "6" => Some(Self::CSharp6),
            "7" => Some(Self::CSharp7),
            "8" => Some(Self::CSharp8),
            "9" => Some(Self::CSharp9),
            "10" => Some(Self::CSharp10),
            "11" => Some(Self::CSharp11),
            _ => None,
        }
    }
}

impl FromStr for LanguageVersion {
    type Err = TransformError;

    fn from_str(s: &str) -> TransformResult<Self> {
        Self::parse(s).ok_or_else(|| TransformError::UnknownLanguageVersion(s.to_string()))
    }
}

/// Individual rewrite rules, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteRule {
    /// `string.Concat(a, b, c)` → `a + b + c`.
    StringConcat,
    /// Reflection handle idioms → `typeof`/`ldtoken` forms.
    HandleUnwrapping,
    /// `Activator.CreateInstance<T>()` → `new T()`.
    GenericInstantiation,
    /// `string.Format("{0}", x)` → `$"{x}"`.
    StringInterpolation,
    /// `op_Addition(a, b)` → `a + b`.
    BinaryOperators,
    /// `op_UnaryNegation(a)` → `-a`.
    UnaryOperators,
    /// `op_Explicit(a)` → `(T)a`.
    ExplicitConversion,
    /// `if (op_True(a))` → `if (a)`.
    OperatorTrue,
}

impl RewriteRule {
    /// Returns all rules in dispatch order.
    pub fn all() -> &'static [RewriteRule] {
        use RewriteRule::*;
        &[
            StringConcat,
            HandleUnwrapping,
            GenericInstantiation,
            StringInterpolation,
            BinaryOperators,
            UnaryOperators,
            ExplicitConversion,
            OperatorTrue,
        ]
    }

    /// Returns the name of the rule.
    pub fn name(&self) -> &'static str {
        use RewriteRule::*;
        match self {
            StringConcat => "string-concat",
            HandleUnwrapping => "handle-unwrapping",
            GenericInstantiation => "generic-instantiation",
            StringInterpolation => "string-interpolation",
            BinaryOperators => "binary-operators",
            UnaryOperators => "unary-operators",
            ExplicitConversion => "explicit-conversion",
            OperatorTrue => "operator-true",
        }
    }

    /// Returns a description of the rule.
    pub fn description(&self) -> &'static str {
        use RewriteRule::*;
        match self {
            StringConcat => "Fold string.Concat calls into + chains",
            HandleUnwrapping => "Unwrap GetTypeFromHandle/GetFieldFromHandle/GetMethodFromHandle",
            GenericInstantiation => "Turn Activator.CreateInstance<T>() into new T()",
            StringInterpolation => "Turn string.Format calls into interpolated strings",
            BinaryOperators => "Turn user-defined binary operator calls into operators",
            UnaryOperators => "Turn user-defined unary operator calls into operators",
            ExplicitConversion => "Turn op_Explicit calls into casts",
            OperatorTrue => "Drop op_True calls in conditions",
        }
    }

    /// Parses a rule name.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.to_lowercase().replace('_', "-");
        Self::all().iter().copied().find(|r| r.name() == normalized)
    }

    /// Lowest language version whose syntax the rule's output needs.
    pub fn minimum_version(&self) -> LanguageVersion {
        match self {
            Self::StringInterpolation => LanguageVersion::CSharp6,
            Self::GenericInstantiation => LanguageVersion::CSharp2,
            _ => LanguageVersion::CSharp1,
        }
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RewriteRule {
    type Err = TransformError;

    fn from_str(s: &str) -> TransformResult<Self> {
        Self::from_name(s).ok_or_else(|| TransformError::UnknownRule(s.to_string()))
    }
}

/// Settings for the operator recovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Target language version.
    pub language_version: LanguageVersion,
    /// Explicitly enabled rules (override the version defaults).
    pub enabled_rules: HashSet<RewriteRule>,
    /// Explicitly disabled rules (override the version defaults).
    pub disabled_rules: HashSet<RewriteRule>,
    /// Spell built-in types with keywords (`int`) instead of names (`Int32`).
    pub use_keywords: bool,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            language_version: LanguageVersion::Latest,
            enabled_rules: HashSet::new(),
            disabled_rules: HashSet::new(),
            use_keywords: true,
        }
    }
}

impl TransformSettings {
    /// Creates settings targeting the given language version.
    pub fn new(language_version: LanguageVersion) -> Self {
        Self {
            language_version,
            ..Self::default()
        }
    }

    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> TransformResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses settings from a JSON string.
    pub fn from_json(content: &str) -> TransformResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Explicitly enables a rule.
    pub fn enable_rule(mut self, rule: RewriteRule) -> Self {
        self.enabled_rules.insert(rule);
        self.disabled_rules.remove(&rule);
        self
    }

    /// Explicitly disables a rule.
    pub fn disable_rule(mut self, rule: RewriteRule) -> Self {
        self.disabled_rules.insert(rule);
        self.enabled_rules.remove(&rule);
        self
    }

    /// Checks if a rule is enabled.
    pub fn is_rule_enabled(&self, rule: RewriteRule) -> bool {
        if self.enabled_rules.contains(&rule) {
            return true;
        }
        if self.disabled_rules.contains(&rule) {
            return false;
        }
        self.language_version >= rule.minimum_version()
    }

    /// Whether `string.Format` calls may become interpolated strings.
    pub fn string_interpolation(&self) -> bool {
        self.is_rule_enabled(RewriteRule::StringInterpolation)
            && self.language_version >= LanguageVersion::CSharp6
    }

    /// Whether `>>>` may be emitted.
    pub fn unsigned_right_shift(&self) -> bool {
        self.language_version >= LanguageVersion::CSharp11
    }

    /// Lists all rules with their enabled status.
    pub fn list_rules(&self) -> Vec<(RewriteRule, bool, &'static str)> {
        RewriteRule::all()
            .iter()
            .map(|&r| (r, self.is_rule_enabled(r), r.description()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_version_parse() {
        assert_eq!(LanguageVersion::parse("latest"), Some(LanguageVersion::Latest));
        assert_eq!(LanguageVersion::parse("6"), Some(LanguageVersion::CSharp6));
        assert_eq!(LanguageVersion::parse("CSharp5"), Some(LanguageVersion::CSharp5));
        assert_eq!(LanguageVersion::parse("cs11"), Some(LanguageVersion::CSharp11));
        assert_eq!(LanguageVersion::parse("c7"), Some(LanguageVersion::CSharp7));
        assert_eq!(LanguageVersion::parse("invalid"), None);
        assert!("twelve".parse::<LanguageVersion>().is_err());
    }

    #[test]
    fn test_settings_default() {
        let settings = TransformSettings::default();
        assert_eq!(settings.language_version, LanguageVersion::Latest);
        for rule in RewriteRule::all() {
            assert!(
                settings.is_rule_enabled(*rule),
                "Rule {:?} should be enabled by default",
                rule
            );
        }
        assert!(settings.string_interpolation());
    }

    #[test]
    fn test_interpolation_needs_csharp6() {
        assert!(!TransformSettings::new(LanguageVersion::CSharp5).string_interpolation());
        assert!(TransformSettings::new(LanguageVersion::CSharp6).string_interpolation());
        // Forcing the rule on cannot produce syntax the target version lacks.
        assert!(!TransformSettings::new(LanguageVersion::CSharp5)
            .enable_rule(RewriteRule::StringInterpolation)
            .string_interpolation());
        assert!(!TransformSettings::default()
            .disable_rule(RewriteRule::StringInterpolation)
            .string_interpolation());
    }

    #[test]
    fn test_explicit_disable() {
        let settings = TransformSettings::default().disable_rule(RewriteRule::BinaryOperators);
        assert!(!settings.is_rule_enabled(RewriteRule::BinaryOperators));
        assert!(settings.is_rule_enabled(RewriteRule::UnaryOperators));
        let settings = settings.enable_rule(RewriteRule::BinaryOperators);
        assert!(settings.is_rule_enabled(RewriteRule::BinaryOperators));
    }

    #[test]
    fn test_rule_names_round_trip() {
        for rule in RewriteRule::all() {
            assert_eq!(RewriteRule::from_name(rule.name()), Some(*rule));
        }
        assert_eq!(
            RewriteRule::from_name("STRING_CONCAT"),
            Some(RewriteRule::StringConcat)
        );
        assert!(matches!(
            "bogus".parse::<RewriteRule>(),
            Err(TransformError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let settings = TransformSettings::from_json(
            r#"{ "language_version": "csharp5", "disabled_rules": ["operator-true"] }"#,
        )
        .unwrap();
        assert_eq!(settings.language_version, LanguageVersion::CSharp5);
        assert!(!settings.is_rule_enabled(RewriteRule::OperatorTrue));
        assert!(!settings.string_interpolation());
        assert!(settings.use_keywords);

        assert!(matches!(
            TransformSettings::from_json("{ \"language_version\": 3 }"),
            Err(TransformError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "use_keywords": false }"#).unwrap();
        let settings = TransformSettings::from_json_file(&path).unwrap();
        assert!(!settings.use_keywords);

        let missing = TransformSettings::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(TransformError::Io { .. })));
    }
}
