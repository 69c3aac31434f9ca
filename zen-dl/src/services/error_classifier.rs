//! Maps extractor stderr to a user-facing message
//!
//! The extractor has no structured error contract. Rules are matched as
//! case-insensitive substrings, in order; the first hit wins and unmatched
//! output falls back to a generic message.

use zen_common::config::ClassifierRuleConfig;

pub const MSG_AGE_RESTRICTED: &str = "This video is age restricted. Please choose a different link.";
pub const MSG_PRIVATE: &str = "This video is private. Please use a public video URL.";
pub const MSG_LIVE: &str = "Live streams cannot be downloaded. Please wait until the stream ends.";
pub const MSG_BLOCKED: &str = "This video is blocked or restricted in your region.";
pub const MSG_GENERIC: &str = "Unable to process this video right now. Please try again later.";

/// One classification rule: any phrase found in stderr selects `message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Lowercased phrases
    phrases: Vec<String>,
    message: String,
}

impl ClassificationRule {
    pub fn new<I, S>(phrases: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            message: message.into(),
        }
    }

    fn matches(&self, normalized: &str) -> bool {
        self.phrases.iter().any(|p| normalized.contains(p.as_str()))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&ClassifierRuleConfig> for ClassificationRule {
    fn from(config: &ClassifierRuleConfig) -> Self {
        Self::new(&config.phrases, config.message.clone())
    }
}

/// Ordered rule list with a catch-all fallback
#[derive(Debug, Clone)]
pub struct StderrClassifier {
    rules: Vec<ClassificationRule>,
    fallback: String,
}

impl Default for StderrClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassificationRule::new(["sign in to confirm", "age-restricted"], MSG_AGE_RESTRICTED),
                ClassificationRule::new(["private video"], MSG_PRIVATE),
                ClassificationRule::new(["live stream", "is live"], MSG_LIVE),
                ClassificationRule::new(["copyright", "blocked"], MSG_BLOCKED),
            ],
            fallback: MSG_GENERIC.to_string(),
        }
    }
}

impl StderrClassifier {
    /// Built-in rules followed by `extra` rules from configuration
    pub fn with_extra_rules<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = ClassificationRule>,
    {
        let mut classifier = Self::default();
        classifier.rules.extend(extra);
        classifier
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Pick the message for `stderr`. Never fails, whatever the input.
    pub fn classify(&self, stderr: &str) -> &str {
        if stderr.trim().is_empty() {
            return &self.fallback;
        }

        let normalized = stderr.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.message())
            .unwrap_or(self.fallback.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_phrases() {
        let c = StderrClassifier::default();
        assert_eq!(
            c.classify("ERROR: [youtube] abc: Sign in to confirm your age"),
            MSG_AGE_RESTRICTED
        );
        assert_eq!(c.classify("This video is Age-Restricted"), MSG_AGE_RESTRICTED);
        assert_eq!(c.classify("ERROR: [youtube] abc: PRIVATE VIDEO"), MSG_PRIVATE);
        assert_eq!(c.classify("ERROR: this live stream will begin in 5 minutes"), MSG_LIVE);
        assert_eq!(c.classify("ERROR: abc is live"), MSG_LIVE);
        assert_eq!(c.classify("Video unavailable: blocked on copyright grounds"), MSG_BLOCKED);
    }

    #[test]
    fn test_first_rule_wins() {
        let c = StderrClassifier::default();
        // Contains both "private video" and "blocked"; private is listed first
        assert_eq!(c.classify("private video, also blocked"), MSG_PRIVATE);
    }

    #[test]
    fn test_fallback() {
        let c = StderrClassifier::default();
        assert_eq!(c.classify(""), MSG_GENERIC);
        assert_eq!(c.classify("   \n"), MSG_GENERIC);
        assert_eq!(c.classify("HTTP Error 503: Service Unavailable"), MSG_GENERIC);
    }

    #[test]
    fn test_arbitrary_input_does_not_panic() {
        let c = StderrClassifier::default();
        let noisy = "\u{fffd}\u{0}ß\u{130}ERROR ".repeat(10_000);
        assert_eq!(c.classify(&noisy), MSG_GENERIC);
    }

    #[test]
    fn test_extra_rules_after_builtins() {
        let c = StderrClassifier::with_extra_rules([
            ClassificationRule::new(["Members-Only"], "Members only."),
            ClassificationRule::new(["blocked"], "never reached"),
        ]);
        assert_eq!(c.rules().len(), 6);
        assert_eq!(c.classify("Join this channel: members-only content"), "Members only.");
        assert_eq!(c.classify("blocked"), MSG_BLOCKED);
    }

    #[test]
    fn test_blank_phrases_are_dropped() {
        let rule = ClassificationRule::new(["", "  "], "never");
        let c = StderrClassifier::with_extra_rules([rule]);
        assert_eq!(c.classify("anything"), MSG_GENERIC);
    }

    #[test]
    fn test_from_config() {
        let config = ClassifierRuleConfig {
            phrases: vec!["Premieres In".to_string()],
            message: "Not premiered yet.".to_string(),
        };
        let c = StderrClassifier::with_extra_rules([ClassificationRule::from(&config)]);
        assert_eq!(c.classify("this video premieres in 2 hours"), "Not premiered yet.");
    }
}
