//! Cookie and consent banner detection.
//!
//! Consent buttons look exactly like calls to action: same size, same
//! saturated fill, same prominent spot. Only their wording and the markup
//! around them give them away, so three independent signals are checked and
//! any one is enough.

use crate::config::HeuristicConfig;
use crate::types::NodeSnapshot;

/// Which signal classified a node as a consent artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentSignal {
    /// Visible text contains a consent term
    Lexical(String),
    /// The node's markup, id or class names a consent platform
    Identity(String),
    /// An ancestor's id or class names a consent platform
    Ancestry { level: usize, identifier: String },
}

/// Classifier with its word lists lowercased once up front
pub struct ConsentClassifier {
    terms: Vec<String>,
    providers: Vec<String>,
    ancestor_depth: usize,
}

impl ConsentClassifier {
    pub fn new(config: &HeuristicConfig) -> Self {
        Self {
            terms: config.all_consent_terms().filter(|t| !t.is_empty()).collect(),
            providers: config
                .consent_providers
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            ancestor_depth: config.ancestor_depth,
        }
    }

    /// First matching signal, if any
    pub fn classify(&self, node: &NodeSnapshot, text: &str) -> Option<ConsentSignal> {
        let lowered = text.to_lowercase();
        if let Some(term) = self.terms.iter().find(|t| lowered.contains(t.as_str())) {
            return Some(ConsentSignal::Lexical(term.clone()));
        }

        let identity = [&node.markup, &node.id, &node.class_name];
        if let Some(identifier) = self.match_provider(&identity) {
            return Some(ConsentSignal::Identity(identifier));
        }

        node.ancestors
            .iter()
            .take(self.ancestor_depth)
            .enumerate()
            .find_map(|(level, ancestor)| {
                self.match_provider(&[&ancestor.id, &ancestor.class_name])
                    .map(|identifier| ConsentSignal::Ancestry {
                        level: level + 1,
                        identifier,
                    })
            })
    }

    pub fn is_consent_artifact(&self, node: &NodeSnapshot, text: &str) -> bool {
        self.classify(node, text).is_some()
    }

    fn match_provider(&self, fields: &[&String]) -> Option<String> {
        fields.iter().find_map(|field| {
            if field.is_empty() {
                return None;
            }
            let lowered = field.to_lowercase();
            self.providers
                .iter()
                .find(|p| lowered.contains(p.as_str()))
                .cloned()
        })
    }
}
