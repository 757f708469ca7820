use serde::{Deserialize, Serialize};

/// Matcher configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Surface failed assertions as errors instead of evaluating them to `false`.
    pub strict_assertions: bool,
    /// Fail on an against-side atom the comparator does not accept, instead of
    /// logging it and treating the pair as a match.
    pub strict_atom_types: bool,
}
