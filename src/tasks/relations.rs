//! Relationship kinds between tasks and their perspective flip.
//!
//! A link is recorded from its source task. Reading it from the target task
//! requires flipping the kind: "A blocks B" is "B is blocked by A".

use serde::{Deserialize, Serialize};

/// The kind of a directed link between two tasks.
///
/// Values the service sends that this crate does not know are kept as
/// [`RelationshipType::Unknown`] so that rendering survives schema drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Source blocks target.
    Blocks,
    /// Source is blocked by target.
    IsBlockedBy,
    /// Source was split into target.
    SplitsTo,
    /// Source was split out of target.
    SplitsFrom,
    /// Source duplicates target.
    Duplicates,
    /// Source is duplicated by target.
    IsDuplicatedBy,
    /// Generic, undirected relation.
    RelatesTo,
    /// A kind outside the known set, kept verbatim.
    Unknown(String),
}

impl RelationshipType {
    /// Every known kind.
    pub const ALL: [Self; 7] = [
        Self::Blocks,
        Self::IsBlockedBy,
        Self::SplitsTo,
        Self::SplitsFrom,
        Self::Duplicates,
        Self::IsDuplicatedBy,
        Self::RelatesTo,
    ];

    /// The kind as read from the opposite end of the link.
    ///
    /// `RelatesTo` is its own flip. Unknown kinds come back unchanged and
    /// are logged, since they indicate the service and client disagree.
    #[must_use]
    pub fn flip(&self) -> Self {
        match self {
            Self::Blocks => Self::IsBlockedBy,
            Self::IsBlockedBy => Self::Blocks,
            Self::SplitsTo => Self::SplitsFrom,
            Self::SplitsFrom => Self::SplitsTo,
            Self::Duplicates => Self::IsDuplicatedBy,
            Self::IsDuplicatedBy => Self::Duplicates,
            Self::RelatesTo => Self::RelatesTo,
            Self::Unknown(raw) => {
                tracing::warn!(kind = %raw, "cannot flip unknown relationship type");
                self.clone()
            }
        }
    }

    /// Whether this is one of the blocking kinds, which win over a generic
    /// relation when both connect the same pair of tasks.
    #[must_use]
    pub const fn is_specific(&self) -> bool {
        matches!(self, Self::Blocks | Self::IsBlockedBy)
    }

    /// Whether this is the generic `RelatesTo` kind.
    #[must_use]
    pub const fn is_generic(&self) -> bool {
        matches!(self, Self::RelatesTo)
    }

    /// Whether this kind is one of the seven known kinds.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Blocks => "BLOCKS",
            Self::IsBlockedBy => "IS_BLOCKED_BY",
            Self::SplitsTo => "SPLITS_TO",
            Self::SplitsFrom => "SPLITS_FROM",
            Self::Duplicates => "DUPLICATES",
            Self::IsDuplicatedBy => "IS_DUPLICATED_BY",
            Self::RelatesTo => "RELATES_TO",
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable label, e.g. "is blocked by".
    #[must_use]
    pub fn label(&self) -> String {
        self.as_str().to_ascii_lowercase().replace('_', " ")
    }

    /// Parse a kind from user input such as `blocks` or `is-blocked-by`.
    /// Unrecognized input becomes `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self::from(s.trim().to_ascii_uppercase().replace(['-', ' '], "_"))
    }
}

impl From<String> for RelationshipType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "BLOCKS" => Self::Blocks,
            "IS_BLOCKED_BY" => Self::IsBlockedBy,
            "SPLITS_TO" => Self::SplitsTo,
            "SPLITS_FROM" => Self::SplitsFrom,
            "DUPLICATES" => Self::Duplicates,
            "IS_DUPLICATED_BY" => Self::IsDuplicatedBy,
            "RELATES_TO" => Self::RelatesTo,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<RelationshipType> for String {
    fn from(kind: RelationshipType) -> Self {
        match kind {
            RelationshipType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_flip_pairs() {
        assert_eq!(RelationshipType::Blocks.flip(), RelationshipType::IsBlockedBy);
        assert_eq!(RelationshipType::IsBlockedBy.flip(), RelationshipType::Blocks);
        assert_eq!(RelationshipType::SplitsTo.flip(), RelationshipType::SplitsFrom);
        assert_eq!(RelationshipType::SplitsFrom.flip(), RelationshipType::SplitsTo);
        assert_eq!(RelationshipType::Duplicates.flip(), RelationshipType::IsDuplicatedBy);
        assert_eq!(RelationshipType::IsDuplicatedBy.flip(), RelationshipType::Duplicates);
    }

    #[test]
    fn test_relates_to_is_fixed_point() {
        assert_eq!(RelationshipType::RelatesTo.flip(), RelationshipType::RelatesTo);
    }

    #[test]
    fn test_unknown_flip_is_noop() {
        let kind = RelationshipType::Unknown("SUPERSEDES".to_string());
        assert_eq!(kind.flip(), kind);
    }

    #[test]
    fn test_only_relates_to_is_self_symmetric() {
        let fixed: Vec<_> = RelationshipType::ALL.iter().filter(|k| k.flip() == **k).collect();
        assert_eq!(fixed, vec![&RelationshipType::RelatesTo]);
    }

    #[test]
    fn test_deserialize_known_and_unknown() {
        let kind: RelationshipType = serde_json::from_str("\"SPLITS_FROM\"").unwrap();
        assert_eq!(kind, RelationshipType::SplitsFrom);

        let kind: RelationshipType = serde_json::from_str("\"CLONES\"").unwrap();
        assert_eq!(kind, RelationshipType::Unknown("CLONES".to_string()));
        assert!(!kind.is_known());
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"CLONES\"");
    }

    #[test]
    fn test_serialize_wire_names() {
        assert_eq!(
            serde_json::to_string(&RelationshipType::IsDuplicatedBy).unwrap(),
            "\"IS_DUPLICATED_BY\""
        );
    }

    #[test]
    fn test_parse_user_input() {
        assert_eq!(RelationshipType::parse("blocks"), RelationshipType::Blocks);
        assert_eq!(RelationshipType::parse("is-blocked-by"), RelationshipType::IsBlockedBy);
        assert_eq!(RelationshipType::parse("relates to"), RelationshipType::RelatesTo);
        assert!(!RelationshipType::parse("nope").is_known());
    }

    #[test]
    fn test_label() {
        assert_eq!(RelationshipType::IsBlockedBy.label(), "is blocked by");
        assert_eq!(RelationshipType::SplitsTo.label(), "splits to");
    }

    #[test]
    fn test_specific_and_generic() {
        assert!(RelationshipType::Blocks.is_specific());
        assert!(RelationshipType::IsBlockedBy.is_specific());
        assert!(!RelationshipType::SplitsTo.is_specific());
        assert!(RelationshipType::RelatesTo.is_generic());
        assert!(!RelationshipType::Duplicates.is_generic());
    }

    fn known_kind() -> impl Strategy<Value = RelationshipType> {
        prop::sample::select(RelationshipType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn flip_is_an_involution(kind in known_kind()) {
            prop_assert_eq!(kind.flip().flip(), kind);
        }

        #[test]
        fn flip_survives_wire_round_trip(kind in known_kind()) {
            let json = serde_json::to_string(&kind.flip()).unwrap();
            let parsed: RelationshipType = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed.flip(), kind);
        }

        #[test]
        fn unknown_kinds_never_change(raw in "[A-Z_]{1,20}") {
            let kind = RelationshipType::from(raw);
            if !kind.is_known() {
                prop_assert_eq!(kind.flip(), kind);
            }
        }
    }
}
