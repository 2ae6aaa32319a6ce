use serde::{Deserialize, Serialize};

/// A filter rule held by the upstream stream service.
///
/// `value` is the query expression, `tag` a human label. `id` is
/// assigned upstream when the rule is created: rules read back from the
/// rules endpoint carry it, rules submitted for addition do not (it is
/// omitted from serialized payloads when absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub value: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Rule {
    /// A rule as configured locally, before upstream has assigned an id.
    pub fn new(value: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag: tag.into(),
            id: None,
        }
    }
}
