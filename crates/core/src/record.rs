use serde::{Deserialize, Serialize};

/// The payload unit emitted for every matching event.
///
/// Deliberately a projection of the much larger upstream object: only
/// `id` and `text` are kept, everything else is dropped at the parse
/// boundary (data minimization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub id: String,
    pub text: String,
}
