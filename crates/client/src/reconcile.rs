//! Startup reconciliation of the upstream rule set.

use tracing::{info, warn};

use filterfeed_core::Rule;

use crate::error::FeedError;
use crate::rules::RuleStore;

/// Bring the upstream rule set in line with the configured one.
///
/// Whether existing rules are dropped first is never decided here: the
/// caller passes `delete_existing` explicitly. The desired rules are
/// added on either branch, so repeated runs without the delete flag
/// accumulate duplicates upstream.
///
/// Any upstream failure aborts the run; streaming never starts on a
/// possibly-stale rule set.
pub async fn reconcile(
    store: &dyn RuleStore,
    desired: &[Rule],
    delete_existing: bool,
) -> Result<(), FeedError> {
    let existing = store.list_rules().await?;
    info!(count = existing.len(), rules = ?existing, "found existing rules on the stream");

    if delete_existing {
        store.delete_rules(&existing).await?;
        warn!("deleted all existing rules");
    } else {
        warn!("keeping existing rules and adding new ones; rerun with --delete to clear them first");
    }

    store.add_rules(desired).await?;
    info!(count = desired.len(), "submitted configured rules");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        List,
        Add(usize),
        Delete(usize),
    }

    struct MockStore {
        existing: Vec<Rule>,
        fail_list: Option<(u16, String)>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockStore {
        fn with_existing(existing: Vec<Rule>) -> Self {
            Self {
                existing,
                fail_list: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RuleStore for MockStore {
        async fn list_rules(&self) -> Result<Vec<Rule>, FeedError> {
            self.calls.lock().unwrap().push(Call::List);
            if let Some((status, body)) = &self.fail_list {
                return Err(FeedError::Upstream {
                    status: *status,
                    body: body.clone(),
                });
            }
            Ok(self.existing.clone())
        }

        async fn add_rules(&self, rules: &[Rule]) -> Result<(), FeedError> {
            self.calls.lock().unwrap().push(Call::Add(rules.len()));
            Ok(())
        }

        async fn delete_rules(&self, rules: &[Rule]) -> Result<(), FeedError> {
            self.calls.lock().unwrap().push(Call::Delete(rules.len()));
            Ok(())
        }
    }

    fn listed_rule(id: &str) -> Rule {
        Rule {
            value: "old".into(),
            tag: "old".into(),
            id: Some(id.into()),
        }
    }

    #[tokio::test]
    async fn delete_branch_deletes_then_adds() {
        let store = MockStore::with_existing(vec![listed_rule("1"), listed_rule("2")]);
        let desired = vec![Rule::new("new", "new")];

        reconcile(&store, &desired, true).await.unwrap();

        let calls = store.calls.lock().unwrap();
        assert_eq!(*calls, vec![Call::List, Call::Delete(2), Call::Add(1)]);
    }

    #[tokio::test]
    async fn keep_branch_only_adds() {
        let store = MockStore::with_existing(vec![listed_rule("1")]);
        let desired = vec![Rule::new("new", "new")];

        reconcile(&store, &desired, false).await.unwrap();

        let calls = store.calls.lock().unwrap();
        assert_eq!(*calls, vec![Call::List, Call::Add(1)]);
    }

    #[tokio::test]
    async fn list_failure_aborts_before_any_mutation() {
        let mut store = MockStore::with_existing(vec![]);
        store.fail_list = Some((403, "forbidden".into()));

        let err = reconcile(&store, &[Rule::new("new", "new")], true)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Upstream { status: 403, .. }));

        let calls = store.calls.lock().unwrap();
        assert_eq!(*calls, vec![Call::List]);
    }

    #[tokio::test]
    async fn desired_rules_are_added_even_when_empty_existing() {
        let store = MockStore::with_existing(vec![]);
        reconcile(&store, &[Rule::new("a", "a"), Rule::new("b", "b")], false)
            .await
            .unwrap();
        let calls = store.calls.lock().unwrap();
        assert_eq!(*calls, vec![Call::List, Call::Add(2)]);
    }
}
