//! Per-invocation batch bookkeeping.

use std::time::Duration;

use culinaria_core::school::School;
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
  Processed,
  Skipped,
  Failed,
}

/// What a batch item refers to.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
  pub school_id: String,
  pub name:      String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category:  Option<String>,
}

impl Item {
  pub fn of(school: &School) -> Self {
    Self { school_id: school.public_id(), name: school.name().to_owned(), category: None }
  }

  /// An item whose school could not be resolved.
  pub fn unresolved(ident: &str) -> Self {
    Self { school_id: ident.to_owned(), name: String::new(), category: None }
  }

  pub fn category(mut self, category: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
  #[serde(flatten)]
  pub item:   Item,
  pub status: ItemStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
}

/// `{processed, skipped, errors, total, items}` returned by every batch
/// function.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
  pub processed: usize,
  pub skipped:   usize,
  pub errors:    usize,
  pub total:     usize,
  pub items:     Vec<ItemOutcome>,
  #[serde(skip)]
  limit:         Option<usize>,
  #[serde(skip)]
  claimed:       usize,
}

impl BatchSummary {
  pub fn new(total: usize) -> Self { Self { total, ..Default::default() } }

  /// Cap the number of items that get work; skipped items do not count.
  pub fn with_limit(mut self, limit: Option<usize>) -> Self {
    self.limit = limit;
    self
  }

  /// Claim one unit of work. Returns `false` once the limit is spent, after
  /// which `total` only covers the items already reported.
  pub fn claim(&mut self) -> bool {
    if self.limit.is_some_and(|limit| self.claimed >= limit) {
      self.total = self.items.len();
      return false;
    }
    self.claimed += 1;
    true
  }

  pub fn processed(&mut self, item: Item, detail: Option<String>) {
    self.processed += 1;
    self.items.push(ItemOutcome { item, status: ItemStatus::Processed, detail });
  }

  pub fn skipped(&mut self, item: Item, reason: &str) {
    self.skipped += 1;
    self.items.push(ItemOutcome {
      item,
      status: ItemStatus::Skipped,
      detail: Some(reason.to_owned()),
    });
  }

  pub fn failed(&mut self, item: Item, err: &Error) {
    tracing::warn!(school = %item.school_id, category = ?item.category, error = %err, "batch item failed");
    self.errors += 1;
    self.items.push(ItemOutcome {
      item,
      status: ItemStatus::Failed,
      detail: Some(err.to_string()),
    });
  }

  pub fn log(&self, function: &str) {
    tracing::info!(
      function,
      processed = self.processed,
      skipped = self.skipped,
      errors = self.errors,
      total = self.total,
      "batch finished"
    );
  }
}

/// Sleeps a fixed delay before every call except the first.
#[derive(Debug)]
pub struct Throttle {
  delay:   Duration,
  started: bool,
}

impl Throttle {
  pub fn new(delay: Duration) -> Self { Self { delay, started: false } }

  pub async fn wait(&mut self) {
    if self.started && !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    self.started = true;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_follow_outcomes() {
    let mut s = BatchSummary::new(3);
    s.processed(Item::unresolved("1"), None);
    s.skipped(Item::unresolved("2"), "already translated");
    s.failed(Item::unresolved("3").category("kitchen"), &Error::NotFound("3".into()));

    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["processed"], 1);
    assert_eq!(v["skipped"], 1);
    assert_eq!(v["errors"], 1);
    assert_eq!(v["total"], 3);
    assert_eq!(v["items"][2]["status"], "failed");
    assert_eq!(v["items"][2]["category"], "kitchen");
    assert!(v["items"][0].get("detail").is_none());
  }

  #[test]
  fn limit_counts_claimed_work_only() {
    let mut s = BatchSummary::new(5).with_limit(Some(1));
    s.skipped(Item::unresolved("1"), "already translated");
    assert!(s.claim());
    s.processed(Item::unresolved("2"), None);
    assert!(!s.claim());
    assert_eq!(s.total, 2);

    let mut unlimited = BatchSummary::new(2);
    assert!(unlimited.claim() && unlimited.claim() && unlimited.claim());
  }

  #[tokio::test]
  async fn throttle_skips_the_first_wait() {
    let delay = Duration::from_millis(30);
    let mut t = Throttle::new(delay);
    let start = tokio::time::Instant::now();
    t.wait().await;
    assert!(start.elapsed() < delay);
    t.wait().await;
    assert!(start.elapsed() >= delay);
  }
}
