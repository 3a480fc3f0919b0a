//! Site reconciliation.
//!
//! For every device of a resource type, compare the authoritative site with
//! the value mirrored into an extension attribute and push an update when
//! they differ. A failing record is reported and skipped; only a failure to
//! list the resource aborts the run.

use tracing::{debug, info, warn};

use crate::api::{JamfClient, Result, UpdatableResource};
use crate::models::{DeviceDetail, ListEntry};
use crate::xml::site_update_document;

/// Extension attribute that mirrors the device's site.
pub const DEFAULT_SITE_ATTRIBUTE: &str = "Jamf Site";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Updated,
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Result of reconciling one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    pub id: String,
    pub name: String,
    /// Authoritative site, if the detail fetch got that far.
    pub site: Option<String>,
    pub outcome: Outcome,
}

/// Outcome counts for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub unchanged: usize,
    pub updated: usize,
    pub failed: usize,
}

impl Tally {
    pub fn from_reports(reports: &[RecordReport]) -> Self {
        reports.iter().fold(Self::default(), |mut tally, report| {
            match report.outcome {
                Outcome::Unchanged => tally.unchanged += 1,
                Outcome::Updated => tally.updated += 1,
                Outcome::Failed(_) => tally.failed += 1,
            }
            tally
        })
    }

    pub fn total(&self) -> usize {
        self.unchanged + self.updated + self.failed
    }
}

/// Reconcile every record of `R`, in list order.
///
/// `on_record(index, count, report)` is called after each record with a
/// zero-based index.
pub async fn reconcile<R>(
    client: &mut JamfClient,
    attribute: &str,
    on_record: impl FnMut(usize, usize, &RecordReport),
) -> Result<Vec<RecordReport>>
where
    R: UpdatableResource<Entry = ListEntry, Detail = DeviceDetail>,
{
    let entries = client.list_all::<R>().await?;
    Ok(reconcile_entries::<R>(client, attribute, entries, on_record).await)
}

/// Reconcile already-listed entries of `R`, in order. Per-record failures are
/// reported, never returned.
pub async fn reconcile_entries<R>(
    client: &mut JamfClient,
    attribute: &str,
    entries: Vec<ListEntry>,
    mut on_record: impl FnMut(usize, usize, &RecordReport),
) -> Vec<RecordReport>
where
    R: UpdatableResource<Entry = ListEntry, Detail = DeviceDetail>,
{
    let count = entries.len();
    info!(resource = R::LABEL, count, "Found records");

    let mut reports = Vec::with_capacity(count);
    for (index, entry) in entries.into_iter().enumerate() {
        let report = reconcile_one::<R>(client, attribute, entry).await;
        on_record(index, count, &report);
        reports.push(report);
    }

    let tally = Tally::from_reports(&reports);
    info!(
        resource = R::LABEL,
        unchanged = tally.unchanged,
        updated = tally.updated,
        failed = tally.failed,
        "Reconciliation finished"
    );
    reports
}

async fn reconcile_one<R>(client: &mut JamfClient, attribute: &str, entry: ListEntry) -> RecordReport
where
    R: UpdatableResource<Entry = ListEntry, Detail = DeviceDetail>,
{
    let detail = match client.get_one::<R>(&entry.id).await {
        Ok(detail) => detail,
        Err(e) => {
            warn!(id = %entry.id, error = %e, "Failed to fetch record");
            return RecordReport {
                id: entry.id,
                name: entry.name,
                site: None,
                outcome: Outcome::Failed(e.to_string()),
            };
        }
    };

    let record = detail.to_record(attribute);
    let outcome = if record.is_in_sync() {
        debug!(id = %entry.id, site = %record.site_name, "Already in sync");
        Outcome::Unchanged
    } else {
        let body = site_update_document(R::ROOT_TAG, attribute, &record.site_name);
        match client.update_one::<R>(&entry.id, body).await {
            Ok(()) => {
                debug!(
                    id = %entry.id,
                    from = %record.ext_attribute_value,
                    to = %record.site_name,
                    "Updated site attribute"
                );
                Outcome::Updated
            }
            Err(e) => {
                warn!(id = %entry.id, error = %e, "Failed to update record");
                Outcome::Failed(e.to_string())
            }
        }
    };

    RecordReport {
        id: entry.id,
        name: record.name,
        site: Some(record.site_name),
        outcome,
    }
}
