use log::{debug, error, info};
use serde::Serialize;

use crate::control_plane::{ControlPlane, PageCursor};

/// Outcome of one sweep over the control plane's parameter groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub deleted: Vec<String>,
    /// Still attached to an instance; a later sweep will get them.
    pub in_use: Vec<String>,
    pub failed: Vec<String>,
    /// False when listing the groups stopped early.
    pub complete: bool,
}

/// Delete every parameter group carrying `prefix`.
///
/// The full listing is taken before anything is deleted, so deletes cannot
/// shift later pages. Delete failures never stop the sweep. No state is kept
/// between sweeps.
pub async fn sweep_orphaned_groups<C: ControlPlane + ?Sized>(
    client: &C,
    prefix: &str,
    max_pages: usize,
) -> SweepReport {
    let mut report = SweepReport::default();
    let (candidates, complete) = list_prefixed_groups(client, prefix, max_pages).await;

    for group_name in candidates {
        match client.delete_group(&group_name).await {
            Ok(()) => {
                info!("cleaned up {} parameter group", group_name);
                report.deleted.push(group_name);
            }
            Err(e) if e.is_group_in_use() => {
                debug!("{} parameter group still in use: {}", group_name, e);
                report.in_use.push(group_name);
            }
            Err(e) => {
                error!(
                    "There was an error cleaning up the {} parameter group: {}",
                    group_name, e
                );
                report.failed.push(group_name);
            }
        }
    }

    report.complete = complete;
    report
}

/// Names carrying `prefix` across every page, and whether the listing
/// reached its final page. A failed listing keeps what was already seen.
async fn list_prefixed_groups<C: ControlPlane + ?Sized>(
    client: &C,
    prefix: &str,
    max_pages: usize,
) -> (Vec<String>, bool) {
    let mut names = Vec::new();
    let mut cursor = PageCursor::new(max_pages);

    while cursor.has_more() {
        let page = match client.list_groups(cursor.marker()).await {
            Ok(page) => page,
            Err(e) => {
                error!("Could not retrieve list of parameter groups while cleaning up: {}", e);
                return (names, false);
            }
        };

        names.extend(page.items.into_iter().filter(|name| name.starts_with(prefix)));

        if let Err(e) = cursor.advance(page.marker) {
            error!(
                "gave up listing parameter groups after {} pages while cleaning up",
                e.pages
            );
            return (names, false);
        }
    }

    (names, true)
}
