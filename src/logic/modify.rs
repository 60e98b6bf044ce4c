use log::debug;

use crate::error::{BrokerError, Result};
use crate::model::{InstanceRecord, Plan, UpdateOptions};

/// Apply `options` and `plan` onto `instance`.
///
/// Every field is decided on its own. A rejected field does not stop the
/// remaining fields from being applied, and nothing applied in this pass is
/// rolled back; the first rejection is returned once all fields have been
/// visited.
pub fn modify(instance: &mut InstanceRecord, options: &UpdateOptions, plan: &Plan) -> Result<()> {
    let mut first_error = None;

    if let Err(err) = apply_storage(instance, options.allocated_storage) {
        first_error.get_or_insert(err);
    }

    if options.backup_retention_period != 0 {
        instance.backup_retention_period = options.backup_retention_period;
    }

    if !options.binary_log_format.is_empty() {
        instance.binary_log_format = options.binary_log_format.clone();
    }

    if let Some(enable_pg_cron) = options.enable_pg_cron {
        instance.enable_pg_cron = enable_pg_cron;
    }

    if !plan.db_version.is_empty() {
        instance.db_version = plan.db_version.clone();
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn apply_storage(instance: &mut InstanceRecord, requested: u32) -> Result<()> {
    if requested == 0 {
        return Ok(());
    }
    if requested < instance.allocated_storage {
        debug!(
            "rejecting storage change for {}: {} < {}",
            instance.database, requested, instance.allocated_storage
        );
        return Err(BrokerError::StorageDecrease {
            requested,
            current: instance.allocated_storage,
        });
    }
    instance.allocated_storage = requested;
    Ok(())
}
