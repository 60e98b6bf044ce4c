use std::sync::Arc;

use rds_pgroup_core::control_plane::{InMemoryControlPlane, Operation};
use rds_pgroup_core::{
    EngineParameter, EngineType, InstanceRecord, Plan, Reconciler, Settings, UpdateOptions,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup(settings: Settings) -> (Arc<InMemoryControlPlane>, Reconciler<Arc<InMemoryControlPlane>>) {
    init_logging();
    let cp = Arc::new(InMemoryControlPlane::with_page_size(3));
    cp.add_default_engine_version("mysql", "8.0.35", "mysql8.0");
    cp.add_default_engine_version("postgres", "16.3", "postgres16");
    cp.set_engine_defaults(
        "postgres16",
        vec![
            EngineParameter::new("autovacuum", Some("1")),
            EngineParameter::new("log_min_duration_statement", None),
            EngineParameter::new("max_connections", Some("100")),
            EngineParameter::new("random_page_cost", Some("4")),
            EngineParameter::new("shared_preload_libraries", Some("pg_stat_statements")),
        ],
    );
    (cp.clone(), Reconciler::new(cp, settings))
}

#[tokio::test]
async fn test_mysql_create_then_modify_reuses_group() {
    let (cp, reconciler) = setup(Settings::default().with_functions_feature(true));

    let mut instance = InstanceRecord::new(EngineType::Mysql, 10);
    instance.enable_functions = true;

    let created = reconciler
        .create_request(&mut instance, &Plan::default())
        .await
        .expect("create request");
    let group_name = created
        .db_parameter_group_name
        .clone()
        .expect("custom group");
    assert_eq!(group_name, format!("cg-aws-broker-{}", instance.format_db_name()));
    assert_eq!(created.engine_version, None);
    assert_eq!(instance.parameter_group_family, "mysql8.0");

    let group = cp.group(&group_name).unwrap();
    assert_eq!(group.family, "mysql8.0");
    assert_eq!(group.parameters["log_bin_trust_function_creators"], "1");

    // The stored record is the same instance seen by a later, independent call.
    let stored = serde_json::to_string(&instance).unwrap();
    let mut reloaded: InstanceRecord = serde_json::from_str(&stored).unwrap();
    reloaded.enable_functions = false;

    let options = UpdateOptions {
        allocated_storage: 30,
        binary_log_format: "MIXED".to_string(),
        ..Default::default()
    };
    let modified = reconciler
        .reconcile(&mut reloaded, &options, &Plan::default())
        .await
        .expect("modify request");

    assert_eq!(modified.db_parameter_group_name.as_deref(), Some(group_name.as_str()));
    assert_eq!(modified.allocated_storage, 30);
    assert_eq!(cp.call_count(Operation::CreateGroup), 1);
    assert_eq!(cp.call_count(Operation::ModifyGroupParameters), 2);

    let group = cp.group(&group_name).unwrap();
    assert_eq!(group.parameters["log_bin_trust_function_creators"], "0");
    assert_eq!(group.parameters["binlog_format"], "MIXED");
}

#[tokio::test]
async fn test_postgres_pg_cron_keeps_default_libraries() {
    let (cp, reconciler) = setup(Settings::default());

    let mut instance = InstanceRecord::new(EngineType::Postgres, 20);
    let created = reconciler
        .create_request(&mut instance, &Plan::default())
        .await
        .unwrap();
    assert_eq!(created.db_parameter_group_name, None);

    let options = UpdateOptions {
        enable_pg_cron: Some(true),
        ..Default::default()
    };
    let modified = reconciler
        .reconcile(&mut instance, &options, &Plan::default())
        .await
        .unwrap();

    let group_name = modified.db_parameter_group_name.expect("custom group");
    let group = cp.group(&group_name).unwrap();
    assert_eq!(group.family, "postgres16");
    assert_eq!(
        group.parameters["shared_preload_libraries"],
        "pg_cron,pg_stat_statements"
    );
    // Five defaults at three per page: the match is on the second page.
    assert_eq!(cp.call_count(Operation::DescribeEngineDefaultParameters), 2);
    assert_eq!(cp.call_count(Operation::DescribeDefaultEngineVersions), 1);
}

#[tokio::test]
async fn test_sweep_leaves_attached_groups_for_next_pass() {
    let (cp, reconciler) = setup(Settings::default());

    let mut attached = InstanceRecord::new(EngineType::Mysql, 10);
    attached.binary_log_format = "ROW".to_string();
    let mut orphaned = InstanceRecord::new(EngineType::Mysql, 10);
    orphaned.binary_log_format = "STATEMENT".to_string();

    let attached_group = reconciler
        .create_request(&mut attached, &Plan::default())
        .await
        .unwrap()
        .db_parameter_group_name
        .unwrap();
    let orphaned_group = reconciler
        .create_request(&mut orphaned, &Plan::default())
        .await
        .unwrap()
        .db_parameter_group_name
        .unwrap();
    cp.insert_group("default.mysql8.0", "mysql8.0");
    cp.mark_in_use(&attached_group);

    let report = reconciler.sweep().await;
    assert!(report.complete);
    assert_eq!(report.deleted, vec![orphaned_group.clone()]);
    assert_eq!(report.in_use, vec![attached_group.clone()]);
    assert!(report.failed.is_empty());

    let mut remaining = cp.group_names();
    remaining.sort();
    let mut expected = vec![attached_group.clone(), "default.mysql8.0".to_string()];
    expected.sort();
    assert_eq!(remaining, expected);

    // Sweeps keep no state: a second pass sees the same attached group again.
    let again = reconciler.sweep().await;
    assert!(again.deleted.is_empty());
    assert_eq!(again.in_use, vec![attached_group]);
}
