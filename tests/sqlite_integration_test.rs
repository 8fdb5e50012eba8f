use diesel::prelude::*;
use whatsapp_sqlstore::store::schema::{ALL_TABLES, missing_tables, whatsmeow_device};
use whatsapp_sqlstore::store::version::get_version;
use whatsapp_sqlstore::store::{Container, Dialect, DeviceRecord, open_sqlite_pool};

fn record(jid: &str) -> DeviceRecord {
    DeviceRecord {
        jid: jid.to_string(),
        registration_id: 12345,
        noise_key: vec![1; 32],
        identity_key: vec![2; 32],
        signed_pre_key: vec![3; 32],
        signed_pre_key_id: 7,
        signed_pre_key_sig: vec![4; 64],
        adv_key: vec![5; 32],
        adv_details: vec![6; 32],
        adv_account_sig: vec![7; 64],
        adv_account_sig_key: vec![8; 32],
        adv_device_sig: vec![9; 64],
        platform: None,
        business_name: None,
        push_name: Some("pool".to_string()),
        facebook_uuid: Some("5e6b2a1c-8d3f-4b7a-9c2e-1f0a3b4c5d6e".to_string()),
        lid: Some("100000000000001@lid".to_string()),
    }
}

#[tokio::test]
async fn test_pool_upgrades_new_database() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("store.db");
    let db_url = db_path.to_string_lossy().to_string();

    let pool = open_sqlite_pool(&db_url)
        .await
        .expect("Failed to open pool");

    let mut conn = pool.get().expect("Failed to get connection");
    assert_eq!(get_version(&mut *conn).unwrap(), 7);
    assert!(
        missing_tables(&mut *conn, Dialect::Sqlite).unwrap().is_empty(),
        "expected all of {ALL_TABLES:?}"
    );

    let journal_mode: Vec<String> = diesel::sql_query("PRAGMA journal_mode")
        .load::<JournalMode>(&mut *conn)
        .unwrap()
        .into_iter()
        .map(|row| row.journal_mode)
        .collect();
    assert_eq!(journal_mode, vec!["wal".to_string()]);
}

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = diesel::sql_types::Text)]
    journal_mode: String,
}

#[tokio::test]
async fn test_reopening_keeps_data_and_version() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_url = dir.path().join("store.db").to_string_lossy().to_string();

    {
        let pool = open_sqlite_pool(&db_url).await.unwrap();
        let mut conn = pool.get().unwrap();
        diesel::insert_into(whatsmeow_device::table)
            .values(&record("1234:5@s.whatsapp.net"))
            .execute(&mut *conn)
            .unwrap();
    }

    let pool = open_sqlite_pool(&db_url).await.unwrap();
    let mut conn = pool.get().unwrap();
    assert_eq!(get_version(&mut *conn).unwrap(), 7);

    let devices: Vec<DeviceRecord> = whatsmeow_device::table
        .select(DeviceRecord::as_select())
        .load(&mut *conn)
        .unwrap();
    assert_eq!(devices, vec![record("1234:5@s.whatsapp.net")]);
}

#[tokio::test]
async fn test_pooled_connections_enforce_foreign_keys() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_url = dir.path().join("store.db").to_string_lossy().to_string();
    let pool = open_sqlite_pool(&db_url).await.unwrap();

    // Every connection gets the pragmas, not only the one that ran the upgrade.
    let conns: Vec<_> = (0..3).map(|_| pool.get().unwrap()).collect();
    for mut conn in conns {
        let orphan = diesel::sql_query(
            "INSERT INTO whatsmeow_sessions (our_jid, their_id, session) \
             VALUES ('nobody@s.whatsapp.net', '1.0', X'00')",
        )
        .execute(&mut *conn);
        assert!(orphan.is_err());
    }
}

#[test]
fn test_container_and_pool_agree_on_file_databases() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_url = dir.path().join("store.db").to_string_lossy().to_string();

    let mut container = Container::open_sqlite(&db_url).unwrap();
    assert_eq!(container.upgrade().unwrap(), 7);
    drop(container);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let pool = runtime.block_on(open_sqlite_pool(&db_url)).unwrap();
    let mut conn = pool.get().unwrap();
    assert_eq!(get_version(&mut *conn).unwrap(), 7);
}
