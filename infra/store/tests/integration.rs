use chrono::Utc;
use fhub_domain::models::{Settings, ShippingMode, ShippingRate};
use fhub_store::{Column, Store, StoreError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn rate(id: &str) -> ShippingRate {
    let now = Utc::now();
    ShippingRate {
        id: id.to_owned(),
        mode: ShippingMode::Sea,
        min_weight: Decimal::ZERO,
        max_weight: Decimal::new(20, 0),
        price_per_kg: Decimal::TWO,
        delivery_days: 21,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Ticket {
    id: String,
    owner: String,
    code: String,
}

impl fhub_store::Record for Ticket {
    const TABLE: &'static str = "consolidation";

    fn key(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> fhub_store::Columns {
        fhub_store::Columns {
            owner: Some(self.owner.clone()),
            code: Some(self.code.clone()),
            ..fhub_store::Columns::default()
        }
    }
}

fn ticket(id: &str, code: &str) -> Ticket {
    Ticket { id: id.to_owned(), owner: "user:a".to_owned(), code: code.to_owned() }
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let store = Store::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://");

    store.health().await.expect("health check");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Store::builder().init().await.unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));

    let err = Store::builder().url("mem://").init().await.unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[tokio::test]
async fn committed_writes_are_visible() -> Result<(), StoreError> {
    let store = Store::in_memory().await?;
    let mut batch = store.batch();
    batch.create(&rate("rate:b"))?.create(&rate("rate:a"))?;
    batch.commit().await?;

    let rates = store.list::<ShippingRate>().await?;
    let ids: Vec<_> = rates.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["rate:a", "rate:b"]);
    assert_eq!(store.get::<ShippingRate>("rate:b").await?, Some(rates[1].clone()));
    assert!(store.get::<ShippingRate>("rate:zz").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_code_names_the_column() -> Result<(), StoreError> {
    let store = Store::in_memory().await?;
    let mut batch = store.batch();
    batch.create(&ticket("consolidation:x", "CONSAAAA2222"))?;
    batch.commit().await?;

    let mut batch = store.batch();
    batch.create(&ticket("consolidation:y", "CONSAAAA2222"))?;
    let err = batch.commit().await.unwrap_err();

    assert!(matches!(&err, StoreError::Duplicate { field, .. } if field == "code"), "{err}");
    assert_eq!(fhub_domain::error::Classify::field(&err), Some("code"));
    Ok(())
}

#[tokio::test]
async fn failed_batch_leaves_no_trace() -> Result<(), StoreError> {
    let store = Store::in_memory().await?;
    let mut batch = store.batch();
    batch.create(&ticket("consolidation:x", "CONSAAAA2222"))?;
    batch.commit().await?;

    let mut batch = store.batch();
    batch
        .create(&rate("rate:b"))?
        .put(&Settings::default())?
        .create(&ticket("consolidation:y", "CONSAAAA2222"))?;
    assert_eq!(batch.len(), 3);
    assert!(batch.commit().await.is_err());

    assert!(store.list::<ShippingRate>().await?.is_empty());
    assert!(store.list::<Settings>().await?.is_empty());
    let holder = store.find_by::<Ticket>(Column::Code, "CONSAAAA2222").await?;
    assert_eq!(holder.map(|t| t.id), Some("consolidation:x".to_owned()));
    Ok(())
}

#[tokio::test]
async fn stale_update_is_rejected() -> Result<(), StoreError> {
    let store = Store::in_memory().await?;
    let original = ticket("consolidation:x", "CONSAAAA2222");
    let mut batch = store.batch();
    batch.create(&original)?;
    batch.commit().await?;

    let mut first = original.clone();
    first.owner = "user:b".to_owned();
    let mut batch = store.batch();
    batch.update(&original, &first)?;
    batch.commit().await?;

    // Second writer still holds the original body.
    let mut second = original.clone();
    second.owner = "user:c".to_owned();
    let mut batch = store.batch();
    batch.update(&original, &second)?;
    let err = batch.commit().await.unwrap_err();
    assert!(matches!(err, StoreError::Stale { .. }), "{err}");

    let owned_by_b = store.list_by::<Ticket>(Column::Owner, "user:b").await?;
    assert_eq!(owned_by_b, vec![first]);
    assert!(store.list_by::<Ticket>(Column::Owner, "user:c").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn put_replaces_and_delete_removes() -> Result<(), StoreError> {
    let store = Store::in_memory().await?;
    let mut settings = Settings::default();
    let mut batch = store.batch();
    batch.put(&settings)?;
    batch.commit().await?;

    settings.company_name = "Renamed".to_owned();
    let mut batch = store.batch();
    batch.put(&settings)?;
    batch.commit().await?;

    let stored = store.list::<Settings>().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].company_name, "Renamed");

    let mut batch = store.batch();
    batch.delete::<Settings>(&settings.id);
    batch.commit().await?;
    assert!(store.list::<Settings>().await?.is_empty());
    Ok(())
}
