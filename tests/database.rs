use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use shipman::{
    database::{CallContext, Database},
    errors::ShipmanError,
    models::{
        BillOfLading, CargoLoad, CharterDetail, CharterStatusUpdate, DemurrageRecord,
        DemurrageStatusUpdate, Dispute, DisputeStatusUpdate, LaytimeEntry, Payment,
        PaymentStatusUpdate, ShipPosition, User, Vessel, Voyage, VoyagePort,
    },
};

fn ctx() -> CallContext {
    CallContext::background()
}

async fn create_charter(db: &Database, title: &str) -> CharterDetail {
    let mut charter = CharterDetail {
        title: title.to_string(),
        ..Default::default()
    };
    db.charter_details()
        .create(&ctx(), &mut charter)
        .await
        .expect("Failed to create charter");
    charter
}

async fn create_voyage(db: &Database, charter_id: Uuid) -> Voyage {
    let mut voyage = Voyage {
        charter_detail_id: charter_id,
        voyage_number: Some("V-001".to_string()),
        ..Default::default()
    };
    db.voyages()
        .create(&ctx(), &mut voyage)
        .await
        .expect("Failed to create voyage");
    voyage
}

#[sqlx::test(migrations = "./migrations")]
async fn test_charter_defaults_written_back(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Baltic grain 2024").await;

    assert_ne!(charter.id, Uuid::nil());
    assert_eq!(charter.status, "draft");
    assert_eq!(charter.ai_status, "pending");
    assert_eq!(charter.created_at, charter.updated_at);

    let stored = db.charter_details().retrieve(&ctx(), charter.id).await.unwrap();
    assert_eq!(stored, charter);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_payment_defaults(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Freight").await;

    let mut payment = Payment {
        charter_detail_id: charter.id,
        amount: 125_000.0,
        ..Default::default()
    };
    db.payments().create(&ctx(), &mut payment).await.unwrap();

    assert_eq!(payment.category, "general");
    assert_eq!(payment.currency, "USD");
    assert_eq!(payment.status, "pending");
    assert_eq!(payment.voyage_id, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_explicit_values_override_defaults(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Freight").await;

    let mut record = DemurrageRecord {
        charter_detail_id: charter.id,
        currency: "EUR".to_string(),
        status: "submitted".to_string(),
        claimed_hours: Some(36.5),
        ..Default::default()
    };
    db.demurrage_records().create(&ctx(), &mut record).await.unwrap();

    assert_eq!(record.currency, "EUR");
    assert_eq!(record.status, "submitted");
    assert_eq!(record.claimed_hours, Some(36.5));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_retrieve_missing_is_not_found(pool: PgPool) {
    let db = Database::new(pool);
    let id = Uuid::new_v4();

    let err = db.vessels().retrieve(&ctx(), id).await.unwrap_err();
    assert!(matches!(err, ShipmanError::NotFound { id: missing, .. } if missing == id));

    let mut voyage = Voyage {
        id,
        ..Default::default()
    };
    let err = db.voyages().update(&ctx(), &mut voyage).await.unwrap_err();
    assert!(matches!(err, ShipmanError::NotFound { .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_is_idempotent(pool: PgPool) {
    let db = Database::new(pool);
    let mut vessel = Vessel {
        name: "NORDIC STAR".to_string(),
        ..Default::default()
    };
    db.vessels().create(&ctx(), &mut vessel).await.unwrap();

    assert_eq!(db.vessels().delete(&ctx(), vessel.id).await.unwrap(), 1);
    assert_eq!(db.vessels().delete(&ctx(), vessel.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_imo_is_constraint_violation(pool: PgPool) {
    let db = Database::new(pool);

    let mut first = Vessel {
        name: "NORDIC STAR".to_string(),
        imo_number: Some("9267560".to_string()),
        capacity: Some(json!({"holds": 5})),
        ..Default::default()
    };
    db.vessels().create(&ctx(), &mut first).await.unwrap();
    assert_eq!(first.capacity, Some(json!({"holds": 5})));

    let mut second = Vessel {
        name: "NORDIC STAR II".to_string(),
        imo_number: Some("9267560".to_string()),
        ..Default::default()
    };
    let err = db.vessels().create(&ctx(), &mut second).await.unwrap_err();
    assert!(matches!(err, ShipmanError::ConstraintViolation(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_child_of_missing_parent_is_constraint_violation(pool: PgPool) {
    let db = Database::new(pool);

    let mut voyage = Voyage {
        charter_detail_id: Uuid::new_v4(),
        ..Default::default()
    };
    let err = db.voyages().create(&ctx(), &mut voyage).await.unwrap_err();
    assert!(matches!(err, ShipmanError::ConstraintViolation(_)));

    let mut payment = Payment {
        charter_detail_id: Uuid::new_v4(),
        amount: 1.0,
        ..Default::default()
    };
    let err = db.payments().create(&ctx(), &mut payment).await.unwrap_err();
    assert!(matches!(err, ShipmanError::ConstraintViolation(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_email_lookup_ignores_case(pool: PgPool) {
    let db = Database::new(pool);

    let mut user = User {
        email: "Ops@Example.com".to_string(),
        password_hash: "hash".to_string(),
        full_name: "Ops Desk".to_string(),
        ..Default::default()
    };
    db.users().create(&ctx(), &mut user).await.unwrap();
    assert_eq!(user.role, "user");

    let found = db
        .users()
        .retrieve_by_email(&ctx(), "ops@example.COM")
        .await
        .expect("user should be found");
    assert_eq!(found.id, user.id);

    let err = db
        .users()
        .retrieve_by_email(&ctx(), "nobody@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ShipmanError::NotFoundByKey { entity: "user", .. }));

    let mut duplicate = User {
        email: "OPS@EXAMPLE.COM".to_string(),
        password_hash: "hash".to_string(),
        full_name: "Someone Else".to_string(),
        ..Default::default()
    };
    let err = db.users().create(&ctx(), &mut duplicate).await.unwrap_err();
    assert!(matches!(err, ShipmanError::ConstraintViolation(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_refreshes_updated_at(pool: PgPool) {
    let db = Database::new(pool);
    let mut vessel = Vessel {
        name: "NORDIC STAR".to_string(),
        ..Default::default()
    };
    db.vessels().create(&ctx(), &mut vessel).await.unwrap();
    let (id, created_at, first_update) = (vessel.id, vessel.created_at, vessel.updated_at);

    vessel.flag_state = Some("FI".to_string());
    db.vessels().update(&ctx(), &mut vessel).await.unwrap();

    assert!(vessel.updated_at > first_update);
    assert_eq!(vessel.id, id);
    assert_eq!(vessel.created_at, created_at);

    let stored = db.vessels().retrieve(&ctx(), id).await.unwrap();
    assert_eq!(stored.flag_state.as_deref(), Some("FI"));
    assert_eq!(stored.updated_at, vessel.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_child_updates_refresh_updated_at(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Timestamps").await;
    let mut voyage = create_voyage(&db, charter.id).await;
    let (voyage_created, voyage_updated) = (voyage.created_at, voyage.updated_at);

    voyage.status = "underway".to_string();
    voyage.distance_nm = Some(5_400.0);
    db.voyages().update(&ctx(), &mut voyage).await.unwrap();

    assert!(voyage.updated_at > voyage_updated);
    let stored = db.voyages().retrieve(&ctx(), voyage.id).await.unwrap();
    assert_eq!(stored.created_at, voyage_created);
    assert_eq!(stored.updated_at, voyage.updated_at);
    assert_eq!(stored.status, "underway");

    let mut payment = Payment {
        charter_detail_id: charter.id,
        amount: 2_500.0,
        ..Default::default()
    };
    db.payments().create(&ctx(), &mut payment).await.unwrap();
    let (payment_id, payment_created, payment_updated) =
        (payment.id, payment.created_at, payment.updated_at);

    payment.amount = 2_750.0;
    db.payments().update(&ctx(), &mut payment).await.unwrap();
    assert!(payment.updated_at > payment_updated);
    assert_eq!(payment.id, payment_id);

    let (created_at, updated_at): (DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
        "SELECT created_at, updated_at FROM shipman.payments WHERE id = $1",
    )
    .bind(payment.id)
    .fetch_one(db.pool())
    .await
    .expect("Failed to read payment timestamps");
    assert_eq!(created_at, payment_created);
    assert_eq!(updated_at, payment.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_charter_delete_cascades(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Cascade").await;
    let voyage = create_voyage(&db, charter.id).await;

    let mut payment = Payment {
        charter_detail_id: charter.id,
        voyage_id: Some(voyage.id),
        amount: 10.0,
        ..Default::default()
    };
    db.payments().create(&ctx(), &mut payment).await.unwrap();

    let mut bill = BillOfLading {
        charter_detail_id: charter.id,
        document_number: "BL-1".to_string(),
        encrypted_key: Some(vec![0xde, 0xad, 0xbe, 0xef]),
        ..Default::default()
    };
    db.bills_of_lading().create(&ctx(), &mut bill).await.unwrap();
    assert_eq!(bill.encrypted_key, Some(vec![0xde, 0xad, 0xbe, 0xef]));

    let mut entry = LaytimeEntry {
        charter_detail_id: charter.id,
        port_name: "Santos".to_string(),
        activity: "Discharging".to_string(),
        started_at: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
        ..Default::default()
    };
    db.laytime_entries().create(&ctx(), &mut entry).await.unwrap();

    let mut dispute = Dispute {
        charter_detail_id: charter.id,
        payment_id: Some(payment.id),
        raised_by_org_id: Uuid::new_v4(),
        subject: "Freight shortfall".to_string(),
        ..Default::default()
    };
    db.disputes().create(&ctx(), &mut dispute).await.unwrap();

    let mut record = DemurrageRecord {
        charter_detail_id: charter.id,
        laytime_entry_id: Some(entry.id),
        claimed_hours: Some(12.0),
        ..Default::default()
    };
    db.demurrage_records().create(&ctx(), &mut record).await.unwrap();

    assert_eq!(db.charter_details().delete(&ctx(), charter.id).await.unwrap(), 1);

    assert!(matches!(
        db.charter_details().retrieve(&ctx(), charter.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(matches!(
        db.laytime_entries().retrieve(&ctx(), entry.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(matches!(
        db.disputes().retrieve(&ctx(), dispute.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(matches!(
        db.demurrage_records().retrieve(&ctx(), record.id).await,
        Err(ShipmanError::NotFound { .. })
    ));

    assert!(matches!(
        db.voyages().retrieve(&ctx(), voyage.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(matches!(
        db.payments().retrieve(&ctx(), payment.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(matches!(
        db.bills_of_lading().retrieve(&ctx(), bill.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_voyage_delete_detaches_laytime(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Laytime").await;
    let voyage = create_voyage(&db, charter.id).await;

    let mut entry = LaytimeEntry {
        charter_detail_id: charter.id,
        voyage_id: Some(voyage.id),
        port_name: "Rotterdam".to_string(),
        activity: "Loading".to_string(),
        started_at: Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap(),
        ..Default::default()
    };
    db.laytime_entries().create(&ctx(), &mut entry).await.unwrap();

    let mut port = VoyagePort {
        voyage_id: voyage.id,
        port_name: "Rotterdam".to_string(),
        ..Default::default()
    };
    db.voyage_ports().create(&ctx(), &mut port).await.unwrap();

    let mut cargo = CargoLoad {
        voyage_id: voyage.id,
        commodity: Some("Wheat".to_string()),
        ..Default::default()
    };
    db.cargo_loads().create(&ctx(), &mut cargo).await.unwrap();

    let mut position = ShipPosition {
        voyage_id: voyage.id,
        recorded_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        latitude: 51.95,
        longitude: 4.14,
        ..Default::default()
    };
    db.ship_positions().create(&ctx(), &mut position).await.unwrap();

    db.voyages().delete(&ctx(), voyage.id).await.unwrap();

    let stored = db.laytime_entries().retrieve(&ctx(), entry.id).await.unwrap();
    assert_eq!(stored.voyage_id, None);
    assert_eq!(
        db.laytime_entries()
            .list_by_charter(&ctx(), charter.id)
            .await
            .unwrap()
            .len(),
        1
    );

    assert!(matches!(
        db.voyage_ports().retrieve(&ctx(), port.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(matches!(
        db.cargo_loads().retrieve(&ctx(), cargo.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(matches!(
        db.ship_positions().retrieve(&ctx(), position.id).await,
        Err(ShipmanError::NotFound { .. })
    ));
    assert!(db
        .ship_positions()
        .list_by_voyage(&ctx(), voyage.id, None)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_voyages_ordered_by_planned_departure(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Ordering").await;

    let departures = [
        Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        None,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
    ];
    for planned in departures {
        let mut voyage = Voyage {
            charter_detail_id: charter.id,
            planned_departure_at: planned,
            ..Default::default()
        };
        db.voyages().create(&ctx(), &mut voyage).await.unwrap();
    }

    let listed: Vec<_> = db
        .voyages()
        .list_by_charter(&ctx(), charter.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.planned_departure_at)
        .collect();

    assert_eq!(listed, vec![departures[2], departures[0], None]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_positions_latest_first_with_limit(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Track").await;
    let voyage = create_voyage(&db, charter.id).await;

    for hour in 0..4 {
        let mut position = ShipPosition {
            voyage_id: voyage.id,
            recorded_at: Utc.with_ymd_and_hms(2024, 4, 2, hour, 0, 0).unwrap(),
            latitude: 60.19,
            longitude: 24.94 + f64::from(hour),
            ..Default::default()
        };
        db.ship_positions().create(&ctx(), &mut position).await.unwrap();
        assert_eq!(position.source, "manual");
    }

    let all = db
        .ship_positions()
        .list_by_voyage(&ctx(), voyage.id, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.windows(2).all(|w| w[0].recorded_at > w[1].recorded_at));

    let latest = db
        .ship_positions()
        .list_by_voyage(&ctx(), voyage.id, Some(2))
        .await
        .unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(
        latest[0].recorded_at,
        Utc.with_ymd_and_hms(2024, 4, 2, 3, 0, 0).unwrap()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cargo_update_keeps_absent_fields(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Cargo").await;
    let voyage = create_voyage(&db, charter.id).await;

    let mut cargo = CargoLoad {
        voyage_id: voyage.id,
        commodity: Some("Wheat".to_string()),
        quantity: Some(50_000.0),
        stowage_plan: Some(json!({"hold_1": 10000})),
        ..Default::default()
    };
    db.cargo_loads().create(&ctx(), &mut cargo).await.unwrap();

    let mut change = CargoLoad {
        id: cargo.id,
        voyage_id: voyage.id,
        quantity: Some(48_500.0),
        ..Default::default()
    };
    db.cargo_loads().update(&ctx(), &mut change).await.unwrap();

    let stored = db.cargo_loads().retrieve(&ctx(), cargo.id).await.unwrap();
    assert_eq!(stored.quantity, Some(48_500.0));
    assert_eq!(stored.commodity.as_deref(), Some("Wheat"));
    assert_eq!(stored.stowage_plan, Some(json!({"hold_1": 10000})));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_updates(pool: PgPool) {
    let db = Database::new(pool);
    let charter = create_charter(&db, "Status").await;

    let reviewed = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
    db.charter_details()
        .update_status(
            &ctx(),
            charter.id,
            &CharterStatusUpdate {
                status: Some("active".to_string()),
                ai_status: None,
                last_reviewed_at: Some(reviewed),
            },
        )
        .await
        .unwrap();
    let stored = db.charter_details().retrieve(&ctx(), charter.id).await.unwrap();
    assert_eq!(stored.status, "active");
    assert_eq!(stored.ai_status, "pending");
    assert_eq!(stored.last_reviewed_at, Some(reviewed));

    let mut payment = Payment {
        charter_detail_id: charter.id,
        amount: 1.0,
        reference: Some("INV-7".to_string()),
        ..Default::default()
    };
    db.payments().create(&ctx(), &mut payment).await.unwrap();
    let paid_at = Utc.with_ymd_and_hms(2024, 2, 3, 9, 30, 0).unwrap();
    let updated_at = db
        .payments()
        .update_status(
            &ctx(),
            payment.id,
            &PaymentStatusUpdate {
                status: "paid".to_string(),
                paid_at: Some(paid_at),
                reference: None,
            },
        )
        .await
        .unwrap();
    let stored = db.payments().retrieve(&ctx(), payment.id).await.unwrap();
    assert_eq!(stored.status, "paid");
    assert_eq!(stored.paid_at, Some(paid_at));
    assert_eq!(stored.reference.as_deref(), Some("INV-7"));
    assert_eq!(stored.updated_at, updated_at);

    let mut dispute = Dispute {
        charter_detail_id: charter.id,
        raised_by_org_id: Uuid::new_v4(),
        subject: "Short delivery".to_string(),
        ..Default::default()
    };
    db.disputes().create(&ctx(), &mut dispute).await.unwrap();
    assert_eq!(dispute.status, "open");
    let assignee = Uuid::new_v4();
    db.disputes()
        .update_status(
            &ctx(),
            dispute.id,
            &DisputeStatusUpdate {
                status: "under_review".to_string(),
                assigned_to_org_id: Some(assignee),
                resolution_notes: None,
            },
        )
        .await
        .unwrap();
    let stored = db.disputes().retrieve(&ctx(), dispute.id).await.unwrap();
    assert_eq!(stored.status, "under_review");
    assert_eq!(stored.assigned_to_org_id, Some(assignee));

    let mut record = DemurrageRecord {
        charter_detail_id: charter.id,
        notes: Some("initial".to_string()),
        ..Default::default()
    };
    db.demurrage_records().create(&ctx(), &mut record).await.unwrap();
    db.demurrage_records()
        .update_status(
            &ctx(),
            record.id,
            &DemurrageStatusUpdate {
                status: "settled".to_string(),
                reference: Some("DEM-42".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let stored = db.demurrage_records().retrieve(&ctx(), record.id).await.unwrap();
    assert_eq!(stored.status, "settled");
    assert_eq!(stored.reference.as_deref(), Some("DEM-42"));
    assert_eq!(stored.notes.as_deref(), Some("initial"));

    let err = db
        .payments()
        .update_status(
            &ctx(),
            Uuid::new_v4(),
            &PaymentStatusUpdate {
                status: "paid".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShipmanError::NotFound { .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancelled_context_does_not_reach_store(pool: PgPool) {
    let db = Database::new(pool);
    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();
    let cancelled = CallContext::background().with_cancellation(token);

    let mut vessel = Vessel {
        name: "NEVER WRITTEN".to_string(),
        ..Default::default()
    };
    let err = db.vessels().create(&cancelled, &mut vessel).await.unwrap_err();
    assert!(matches!(err, ShipmanError::Cancelled));

    let vessels = db.vessels().list(&ctx(), 50, 0).await.unwrap();
    assert!(vessels.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ping(pool: PgPool) {
    let db = Database::new(pool);
    db.ping(&ctx()).await.expect("store should answer");
}
