//! PostgreSQL storage for the chartering back-office.
//!
//! [`Database`] owns the bounded connection pool and hands out one repository
//! per entity. Repositories hold a clone of the pool handle, so they can be
//! built directly from any `PgPool` in tests.

pub mod codec;
pub mod context;
pub(crate) mod models;

mod bills_of_lading;
mod cargo_loads;
mod charter_details;
mod demurrage_records;
mod disputes;
mod laytime_entries;
mod payments;
mod ship_positions;
mod users;
mod vessels;
mod voyage_ports;
mod voyages;

pub use bills_of_lading::BillOfLadingRepository;
pub use cargo_loads::CargoLoadRepository;
pub use charter_details::CharterDetailRepository;
pub use context::CallContext;
pub use demurrage_records::DemurrageRecordRepository;
pub use disputes::DisputeRepository;
pub use laytime_entries::LaytimeEntryRepository;
pub use payments::PaymentRepository;
pub use ship_positions::ShipPositionRepository;
pub use users::UserRepository;
pub use vessels::VesselRepository;
pub use voyage_ports::VoyagePortRepository;
pub use voyages::VoyageRepository;

use sqlx::{postgres::PgPoolOptions, Connection, PgPool};
use tracing::{error, info};

use crate::{config::DatabaseConfig, errors::ShipmanError};

/// Shared handle to the relational store
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a bounded pool according to `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, ShipmanError> {
        config.validate()?;

        info!(
            "Opening connection pool: max_connections={}, min_connections={}, max_lifetime={:?}, acquire_timeout={:?}",
            config.max_connections, config.min_connections, config.max_lifetime, config.acquire_timeout
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(config.max_lifetime)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.connection_url())
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                ShipmanError::from(e)
            })?;

        Ok(Self { pool })
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> Result<(), ShipmanError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Round-trip to the store on a pooled connection
    pub async fn ping(&self, ctx: &CallContext) -> Result<(), ShipmanError> {
        ctx.run(async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await?;
            Ok::<_, ShipmanError>(())
        })
        .await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn vessels(&self) -> VesselRepository {
        VesselRepository::new(self.pool.clone())
    }

    pub fn charter_details(&self) -> CharterDetailRepository {
        CharterDetailRepository::new(self.pool.clone())
    }

    pub fn voyages(&self) -> VoyageRepository {
        VoyageRepository::new(self.pool.clone())
    }

    pub fn voyage_ports(&self) -> VoyagePortRepository {
        VoyagePortRepository::new(self.pool.clone())
    }

    pub fn ship_positions(&self) -> ShipPositionRepository {
        ShipPositionRepository::new(self.pool.clone())
    }

    pub fn laytime_entries(&self) -> LaytimeEntryRepository {
        LaytimeEntryRepository::new(self.pool.clone())
    }

    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.pool.clone())
    }

    pub fn disputes(&self) -> DisputeRepository {
        DisputeRepository::new(self.pool.clone())
    }

    pub fn cargo_loads(&self) -> CargoLoadRepository {
        CargoLoadRepository::new(self.pool.clone())
    }

    pub fn bills_of_lading(&self) -> BillOfLadingRepository {
        BillOfLadingRepository::new(self.pool.clone())
    }

    pub fn demurrage_records(&self) -> DemurrageRecordRepository {
        DemurrageRecordRepository::new(self.pool.clone())
    }
}
