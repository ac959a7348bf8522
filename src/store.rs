use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use diesel::PgConnection;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Handle to the relational store. Constructed once at startup and
/// injected into every handler through the router state; all application
/// state lives behind it.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn connect(database_url: &str) -> Result<Self, PoolError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder().build(manager)?;
        Ok(Store { pool })
    }

    pub fn conn(&self) -> Result<PgPooledConnection, PoolError> {
        self.pool.get()
    }
}
