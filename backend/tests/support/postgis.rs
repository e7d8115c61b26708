//! Disposable PostGIS databases for adapter tests.
//!
//! `LOOPWEAR_TEST_DATABASE_URL` names a PostgreSQL server that has the PostGIS
//! extension installed, for example one started from the `postgis/postgis`
//! image. Each test gets a fresh database with the embedded migrations
//! applied, dropped again when the handle goes out of scope. When the variable
//! is unset, tests print a skip marker and return early; once it is set, any
//! setup failure fails the test.

use diesel::{Connection, PgConnection, RunQueryDsl};
use loopwear::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use url::Url;
use uuid::Uuid;

/// Environment variable holding the admin connection URL.
pub const TEST_DATABASE_ENV: &str = "LOOPWEAR_TEST_DATABASE_URL";

/// A migrated, uniquely named database on the test server.
pub struct TestDatabase {
    admin_url: String,
    name: String,
    url: String,
}

impl TestDatabase {
    fn create(admin_url: &str) -> Result<Self, String> {
        let name = format!("loopwear_test_{}", Uuid::new_v4().simple());
        let mut url =
            Url::parse(admin_url).map_err(|err| format!("parse {TEST_DATABASE_ENV}: {err}"))?;
        url.set_path(&format!("/{name}"));

        let mut admin =
            PgConnection::establish(admin_url).map_err(|err| format!("connect: {err}"))?;
        diesel::sql_query(format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .map_err(|err| format!("create {name}: {err}"))?;

        // From here on `Drop` removes the database, including on migration failure.
        let database = Self {
            admin_url: admin_url.to_owned(),
            name,
            url: url.to_string(),
        };
        run_pending_migrations(&database.url).map_err(|err| format!("migrate: {err}"))?;
        Ok(database)
    }

    /// Pool over this database with room for `max_size` concurrent checkouts.
    pub async fn pool(&self, max_size: u32) -> DbPool {
        let config = PoolConfig::new(&self.url)
            .with_max_size(max_size)
            .with_min_idle(None);
        DbPool::new(config).await.expect("test pool should build")
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let dropped = PgConnection::establish(&self.admin_url)
            .map_err(|err| err.to_string())
            .and_then(|mut conn| {
                diesel::sql_query(format!(
                    "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                    self.name
                ))
                .execute(&mut conn)
                .map(|_| ())
                .map_err(|err| err.to_string())
            });
        if let Err(err) = dropped {
            eprintln!("failed to drop test database {}: {err}", self.name);
        }
    }
}

/// Provision a database, or `None` when no test server is configured.
pub fn test_database() -> Option<TestDatabase> {
    let Ok(admin_url) = std::env::var(TEST_DATABASE_ENV) else {
        eprintln!("SKIP-TEST-DATABASE: {TEST_DATABASE_ENV} is unset");
        return None;
    };
    match TestDatabase::create(&admin_url) {
        Ok(database) => Some(database),
        Err(reason) => {
            panic!("test database setup failed: {reason}. Unset {TEST_DATABASE_ENV} to skip.")
        }
    }
}
