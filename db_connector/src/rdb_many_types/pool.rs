//! Pool settings shared by the per-engine connection modules

use sea_orm::sqlx::pool::PoolOptions;
use sea_orm::sqlx::Database;

/// Options for a pool that holds exactly one connection for its whole life.
///
/// sqlx would otherwise close the connection after its idle timeout or max
/// lifetime and open a new session on the next query.
pub(crate) fn single_connection<DB: Database>() -> PoolOptions<DB> {
    PoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sqlx::{MySql, Postgres};

    #[test]
    fn test_single_connection_when_built_then_connection_never_retired() {
        let options = single_connection::<Postgres>();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);

        let options = single_connection::<MySql>();
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }
}
