pub mod db_objects;

use crate::{
    cfg::Settings,
    error::{GatherError, SqlxAction, SqlxSnafu},
};
use snafu::ResultExt;
use sqlx::{pool::PoolConnection, Pool, Postgres, Transaction};

#[derive(Clone)]
pub struct GatherState {
    postgres: Pool<Postgres>,
    pub settings: Settings,
    pub http: reqwest::Client,
}

impl GatherState {
    pub fn new(postgres: Pool<Postgres>, settings: Settings) -> Self {
        Self {
            postgres,
            settings,
            http: reqwest::Client::new(),
        }
    }

    pub async fn get_connection(&self) -> Result<PoolConnection<Postgres>, GatherError> {
        self.postgres.acquire().await.context(SqlxSnafu {
            action: SqlxAction::AcquiringConnection,
        })
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, GatherError> {
        self.postgres.begin().await.context(SqlxSnafu {
            action: SqlxAction::AcquiringConnection,
        })
    }
}
