/// The PostgreSQL backend.
use async_trait::async_trait;
use log::{debug, error, info};
use serde_json::value::RawValue;
use tokio_postgres::types::Json;
use tokio_postgres::{Client, NoTls};

use crate::config::Database;
use crate::errors::Error;

/// Anything the workers can run the search against.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run the query and return column 0 of its single row as JSON text.
    async fn search(&self, query: &str) -> Result<String, Error>;
}

/// One connection to the database, shared by every worker.
pub struct Server {
    client: Client,
    address: String,
}

impl Server {
    /// Open the connection and start driving it in the background.
    pub async fn connect(database: &Database) -> Result<Server, Error> {
        let address = database.address();
        debug!("Connecting to {}", address);

        let (client, connection) = match database.to_pg_config().connect(NoTls).await {
            Ok(pair) => pair,
            Err(err) => {
                error!("Could not connect to {}: {}", address, err);
                return Err(Error::ConnectError(err.to_string()));
            }
        };

        // The connection does the actual socket I/O; requests from all
        // clones of `client` are pipelined through it.
        let connection_address = address.clone();
        tokio::task::spawn(async move {
            match connection.await {
                Ok(()) => debug!("Connection to {} closed", connection_address),
                Err(err) => error!("Connection to {} failed: {}", connection_address, err),
            }
        });

        info!("Successfully connected to {}", address);

        Ok(Server { client, address })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Keep the first row of a result and drop the rest.
fn first_row<T>(rows: Vec<T>) -> Result<T, Error> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::DecodeError(String::from("query returned no rows")))
}

#[async_trait]
impl SearchBackend for Server {
    async fn search(&self, query: &str) -> Result<String, Error> {
        let rows = self
            .client
            .query(query, &[])
            .await
            .map_err(|err| Error::QueryError(err.to_string()))?;

        let row = first_row(rows)?;

        // NULL, or anything that isn't json/jsonb, fails here.
        let Json(item): Json<Box<RawValue>> = row
            .try_get(0)
            .map_err(|err| Error::DecodeError(err.to_string()))?;

        Ok(item.get().to_string())
    }
}
