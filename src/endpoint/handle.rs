use async_trait::async_trait;
use log::debug;
use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};

use crate::bench::{Upsert, WritePayload, WriteTarget};
use crate::conf::TargetConfig;
use crate::core::BenchError;

use super::Connector;
use super::limits::WriteLimits;
use super::reply::{check_write_reply, reply_ok, write_error};

const NAMESPACE_EXISTS_CODE: i32 = 48;

/// A live connection to one endpoint and its benchmark collection.
pub struct EndpointHandle {
    name: String,
    client: Client,
    database: Database,
    collection: Collection<Document>,
    limits: WriteLimits,
}

impl EndpointHandle {
    /// Connects, checks liveness with `hello`, then resolves the collection,
    /// creating it when absent. Write limits come from the `hello` reply.
    pub async fn connect(name: &str, uri: &str, target: &TargetConfig) -> Result<Self, BenchError> {
        let conn_err = |e: mongodb::error::Error| BenchError::ConnectionFailure {
            endpoint: name.to_string(),
            reason: e.to_string(),
        };

        let mut options = ClientOptions::parse(uri).await.map_err(conn_err)?;
        if let Some(timeout) = target.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }
        if let Some(app_name) = &target.app_name {
            options.app_name = Some(app_name.clone());
        }
        let client = Client::with_options(options).map_err(conn_err)?;

        let limits = match check_liveness(name, &client).await {
            Ok(limits) => limits.with_batch_cap(target.upsert_batch_size),
            Err(e) => {
                client.shutdown().await;
                return Err(e);
            }
        };
        debug!("{} write limits: {:?}", name, limits);

        let database = client.database(&target.database_name);
        let collection = match resolve_collection(&database, &target.collection_name).await {
            Ok(collection) => collection,
            Err(e) => {
                client.shutdown().await;
                return Err(conn_err(e));
            }
        };

        Ok(Self {
            name: name.to_string(),
            client,
            database,
            collection,
            limits,
        })
    }

    /// Sends the upserts as ordered `update` commands, as few as the
    /// endpoint's write limits allow.
    async fn upsert(&self, upserts: Vec<Upsert>) -> Result<(), BenchError> {
        let statements = upserts
            .into_iter()
            .map(|u| {
                doc! {
                    "q": { "_id": u.key },
                    "u": u.replacement,
                    "upsert": true,
                }
            })
            .collect();
        for updates in self.limits.split(&self.name, statements)? {
            let reply = self
                .database
                .run_command(doc! {
                    "update": self.collection.name(),
                    "updates": updates,
                    "ordered": true,
                })
                .await
                .map_err(|e| write_error(&self.name, e))?;
            check_write_reply(&self.name, &reply)?;
        }
        Ok(())
    }

    async fn collection_exists(&self) -> Result<bool, BenchError> {
        let names = self
            .database
            .list_collection_names()
            .await
            .map_err(|e| write_error(&self.name, e))?;
        Ok(names.iter().any(|n| n == self.collection.name()))
    }
}

async fn check_liveness(name: &str, client: &Client) -> Result<WriteLimits, BenchError> {
    let reply = client
        .database("admin")
        .run_command(doc! { "hello": 1 })
        .await
        .map_err(|e| BenchError::ConnectionFailure {
            endpoint: name.to_string(),
            reason: e.to_string(),
        })?;
    if !reply_ok(&reply) {
        return Err(BenchError::ConnectionFailure {
            endpoint: name.to_string(),
            reason: format!("hello returned {}", reply),
        });
    }
    Ok(WriteLimits::from_hello(&reply))
}

async fn resolve_collection(
    database: &Database,
    collection_name: &str,
) -> mongodb::error::Result<Collection<Document>> {
    let names = database.list_collection_names().await?;
    if !names.iter().any(|n| n == collection_name) {
        debug!(
            "Creating collection '{}.{}'",
            database.name(),
            collection_name
        );
        match database.create_collection(collection_name).await {
            Ok(()) => {}
            Err(e) if matches!(e.kind.as_ref(), ErrorKind::Command(c) if c.code == NAMESPACE_EXISTS_CODE) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(database.collection(collection_name))
}

#[async_trait]
impl WriteTarget for EndpointHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, payload: WritePayload) -> Result<(), BenchError> {
        match payload {
            WritePayload::Insert(docs) => {
                self.collection
                    .insert_many(docs)
                    .await
                    .map_err(|e| write_error(&self.name, e))?;
                Ok(())
            }
            WritePayload::Upsert(upserts) => self.upsert(upserts).await,
        }
    }

    async fn count(&self) -> Result<u64, BenchError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| write_error(&self.name, e))
    }

    async fn truncate(&mut self) -> Result<(), BenchError> {
        self.collection
            .drop()
            .await
            .map_err(|e| write_error(&self.name, e))
    }

    async fn cleanup(&mut self) -> Result<(), BenchError> {
        if self.collection_exists().await? {
            self.truncate().await?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

/// Connects to real MongoDB-compatible servers.
pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    type Target = EndpointHandle;

    async fn connect(
        &self,
        name: &str,
        uri: &str,
        target: &TargetConfig,
    ) -> Result<EndpointHandle, BenchError> {
        EndpointHandle::connect(name, uri, target).await
    }
}
