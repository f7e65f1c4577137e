//! MongoDB backend.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{options::ClientOptions, Client, Collection};
use tracing::{error, info};

use super::filter::Filter;
use super::store::{DocumentStore, StoreResult};

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if the URI is invalid or the server does not answer a ping.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB database {}", db_name);

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Untyped collection handle implementing [`DocumentStore`].
    pub fn collection(&self, name: &str) -> MongoCollection {
        MongoCollection {
            inner: self.db.collection(name),
        }
    }

    /// Shut the client down, waiting for pooled connections to close.
    pub async fn close(self) {
        self.client.shutdown().await;
    }
}

/// A MongoDB collection of raw documents.
#[derive(Debug, Clone)]
pub struct MongoCollection {
    inner: Collection<Document>,
}

impl MongoCollection {
    fn fault<'a>(&'a self, op: &'static str) -> impl Fn(&mongodb::error::Error) + 'a {
        move |e| error!("MongoDB {} on {} failed: {}", op, self.inner.name(), e)
    }
}

#[async_trait]
impl DocumentStore for MongoCollection {
    async fn insert_one(&self, doc: Document) -> StoreResult<()> {
        self.inner
            .insert_one(doc)
            .await
            .inspect_err(self.fault("insert_one"))?;
        Ok(())
    }

    async fn insert_many(&self, docs: Vec<Document>) -> StoreResult<()> {
        // The server rejects an empty batch
        if docs.is_empty() {
            return Ok(());
        }
        self.inner
            .insert_many(docs)
            .await
            .inspect_err(self.fault("insert_many"))?;
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(self
            .inner
            .find_one(filter.to_document())
            .await
            .inspect_err(self.fault("find_one"))?)
    }

    async fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        let cursor = self
            .inner
            .find(filter.to_document())
            .await
            .inspect_err(self.fault("find"))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .inspect_err(self.fault("find"))?;
        Ok(docs)
    }

    async fn update_one(&self, filter: &Filter, mut set: Document) -> StoreResult<u64> {
        set.remove("_id");
        let result = self
            .inner
            .update_one(filter.to_document(), doc! { "$set": set })
            .await
            .inspect_err(self.fault("update_one"))?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        let result = self
            .inner
            .delete_one(filter.to_document())
            .await
            .inspect_err(self.fault("delete_one"))?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, filter: &Filter) -> StoreResult<u64> {
        let result = self
            .inner
            .delete_many(filter.to_document())
            .await
            .inspect_err(self.fault("delete_many"))?;
        Ok(result.deleted_count)
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        Ok(self
            .inner
            .count_documents(filter.to_document())
            .await
            .inspect_err(self.fault("count_documents"))?)
    }
}
