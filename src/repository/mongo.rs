use bson::doc;
use mongodb::options::{ClientOptions, Credential, IndexOptions, ResolverConfig};
use mongodb::{Client, Database, IndexModel};
use tracing::{info, instrument};

use crate::config::MongoConfig;
use crate::repository::repository_error::RepositoryResult;

/// Builds the shared client once; every repository borrows its collections from the returned database.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect_database(config: &MongoConfig) -> RepositoryResult<Database> {
    let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("DevnetBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));
    client_options.server_selection_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
        client_options.credential = Some(Credential::builder().username(username.clone()).password(password.clone()).build());
    }

    let client = Client::with_options(client_options)?;
    let db = client.database(&config.database);
    db.run_command(doc! { "ping": 1 }, None).await?;
    info!("Connected to MongoDB");
    Ok(db)
}

/// Creates the indexes the queries rely on. Existing indexes are left alone.
#[instrument(skip_all)]
pub async fn ensure_indexes(db: &Database, config: &MongoConfig) -> RepositoryResult<()> {
    let unique = IndexOptions::builder().unique(true).build();
    let users = db.collection::<bson::Document>(&config.users_collection);
    users
        .create_indexes(
            vec![
                IndexModel::builder().keys(doc! { "username": 1 }).options(unique.clone()).build(),
                IndexModel::builder().keys(doc! { "email": 1 }).options(unique).build(),
            ],
            None,
        )
        .await?;

    let contents = db.collection::<bson::Document>(&config.contents_collection);
    let content_keys = [
        doc! { "userId": 1 },
        doc! { "contentType": 1 },
        doc! { "createdAt": -1 },
        doc! { "saves": 1 },
        doc! { "reposts": 1 },
        doc! { "originalContentId": 1 },
        doc! { "tags": 1 },
        doc! { "solved": 1 },
    ];
    contents
        .create_indexes(content_keys.into_iter().map(|keys| IndexModel::builder().keys(keys).build()), None)
        .await?;

    let cvs = db.collection::<bson::Document>(&config.cv_profiles_collection);
    cvs.create_index(IndexModel::builder().keys(doc! { "userId": 1 }).build(), None).await?;

    info!("MongoDB indexes ensured");
    Ok(())
}
