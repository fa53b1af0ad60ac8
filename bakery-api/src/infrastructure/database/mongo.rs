use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::config::Config;
use crate::error::AppResult;

pub async fn init_mongo(config: &Config) -> AppResult<Database> {
    let client = Client::with_uri_str(&config.mongodb.uri).await?;
    let db = client.database(&config.mongodb.database);

    ensure_indexes(&db).await?;

    Ok(db)
}

/// 启动时建唯一索引: 会话令牌、券码、谜题日期、订单号.
/// 订单号唯一索引配合服务层的换号重试, 关掉碰撞窗口.
async fn ensure_indexes(db: &Database) -> AppResult<()> {
    unique_index(db, "sessions", "token").await?;
    unique_index(db, "coupons", "code").await?;
    unique_index(db, "daily_puzzles", "date").await?;
    unique_index(db, "orders", "orderNumber").await?;
    Ok(())
}

async fn unique_index(db: &Database, collection: &str, field: &str) -> AppResult<()> {
    let model = IndexModel::builder()
        .keys(doc! { field: 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    db.collection::<Document>(collection)
        .create_index(model, None)
        .await?;

    Ok(())
}
