use async_trait::async_trait;
use mongodb::bson::{doc, to_document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};

use crate::domain::models::puzzle::DailyPuzzle;
use crate::error::{AppError, AppResult};
use crate::repository::is_duplicate_key;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PuzzleRepository: Send + Sync {
    /// 原子 get-or-create: 并发首访也只会落一条当日记录.
    /// candidate 仅在当日尚无记录时插入, 否则返回已有记录.
    async fn get_or_create(&self, candidate: &DailyPuzzle) -> AppResult<DailyPuzzle>;
    async fn find_by_date(&self, date: &str) -> AppResult<Option<DailyPuzzle>>;
    /// 原子条件自增: 仅当计数低于 cap 时 +1.
    /// 返回 false 表示当日已发完.
    async fn increment_if_below_cap(&self, date: &str, cap: i64) -> AppResult<bool>;
}

pub struct MongoPuzzleRepository {
    collection: Collection<DailyPuzzle>,
}

impl MongoPuzzleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("daily_puzzles"),
        }
    }
}

#[async_trait]
impl PuzzleRepository for MongoPuzzleRepository {
    async fn get_or_create(&self, candidate: &DailyPuzzle) -> AppResult<DailyPuzzle> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let result = self
            .collection
            .find_one_and_update(
                doc! { "date": &candidate.date },
                doc! { "$setOnInsert": to_document(candidate)? },
                options,
            )
            .await;

        let puzzle = match result {
            Ok(puzzle) => puzzle,
            // 并发首访时 upsert 可能撞唯一索引, 读已有记录即可
            Err(err) if is_duplicate_key(&err) => self.find_by_date(&candidate.date).await?,
            Err(err) => return Err(err.into()),
        };

        puzzle.ok_or_else(|| AppError::Internal("daily puzzle upsert returned nothing".to_string()))
    }

    async fn find_by_date(&self, date: &str) -> AppResult<Option<DailyPuzzle>> {
        let puzzle = self.collection.find_one(doc! { "date": date }, None).await?;
        Ok(puzzle)
    }

    async fn increment_if_below_cap(&self, date: &str, cap: i64) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "date": date, "couponsGenerated": { "$lt": cap } },
                doc! { "$inc": { "couponsGenerated": 1 } },
                None,
            )
            .await?;

        Ok(result.modified_count > 0)
    }
}
