//! MongoDB 저장 브로커.
//!
//! 컬렉션마다 복합 고유 인덱스를 보장한 뒤 `insert_many`로
//! 적재합니다. 고유 인덱스 충돌(E11000)은 이미 수집한 레코드라는
//! 뜻이므로 조용히 무시하고, 나머지 레코드는 그대로 들어갑니다
//! (`ordered = false`).

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, FindOptions, IndexOptions, InsertManyOptions};
use mongodb::{Client, IndexModel};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DataError, Result};

/// 레코드 적재와 조회를 담당하는 브로커.
pub struct MongoBroker {
    client: Client,
}

/// 인덱스 필드 목록 → 오름차순 복합 인덱스 키 문서.
fn index_keys(fields: &[&str]) -> Document {
    let mut keys = Document::new();
    for field in fields {
        keys.insert(*field, 1);
    }
    keys
}

/// 배치의 모든 쓰기 오류가 고유 키 충돌(E11000)인지 확인.
fn is_duplicate_key_only(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::BulkWrite(failure) => {
            failure.write_concern_error.is_none()
                && failure
                    .write_errors
                    .as_ref()
                    .map(|errors| errors.iter().all(|e| e.code == 11000))
                    .unwrap_or(false)
        }
        _ => false,
    }
}

fn to_document(record: &Map<String, Value>) -> Result<Document> {
    mongodb::bson::to_document(record).map_err(|err| DataError::StorageError(err.to_string()))
}

impl MongoBroker {
    pub async fn connect(uri: &str) -> Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;
        Ok(Self { client })
    }

    fn collection(&self, db: &str, collection: &str) -> mongodb::Collection<Document> {
        self.client.database(db).collection::<Document>(collection)
    }

    /// 레코드 적재.
    ///
    /// 고유 인덱스를 먼저 보장하고 비순서 `insert_many`를 수행합니다.
    /// 중복 키 오류만 있는 부분 실패는 성공으로 취급합니다.
    pub async fn save(
        &self,
        records: &[Map<String, Value>],
        db: &str,
        collection: &str,
        index_fields: &[&str],
        unique: bool,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let coll = self.collection(db, collection);

        let index = IndexModel::builder()
            .keys(index_keys(index_fields))
            .options(IndexOptions::builder().unique(unique).build())
            .build();
        coll.create_index(index, None).await?;

        let documents: Vec<Document> = records
            .iter()
            .map(to_document)
            .collect::<Result<Vec<Document>>>()?;

        let options = InsertManyOptions::builder().ordered(false).build();
        match coll.insert_many(documents, options).await {
            Ok(result) => {
                debug!(
                    db = db,
                    collection = collection,
                    inserted = result.inserted_ids.len(),
                    "레코드 적재 완료"
                );
                Ok(())
            }
            Err(err) if is_duplicate_key_only(&err) => {
                debug!(db = db, collection = collection, "중복 레코드 생략");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// 조회 (`_id` 제외).
    pub async fn load(
        &self,
        db: &str,
        collection: &str,
        filter: Option<Document>,
    ) -> Result<Vec<Document>> {
        let options = FindOptions::builder().projection(doc! {"_id": 0}).build();
        let cursor = self.collection(db, collection).find(filter, options).await?;
        let documents = cursor.try_collect().await?;
        Ok(documents)
    }

    /// 컬렉션 문서 수.
    pub async fn count(&self, db: &str, collection: &str) -> Result<u64> {
        let count = self
            .collection(db, collection)
            .count_documents(None, None)
            .await?;
        Ok(count)
    }

    /// 조건에 맞는 문서 일괄 갱신. 갱신된 문서 수를 돌려줍니다.
    pub async fn update_many(
        &self,
        db: &str,
        collection: &str,
        query: Document,
        update: Document,
    ) -> Result<u64> {
        let result = self
            .collection(db, collection)
            .update_many(query, update, None)
            .await?;
        Ok(result.modified_count)
    }
}
