use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use thinker_core::{LocalAccountId, Order, OrderDirectory, StoreError};

use crate::{from_unix, store_error, SqliteStore};

#[async_trait]
impl OrderDirectory for SqliteStore {
    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT order_id, user_id, course_id, course_name, total, created_at
             FROM orders WHERE order_id = ?1",
            params![order_id],
            |row| {
                Ok(Order {
                    order_id: row.get(0)?,
                    user_id: LocalAccountId::new(row.get::<_, String>(1)?),
                    course_id: row.get(2)?,
                    course_name: row.get(3)?,
                    total: row.get(4)?,
                    created_at: from_unix(row.get(5)?),
                })
            },
        )
        .optional()
        .map_err(store_error)
    }
}

impl SqliteStore {
    /// Insert or replace an order row.
    pub async fn upsert_order(&self, order: &Order) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO orders (order_id, user_id, course_id, course_name, total, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(order_id) DO UPDATE SET
                user_id = excluded.user_id,
                course_id = excluded.course_id,
                course_name = excluded.course_name,
                total = excluded.total,
                created_at = excluded.created_at",
            params![
                order.order_id,
                order.user_id.as_str(),
                order.course_id,
                order.course_name,
                order.total,
                order.created_at.timestamp(),
            ],
        )
        .map_err(store_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn upsert_then_find() {
        let store = SqliteStore::in_memory().unwrap();
        let mut order = Order {
            order_id: 42,
            user_id: LocalAccountId::new("acc-1"),
            course_id: 7,
            course_name: "手沖入門".into(),
            total: 3200,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        };
        store.upsert_order(&order).await.unwrap();
        assert_eq!(store.find_order(42).await.unwrap(), Some(order.clone()));

        order.total = 2800;
        store.upsert_order(&order).await.unwrap();
        assert_eq!(store.find_order(42).await.unwrap().unwrap().total, 2800);

        assert!(store.find_order(99).await.unwrap().is_none());
    }
}
