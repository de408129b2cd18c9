//! `thinker import-orders`: load course orders into the local directory the
//! notification route reads from.

use std::path::Path;

use anyhow::{Context, Result};
use thinker_core::Order;
use thinker_store::SqliteStore;
use tracing::info;

/// Read a JSON array of orders (camelCase fields).
pub async fn read_orders(path: &Path) -> Result<Vec<Order>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read orders file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse orders file: {}", path.display()))
}

/// Upsert every order; returns how many were written.
pub async fn import(store: &SqliteStore, orders: &[Order]) -> Result<usize> {
    for order in orders {
        store.upsert_order(order).await?;
    }
    info!(count = orders.len(), "Imported orders");
    Ok(orders.len())
}

pub async fn run(store_path: &str, file: &Path) -> Result<()> {
    let orders = read_orders(file).await?;
    let store = SqliteStore::open(store_path)?;
    let count = import(&store, &orders).await?;
    println!("✅ Imported {count} order(s) into {store_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use thinker_core::OrderDirectory;

    use super::*;

    #[tokio::test]
    async fn imports_json_orders() {
        let dir = std::env::temp_dir().join(format!("thinker-orders-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let file = dir.join("orders.json");
        tokio::fs::write(
            &file,
            r#"[
                {"orderId": 7, "userId": "acc-1", "courseId": 3, "courseName": "手沖入門",
                 "total": 3200, "createdAt": "2025-03-01T08:00:00Z"},
                {"orderId": 8, "userId": "acc-2", "courseId": 4, "courseName": "拉花",
                 "total": 4500, "createdAt": "2025-03-02T08:00:00Z"}
            ]"#,
        )
        .await
        .unwrap();

        let orders = read_orders(&file).await.unwrap();
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(import(&store, &orders).await.unwrap(), 2);

        let found = store.find_order(7).await.unwrap().unwrap();
        assert_eq!(found.course_name, "手沖入門");
        assert_eq!(found.total, 3200);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let file = std::env::temp_dir().join(format!("thinker-bad-{}.json", std::process::id()));
        tokio::fs::write(&file, "{not json").await.unwrap();
        assert!(read_orders(&file).await.is_err());
        tokio::fs::remove_file(&file).await.unwrap();
    }
}
