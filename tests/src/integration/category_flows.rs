//! # Category Flows
//!
//! Deleting categories never strands records: they move to the oldest
//! surviving category, and the last category cannot be deleted.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_types::StatusClass;
    use tl_01_record_store::{RecordFilter, RecordQuery, RecordStore};
    use tl_04_access_gateway::CategoryRequest;

    #[tokio::test]
    async fn test_deleted_categories_merge_into_oldest() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        h.category(&root, "food", "red").await;
        h.category(&root, "rent", "blue").await;
        h.category(&root, "fun", "green").await;
        h.record(&ann, "ann", "rent", 700.0).await;
        h.record(&ann, "ann", "fun", 30.0).await;

        let response = h
            .gateway
            .delete_categories(&root, &["rent".to_string(), "fun".to_string()])
            .await;
        assert_ok(&response);
        let report = response.data.unwrap();
        assert_eq!(report["fallback"], "food");
        assert_eq!(report["reassignedRecords"], 2);

        let records = h.store.find_records(&RecordFilter::by_username("ann")).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.category_type == "food"));

        let listed = h
            .gateway
            .list_user_records(&ann, "ann", &RecordQuery::default())
            .await;
        let data = listed.data.unwrap();
        assert!(data.as_array().unwrap().iter().all(|r| r["color"] == "red"));
    }

    #[tokio::test]
    async fn test_deleting_every_category_keeps_oldest() {
        let h = Harness::new();
        let root = h.admin("root").await;
        h.category(&root, "food", "red").await;
        h.category(&root, "rent", "blue").await;

        let all = vec!["rent".to_string(), "food".to_string()];
        let response = h.gateway.delete_categories(&root, &all).await;
        assert_ok(&response);
        let report = response.data.unwrap();
        assert_eq!(report["removed"], serde_json::json!(["rent"]));
        assert_eq!(report["fallback"], "food");

        let remaining = h.store.list_categories().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category_type, "food");
    }

    #[tokio::test]
    async fn test_last_category_and_unknown_labels() {
        let h = Harness::new();
        let root = h.admin("root").await;
        h.category(&root, "food", "red").await;

        let last = h.gateway.delete_categories(&root, &["food".to_string()]).await;
        assert_eq!(last.status, StatusClass::ClientError);

        h.category(&root, "rent", "blue").await;
        let unknown = h.gateway.delete_categories(&root, &["ghost".to_string()]).await;
        assert_eq!(unknown.status, StatusClass::ClientError);

        let empty = h.gateway.delete_categories(&root, &[]).await;
        assert_eq!(empty.status, StatusClass::ClientError);
        assert_eq!(h.store.count_categories().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rename_moves_records() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        h.category(&root, "food", "red").await;
        h.category(&root, "rent", "blue").await;
        h.record(&ann, "ann", "food", 12.0).await;

        let rename = CategoryRequest {
            category_type: "groceries".into(),
            color: "orange".into(),
        };
        let response = h.gateway.update_category(&root, "food", &rename).await;
        assert_ok(&response);
        assert_eq!(response.data.unwrap()["reassignedRecords"], 1);

        let records = h.store.find_records(&RecordFilter::by_category("groceries")).await.unwrap();
        assert_eq!(records.len(), 1);

        let clash = CategoryRequest {
            category_type: "rent".into(),
            color: "black".into(),
        };
        let response = h.gateway.update_category(&root, "groceries", &clash).await;
        assert_eq!(response.status, StatusClass::ClientError);

        let missing = h.gateway.update_category(&root, "food", &rename).await;
        assert_eq!(missing.status, StatusClass::ClientError);
    }

    #[tokio::test]
    async fn test_category_writes_are_admin_only() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        h.category(&root, "food", "red").await;
        h.category(&root, "rent", "blue").await;

        let response = h.gateway.delete_categories(&ann, &["rent".to_string()]).await;
        assert_eq!(response.status, StatusClass::Unauthorized);
        assert_eq!(h.store.count_categories().await.unwrap(), 2);

        // Reading is open to any authenticated caller.
        let listed = h.gateway.list_categories(&ann).await;
        assert_eq!(listed.data.unwrap().as_array().unwrap().len(), 2);
    }
}
