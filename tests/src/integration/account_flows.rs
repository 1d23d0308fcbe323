//! # Account Flows
//!
//! Deleting an account removes its records and its group membership; the
//! group goes with it when the account was its last member. Records are
//! only reachable by their owner or an administrator.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_types::{Email, StatusClass};
    use tl_01_record_store::{RecordFilter, RecordQuery, RecordStore};
    use tl_04_access_gateway::{DeleteRecordRequest, DeleteRecordsRequest, RecordRequest, SessionCookies};

    fn len(response: &tl_04_access_gateway::GatewayResponse) -> usize {
        response.data.as_ref().unwrap().as_array().unwrap().len()
    }

    async fn record_ids(h: &Harness, cookies: &SessionCookies, username: &str) -> Vec<String> {
        let response = h
            .gateway
            .list_user_records(cookies, username, &RecordQuery::default())
            .await;
        assert_ok(&response);
        let data = response.data.unwrap();
        data.as_array()
            .unwrap()
            .iter()
            .map(|r| r["_id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_account_cascade() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;
        h.category(&root, "food", "red").await;
        h.record(&ann, "ann", "food", 10.0).await;
        h.record(&ann, "ann", "food", 20.0).await;
        h.record(&bob, "bob", "food", 5.0).await;
        assert_ok(&h.group(&ann, "family", &["bob"]).await);

        let response = h.gateway.delete_account(&root, &email("ann")).await;
        assert_ok(&response);
        let report = response.data.unwrap();
        assert_eq!(report["deletedRecords"], 2);
        assert_eq!(report["deletedFromGroup"], true);
        assert_eq!(report["groupEdit"]["kind"], "MemberRemoved");

        let family = h.store.find_group_by_name("family").await.unwrap().unwrap();
        assert_eq!(family.len(), 1);
        assert!(h.store.find_account_by_username("ann").await.unwrap().is_none());
        assert!(h.store.find_records(&RecordFilter::by_username("ann")).await.unwrap().is_empty());
        assert_eq!(h.store.find_records(&RecordFilter::by_username("bob")).await.unwrap().len(), 1);

        // Bob was the last member: the group goes too.
        let response = h.gateway.delete_account(&root, &email("bob")).await;
        assert_ok(&response);
        assert_eq!(response.data.unwrap()["groupEdit"]["kind"], "GroupDeleted");
        assert!(h.store.find_group_by_name("family").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_account_deletion_guards() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        h.admin("boss").await;

        let admin = h.gateway.delete_account(&root, &email("boss")).await;
        assert_eq!(admin.status, StatusClass::ClientError);

        let unknown = h.gateway.delete_account(&root, &email("ghost")).await;
        assert_eq!(unknown.status, StatusClass::ClientError);

        let malformed = h.gateway.delete_account(&root, "ghost").await;
        assert_eq!(malformed.status, StatusClass::ClientError);

        let regular = h.gateway.delete_account(&ann, &email("ann")).await;
        assert_eq!(regular.status, StatusClass::Unauthorized);

        let boss = Email::parse(&email("boss")).unwrap();
        assert!(h.store.find_account_by_email(&boss).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_records_owner_or_admin() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;
        h.category(&root, "food", "red").await;
        h.record(&ann, "ann", "food", 10.0).await;
        h.record(&root, "ann", "food", 50.0).await;

        let foreign = h
            .gateway
            .list_user_records(&bob, "ann", &RecordQuery::default())
            .await;
        assert_eq!(foreign.status, StatusClass::Unauthorized);

        let mismatched = h
            .gateway
            .create_record(
                &ann,
                "ann",
                &RecordRequest {
                    username: "bob".into(),
                    amount: 1.0,
                    category_type: "food".into(),
                },
            )
            .await;
        assert_eq!(mismatched.status, StatusClass::ClientError);

        let no_category = h
            .gateway
            .create_record(
                &ann,
                "ann",
                &RecordRequest {
                    username: "ann".into(),
                    amount: 1.0,
                    category_type: "ghost".into(),
                },
            )
            .await;
        assert_eq!(no_category.status, StatusClass::ClientError);

        let by_admin = h
            .gateway
            .list_user_records(&root, "ann", &RecordQuery::default())
            .await;
        assert_eq!(by_admin.data.unwrap().as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_record_query_windows() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        h.category(&root, "food", "red").await;
        h.record(&ann, "ann", "food", 10.0).await;
        h.record(&ann, "ann", "food", 50.0).await;

        let big = RecordQuery {
            min: Some("20".into()),
            ..RecordQuery::default()
        };
        let response = h.gateway.list_user_records(&ann, "ann", &big).await;
        let data = response.data.unwrap();
        assert_eq!(data.as_array().unwrap().len(), 1);
        assert_eq!(data[0]["amount"], 50.0);

        let today = RecordQuery {
            date: Some("2023-11-14".into()),
            ..RecordQuery::default()
        };
        let response = h.gateway.list_user_records(&ann, "ann", &today).await;
        assert_eq!(response.data.unwrap().as_array().unwrap().len(), 2);

        let conflicting = RecordQuery {
            date: Some("2023-11-14".into()),
            from: Some("2023-11-01".into()),
            ..RecordQuery::default()
        };
        let response = h.gateway.list_user_records(&ann, "ann", &conflicting).await;
        assert_eq!(response.status, StatusClass::ClientError);
    }

    // =========================================================================
    // Administration reads
    // =========================================================================

    #[tokio::test]
    async fn test_account_reads() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;

        let listed = h.gateway.list_accounts(&root).await;
        assert_ok(&listed);
        let data = listed.data.unwrap();
        let names: Vec<&str> = data
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["username"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["ann", "bob", "root"]);
        assert_eq!(data[2]["role"], "Admin");
        assert!(data[0].get("password_hash").is_none());
        assert_eq!(h.gateway.list_accounts(&ann).await.status, StatusClass::Unauthorized);

        let own = h.gateway.get_account(&ann, "ann").await;
        assert_ok(&own);
        assert_eq!(own.data.unwrap()["email"], email("ann"));
        assert_ok(&h.gateway.get_account(&root, "ann").await);
        assert_eq!(h.gateway.get_account(&bob, "ann").await.status, StatusClass::Unauthorized);
        assert_eq!(h.gateway.get_account(&root, "ghost").await.status, StatusClass::ClientError);
    }

    #[tokio::test]
    async fn test_record_reads_by_category() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;
        h.category(&root, "food", "red").await;
        h.category(&root, "rent", "blue").await;
        h.record(&ann, "ann", "food", 10.0).await;
        h.record(&ann, "ann", "rent", 700.0).await;
        h.record(&bob, "bob", "food", 3.0).await;

        let food = h.gateway.list_user_records_by_category(&ann, "ann", "food").await;
        assert_ok(&food);
        assert_eq!(len(&food), 1);
        assert_eq!(food.data.unwrap()[0]["color"], "red");

        let foreign = h.gateway.list_user_records_by_category(&bob, "ann", "food").await;
        assert_eq!(foreign.status, StatusClass::Unauthorized);
        let no_category = h.gateway.list_user_records_by_category(&ann, "ann", "ghost").await;
        assert_eq!(no_category.status, StatusClass::ClientError);
        let no_user = h.gateway.list_user_records_by_category(&root, "ghost", "food").await;
        assert_eq!(no_user.status, StatusClass::ClientError);

        let all = h.gateway.list_all_records(&root).await;
        assert_ok(&all);
        assert_eq!(len(&all), 3);
        assert_eq!(h.gateway.list_all_records(&ann).await.status, StatusClass::Unauthorized);
    }

    // =========================================================================
    // Record deletion
    // =========================================================================

    #[tokio::test]
    async fn test_delete_record_owner_or_admin() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;
        h.category(&root, "food", "red").await;
        h.record(&ann, "ann", "food", 10.0).await;
        h.record(&ann, "ann", "food", 20.0).await;
        h.record(&bob, "bob", "food", 5.0).await;
        let ann_ids = record_ids(&h, &ann, "ann").await;
        let bob_ids = record_ids(&h, &bob, "bob").await;

        let by_stranger = h
            .gateway
            .delete_record(&bob, "ann", &DeleteRecordRequest { id: ann_ids[0].clone() })
            .await;
        assert_eq!(by_stranger.status, StatusClass::Unauthorized);

        // The route names the owner; a record of someone else is refused.
        let not_owned = h
            .gateway
            .delete_record(&ann, "ann", &DeleteRecordRequest { id: bob_ids[0].clone() })
            .await;
        assert_eq!(not_owned.status, StatusClass::ClientError);

        let empty = h
            .gateway
            .delete_record(&ann, "ann", &DeleteRecordRequest { id: String::new() })
            .await;
        assert_eq!(empty.status, StatusClass::ClientError);

        assert_ok(
            &h.gateway
                .delete_record(&ann, "ann", &DeleteRecordRequest { id: ann_ids[0].clone() })
                .await,
        );
        assert_ok(
            &h.gateway
                .delete_record(&root, "ann", &DeleteRecordRequest { id: ann_ids[1].clone() })
                .await,
        );
        assert!(h.store.find_records(&RecordFilter::by_username("ann")).await.unwrap().is_empty());
        assert_eq!(h.store.record_count(), 1);

        let again = h
            .gateway
            .delete_record(&ann, "ann", &DeleteRecordRequest { id: ann_ids[0].clone() })
            .await;
        assert_eq!(again.status, StatusClass::ClientError);
    }

    #[tokio::test]
    async fn test_delete_records_batch() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;
        h.category(&root, "food", "red").await;
        h.record(&ann, "ann", "food", 10.0).await;
        h.record(&bob, "bob", "food", 5.0).await;
        let mut ids = record_ids(&h, &ann, "ann").await;
        ids.extend(record_ids(&h, &bob, "bob").await);

        let regular = h
            .gateway
            .delete_records(&ann, &DeleteRecordsRequest { ids: ids.clone() })
            .await;
        assert_eq!(regular.status, StatusClass::Unauthorized);

        let mut with_blank = ids.clone();
        with_blank.push(String::new());
        let blank = h
            .gateway
            .delete_records(&root, &DeleteRecordsRequest { ids: with_blank })
            .await;
        assert_eq!(blank.status, StatusClass::ClientError);

        let mut with_unknown = ids.clone();
        with_unknown.push(shared_types::RecordId::new().to_string());
        let unknown = h
            .gateway
            .delete_records(&root, &DeleteRecordsRequest { ids: with_unknown })
            .await;
        assert_eq!(unknown.status, StatusClass::ClientError);
        assert_eq!(h.store.record_count(), 2);

        let response = h.gateway.delete_records(&root, &DeleteRecordsRequest { ids }).await;
        assert_ok(&response);
        assert_eq!(response.data.unwrap()["deletedRecords"], 2);
        assert_eq!(h.store.record_count(), 0);
    }
}
