//! # Group Flows
//!
//! Membership edits partition their candidates, never leave a group empty,
//! and never place an account in two groups, even when requests race.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_types::{Email, StatusClass};
    use std::sync::Arc;
    use tl_01_record_store::RecordStore;
    use tl_04_access_gateway::MembersRequest;

    fn members(names: &[&str]) -> MembersRequest {
        MembersRequest {
            emails: names.iter().map(|n| email(n)).collect(),
        }
    }

    fn member_count(response: &tl_04_access_gateway::GatewayResponse) -> usize {
        response.data.as_ref().unwrap()["group"]["members"]
            .as_array()
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_create_group_partitions_candidates() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        let carl = h.user("carl").await;
        h.user("bob").await;
        h.user("dan").await;
        assert_ok(&h.group(&carl, "others", &["dan"]).await);

        let response = h.group(&ann, "family", &["bob", "ghost", "carl", "bob"]).await;
        assert_ok(&response);
        assert_eq!(member_count(&response), 2);
        let report = response.data.unwrap();
        assert_eq!(report["membersNotFound"], serde_json::json!([email("ghost")]));
        assert_eq!(report["alreadyInGroup"], serde_json::json!([email("carl")]));

        let duplicate = h.group(&carl, "family", &["bob"]).await;
        assert_eq!(duplicate.status, StatusClass::ClientError);
    }

    #[tokio::test]
    async fn test_create_group_needs_another_member() {
        let h = Harness::new();
        let ann = h.user("ann").await;

        let alone = h.group(&ann, "solo", &["ann", "ghost"]).await;
        assert_eq!(alone.status, StatusClass::ClientError);
        assert!(h.store.find_group_by_name("solo").await.unwrap().is_none());

        let bad = h.group(&ann, "solo", &["not-an-email"]).await;
        assert_eq!(bad.status, StatusClass::ClientError);
    }

    #[tokio::test]
    async fn test_last_member_guard() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        h.user("bob").await;
        assert_ok(&h.group(&ann, "family", &["bob"]).await);

        let response = h.gateway.remove_members(&ann, "family", &members(&["bob"])).await;
        assert_ok(&response);
        assert_eq!(member_count(&response), 1);

        let response = h.gateway.remove_members(&ann, "family", &members(&["ann"])).await;
        assert_eq!(response.status, StatusClass::ClientError);

        let family = h.store.find_group_by_name("family").await.unwrap().unwrap();
        assert_eq!(family.len(), 1);
    }

    #[tokio::test]
    async fn test_removing_everyone_retains_first_member() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        h.user("bob").await;
        h.user("cat").await;
        let created = h.group(&ann, "family", &["bob", "cat"]).await;
        assert_ok(&created);

        let first = created.data.unwrap()["group"]["members"][0]["email"].clone();
        let response = h
            .gateway
            .remove_members(&ann, "family", &members(&["ann", "bob", "cat"]))
            .await;
        assert_ok(&response);
        assert_eq!(member_count(&response), 1);
        assert_eq!(response.data.unwrap()["retained"], first);
    }

    #[tokio::test]
    async fn test_membership_capabilities() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let eve = h.user("eve").await;
        h.user("bob").await;
        h.user("cat").await;
        assert_ok(&h.group(&ann, "family", &["bob"]).await);

        // Outsiders can neither read nor edit the group.
        assert_eq!(h.gateway.get_group(&eve, "family").await.status, StatusClass::Unauthorized);
        let response = h.gateway.add_members(&eve, "family", &members(&["cat"])).await;
        assert_eq!(response.status, StatusClass::Unauthorized);
        let response = h.gateway.insert_members(&ann, "family", &members(&["cat"])).await;
        assert_eq!(response.status, StatusClass::Unauthorized);

        assert_ok(&h.gateway.get_group(&ann, "family").await);
        assert_ok(&h.gateway.get_group(&root, "family").await);

        let response = h.gateway.insert_members(&root, "family", &members(&["cat"])).await;
        assert_ok(&response);
        assert_eq!(member_count(&response), 3);

        let response = h.gateway.pull_members(&root, "family", &members(&["cat"])).await;
        assert_ok(&response);
        assert_eq!(member_count(&response), 2);

        let missing = h.gateway.get_group(&root, "nope").await;
        assert_eq!(missing.status, StatusClass::ClientError);

        assert_eq!(h.gateway.delete_group(&ann, "family").await.status, StatusClass::Unauthorized);
        assert_ok(&h.gateway.delete_group(&root, "family").await);
        assert!(h.store.find_group_by_name("family").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_group_listing_is_admin_only() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let carl = h.user("carl").await;
        h.user("bob").await;
        h.user("dan").await;
        assert_ok(&h.group(&carl, "south", &["dan"]).await);
        assert_ok(&h.group(&ann, "north", &["bob"]).await);

        let listed = h.gateway.list_groups(&root).await;
        assert_ok(&listed);
        let data = listed.data.unwrap();
        assert_eq!(data[0]["name"], "north");
        assert_eq!(data[1]["name"], "south");
        assert_eq!(data[0]["members"].as_array().unwrap().len(), 2);

        assert_eq!(h.gateway.list_groups(&ann).await.status, StatusClass::Unauthorized);
    }

    #[tokio::test]
    async fn test_group_records() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;
        let eve = h.user("eve").await;
        h.category(&root, "food", "red").await;
        h.category(&root, "rent", "blue").await;
        h.record(&ann, "ann", "food", 10.0).await;
        h.record(&bob, "bob", "rent", 700.0).await;
        h.record(&eve, "eve", "food", 1.0).await;
        assert_ok(&h.group(&ann, "family", &["bob"]).await);

        let all = h.gateway.list_group_records(&bob, "family").await;
        assert_ok(&all);
        let data = all.data.unwrap();
        let owners: Vec<&str> = data
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["username"].as_str().unwrap())
            .collect();
        assert_eq!(owners.len(), 2);
        assert!(!owners.contains(&"eve"));

        let food = h.gateway.list_group_records_by_category(&root, "family", "food").await;
        assert_ok(&food);
        let data = food.data.unwrap();
        assert_eq!(data.as_array().unwrap().len(), 1);
        assert_eq!(data[0]["color"], "red");

        let outsider = h.gateway.list_group_records(&eve, "family").await;
        assert_eq!(outsider.status, StatusClass::Unauthorized);
        let outsider = h.gateway.list_group_records_by_category(&eve, "family", "food").await;
        assert_eq!(outsider.status, StatusClass::Unauthorized);

        let no_category = h.gateway.list_group_records_by_category(&ann, "family", "ghost").await;
        assert_eq!(no_category.status, StatusClass::ClientError);
        let no_group = h.gateway.list_group_records(&root, "nope").await;
        assert_eq!(no_group.status, StatusClass::ClientError);
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_adds_place_account_once() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        let carl = h.user("carl").await;
        h.user("bob").await;
        h.user("dan").await;
        h.user("zed").await;
        assert_ok(&h.group(&ann, "north", &["bob"]).await);
        assert_ok(&h.group(&carl, "south", &["dan"]).await);

        let north = {
            let gateway = Arc::clone(&h.gateway);
            tokio::spawn(async move { gateway.add_members(&ann, "north", &members(&["zed"])).await })
        };
        let south = {
            let gateway = Arc::clone(&h.gateway);
            tokio::spawn(async move { gateway.add_members(&carl, "south", &members(&["zed"])).await })
        };
        let results = [north.await.unwrap(), south.await.unwrap()];
        assert!(results.iter().any(|r| r.is_ok()));

        let zed = Email::parse(&email("zed")).unwrap();
        let holders = ["north", "south"];
        let mut count = 0;
        for name in holders {
            let group = h.store.find_group_by_name(name).await.unwrap().unwrap();
            if group.contains(&zed) {
                count += 1;
            }
        }
        assert_eq!(count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_removals_never_empty_group() {
        let h = Harness::new();
        let root = h.admin("root").await;
        let ann = h.user("ann").await;
        h.user("bob").await;
        h.user("cat").await;
        assert_ok(&h.group(&ann, "family", &["bob", "cat"]).await);

        let handles: Vec<_> = ["ann", "bob", "cat"]
            .into_iter()
            .map(|name| {
                let gateway = Arc::clone(&h.gateway);
                let root = root.clone();
                tokio::spawn(async move { gateway.pull_members(&root, "family", &members(&[name])).await })
            })
            .collect();
        for handle in handles {
            let response = handle.await.unwrap();
            assert_ne!(response.status, StatusClass::ServerError);
        }

        let family = h.store.find_group_by_name("family").await.unwrap().unwrap();
        assert!(!family.is_empty());
    }
}
