use std::time::Duration;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use streetreview::entity::{opinion, person_of_interest, review, user::SYSTEM_USER_ID};
use streetreview::store::{OpinionStore, PoiLifecycle, PoiPatch, StoreError};

use crate::common::{DeadImageProbe, TestDb, new_poi, valid_opinion};

async fn opinion_count(test_db: &TestDb, poi_id: i32) -> u64 {
    opinion::Entity::find()
        .filter(opinion::Column::PoiId.eq(poi_id))
        .count(&test_db.db)
        .await
        .unwrap()
}

async fn review_count(test_db: &TestDb, poi_id: i32) -> u64 {
    review::Entity::find()
        .filter(review::Column::PoiId.eq(poi_id))
        .count(&test_db.db)
        .await
        .unwrap()
}

mod create {
    use super::*;

    #[tokio::test]
    async fn signs_are_resolved_and_text_is_trimmed() {
        let test_db = TestDb::migrated().await;
        let mut input = new_poi("jordan");
        input.name = "  Jordan  ".into();

        let poi = PoiLifecycle::new(&test_db.db)
            .create(SYSTEM_USER_ID, input)
            .await
            .unwrap();

        assert_eq!(poi.name, "Jordan");
        assert_eq!(poi.sun_sign.as_deref(), Some("Leo"));
        assert_eq!(poi.pluto_sign.as_deref(), Some("Scorpio"));
        assert_eq!(poi.vip_count, 0);
        assert_eq!(poi.user_id, SYSTEM_USER_ID);
    }

    #[tokio::test]
    async fn unknown_sign_is_rejected_and_nothing_is_written() {
        let test_db = TestDb::migrated().await;
        let mut input = new_poi("jordan");
        input.sun_sign = "Ophiuchus".into();
        input.state = " ".into();

        let err = PoiLifecycle::new(&test_db.db)
            .create(SYSTEM_USER_ID, input)
            .await
            .unwrap_err();

        let errors = match err {
            StoreError::Validation(errors) => errors,
            other => panic!("expected Validation, got {other:?}"),
        };
        assert!(errors.has_field("sun_sign"));
        assert!(errors.has_field("state"));
        let stored = person_of_interest::Entity::find()
            .count(&test_db.db)
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn dead_picture_url_is_rejected_when_probing() {
        let test_db = TestDb::migrated().await;
        let probe = DeadImageProbe;

        let err = PoiLifecycle::new(&test_db.db)
            .with_image_probe(&probe)
            .create(SYSTEM_USER_ID, new_poi("jordan"))
            .await
            .unwrap_err();

        let errors = match err {
            StoreError::Validation(errors) => errors,
            other => panic!("expected Validation, got {other:?}"),
        };
        assert!(errors.has_field("pic_url"));
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn patch_touches_only_supplied_fields_and_refreshes_timestamp() {
        let test_db = TestDb::migrated().await;
        let lifecycle = PoiLifecycle::new(&test_db.db);
        let before = lifecycle
            .create(SYSTEM_USER_ID, new_poi("jordan"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let after = lifecycle
            .update(
                before.id,
                PoiPatch {
                    state: Some("TX".into()),
                    pluto_sign: Some("Aquarius".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after.state, "TX");
        assert_eq!(after.pluto_sign.as_deref(), Some("Aquarius"));
        assert_eq!(after.name, before.name);
        assert_eq!(after.pic_url, before.pic_url);
        assert_eq!(after.sun_sign, before.sun_sign);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn patch_with_unchanged_values_keeps_timestamp() {
        let test_db = TestDb::migrated().await;
        let lifecycle = PoiLifecycle::new(&test_db.db);
        let before = lifecycle
            .create(SYSTEM_USER_ID, new_poi("jordan"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let after = lifecycle
            .update(
                before.id,
                PoiPatch {
                    name: Some(before.name.clone()),
                    sun_sign: Some("Leo".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_the_row_alone() {
        let test_db = TestDb::migrated().await;
        let lifecycle = PoiLifecycle::new(&test_db.db);
        let before = lifecycle
            .create(SYSTEM_USER_ID, new_poi("jordan"))
            .await
            .unwrap();

        let err = lifecycle
            .update(
                before.id,
                PoiPatch {
                    name: Some("Renamed".into()),
                    pic_url: Some("not a url".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
        assert_eq!(lifecycle.get(before.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn unknown_poi_is_not_found() {
        let test_db = TestDb::migrated().await;

        let err = PoiLifecycle::new(&test_db.db)
            .update(
                404,
                PoiPatch {
                    name: Some("Nobody".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn vip_count_must_not_be_negative() {
        let test_db = TestDb::migrated().await;
        let poi_id = test_db.create_poi("jordan").await;
        let lifecycle = PoiLifecycle::new(&test_db.db);

        let err = lifecycle.set_vip_count(poi_id, -1).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");

        let poi = lifecycle.set_vip_count(poi_id, 7).await.unwrap();
        assert_eq!(poi.vip_count, 7);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn poi_goes_together_with_its_opinions_and_reviews() {
        let test_db = TestDb::migrated().await;
        let target = test_db.create_poi("jordan").await;
        let bystander = test_db.create_poi("casey").await;
        let alice = test_db.create_user("alice").await;
        let opinions = OpinionStore::new(&test_db.db);
        opinions
            .create(target, SYSTEM_USER_ID, valid_opinion())
            .await
            .unwrap();
        opinions.create(target, alice, valid_opinion()).await.unwrap();
        opinions
            .create(bystander, SYSTEM_USER_ID, valid_opinion())
            .await
            .unwrap();
        test_db.create_review(target, "met at a bar").await;

        let deletion = PoiLifecycle::new(&test_db.db).delete(target).await.unwrap();

        assert_eq!(deletion.opinions_deleted, 2);
        assert_eq!(deletion.reviews_deleted, 1);
        assert_eq!(opinion_count(&test_db, target).await, 0);
        assert_eq!(review_count(&test_db, target).await, 0);
        assert!(
            person_of_interest::Entity::find_by_id(target)
                .one(&test_db.db)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(opinion_count(&test_db, bystander).await, 1);
    }

    #[tokio::test]
    async fn failure_mid_delete_rolls_everything_back() {
        let test_db = TestDb::migrated().await;
        let target = test_db.create_poi("jordan").await;
        let alice = test_db.create_user("alice").await;
        let opinions = OpinionStore::new(&test_db.db);
        opinions
            .create(target, SYSTEM_USER_ID, valid_opinion())
            .await
            .unwrap();
        opinions.create(target, alice, valid_opinion()).await.unwrap();
        test_db.create_review(target, "met at a bar").await;
        test_db
            .db
            .execute_unprepared(
                "CREATE TRIGGER fail_opinion_delete BEFORE DELETE ON opinions \
                 BEGIN SELECT RAISE(ABORT, 'simulated failure'); END",
            )
            .await
            .unwrap();

        let err = PoiLifecycle::new(&test_db.db)
            .delete(target)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Storage(_)), "got {err:?}");
        assert_eq!(opinion_count(&test_db, target).await, 2);
        // Reviews are deleted before opinions; the rollback must restore them.
        assert_eq!(review_count(&test_db, target).await, 1);
        assert!(
            person_of_interest::Entity::find_by_id(target)
                .one(&test_db.db)
                .await
                .unwrap()
                .is_some()
        );

        test_db
            .db
            .execute_unprepared("DROP TRIGGER fail_opinion_delete")
            .await
            .unwrap();
        let deletion = PoiLifecycle::new(&test_db.db).delete(target).await.unwrap();
        assert_eq!(deletion.opinions_deleted, 2);
    }

    #[tokio::test]
    async fn unknown_poi_is_not_found() {
        let test_db = TestDb::migrated().await;

        let err = PoiLifecycle::new(&test_db.db).delete(77).await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn list_returns_every_poi_with_sign_names() {
        let test_db = TestDb::migrated().await;
        test_db.create_poi("jordan").await;
        test_db.create_poi("casey").await;

        let pois = PoiLifecycle::new(&test_db.db).list().await.unwrap();

        let names: Vec<&str> = pois.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["jordan", "casey"]);
        assert!(pois.iter().all(|p| p.sun_sign.as_deref() == Some("Leo")));
    }

    #[tokio::test]
    async fn get_unknown_poi_is_not_found() {
        let test_db = TestDb::migrated().await;

        let err = PoiLifecycle::new(&test_db.db).get(1).await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
    }
}
