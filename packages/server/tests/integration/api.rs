use std::sync::Arc;

use serde_json::json;

use crate::common::{DeadImageProbe, TestApp, routes, valid_opinion};

mod pois {
    use super::*;

    #[tokio::test]
    async fn created_poi_is_listed_with_sign_names() {
        let app = TestApp::spawn().await;

        let id = app.create_poi("jordan").await;
        let res = app.get(routes::POIS).await;

        assert_eq!(res.status, 200);
        let pois = res.body.as_array().unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0]["id"], id);
        assert_eq!(pois[0]["sun_sign"], "Aries");
        assert_eq!(pois[0]["pluto_sign"], "Pisces");
    }

    #[tokio::test]
    async fn invalid_poi_reports_every_bad_field() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::POIS,
                &json!({"name": "", "pic_url": "nope", "sun_sign": "Dragon"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(
            res.error_fields(),
            ["name", "state", "pic_url", "sun_sign", "pluto_sign"]
        );
    }

    #[tokio::test]
    async fn dead_picture_is_a_validation_error() {
        let app = TestApp::spawn_with_probe(Arc::new(DeadImageProbe)).await;

        let res = app
            .post(
                routes::POIS,
                &json!({
                    "name": "Jordan",
                    "state": "NY",
                    "pic_url": "https://images.example.com/missing.png",
                    "sun_sign": "Aries",
                    "pluto_sign": "Pisces",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_fields(), ["pic_url"]);
    }

    #[tokio::test]
    async fn put_and_patch_both_update_only_supplied_fields() {
        let app = TestApp::spawn().await;
        let id = app.create_poi("jordan").await;

        let res = app.put(&routes::poi(id), &json!({"state": "TX"})).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["state"], "TX");
        assert_eq!(res.body["name"], "jordan");

        let res = app
            .patch(&routes::poi(id), &json!({"sun_sign": "Virgo"}))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["sun_sign"], "Virgo");
        assert_eq!(res.body["state"], "TX");
    }

    #[tokio::test]
    async fn vip_count_is_validated() {
        let app = TestApp::spawn().await;
        let id = app.create_poi("jordan").await;

        let res = app
            .patch(&routes::poi_vip_count(id), &json!({"vip_count": -3}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_fields(), ["vip_count"]);

        let res = app
            .patch(&routes::poi_vip_count(id), &json!({"vip_count": 4}))
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["vip_count"], 4);
    }

    #[tokio::test]
    async fn deleting_a_poi_removes_its_opinions() {
        let app = TestApp::spawn().await;
        let id = app.create_poi("jordan").await;
        app.create_opinion(id).await;

        let res = app.delete(&routes::poi(id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["opinions_deleted"], 1);

        assert_eq!(app.get(&routes::poi(id)).await.status, 404);
        let opinions = app.get(routes::OPINIONS).await;
        assert_eq!(opinions.body.as_array().unwrap().len(), 0);

        let again = app.delete(&routes::poi(id)).await;
        assert_eq!(again.status, 404);
        assert_eq!(again.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn non_numeric_id_gets_a_json_error_body() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{}/abc", routes::POIS)).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].is_string());
    }

    #[tokio::test]
    async fn opinions_of_unknown_poi_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::poi_opinions(5)).await;

        assert_eq!(res.status, 404);
    }
}

mod opinions {
    use super::*;

    #[tokio::test]
    async fn created_opinion_is_returned_in_structured_form() {
        let app = TestApp::spawn().await;
        let poi_id = app.create_poi("jordan").await;

        let res = app
            .post(
                routes::OPINIONS,
                &json!({"poi_id": poi_id, "opinion_data": valid_opinion()}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["opinion_data"], valid_opinion());
        assert_eq!(res.body["user_id"], 1);

        let listed = app.get(&routes::poi_opinions(poi_id)).await;
        assert_eq!(listed.status, 200);
        assert_eq!(listed.body[0]["opinion_data"], valid_opinion());
    }

    #[tokio::test]
    async fn duplicate_opinion_is_a_conflict() {
        let app = TestApp::spawn().await;
        let poi_id = app.create_poi("jordan").await;
        app.create_opinion(poi_id).await;

        let res = app
            .post(
                routes::OPINIONS,
                &json!({"poi_id": poi_id, "opinion_data": valid_opinion()}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn invalid_document_lists_violations() {
        let app = TestApp::spawn().await;
        let poi_id = app.create_poi("jordan").await;
        let mut document = valid_opinion();
        document["core"]["openness"] = json!(6);
        document["dating"]
            .as_object_mut()
            .unwrap()
            .remove("alpha_widow");

        let res = app
            .post(
                routes::OPINIONS,
                &json!({"poi_id": poi_id, "opinion_data": document}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.error_fields(), ["core.openness", "dating.alpha_widow"]);
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.post_raw(routes::OPINIONS, "{\"poi_id\": ").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let app = TestApp::spawn().await;
        let poi_id = app.create_poi("jordan").await;
        let id = app.create_opinion(poi_id).await;

        let first = app.delete(&routes::opinion(id)).await;
        assert_eq!(first.status, 200);
        assert_eq!(first.body["deleted"], true);

        let second = app.delete(&routes::opinion(id)).await;
        assert_eq!(second.status, 200);
        assert_eq!(second.body["deleted"], false);
    }

    #[tokio::test]
    async fn non_numeric_poi_filter_gets_a_json_error_body() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&format!("{}?poi_id=abc", routes::OPINIONS))
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn delete_with_non_numeric_id_gets_a_json_error_body() {
        let app = TestApp::spawn().await;

        let res = app.delete(&format!("{}/abc", routes::OPINIONS)).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn list_can_be_filtered_by_poi() {
        let app = TestApp::spawn().await;
        let first = app.create_poi("jordan").await;
        let second = app.create_poi("casey").await;
        app.create_opinion(first).await;
        let wanted = app.create_opinion(second).await;

        let res = app
            .get(&format!("{}?poi_id={second}", routes::OPINIONS))
            .await;

        assert_eq!(res.status, 200);
        let listed = res.body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], wanted);
    }
}
