//! Tests for posts module
//!
//! Post store ownership rules, like toggling and timeline composition.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::test_support::{
        caller_for, file_state, json_request, memory_state, seed_user, send, session_token,
        with_state,
    };
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tempfile::TempDir;
    use crate::common::ApiError;
    use crate::users::Identifier;
    use models::{CreatePostRequest, LikeOutcome, Post, UpdatePostRequest};

    fn text_post(description: &str) -> CreatePostRequest {
        CreatePostRequest {
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    fn descriptions(posts: &[Post]) -> Vec<&str> {
        posts
            .iter()
            .filter_map(|p| p.description.as_deref())
            .collect()
    }

    #[test]
    fn test_create_request_accepts_legacy_field_names() {
        let request: CreatePostRequest =
            serde_json::from_str(r#"{"userId":"U_AAAAAA","desc":"hello","img":"a.png"}"#).unwrap();

        assert_eq!(request.owner_id.as_deref(), Some("U_AAAAAA"));
        assert_eq!(request.description.as_deref(), Some("hello"));
        assert_eq!(request.image.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_toggle_like_in_memory() {
        let mut post = Post {
            id: "P_AAAAAA".to_string(),
            owner_id: "U_AAAAAA".to_string(),
            description: None,
            image: None,
            likes: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        };

        assert_eq!(post.toggle_like("U_BBBBBB"), LikeOutcome::Liked);
        assert_eq!(post.likes, vec!["U_BBBBBB".to_string()]);
        assert_eq!(post.toggle_like("U_BBBBBB"), LikeOutcome::Disliked);
        assert!(post.likes.is_empty());
    }

    #[test]
    fn test_like_outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_value(LikeOutcome::Liked).unwrap(), "liked");
        assert_eq!(serde_json::to_value(LikeOutcome::Disliked).unwrap(), "disliked");
    }

    #[tokio::test]
    async fn test_create_and_get_post() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let store = state.post_store();

        let post = store.create(&alice.id, text_post("hello")).await.unwrap();
        assert!(post.id.starts_with("P_"));
        assert_eq!(post.owner_id, alice.id);
        assert!(post.likes.is_empty());

        let fetched = store.get(&post.id).await.unwrap();
        assert_eq!(fetched, post);
    }

    #[tokio::test]
    async fn test_create_ignores_claimed_owner() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let bob = seed_user(&state, "user_b", "bob").await;

        let request = CreatePostRequest {
            owner_id: Some(bob.id.clone()),
            description: Some("mine".to_string()),
            image: None,
        };
        let post = state.post_store().create(&alice.id, request).await.unwrap();

        assert_eq!(post.owner_id, alice.id);
    }

    #[tokio::test]
    async fn test_get_missing_post_is_not_found() {
        let state = memory_state().await;
        assert!(matches!(
            state.post_store().get("P_ZZZZZZ").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_owner_can_update_post() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let store = state.post_store();
        let post = store.create(&alice.id, text_post("before")).await.unwrap();

        store
            .update(
                &post.id,
                &caller_for(&alice, false),
                &UpdatePostRequest {
                    description: Some("after".to_string()),
                    image: None,
                },
            )
            .await
            .unwrap();

        let updated = store.get(&post.id).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("after"));
        assert_eq!(updated.owner_id, alice.id);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_update_or_delete() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let bob = seed_user(&state, "user_b", "bob").await;
        let store = state.post_store();
        let post = store.create(&alice.id, text_post("hello")).await.unwrap();
        let intruder = caller_for(&bob, false);

        match store
            .update(&post.id, &intruder, &UpdatePostRequest::default())
            .await
        {
            Err(ApiError::Forbidden(msg)) => assert_eq!(msg, "You can update only your post"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
        match store.delete(&post.id, &intruder).await {
            Err(ApiError::Forbidden(msg)) => assert_eq!(msg, "You can delete only your post"),
            other => panic!("expected Forbidden, got {:?}", other),
        }

        assert_eq!(store.get(&post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_admin_can_delete_any_post() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let root = seed_user(&state, "user_root", "root").await;
        let store = state.post_store();
        let post = store.create(&alice.id, text_post("hello")).await.unwrap();

        store.delete(&post.id, &caller_for(&root, true)).await.unwrap();

        assert!(matches!(store.get(&post.id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_likes() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let bob = seed_user(&state, "user_b", "bob").await;
        let store = state.post_store();
        let post = store.create(&alice.id, text_post("hello")).await.unwrap();

        assert_eq!(
            store.toggle_like(&post.id, &bob.id).await.unwrap(),
            LikeOutcome::Liked
        );
        assert_eq!(store.get(&post.id).await.unwrap().likes, vec![bob.id.clone()]);

        assert_eq!(
            store.toggle_like(&post.id, &bob.id).await.unwrap(),
            LikeOutcome::Disliked
        );
        assert!(store.get(&post.id).await.unwrap().likes.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_like_missing_post_is_not_found() {
        let state = memory_state().await;
        assert!(matches!(
            state.post_store().toggle_like("P_ZZZZZZ", "U_AAAAAA").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_timeline_is_own_posts_then_followings_in_order() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let bob = seed_user(&state, "user_b", "bob").await;
        let carol = seed_user(&state, "user_c", "carol").await;
        let graph = state.graph();
        let store = state.post_store();

        graph.follow(&alice.id, &carol.id).await.unwrap();
        graph.follow(&alice.id, &bob.id).await.unwrap();

        store.create(&bob.id, text_post("b1")).await.unwrap();
        store.create(&alice.id, text_post("a1")).await.unwrap();
        store.create(&carol.id, text_post("c1")).await.unwrap();
        store.create(&alice.id, text_post("a2")).await.unwrap();
        store.create(&carol.id, text_post("c2")).await.unwrap();

        let timeline = state
            .timeline()
            .get_timeline(&Identifier::parse(&alice.id))
            .await
            .unwrap();
        assert_eq!(descriptions(&timeline), vec!["a1", "a2", "c1", "c2", "b1"]);

        let by_external = state
            .timeline()
            .get_timeline(&Identifier::parse("user_a"))
            .await
            .unwrap();
        assert_eq!(by_external, timeline);
    }

    #[tokio::test]
    async fn test_timeline_skips_deleted_followings() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let bob = seed_user(&state, "user_b", "bob").await;
        let store = state.post_store();

        state.graph().follow(&alice.id, &bob.id).await.unwrap();
        store.create(&bob.id, text_post("orphan")).await.unwrap();
        store.create(&alice.id, text_post("mine")).await.unwrap();
        state.identity().delete_by_internal_id(&bob.id).await.unwrap();

        let timeline = state
            .timeline()
            .get_timeline(&Identifier::parse(&alice.id))
            .await
            .unwrap();
        assert_eq!(descriptions(&timeline), vec!["mine"]);

        // Deleting a user leaves their posts in place
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_timeline_for_unknown_user_is_not_found() {
        let state = memory_state().await;
        assert!(matches!(
            state
                .timeline()
                .get_timeline(&Identifier::parse("user_nobody"))
                .await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_feed_by_username() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let bob = seed_user(&state, "user_b", "bob").await;
        let store = state.post_store();

        store.create(&alice.id, text_post("a1")).await.unwrap();
        store.create(&bob.id, text_post("b1")).await.unwrap();

        let feed = state.timeline().get_profile_feed("alice").await.unwrap();
        assert_eq!(descriptions(&feed), vec!["a1"]);

        assert!(matches!(
            state.timeline().get_profile_feed("nobody").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_likes_are_all_recorded() {
        let dir = TempDir::new().unwrap();
        let state = file_state(dir.path(), 10).await;
        let owner = seed_user(&state, "user_owner", "owner").await;
        let post = state
            .post_store()
            .create(&owner.id, text_post("popular"))
            .await
            .unwrap();

        let mut likers = Vec::new();
        for i in 0..20 {
            likers.push(seed_user(&state, &format!("user_liker{}", i), &format!("liker{}", i)).await);
        }

        let tasks = likers.iter().map(|liker| {
            let posts = state.post_store();
            let post_id = post.id.clone();
            let liker_id = liker.id.clone();
            tokio::spawn(async move { posts.toggle_like(&post_id, &liker_id).await })
        });
        for outcome in futures::future::join_all(tasks).await {
            assert_eq!(outcome.expect("like task").expect("like"), LikeOutcome::Liked);
        }

        let post = state.post_store().get(&post.id).await.unwrap();
        assert_eq!(post.likes.len(), 20);
    }

    #[tokio::test]
    async fn test_timeline_me_route_is_not_captured_by_user_id() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        state
            .post_store()
            .create(&alice.id, text_post("a1"))
            .await
            .unwrap();

        let token = session_token("user_a");
        let app = with_state(posts_routes(), state);
        let (status, body) = send(
            app,
            json_request(Method::GET, "/api/posts/timeline/me", Some(&token), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["description"], "a1");
        assert_eq!(body[0]["ownerId"], json!(alice.id));
    }

    #[tokio::test]
    async fn test_timeline_route_by_user_id() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        state
            .post_store()
            .create(&alice.id, text_post("a1"))
            .await
            .unwrap();

        let app = with_state(posts_routes(), state);
        let (status, body) = send(
            app,
            json_request(Method::GET, &format!("/api/posts/timeline/{}", alice.id), None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["description"], "a1");
    }

    #[tokio::test]
    async fn test_missing_post_route_is_not_found() {
        let state = memory_state().await;

        let app = with_state(posts_routes(), state);
        let (status, body) = send(
            app,
            json_request(Method::GET, "/api/posts/P_ZZZZZZ", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Post not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_route_requires_token_and_owns_post() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let app = with_state(posts_routes(), state);

        let (status, _) = send(
            app.clone(),
            json_request(Method::POST, "/api/posts", None, Some(json!({ "description": "hi" }))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = session_token("user_a");
        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/api/posts",
                Some(&token),
                Some(json!({ "description": "hi", "ownerId": "U_ZZZZZZ" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ownerId"], json!(alice.id));
    }

    #[tokio::test]
    async fn test_like_route_toggles() {
        let state = memory_state().await;
        let alice = seed_user(&state, "user_a", "alice").await;
        let post = state
            .post_store()
            .create(&alice.id, text_post("a1"))
            .await
            .unwrap();

        let token = session_token("user_a");
        let app = with_state(posts_routes(), state);
        let uri = format!("/api/posts/{}/like", post.id);

        let (status, body) = send(app.clone(), json_request(Method::PUT, &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "liked");

        let (_, body) = send(app, json_request(Method::PUT, &uri, Some(&token), None)).await;
        assert_eq!(body["status"], "disliked");
    }
}
