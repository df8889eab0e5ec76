//! Database integration tests against an in-memory SQLite database.
//!
//! Run with: `cargo test -p yatube-db --features test-utils`

#![allow(clippy::unwrap_used)]

use sea_orm::{EntityTrait, PaginatorTrait};
use yatube_common::AppError;
use yatube_db::entities::{Comment, Follow, Post, comment};
use yatube_db::repositories::{
    AuthorDeletion, CommentRepository, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};
use yatube_db::test_utils::{
    TestDatabase, at_minute, follow_model, group_model, post_model, user_model,
};

struct Repos {
    users: UserRepository,
    groups: GroupRepository,
    posts: PostRepository,
    comments: CommentRepository,
    follows: FollowRepository,
    db: TestDatabase,
}

async fn setup() -> Repos {
    let db = TestDatabase::sqlite().await.unwrap();
    let conn = db.connection();
    Repos {
        users: UserRepository::new(conn.clone()),
        groups: GroupRepository::new(conn.clone()),
        posts: PostRepository::new(conn.clone()),
        comments: CommentRepository::new(conn.clone()),
        follows: FollowRepository::new(conn),
        db,
    }
}

fn comment_model(id: &str, post_id: &str, author_id: &str) -> comment::ActiveModel {
    use sea_orm::Set;
    comment::ActiveModel {
        id: Set(id.to_string()),
        post_id: Set(post_id.to_string()),
        author_id: Set(author_id.to_string()),
        text: Set(format!("comment {id}")),
        created_at: Set(at_minute(0)),
    }
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let r = setup().await;
    r.users.create(user_model("leo")).await.unwrap();

    let mut again = user_model("leo");
    again.id = sea_orm::Set("other-id".to_string());
    again.token = sea_orm::Set(None);
    let result = r.users.create(again).await;

    assert!(matches!(result, Err(AppError::Conflict(_))), "{result:?}");
}

#[tokio::test]
async fn test_duplicate_group_slug_is_conflict() {
    let r = setup().await;
    r.groups.create(group_model("cats")).await.unwrap();

    let mut again = group_model("cats");
    again.id = sea_orm::Set("g-other".to_string());
    let result = r.groups.create(again).await;

    assert!(matches!(result, Err(AppError::Conflict(_))), "{result:?}");
}

#[tokio::test]
async fn test_group_delete_keeps_posts_without_group() {
    let r = setup().await;
    let author = r.users.create(user_model("leo")).await.unwrap();
    let group = r.groups.create(group_model("cats")).await.unwrap();
    r.posts
        .create(post_model("p1", &author.id, Some(&group.id), 1))
        .await
        .unwrap();

    let detached = r.groups.delete_detaching_posts(&group.id).await.unwrap();
    assert_eq!(detached, Some(1));

    let post = r.posts.get_by_id("p1").await.unwrap();
    assert_eq!(post.group_id, None);
    assert!(r.groups.find_by_slug("cats").await.unwrap().is_none());
}

#[tokio::test]
async fn test_group_delete_missing_returns_none() {
    let r = setup().await;
    assert_eq!(r.groups.delete_detaching_posts("nope").await.unwrap(), None);
}

#[tokio::test]
async fn test_author_delete_cascades() {
    let r = setup().await;
    let leo = r.users.create(user_model("leo")).await.unwrap();
    let ann = r.users.create(user_model("ann")).await.unwrap();

    r.posts.create(post_model("leo-1", &leo.id, None, 1)).await.unwrap();
    r.posts.create(post_model("ann-1", &ann.id, None, 2)).await.unwrap();
    // Ann comments on Leo's post, Leo comments on Ann's post.
    r.comments.create(comment_model("c1", "leo-1", &ann.id)).await.unwrap();
    r.comments.create(comment_model("c2", "ann-1", &leo.id)).await.unwrap();
    r.comments.create(comment_model("c3", "ann-1", &ann.id)).await.unwrap();
    r.follows.create(follow_model(&leo.id, &ann.id)).await.unwrap();
    r.follows.create(follow_model(&ann.id, &leo.id)).await.unwrap();

    let deletion = r.users.delete_cascade(&leo.id).await.unwrap();
    assert_eq!(
        deletion,
        Some(AuthorDeletion {
            posts: 1,
            comments: 2,
            follows: 2,
        })
    );

    let conn = r.db.connection();
    assert_eq!(Post::find().count(conn.as_ref()).await.unwrap(), 1);
    assert_eq!(Follow::find().count(conn.as_ref()).await.unwrap(), 0);
    let remaining: Vec<String> = Comment::find()
        .all(conn.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(remaining, vec!["c3".to_string()]);
}

#[tokio::test]
async fn test_post_delete_removes_comments() {
    let r = setup().await;
    let leo = r.users.create(user_model("leo")).await.unwrap();
    r.posts.create(post_model("p1", &leo.id, None, 1)).await.unwrap();
    r.comments.create(comment_model("c1", "p1", &leo.id)).await.unwrap();

    assert!(r.posts.delete("p1").await.unwrap());
    assert_eq!(r.comments.count_by_post("p1").await.unwrap(), 0);
    assert!(!r.posts.delete("p1").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_follow_is_conflict() {
    let r = setup().await;
    let leo = r.users.create(user_model("leo")).await.unwrap();
    let ann = r.users.create(user_model("ann")).await.unwrap();
    r.follows.create(follow_model(&leo.id, &ann.id)).await.unwrap();

    let mut again = follow_model(&leo.id, &ann.id);
    again.id = sea_orm::Set("f-again".to_string());
    let result = r.follows.create(again).await;

    assert!(matches!(result, Err(AppError::Conflict(_))), "{result:?}");
    assert_eq!(r.follows.count_followers(&ann.id).await.unwrap(), 1);
    assert_eq!(r.follows.count_following(&leo.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_self_follow_rejected_by_schema() {
    let r = setup().await;
    let leo = r.users.create(user_model("leo")).await.unwrap();

    let result = r.follows.create(follow_model(&leo.id, &leo.id)).await;

    assert!(result.is_err());
    assert!(!r.follows.is_following(&leo.id, &leo.id).await.unwrap());
}

#[tokio::test]
async fn test_pages_split_thirteen_posts() {
    let r = setup().await;
    let leo = r.users.create(user_model("leo")).await.unwrap();
    for i in 0..13 {
        r.posts
            .create(post_model(&format!("p{i:02}"), &leo.id, None, i))
            .await
            .unwrap();
    }

    let first = r.posts.page_all(None, 10).await.unwrap();
    let second = r.posts.page_all(Some("2"), 10).await.unwrap();
    let clamped = r.posts.page_all(Some("99"), 10).await.unwrap();

    assert_eq!(first.len(), 10);
    assert_eq!(first.items[0].id, "p12");
    assert_eq!(second.len(), 3);
    assert_eq!(second.items[2].id, "p00");
    assert_eq!(clamped.number, 2);
    assert_eq!(r.posts.count_by_author(&leo.id).await.unwrap(), 13);
}

#[tokio::test]
async fn test_group_and_author_pages_filter() {
    let r = setup().await;
    let leo = r.users.create(user_model("leo")).await.unwrap();
    let ann = r.users.create(user_model("ann")).await.unwrap();
    let cats = r.groups.create(group_model("cats")).await.unwrap();

    r.posts.create(post_model("a", &leo.id, Some(&cats.id), 1)).await.unwrap();
    r.posts.create(post_model("b", &ann.id, None, 2)).await.unwrap();
    r.posts.create(post_model("c", &ann.id, Some(&cats.id), 3)).await.unwrap();

    let in_group: Vec<String> = r
        .posts
        .page_by_group(&cats.id, None, 10)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.id)
        .collect();
    let by_ann: Vec<String> = r
        .posts
        .page_by_author(&ann.id, None, 10)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.id)
        .collect();

    assert_eq!(in_group, vec!["c", "a"]);
    assert_eq!(by_ann, vec!["c", "b"]);
}

#[tokio::test]
async fn test_followed_page_only_contains_followees() {
    let r = setup().await;
    let viewer = r.users.create(user_model("viewer")).await.unwrap();
    let leo = r.users.create(user_model("leo")).await.unwrap();
    let ann = r.users.create(user_model("ann")).await.unwrap();
    r.follows.create(follow_model(&viewer.id, &leo.id)).await.unwrap();

    r.posts.create(post_model("leo-1", &leo.id, None, 1)).await.unwrap();
    r.posts.create(post_model("ann-1", &ann.id, None, 2)).await.unwrap();
    r.posts.create(post_model("own-1", &viewer.id, None, 3)).await.unwrap();
    r.posts.create(post_model("leo-2", &leo.id, None, 4)).await.unwrap();

    let feed = r.posts.page_followed_by(&viewer.id, None, 10).await.unwrap();
    let ids: Vec<&str> = feed.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["leo-2", "leo-1"]);

    let lonely = r.posts.page_followed_by(&ann.id, None, 10).await.unwrap();
    assert!(lonely.is_empty());
    assert_eq!(lonely.num_pages, 1);
}

#[tokio::test]
async fn test_comments_listed_oldest_first() {
    use sea_orm::Set;

    let r = setup().await;
    let leo = r.users.create(user_model("leo")).await.unwrap();
    r.posts.create(post_model("p1", &leo.id, None, 1)).await.unwrap();

    let mut late = comment_model("late", "p1", &leo.id);
    late.created_at = Set(at_minute(9));
    r.comments.create(late).await.unwrap();
    let mut early = comment_model("early", "p1", &leo.id);
    early.created_at = Set(at_minute(2));
    r.comments.create(early).await.unwrap();

    let ids: Vec<String> = r
        .comments
        .find_by_post("p1")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["early", "late"]);
}
