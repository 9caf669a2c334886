//! Integration tests for users and sessions.

use retro_forum::auth::{generate_session_token, hash_password, session_expiry, verify_password};
use retro_forum::db::{
    create_session, create_user, delete_session, get_session_by_token, get_user_by_username,
    Database,
};
use tempfile::TempDir;

async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

#[tokio::test]
async fn test_user_round_trip_with_hashed_password() {
    let (db, _tmp) = setup_db().await;

    let hash = hash_password("hunter2hunter2").unwrap();
    let id = create_user(db.pool(), "retro_fan", &hash).await.unwrap();
    assert!(id > 0);

    let user = get_user_by_username(db.pool(), "retro_fan")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(user.username, "retro_fan");
    assert!(verify_password("hunter2hunter2", &user.password_hash).unwrap());
    assert!(!verify_password("wrong", &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_username_lookup_is_case_insensitive() {
    let (db, _tmp) = setup_db().await;
    create_user(db.pool(), "CollectorKid", "hash").await.unwrap();

    let user = get_user_by_username(db.pool(), "collectorkid")
        .await
        .unwrap();
    assert!(user.is_some());
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (db, _tmp) = setup_db().await;
    create_user(db.pool(), "unique_name", "hash").await.unwrap();
    assert!(create_user(db.pool(), "unique_name", "hash").await.is_err());
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (db, _tmp) = setup_db().await;
    let user_id = create_user(db.pool(), "sessioned", "hash").await.unwrap();

    let token = generate_session_token();
    let expires_at = session_expiry(3600);
    create_session(db.pool(), user_id, &token, &expires_at)
        .await
        .unwrap();

    let session = get_session_by_token(db.pool(), &token)
        .await
        .unwrap()
        .expect("session should exist");
    assert_eq!(session.user_id, user_id);
    assert_eq!(session.expires_at, expires_at);

    delete_session(db.pool(), &token).await.unwrap();
    assert!(get_session_by_token(db.pool(), &token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_deleting_user_cascades_sessions() {
    let (db, _tmp) = setup_db().await;
    let user_id = create_user(db.pool(), "doomed", "hash").await.unwrap();

    let token = generate_session_token();
    create_session(db.pool(), user_id, &token, &session_expiry(3600))
        .await
        .unwrap();

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(db.pool())
        .await
        .unwrap();

    assert!(get_session_by_token(db.pool(), &token)
        .await
        .unwrap()
        .is_none());
}
