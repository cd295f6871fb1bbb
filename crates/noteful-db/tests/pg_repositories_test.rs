//! PostgreSQL repository tests.
//!
//! These need a live database (see `TEST_DATABASE_URL`) and are ignored by
//! default. Run with `cargo test -p noteful-db -- --ignored`.

use noteful_db::test_fixtures::{test_database_url, TestDatabase};
use noteful_db::{
    new_v7, Error, FolderDraft, FolderRepository, NoteDraft, NoteFilter, NoteRepository,
    PoolConfig, TagDraft, TagRepository,
};

fn folder(name: &str) -> FolderDraft {
    FolderDraft {
        name: name.to_string(),
    }
}

fn tag(name: &str) -> TagDraft {
    TagDraft {
        name: name.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_folder_create_then_get_returns_same_document() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let created = db.folders.create(&folder("Archive")).await.unwrap();
    let fetched = db.folders.get(created.id).await.unwrap().unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.created_at, fetched.updated_at);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_folder_name_is_duplicate_key() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    db.folders.create(&folder("Work")).await.unwrap();
    let err = db.folders.create(&folder("Work")).await.unwrap_err();

    assert!(
        matches!(err, Error::DuplicateKey(ref c) if c == "folder_name_key"),
        "unexpected error: {err:?}"
    );
    assert_eq!(db.folders.list().await.unwrap().len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_tag_rename_conflict_is_duplicate_key() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    db.tags.create(&tag("foo")).await.unwrap();
    let bar = db.tags.create(&tag("bar")).await.unwrap();

    let err = db.tags.update(bar.id, &tag("foo")).await.unwrap_err();
    assert!(err.is_duplicate_key());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_folders_are_listed_by_name() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    for name in ["Work", "archive", "Archive", "Personal"] {
        db.folders.create(&folder(name)).await.unwrap();
    }
    let names: Vec<String> = db
        .folders
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    // Byte order: uppercase sorts before lowercase.
    assert_eq!(names, ["Archive", "Personal", "Work", "archive"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_and_delete_missing_ids() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;
    let missing = new_v7();

    assert!(db.folders.update(missing, &folder("x")).await.unwrap().is_none());
    assert!(!db.folders.delete(missing).await.unwrap());
    assert!(db
        .notes
        .update(missing, &NoteDraft::new("t", None, None, None))
        .await
        .unwrap()
        .is_none());
    assert!(!db.notes.delete(missing).await.unwrap());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_note_list_filters() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let work = db.folders.create(&folder("Work")).await.unwrap();
    let t = db.tags.create(&tag("cats")).await.unwrap();

    let a = db
        .notes
        .create(&NoteDraft::new("Why cats rule", None, Some(work.id), None))
        .await
        .unwrap();
    let b = db
        .notes
        .create(&NoteDraft::new("CATS and dogs", None, None, Some(vec![t.id])))
        .await
        .unwrap();
    let _c = db
        .notes
        .create(&NoteDraft::new("100% dogs", None, Some(work.id), None))
        .await
        .unwrap();

    let by_term = db
        .notes
        .list(&NoteFilter {
            search_term: Some("cat".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        by_term.iter().map(|n| n.id).collect::<Vec<_>>(),
        vec![a.id, b.id]
    );

    let both = db
        .notes
        .list(&NoteFilter {
            search_term: Some("cat".into()),
            folder_id: Some(work.id),
            tag_id: None,
        })
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].id, a.id);

    let by_tag = db
        .notes
        .list(&NoteFilter {
            tag_id: Some(t.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, b.id);

    // Wildcards in the term are literal.
    let percent = db
        .notes
        .list(&NoteFilter {
            search_term: Some("%".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(percent.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_remove_tag_pulls_id_from_notes() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let t1 = db.tags.create(&tag("t1")).await.unwrap();
    let t2 = db.tags.create(&tag("t2")).await.unwrap();
    let note = db
        .notes
        .create(&NoteDraft::new("tagged", None, None, Some(vec![t1.id, t2.id])))
        .await
        .unwrap();

    assert!(db.tags.delete(t1.id).await.unwrap());
    assert_eq!(db.notes.remove_tag(t1.id).await.unwrap(), 1);

    let note = db.notes.get(note.id).await.unwrap().unwrap();
    assert_eq!(note.tags, vec![t2.id]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_note_update_tags_null_keeps_existing() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let t = new_v7();
    let note = db
        .notes
        .create(&NoteDraft::new("a", Some("body".into()), None, Some(vec![t])))
        .await
        .unwrap();

    let updated = db
        .notes
        .update(note.id, &NoteDraft::new("b", None, None, None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "b");
    assert_eq!(updated.content, None);
    assert_eq!(updated.tags, vec![t]);

    let cleared = db
        .notes
        .update(note.id, &NoteDraft::new("b", None, None, Some(vec![])))
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.tags.is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_clear_folder_unfiles_notes() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let f = db.folders.create(&folder("Doomed")).await.unwrap();
    let note = db
        .notes
        .create(&NoteDraft::new("filed", None, Some(f.id), None))
        .await
        .unwrap();

    db.folders.delete(f.id).await.unwrap();
    assert_eq!(db.notes.clear_folder(f.id).await.unwrap(), 1);
    assert_eq!(db.notes.get(note.id).await.unwrap().unwrap().folder_id, None);

    test_db.cleanup().await;
}

async fn schema_exists(name: &str) -> bool {
    let pool = noteful_db::create_pool_with_config(
        &test_database_url(),
        PoolConfig::new().max_connections(1),
    )
    .await
    .unwrap();
    let found: Option<(String,)> =
        sqlx::query_as("SELECT schema_name::text FROM information_schema.schemata WHERE schema_name = $1")
            .bind(name)
            .fetch_optional(&pool)
            .await
            .unwrap();
    pool.close().await;
    found.is_some()
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_cleanup_drops_schema() {
    let test_db = TestDatabase::new().await;
    let schema = test_db.schema_name().to_string();
    assert!(schema_exists(&schema).await);

    test_db.cleanup().await;
    assert!(!schema_exists(&schema).await);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_drop_schema_reports_failure_on_closed_pool() {
    let test_db = TestDatabase::new().await;
    let schema = test_db.schema_name().to_string();
    test_db.db.close().await;

    assert!(test_db.drop_schema().await.is_err());
    // Cleanup tolerates the failure; the schema is still there.
    test_db.cleanup().await;
    assert!(schema_exists(&schema).await);

    let pool = noteful_db::create_pool(&test_database_url()).await.unwrap();
    sqlx::query(&format!("DROP SCHEMA {} CASCADE", schema))
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;
}
