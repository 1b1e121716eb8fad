use modlinker::catalog::SearchResult;
use modlinker::storage::{Database, PostRecord};
use tempfile::TempDir;

fn result(title: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: format!("https://steamcommunity.com/sharedfiles/filedetails/?id={}", title),
        author_name: "Fluffy".to_string(),
        author_url: "https://steamcommunity.com/id/fluffy/".to_string(),
        display_alpha: Some("B18".to_string()),
    }
}

#[test]
fn test_analytics_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("store").join("analytics.sqlite");

    {
        let db = Database::new(&db_path).expect("Failed to create database");
        db.log_result("alice", &result("Hospitality")).unwrap();
        db.log_pattern("alice", "single:link mod").unwrap();
        db.log_post(&PostRecord {
            redditor: "alice",
            comment_id: "c1",
            post: "reply",
            submission: None,
            permalink: Some("https://reddit.com/r/RimWorld/comments/x/y/c1"),
        })
        .unwrap();
    }

    assert!(db_path.exists(), "Database file should exist");

    let db = Database::new(&db_path).expect("Failed to reopen database");
    let stats = db.stats().unwrap();
    println!("✓ Reopened database: {:?}", stats);

    assert_eq!(stats.request_count, 1);
    assert_eq!(stats.pattern_count, 1);
    assert_eq!(stats.post_count, 1);
    assert!(db.has_replied("c1").unwrap(), "Replies are remembered across restarts");
}

#[test]
fn test_top_results_ranking() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::new(&temp_dir.path().join("analytics.sqlite")).unwrap();

    for redditor in ["a", "b", "c"] {
        db.log_result(redditor, &result("Psychology")).unwrap();
    }
    db.log_result("a", &result("Hospitality")).unwrap();
    db.log_result("b", &result("Hospitality")).unwrap();
    db.log_result("c", &result("Zoo")).unwrap();

    let top = db.top_results(2).unwrap();
    assert_eq!(
        top,
        vec![("Psychology".to_string(), 3), ("Hospitality".to_string(), 2)]
    );
    assert_eq!(db.stats().unwrap().redditor_count, 3);
}
