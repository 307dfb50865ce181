use chrono::{Days, NaiveDate, Utc};

use ransomwatch::{
    FeedEntry, GroupClaim, RecencyWindow, WatchConfig, WatchSession,
};

fn config_for(dir: &std::path::Path) -> WatchConfig {
    WatchConfig {
        data_dir: dir.to_path_buf(),
        ..WatchConfig::default()
    }
}

fn entry(victim: &str, link: &str, date: Option<NaiveDate>) -> FeedEntry {
    FeedEntry {
        victim: Some(victim.to_string()),
        link: if link.is_empty() {
            None
        } else {
            Some(link.to_string())
        },
        date: date.map(|d| d.format("%Y-%m-%d").to_string()),
        ..FeedEntry::default()
    }
}

#[test]
fn scan_creates_alert_with_full_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WatchSession::open(config_for(dir.path())).unwrap();
    session
        .add_company("Acme Corp", "critical supplier", vec!["acme".to_string()])
        .unwrap();

    let entries = vec![FeedEntry {
        victim: Some("ACME Corporation".to_string()),
        title: Some("ACME Corporation breached".to_string()),
        domain: Some("acme.example".to_string()),
        date: Some("2026-08-20".to_string()),
        claim_gang: GroupClaim::Named("lockbit3".to_string()),
        url: Some("https://leaks.example/acme".to_string()),
        link: Some("https://feed.example/post/1".to_string()),
        summary: Some("Files exfiltrated".to_string()),
    }];

    let report = session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    assert_eq!(report.entries_fetched, 1);
    assert_eq!(report.new_alerts, 1);

    let alert = &session.alerts()[0];
    assert_eq!(alert.company_name, "Acme Corp");
    assert_eq!(alert.matched_keyword, "acme");
    assert_eq!(alert.entry_id, "https://feed.example/post/1");
    assert_eq!(alert.snapshot.display_name, "ACME Corporation");
    assert_eq!(alert.snapshot.group, "lockbit3");
    assert_eq!(alert.snapshot.reported_date, "2026-08-20");
    assert!(alert.is_open());
}

#[test]
fn rescan_of_linked_entries_creates_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WatchSession::open(config_for(dir.path())).unwrap();
    session
        .add_company("Acme Corp", "", vec!["acme".to_string()])
        .unwrap();

    let entries = vec![entry("Acme Corp", "https://feed.example/post/1", None)];
    let first = session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    assert_eq!(first.new_alerts, 1);

    let second = session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    assert_eq!(second.new_alerts, 0);
    assert_eq!(session.alerts().len(), 1);
}

#[test]
fn dedup_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![entry("Acme Corp", "https://feed.example/post/1", None)];

    {
        let mut session = WatchSession::open(config_for(dir.path())).unwrap();
        session
            .add_company("Acme Corp", "", vec!["acme".to_string()])
            .unwrap();
        session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    }

    let mut session = WatchSession::open(config_for(dir.path())).unwrap();
    let report = session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    assert_eq!(report.new_alerts, 0);
    assert_eq!(session.alerts().len(), 1);
}

#[test]
fn linkless_entries_alert_on_every_scan() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WatchSession::open(config_for(dir.path())).unwrap();
    session
        .add_company("Acme Corp", "", vec!["acme".to_string()])
        .unwrap();

    let entries = vec![entry("Acme Corp", "", None)];
    session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    session.ingest(&entries, RecencyWindow::AllTime).unwrap();

    let alerts = session.alerts();
    assert_eq!(alerts.len(), 2);
    assert_ne!(alerts[0].entry_id, alerts[1].entry_id);
}

#[test]
fn bounded_window_drops_old_and_dateless_entries() {
    let today = Utc::now().date_naive();
    let stale = today.checked_sub_days(Days::new(400)).unwrap();
    let entries = vec![
        entry("Acme fresh", "https://feed.example/a", Some(today)),
        entry("Acme stale", "https://feed.example/b", Some(stale)),
        entry("Acme dateless", "https://feed.example/c", None),
    ];

    let bounded_dir = tempfile::tempdir().unwrap();
    let mut bounded = WatchSession::open(config_for(bounded_dir.path())).unwrap();
    bounded
        .add_company("Acme Corp", "", vec!["acme".to_string()])
        .unwrap();
    let report = bounded.ingest(&entries, RecencyWindow::Days(30)).unwrap();
    assert_eq!(report.new_alerts, 1);
    assert_eq!(bounded.alerts()[0].snapshot.display_name, "Acme fresh");

    let open_dir = tempfile::tempdir().unwrap();
    let mut unbounded = WatchSession::open(config_for(open_dir.path())).unwrap();
    unbounded
        .add_company("Acme Corp", "", vec!["acme".to_string()])
        .unwrap();
    let report = unbounded.ingest(&entries, RecencyWindow::AllTime).unwrap();
    assert_eq!(report.new_alerts, 3);
}

#[test]
fn each_matching_keyword_raises_its_own_alert() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WatchSession::open(config_for(dir.path())).unwrap();
    session
        .add_company(
            "Acme Corp",
            "",
            vec!["acme".to_string(), "acme corp".to_string()],
        )
        .unwrap();

    let entries = vec![entry(
        "Acme Corp Holdings",
        "https://feed.example/post/1",
        None,
    )];
    let report = session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    assert_eq!(report.new_alerts, 2);

    let mut keywords: Vec<&str> = session
        .alerts()
        .iter()
        .map(|a| a.matched_keyword.as_str())
        .collect();
    keywords.sort_unstable();
    assert_eq!(keywords, vec!["acme", "acme corp"]);
}

#[test]
fn quiet_scan_writes_no_alert_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WatchSession::open(config_for(dir.path())).unwrap();
    session
        .add_company("Acme Corp", "", vec!["acme".to_string()])
        .unwrap();

    let entries = vec![entry("Globex Industries", "https://feed.example/g", None)];
    let report = session.ingest(&entries, RecencyWindow::AllTime).unwrap();
    assert_eq!(report.new_alerts, 0);
    assert!(!dir.path().join("alerts.json").exists());
}
