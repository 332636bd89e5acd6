use chrono::{TimeZone, Utc};
use playlist_janitor::models::{SkippedTrack, SpotifyTrack};
use playlist_janitor::table::{Column, SortOrder, SortState, TableHead, sort_rows};

fn table_columns() -> Vec<Column> {
    vec![
        Column::fixed("Image", "image"),
        Column::sortable("Title", "title"),
        Column::sortable("Artist", "artist"),
    ]
}

fn track(id: &str, title: &str, album: Option<&str>) -> SpotifyTrack {
    SpotifyTrack {
        id: id.to_string(),
        title: title.to_string(),
        artist: "Artist".to_string(),
        album: album.map(str::to_string),
        image_url: None,
        duration_ms: None,
    }
}

#[test]
fn test_sortable_header_click_sorts_ascending() {
    let mut calls = Vec::new();
    let mut head = TableHead::new(table_columns(), |accessor: &str, order: SortOrder| {
        calls.push((accessor.to_string(), order));
    });

    head.click("title");
    drop(head);

    assert_eq!(calls, vec![("title".to_string(), SortOrder::Asc)]);
}

#[test]
fn test_second_click_flips_order() {
    let mut calls = Vec::new();
    let mut head = TableHead::new(table_columns(), |accessor: &str, order: SortOrder| {
        calls.push((accessor.to_string(), order));
    });

    head.click("title");
    head.click("title");
    assert_eq!(head.indicator("title"), Some('↓'));
    drop(head);

    assert_eq!(calls[0], ("title".to_string(), SortOrder::Asc));
    assert_eq!(calls.last(), Some(&("title".to_string(), SortOrder::Desc)));
}

#[test]
fn test_non_sortable_header_click_is_ignored() {
    let mut calls = 0;
    let mut head = TableHead::new(table_columns(), |_: &str, _: SortOrder| calls += 1);

    head.click("image");
    head.click("no-such-column");

    assert_eq!(head.state(), &SortState::Unsorted);
    drop(head);
    assert_eq!(calls, 0);
}

#[test]
fn test_switching_column_restarts_ascending() {
    let mut head = TableHead::new(table_columns(), |_: &str, _: SortOrder| {});

    head.click("title");
    head.click("title");
    head.click("artist");

    assert_eq!(
        head.state(),
        &SortState::Sorted {
            field: "artist".to_string(),
            order: SortOrder::Asc,
        }
    );
    assert_eq!(head.indicator("title"), None);
}

#[test]
fn test_labels_show_indicator_on_active_column() {
    let mut head = TableHead::new(table_columns(), |_: &str, _: SortOrder| {});
    assert_eq!(head.labels(), vec!["Image", "Title", "Artist"]);

    head.click("artist");

    assert_eq!(head.labels(), vec!["Image", "Title", "Artist ↑"]);
}

#[test]
fn test_sort_rows_by_title() {
    let mut rows = vec![
        track("1", "beta", None),
        track("2", "Alpha", None),
        track("3", "gamma", None),
    ];

    sort_rows(&mut rows, "title", SortOrder::Asc);
    let titles: Vec<&str> = rows.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "beta", "gamma"]);

    sort_rows(&mut rows, "title", SortOrder::Desc);
    let titles: Vec<&str> = rows.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["gamma", "beta", "Alpha"]);
}

#[test]
fn test_sort_rows_missing_values_last() {
    let mut rows = vec![
        track("1", "a", None),
        track("2", "b", Some("Zed")),
        track("3", "c", Some("Abba")),
    ];

    sort_rows(&mut rows, "album", SortOrder::Desc);

    let ids: Vec<&str> = rows.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3", "1"]);
}

#[test]
fn test_sort_rows_by_date() {
    let skipped = |track_id: &str, day: u32| SkippedTrack {
        track_id: track_id.to_string(),
        playlist_id: "p".to_string(),
        skipped_date: Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap(),
    };
    let mut rows = vec![skipped("b", 3), skipped("a", 1), skipped("c", 2)];

    sort_rows(&mut rows, "skippedDate", SortOrder::Asc);

    let ids: Vec<&str> = rows.iter().map(|t| t.track_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
}
