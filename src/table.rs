//! Sortable table header state and row sorting.
//!
//! [`TableHead`] only tracks which column the user asked to sort by and
//! reports it through a callback; ordering rows is left to [`sort_rows`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::{Playlist, SkippedTrack, SkippedTrackHistory, SpotifyTrack};

/// Deserialized through [`FromStr`], so any casing is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Up arrow for ascending, down arrow for descending
    pub fn indicator(&self) -> char {
        match self {
            SortOrder::Asc => '↑',
            SortOrder::Desc => '↓',
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => anyhow::bail!("Unknown sort order: {}", other),
        }
    }
}

impl TryFrom<String> for SortOrder {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
    pub accessor: String,
    pub sortable: bool,
}

impl Column {
    pub fn sortable(label: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            accessor: accessor.into(),
            sortable: true,
        }
    }

    pub fn fixed(label: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            accessor: accessor.into(),
            sortable: false,
        }
    }
}

/// Which column, if any, the header is currently sorted by
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    Unsorted,
    Sorted { field: String, order: SortOrder },
}

impl SortState {
    /// State after the user clicks the sortable column `accessor`
    pub fn next(&self, accessor: &str) -> SortState {
        let order = match self {
            SortState::Sorted { field, order } if field == accessor => order.reversed(),
            _ => SortOrder::Asc,
        };

        SortState::Sorted {
            field: accessor.to_string(),
            order,
        }
    }

    pub fn order_for(&self, accessor: &str) -> Option<SortOrder> {
        match self {
            SortState::Sorted { field, order } if field == accessor => Some(*order),
            _ => None,
        }
    }
}

pub struct TableHead<F>
where
    F: FnMut(&str, SortOrder),
{
    columns: Vec<Column>,
    state: SortState,
    handle_sorting: F,
}

impl<F> TableHead<F>
where
    F: FnMut(&str, SortOrder),
{
    pub fn new(columns: Vec<Column>, handle_sorting: F) -> Self {
        Self {
            columns,
            state: SortState::Unsorted,
            handle_sorting,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// Handle a click on the header cell for `accessor`.
    ///
    /// Clicks on non-sortable or unknown columns are ignored and the sort
    /// callback is not invoked.
    pub fn click(&mut self, accessor: &str) {
        let sortable = self
            .columns
            .iter()
            .any(|column| column.accessor == accessor && column.sortable);
        if !sortable {
            return;
        }

        self.state = self.state.next(accessor);
        if let SortState::Sorted { field, order } = &self.state {
            (self.handle_sorting)(field, *order);
        }
    }

    pub fn indicator(&self, accessor: &str) -> Option<char> {
        self.state.order_for(accessor).map(|order| order.indicator())
    }

    /// Column labels, the active one suffixed with its sort indicator
    pub fn labels(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| match self.indicator(&column.accessor) {
                Some(arrow) => format!("{} {}", column.label, arrow),
                None => column.label.clone(),
            })
            .collect()
    }
}

/// A comparable cell value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Bool(bool),
    Number(i64),
    Date(DateTime<Utc>),
    Text(String),
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }
}

/// Rows that expose a value per column accessor
pub trait SortKey {
    fn sort_value(&self, accessor: &str) -> Option<SortValue>;
}

/// Stable sort of `rows` by `accessor`. Rows without a value go last in
/// either order.
pub fn sort_rows<T: SortKey>(rows: &mut [T], accessor: &str, order: SortOrder) {
    rows.sort_by(|a, b| {
        match (a.sort_value(accessor), b.sort_value(accessor)) {
            (Some(a), Some(b)) => match order {
                SortOrder::Asc => a.cmp(&b),
                SortOrder::Desc => b.cmp(&a),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

impl SortKey for Playlist {
    fn sort_value(&self, accessor: &str) -> Option<SortValue> {
        match accessor {
            "id" => Some(self.id.as_str().into()),
            "skipThreshold" => self.skip_threshold.map(SortValue::Number),
            "ignoreInitialSkips" => Some(SortValue::Bool(self.ignore_initial_skips)),
            "autoCleanupLimit" => self.auto_cleanup_limit.map(SortValue::Number),
            _ => None,
        }
    }
}

impl SortKey for SkippedTrack {
    fn sort_value(&self, accessor: &str) -> Option<SortValue> {
        match accessor {
            "trackId" => Some(self.track_id.as_str().into()),
            "playlistId" => Some(self.playlist_id.as_str().into()),
            "skippedDate" => Some(SortValue::Date(self.skipped_date)),
            _ => None,
        }
    }
}

impl SortKey for SkippedTrackHistory {
    fn sort_value(&self, accessor: &str) -> Option<SortValue> {
        match accessor {
            "trackId" => Some(self.track_id.as_str().into()),
            "playlistId" => Some(self.playlist_id.as_str().into()),
            "skippedDate" => Some(SortValue::Date(self.skipped_date)),
            _ => None,
        }
    }
}

impl SortKey for SpotifyTrack {
    fn sort_value(&self, accessor: &str) -> Option<SortValue> {
        match accessor {
            "id" => Some(self.id.as_str().into()),
            "title" => Some(self.title.as_str().into()),
            "artist" => Some(self.artist.as_str().into()),
            "album" => self.album.as_deref().map(SortValue::from),
            "duration" => self.duration_ms.map(SortValue::Number),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_cycle() {
        let state = SortState::default();
        let state = state.next("title");
        assert_eq!(state.order_for("title"), Some(SortOrder::Asc));
        let state = state.next("title");
        assert_eq!(state.order_for("title"), Some(SortOrder::Desc));
        let state = state.next("title");
        assert_eq!(state.order_for("title"), Some(SortOrder::Asc));
        let state = state.next("artist");
        assert_eq!(state.order_for("artist"), Some(SortOrder::Asc));
        assert_eq!(state.order_for("title"), None);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_deserialize_any_case() {
        let order: SortOrder = serde_json::from_str("\"DESC\"").unwrap();
        assert_eq!(order, SortOrder::Desc);
        let order: SortOrder = serde_json::from_str("\"ascending\"").unwrap();
        assert_eq!(order, SortOrder::Asc);
        assert!(serde_json::from_str::<SortOrder>("\"up\"").is_err());
        assert_eq!(serde_json::to_string(&SortOrder::Desc).unwrap(), "\"desc\"");
    }
}
