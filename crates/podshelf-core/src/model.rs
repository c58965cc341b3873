use serde::{Deserialize, Deserializer, Serialize};

/// Numeric genre identifier as used by the catalog.
pub type GenreId = u32;

/// A single playable episode.
///
/// This is also the persisted favorite entry, so its serialized shape
/// (`{"title", "audioUrl"}`) must stay stable.  The catalog names the audio
/// field `file`; that spelling is accepted on input only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    #[serde(rename = "audioUrl", alias = "file")]
    pub audio_url: String,
}

impl Episode {
    pub fn new(title: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            audio_url: audio_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Season {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Season {
    pub fn new(episodes: Vec<Episode>) -> Self {
        Self {
            title: None,
            episodes,
        }
    }

    /// Label for the season selector.  `idx` is zero-based.
    pub fn label(&self, idx: usize) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Season {}", idx + 1),
        }
    }
}

/// Full descriptive data for one show.  Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ShowRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_genres")]
    pub genres: Vec<GenreId>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub updated: Option<String>,
}

impl ShowRecord {
    pub fn season(&self, idx: usize) -> Option<&Season> {
        self.seasons.get(idx)
    }

    pub fn updated_display(&self) -> Option<String> {
        self.updated.as_deref().and_then(format_updated)
    }
}

/// One row of the show list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ShowPreview {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub seasons: usize,
    #[serde(default, deserialize_with = "lenient_genres")]
    pub genres: Vec<GenreId>,
    #[serde(default)]
    pub updated: Option<String>,
}

impl ShowPreview {
    pub fn updated_display(&self) -> Option<String> {
        self.updated.as_deref().and_then(format_updated)
    }
}

/// Render an RFC 3339 catalog timestamp as a short local date.
pub fn format_updated(raw: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Local).format("%d %b %Y").to_string())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

// Detail responses sometimes carry genre names instead of ids; those have no
// entry in the genre table and are skipped.  `null` reads as no genres.
fn lenient_genres<'de, D>(deserializer: D) -> Result<Vec<GenreId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| GenreId::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_accepts_catalog_file_field() {
        let json = r#"{"title":"Pilot","description":"x","episode":1,"file":"https://a/1.mp3"}"#;
        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep, Episode::new("Pilot", "https://a/1.mp3"));
    }

    #[test]
    fn test_episode_serializes_as_audio_url() {
        let ep = Episode::new("Pilot", "a.mp3");
        let json = serde_json::to_string(&ep).unwrap();
        assert_eq!(json, r#"{"title":"Pilot","audioUrl":"a.mp3"}"#);
    }

    #[test]
    fn test_show_record_decodes_catalog_shape() {
        let json = r#"{
            "id": "10716",
            "title": "Something Was Wrong",
            "description": "An Emmy-winning docuseries",
            "image": "https://img/1.jpg",
            "genres": [1, "3", "Featured"],
            "updated": "2022-11-03T07:00:00.000Z",
            "seasons": [
                {"season": 1, "title": "Season 1", "image": "i", "episodes": [
                    {"title": "Pilot", "file": "a.mp3", "episode": 1}
                ]},
                {"season": 2, "episodes": []}
            ]
        }"#;
        let show: ShowRecord = serde_json::from_str(json).unwrap();
        assert_eq!(show.id, "10716");
        assert_eq!(show.genres, vec![1, 3]);
        assert_eq!(show.seasons.len(), 2);
        assert_eq!(show.seasons[0].episodes[0].audio_url, "a.mp3");
        assert_eq!(show.seasons[0].label(0), "Season 1");
        assert_eq!(show.seasons[1].label(1), "Season 2");
        assert!(show.updated_display().is_some());
    }

    #[test]
    fn test_null_genres_read_as_empty() {
        let json = r#"{"id": "7", "title": "T", "genres": null, "seasons": []}"#;
        let show: ShowRecord = serde_json::from_str(json).unwrap();
        assert!(show.genres.is_empty());

        let p: ShowPreview = serde_json::from_str(r#"{"id": 1, "title": "P", "genres": null}"#).unwrap();
        assert!(p.genres.is_empty());
    }

    #[test]
    fn test_preview_numeric_id() {
        let json = r#"{"id": 42, "title": "T", "seasons": 3, "genres": [2]}"#;
        let p: ShowPreview = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "42");
        assert_eq!(p.seasons, 3);
        assert!(p.updated_display().is_none());
    }
}
