use crate::model::GenreId;

const GENRES: &[(GenreId, &str)] = &[
    (1, "Personal Growth"),
    (2, "Investigative Journalism"),
    (3, "History"),
    (4, "Comedy"),
    (5, "Entertainment"),
    (6, "Business"),
    (7, "Fiction"),
    (8, "News"),
    (9, "Kids and Family"),
];

/// Display name for a catalog genre id.
pub fn genre_name(id: GenreId) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(gid, _)| *gid == id)
        .map(|(_, name)| *name)
}

/// Comma-joined names for a genre list; unknown ids are skipped.
pub fn genre_names(ids: &[GenreId]) -> String {
    ids.iter()
        .filter_map(|id| genre_name(*id))
        .collect::<Vec<_>>()
        .join(", ")
}
