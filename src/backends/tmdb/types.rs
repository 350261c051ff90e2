use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::models::{CategoryDictionary, CategoryId, Item, ItemId};

// Release dates come back as "YYYY-MM-DD", "" for unreleased titles, or null
fn deserialize_release_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

#[derive(Debug, Deserialize)]
pub struct GenreListResponse {
    #[serde(default)]
    pub genres: Vec<GenreDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreDto {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemPageResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<ItemDto>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// A movie as returned by the listing, search and detail endpoints.
///
/// Listings carry `genre_ids`, the detail endpoint carries `genres` objects.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDto {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "deserialize_release_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genre_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub genres: Option<Vec<GenreDto>>,
}

impl From<ItemDto> for Item {
    fn from(dto: ItemDto) -> Self {
        let category_ids = match (dto.genre_ids, dto.genres) {
            (Some(ids), _) => Some(ids.into_iter().map(CategoryId::new).collect()),
            (None, Some(genres)) => Some(genres.iter().map(|g| CategoryId::new(g.id)).collect()),
            (None, None) => None,
        };

        Item {
            id: ItemId::new(dto.id),
            title: dto.title,
            poster_path: dto.poster_path,
            summary: dto.overview.unwrap_or_default(),
            release_date: dto.release_date,
            category_ids,
        }
    }
}

impl From<GenreListResponse> for CategoryDictionary {
    fn from(response: GenreListResponse) -> Self {
        response
            .genres
            .into_iter()
            .map(|genre| (CategoryId::new(genre.id), genre.name.unwrap_or_default()))
            .collect()
    }
}
