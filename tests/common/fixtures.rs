use chrono::NaiveDate;
use marquee::{CategoryDictionary, CategoryId, Item, ItemId};
use serde_json::json;

fn item(id: i64, title: &str, date: &str, categories: &[i64]) -> Item {
    Item {
        id: ItemId::new(id),
        title: title.to_string(),
        poster_path: Some(format!("/poster_{}.jpg", id)),
        summary: String::new(),
        release_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        category_ids: Some(categories.iter().copied().map(CategoryId::new).collect()),
    }
}

pub fn categories() -> CategoryDictionary {
    [(0, "Animation"), (1, "Comedy"), (2, "Adventure"), (3, "Drama")]
        .into_iter()
        .map(|(id, name)| (CategoryId::new(id), name.to_string()))
        .collect()
}

pub fn catalog() -> Vec<Item> {
    vec![
        item(0, "The Little Mermaid", "1989-12-12", &[0, 3]),
        item(1, "The Princess and the Frog", "2009-12-12", &[0]),
        item(2, "Tangled", "2010-12-12", &[1]),
        item(3, "Moana", "2016-12-12", &[1, 2]),
        item(4, "Zootopia", "2016-12-12", &[1, 2, 3]),
        item(5, "Shrek Forever After", "2010-12-12", &[0, 3]),
    ]
}

pub fn favorite_ids() -> Vec<ItemId> {
    [0, 1, 2, 5].into_iter().map(ItemId::new).collect()
}

/// Wire form of the fixture catalog as the HTTP API returns it.
pub fn item_json(item: &Item) -> serde_json::Value {
    json!({
        "id": item.id.get(),
        "title": item.title,
        "poster_path": item.poster_path,
        "overview": item.summary,
        "release_date": item.release_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        "genre_ids": item.category_ids().iter().map(|c| c.get()).collect::<Vec<_>>()
    })
}

pub fn popular_page_json(page: u32, items: &[Item]) -> serde_json::Value {
    json!({
        "page": page,
        "total_pages": 2,
        "results": items.iter().map(item_json).collect::<Vec<_>>()
    })
}

pub fn genres_json() -> serde_json::Value {
    json!({
        "genres": [
            {"id": 0, "name": "Animation"},
            {"id": 1, "name": "Comedy"},
            {"id": 2, "name": "Adventure"},
            {"id": 3, "name": "Drama"}
        ]
    })
}
