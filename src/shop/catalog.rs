//! Menu Catalog
//!
//! The ordered set of orderable menu items. Staff create, edit and delete
//! entries; the whole list is persisted as one snapshot after every change.

use serde::{Deserialize, Serialize};

use crate::shop::error::{ShopError, ShopResult};
use crate::shop::types::{Category, MenuItem};

/// Fields submitted from the menu editor
///
/// `id` is present when editing an existing item and absent for a new one.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MenuItemDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub price: i64,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl MenuItemDraft {
    fn validate(&self) -> ShopResult<()> {
        if self.name.trim().is_empty() {
            return Err(ShopError::Validation(
                "Menu item name cannot be empty".to_string(),
            ));
        }

        if self.price < 0 {
            return Err(ShopError::Validation(
                "Menu item price cannot be negative".to_string(),
            ));
        }

        Ok(())
    }

    fn into_item(self, id: String) -> MenuItem {
        MenuItem {
            id,
            name: self.name.trim().to_string(),
            price: self.price,
            category: self.category,
            description: self.description,
            image: self.image,
        }
    }
}

/// Whether a save created a new entry or replaced one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: Vec<MenuItem>,
}

impl Catalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    /// All items, or only those in `category`
    pub fn list(&self, category: Option<Category>) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Create or replace an item from an editor draft
    ///
    /// A draft whose id matches an existing item replaces it in place. Any
    /// other draft becomes a new item with id `m<now_ms>`.
    pub fn save(&mut self, draft: MenuItemDraft, now_ms: i64) -> ShopResult<(MenuItem, SaveOutcome)> {
        draft.validate()?;

        if let Some(id) = draft.id.clone() {
            if let Some(slot) = self.items.iter_mut().find(|i| i.id == id) {
                *slot = draft.into_item(id);
                return Ok((slot.clone(), SaveOutcome::Updated));
            }
        }

        let id = self.fresh_id(now_ms);
        let item = draft.into_item(id);
        self.items.push(item.clone());
        Ok((item, SaveOutcome::Created))
    }

    /// Remove an item by id
    pub fn delete(&mut self, id: &str) -> ShopResult<MenuItem> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| ShopError::MenuItemNotFound(id.to_string()))?;
        Ok(self.items.remove(pos))
    }

    /// Menu as one line of text for the assistant's system prompt
    pub fn render_for_prompt(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{} ราคา {} บาท ({})", i.name, i.price, i.description))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn fresh_id(&self, now_ms: i64) -> String {
        let mut stamp = now_ms;
        loop {
            let id = format!("m{}", stamp);
            if self.get(&id).is_none() {
                return id;
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(vec![
            MenuItem::new("d1", "Thai tea", 45, Category::Drink),
            MenuItem::new("f1", "Boat noodles", 120, Category::Food),
        ])
    }

    fn draft(name: &str, price: i64) -> MenuItemDraft {
        MenuItemDraft {
            id: None,
            name: name.to_string(),
            price,
            category: Category::Dessert,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_list_by_category() {
        let catalog = sample();
        assert_eq!(catalog.list(None).len(), 2);
        let drinks = catalog.list(Some(Category::Drink));
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].id, "d1");
        assert!(catalog.list(Some(Category::Dessert)).is_empty());
    }

    #[test]
    fn test_save_creates_new_item() {
        let mut catalog = sample();
        let (item, outcome) = catalog.save(draft("Mango sticky rice", 80), 1700).unwrap();
        assert_eq!(outcome, SaveOutcome::Created);
        assert_eq!(item.id, "m1700");
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_save_avoids_id_collision() {
        let mut catalog = sample();
        catalog.save(draft("A", 1), 1700).unwrap();
        let (second, _) = catalog.save(draft("B", 1), 1700).unwrap();
        assert_eq!(second.id, "m1701");
    }

    #[test]
    fn test_save_updates_existing_item() {
        let mut catalog = sample();
        let mut edit = draft("Thai tea (large)", 55);
        edit.id = Some("d1".to_string());
        edit.category = Category::Drink;

        let (item, outcome) = catalog.save(edit, 0).unwrap();
        assert_eq!(outcome, SaveOutcome::Updated);
        assert_eq!(item.price, 55);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].name, "Thai tea (large)");
    }

    #[test]
    fn test_save_rejects_invalid_drafts() {
        let mut catalog = sample();
        assert!(matches!(
            catalog.save(draft("   ", 10), 0),
            Err(ShopError::Validation(_))
        ));
        assert!(matches!(
            catalog.save(draft("Tea", -1), 0),
            Err(ShopError::Validation(_))
        ));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_delete() {
        let mut catalog = sample();
        let removed = catalog.delete("f1").unwrap();
        assert_eq!(removed.name, "Boat noodles");
        assert!(catalog.get("f1").is_none());
        assert!(matches!(
            catalog.delete("f1"),
            Err(ShopError::MenuItemNotFound(_))
        ));
    }

    #[test]
    fn test_render_for_prompt() {
        let catalog = Catalog::new(vec![
            MenuItem::new("d1", "Thai tea", 45, Category::Drink).description("sweet")
        ]);
        assert_eq!(catalog.render_for_prompt(), "Thai tea ราคา 45 บาท (sweet)");
    }
}
