//! Customer cart

use serde::Serialize;

use crate::shop::error::{ShopError, ShopResult};
use crate::shop::types::{CartItem, MenuItem};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item`; an existing line is incremented, not duplicated
    pub fn add(&mut self, item: &MenuItem) -> &CartItem {
        if let Some(pos) = self.items.iter().position(|i| i.id() == item.id) {
            self.items[pos].quantity += 1;
            return &self.items[pos];
        }

        self.items.push(CartItem::new(item.clone()));
        let last = self.items.len() - 1;
        &self.items[last]
    }

    pub fn remove(&mut self, id: &str) -> ShopResult<CartItem> {
        let pos = self.position(id)?;
        Ok(self.items.remove(pos))
    }

    /// Adjust a line's quantity by `delta`, never going below 1
    pub fn update_quantity(&mut self, id: &str, delta: i64) -> ShopResult<&CartItem> {
        let pos = self.position(id)?;
        let line = &mut self.items[pos];
        let next = (i64::from(line.quantity) + delta).clamp(1, i64::from(u32::MAX));
        line.quantity = next as u32;
        Ok(line)
    }

    pub fn update_notes(&mut self, id: &str, notes: impl Into<String>) -> ShopResult<&CartItem> {
        let pos = self.position(id)?;
        let line = &mut self.items[pos];
        line.notes = notes.into();
        Ok(line)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ price × quantity
    pub fn total(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ quantity
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &str) -> ShopResult<usize> {
        self.items
            .iter()
            .position(|i| i.id() == id)
            .ok_or_else(|| ShopError::CartItemNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::types::Category;

    fn tea() -> MenuItem {
        MenuItem::new("d1", "Thai tea", 45, Category::Drink)
    }

    fn noodles() -> MenuItem {
        MenuItem::new("f2", "Boat noodles", 120, Category::Food)
    }

    #[test]
    fn test_add_existing_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(&tea());
        cart.add(&tea());
        cart.add(&noodles());

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let mut cart = Cart::new();
        cart.add(&tea());
        cart.add(&noodles());
        cart.update_quantity("d1", 2).unwrap();

        let expected: i64 = cart
            .items()
            .iter()
            .map(|i| i.item.price * i64::from(i.quantity))
            .sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.total(), 45 * 3 + 120);
    }

    #[test]
    fn test_quantity_never_below_one() {
        let mut cart = Cart::new();
        cart.add(&tea());
        let line = cart.update_quantity("d1", -5).unwrap();
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_notes_and_remove() {
        let mut cart = Cart::new();
        cart.add(&tea());
        cart.update_notes("d1", "less sugar").unwrap();
        assert_eq!(cart.items()[0].notes, "less sugar");

        let removed = cart.remove("d1").unwrap();
        assert_eq!(removed.notes, "less sugar");
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn test_unknown_line() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.update_quantity("zz", 1),
            Err(ShopError::CartItemNotFound(_))
        ));
        assert!(cart.remove("zz").is_err());
    }
}
