//! Seed catalog used when no catalog has been persisted yet

use crate::shop::types::{Category, MenuItem};

pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("f1", "ชา01", 85, Category::Food),
        MenuItem::new("f2", "ก๋วยเตี๋ยวเรือเนื้อวากิว", 120, Category::Food)
            .description("น้ำตกเข้มข้น พร้อมเนื้อวากิวสไลด์บางพรีเมียม")
            .image("https://images.unsplash.com/photo-1617093228486-07974439aa01?auto=format&fit=crop&q=80&w=400"),
        MenuItem::new("f3", "น้ำพริกหนุ่ม ผักลวก", 65, Category::Food)
            .description("น้ำพริกหนุ่มทำสดใหม่ทุกวัน เผ็ดกำลังดี ทานคู่กับผักพื้นบ้าน")
            .image("https://images.unsplash.com/photo-1562967914-6cbb692d2432?auto=format&fit=crop&q=80&w=400"),
        MenuItem::new("d1", "ชาไทยเย็น สูตรพะเยา", 45, Category::Drink)
            .description("ชาไทยหอมเข้มข้น หวานมันกำลังดี ปรุงด้วยสูตรลับของร้าน")
            .image("https://images.unsplash.com/photo-1558160074-4d7d8bdf4256?auto=format&fit=crop&q=80&w=400"),
        MenuItem::new("d2", "กาแฟสดคั่วกลาง", 55, Category::Drink)
            .description("กาแฟอาราบิก้า 100% จากดอยในพะเยา")
            .image("https://images.unsplash.com/photo-1541167760496-162955ed8a9f?auto=format&fit=crop&q=80&w=400"),
        MenuItem::new("d3", "อัญชันมะนาวน้ำผึ้ง", 40, Category::Drink)
            .description("สดชื่นด้วยสมุนไพรและน้ำผึ้งแท้เดือนห้า")
            .image("https://images.unsplash.com/photo-1556881286-fc6915169721?auto=format&fit=crop&q=80&w=400"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let menu = default_menu();
        let ids: HashSet<_> = menu.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), menu.len());
        assert!(menu.iter().all(|i| i.price > 0));
    }
}
