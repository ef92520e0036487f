use {
    bevy::{platform::collections::HashMap, prelude::*},
    drop_spot_components::DropSpot,
};

/// O(1) lookup of drop spot entities by item id, plus the level's ordered
/// target list.
#[derive(Resource, Default, Debug)]
pub struct DropSpotIndex {
    entities: HashMap<String, Entity>,
    item_ids: HashMap<Entity, String>,
    ordered: Vec<String>,
}

/// Configuration problems found while indexing. None of them stop the level.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub duplicate_ids: Vec<String>,
    pub empty_ids: usize,
}

impl IndexReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && self.empty_ids == 0
    }
}

impl DropSpotIndex {
    /// Rebuilds the index from the spawned spots, ordered by `DropSpot::order`.
    ///
    /// For a duplicated id the spot with the lowest order wins; the others are
    /// left out of the target list.
    pub fn rebuild<'a>(&mut self, spots: impl IntoIterator<Item = (Entity, &'a DropSpot)>) -> IndexReport {
        let mut spots: Vec<_> = spots.into_iter().collect();
        spots.sort_by_key(|(entity, spot)| (spot.order, *entity));

        self.clear();
        let mut report = IndexReport::default();

        for (entity, spot) in spots {
            if spot.item_id.is_empty() {
                report.empty_ids += 1;
                continue;
            }
            if self.entities.contains_key(&spot.item_id) {
                report.duplicate_ids.push(spot.item_id.clone());
                continue;
            }
            self.entities.insert(spot.item_id.clone(), entity);
            self.item_ids.insert(entity, spot.item_id.clone());
            self.ordered.push(spot.item_id.clone());
        }

        report
    }

    pub fn entity(&self, item_id: &str) -> Option<Entity> {
        self.entities.get(item_id).copied()
    }

    pub fn item_id(&self, entity: Entity) -> Option<&str> {
        self.item_ids.get(&entity).map(String::as_str)
    }

    /// Target ids in level order.
    pub fn ordered_ids(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Forgets a spot whose entity went away. Returns the id it carried.
    ///
    /// Order of the remaining targets is unchanged; the scheduler's batch
    /// ranges are not recomputed until the next level load.
    pub fn notify_removed(&mut self, entity: Entity) -> Option<String> {
        let item_id = self.item_ids.remove(&entity)?;
        self.entities.remove(&item_id);
        Some(item_id)
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.item_ids.clear();
        self.ordered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spots(world: &mut World, defs: &[(&str, usize)]) -> Vec<(Entity, DropSpot)> {
        defs.iter()
            .map(|(id, order)| {
                let spot = DropSpot::new(*id, *order);
                (world.spawn_empty().id(), spot)
            })
            .collect()
    }

    #[test]
    fn test_rebuild_orders_by_spot_order() {
        let mut world = World::new();
        let spots = spots(&mut world, &[("c", 2), ("a", 0), ("b", 1)]);

        let mut index = DropSpotIndex::default();
        let report = index.rebuild(spots.iter().map(|(e, s)| (*e, s)));

        assert!(report.is_clean());
        assert_eq!(index.ordered_ids(), ["a", "b", "c"]);
        assert_eq!(index.entity("c"), Some(spots[0].0));
    }

    #[test]
    fn test_duplicate_ids_are_reported_and_skipped() {
        let mut world = World::new();
        let spots = spots(&mut world, &[("cup", 0), ("", 1), ("cup", 2), ("hat", 3)]);

        let mut index = DropSpotIndex::default();
        let report = index.rebuild(spots.iter().map(|(e, s)| (*e, s)));

        assert_eq!(report.duplicate_ids, ["cup"]);
        assert_eq!(report.empty_ids, 1);
        assert_eq!(index.ordered_ids(), ["cup", "hat"]);
        assert_eq!(index.entity("cup"), Some(spots[0].0));
        assert_eq!(index.item_id(spots[2].0), None);
    }

    #[test]
    fn test_notify_removed() {
        let mut world = World::new();
        let spots = spots(&mut world, &[("cup", 0), ("hat", 1)]);
        let mut index = DropSpotIndex::default();
        index.rebuild(spots.iter().map(|(e, s)| (*e, s)));

        assert_eq!(index.item_id(spots[1].0), Some("hat"));
        assert_eq!(index.notify_removed(spots[0].0).as_deref(), Some("cup"));
        assert_eq!(index.notify_removed(spots[0].0), None);
        assert_eq!(index.entity("cup"), None);
        assert_eq!(index.item_id(spots[0].0), None);
        assert_eq!(index.ordered_ids(), ["cup", "hat"]);
    }
}
