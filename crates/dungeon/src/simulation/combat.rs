use glam::IVec2;
use rand::Rng;

use crate::config::GameConfig;
use crate::entity::{Body, Enemy, EnemyKind, Item, ItemKind};
use crate::map::GeneratedMap;

/// Seeds every room except the spawn room with an enemy, the last room with the boss.
/// Regular rooms may also get a heal item one cell east of their centre.
pub fn spawn_entities<R: Rng + ?Sized>(
    map: &GeneratedMap,
    config: &GameConfig,
    rng: &mut R,
) -> (Vec<Enemy>, Vec<Item>) {
    let mut enemies = Vec::new();
    let mut items = Vec::new();
    let last = map.rooms.len().saturating_sub(1);

    for (index, room) in map.rooms.iter().enumerate().skip(1) {
        let id = enemies.len() as u32 + 1;
        if index == last {
            enemies.push(Enemy::new(id, EnemyKind::Boss, room.center, config));
            continue;
        }

        enemies.push(Enemy::new(id, EnemyKind::Regular, room.center, config));

        let item_pos = room.center + IVec2::X;
        if rng.gen_bool(config.heal_item_chance) && map.grid.is_passable(item_pos) {
            items.push(Item::heal(item_pos));
        }
    }

    log::debug!("Spawned {} enemies and {} items", enemies.len(), items.len());

    (enemies, items)
}

/// Removes enemies at zero hp, returning them in their original order.
pub fn prune_dead(enemies: &mut Vec<Enemy>) -> Vec<Enemy> {
    let mut dead = Vec::new();
    enemies.retain(|enemy| {
        if enemy.is_alive() {
            true
        } else {
            dead.push(enemy.clone());
            false
        }
    });
    dead
}

/// Damages every enemy standing on `target`. Returns how many were hit.
pub fn strike_cell(enemies: &mut [Enemy], target: IVec2, damage: i32) -> usize {
    let mut hits = 0;
    for enemy in enemies.iter_mut().filter(|e| e.body.position == target) {
        enemy.body.apply_damage(damage);
        hits += 1;
    }
    hits
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub kind: ItemKind,
    pub healed: i32,
}

/// Consumes every item on the body's cell.
pub fn pick_up_items(body: &mut Body, items: &mut Vec<Item>, config: &GameConfig) -> Vec<Pickup> {
    let position = body.position;
    let mut pickups = Vec::new();
    items.retain(|item| {
        if item.position != position {
            return true;
        }
        let healed = match item.kind {
            ItemKind::Heal => body.heal(config.heal_amount),
        };
        pickups.push(Pickup {
            kind: item.kind,
            healed,
        });
        false
    });
    pickups
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::map::MapGenerator;

    #[test]
    fn spawn_room_stays_empty_and_boss_is_last() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let map = MapGenerator::new(&config).generate(&mut rng);
        let (enemies, items) = spawn_entities(&map, &config, &mut rng);

        assert_eq!(enemies.len(), map.rooms.len() - 1);

        let boss = enemies.last().unwrap();
        assert_eq!(boss.kind, EnemyKind::Boss);
        assert_eq!(boss.body.position, map.rooms.last().unwrap().center);
        assert_eq!(enemies.iter().filter(|e| e.kind.is_boss()).count(), 1);

        let ids: Vec<u32> = enemies.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=enemies.len() as u32).collect::<Vec<_>>());

        for item in &items {
            assert!(map.grid.is_passable(item.position));
        }
    }

    #[test]
    fn single_room_map_has_no_enemies() {
        let config = GameConfig {
            room_count: 1,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let map = MapGenerator::new(&config).generate(&mut rng);
        let (enemies, items) = spawn_entities(&map, &config, &mut rng);
        assert!(enemies.is_empty());
        assert!(items.is_empty());
    }

    #[test]
    fn pruning_keeps_order_of_survivors() {
        let config = GameConfig::default();
        let mut enemies: Vec<Enemy> = (1..=4)
            .map(|id| Enemy::new(id, EnemyKind::Regular, IVec2::new(id as i32, 1), &config))
            .collect();
        enemies[1].body.hp = 0;
        enemies[3].body.hp = 0;

        let dead = prune_dead(&mut enemies);

        assert_eq!(dead.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(enemies.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn strike_hits_stacked_enemies_and_clamps() {
        let config = GameConfig::default();
        let target = IVec2::new(4, 3);
        let mut enemies = vec![
            Enemy::new(1, EnemyKind::Regular, target, &config),
            Enemy::new(2, EnemyKind::Regular, target, &config),
            Enemy::new(3, EnemyKind::Regular, IVec2::new(3, 4), &config),
        ];
        enemies[1].body.hp = 5;

        assert_eq!(strike_cell(&mut enemies, target, 20), 2);
        assert_eq!(enemies[0].body.hp, 20);
        assert_eq!(enemies[1].body.hp, 0);
        assert_eq!(enemies[2].body.hp, 40);
    }

    #[test]
    fn pickup_heals_with_clamp_and_consumes_item() {
        let config = GameConfig::default();
        let mut body = Body::new(IVec2::new(2, 2), 100);
        body.hp = 90;
        let mut items = vec![Item::heal(IVec2::new(2, 2)), Item::heal(IVec2::new(6, 6))];

        let pickups = pick_up_items(&mut body, &mut items, &config);

        assert_eq!(pickups, vec![Pickup { kind: ItemKind::Heal, healed: 10 }]);
        assert_eq!(body.hp, 100);
        assert_eq!(items, vec![Item::heal(IVec2::new(6, 6))]);
    }
}
