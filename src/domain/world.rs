// World State: the player registry and the live coin set.
//
// Only the tick loop owns a `World`; every mutation goes through the entry points below.

use super::errors::UnknownPlayerError;
use super::state::{Coin, CoinSnapshot, Player, PlayerId, PlayerInput, PlayerSnapshot};
use super::systems::{coins, movement};
use super::tuning::ArenaTuning;
use rand::Rng;

pub struct World {
    tuning: ArenaTuning,
    // Join order; the collision pass visits players in this order.
    players: Vec<Player>,
    coins: Vec<Coin>,
}

impl World {
    /// Creates an empty arena seeded with `tuning.coin_count` coins.
    pub fn new<R: Rng>(tuning: ArenaTuning, rng: &mut R) -> Self {
        let coins = (0..tuning.coin_count)
            .map(|_| coins::spawn_coin(&tuning, rng))
            .collect();
        Self {
            tuning,
            players: Vec::new(),
            coins,
        }
    }

    pub fn tuning(&self) -> &ArenaTuning {
        &self.tuning
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn contains_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    /// Adds a player at the spawn point with a random color, zero score and no intent.
    pub fn spawn_player<R: Rng>(&mut self, player_id: PlayerId, rng: &mut R) -> &Player {
        let (x, y) = self.tuning.spawn_point();
        let color = random_color(rng);
        self.players.push(Player::new(player_id, x, y, color));
        &self.players[self.players.len() - 1]
    }

    /// Removes a player; returns false when the id was not present.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.players.len() != before
    }

    /// Replaces the stored intent wholesale.
    pub fn set_input(
        &mut self,
        player_id: &str,
        input: PlayerInput,
    ) -> Result<(), UnknownPlayerError> {
        match self.players.iter_mut().find(|p| p.id == player_id) {
            Some(p) => {
                p.input = input;
                Ok(())
            }
            None => Err(UnknownPlayerError {
                player_id: player_id.to_string(),
            }),
        }
    }

    /// Advances the simulation by one tick: movement and clamping, then coin pickups.
    /// Returns the number of coins collected during the tick.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> usize {
        for p in &mut self.players {
            movement::tick_player(p, &self.tuning);
        }

        coins::tick_coins(&mut self.players, &mut self.coins, &self.tuning, rng)
    }

    pub fn player_snapshots(&self) -> Vec<PlayerSnapshot> {
        self.players.iter().map(PlayerSnapshot::from).collect()
    }

    pub fn coin_snapshots(&self) -> Vec<CoinSnapshot> {
        self.coins.iter().map(CoinSnapshot::from).collect()
    }
}

fn random_color<R: Rng>(rng: &mut R) -> String {
    let hue: u16 = rng.random_range(0..360);
    format!("hsl({hue}, 70%, 50%)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn world() -> (World, StdRng) {
        let mut rng = StdRng::seed_from_u64(99);
        let world = World::new(ArenaTuning::default(), &mut rng);
        (world, rng)
    }

    #[test]
    fn when_world_is_created_then_it_holds_the_configured_coin_count() {
        let (world, _) = world();

        assert_eq!(world.coins().len(), 5);
        assert!(world.players().is_empty());
    }

    #[test]
    fn when_player_spawns_then_it_starts_at_center_with_zero_score_and_no_intent() {
        let (mut world, mut rng) = world();

        let p = world.spawn_player("p1".to_string(), &mut rng);

        assert_eq!((p.x, p.y), (300.0, 300.0));
        assert_eq!(p.score, 0);
        assert_eq!(p.input, PlayerInput::default());
        assert!(p.color.starts_with("hsl(") && p.color.ends_with(", 70%, 50%)"));
    }

    #[test]
    fn when_input_is_set_then_it_replaces_the_previous_intent_wholesale() {
        let (mut world, mut rng) = world();
        world.spawn_player("p1".to_string(), &mut rng);
        world
            .set_input(
                "p1",
                PlayerInput {
                    left: true,
                    up: true,
                    ..Default::default()
                },
            )
            .expect("player exists");

        world
            .set_input(
                "p1",
                PlayerInput {
                    right: true,
                    ..Default::default()
                },
            )
            .expect("player exists");

        let p = world.player("p1").expect("player exists");
        assert_eq!(
            p.input,
            PlayerInput {
                right: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn when_input_targets_unknown_player_then_returns_error_and_world_is_unchanged() {
        let (mut world, mut rng) = world();
        world.spawn_player("p1".to_string(), &mut rng);

        let result = world.set_input(
            "ghost",
            PlayerInput {
                down: true,
                ..Default::default()
            },
        );

        assert_eq!(
            result,
            Err(UnknownPlayerError {
                player_id: "ghost".to_string()
            })
        );
        assert_eq!(world.players().len(), 1);
        assert_eq!(world.player("p1").map(|p| p.input), Some(PlayerInput::default()));
    }

    #[test]
    fn when_player_is_removed_twice_then_second_removal_is_a_noop() {
        let (mut world, mut rng) = world();
        world.spawn_player("p1".to_string(), &mut rng);

        assert!(world.remove_player("p1"));
        assert!(!world.remove_player("p1"));
        assert!(!world.contains_player("p1"));
    }

    #[test]
    fn when_step_runs_then_held_intent_moves_player_each_tick() {
        let (mut world, mut rng) = world();
        world.spawn_player("p1".to_string(), &mut rng);
        world
            .set_input(
                "p1",
                PlayerInput {
                    up: true,
                    ..Default::default()
                },
            )
            .expect("player exists");

        world.step(&mut rng);
        world.step(&mut rng);

        let p = world.player("p1").expect("player exists");
        assert_eq!((p.x, p.y), (300.0, 290.0));
    }

    #[test]
    fn when_snapshot_is_taken_then_later_steps_do_not_change_it() {
        let (mut world, mut rng) = world();
        world.spawn_player("p1".to_string(), &mut rng);
        world
            .set_input(
                "p1",
                PlayerInput {
                    right: true,
                    ..Default::default()
                },
            )
            .expect("player exists");

        let players = world.player_snapshots();
        world.step(&mut rng);

        assert_eq!(players[0].x, 300.0);
        assert_eq!(world.player("p1").map(|p| p.x), Some(305.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn input_from_bits(bits: u8) -> PlayerInput {
            PlayerInput {
                left: bits & 1 != 0,
                right: bits & 2 != 0,
                up: bits & 4 != 0,
                down: bits & 8 != 0,
            }
        }

        proptest! {
            #[test]
            fn invariants_hold_after_every_tick(
                seed in 0u64..10_000,
                player_count in 1usize..6,
                moves in proptest::collection::vec(0u8..16, 1..300)
            ) {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut world = World::new(ArenaTuning::default(), &mut rng);
                for i in 0..player_count {
                    world.spawn_player(format!("p{i}"), &mut rng);
                }
                let max = world.tuning().max_player_coord();
                let mut last_scores = vec![0u32; player_count];

                for (tick, bits) in moves.iter().enumerate() {
                    let id = format!("p{}", tick % player_count);
                    world.set_input(&id, input_from_bits(*bits)).expect("player exists");
                    world.step(&mut rng);

                    prop_assert_eq!(world.coins().len(), 5);
                    for (i, p) in world.players().iter().enumerate() {
                        prop_assert!(p.x >= 0.0 && p.x <= max, "x={} out of bounds", p.x);
                        prop_assert!(p.y >= 0.0 && p.y <= max, "y={} out of bounds", p.y);
                        prop_assert!(p.score >= last_scores[i]);
                        last_scores[i] = p.score;
                    }
                }
            }
        }
    }
}
