// Domain-level simulation entities and input/snapshot types.

/// Opaque identifier assigned to a player when its connection is accepted.
pub type PlayerId = String;

/// Opaque identifier assigned to a coin when it spawns.
pub type CoinId = String;

/// Movement intent: four independent direction flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl PlayerInput {
    /// Signed per-axis direction in `{-1, 0, 1}`; opposing flags cancel.
    pub fn axis(&self) -> (f32, f32) {
        let dx = f32::from(u8::from(self.right)) - f32::from(u8::from(self.left));
        let dy = f32::from(u8::from(self.down)) - f32::from(u8::from(self.up));
        (dx, dy)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub score: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoinSnapshot {
    pub id: CoinId,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    // Top-left corner of the bounding box.
    pub x: f32,
    pub y: f32,
    pub score: u32,
    // Assigned once on join.
    pub color: String,

    // Movement-only state (do not serialize to clients)
    pub input: PlayerInput,
}

impl Player {
    pub fn new(id: PlayerId, x: f32, y: f32, color: String) -> Self {
        Self {
            id,
            x,
            y,
            score: 0,
            color,
            input: PlayerInput::default(),
        }
    }

    /// Center of the bounding box for a player of the given size.
    pub fn center(&self, player_size: f32) -> (f32, f32) {
        let half = player_size / 2.0;
        (self.x + half, self.y + half)
    }
}

#[derive(Debug, Clone)]
pub struct Coin {
    pub id: CoinId,
    // Center of the coin.
    pub x: f32,
    pub y: f32,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            x: p.x,
            y: p.y,
            score: p.score,
            color: p.color.clone(),
        }
    }
}

impl From<&Coin> for CoinSnapshot {
    fn from(c: &Coin) -> Self {
        Self {
            id: c.id.clone(),
            x: c.x,
            y: c.y,
        }
    }
}
