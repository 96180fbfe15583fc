// Per-tick simulation systems, applied in order by the world step.

pub mod coins;
pub mod movement;
