pub mod loader;
pub mod monsters;
pub mod party;

pub use loader::{load_monster_file, load_roster, parse_monsters};
pub use monsters::{builtin_monsters, find_monster, resolve_monster, MonsterTemplate};
pub use party::{AllyTemplate, CombatantTemplate, PartyComposition, Role};
