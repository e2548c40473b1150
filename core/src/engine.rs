pub mod damage;
pub mod enemy_ai;
pub mod event_bus;
pub mod skill_system;
pub mod targeting;
pub mod turn_system;

mod snapshot;
