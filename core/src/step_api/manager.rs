use std::cell::RefCell;
use std::collections::HashMap;

use super::ActiveBattle;

#[derive(Default)]
struct BattleManager {
    next_handle: u32,
    battles: HashMap<u32, ActiveBattle>,
}

impl BattleManager {
    fn create_battle(&mut self, seed: u32) -> u32 {
        let battle = match ActiveBattle::new(seed as u64) {
            Ok(battle) => battle,
            Err(err) => {
                tracing::warn!(%err, seed, "battle creation failed");
                return 0;
            }
        };
        self.next_handle = self.next_handle.saturating_add(1).max(1);
        let handle = self.next_handle;
        self.battles.insert(handle, battle);
        handle
    }

    fn destroy_battle(&mut self, handle: u32) {
        self.battles.remove(&handle);
    }

    fn reset_battle(&mut self, handle: u32) -> bool {
        let Some(battle) = self.battles.get_mut(&handle) else {
            return false;
        };
        match battle.reset() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, handle, "battle reset failed");
                false
            }
        }
    }
}

thread_local! {
    static MANAGER: RefCell<BattleManager> = RefCell::new(BattleManager::default());
}

pub(super) fn create_battle(seed: u32) -> u32 {
    MANAGER.with(|manager| manager.borrow_mut().create_battle(seed))
}

pub(super) fn destroy_battle(handle: u32) {
    MANAGER.with(|manager| manager.borrow_mut().destroy_battle(handle));
}

pub(super) fn reset_battle(handle: u32) -> bool {
    MANAGER.with(|manager| manager.borrow_mut().reset_battle(handle))
}

pub(super) fn with_battle_mut<T>(handle: u32, f: impl FnOnce(&mut ActiveBattle) -> T) -> Option<T> {
    MANAGER.with(|manager| {
        let mut manager = manager.borrow_mut();
        manager.battles.get_mut(&handle).map(f)
    })
}

pub(super) fn with_battle<T>(handle: u32, f: impl FnOnce(&ActiveBattle) -> T) -> Option<T> {
    MANAGER.with(|manager| {
        let manager = manager.borrow();
        manager.battles.get(&handle).map(f)
    })
}
