use crate::step_api::{round2, ActiveBattle, Snapshot, UnitSnapshot};

impl ActiveBattle {
    pub(crate) fn snapshot(&self) -> Snapshot {
        let controller = &self.controller;
        let scheduler = controller.scheduler();

        Snapshot {
            ended: controller.is_battle_over(),
            victory: controller.is_victory(),
            units: controller
                .characters()
                .iter()
                .map(|c| UnitSnapshot {
                    id: c.id().0,
                    name: c.name.clone(),
                    team: c.team().as_str().to_string(),
                    hp: c.hp,
                    max_hp: c.max_hp,
                    mp: c.mp,
                    max_mp: c.max_mp,
                    turn_gauge: round2(scheduler.gauge(c.id()).unwrap_or(0.0)),
                })
                .collect(),
        }
    }
}
