use crate::model::{Character, CharacterId};

/// Gauge value at which a character may act.
pub const READY_THRESHOLD: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnEntry {
    pub id: CharacterId,
    pub turn_gauge: f32,
}

/// Speed-proportional turn order with time-skip.
///
/// Entries are never removed; dead characters are skipped by every
/// operation. Speed and liveness are read from the roster passed in, so
/// the scheduler holds no character state besides the gauges.
#[derive(Clone, Debug, Default)]
pub struct TurnScheduler {
    entries: Vec<TurnEntry>,
}

fn find(units: &[Character], id: CharacterId) -> Option<&Character> {
    units.iter().find(|c| c.id == id)
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: CharacterId) {
        self.entries.push(TurnEntry { id, turn_gauge: 0.0 });
    }

    pub fn entries(&self) -> &[TurnEntry] {
        &self.entries
    }

    pub fn gauge(&self, id: CharacterId) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.turn_gauge)
    }

    /// Advances every living entry by `speed * delta_time`, or, when that
    /// would leave nobody ready, jumps straight to the instant the closest
    /// pending entry reaches the threshold.
    pub fn advance(&mut self, units: &[Character], delta_time: f32) {
        let delta_time = delta_time.max(0.0);
        let mut alive: Vec<(usize, f32)> = Vec::with_capacity(self.entries.len());
        for (idx, entry) in self.entries.iter().enumerate() {
            if let Some(unit) = find(units, entry.id).filter(|u| u.is_alive()) {
                alive.push((idx, unit.speed));
            }
        }

        let any_ready_after_tick = alive
            .iter()
            .any(|&(idx, speed)| self.entries[idx].turn_gauge + speed * delta_time >= READY_THRESHOLD);

        if any_ready_after_tick {
            for &(idx, speed) in &alive {
                self.entries[idx].turn_gauge += speed * delta_time;
            }
            return;
        }

        // (entry, time until ready) for everyone who can still get there.
        let pending: Vec<(usize, f32, f32)> = alive
            .iter()
            .filter(|&&(idx, speed)| speed > 0.0 && self.entries[idx].turn_gauge < READY_THRESHOLD)
            .map(|&(idx, speed)| {
                let wait = (READY_THRESHOLD - self.entries[idx].turn_gauge) / speed;
                (idx, speed, wait)
            })
            .collect();

        let Some(jump_time) = pending.iter().map(|&(_, _, wait)| wait).reduce(f32::min) else {
            tracing::debug!("turn scheduler stalled: no living entry with positive speed");
            return;
        };

        tracing::debug!(jump_time, "turn scheduler time-skip");
        for &(idx, speed) in &alive {
            let lands_now = pending
                .iter()
                .any(|&(p, _, wait)| p == idx && wait <= jump_time);
            let entry = &mut self.entries[idx];
            if lands_now {
                entry.turn_gauge = READY_THRESHOLD;
            } else {
                entry.turn_gauge += speed * jump_time;
            }
        }
    }

    /// Living entry with the highest gauge at or above the threshold.
    /// Equal gauges resolve to the earliest added entry.
    pub fn next_ready(&self, units: &[Character]) -> Option<CharacterId> {
        let mut best: Option<&TurnEntry> = None;
        for entry in &self.entries {
            if entry.turn_gauge < READY_THRESHOLD {
                continue;
            }
            if !find(units, entry.id).is_some_and(|u| u.is_alive()) {
                continue;
            }
            if best.map_or(true, |b| entry.turn_gauge > b.turn_gauge) {
                best = Some(entry);
            }
        }
        best.map(|e| e.id)
    }

    /// Spends one turn. Surplus gauge carries over and may go negative.
    pub fn consume(&mut self, id: CharacterId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.turn_gauge -= READY_THRESHOLD;
        }
    }

    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.turn_gauge = 0.0;
        }
    }

    #[cfg(test)]
    pub(crate) fn set_gauge(&mut self, id: CharacterId, gauge: f32) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.turn_gauge = gauge;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TurnScheduler;
    use crate::model::{Character, CharacterId, CharacterStats};

    fn unit(id: u32, speed: f32) -> Character {
        let mut c = Character::new(CharacterStats::new(format!("u{id}"), 100, 10, 5).speed(speed));
        c.id = CharacterId(id);
        c
    }

    fn scheduler_for(units: &[Character]) -> TurnScheduler {
        let mut s = TurnScheduler::new();
        for u in units {
            s.add(u.id);
        }
        s
    }

    #[test]
    fn jumps_to_readiness_of_fastest_entry() {
        let units = [unit(0, 20.0), unit(1, 5.0)];
        let mut s = scheduler_for(&units);
        s.advance(&units, 1.0);
        assert_eq!(s.gauge(CharacterId(0)), Some(100.0));
        assert_eq!(s.gauge(CharacterId(1)), Some(25.0));
        assert_eq!(s.next_ready(&units), Some(CharacterId(0)));
    }

    #[test]
    fn uniform_tick_when_someone_crosses_threshold() {
        let units = [unit(0, 60.0), unit(1, 30.0)];
        let mut s = scheduler_for(&units);
        s.advance(&units, 2.0);
        assert_eq!(s.gauge(CharacterId(0)), Some(120.0));
        assert_eq!(s.gauge(CharacterId(1)), Some(60.0));
    }

    #[test]
    fn tiny_delta_still_makes_progress() {
        let units = [unit(0, 15.0), unit(1, 10.0)];
        let mut s = scheduler_for(&units);
        s.advance(&units, 0.001);
        assert_eq!(s.next_ready(&units), Some(CharacterId(0)));
    }

    #[test]
    fn consume_keeps_surplus() {
        let units = [unit(0, 10.0)];
        let mut s = scheduler_for(&units);
        s.set_gauge(CharacterId(0), 140.0);
        s.consume(CharacterId(0));
        assert_eq!(s.gauge(CharacterId(0)), Some(40.0));

        s.set_gauge(CharacterId(0), 30.0);
        s.consume(CharacterId(0));
        assert_eq!(s.gauge(CharacterId(0)), Some(-70.0));
    }

    #[test]
    fn highest_gauge_wins_and_ties_go_to_insertion_order() {
        let units = [unit(0, 10.0), unit(1, 10.0), unit(2, 10.0)];
        let mut s = scheduler_for(&units);
        s.set_gauge(CharacterId(0), 110.0);
        s.set_gauge(CharacterId(1), 130.0);
        s.set_gauge(CharacterId(2), 130.0);
        assert_eq!(s.next_ready(&units), Some(CharacterId(1)));
    }

    #[test]
    fn dead_entries_neither_advance_nor_act() {
        let mut units = [unit(0, 50.0), unit(1, 10.0)];
        units[0].hp = 0;
        let mut s = scheduler_for(&units);
        s.set_gauge(CharacterId(0), 150.0);
        assert_eq!(s.next_ready(&units), None);

        s.advance(&units, 1.0);
        assert_eq!(s.gauge(CharacterId(0)), Some(150.0));
        assert_eq!(s.gauge(CharacterId(1)), Some(100.0));
    }

    #[test]
    fn all_dead_roster_is_a_no_op() {
        let mut units = [unit(0, 30.0), unit(1, 10.0)];
        for u in &mut units {
            u.hp = 0;
        }
        let mut s = scheduler_for(&units);
        s.set_gauge(CharacterId(0), 120.0);
        s.set_gauge(CharacterId(1), 40.0);

        s.advance(&units, 5.0);
        assert_eq!(s.gauge(CharacterId(0)), Some(120.0));
        assert_eq!(s.gauge(CharacterId(1)), Some(40.0));
        assert_eq!(s.next_ready(&units), None);
    }

    #[test]
    fn zero_speed_roster_is_a_no_op() {
        let units = [unit(0, 0.0), unit(1, 0.0)];
        let mut s = scheduler_for(&units);
        s.advance(&units, 5.0);
        assert_eq!(s.gauge(CharacterId(0)), Some(0.0));
        assert_eq!(s.next_ready(&units), None);
    }

    #[test]
    fn zero_speed_entries_are_ignored_by_the_jump() {
        let units = [unit(0, 0.0), unit(1, 25.0)];
        let mut s = scheduler_for(&units);
        s.advance(&units, 1.0);
        assert_eq!(s.gauge(CharacterId(0)), Some(0.0));
        assert_eq!(s.gauge(CharacterId(1)), Some(100.0));
    }

    #[test]
    fn faster_character_gets_more_turns() {
        let units = [unit(0, 40.0), unit(1, 10.0)];
        let mut s = scheduler_for(&units);
        let mut turns = [0_u32; 2];
        for _ in 0..200 {
            s.advance(&units, 0.5);
            while let Some(id) = s.next_ready(&units) {
                turns[id.0 as usize] += 1;
                s.consume(id);
            }
        }
        assert!(turns[0] > turns[1], "turns: {turns:?}");
        assert!(turns[1] > 0);
    }

    #[test]
    fn reset_zeroes_all_gauges() {
        let units = [unit(0, 20.0), unit(1, 5.0)];
        let mut s = scheduler_for(&units);
        s.advance(&units, 1.0);
        s.reset();
        assert!(s.entries().iter().all(|e| e.turn_gauge == 0.0));
    }
}
