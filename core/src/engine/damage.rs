use crate::rng::RandomSource;

/// Percentage applied to the pre-critical amount on a critical hit.
pub const CRITICAL_MULTIPLIER_PCT: i64 = 150;
/// Skill power meaning "100% of attack".
pub const BASE_SKILL_POWER: i32 = 100;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageParams {
    pub attack: i32,
    pub defense: i32,
    pub skill_power: i32,
    /// Chance in `[0, 1]`. `None` never crits and never rolls.
    pub critical_rate: Option<f64>,
    /// Overrides the roll when set.
    pub forced_critical: Option<bool>,
}

impl DamageParams {
    pub fn new(attack: i32, defense: i32) -> Self {
        Self {
            attack,
            defense,
            skill_power: BASE_SKILL_POWER,
            critical_rate: None,
            forced_critical: None,
        }
    }

    pub fn power(mut self, skill_power: i32) -> Self {
        self.skill_power = skill_power;
        self
    }

    pub fn critical_rate(mut self, rate: f64) -> Self {
        self.critical_rate = Some(rate);
        self
    }

    pub fn forced_critical(mut self, critical: bool) -> Self {
        self.forced_critical = Some(critical);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageResult {
    pub damage: i32,
    pub is_critical: bool,
}

/// `floor(attack * power / 100) - defense`, x1.5 floored on crit, never below 1.
pub fn compute_damage(attack: i32, defense: i32, skill_power: i32, is_critical: bool) -> i32 {
    let mut base = (attack as i64 * skill_power as i64).div_euclid(100) - defense as i64;
    if is_critical {
        base = (base * CRITICAL_MULTIPLIER_PCT).div_euclid(100);
    }
    base.clamp(1, i32::MAX as i64) as i32
}

/// Damage formula bound to the battle's random source for critical rolls.
pub struct DamageCalculator<'r> {
    rng: &'r mut dyn RandomSource,
}

impl<'r> DamageCalculator<'r> {
    pub fn new(rng: &'r mut dyn RandomSource) -> Self {
        Self { rng }
    }

    pub fn calculate(&mut self, params: DamageParams) -> DamageResult {
        let is_critical = match (params.forced_critical, params.critical_rate) {
            (Some(forced), _) => forced,
            (None, Some(rate)) => self.rng.next_unit() < rate,
            (None, None) => false,
        };

        DamageResult {
            damage: compute_damage(params.attack, params.defense, params.skill_power, is_critical),
            is_critical,
        }
    }
}
