use crate::error::{ActionError, ActionKind};
use crate::model::{
    Activity, Bird, GameState, MessageKind, Rules, Scene, COINS_PER_SKILL_POINT,
    DANCE_ANIM_FRAMES, DANCE_ENERGY_COST, DANCE_HAPPINESS_GAIN, REST_RECOVERY_MAX,
    SKILL_START_TENTHS, SKILL_STEP_TENTHS, STAT_MAX,
};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayerAction {
    Adopt,
    Dance,
    Rest,
    SelectPrev,
    SelectNext,
    Reset,
    HelpToggle,
    NextPage,
    Back,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Performance {
    pub(crate) reward: u32,
    pub(crate) message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Recovery {
    pub(crate) amount: u32,
    pub(crate) message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Adoption {
    pub(crate) name: String,
    pub(crate) cost: u32,
    pub(crate) message: String,
}

pub(crate) type DanceOutcome = Result<Performance, ActionError>;
pub(crate) type RestOutcome = Result<Recovery, ActionError>;

/// Flattens a dance result to the `(reward, message)` pair shown to the
/// player. Every refusal pays nothing.
pub(crate) fn reward_and_message(outcome: &DanceOutcome) -> (u32, String) {
    match outcome {
        Ok(p) => (p.reward, p.message.clone()),
        Err(e) => (0, e.to_string()),
    }
}

impl Bird {
    pub(crate) fn dance(&mut self, rng: &mut impl Rng) -> DanceOutcome {
        self.check_invariants(ActionKind::Dance)?;

        if self.activity() == Activity::Exhausted {
            return Err(ActionError::Exhausted {
                name: self.name.clone(),
                energy: self.energy,
            });
        }

        let skill_bonus = rng.gen_range(1..=self.skill_level());
        let reward = skill_bonus
            .checked_mul(COINS_PER_SKILL_POINT)
            .ok_or_else(|| self.fault(ActionKind::Dance, "reward overflow"))?;
        let skill_tenths = self
            .skill_tenths
            .checked_add(SKILL_STEP_TENTHS)
            .ok_or_else(|| self.fault(ActionKind::Dance, "skill overflow"))?;

        self.energy = self.energy.saturating_sub(DANCE_ENERGY_COST);
        self.happiness = (self.happiness + DANCE_HAPPINESS_GAIN).min(STAT_MAX);
        self.skill_tenths = skill_tenths;
        self.dance_frames = DANCE_ANIM_FRAMES;

        Ok(Performance {
            reward,
            message: format!("{} earned {} coins dancing!", self.name, reward),
        })
    }

    pub(crate) fn rest(&mut self) -> RestOutcome {
        self.check_invariants(ActionKind::Rest)?;

        let amount = REST_RECOVERY_MAX.min(STAT_MAX - self.energy);
        self.energy += amount;

        Ok(Recovery {
            amount,
            message: format!("{} recovered {} energy!", self.name, amount),
        })
    }

    pub(crate) fn tick_animation(&mut self) {
        self.dance_frames = self.dance_frames.saturating_sub(1);
    }

    fn check_invariants(&self, action: ActionKind) -> Result<(), ActionError> {
        if self.energy > STAT_MAX {
            return Err(self.fault(action, "energy above 100"));
        }
        if self.happiness > STAT_MAX {
            return Err(self.fault(action, "happiness above 100"));
        }
        if self.skill_tenths < SKILL_START_TENTHS {
            return Err(self.fault(action, "dance skill below 1"));
        }
        Ok(())
    }

    fn fault(&self, action: ActionKind, what: &str) -> ActionError {
        log::error!("{:?} failed for {}: {}", action, self.name, what);
        ActionError::InternalFault { action }
    }
}

impl GameState {
    /// Back to a fresh session: no birds, starting coins, main page.
    pub(crate) fn reset(&mut self) {
        *self = GameState::new();
    }

    pub(crate) fn adopt(&mut self, cost: u32, rng: &mut impl Rng) -> Result<Adoption, ActionError> {
        if self.coins < cost {
            return Err(ActionError::InsufficientFunds {
                cost,
                available: self.coins,
            });
        }

        let name = format!("Flamingo_{}", self.birds.len() + 1);
        self.birds.push(Bird::new(name.clone(), self.dance_moves, rng));
        self.coins -= cost;
        self.selected = self.birds.len() - 1;

        Ok(Adoption {
            message: format!("Welcome {} to your flock!", name),
            name,
            cost,
        })
    }

    /// Dances the bird at `index` and banks the reward.
    pub(crate) fn dance_bird(&mut self, index: usize, rng: &mut impl Rng) -> DanceOutcome {
        let bird = self
            .birds
            .get_mut(index)
            .ok_or(ActionError::NoSuchBird { index })?;
        let outcome = bird.dance(rng);
        let (reward, _) = reward_and_message(&outcome);
        self.coins = self.coins.saturating_add(reward);
        outcome
    }

    pub(crate) fn rest_bird(&mut self, index: usize) -> RestOutcome {
        self.birds
            .get_mut(index)
            .ok_or(ActionError::NoSuchBird { index })?
            .rest()
    }

    pub(crate) fn tick_animations(&mut self) {
        for bird in &mut self.birds {
            bird.tick_animation();
        }
    }

    pub(crate) fn apply(&mut self, action: PlayerAction, rules: &Rules, rng: &mut impl Rng) {
        match action {
            PlayerAction::Adopt => match self.adopt(rules.adopt_cost, rng) {
                Ok(adoption) => {
                    log::info!("adopted {} for {} coins", adoption.name, adoption.cost);
                    self.push_message(MessageKind::Success, adoption.message);
                }
                Err(e) => self.report(e),
            },
            PlayerAction::Dance => {
                let index = self.selected;
                let outcome = self.dance_bird(index, rng);
                if let Ok(p) = &outcome {
                    log::info!("bird #{} danced for {} coins", index + 1, p.reward);
                }
                match outcome {
                    Ok(p) => self.push_message(MessageKind::Success, p.message),
                    Err(e) => self.report(e),
                }
            }
            PlayerAction::Rest => match self.rest_bird(self.selected) {
                Ok(r) => {
                    log::info!("bird #{} rested, +{} energy", self.selected + 1, r.amount);
                    self.push_message(MessageKind::Success, r.message);
                }
                Err(e) => self.report(e),
            },
            PlayerAction::SelectPrev => {
                if !self.birds.is_empty() {
                    let len = self.birds.len();
                    self.selected = (self.selected + len - 1) % len;
                }
            }
            PlayerAction::SelectNext => {
                if !self.birds.is_empty() {
                    self.selected = (self.selected + 1) % self.birds.len();
                }
            }
            PlayerAction::Reset => {
                log::info!("game reset");
                self.reset();
                self.push_message(MessageKind::Info, "Game reset to default values.");
            }
            PlayerAction::HelpToggle => {
                self.scene = match self.scene {
                    Scene::Help => Scene::Main,
                    _ => Scene::Help,
                };
            }
            PlayerAction::NextPage => self.scene = self.scene.next_page(),
            PlayerAction::Back => self.scene = Scene::Main,
            PlayerAction::Quit => {}
        }
    }

    fn report(&mut self, err: ActionError) {
        match &err {
            ActionError::InsufficientFunds { cost, available } => {
                log::debug!("adopt refused: costs {cost}, have {available}")
            }
            ActionError::Exhausted { name, energy } => {
                log::debug!("{name} too tired to dance at {energy} energy")
            }
            ActionError::NoSuchBird { index } => log::debug!("no bird at index {index}"),
            // already logged where it was caught
            ActionError::InternalFault { .. } => {}
        }
        self.push_message(MessageKind::Error, err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DANCE_MOVES, DEFAULT_ADOPT_COST};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn state_with_bird(rng: &mut ChaCha8Rng) -> GameState {
        let mut st = GameState::new();
        st.adopt(DEFAULT_ADOPT_COST, rng).expect("adopt with starting coins");
        st
    }

    #[test]
    fn test_adopt_with_enough_coins() {
        let mut rng = create_test_rng();
        let mut st = GameState::new();
        let adoption = st.adopt(50, &mut rng).unwrap();

        assert_eq!(adoption.name, "Flamingo_1");
        assert_eq!(adoption.message, "Welcome Flamingo_1 to your flock!");
        assert_eq!(st.birds.len(), 1);
        assert_eq!(st.birds[0].name, "Flamingo_1");
        assert_eq!(st.coins, 50);
    }

    #[test]
    fn test_adopt_without_enough_coins_changes_nothing() {
        let mut rng = create_test_rng();
        let mut st = GameState::new();
        st.coins = 40;

        let err = st.adopt(50, &mut rng).unwrap_err();
        assert_eq!(
            err,
            ActionError::InsufficientFunds {
                cost: 50,
                available: 40
            }
        );
        assert!(st.birds.is_empty());
        assert_eq!(st.coins, 40);
    }

    #[test]
    fn test_adopt_names_follow_roster_position() {
        let mut rng = create_test_rng();
        let mut st = GameState::new();
        st.coins = 1_000;
        for _ in 0..3 {
            st.adopt(50, &mut rng).unwrap();
        }
        let names: Vec<&str> = st.birds.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Flamingo_1", "Flamingo_2", "Flamingo_3"]);
        assert_eq!(st.coins, 850);
        assert_eq!(st.selected, 2);
    }

    #[test]
    fn test_adopt_exact_balance_reaches_zero() {
        let mut rng = create_test_rng();
        let mut st = GameState::new();
        st.coins = 50;
        assert!(st.adopt(50, &mut rng).is_ok());
        assert_eq!(st.coins, 0);
        assert!(st.adopt(50, &mut rng).is_err());
        assert_eq!(st.birds.len(), 1);
    }

    #[test]
    fn test_first_dance_scenario() {
        let mut rng = create_test_rng();
        let mut st = GameState::new();
        st.adopt(50, &mut rng).unwrap();
        assert_eq!(st.coins, 50);

        let p = st.dance_bird(0, &mut rng).unwrap();
        assert_eq!(p.reward, 5);
        assert_eq!(p.message, "Flamingo_1 earned 5 coins dancing!");
        assert_eq!(st.coins, 55);

        let bird = &st.birds[0];
        assert_eq!(bird.energy, 90);
        assert_eq!(bird.skill_tenths, 11);
        assert!((bird.dance_skill() - 1.1).abs() < 1e-6);
        assert_eq!(bird.happiness, 100);
    }

    #[test]
    fn test_tired_bird_refuses_without_change() {
        let mut rng = create_test_rng();
        let mut st = state_with_bird(&mut rng);
        st.birds[0].energy = 15;
        st.birds[0].happiness = 60;
        let coins = st.coins;

        let outcome = st.dance_bird(0, &mut rng);
        let (reward, message) = reward_and_message(&outcome);
        assert_eq!(reward, 0);
        assert!(message.contains("Too tired"));

        let bird = &st.birds[0];
        assert_eq!(bird.energy, 15);
        assert_eq!(bird.happiness, 60);
        assert_eq!(bird.skill_tenths, 10);
        assert_eq!(st.coins, coins);
    }

    #[test]
    fn test_dance_at_threshold_energy_is_allowed() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        bird.energy = 20;
        assert!(bird.dance(&mut rng).is_ok());
        assert_eq!(bird.energy, 10);
        assert_eq!(bird.activity(), Activity::Exhausted);
    }

    #[test]
    fn test_dance_reward_stays_within_skill_range() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        bird.skill_tenths = 37;

        for _ in 0..200 {
            bird.energy = 100;
            let before = bird.skill_level();
            let p = bird.dance(&mut rng).unwrap();
            assert_eq!(p.reward % 5, 0);
            let bonus = p.reward / 5;
            assert!((1..=before).contains(&bonus), "bonus {bonus} outside 1..={before}");
        }
    }

    #[test]
    fn test_dance_steps_are_exact() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        let mut expected_tenths = bird.skill_tenths;

        while bird.energy >= 20 {
            let energy = bird.energy;
            bird.dance(&mut rng).unwrap();
            expected_tenths += 1;
            assert_eq!(bird.energy, energy - 10);
            assert_eq!(bird.skill_tenths, expected_tenths);
        }
        // Nine dances take 100 energy down to 10.
        assert_eq!(bird.energy, 10);
        assert_eq!(bird.skill_tenths, 19);
        assert_eq!(bird.skill_level(), 1);
    }

    #[test]
    fn test_skill_reaches_two_after_ten_dances() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        for _ in 0..10 {
            bird.energy = 100;
            bird.dance(&mut rng).unwrap();
        }
        assert_eq!(bird.skill_level(), 2);
        assert!((bird.dance_skill() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_happiness_never_exceeds_max() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        bird.happiness = 98;
        bird.dance(&mut rng).unwrap();
        assert_eq!(bird.happiness, 100);
        bird.dance(&mut rng).unwrap();
        assert_eq!(bird.happiness, 100);
    }

    #[test]
    fn test_rest_recovers_up_to_thirty() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);

        bird.energy = 40;
        let r = bird.rest().unwrap();
        assert_eq!(r.amount, 30);
        assert_eq!(bird.energy, 70);
        assert_eq!(r.message, "Flamingo_1 recovered 30 energy!");

        bird.energy = 85;
        assert_eq!(bird.rest().unwrap().amount, 15);
        assert_eq!(bird.energy, 100);
    }

    #[test]
    fn test_rest_at_full_energy_is_noop() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        let r = bird.rest().unwrap();
        assert_eq!(r.amount, 0);
        assert_eq!(bird.energy, 100);
    }

    #[test]
    fn test_energy_stays_in_bounds_for_any_sequence() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);

        for _ in 0..2_000 {
            if rng.gen_bool(0.7) {
                let _ = bird.dance(&mut rng);
            } else {
                let _ = bird.rest();
            }
            assert!(bird.energy <= 100);
            assert!(bird.happiness <= 100);
            assert!(bird.skill_tenths >= 10);
        }
    }

    #[test]
    fn test_corrupted_stats_are_reported_not_mutated() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        bird.energy = 250;

        let outcome = bird.dance(&mut rng);
        assert_eq!(
            outcome,
            Err(ActionError::InternalFault {
                action: ActionKind::Dance
            })
        );
        let (reward, message) = reward_and_message(&outcome);
        assert_eq!(reward, 0);
        assert_eq!(message, "Something went wrong during the dance!");
        assert_eq!(bird.energy, 250);
        assert_eq!(bird.skill_tenths, 10);

        let rest = bird.rest().unwrap_err();
        assert_eq!(rest.to_string(), "Unable to rest right now.");
    }

    #[test]
    fn test_skill_overflow_is_a_fault() {
        let mut rng = create_test_rng();
        let mut bird = Bird::new("Flamingo_1".into(), &DANCE_MOVES, &mut rng);
        bird.skill_tenths = u32::MAX;
        assert!(matches!(
            bird.dance(&mut rng),
            Err(ActionError::InternalFault { .. })
        ));
        assert_eq!(bird.energy, 100);
    }

    #[test]
    fn test_unknown_bird_index() {
        let mut rng = create_test_rng();
        let mut st = GameState::new();
        assert_eq!(
            st.dance_bird(3, &mut rng),
            Err(ActionError::NoSuchBird { index: 3 })
        );
        assert_eq!(st.rest_bird(0), Err(ActionError::NoSuchBird { index: 0 }));
        assert_eq!(st.coins, 100);
    }

    #[test]
    fn test_reset_restores_defaults_and_is_idempotent() {
        let mut rng = create_test_rng();
        let mut st = state_with_bird(&mut rng);
        st.scene = Scene::Leaderboard;
        st.dance_bird(0, &mut rng).unwrap();

        st.reset();
        assert!(st.birds.is_empty());
        assert_eq!(st.coins, 100);
        assert_eq!(st.scene, Scene::Main);
        assert_eq!(st.selected, 0);

        st.reset();
        assert!(st.birds.is_empty());
        assert_eq!(st.coins, 100);
        assert_eq!(st.dance_moves.len(), 4);
    }

    #[test]
    fn test_apply_dance_credits_coins_and_reports() {
        let mut rng = create_test_rng();
        let rules = Rules::default();
        let mut st = GameState::new();

        st.apply(PlayerAction::Adopt, &rules, &mut rng);
        st.apply(PlayerAction::Dance, &rules, &mut rng);

        assert_eq!(st.coins, 55);
        let last = st.feed.back().unwrap();
        assert_eq!(last.kind, MessageKind::Success);
        assert_eq!(last.text, "Flamingo_1 earned 5 coins dancing!");
        assert!(st.birds[0].dance_frames > 0);
    }

    #[test]
    fn test_apply_refusals_become_error_messages() {
        let mut rng = create_test_rng();
        let rules = Rules::default();
        let mut st = GameState::new();

        st.apply(PlayerAction::Dance, &rules, &mut rng);
        assert_eq!(st.feed.back().unwrap().kind, MessageKind::Error);

        st.apply(PlayerAction::Adopt, &rules, &mut rng);
        st.apply(PlayerAction::Adopt, &rules, &mut rng);
        st.apply(PlayerAction::Adopt, &rules, &mut rng);
        assert_eq!(st.birds.len(), 2);
        assert_eq!(st.coins, 0);
        let last = st.feed.back().unwrap();
        assert_eq!(last.kind, MessageKind::Error);
        assert_eq!(last.text, "Not enough coins!");
    }

    #[test]
    fn test_apply_selection_wraps() {
        let mut rng = create_test_rng();
        let rules = Rules { adopt_cost: 10 };
        let mut st = GameState::new();
        for _ in 0..3 {
            st.apply(PlayerAction::Adopt, &rules, &mut rng);
        }
        assert_eq!(st.selected, 2);
        st.apply(PlayerAction::SelectNext, &rules, &mut rng);
        assert_eq!(st.selected, 0);
        st.apply(PlayerAction::SelectPrev, &rules, &mut rng);
        assert_eq!(st.selected, 2);

        st.apply(PlayerAction::Rest, &rules, &mut rng);
        assert_eq!(
            st.feed.back().unwrap().text,
            "Flamingo_3 recovered 0 energy!"
        );
    }

    #[test]
    fn test_apply_reset_and_navigation() {
        let mut rng = create_test_rng();
        let rules = Rules::default();
        let mut st = GameState::new();

        st.apply(PlayerAction::HelpToggle, &rules, &mut rng);
        assert_eq!(st.scene, Scene::Help);
        st.apply(PlayerAction::HelpToggle, &rules, &mut rng);
        assert_eq!(st.scene, Scene::Main);
        st.apply(PlayerAction::NextPage, &rules, &mut rng);
        assert_eq!(st.scene, Scene::Facts);
        st.apply(PlayerAction::Back, &rules, &mut rng);
        assert_eq!(st.scene, Scene::Main);

        st.apply(PlayerAction::Adopt, &rules, &mut rng);
        st.apply(PlayerAction::Reset, &rules, &mut rng);
        assert!(st.birds.is_empty());
        assert_eq!(st.coins, 100);
        assert_eq!(st.feed.len(), 1);
        assert_eq!(st.feed.back().unwrap().kind, MessageKind::Info);
    }

    #[test]
    fn test_animation_winds_down() {
        let mut rng = create_test_rng();
        let mut st = state_with_bird(&mut rng);
        st.dance_bird(0, &mut rng).unwrap();
        for _ in 0..DANCE_ANIM_FRAMES + 5 {
            st.tick_animations();
        }
        assert_eq!(st.birds[0].dance_frames, 0);
    }
}
