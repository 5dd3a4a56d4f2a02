use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

pub(crate) const STARTING_COINS: u32 = 100;
pub(crate) const DEFAULT_ADOPT_COST: u32 = 50;
pub(crate) const DANCE_MOVES: [&str; 4] = ["Salsa", "Ballet", "Hip Hop", "Tap"];

pub(crate) const STAT_MAX: u32 = 100;
pub(crate) const TIRED_BELOW: u32 = 20;
pub(crate) const DANCE_ENERGY_COST: u32 = 10;
pub(crate) const DANCE_HAPPINESS_GAIN: u32 = 5;
pub(crate) const COINS_PER_SKILL_POINT: u32 = 5;
pub(crate) const REST_RECOVERY_MAX: u32 = 30;

// Skill is tracked in tenths so that floor(skill) stays exact.
pub(crate) const SKILL_START_TENTHS: u32 = 10;
pub(crate) const SKILL_STEP_TENTHS: u32 = 1;

const FEED_LEN: usize = 6;
pub(crate) const DANCE_ANIM_FRAMES: u32 = 24;

#[derive(Clone, Debug)]
pub(crate) struct Rules {
    pub(crate) adopt_cost: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            adopt_cost: DEFAULT_ADOPT_COST,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scene {
    Main,
    Help,
    Facts,
    Leaderboard,
}

impl Scene {
    /// Tab order through the pages.
    pub(crate) fn next_page(self) -> Self {
        match self {
            Scene::Main => Scene::Facts,
            Scene::Facts => Scene::Leaderboard,
            Scene::Leaderboard | Scene::Help => Scene::Main,
        }
    }
}

/// Whether a bird can currently dance. Derived from energy on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Activity {
    Ready,
    Exhausted,
}

#[derive(Clone, Debug)]
pub(crate) struct Bird {
    pub(crate) name: String,
    pub(crate) happiness: u32,
    pub(crate) energy: u32,
    pub(crate) skill_tenths: u32,
    pub(crate) favorite_move: &'static str,
    pub(crate) last_interaction: DateTime<Utc>,
    /// Frames left on the dance wiggle animation.
    pub(crate) dance_frames: u32,
}

impl Bird {
    /// A fresh bird whose favorite move is drawn from `moves`.
    pub(crate) fn new(name: String, moves: &[&'static str], rng: &mut impl Rng) -> Self {
        let favorite_move = moves.choose(rng).copied().unwrap_or(DANCE_MOVES[0]);
        Self {
            name,
            happiness: STAT_MAX,
            energy: STAT_MAX,
            skill_tenths: SKILL_START_TENTHS,
            favorite_move,
            last_interaction: Utc::now(),
            dance_frames: 0,
        }
    }

    pub(crate) fn dance_skill(&self) -> f32 {
        self.skill_tenths as f32 / 10.0
    }

    /// Whole skill points, the upper bound of the reward roll.
    pub(crate) fn skill_level(&self) -> u32 {
        self.skill_tenths / 10
    }

    pub(crate) fn activity(&self) -> Activity {
        if self.energy < TIRED_BELOW {
            Activity::Exhausted
        } else {
            Activity::Ready
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GameState {
    pub(crate) birds: Vec<Bird>,
    pub(crate) coins: u32,
    pub(crate) dance_moves: &'static [&'static str],
    pub(crate) scene: Scene,
    pub(crate) selected: usize,
    pub(crate) feed: VecDeque<Message>,
}

impl GameState {
    pub(crate) fn new() -> Self {
        Self {
            birds: Vec::new(),
            coins: STARTING_COINS,
            dance_moves: &DANCE_MOVES,
            scene: Scene::Main,
            selected: 0,
            feed: VecDeque::with_capacity(FEED_LEN),
        }
    }

    pub(crate) fn push_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        if self.feed.len() == FEED_LEN {
            self.feed.pop_front();
        }
        self.feed.push_back(Message {
            kind,
            text: text.into(),
        });
    }

    /// Birds ordered by dance skill, best first. Ties keep adoption order.
    pub(crate) fn leaderboard(&self) -> Vec<&Bird> {
        let mut ranked: Vec<&Bird> = self.birds.iter().collect();
        ranked.sort_by(|a, b| b.skill_tenths.cmp(&a.skill_tenths));
        ranked
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MessageKind {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub(crate) struct Message {
    pub(crate) kind: MessageKind,
    pub(crate) text: String,
}
