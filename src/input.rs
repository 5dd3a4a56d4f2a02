use crate::model::Scene;
use crate::sim::PlayerAction;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(scene: Scene, ev: &InputEvent) -> Option<PlayerAction> {
    // Global
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(PlayerAction::Quit);
    }
    match ev.key {
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
            return Some(PlayerAction::HelpToggle)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(PlayerAction::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => return Some(PlayerAction::Reset),
        KeyCode::Tab => return Some(PlayerAction::NextPage),
        KeyCode::Esc => return Some(PlayerAction::Back),
        _ => {}
    }

    match scene {
        Scene::Main => match ev.key {
            KeyCode::Char('a') | KeyCode::Char('A') => Some(PlayerAction::Adopt),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char(' ') => {
                Some(PlayerAction::Dance)
            }
            KeyCode::Char('s') | KeyCode::Char('S') => Some(PlayerAction::Rest),
            KeyCode::Left => Some(PlayerAction::SelectPrev),
            KeyCode::Right => Some(PlayerAction::SelectNext),
            _ => None,
        },
        Scene::Help | Scene::Facts | Scene::Leaderboard => None,
    }
}
