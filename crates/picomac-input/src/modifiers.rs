//! Held-modifier tracking and the Control+Alt system combos.

use bitflags::bitflags;

use crate::keycode::{raw_key, KeyState, RawKeyEvent};

bitflags! {
    /// Modifier keys currently held on the handheld keyboard.
    ///
    /// `SHIFT` is set while either shift key is held, so a single left shift reads as `0x03`
    /// and a single right shift as `0x05`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const LEFT_SHIFT = 1 << 1;
        const RIGHT_SHIFT = 1 << 2;
        const ALT = 1 << 3;
        const CONTROL = 1 << 4;
    }
}

impl Modifiers {
    fn for_key(code: u8) -> Option<Self> {
        match code {
            raw_key::CONTROL => Some(Modifiers::CONTROL),
            raw_key::ALT => Some(Modifiers::ALT),
            raw_key::LEFT_SHIFT => Some(Modifiers::LEFT_SHIFT),
            raw_key::RIGHT_SHIFT => Some(Modifiers::RIGHT_SHIFT),
            _ => None,
        }
    }
}

/// Irreversible system-level actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAction {
    /// Control+Alt+F1: reboot into the USB firmware-update bootloader.
    RebootToBootloader,
    /// Control+Alt+Delete: hard restart via the watchdog.
    WatchdogReset,
}

/// Capability that carries out [`SystemAction`]s. On hardware neither call returns.
pub trait SystemControl {
    fn perform(&mut self, action: SystemAction);
}

#[derive(Debug, Default, Clone)]
pub struct ModifierTracker {
    mask: Modifiers,
}

impl ModifierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask(&self) -> Modifiers {
        self.mask
    }

    pub fn reset(&mut self) {
        self.mask = Modifiers::empty();
    }

    /// Apply one controller event. Returns `true` if the mask changed.
    pub fn update(&mut self, event: RawKeyEvent) -> bool {
        let Some(bit) = Modifiers::for_key(event.code) else {
            return false;
        };

        let before = self.mask;
        match event.state {
            KeyState::Pressed => self.mask.insert(bit),
            KeyState::Released => self.mask.remove(bit),
            _ => return false,
        }
        let any_shift = self
            .mask
            .intersects(Modifiers::LEFT_SHIFT | Modifiers::RIGHT_SHIFT);
        self.mask.set(Modifiers::SHIFT, any_shift);

        self.mask != before
    }

    /// Check `event` against the system combos. Fires only on the release edge of the trigger
    /// key while exactly Control and Alt are held.
    pub fn system_action(&self, event: RawKeyEvent) -> Option<SystemAction> {
        if event.state != KeyState::Released || self.mask != Modifiers::CONTROL | Modifiers::ALT {
            return None;
        }
        match event.code {
            raw_key::F1 => Some(SystemAction::RebootToBootloader),
            raw_key::DELETE => Some(SystemAction::WatchdogReset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(keys: &[u8]) -> ModifierTracker {
        let mut t = ModifierTracker::new();
        for &k in keys {
            t.update(RawKeyEvent::pressed(k));
        }
        t
    }

    #[test]
    fn single_shift_values_match_controller_convention() {
        assert_eq!(tracker_with(&[raw_key::LEFT_SHIFT]).mask().bits(), 0x03);
        assert_eq!(tracker_with(&[raw_key::RIGHT_SHIFT]).mask().bits(), 0x05);
        assert_eq!(tracker_with(&[raw_key::ALT]).mask().bits(), 0x08);
        assert_eq!(tracker_with(&[raw_key::CONTROL]).mask().bits(), 0x10);
    }

    #[test]
    fn generic_shift_stays_set_while_other_shift_is_held() {
        let mut t = tracker_with(&[raw_key::LEFT_SHIFT, raw_key::RIGHT_SHIFT]);
        t.update(RawKeyEvent::released(raw_key::LEFT_SHIFT));
        assert_eq!(t.mask(), Modifiers::SHIFT | Modifiers::RIGHT_SHIFT);
        t.update(RawKeyEvent::released(raw_key::RIGHT_SHIFT));
        assert_eq!(t.mask(), Modifiers::empty());
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut t = tracker_with(&[raw_key::CONTROL]);
        assert!(!t.update(RawKeyEvent::pressed(raw_key::CONTROL)));
        assert_eq!(t.mask(), Modifiers::CONTROL);
    }

    #[test]
    fn hold_states_and_other_keys_are_ignored() {
        let mut t = ModifierTracker::new();
        assert!(!t.update(RawKeyEvent::new(raw_key::ALT, KeyState::Hold)));
        assert!(!t.update(RawKeyEvent::pressed(b'a')));
        assert_eq!(t.mask(), Modifiers::empty());
    }

    #[test]
    fn press_then_release_restores_every_prior_mask() {
        let keys = [
            raw_key::CONTROL,
            raw_key::ALT,
            raw_key::LEFT_SHIFT,
            raw_key::RIGHT_SHIFT,
        ];
        for held in 0u8..16 {
            let prior: Vec<u8> = keys
                .iter()
                .enumerate()
                .filter(|(i, _)| held & (1 << i) != 0)
                .map(|(_, k)| *k)
                .collect();
            for &k in keys.iter().filter(|k| !prior.contains(k)) {
                let mut t = tracker_with(&prior);
                let before = t.mask();
                t.update(RawKeyEvent::pressed(k));
                t.update(RawKeyEvent::released(k));
                assert_eq!(t.mask(), before, "held={prior:?} key={k:#04x}");
            }
        }
    }

    #[test]
    fn combos_fire_on_release_with_exact_modifiers() {
        let t = tracker_with(&[raw_key::CONTROL, raw_key::ALT]);
        assert_eq!(
            t.system_action(RawKeyEvent::released(raw_key::F1)),
            Some(SystemAction::RebootToBootloader)
        );
        assert_eq!(
            t.system_action(RawKeyEvent::released(raw_key::DELETE)),
            Some(SystemAction::WatchdogReset)
        );
        assert_eq!(t.system_action(RawKeyEvent::pressed(raw_key::F1)), None);
        assert_eq!(t.system_action(RawKeyEvent::released(b'a')), None);
    }

    #[test]
    fn combos_reject_subsets_and_supersets() {
        let subset = tracker_with(&[raw_key::CONTROL]);
        assert_eq!(subset.system_action(RawKeyEvent::released(raw_key::F1)), None);

        let superset = tracker_with(&[raw_key::CONTROL, raw_key::ALT, raw_key::LEFT_SHIFT]);
        assert_eq!(
            superset.system_action(RawKeyEvent::released(raw_key::DELETE)),
            None
        );
    }
}
