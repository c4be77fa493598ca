//! Interaction prompt arbitration. The HUD can only surface one prompt at a
//! time; priority is a single ordered list, not a pile of nested conditionals,
//! so adding a prompt can never silently shadow another.

/// Everything the HUD might offer the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    /// Stroke the creature under the pointer.
    Pet,
    /// Record/gather the nearby flock.
    Gather,
    /// Whistle a distant creature over.
    Call,
    /// Nudge the ball.
    Kick,
}

/// Highest priority first. Pet beats Gather: with a creature under the hand,
/// petting is always the intended action.
const PRIORITY: &[PromptAction] = &[
    PromptAction::Pet,
    PromptAction::Gather,
    PromptAction::Call,
    PromptAction::Kick,
];

/// Which prompts are currently possible, computed by the embedding app from
/// raycasts and proximity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptContext {
    pub can_pet: bool,
    pub can_gather: bool,
    pub can_call: bool,
    pub can_kick: bool,
}

impl PromptContext {
    fn allows(&self, action: PromptAction) -> bool {
        match action {
            PromptAction::Pet => self.can_pet,
            PromptAction::Gather => self.can_gather,
            PromptAction::Call => self.can_call,
            PromptAction::Kick => self.can_kick,
        }
    }
}

/// First available prompt in priority order, or none.
pub fn select_prompt(ctx: &PromptContext) -> Option<PromptAction> {
    PRIORITY.iter().copied().find(|&action| ctx.allows(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_shadows_gather() {
        let ctx = PromptContext {
            can_pet: true,
            can_gather: true,
            ..Default::default()
        };
        assert_eq!(select_prompt(&ctx), Some(PromptAction::Pet));
    }

    #[test]
    fn gather_shows_when_no_creature_under_hand() {
        let ctx = PromptContext {
            can_gather: true,
            can_call: true,
            ..Default::default()
        };
        assert_eq!(select_prompt(&ctx), Some(PromptAction::Gather));
    }

    #[test]
    fn nothing_available_yields_none() {
        assert_eq!(select_prompt(&PromptContext::default()), None);
    }

    #[test]
    fn priority_list_covers_every_action() {
        for action in [
            PromptAction::Pet,
            PromptAction::Gather,
            PromptAction::Call,
            PromptAction::Kick,
        ] {
            assert!(PRIORITY.contains(&action));
        }
    }
}
