//! Wizard states and the reverse-transition table.

/// States of the configuration dialog.
///
/// `Initial` is the entry state; every other state is only reachable
/// through a prior one. Terminal outcomes (commit, cancel, timeout) are not
/// states: they remove the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Initial,
    AwaitingConfigChoice,
    AwaitingEditOption,
    AwaitingInterval,
    AwaitingQuietStart,
    AwaitingQuietEnd,
    AwaitingAutoDeleteChoice,
    AwaitingAutoDeleteTime,
    AwaitingGroupInfo,
    AwaitingPromptApproval,
    AwaitingCustomPrompt,
    AwaitingDeleteConfirm,
}

impl WizardState {
    /// The state that referred the user into this one.
    ///
    /// This is the single source of truth for `voltar`: the forward table
    /// run backwards. States reachable from both flows resolve through
    /// `editing` (whether a pre-existing group is selected).
    pub fn back_edge(self, editing: bool) -> Option<WizardState> {
        use WizardState::*;

        match self {
            Initial => None,
            AwaitingConfigChoice => Some(Initial),
            AwaitingEditOption => Some(Initial),
            AwaitingInterval => Some(if editing { AwaitingEditOption } else { AwaitingConfigChoice }),
            AwaitingQuietStart => Some(if editing { AwaitingEditOption } else { AwaitingInterval }),
            AwaitingQuietEnd => Some(AwaitingQuietStart),
            AwaitingAutoDeleteChoice => {
                Some(if editing { AwaitingEditOption } else { AwaitingQuietEnd })
            }
            AwaitingAutoDeleteTime => Some(AwaitingAutoDeleteChoice),
            AwaitingGroupInfo => {
                Some(if editing { AwaitingEditOption } else { AwaitingAutoDeleteChoice })
            }
            AwaitingPromptApproval => Some(AwaitingGroupInfo),
            AwaitingCustomPrompt => Some(AwaitingPromptApproval),
            AwaitingDeleteConfirm => Some(AwaitingEditOption),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WizardState::*;
    use super::*;

    const ALL: [WizardState; 12] = [
        Initial,
        AwaitingConfigChoice,
        AwaitingEditOption,
        AwaitingInterval,
        AwaitingQuietStart,
        AwaitingQuietEnd,
        AwaitingAutoDeleteChoice,
        AwaitingAutoDeleteTime,
        AwaitingGroupInfo,
        AwaitingPromptApproval,
        AwaitingCustomPrompt,
        AwaitingDeleteConfirm,
    ];

    #[test]
    fn test_every_non_initial_state_has_a_back_edge() {
        for state in ALL {
            if state == Initial {
                assert!(state.back_edge(false).is_none());
                assert!(state.back_edge(true).is_none());
            } else {
                assert!(state.back_edge(false).is_some(), "{:?}", state);
                assert!(state.back_edge(true).is_some(), "{:?}", state);
            }
        }
    }

    #[test]
    fn test_new_group_flow_reverses_the_forward_path() {
        // Forward: Initial -> ConfigChoice -> Interval -> QuietStart ->
        // QuietEnd -> AutoDeleteChoice -> AutoDeleteTime -> GroupInfo ->
        // PromptApproval -> CustomPrompt
        assert_eq!(AwaitingConfigChoice.back_edge(false), Some(Initial));
        assert_eq!(AwaitingInterval.back_edge(false), Some(AwaitingConfigChoice));
        assert_eq!(AwaitingQuietStart.back_edge(false), Some(AwaitingInterval));
        assert_eq!(AwaitingQuietEnd.back_edge(false), Some(AwaitingQuietStart));
        assert_eq!(
            AwaitingAutoDeleteChoice.back_edge(false),
            Some(AwaitingQuietEnd)
        );
        assert_eq!(
            AwaitingAutoDeleteTime.back_edge(false),
            Some(AwaitingAutoDeleteChoice)
        );
        assert_eq!(
            AwaitingGroupInfo.back_edge(false),
            Some(AwaitingAutoDeleteChoice)
        );
        assert_eq!(
            AwaitingPromptApproval.back_edge(false),
            Some(AwaitingGroupInfo)
        );
        assert_eq!(
            AwaitingCustomPrompt.back_edge(false),
            Some(AwaitingPromptApproval)
        );
    }

    #[test]
    fn test_edit_flow_field_states_return_to_the_menu() {
        for state in [
            AwaitingInterval,
            AwaitingQuietStart,
            AwaitingAutoDeleteChoice,
            AwaitingGroupInfo,
        ] {
            assert_eq!(state.back_edge(true), Some(AwaitingEditOption), "{:?}", state);
        }

        assert_eq!(AwaitingEditOption.back_edge(true), Some(Initial));
        assert_eq!(AwaitingDeleteConfirm.back_edge(true), Some(AwaitingEditOption));

        // Mid-sequence states keep their local referrer even when editing
        assert_eq!(AwaitingQuietEnd.back_edge(true), Some(AwaitingQuietStart));
        assert_eq!(
            AwaitingAutoDeleteTime.back_edge(true),
            Some(AwaitingAutoDeleteChoice)
        );
        assert_eq!(
            AwaitingPromptApproval.back_edge(true),
            Some(AwaitingGroupInfo)
        );
    }
}
