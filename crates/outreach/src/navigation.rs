//! Screen state for clients of the collection form and dashboard.
//!
//! The client moves between the region picker, the form for one region, and
//! the admin dashboard only through [`Screen::apply`].

use serde::{Deserialize, Serialize};

use crate::workflows::domain::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminTab {
    Analytics,
    Submissions,
    Unsubmitted,
}

impl AdminTab {
    pub const fn ordered() -> [Self; 3] {
        [Self::Analytics, Self::Submissions, Self::Unsubmitted]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Analytics => "Analytics",
            Self::Submissions => "Submissions",
            Self::Unsubmitted => "Unsubmitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Home,
    Form { region: Region, phase: FormPhase },
    Admin { tab: AdminTab },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScreenEvent {
    SelectRegion { region: Region },
    OpenAdmin,
    SelectTab { tab: AdminTab },
    Submit,
    SubmissionSucceeded,
    SubmissionFailed,
    RedirectElapsed,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{event:?} is not valid on {screen:?}")]
pub struct InvalidTransition {
    pub screen: Screen,
    pub event: ScreenEvent,
}

impl Screen {
    pub fn apply(self, event: ScreenEvent) -> Result<Screen, InvalidTransition> {
        use FormPhase::{Editing, Submitted, Submitting};

        let next = match (self, event) {
            (Screen::Home, ScreenEvent::SelectRegion { region }) => Screen::Form {
                region,
                phase: Editing,
            },
            (Screen::Home, ScreenEvent::OpenAdmin) => Screen::Admin {
                tab: AdminTab::Analytics,
            },
            (Screen::Admin { .. }, ScreenEvent::SelectTab { tab }) => Screen::Admin { tab },
            (Screen::Admin { .. }, ScreenEvent::Back) => Screen::Home,
            (
                Screen::Form {
                    region,
                    phase: Editing,
                },
                ScreenEvent::Submit,
            ) => Screen::Form {
                region,
                phase: Submitting,
            },
            (
                Screen::Form {
                    region,
                    phase: Submitting,
                },
                ScreenEvent::SubmissionSucceeded,
            ) => Screen::Form {
                region,
                phase: Submitted,
            },
            (
                Screen::Form {
                    region,
                    phase: Submitting,
                },
                ScreenEvent::SubmissionFailed,
            ) => Screen::Form {
                region,
                phase: Editing,
            },
            (
                Screen::Form {
                    phase: Submitted, ..
                },
                ScreenEvent::RedirectElapsed,
            ) => Screen::Home,
            (
                Screen::Form {
                    phase: Editing | Submitted,
                    ..
                },
                ScreenEvent::Back,
            ) => Screen::Home,
            (screen, event) => return Err(InvalidTransition { screen, event }),
        };

        Ok(next)
    }

    /// Whether the submit control should accept input. Disabled while a
    /// submission is in flight so the same form cannot be sent twice.
    pub fn can_submit(self) -> bool {
        matches!(
            self,
            Screen::Form {
                phase: FormPhase::Editing,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(events: &[ScreenEvent]) -> Result<Screen, InvalidTransition> {
        events
            .iter()
            .try_fold(Screen::default(), |screen, event| screen.apply(*event))
    }

    #[test]
    fn successful_submission_returns_home_after_redirect() {
        let screen = drive(&[
            ScreenEvent::SelectRegion {
                region: Region::Jonai,
            },
            ScreenEvent::Submit,
            ScreenEvent::SubmissionSucceeded,
        ])
        .expect("valid path");
        assert_eq!(
            screen,
            Screen::Form {
                region: Region::Jonai,
                phase: FormPhase::Submitted
            }
        );
        assert!(!screen.can_submit());
        assert_eq!(
            screen.apply(ScreenEvent::RedirectElapsed),
            Ok(Screen::Home)
        );
    }

    #[test]
    fn failed_submission_returns_to_editing() {
        let screen = drive(&[
            ScreenEvent::SelectRegion {
                region: Region::Dhemaji,
            },
            ScreenEvent::Submit,
            ScreenEvent::SubmissionFailed,
        ])
        .expect("valid path");
        assert!(screen.can_submit());
    }

    #[test]
    fn cannot_resubmit_or_leave_while_in_flight() {
        let submitting = Screen::Form {
            region: Region::Sisiborgaon,
            phase: FormPhase::Submitting,
        };
        assert!(submitting.apply(ScreenEvent::Submit).is_err());
        assert!(submitting.apply(ScreenEvent::Back).is_err());
        assert!(!submitting.can_submit());
    }

    #[test]
    fn admin_tabs_switch_and_back_goes_home() {
        let screen = drive(&[
            ScreenEvent::OpenAdmin,
            ScreenEvent::SelectTab {
                tab: AdminTab::Unsubmitted,
            },
        ])
        .expect("valid path");
        assert_eq!(
            screen,
            Screen::Admin {
                tab: AdminTab::Unsubmitted
            }
        );
        assert_eq!(screen.apply(ScreenEvent::Back), Ok(Screen::Home));
    }

    #[test]
    fn home_rejects_form_events() {
        let err = Screen::Home
            .apply(ScreenEvent::Submit)
            .expect_err("submit needs a form");
        assert_eq!(err.screen, Screen::Home);
        assert_eq!(
            Screen::Home.apply(ScreenEvent::SelectTab {
                tab: AdminTab::Analytics
            }),
            Err(InvalidTransition {
                screen: Screen::Home,
                event: ScreenEvent::SelectTab {
                    tab: AdminTab::Analytics
                }
            })
        );
    }

    #[test]
    fn screens_serialize_with_tags() {
        let value = serde_json::to_value(Screen::Form {
            region: Region::Dhemaji,
            phase: FormPhase::Editing,
        })
        .expect("serializes");
        assert_eq!(
            value,
            serde_json::json!({ "screen": "form", "region": "Dhemaji", "phase": "editing" })
        );
    }
}
