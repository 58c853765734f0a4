//! Preference form state machine.
//!
//! Defines a pure state transition function for the subscription flow.
//! Guards (validation, diffing) are evaluated by the caller and passed in
//! through the event, so this module never looks at form data.

use super::{FormStatus, LearningLevel, Stage, SubmitStatus};

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
pub const LEARNING_LEVEL_REQUIRED: &str = "Please select a learning level.";

/// Outcome of the pre-submit checks.
///
/// 提交前检查结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SubmitCheck {
    /// Field validation failed.
    ///
    /// 字段校验失败。
    Invalid,
    /// Valid, authenticated, and identical to the baseline.
    ///
    /// 校验通过且与基线一致（无需提交）。
    Unchanged,
    /// Valid and worth sending.
    ///
    /// 校验通过，需要提交。
    Ready,
}

/// Events that drive the form flow.
///
/// 驱动表单流程的事件。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FormEvent {
    /// User submits the selection stage.
    ///
    /// 用户提交订阅选择。
    SubmitRequested { check: SubmitCheck },
    /// Selection accepted by the server.
    ///
    /// 服务端接受了订阅选择。
    SubmitSucceeded,
    /// Selection rejected or transport failed.
    ///
    /// 提交失败。
    SubmitFailed { message: String },
    /// User saves the learning level.
    ///
    /// 用户保存学习水平。
    SaveLearningLevelRequested { level: Option<LearningLevel> },
    /// Learning level stored.
    ///
    /// 学习水平已保存。
    LearningLevelSaved,
    /// Learning level could not be stored.
    ///
    /// 学习水平保存失败。
    LearningLevelFailed { message: String },
    /// User skips the learning level prompt.
    ///
    /// 用户跳过学习水平。
    SkipLearningLevel,
}

/// Side-effects produced by state transitions.
///
/// 状态迁移产生的副作用。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FormAction {
    /// Move focus to the error summary once the update is rendered.
    ///
    /// 渲染后将焦点移到错误摘要。
    FocusErrorSummary,
    /// Send the current selection to the preferences service.
    ///
    /// 向偏好服务提交当前选择。
    SubmitSelection,
    /// Store the learning level.
    ///
    /// 保存学习水平。
    SaveLearningLevel { level: LearningLevel },
}

/// Pure form state machine.
///
/// 纯状态机：不包含副作用。
pub struct FormStateMachine;

impl FormStateMachine {
    pub fn transition(status: FormStatus, event: FormEvent) -> (FormStatus, Vec<FormAction>) {
        use Stage::{Confirmation, Selection};
        use SubmitStatus::{Error, Idle, Submitting, Success};

        match (status.current_stage, status.status, event) {
            // ===== Selection =====
            (Selection, Idle | Error, FormEvent::SubmitRequested { check }) => match check {
                SubmitCheck::Invalid => (
                    // Field errors are authoritative; no banner message.
                    status.with(Selection, Error, None),
                    vec![FormAction::FocusErrorSummary],
                ),
                SubmitCheck::Unchanged => (status.with(Confirmation, Idle, None), Vec::new()),
                SubmitCheck::Ready => (
                    status.with(Selection, Submitting, None),
                    vec![FormAction::SubmitSelection],
                ),
            },
            (Selection, Submitting, FormEvent::SubmitSucceeded) => {
                (status.with(Confirmation, Success, None), Vec::new())
            }
            (Selection, Submitting, FormEvent::SubmitFailed { message }) => (
                status.with(Selection, Error, Some(non_empty_message(message))),
                Vec::new(),
            ),

            // ===== Confirmation =====
            (Confirmation, current, FormEvent::SaveLearningLevelRequested { level })
                if current != Submitting =>
            {
                match level {
                    None => (
                        status.with(
                            Confirmation,
                            Error,
                            Some(LEARNING_LEVEL_REQUIRED.to_string()),
                        ),
                        Vec::new(),
                    ),
                    Some(level) => (
                        status.with(Confirmation, Submitting, None),
                        vec![FormAction::SaveLearningLevel { level }],
                    ),
                }
            }
            (Confirmation, Submitting, FormEvent::LearningLevelSaved) => {
                (status.with(Stage::Success, Success, None), Vec::new())
            }
            (Confirmation, Submitting, FormEvent::LearningLevelFailed { message }) => (
                status.with(Confirmation, Error, Some(non_empty_message(message))),
                Vec::new(),
            ),
            (Confirmation, _, FormEvent::SkipLearningLevel) => {
                (status.with(Stage::Success, Idle, None), Vec::new())
            }

            (_, _, _event) => (status, Vec::new()),
        }
    }
}

fn non_empty_message(message: String) -> String {
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionContext;

    fn at(stage: Stage, status: SubmitStatus) -> FormStatus {
        FormStatus {
            current_stage: stage,
            status,
            ..FormStatus::initial(&SessionContext::anonymous())
        }
    }

    fn level(value: i64) -> LearningLevel {
        LearningLevel::new(value).unwrap()
    }

    #[test]
    fn invalid_submit_stays_on_selection_and_requests_focus() {
        let (next, actions) = FormStateMachine::transition(
            at(Stage::Selection, SubmitStatus::Idle),
            FormEvent::SubmitRequested {
                check: SubmitCheck::Invalid,
            },
        );
        assert_eq!(next.current_stage, Stage::Selection);
        assert_eq!(next.status, SubmitStatus::Error);
        assert_eq!(next.error_message, None);
        assert_eq!(actions, vec![FormAction::FocusErrorSummary]);
    }

    #[test]
    fn unchanged_submit_short_circuits_to_confirmation() {
        let (next, actions) = FormStateMachine::transition(
            at(Stage::Selection, SubmitStatus::Idle),
            FormEvent::SubmitRequested {
                check: SubmitCheck::Unchanged,
            },
        );
        assert_eq!((next.current_stage, next.status), (Stage::Confirmation, SubmitStatus::Idle));
        assert!(actions.is_empty());
    }

    #[test]
    fn ready_submit_goes_to_submitting_and_retries_from_error() {
        for from in [SubmitStatus::Idle, SubmitStatus::Error] {
            let (next, actions) = FormStateMachine::transition(
                at(Stage::Selection, from),
                FormEvent::SubmitRequested {
                    check: SubmitCheck::Ready,
                },
            );
            assert_eq!(next.status, SubmitStatus::Submitting);
            assert_eq!(actions, vec![FormAction::SubmitSelection]);
        }
    }

    #[test]
    fn submit_while_submitting_is_ignored() {
        let current = at(Stage::Selection, SubmitStatus::Submitting);
        let (next, actions) = FormStateMachine::transition(
            current.clone(),
            FormEvent::SubmitRequested {
                check: SubmitCheck::Ready,
            },
        );
        assert_eq!(next, current);
        assert!(actions.is_empty());
    }

    #[test]
    fn submit_result_transitions() {
        let (ok, _) = FormStateMachine::transition(
            at(Stage::Selection, SubmitStatus::Submitting),
            FormEvent::SubmitSucceeded,
        );
        assert_eq!((ok.current_stage, ok.status), (Stage::Confirmation, SubmitStatus::Success));

        let (failed, _) = FormStateMachine::transition(
            at(Stage::Selection, SubmitStatus::Submitting),
            FormEvent::SubmitFailed {
                message: "   ".into(),
            },
        );
        assert_eq!((failed.current_stage, failed.status), (Stage::Selection, SubmitStatus::Error));
        assert_eq!(failed.error_message.as_deref(), Some(GENERIC_ERROR_MESSAGE));
    }

    #[test]
    fn learning_level_requires_a_value() {
        let (next, actions) = FormStateMachine::transition(
            at(Stage::Confirmation, SubmitStatus::Success),
            FormEvent::SaveLearningLevelRequested { level: None },
        );
        assert_eq!(next.status, SubmitStatus::Error);
        assert_eq!(next.error_message.as_deref(), Some(LEARNING_LEVEL_REQUIRED));
        assert!(actions.is_empty());
    }

    #[test]
    fn learning_level_flow() {
        let (submitting, actions) = FormStateMachine::transition(
            at(Stage::Confirmation, SubmitStatus::Idle),
            FormEvent::SaveLearningLevelRequested {
                level: Some(level(3)),
            },
        );
        assert_eq!(submitting.status, SubmitStatus::Submitting);
        assert_eq!(actions, vec![FormAction::SaveLearningLevel { level: level(3) }]);

        let (done, _) =
            FormStateMachine::transition(submitting.clone(), FormEvent::LearningLevelSaved);
        assert_eq!((done.current_stage, done.status), (Stage::Success, SubmitStatus::Success));

        let (failed, _) = FormStateMachine::transition(
            submitting,
            FormEvent::LearningLevelFailed {
                message: "server unavailable".into(),
            },
        );
        assert_eq!((failed.current_stage, failed.status), (Stage::Confirmation, SubmitStatus::Error));
        assert_eq!(failed.error_message.as_deref(), Some("server unavailable"));
    }

    #[test]
    fn skip_is_unconditional_from_confirmation() {
        for from in [
            SubmitStatus::Idle,
            SubmitStatus::Success,
            SubmitStatus::Error,
            SubmitStatus::Submitting,
        ] {
            let (next, _) = FormStateMachine::transition(
                at(Stage::Confirmation, from),
                FormEvent::SkipLearningLevel,
            );
            assert_eq!((next.current_stage, next.status), (Stage::Success, SubmitStatus::Idle));
            assert_eq!(next.error_message, None);
        }
    }

    #[test]
    fn stages_never_move_backwards() {
        let success = at(Stage::Success, SubmitStatus::Idle);
        for event in [
            FormEvent::SubmitRequested {
                check: SubmitCheck::Ready,
            },
            FormEvent::LearningLevelSaved,
            FormEvent::SkipLearningLevel,
        ] {
            let (next, actions) = FormStateMachine::transition(success.clone(), event);
            assert_eq!(next, success);
            assert!(actions.is_empty());
        }
    }
}
