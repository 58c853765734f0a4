use serde::{Deserialize, Serialize};

use crate::session::SessionContext;

/// Top-level phase of the workflow.
///
/// 工作流阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Newsletter selection and contact details.
    ///
    /// 选择订阅与联系方式。
    Selection,
    /// Subscription confirmed; optional learning level prompt.
    ///
    /// 订阅已确认，可选填写学习水平。
    Confirmation,
    /// Flow finished.
    ///
    /// 流程完成。
    Success,
}

/// Lifecycle of the current stage's async operation.
///
/// 当前阶段异步操作的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmitStatus {
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub current_stage: Stage,
    pub status: SubmitStatus,
    pub error_message: Option<String>,
    pub is_logged_in: bool,
    pub user_email: Option<String>,
}

impl FormStatus {
    pub fn initial(session: &SessionContext) -> Self {
        Self {
            current_stage: Stage::Selection,
            status: SubmitStatus::Idle,
            error_message: None,
            is_logged_in: session.is_logged_in,
            user_email: session.user_email.clone(),
        }
    }

    pub(crate) fn with(self, current_stage: Stage, status: SubmitStatus, error_message: Option<String>) -> Self {
        Self {
            current_stage,
            status,
            error_message,
            ..self
        }
    }
}
