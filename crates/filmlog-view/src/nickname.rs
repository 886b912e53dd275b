//! Nickname duplicate gate for the social-join and profile-edit forms.

use anyhow::{Context, Result, bail};
use filmlog_api::LocalMemberApi;
use filmlog_api::fallback::password_valid_or_false;
use filmlog_api::types::{MemberMessage, MemberUpdate, SocialJoinForm};
use tracing::instrument;

/// When the form needs a duplicate check before submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckPolicy {
    /// Every submission needs a check (social join).
    Always,
    /// Only a changed nickname needs a check (profile edit).
    OnChange {
        /// Nickname loaded into the form.
        original: String,
    },
}

/// Client-side rejection of a form submission. No request was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Nickname field is blank.
    #[error("닉네임을 입력해주세요.")]
    EmptyNickname,
    /// No duplicate check has run.
    #[error("닉네임 중복 체크를 해주세요.")]
    NotChecked,
    /// The last check reported the nickname as taken.
    #[error("이미 사용 중인 닉네임입니다.")]
    Duplicate,
}

/// Two-step gate: an explicit check must report "not duplicate" first.
///
/// The recorded result is kept when the nickname field changes afterwards.
#[derive(Debug, Clone)]
pub struct NicknameGate {
    policy: CheckPolicy,
    checked: bool,
    duplicate: bool,
}

impl NicknameGate {
    /// Creates an unchecked gate.
    #[must_use]
    pub const fn new(policy: CheckPolicy) -> Self {
        Self {
            policy,
            checked: false,
            duplicate: false,
        }
    }

    /// Whether a check has completed.
    #[must_use]
    pub const fn is_checked(&self) -> bool {
        self.checked
    }

    /// Result of the last completed check.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    /// Runs the duplicate check and records the result.
    ///
    /// Returns `true` when the nickname is taken.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::EmptyNickname`] for a blank nickname (no request
    /// sent), or the request error; the gate is unchanged in both cases.
    #[instrument(skip_all)]
    pub async fn check(&mut self, api: &(impl LocalMemberApi + Sync), nickname: &str) -> Result<bool> {
        if nickname.trim().is_empty() {
            return Err(GateError::EmptyNickname.into());
        }
        let duplicate = api
            .check_nickname(nickname)
            .await
            .context("nickname duplicate check failed")?;
        self.checked = true;
        self.duplicate = duplicate;
        if duplicate {
            tracing::info!(nickname, "닉네임 중복됨");
        } else {
            tracing::info!(nickname, "닉네임 사용 가능");
        }
        Ok(duplicate)
    }

    /// Decides locally whether a form carrying `nickname` may be sent.
    ///
    /// # Errors
    ///
    /// Returns the [`GateError`] that blocks the submission.
    pub fn ensure_submittable(&self, nickname: &str) -> Result<(), GateError> {
        if nickname.trim().is_empty() {
            return Err(GateError::EmptyNickname);
        }
        if matches!(&self.policy, CheckPolicy::OnChange { original } if original == nickname) {
            return Ok(());
        }
        if !self.checked {
            return Err(GateError::NotChecked);
        }
        if self.duplicate {
            return Err(GateError::Duplicate);
        }
        Ok(())
    }
}

/// Profile edit form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEditForm {
    /// Member being edited.
    pub member_no: u64,
    /// Nickname field.
    pub nickname: String,
    /// Phone field.
    pub phone: String,
    /// Current password, required when changing it.
    pub current_password: Option<String>,
    /// New password.
    pub new_password: Option<String>,
}

/// Submits a profile edit after the gate and password checks pass.
///
/// # Errors
///
/// Returns a [`GateError`] (no request sent), a password mismatch, or the
/// update error.
#[instrument(skip_all, fields(member_no = form.member_no))]
pub async fn submit_profile_edit(
    api: &(impl LocalMemberApi + Sync),
    gate: &NicknameGate,
    form: ProfileEditForm,
) -> Result<MemberMessage> {
    gate.ensure_submittable(&form.nickname)?;

    if form.new_password.is_some() {
        let Some(current) = form.current_password.as_deref() else {
            bail!("current password is required to change the password");
        };
        if !password_valid_or_false(api, current).await {
            bail!("현재 비밀번호가 일치하지 않습니다.");
        }
    }

    let update = MemberUpdate {
        member_no: form.member_no,
        member_nick: form.nickname,
        member_phone: form.phone,
        current_password: form.current_password,
        new_password: form.new_password,
    };
    let message = api.update_member(&update).await?;
    tracing::info!(message = %message.message, "member updated");
    Ok(message)
}

/// Submits the social-join form after the gate passes.
///
/// # Errors
///
/// Returns a [`GateError`] (no request sent) or the join error.
#[instrument(skip_all)]
pub async fn submit_social_join(
    api: &(impl LocalMemberApi + Sync),
    gate: &NicknameGate,
    form: &SocialJoinForm,
) -> Result<MemberMessage> {
    gate.ensure_submittable(&form.member_nick)?;
    let message = api.social_join(form).await?;
    tracing::info!(message = %message.message, "social join completed");
    Ok(message)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::MockBackend;

    fn backend() -> MockBackend {
        MockBackend {
            taken_nicknames: vec![String::from("popcorn")],
            password: String::from("secret"),
            ..MockBackend::default()
        }
    }

    fn edit_form(nickname: &str) -> ProfileEditForm {
        ProfileEditForm {
            member_no: 7,
            nickname: String::from(nickname),
            phone: String::from("010-1234-5678"),
            ..ProfileEditForm::default()
        }
    }

    #[tokio::test]
    async fn test_empty_nickname_rejected_without_call() {
        // Arrange
        let api = backend();
        let mut gate = NicknameGate::new(CheckPolicy::Always);

        // Act
        let result = gate.check(&api, "  ").await;

        // Assert
        assert_eq!(
            result.unwrap_err().downcast_ref::<GateError>(),
            Some(&GateError::EmptyNickname)
        );
        assert_eq!(api.check_nickname_calls.load(Ordering::SeqCst), 0);
        assert!(!gate.is_checked());
    }

    #[tokio::test]
    async fn test_changed_nickname_without_check_is_rejected_locally() {
        // Arrange
        let api = backend();
        let gate = NicknameGate::new(CheckPolicy::OnChange {
            original: String::from("popcorn"),
        });

        // Act
        let result = submit_profile_edit(&api, &gate, edit_form("nachos")).await;

        // Assert
        assert_eq!(
            result.unwrap_err().downcast_ref::<GateError>(),
            Some(&GateError::NotChecked)
        );
        assert_eq!(api.update_member_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unchanged_nickname_needs_no_check() {
        // Arrange
        let api = backend();
        let gate = NicknameGate::new(CheckPolicy::OnChange {
            original: String::from("popcorn"),
        });

        // Act
        let result = submit_profile_edit(&api, &gate, edit_form("popcorn")).await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(api.update_member_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_check_blocks_submission() {
        // Arrange
        let api = backend();
        let mut gate = NicknameGate::new(CheckPolicy::Always);
        let form = SocialJoinForm {
            member_email: String::from("popcorn@example.com"),
            member_name: String::from("Kim"),
            member_phone: String::from("010-1234-5678"),
            member_nick: String::from("popcorn"),
        };

        // Act
        let duplicate = gate.check(&api, "popcorn").await.unwrap();
        let result = submit_social_join(&api, &gate, &form).await;

        // Assert
        assert!(duplicate);
        assert_eq!(
            result.unwrap_err().downcast_ref::<GateError>(),
            Some(&GateError::Duplicate)
        );
        assert_eq!(api.social_join_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_check_allows_social_join() {
        // Arrange
        let api = backend();
        let mut gate = NicknameGate::new(CheckPolicy::Always);
        let form = SocialJoinForm {
            member_nick: String::from("nachos"),
            ..SocialJoinForm::default()
        };

        // Act
        gate.check(&api, "nachos").await.unwrap();
        let result = submit_social_join(&api, &gate, &form).await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(api.social_join_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_check_is_not_invalidated_by_later_edit() {
        // Arrange
        let api = backend();
        let mut gate = NicknameGate::new(CheckPolicy::OnChange {
            original: String::from("popcorn"),
        });
        gate.check(&api, "nachos").await.unwrap();

        // Act
        let result = gate.ensure_submittable("popcorn-2");

        // Assert
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_failed_check_leaves_gate_unchecked() {
        // Arrange
        let api = MockBackend {
            fail_reads: true,
            ..backend()
        };
        let mut gate = NicknameGate::new(CheckPolicy::Always);

        // Act
        let result = gate.check(&api, "nachos").await;

        // Assert
        assert!(result.is_err());
        assert_eq!(gate.ensure_submittable("nachos"), Err(GateError::NotChecked));
    }

    #[tokio::test]
    async fn test_password_change_requires_valid_current_password() {
        // Arrange
        let api = backend();
        let gate = NicknameGate::new(CheckPolicy::OnChange {
            original: String::from("popcorn"),
        });
        let form = ProfileEditForm {
            current_password: Some(String::from("wrong")),
            new_password: Some(String::from("new-secret")),
            ..edit_form("popcorn")
        };

        // Act
        let result = submit_profile_edit(&api, &gate, form).await;

        // Assert
        assert!(result.is_err());
        assert_eq!(api.update_member_calls.load(Ordering::SeqCst), 0);
    }
}
