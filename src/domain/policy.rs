//! Access-control policy.
//!
//! Role- and relationship-based rules shared by the directory and feedback
//! services. Every rule is a pure check over already-loaded records and returns
//! the error the caller should surface; none of them touch storage.

use uuid::Uuid;

use super::feedback::Feedback;
use super::user::{User, UserRole};
use crate::errors::{AppError, AppResult};

/// Actor must hold the manager role.
pub fn require_manager(actor: &User) -> AppResult<()> {
    if actor.is_manager() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Only developers can be placed on a team.
pub fn ensure_assignable(target: &User) -> AppResult<()> {
    if target.is_developer() {
        Ok(())
    } else {
        Err(AppError::RoleMismatch)
    }
}

/// A manager reference must resolve to a manager-role user.
pub fn ensure_manager_candidate(candidate: Option<User>) -> AppResult<User> {
    match candidate {
        Some(user) if user.is_manager() => Ok(user),
        _ => Err(AppError::InvalidManager),
    }
}

/// Managers sit at the root of the team forest and never have a manager.
pub fn ensure_registration_shape(role: UserRole, manager_id: Option<Uuid>) -> AppResult<()> {
    if role.is_manager() && manager_id.is_some() {
        return Err(AppError::validation("Managers cannot be assigned a manager"));
    }
    Ok(())
}

/// Feedback is always about someone else.
pub fn ensure_distinct_receiver(giver_id: Uuid, receiver_id: Uuid) -> AppResult<()> {
    if giver_id == receiver_id {
        return Err(AppError::validation("You cannot give feedback to yourself"));
    }
    Ok(())
}

/// Only the giver may edit, and only until the receiver has acknowledged.
pub fn can_edit_feedback(actor: &User, feedback: &Feedback) -> AppResult<()> {
    if !feedback.is_given_by(actor.id) {
        return Err(AppError::Forbidden);
    }
    if feedback.is_acknowledged {
        return Err(AppError::Locked);
    }
    Ok(())
}

/// Only the receiver may acknowledge.
pub fn can_acknowledge(actor: &User, feedback: &Feedback) -> AppResult<()> {
    if feedback.is_received_by(actor.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// A manager may read the feedback received by their direct reports only.
pub fn can_view_history(actor: &User, target: &User) -> AppResult<()> {
    require_manager(actor)?;
    if actor.manages(target) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::feedback::Sentiment;

    fn user(role: UserRole, manager_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: format!("{}-{}", role, Uuid::new_v4()),
            password_hash: "hashed".to_string(),
            full_name: "Test User".to_string(),
            role,
            manager_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn feedback(giver: &User, receiver: &User, acknowledged: bool) -> Feedback {
        let now = Utc::now();
        Feedback {
            id: Uuid::new_v4(),
            giver_id: giver.id,
            receiver_id: receiver.id,
            strengths: "Thorough reviews".to_string(),
            areas_to_improve: "Estimates".to_string(),
            overall_sentiment: Sentiment::Neutral,
            rating: 3,
            is_acknowledged: acknowledged,
            acknowledged_at: acknowledged.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_require_manager() {
        assert!(require_manager(&user(UserRole::Manager, None)).is_ok());
        assert!(matches!(
            require_manager(&user(UserRole::Developer, None)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_only_developers_are_assignable() {
        assert!(ensure_assignable(&user(UserRole::Developer, None)).is_ok());
        assert!(matches!(
            ensure_assignable(&user(UserRole::Manager, None)),
            Err(AppError::RoleMismatch)
        ));
    }

    #[test]
    fn test_manager_candidate() {
        let manager = user(UserRole::Manager, None);
        let id = manager.id;
        assert_eq!(ensure_manager_candidate(Some(manager)).unwrap().id, id);
        assert!(matches!(
            ensure_manager_candidate(Some(user(UserRole::Developer, None))),
            Err(AppError::InvalidManager)
        ));
        assert!(matches!(
            ensure_manager_candidate(None),
            Err(AppError::InvalidManager)
        ));
    }

    #[test]
    fn test_managers_cannot_have_managers() {
        assert!(ensure_registration_shape(UserRole::Manager, None).is_ok());
        assert!(ensure_registration_shape(UserRole::Developer, Some(Uuid::new_v4())).is_ok());
        assert!(matches!(
            ensure_registration_shape(UserRole::Manager, Some(Uuid::new_v4())),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_self_feedback_rejected() {
        let id = Uuid::new_v4();
        assert!(ensure_distinct_receiver(id, id).is_err());
        assert!(ensure_distinct_receiver(id, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_non_giver_cannot_edit_even_when_locked() {
        let giver = user(UserRole::Developer, None);
        let receiver = user(UserRole::Manager, None);
        let stranger = user(UserRole::Manager, None);

        for acknowledged in [false, true] {
            let record = feedback(&giver, &receiver, acknowledged);
            assert!(matches!(
                can_edit_feedback(&stranger, &record),
                Err(AppError::Forbidden)
            ));
            assert!(matches!(
                can_edit_feedback(&receiver, &record),
                Err(AppError::Forbidden)
            ));
        }
    }

    #[test]
    fn test_giver_edit_locked_after_acknowledgement() {
        let giver = user(UserRole::Manager, None);
        let receiver = user(UserRole::Developer, Some(giver.id));

        assert!(can_edit_feedback(&giver, &feedback(&giver, &receiver, false)).is_ok());
        assert!(matches!(
            can_edit_feedback(&giver, &feedback(&giver, &receiver, true)),
            Err(AppError::Locked)
        ));
    }

    #[test]
    fn test_only_receiver_acknowledges() {
        let giver = user(UserRole::Manager, None);
        let receiver = user(UserRole::Developer, Some(giver.id));
        let record = feedback(&giver, &receiver, false);

        assert!(can_acknowledge(&receiver, &record).is_ok());
        assert!(matches!(
            can_acknowledge(&giver, &record),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_history_requires_direct_report() {
        let manager = user(UserRole::Manager, None);
        let other_manager = user(UserRole::Manager, None);
        let report = user(UserRole::Developer, Some(manager.id));
        let unassigned = user(UserRole::Developer, None);

        assert!(can_view_history(&manager, &report).is_ok());
        assert!(matches!(
            can_view_history(&other_manager, &report),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            can_view_history(&manager, &unassigned),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            can_view_history(&manager, &manager),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_developer_cannot_view_history() {
        let manager = user(UserRole::Manager, None);
        let developer = user(UserRole::Developer, Some(manager.id));
        let peer = user(UserRole::Developer, Some(manager.id));

        assert!(matches!(
            can_view_history(&developer, &peer),
            Err(AppError::Forbidden)
        ));
    }
}
