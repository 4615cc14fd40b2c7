//! Feedback service - creating, editing, acknowledging and reading feedback.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    policy, Acknowledgement, Feedback, FeedbackChanges, FeedbackView, GiverInfo, NewFeedback,
    Rating, Sentiment, User,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Input for a new feedback record
#[derive(Debug, Clone)]
pub struct FeedbackDraft {
    pub receiver_id: Uuid,
    pub strengths: String,
    pub areas_to_improve: String,
    pub overall_sentiment: Sentiment,
    pub rating: i32,
}

/// Unvalidated partial edit
#[derive(Debug, Clone, Default)]
pub struct FeedbackPatch {
    pub strengths: Option<String>,
    pub areas_to_improve: Option<String>,
    pub overall_sentiment: Option<Sentiment>,
    pub rating: Option<i32>,
}

impl FeedbackPatch {
    fn into_changes(self) -> AppResult<FeedbackChanges> {
        Ok(FeedbackChanges {
            strengths: self.strengths.map(|s| non_blank(s, "Strengths")).transpose()?,
            areas_to_improve: self
                .areas_to_improve
                .map(|s| non_blank(s, "Areas to improve"))
                .transpose()?,
            overall_sentiment: self.overall_sentiment,
            rating: self.rating.map(Rating::new).transpose()?,
        })
    }
}

fn non_blank(value: String, field: &str) -> AppResult<String> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} must not be blank", field)));
    }
    Ok(value)
}

/// Feedback service trait for dependency injection.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Record feedback from `giver` about another user
    async fn create(&self, giver: &User, draft: FeedbackDraft) -> AppResult<FeedbackView>;

    /// Edit an unacknowledged record; giver only
    async fn update(&self, actor: &User, feedback_id: Uuid, patch: FeedbackPatch)
        -> AppResult<Feedback>;

    /// Mark a record as read; receiver only, idempotent
    async fn acknowledge(&self, actor: &User, feedback_id: Uuid) -> AppResult<Acknowledgement>;

    async fn list_received(&self, actor: &User) -> AppResult<Vec<FeedbackView>>;

    async fn list_given(&self, actor: &User) -> AppResult<Vec<Feedback>>;

    /// Feedback received by one of the acting manager's direct reports
    async fn list_history_for(
        &self,
        actor: &User,
        target_user_id: Uuid,
    ) -> AppResult<Vec<FeedbackView>>;
}

/// Concrete implementation of FeedbackService using Unit of Work.
pub struct FeedbackDesk<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> FeedbackDesk<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn load(&self, feedback_id: Uuid) -> AppResult<Feedback> {
        self.uow
            .feedback()
            .find_by_id(feedback_id)
            .await?
            .ok_or_not_found()
    }

    /// Received records for `receiver_id`, each with its giver summary
    async fn received_by(&self, receiver_id: Uuid) -> AppResult<Vec<FeedbackView>> {
        let records = self.uow.feedback().list_by_receiver(receiver_id).await?;

        let giver_ids: HashSet<Uuid> = records.iter().map(|f| f.giver_id).collect();
        let givers: HashMap<Uuid, User> = self
            .uow
            .users()
            .find_many(giver_ids.into_iter().collect())
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(records
            .into_iter()
            .map(|feedback| {
                let giver = GiverInfo::from_user(givers.get(&feedback.giver_id));
                FeedbackView {
                    feedback,
                    giver: Some(giver),
                }
            })
            .collect())
    }
}

#[async_trait]
impl<U: UnitOfWork> FeedbackService for FeedbackDesk<U> {
    async fn create(&self, giver: &User, draft: FeedbackDraft) -> AppResult<FeedbackView> {
        let rating = Rating::new(draft.rating)?;
        let strengths = non_blank(draft.strengths, "Strengths")?;
        let areas_to_improve = non_blank(draft.areas_to_improve, "Areas to improve")?;
        policy::ensure_distinct_receiver(giver.id, draft.receiver_id)?;

        let receiver = self
            .uow
            .users()
            .find_by_id(draft.receiver_id)
            .await?
            .ok_or_not_found()?;

        let feedback = self
            .uow
            .feedback()
            .create(NewFeedback {
                giver_id: giver.id,
                receiver_id: receiver.id,
                strengths,
                areas_to_improve,
                overall_sentiment: draft.overall_sentiment,
                rating,
            })
            .await?;

        tracing::info!(
            feedback_id = %feedback.id,
            giver = %giver.id,
            receiver = %receiver.id,
            "Feedback created"
        );
        Ok(FeedbackView {
            feedback,
            giver: Some(GiverInfo::from_user(Some(giver))),
        })
    }

    async fn update(
        &self,
        actor: &User,
        feedback_id: Uuid,
        patch: FeedbackPatch,
    ) -> AppResult<Feedback> {
        let record = self.load(feedback_id).await?;
        if let Err(e) = policy::can_edit_feedback(actor, &record) {
            tracing::warn!(
                feedback_id = %record.id,
                actor = %actor.id,
                "Feedback edit refused: {}",
                e
            );
            return Err(e);
        }

        let changes = patch.into_changes()?;
        if changes.is_empty() {
            return Ok(record);
        }

        // The acknowledgement may have landed between the read and the write
        let updated = self
            .uow
            .feedback()
            .update_unacknowledged(record.id, changes)
            .await?
            .ok_or(AppError::Locked)?;

        tracing::info!(feedback_id = %updated.id, "Feedback updated");
        Ok(updated)
    }

    async fn acknowledge(&self, actor: &User, feedback_id: Uuid) -> AppResult<Acknowledgement> {
        let record = self.load(feedback_id).await?;
        policy::can_acknowledge(actor, &record)?;

        if record.is_acknowledged {
            return Ok(Acknowledgement {
                already: true,
                feedback: record,
            });
        }

        let transitioned = self
            .uow
            .feedback()
            .mark_acknowledged(record.id, Utc::now())
            .await?;
        let feedback = self.load(record.id).await?;

        if transitioned {
            tracing::info!(
                feedback_id = %feedback.id,
                receiver = %actor.id,
                "Feedback acknowledged"
            );
        }
        Ok(Acknowledgement {
            already: !transitioned,
            feedback,
        })
    }

    async fn list_received(&self, actor: &User) -> AppResult<Vec<FeedbackView>> {
        self.received_by(actor.id).await
    }

    async fn list_given(&self, actor: &User) -> AppResult<Vec<Feedback>> {
        self.uow.feedback().list_by_giver(actor.id).await
    }

    async fn list_history_for(
        &self,
        actor: &User,
        target_user_id: Uuid,
    ) -> AppResult<Vec<FeedbackView>> {
        policy::require_manager(actor)?;
        let target = self
            .uow
            .users()
            .find_by_id(target_user_id)
            .await?
            .ok_or_not_found()?;

        if let Err(e) = policy::can_view_history(actor, &target) {
            tracing::warn!(
                actor = %actor.id,
                target = %target.id,
                "Feedback history access denied"
            );
            return Err(e);
        }

        self.received_by(target.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockFeedbackRepository, MockUserRepository};
    use crate::services::test_support::{developer, feedback_record, manager, TestUnitOfWork};

    fn desk(
        users: MockUserRepository,
        feedback: MockFeedbackRepository,
    ) -> FeedbackDesk<TestUnitOfWork> {
        FeedbackDesk::new(Arc::new(TestUnitOfWork::new(users, feedback)))
    }

    fn stored(record: Feedback) -> MockFeedbackRepository {
        let mut feedback = MockFeedbackRepository::new();
        feedback
            .expect_find_by_id()
            .returning(move |id| Ok((id == record.id).then(|| record.clone())));
        feedback
    }

    fn draft(receiver_id: Uuid, rating: i32) -> FeedbackDraft {
        FeedbackDraft {
            receiver_id,
            strengths: "Great pairing partner".to_string(),
            areas_to_improve: "Test coverage".to_string(),
            overall_sentiment: Sentiment::Positive,
            rating,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_rating() {
        let giver = manager("boss");
        let mut feedback = MockFeedbackRepository::new();
        feedback.expect_create().never();
        let service = desk(MockUserRepository::new(), feedback);

        for rating in [0, 6, -1] {
            assert!(matches!(
                service.create(&giver, draft(Uuid::new_v4(), rating)).await,
                Err(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_receiver() {
        let giver = manager("boss");
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let service = desk(users, MockFeedbackRepository::new());

        assert!(matches!(
            service.create(&giver, draft(Uuid::new_v4(), 4)).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_attaches_giver_summary() {
        let giver = developer("dev", None);
        let receiver = manager("boss");

        let mut users = MockUserRepository::new();
        let found = receiver.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let mut feedback = MockFeedbackRepository::new();
        let (g, r) = (giver.clone(), receiver.clone());
        feedback.expect_create().times(1).returning(move |new| {
            let mut record = feedback_record(&g, &r, new.rating.value());
            record.strengths = new.strengths;
            Ok(record)
        });
        let service = desk(users, feedback);

        let view = service.create(&giver, draft(receiver.id, 5)).await.unwrap();
        assert_eq!(view.feedback.giver_id, giver.id);
        assert_eq!(view.feedback.rating, 5);
        assert_eq!(view.giver.unwrap().full_name, giver.full_name);
    }

    #[tokio::test]
    async fn test_update_by_non_giver_is_forbidden_whatever_the_content() {
        let giver = manager("boss");
        let receiver = developer("dev", Some(giver.id));
        let record = feedback_record(&giver, &receiver, 3);
        let id = record.id;

        let mut feedback = stored(record);
        feedback.expect_update_unacknowledged().never();
        let service = desk(MockUserRepository::new(), feedback);

        let nonsense = FeedbackPatch {
            rating: Some(42),
            strengths: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&receiver, id, nonsense).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_update_after_acknowledgement_is_locked() {
        let giver = manager("boss");
        let receiver = developer("dev", Some(giver.id));
        let mut record = feedback_record(&giver, &receiver, 3);
        record.is_acknowledged = true;
        record.acknowledged_at = Some(Utc::now());
        let id = record.id;

        let service = desk(MockUserRepository::new(), stored(record));
        let patch = FeedbackPatch {
            rating: Some(4),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&giver, id, patch).await,
            Err(AppError::Locked)
        ));
    }

    #[tokio::test]
    async fn test_update_losing_race_to_acknowledgement_is_locked() {
        let giver = manager("boss");
        let receiver = developer("dev", Some(giver.id));
        let record = feedback_record(&giver, &receiver, 3);
        let id = record.id;

        let mut feedback = stored(record);
        feedback
            .expect_update_unacknowledged()
            .returning(|_, _| Ok(None));
        let service = desk(MockUserRepository::new(), feedback);

        let patch = FeedbackPatch {
            rating: Some(2),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&giver, id, patch).await,
            Err(AppError::Locked)
        ));
    }

    #[tokio::test]
    async fn test_update_validates_rating_for_giver() {
        let giver = manager("boss");
        let receiver = developer("dev", Some(giver.id));
        let record = feedback_record(&giver, &receiver, 3);
        let id = record.id;

        let service = desk(MockUserRepository::new(), stored(record));
        let patch = FeedbackPatch {
            rating: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&giver, id, patch).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_acknowledge_is_receiver_only() {
        let giver = manager("boss");
        let receiver = developer("dev", Some(giver.id));
        let record = feedback_record(&giver, &receiver, 3);
        let id = record.id;

        let mut feedback = stored(record);
        feedback.expect_mark_acknowledged().never();
        let service = desk(MockUserRepository::new(), feedback);

        assert!(matches!(
            service.acknowledge(&giver, id).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            service.acknowledge(&receiver, Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_acknowledge_reports_already_when_race_lost() {
        let giver = manager("boss");
        let receiver = developer("dev", Some(giver.id));
        let record = feedback_record(&giver, &receiver, 3);
        let id = record.id;

        let mut feedback = stored(record);
        feedback
            .expect_mark_acknowledged()
            .times(1)
            .returning(|_, _| Ok(false));
        let service = desk(MockUserRepository::new(), feedback);

        let outcome = service.acknowledge(&receiver, id).await.unwrap();
        assert!(outcome.already);
    }

    #[tokio::test]
    async fn test_received_marks_unresolvable_giver_unknown() {
        let receiver = developer("dev", None);
        let vanished = manager("gone");
        let record = feedback_record(&vanished, &receiver, 4);

        let mut feedback = MockFeedbackRepository::new();
        feedback
            .expect_list_by_receiver()
            .returning(move |_| Ok(vec![record.clone()]));
        let mut users = MockUserRepository::new();
        users.expect_find_many().returning(|_| Ok(vec![]));
        let service = desk(users, feedback);

        let views = service.list_received(&receiver).await.unwrap();
        let giver = views[0].giver.clone().unwrap();
        assert_eq!(giver.id, None);
        assert_eq!(giver.full_name, "Unknown");
    }

    #[tokio::test]
    async fn test_history_requires_direct_report() {
        let boss = manager("boss");
        let other = manager("other");
        let report = developer("dev", Some(boss.id));

        let mut users = MockUserRepository::new();
        let found = report.clone();
        users
            .expect_find_by_id()
            .returning(move |id| Ok((id == found.id).then(|| found.clone())));
        let mut feedback = MockFeedbackRepository::new();
        feedback.expect_list_by_receiver().returning(|_| Ok(vec![]));
        users.expect_find_many().returning(|_| Ok(vec![]));
        let service = desk(users, feedback);

        assert!(service.list_history_for(&boss, report.id).await.is_ok());
        assert!(matches!(
            service.list_history_for(&other, report.id).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            service.list_history_for(&report, report.id).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            service.list_history_for(&boss, Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }
}
