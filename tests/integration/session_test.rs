//! Integration tests for session bootstrap, refresh and teardown.

use std::sync::Arc;

use lifequest::api::ApiError;
use lifequest::config::SessionSettings;
use lifequest::goals::Goal;
use lifequest::notify::ProgressionEvent;
use lifequest::progression::{total_xp_to_reach_level, ProgressRecord};
use lifequest::quests::{Branch, Quest};
use lifequest::goals::GoalValidationError;
use lifequest::session::{DailyXpStat, OnboardingData, Session, SessionError, UserRegistration};

use crate::mock_api::{test_user, MockApi, TG_ID};

async fn start(api: &Arc<MockApi>) -> Result<Session, SessionError> {
    Session::start(
        api.clone(),
        &UserRegistration::new(TG_ID),
        &SessionSettings::default(),
    )
    .await
}

#[tokio::test]
async fn test_start_loads_everything() {
    let api = Arc::new(MockApi::new());
    api.edit(|s| {
        s.progress = ProgressRecord::at_level(6, 40);
        s.quests = vec![
            Quest::new("Squats", Branch::Power, 20),
            Quest::new("Gratitude list", Branch::Stability, 20),
        ];
        s.goals = vec![Goal::new("Tent", 12)];
        s.daily_xp = Some(DailyXpStat {
            daily_xp: 90,
            daily_quest_count: 2,
            bonus_xp: 50,
        });
    });

    let session = start(&api).await.unwrap();
    let state = session.state();

    assert!(!session.needs_onboarding());
    assert_eq!(state.user.as_ref().map(|u| u.tg_id), Some(TG_ID));
    assert_eq!(state.progress.current_level, 6);
    assert_eq!(state.quests.len(), 2);
    assert_eq!(state.goals.len(), 1);
    assert_eq!(state.daily_rate(), 90);
    assert_eq!(api.calls()[0], "register_user");
}

#[tokio::test]
async fn test_user_without_onboarding_gets_no_data() {
    let api = Arc::new(MockApi::with_user(test_user(false)));

    let session = start(&api).await.unwrap();

    assert!(session.needs_onboarding());
    assert_eq!(api.call_count("get_progress"), 0);
    assert!(matches!(
        session.refresh().await,
        Err(SessionError::OnboardingRequired)
    ));
}

#[tokio::test]
async fn test_start_fails_when_progress_unavailable() {
    let api = Arc::new(MockApi::new());
    api.fail_progress(Some(ApiError::Network("offline".to_string())));

    let result = start(&api).await;

    assert!(matches!(
        result,
        Err(SessionError::Api(ApiError::Network(_)))
    ));
}

#[tokio::test]
async fn test_missing_daily_rate_disables_eta() {
    let api = Arc::new(MockApi::new());
    api.edit(|s| {
        s.progress = ProgressRecord::at_level(2, 0);
        s.goals = vec![Goal::new("Drone", 5)];
    });

    let session = start(&api).await.unwrap();
    let overview = session.goal_overview();

    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].metrics.eta_days, None);
    assert_eq!(
        overview[0].metrics.remaining,
        total_xp_to_reach_level(5) - total_xp_to_reach_level(2)
    );
}

#[tokio::test]
async fn test_goal_overview_sorted_by_level() {
    let api = Arc::new(MockApi::new());
    let mut done = Goal::new("Done already", 2);
    done.is_completed = true;
    api.edit(|s| {
        s.goals = vec![Goal::new("Far", 30), done, Goal::new("Near", 4)];
        s.daily_xp = Some(DailyXpStat {
            daily_xp: 100,
            ..Default::default()
        });
    });

    let session = start(&api).await.unwrap();
    let levels: Vec<_> = session
        .goal_overview()
        .iter()
        .map(|o| o.goal.goal_level)
        .collect();

    assert_eq!(levels, vec![4, 30]);
    let near = &session.goal_overview()[0];
    assert_eq!(near.metrics.eta_days, Some(near.metrics.remaining.div_ceil(100)));
}

#[tokio::test]
async fn test_headline_metrics_follow_progress_goal() {
    let api = Arc::new(MockApi::new());
    api.edit(|s| {
        s.progress = ProgressRecord {
            goal_text: Some("Road bike".to_string()),
            goal_level: Some(10),
            ..ProgressRecord::at_level(5, 0)
        };
    });

    let session = start(&api).await.unwrap();
    let metrics = session.headline_metrics().unwrap();

    assert_eq!(session.state().progress.goal_progress, Some(50));
    assert!(metrics.percent > 0.0 && metrics.percent < 100.0);
}

#[tokio::test]
async fn test_goals_reached_on_refresh_announced_once() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await.unwrap();
    let events = session.subscribe();

    api.edit(|s| {
        s.progress = ProgressRecord::at_level(8, 0);
        s.goals = vec![Goal::new("Book", 5)];
    });
    session.refresh().await.unwrap();
    session.refresh().await.unwrap();

    let achieved: Vec<_> = events.try_iter().collect();
    assert_eq!(achieved.len(), 1);
    assert!(matches!(&achieved[0], ProgressionEvent::GoalAchieved { goal } if goal.goal_level == 5));
}

#[tokio::test]
async fn test_activate_pro_reloads_user() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await.unwrap();

    let user = session.activate_pro().await.unwrap();

    assert!(user.is_pro);
    assert!(session.state().user.unwrap().is_pro);
}

#[tokio::test]
async fn test_close_resets_state_and_watch() {
    let api = Arc::new(MockApi::new());
    api.edit(|s| {
        s.progress = ProgressRecord::at_level(3, 0);
        s.goals = vec![Goal::new("Museum", 2)];
    });
    let session = start(&api).await.unwrap();
    assert!(session.check_goals().is_empty());

    session.close();
    let state = session.state();
    assert_eq!(state.generation, 1);
    assert!(state.user.is_none());
    assert!(state.goals.is_empty());

    // A new session surfaces reached goals again
    let events = session.subscribe();
    session.refresh().await.unwrap();
    let achieved = events
        .try_iter()
        .filter(|e| matches!(e, ProgressionEvent::GoalAchieved { .. }))
        .count();
    assert_eq!(achieved, 1);
}

#[tokio::test]
async fn test_onboarding_unlocks_session_data() {
    let api = Arc::new(MockApi::with_user(test_user(false)));
    api.edit(|s| s.quests = vec![Quest::new("Cold shower", Branch::Longevity, 20)]);
    let session = start(&api).await.unwrap();
    assert!(session.needs_onboarding());

    let data = OnboardingData::new(34, "male", Branch::Longevity).with_goal("Hiking boots", 6);
    let user = session.complete_onboarding(&data).await.unwrap();

    assert!(user.is_onboarded());
    assert_eq!(user.active_branches, vec![Branch::Longevity]);
    assert!(!session.needs_onboarding());

    let state = session.state();
    assert_eq!(state.quests.len(), 1);
    assert_eq!(state.goals.len(), 1);
    assert_eq!(state.goals[0].goal_text.as_deref(), Some("Hiking boots"));
    assert_eq!(state.progress.goal_level, Some(6));
    assert!(session.headline_metrics().is_some());
}

#[tokio::test]
async fn test_invalid_onboarding_goal_makes_no_call() {
    let api = Arc::new(MockApi::with_user(test_user(false)));
    let session = start(&api).await.unwrap();

    let data = OnboardingData::new(19, "female", Branch::Power).with_goal("Trip", 0);
    let result = session.complete_onboarding(&data).await;

    assert!(matches!(
        result,
        Err(SessionError::InvalidGoal(GoalValidationError::LevelOutOfRange { .. }))
    ));
    assert_eq!(api.call_count("complete_onboarding"), 0);
    assert!(session.needs_onboarding());
}

#[tokio::test]
async fn test_add_branch_requires_pro() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await.unwrap();
    let before = session.state();

    let result = session.add_branch(Branch::Global).await;

    assert!(matches!(
        result,
        Err(SessionError::Api(ApiError::Rejected { status: 403, .. }))
    ));
    assert_eq!(api.call_count("get_quests"), 1);
    assert_eq!(session.state(), before);
}

#[tokio::test]
async fn test_add_branch_reloads_user_and_quests() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await.unwrap();
    session.activate_pro().await.unwrap();
    api.edit(|s| s.quests = vec![Quest::new("Volunteer an hour", Branch::Global, 20)]);

    let branches = session.add_branch(Branch::Global).await.unwrap();

    assert_eq!(branches, vec![Branch::Power, Branch::Stability, Branch::Global]);
    let state = session.state();
    assert_eq!(state.user.unwrap().active_branches, branches);
    assert_eq!(state.quests.len(), 1);
    assert_eq!(state.quests[0].branch, Branch::Global);

    // Adding an active branch again changes nothing
    assert_eq!(session.add_branch(Branch::Global).await.unwrap(), branches);
}
