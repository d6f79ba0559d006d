//! End-to-end scenarios over the memory adapters.

mod support;

use chrono::TimeDelta;
use fitness_saga::domain::orchestration::{CardioPrecedence, OrchestratorConfig};
use fitness_saga::domain::{
    AchievementFamily, ActivityKind, AddDailySteps, AddTrainingSeries, CardioKind,
    DeleteCardioExercises, ErrorCode, LogCardioExercise, PublishMeal, RemoveTrainingSeries,
    SeriesRef, SeriesUpdate, StatisticType, TrainingSeries, UpdateTrainingSeries,
};
use fitness_saga::outbound::memory::{AchievementCatalog, ChallengeDefinition};
use rstest::rstest;
use uuid::Uuid;

use support::{Harness, catalog, definition, running_session, today};

const CARDIO_STATISTICS: [StatisticType; 4] = [
    StatisticType::CaloriesBurnt,
    StatisticType::TotalDistance,
    StatisticType::TimeSpent,
    StatisticType::ActiveSessionsCount,
];

#[rstest]
#[tokio::test]
async fn logging_cardio_without_achievements_adds_its_contribution() {
    let harness = Harness::new(catalog(Vec::new()));

    let outcome = harness
        .orchestrator
        .log_cardio_exercise(
            &harness.context(),
            LogCardioExercise {
                exercise: running_session(500.0, 5.0),
            },
        )
        .await;

    assert!(outcome.is_success());
    assert!(outcome.earned_badge().is_none());
    assert_eq!(harness.total(StatisticType::CaloriesBurnt).value, 500.0);
    assert_eq!(harness.total(StatisticType::TotalDistance).value, 5.0);
    assert_eq!(
        harness.total(StatisticType::TimeSpent).time,
        TimeDelta::minutes(30)
    );
    assert_eq!(harness.total(StatisticType::ActiveSessionsCount).value, 1.0);
    assert_eq!(
        harness
            .stores
            .document
            .committed_cardio_day(&harness.user_id, today())
            .len(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn deleting_a_logged_session_restores_the_previous_aggregates() {
    let harness = Harness::new(catalog(Vec::new()));
    let context = harness.context();
    let earlier = running_session(320.0, 3.5);
    harness
        .orchestrator
        .log_cardio_exercise(&context, LogCardioExercise { exercise: earlier })
        .await;
    let before: Vec<_> = CARDIO_STATISTICS
        .iter()
        .map(|kind| harness.total(*kind))
        .collect();

    let logged = running_session(500.0, 5.0);
    let logged_id = logged.id();
    let log = harness
        .orchestrator
        .log_cardio_exercise(&context, LogCardioExercise { exercise: logged })
        .await;
    let delete = harness
        .orchestrator
        .delete_cardio_exercises(
            &context,
            DeleteCardioExercises {
                date: today(),
                exercise_ids: vec![logged_id],
            },
        )
        .await;

    assert!(log.is_success());
    assert!(delete.is_success());
    assert!(delete.achievement.is_none());
    let after: Vec<_> = CARDIO_STATISTICS
        .iter()
        .map(|kind| harness.total(*kind))
        .collect();
    assert_eq!(after, before);
    assert_eq!(
        harness
            .stores
            .document
            .committed_cardio_day(&harness.user_id, today())
            .len(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_sessions_is_not_found() {
    let harness = Harness::new(catalog(Vec::new()));

    let outcome = harness
        .orchestrator
        .delete_cardio_exercises(
            &harness.context(),
            DeleteCardioExercises {
                date: today(),
                exercise_ids: vec![Uuid::new_v4()],
            },
        )
        .await;

    assert_eq!(outcome.result.error_code, ErrorCode::NotFound);
    harness.assert_no_open_handles();
}

#[rstest]
#[tokio::test]
async fn steps_above_the_threshold_cross_it_by_the_full_increase() {
    let harness = Harness::new(catalog(vec![definition(
        "ten_thousand_steps",
        AchievementFamily::Steps,
        10_000.0,
    )]));

    let outcome = harness
        .orchestrator
        .add_daily_steps(
            &harness.context(),
            AddDailySteps {
                date: today(),
                steps: 12_000,
            },
        )
        .await;

    assert!(outcome.is_success());
    let achievement = outcome.achievement.clone().expect("achievement outcome");
    assert!(achievement.crossed_threshold);
    assert_eq!(
        achievement.achievement_name.as_deref(),
        Some("ten_thousand_steps")
    );
    assert_eq!(outcome.earned_badge().map(|badge| badge.threshold), Some(10_000.0));
    let progress = harness
        .stores
        .relational
        .committed_progress(&harness.user_id, "ten_thousand_steps")
        .expect("progress row");
    assert_eq!(progress.progress, 12_000.0);
}

#[rstest]
#[tokio::test]
async fn repeated_step_submissions_only_credit_the_increase() {
    let harness = Harness::new(catalog(vec![definition(
        "ten_thousand_steps",
        AchievementFamily::Steps,
        10_000.0,
    )]));
    let context = harness.context();
    let submit = |steps| AddDailySteps {
        date: today(),
        steps,
    };

    harness.orchestrator.add_daily_steps(&context, submit(7_000)).await;
    let lower = harness.orchestrator.add_daily_steps(&context, submit(6_500)).await;
    let higher = harness.orchestrator.add_daily_steps(&context, submit(9_000)).await;

    assert!(lower.is_success());
    assert!(higher.is_success());
    assert_eq!(harness.daily(StatisticType::StepsTaken, today()).value, 9_000.0);
    let progress = harness
        .stores
        .relational
        .committed_progress(&harness.user_id, "ten_thousand_steps")
        .expect("progress row");
    assert_eq!(progress.progress, 9_500.0);
    assert!(!progress.completed);
}

fn crossing_catalog(running_threshold: f64) -> AchievementCatalog {
    catalog(vec![
        definition("first_run", AchievementFamily::Running, running_threshold),
        definition("burn_400", AchievementFamily::Calorie, 400.0),
    ])
}

#[rstest]
#[case::cardio_first(CardioPrecedence::CardioFirst, 5.0, "first_run")]
#[case::calorie_first(CardioPrecedence::CalorieFirst, 5.0, "burn_400")]
#[case::only_calorie_crosses(CardioPrecedence::CardioFirst, 50.0, "burn_400")]
#[tokio::test]
async fn the_first_crossing_family_in_precedence_order_is_reported(
    #[case] precedence: CardioPrecedence,
    #[case] running_threshold: f64,
    #[case] expected: &str,
) {
    let harness = Harness::builder(crossing_catalog(running_threshold))
        .config(OrchestratorConfig {
            cardio_precedence: precedence,
            ..OrchestratorConfig::default()
        })
        .build();

    let outcome = harness
        .orchestrator
        .log_cardio_exercise(
            &harness.context(),
            LogCardioExercise {
                exercise: running_session(500.0, 5.0),
            },
        )
        .await;

    let achievement = outcome.achievement.expect("achievement outcome");
    assert!(achievement.crossed_threshold);
    assert_eq!(achievement.achievement_name.as_deref(), Some(expected));
    let calorie = harness
        .stores
        .relational
        .committed_progress(&harness.user_id, "burn_400")
        .expect("calorie progress");
    let running = harness
        .stores
        .relational
        .committed_progress(&harness.user_id, "first_run")
        .expect("running progress");
    assert_eq!(calorie.progress, 500.0);
    assert_eq!(running.progress, 5.0);
}

#[rstest]
#[tokio::test]
async fn cardio_sessions_feed_matching_challenges() {
    let mut challenge_catalog = catalog(Vec::new());
    challenge_catalog.challenges = vec![ChallengeDefinition {
        name: "spring_runner".to_owned(),
        activity: ActivityKind::Cardio(CardioKind::Running),
        target: 8.0,
        starts_on: today(),
        ends_on: today() + TimeDelta::days(30),
    }];
    let harness = Harness::new(challenge_catalog);
    let context = harness.context();

    for distance in [5.0, 4.0] {
        let outcome = harness
            .orchestrator
            .log_cardio_exercise(
                &context,
                LogCardioExercise {
                    exercise: running_session(300.0, distance),
                },
            )
            .await;
        assert!(outcome.is_success());
    }

    let row = harness
        .stores
        .relational
        .committed_challenge(&harness.user_id, "spring_runner")
        .expect("challenge row");
    assert_eq!(row.progress, 9.0);
    assert_eq!(row.completed_on, Some(today()));
}

#[rstest]
#[tokio::test]
async fn published_meals_count_toward_cooking() {
    let harness = Harness::new(catalog(vec![definition(
        "first_meal",
        AchievementFamily::Cook,
        1.0,
    )]));
    let meal_id = Uuid::new_v4();

    let outcome = harness
        .orchestrator
        .publish_meal(
            &harness.context(),
            PublishMeal {
                meal_id,
                name: "shakshuka".to_owned(),
                calories: 480.0,
                ingredients: vec!["eggs".to_owned(), "tomatoes".to_owned()],
            },
        )
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        outcome.earned_badge().map(|badge| badge.name.as_str()),
        Some("first_meal")
    );
    let meal = harness
        .stores
        .document
        .committed_meal(meal_id)
        .expect("meal committed");
    assert_eq!(meal.author, harness.user_id);
    assert_eq!(meal.published_at, support::now());
}

#[rstest]
#[tokio::test]
async fn training_edits_recompute_the_day_total() {
    let harness = Harness::new(catalog(vec![definition(
        "first_tonne",
        AchievementFamily::Strength,
        800.0,
    )]));
    let context = harness.context();
    let exercise_id = Uuid::new_v4();
    let heavy = TrainingSeries {
        id: Uuid::new_v4(),
        repetitions: 5,
        weight_kg: 100.0,
    };
    let light = TrainingSeries {
        id: Uuid::new_v4(),
        repetitions: 10,
        weight_kg: 50.0,
    };

    let added = harness
        .orchestrator
        .add_training_series(
            &context,
            AddTrainingSeries {
                date: today(),
                exercise_id,
                exercise_name: "deadlift".to_owned(),
                series: vec![heavy, light],
            },
        )
        .await;
    assert!(added.is_success());
    assert!(added.achievement.expect("achievement").crossed_threshold);
    assert_eq!(harness.daily(StatisticType::WeightLifted, today()).value, 1_000.0);

    let updated = harness
        .orchestrator
        .update_training_series(
            &context,
            UpdateTrainingSeries {
                date: today(),
                updates: vec![SeriesUpdate {
                    exercise_id,
                    series_id: heavy.id,
                    repetitions: 5,
                    weight_kg: 60.0,
                }],
            },
        )
        .await;
    assert!(updated.is_success());
    assert_eq!(harness.daily(StatisticType::WeightLifted, today()).value, 800.0);

    let removed = harness
        .orchestrator
        .remove_training_series(
            &context,
            RemoveTrainingSeries {
                date: today(),
                removals: vec![SeriesRef {
                    exercise_id,
                    series_id: light.id,
                }],
            },
        )
        .await;
    assert!(removed.is_success());
    assert_eq!(harness.daily(StatisticType::WeightLifted, today()).value, 300.0);
    assert_eq!(harness.total(StatisticType::WeightLifted).value, 300.0);
    let day = harness
        .stores
        .document
        .committed_training_day(&harness.user_id, today());
    assert_eq!(day.exercises.len(), 1);
    harness.assert_no_open_handles();
}
