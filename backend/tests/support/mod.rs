//! Shared harness for saga integration tests.
//!
//! Integration tests drive the orchestrator against the memory adapters.
//! `Harness::builder` wires every port to a fresh pair of stores; individual
//! ports can then be swapped for the failure-injecting wrappers in
//! [`faults`].

#![allow(dead_code, reason = "each test crate uses a different subset")]

pub mod faults;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use fitness_saga::domain::orchestration::{
    FitnessOrchestrator, OperationContext, OrchestrationPorts, OrchestrationRuntime,
    OrchestratorConfig, SagaSleeper,
};
use fitness_saga::domain::{
    AchievementFamily, CardioExercise, CardioExerciseDraft, CardioKind, StatisticType,
    StatisticValue, UserId,
};
use fitness_saga::outbound::memory::{
    AchievementCatalog, AchievementDefinition, DocumentSnapshot, MemoryStores, RelationalSnapshot,
};
use fitness_saga::test_support::{ImmediateSleeper, MutableClock};
use uuid::Uuid;

use self::faults::{FaultyAchievements, FaultyDocuments, FaultyRelational, Trigger};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 18, 0, 0)
        .single()
        .expect("valid time")
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

pub fn definition(name: &str, family: AchievementFamily, threshold: f64) -> AchievementDefinition {
    AchievementDefinition {
        name: name.to_owned(),
        family,
        threshold,
        image: format!("badges/{name}.png"),
        generative_text: format!("{name} unlocked"),
        daily_limit: None,
    }
}

pub fn catalog(definitions: Vec<AchievementDefinition>) -> AchievementCatalog {
    AchievementCatalog {
        achievements: definitions,
        challenges: Vec::new(),
    }
}

pub fn running_session(calories_burnt: f64, distance_km: f64) -> CardioExercise {
    CardioExercise::new(CardioExerciseDraft {
        id: Uuid::new_v4(),
        kind: CardioKind::Running,
        date: today(),
        calories_burnt,
        distance_km,
        duration: TimeDelta::minutes(30),
    })
    .expect("valid exercise")
}

/// Committed state of both stores.
#[derive(Debug, PartialEq)]
pub struct StoreSnapshot {
    pub relational: Option<RelationalSnapshot>,
    pub document: Option<DocumentSnapshot>,
}

pub struct Harness {
    pub stores: MemoryStores,
    pub clock: Arc<MutableClock>,
    pub orchestrator: FitnessOrchestrator,
    pub user_id: UserId,
}

impl Harness {
    pub fn new(catalog: AchievementCatalog) -> Self {
        Self::builder(catalog).build()
    }

    pub fn builder(catalog: AchievementCatalog) -> HarnessBuilder {
        let clock = Arc::new(MutableClock::new(now()));
        let stores = MemoryStores::new(catalog, clock.clone());
        let ports = stores.ports();
        HarnessBuilder {
            stores,
            clock,
            ports,
            config: OrchestratorConfig::default(),
            sleeper: Arc::new(ImmediateSleeper),
        }
    }

    pub fn context(&self) -> OperationContext {
        OperationContext::uncancellable(self.user_id.clone())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            relational: self.stores.relational.snapshot(),
            document: self.stores.document.snapshot(),
        }
    }

    pub fn total(&self, kind: StatisticType) -> StatisticValue {
        self.stores
            .document
            .committed_statistics(&self.user_id)
            .total(kind)
    }

    pub fn daily(&self, kind: StatisticType, date: NaiveDate) -> StatisticValue {
        self.stores
            .document
            .committed_statistics(&self.user_id)
            .daily(kind, date)
    }

    pub fn assert_no_open_handles(&self) {
        assert_eq!(self.stores.open_handles(), 0, "store handles left open");
    }
}

pub struct HarnessBuilder {
    pub stores: MemoryStores,
    pub clock: Arc<MutableClock>,
    pub ports: OrchestrationPorts,
    config: OrchestratorConfig,
    sleeper: Arc<dyn SagaSleeper>,
}

impl HarnessBuilder {
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn SagaSleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replace ports, typically with the wrappers in [`faults`].
    pub fn ports(mut self, customise: impl FnOnce(&MemoryStores, &mut OrchestrationPorts)) -> Self {
        customise(&self.stores, &mut self.ports);
        self
    }

    /// Route every port through wrappers sharing `trigger`.
    pub fn faults(self, trigger: Arc<Trigger>) -> Self {
        self.ports(|stores, ports| {
            let documents = Arc::new(FaultyDocuments {
                inner: stores.document.clone(),
                trigger: trigger.clone(),
            });
            let relational = Arc::new(FaultyRelational {
                inner: stores.relational.clone(),
                trigger: trigger.clone(),
            });
            ports.relational_store = relational.clone();
            ports.accounts = relational;
            ports.questionnaires = documents.clone();
            ports.cardio = documents.clone();
            ports.diet = documents.clone();
            ports.training = documents.clone();
            ports.statistics = documents;
            ports.achievements = Arc::new(FaultyAchievements {
                inner: stores.achievements.clone(),
                trigger,
            });
        })
    }

    pub fn build(self) -> Harness {
        let runtime = OrchestrationRuntime {
            sleeper: self.sleeper,
            clock: self.clock.clone(),
        };
        Harness {
            orchestrator: FitnessOrchestrator::with_runtime(self.ports, runtime, self.config),
            stores: self.stores,
            clock: self.clock,
            user_id: UserId::random(),
        }
    }
}
