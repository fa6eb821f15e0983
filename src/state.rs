use crate::{
    config::RuntimeConfiguration,
    controller::{DashboardController, PendingSubmission},
    persistence::LocalStore,
    service::MockDataService,
};
use maud::{DOCTYPE, Markup, html};
use std::sync::Arc;
use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
};

#[derive(Clone, Debug)]
pub struct RosterState {
    controller: Arc<Mutex<DashboardController>>,
    service: MockDataService,
    config: RuntimeConfiguration,
}

impl RosterState {
    pub fn new(config: RuntimeConfiguration) -> Self {
        let service = MockDataService::simulated(config.simulation());
        Self::with_service(config, service)
    }

    pub fn with_service(config: RuntimeConfiguration, service: MockDataService) -> Self {
        let mut controller = DashboardController::new();
        if let Some(dir) = config.storage_dir() {
            let store = LocalStore::new(dir);
            info!(path = ?store.path(), "Persisting roster to local storage");
            controller = controller.with_store(store);
        }

        Self {
            controller: Arc::new(Mutex::new(controller)),
            service,
            config,
        }
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Student Dashboard" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white p-8" {
                    (markup)
                }
            }
        }
    }

    pub async fn controller(&self) -> MutexGuard<'_, DashboardController> {
        self.controller.lock().await
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    /// Fetches courses in the background. The lock is only held while entering and leaving
    /// `LoadingCourses`, so the dashboard keeps rendering in between.
    pub fn spawn_course_load(&self) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            state.controller().await.begin_course_load(&state.service);
            let fetched = state.service.fetch_courses().await;
            state.controller().await.finish_course_load(fetched);
        })
    }

    /// Sends a submission and settles it on its own task, so the controller leaves `Submitting`
    /// even if whoever started it goes away.
    pub fn spawn_submission(&self, pending: PendingSubmission) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let outcome = pending.send(&state.service).await;
            if let Err(e) = state.controller().await.finish_submit(outcome) {
                // the form is back open with the message attached, so the user can retry
                warn!(?e, "Student submission failed");
            }
        })
    }

    pub async fn sensible_shutdown(&self) {
        let controller = self.controller().await;
        if controller.is_submitting() {
            warn!("Shutting down with a submission still in flight, it will be lost");
        }
        info!(
            students = controller.students().len(),
            "Roster state at shutdown"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::Phase,
        service::{FixedConditions, ServiceCall},
    };
    use std::{collections::HashMap, env::VarError};

    fn config(storage_dir: Option<&str>) -> RuntimeConfiguration {
        let mut vars = HashMap::new();
        if let Some(dir) = storage_dir {
            vars.insert("ROSTER_STORAGE_DIR", dir.to_string());
        }
        RuntimeConfiguration::from_lookup(move |name| {
            vars.get(name)
                .cloned()
                .ok_or(dotenvy::Error::EnvVar(VarError::NotPresent))
        })
        .unwrap()
    }

    #[tokio::test]
    async fn background_course_load_reaches_ready() {
        let state = RosterState::with_service(
            config(None),
            MockDataService::new(FixedConditions::instant().failing(ServiceCall::FetchCourses)),
        );
        assert_eq!(state.controller().await.phase(), Phase::Idle);

        state.spawn_course_load().await.unwrap();

        let controller = state.controller().await;
        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(controller.courses().len(), 4);
        assert!(!controller.has_store());
    }

    #[tokio::test]
    async fn storage_dir_enables_store() {
        let dir = tempfile::tempdir().unwrap();
        let state = RosterState::with_service(
            config(dir.path().to_str()),
            MockDataService::new(FixedConditions::instant()),
        );
        assert!(state.controller().await.has_store());
    }
}
