use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use contracts::shared::logger::SyncTrigger;

use crate::shared::settings::service as settings_service;
use crate::usecases::reporting;

use super::{registry::TaskManagerRegistry, service};

/// Фоновый воркер запланированных синхронизаций. Задачи выполняются
/// последовательно внутри тика — перекрывающихся запусков одного
/// триггера не бывает.
pub struct ScheduledTaskWorker {
    registry: Arc<TaskManagerRegistry>,
    interval_seconds: u64,
}

impl ScheduledTaskWorker {
    pub fn new(registry: Arc<TaskManagerRegistry>, interval_seconds: u64) -> Self {
        Self {
            registry,
            interval_seconds,
        }
    }

    /// Цикл выполнения задач
    pub async fn run_loop(&self) {
        info!(
            "Scheduled sync worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_heal: Option<DateTime<Utc>> = None;

        loop {
            interval.tick().await;
            if let Err(e) = self.process_due_tasks(&mut last_heal).await {
                error!("Error processing scheduled sync tasks: {:#}", e);
            }
        }
    }

    async fn process_due_tasks(&self, last_heal: &mut Option<DateTime<Utc>>) -> Result<()> {
        let now = Utc::now();
        let settings = settings_service::get_settings().await?;

        for entry in service::list_schedules().await? {
            if !entry.is_enabled {
                continue;
            }
            let due = entry.next_run_at.map(|t| t <= now).unwrap_or(true);
            if !due {
                continue;
            }

            let Some(manager) = self.registry.get(&entry.task_type) else {
                warn!("No manager registered for task type '{}'", entry.task_type);
                continue;
            };

            info!("Scheduled task '{}' is due, running", entry.task_type);
            let result = manager.run(&settings).await;

            if let Err(e) =
                service::mark_run_finished(&entry.task_type, result.run_status().as_str()).await
            {
                warn!("Failed to update schedule for '{}': {:#}", entry.task_type, e);
            }

            reporting::report_run(manager.sync_type(), SyncTrigger::Automatic, &settings, &result)
                .await;

            if result.success {
                info!("Scheduled task '{}' finished: {}", entry.task_type, result.message);
            } else {
                error!("Scheduled task '{}' failed: {}", entry.task_type, result.message);
            }
        }

        // Профилактика расписаний не чаще раза в час
        let heal_due = last_heal
            .map(|t| now - t >= Duration::hours(1))
            .unwrap_or(true);
        if heal_due {
            service::heal_all_schedules(&settings).await?;
            *last_heal = Some(now);
        }

        Ok(())
    }
}
