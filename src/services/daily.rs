//! Daily planning service
//!
//! Tasks are planned per date. Whenever a task's outcome changes, the day's
//! history entry is recomputed from every task on that date.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::TrackerResult;
use crate::models::{completion_score, ChapterId, DailyHistoryEntry, DailyTask, TaskId, TaskStatus};
use crate::storage::Database;

/// One day of the weekly overview
#[derive(Debug, Clone, PartialEq)]
pub struct DayHistory {
    pub date: NaiveDate,
    /// Short weekday name ("Mon")
    pub weekday: String,
    /// `None` when nothing was recorded for the day
    pub score: Option<u32>,
    pub tasks: Vec<DailyTask>,
}

/// Summary of the last seven days
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyStats {
    /// Rounded mean over scored days; 0 when none
    pub average: u32,
    pub days_worked: usize,
    pub subject_frequency: BTreeMap<String, usize>,
}

/// Today's date in UTC, the calendar the stored dates use
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Service for daily plans and history
pub struct DailyService<'a> {
    db: &'a Database,
}

impl<'a> DailyService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Plan a pending task; `date` defaults to today
    pub fn add_task(
        &self,
        subject: &str,
        description: &str,
        chapter_id: Option<ChapterId>,
        date: Option<NaiveDate>,
    ) -> TrackerResult<DailyTask> {
        let task = DailyTask::new(
            date.unwrap_or_else(today),
            subject.trim(),
            description.trim(),
            chapter_id,
        );
        let task = self.db.daily_tasks.insert(task)?;

        self.db.log_create(
            EntityType::DailyTask,
            task.id.to_string(),
            Some(task.description.clone()),
            &task,
        )?;

        // A day that was already scored now has one more pending task
        if self.db.daily_history.get(&task.date)?.is_some() {
            self.refresh_day(task.date)?;
        }
        Ok(task)
    }

    /// Record a task's outcome and recompute that day's score.
    ///
    /// An empty `actual_work` falls back to the planned description.
    pub fn update_task(
        &self,
        id: TaskId,
        status: TaskStatus,
        actual_work: &str,
    ) -> TrackerResult<Option<DailyTask>> {
        let Some(before) = self.db.daily_tasks.get(id)? else {
            return Ok(None);
        };

        let actual_work = match actual_work.trim() {
            "" => before.description.clone(),
            work => work.to_string(),
        };
        let Some(after) = self.db.daily_tasks.update(id, |t| {
            t.status = status;
            t.actual_work = actual_work;
        })?
        else {
            return Ok(None);
        };

        self.db.log_update(
            EntityType::DailyTask,
            id.to_string(),
            Some(after.description.clone()),
            &before,
            &after,
        )?;

        self.refresh_day(after.date)?;
        Ok(Some(after))
    }

    /// Delete a task; false when the id is unknown
    pub fn remove_task(&self, id: TaskId) -> TrackerResult<bool> {
        let Some(task) = self.db.daily_tasks.get(id)? else {
            return Ok(false);
        };

        if !self.db.daily_tasks.delete(id)? {
            return Ok(false);
        }

        self.db.log_delete(
            EntityType::DailyTask,
            id.to_string(),
            Some(task.description.clone()),
            &task,
        )?;

        self.refresh_day(task.date)?;
        Ok(true)
    }

    /// Tasks planned for `date`, in creation order
    pub fn plan_for(&self, date: NaiveDate) -> TrackerResult<Vec<DailyTask>> {
        self.db.daily_tasks.range_by(|t| t.date, date..=date)
    }

    pub fn todays_plan(&self) -> TrackerResult<Vec<DailyTask>> {
        self.plan_for(today())
    }

    /// Upsert the single history entry for `date`
    pub fn save_daily_completion(
        &self,
        date: NaiveDate,
        tasks: Vec<DailyTask>,
        score: u32,
    ) -> TrackerResult<()> {
        self.db
            .daily_history
            .put(DailyHistoryEntry { date, tasks, score })
    }

    /// Recompute the history entry for `date` from its current tasks
    fn refresh_day(&self, date: NaiveDate) -> TrackerResult<()> {
        let tasks = self.plan_for(date)?;
        match completion_score(&tasks) {
            Some(score) => self.save_daily_completion(date, tasks, score),
            None => self.db.daily_history.delete(&date).map(|_| ()),
        }
    }

    /// The seven days ending at `today`, oldest first
    pub fn week_history(&self, today: NaiveDate) -> TrackerResult<Vec<DayHistory>> {
        (0..7)
            .rev()
            .map(|offset| -> TrackerResult<DayHistory> {
                let date = today - Duration::days(offset);
                let entry = self.db.daily_history.get(&date)?;
                Ok(DayHistory {
                    date,
                    weekday: date.weekday().to_string(),
                    score: entry.as_ref().map(|e| e.score),
                    tasks: entry.map(|e| e.tasks).unwrap_or_default(),
                })
            })
            .collect()
    }

    pub fn weekly_stats(&self, today: NaiveDate) -> TrackerResult<WeeklyStats> {
        let scored: Vec<DayHistory> = self
            .week_history(today)?
            .into_iter()
            .filter(|day| day.score.is_some())
            .collect();

        if scored.is_empty() {
            return Ok(WeeklyStats::default());
        }

        let total: u32 = scored.iter().filter_map(|d| d.score).sum();
        let average = (f64::from(total) / scored.len() as f64).round() as u32;

        let mut subject_frequency = BTreeMap::new();
        for task in scored.iter().flat_map(|d| &d.tasks) {
            *subject_frequency.entry(task.subject.clone()).or_insert(0) += 1;
        }

        Ok(WeeklyStats {
            average,
            days_worked: scored.len(),
            subject_frequency,
        })
    }
}
