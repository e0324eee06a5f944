//! Routine documents on disk.
//!
//! Each routine is a JSON document holding its recurrence phrase, checklist
//! counts, next scheduled reset and archived history. Documents are read
//! under a shared lock and written atomically under an exclusive lock.

use crate::history::HistoryLog;
use crate::tracker::{evaluate, initial_schedule, ResetPolicy, TrackerResult, TrackerState};
use crate::{parse, CalendarDate, Diagnostic, Error, Result, RoutineSnapshot};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A recurring checklist as persisted by the CLI
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutineDocument {
    pub name: String,
    pub recurrence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<CalendarDate>,
    #[serde(default)]
    pub completed: u32,
    pub total: u32,
    #[serde(default)]
    pub history: HistoryLog,
}

/// What happened when a document was checked
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub result: TrackerResult,
    pub diagnostic: Option<Diagnostic>,
}

impl RoutineDocument {
    pub fn new(name: impl Into<String>, recurrence: impl Into<String>, total: u32) -> Self {
        Self {
            name: name.into(),
            recurrence: recurrence.into(),
            scheduled: None,
            completed: 0,
            total,
            history: HistoryLog::new(),
        }
    }

    /// Load a routine document with shared locking
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::Store(format!("Unable to open {:?}: {}", path, e)))?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let document = serde_json::from_str::<RoutineDocument>(&contents)
            .map_err(|e| Error::Store(format!("Failed to parse {:?}: {}", path, e)))?;
        tracing::debug!("Loaded routine {:?} from {:?}", document.name, path);
        Ok(document)
    }

    /// Save the document with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("Routine path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(parent)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old document
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved routine {:?} to {:?}", self.name, path);
        Ok(())
    }

    /// Build the tracker input for `today`
    pub fn snapshot(&self, today: CalendarDate, history_limit: usize) -> (RoutineSnapshot, Option<Diagnostic>) {
        let (pattern, diagnostic) = parse(&self.recurrence);
        let snapshot = RoutineSnapshot {
            pattern,
            scheduled_date: self.scheduled,
            today,
            completed_count: self.completed,
            total_count: self.total,
            history_limit,
        };
        (snapshot, diagnostic)
    }

    /// Run the tracker for `today` and fold the result back into the document.
    ///
    /// On reset the checklist is cleared. A routine without a schedule is
    /// given its first one.
    pub fn check(&mut self, today: CalendarDate, history_limit: usize, policy: ResetPolicy) -> CheckOutcome {
        let (snapshot, diagnostic) = self.snapshot(today, history_limit);
        if let Some(diagnostic) = &diagnostic {
            tracing::warn!("Routine {:?}: {}", self.name, diagnostic);
        }

        let result = evaluate(&snapshot, &self.history, policy);

        match result.state {
            TrackerState::NoPriorSchedule => {
                let first = initial_schedule(&snapshot.pattern, today);
                tracing::info!("Routine {:?}: first reset scheduled for {}", self.name, first);
                self.scheduled = Some(first);
            }
            TrackerState::WithinPeriod => {}
            TrackerState::ResetDue { .. } => {
                self.scheduled = result.new_scheduled_date;
                self.history = result.updated_history.clone();
                self.completed = 0;
            }
        }

        CheckOutcome { result, diagnostic }
    }
}

/// All `*.json` routine documents in `dir`, sorted by path
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        tracing::info!("Routines directory {:?} does not exist", dir);
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::debug!("Found {} routine documents in {:?}", paths.len(), dir);
    Ok(paths)
}
