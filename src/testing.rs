//! Shared helpers for unit tests.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    bucketer::BucketHasher, DatafileIndex, Error, ErrorHandler, LogLevel, Logger,
};

pub(crate) const DATAFILE_PATH: &str = "tests/data/datafile.json";

/// Raw fixture datafile.
pub(crate) fn datafile_json() -> String {
    std::fs::read_to_string(DATAFILE_PATH).expect("fixture datafile should be readable")
}

/// Build an index over the fixture datafile with recording capabilities.
pub(crate) fn fixture() -> (DatafileIndex, Arc<RecordingLogger>, Arc<RecordingErrorHandler>) {
    fixture_from(&datafile_json())
}

pub(crate) fn fixture_from(
    datafile: &str,
) -> (DatafileIndex, Arc<RecordingLogger>, Arc<RecordingErrorHandler>) {
    let logger = Arc::new(RecordingLogger::default());
    let error_handler = Arc::new(RecordingErrorHandler::default());
    let config = DatafileIndex::from_datafile(datafile, logger.clone(), error_handler.clone())
        .expect("fixture datafile should parse");
    (config, logger, error_handler)
}

/// Fixture datafile passed through `edit` as a JSON value.
pub(crate) fn edited_datafile(edit: impl FnOnce(&mut serde_json::Value)) -> String {
    let mut value: serde_json::Value =
        serde_json::from_str(&datafile_json()).expect("fixture datafile should be JSON");
    edit(&mut value);
    value.to_string()
}

#[derive(Debug, Default)]
pub(crate) struct RecordingLogger {
    messages: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub(crate) fn messages(&self) -> Vec<(LogLevel, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, level: LogLevel) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub(crate) fn contains(&self, level: LogLevel, message: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m == message)
    }

    pub(crate) fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_owned()));
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingErrorHandler {
    errors: Mutex<Vec<Error>>,
}

impl RecordingErrorHandler {
    pub(crate) fn errors(&self) -> Vec<Error> {
        self.errors.lock().unwrap().clone()
    }
}

impl ErrorHandler for RecordingErrorHandler {
    fn handle_error(&self, error: &Error) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

/// Returns fixed bucket values for known bucketing keys and `fallback` for everything else.
pub(crate) struct DeterministicHasher {
    buckets: HashMap<String, u32>,
    fallback: u32,
}

impl DeterministicHasher {
    pub(crate) fn new(buckets: impl IntoIterator<Item = (&'static str, u32)>, fallback: u32) -> Self {
        DeterministicHasher {
            buckets: buckets
                .into_iter()
                .map(|(key, bucket)| (key.to_owned(), bucket))
                .collect(),
            fallback,
        }
    }
}

impl BucketHasher for DeterministicHasher {
    fn generate_bucket_value(&self, bucketing_key: &str) -> u32 {
        self.buckets
            .get(bucketing_key)
            .copied()
            .unwrap_or(self.fallback)
    }
}
