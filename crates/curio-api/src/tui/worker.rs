//! Background lookup worker thread.

use crate::{Lookup, LookupError, ResultEnvelope};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// A lookup initiated by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    /// Facet search: `field = value`.
    Facet { field: String, value: String },
    /// Follow a pagination token from a previous envelope.
    Page { url: String },
}

/// A settled lookup. Carries the full result; the app decides how state
/// transitions on success vs failure.
#[derive(Debug)]
pub struct LookupOutcome {
    pub result: Result<ResultEnvelope, LookupError>,
}

/// Spawn the lookup worker. Requests are served one at a time, in order,
/// and every request runs to completion and settles with an outcome —
/// there is no coalescing and no cancellation. The thread exits when the
/// request channel closes.
pub fn spawn_lookup_worker(
    client: Box<dyn Lookup + Send>,
    req_rx: Receiver<LookupRequest>,
    outcome_tx: Sender<LookupOutcome>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(request) = req_rx.recv() {
            let result = match &request {
                LookupRequest::Facet { field, value } => client.lookup(field, value),
                LookupRequest::Page { url } => client.page(url),
            };
            if outcome_tx.send(LookupOutcome { result }).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::PageInfo;
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::sync::Mutex;

    /// Scripted lookup: pops pre-queued results in order.
    pub(crate) struct ScriptedLookup {
        responses: Mutex<VecDeque<Result<ResultEnvelope, LookupError>>>,
    }

    impl ScriptedLookup {
        pub(crate) fn new(
            responses: Vec<Result<ResultEnvelope, LookupError>>,
        ) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }

        fn pop(&self) -> Result<ResultEnvelope, LookupError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ResultEnvelope::default()))
        }
    }

    impl Lookup for ScriptedLookup {
        fn lookup(&self, _field: &str, _value: &str) -> Result<ResultEnvelope, LookupError> {
            self.pop()
        }

        fn page(&self, _url: &str) -> Result<ResultEnvelope, LookupError> {
            self.pop()
        }
    }

    fn envelope(total: i64) -> ResultEnvelope {
        ResultEnvelope {
            info: PageInfo {
                totalrecords: Some(total),
                ..Default::default()
            },
            records: Vec::new(),
        }
    }

    #[test]
    fn worker_settles_every_request_in_order() {
        let client = ScriptedLookup::new(vec![Ok(envelope(1)), Ok(envelope(2))]);
        let (req_tx, req_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let handle = spawn_lookup_worker(Box::new(client), req_rx, outcome_tx);

        req_tx
            .send(LookupRequest::Facet {
                field: "Culture".into(),
                value: "Dutch".into(),
            })
            .unwrap();
        req_tx
            .send(LookupRequest::Page {
                url: "https://api.example.org/object?page=2".into(),
            })
            .unwrap();
        drop(req_tx);

        let first = outcome_rx.recv().unwrap();
        let second = outcome_rx.recv().unwrap();
        assert_eq!(first.result.unwrap().info.totalrecords, Some(1));
        assert_eq!(second.result.unwrap().info.totalrecords, Some(2));
        handle.join().unwrap();
    }

    #[test]
    fn worker_reports_failures_as_outcomes() {
        let decode_err: LookupError = serde_json::from_str::<ResultEnvelope>("nope")
            .unwrap_err()
            .into();
        let client = ScriptedLookup::new(vec![Err(decode_err)]);
        let (req_tx, req_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let handle = spawn_lookup_worker(Box::new(client), req_rx, outcome_tx);

        req_tx
            .send(LookupRequest::Facet {
                field: "Medium".into(),
                value: "oil paint".into(),
            })
            .unwrap();
        drop(req_tx);

        let outcome = outcome_rx.recv().unwrap();
        assert!(matches!(outcome.result, Err(LookupError::Decode(_))));
        handle.join().unwrap();
    }
}
