//! Transactions: two-phase completion tracking for executed requests
//!
//! A transaction executes its bound [`Request`] exactly once against a
//! driver and exposes two independent completion tracks: *control* (the
//! command finished, successfully or with a captured failure) and *audio*
//! (the audible consequence, if any, finished). Any number of threads may
//! block on either track or register completion callbacks, before or after
//! the corresponding completion, and each is satisfied exactly once.
//!
//! Internally each track is a terminal flag inside one shared mutex paired
//! with its own condvar; completion publishes the flag and wakes waiters
//! under that same lock, so a wait installed after a background run started
//! can never miss the wakeup. Queued callbacks are drained and invoked
//! outside the lock to keep re-entrant registrations from deadlocking the
//! signalling thread.

use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use tracing::debug;

use crate::command::Request;
use crate::driver::Driver;
use crate::errors::ControlError;

type CompletionCallback = Box<dyn FnOnce() + Send>;

struct State {
    started: bool,
    /// Terminal control outcome; `Some` once the command finished.
    control: Option<Result<(), ControlError>>,
    audio_complete: bool,
    control_callbacks: Vec<CompletionCallback>,
    audio_callbacks: Vec<CompletionCallback>,
}

struct Inner {
    request: Request,
    driver: Arc<dyn Driver>,
    state: Mutex<State>,
    control_done: Condvar,
    audio_done: Condvar,
}

/// One execution of a request, observable by any number of parties.
///
/// Cloning yields another handle onto the same transaction.
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<Inner>,
}

impl Transaction {
    /// Bind a request to the driver that will execute it.
    pub fn new(request: Request, driver: Arc<dyn Driver>) -> Self {
        Self {
            inner: Arc::new(Inner {
                request,
                driver,
                state: Mutex::new(State {
                    started: false,
                    control: None,
                    audio_complete: false,
                    control_callbacks: Vec::new(),
                    audio_callbacks: Vec::new(),
                }),
                control_done: Condvar::new(),
                audio_done: Condvar::new(),
            }),
        }
    }

    pub fn request(&self) -> &Request {
        &self.inner.request
    }

    /// Execute inline on the calling thread.
    ///
    /// Execution failures are captured as the control outcome, never
    /// propagated out of this call; inspect them via [`assert_success`].
    /// A second execution attempt fails fast with `TransactionAlreadyRun`.
    ///
    /// [`assert_success`]: Transaction::assert_success
    pub fn run(&self) -> Result<(), ControlError> {
        self.claim()?;
        self.execute();
        Ok(())
    }

    /// Execute on a separate thread of control and return immediately.
    ///
    /// Waits installed after this call observe completion safely even when
    /// the background execution already finished.
    pub fn run_in_background(&self) -> Result<(), ControlError> {
        self.claim()?;
        let transaction = self.clone();
        thread::spawn(move || transaction.execute());
        Ok(())
    }

    fn claim(&self) -> Result<(), ControlError> {
        let mut state = self.inner.state.lock().unwrap();
        if state.started {
            return Err(ControlError::TransactionAlreadyRun);
        }
        state.started = true;
        Ok(())
    }

    fn execute(&self) {
        let outcome = self.inner.driver.execute_request(&self.inner.request);
        if let Err(err) = &outcome {
            debug!(
                command = self.inner.request.command().name(),
                driver = self.inner.driver.name(),
                "captured command failure: {err}"
            );
        }
        self.complete_control(outcome);
    }

    fn complete_control(&self, outcome: Result<(), ControlError>) {
        let (control_callbacks, audio_callbacks) = {
            let mut state = self.inner.state.lock().unwrap();
            let failed = outcome.is_err();
            state.control = Some(outcome);
            let control_callbacks = std::mem::take(&mut state.control_callbacks);

            // Without an audible effect (or after a failure, when no audible
            // consequence can follow) the audio track completes here too.
            let audio_callbacks =
                if failed || !self.inner.request.command().has_audio_action() {
                    state.audio_complete = true;
                    self.inner.audio_done.notify_all();
                    std::mem::take(&mut state.audio_callbacks)
                } else {
                    Vec::new()
                };

            self.inner.control_done.notify_all();
            (control_callbacks, audio_callbacks)
        };

        for callback in control_callbacks {
            callback();
        }
        for callback in audio_callbacks {
            callback();
        }
    }

    /// Mark the audible consequence of this transaction finished.
    ///
    /// Must not be called before the control outcome exists; calling it
    /// again after audio completion is a no-op.
    pub fn complete_audio(&self) -> Result<(), ControlError> {
        let callbacks = {
            let mut state = self.inner.state.lock().unwrap();
            if state.control.is_none() {
                return Err(ControlError::AudioBeforeControl);
            }
            if state.audio_complete {
                return Ok(());
            }
            state.audio_complete = true;
            self.inner.audio_done.notify_all();
            std::mem::take(&mut state.audio_callbacks)
        };

        for callback in callbacks {
            callback();
        }
        Ok(())
    }

    /// Block until the control outcome is recorded.
    pub fn wait_control_complete(&self) {
        let mut state = self.inner.state.lock().unwrap();
        while state.control.is_none() {
            state = self.inner.control_done.wait(state).unwrap();
        }
    }

    /// Block until the audio track completes.
    pub fn wait_audio_complete(&self) {
        let mut state = self.inner.state.lock().unwrap();
        while !state.audio_complete {
            state = self.inner.audio_done.wait(state).unwrap();
        }
    }

    /// Register a control-completion callback.
    ///
    /// Fires synchronously before this call returns when the control track
    /// is already complete; otherwise it is queued and fires, in
    /// registration order, on the thread that records completion.
    pub fn on_control_complete<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let immediate = {
            let mut state = self.inner.state.lock().unwrap();
            if state.control.is_some() {
                Some(callback)
            } else {
                state.control_callbacks.push(Box::new(callback));
                None
            }
        };
        if let Some(callback) = immediate {
            callback();
        }
    }

    /// Register an audio-completion callback; same contract as
    /// [`on_control_complete`](Transaction::on_control_complete) on the
    /// audio track.
    pub fn on_audio_complete<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let immediate = {
            let mut state = self.inner.state.lock().unwrap();
            if state.audio_complete {
                Some(callback)
            } else {
                state.audio_callbacks.push(Box::new(callback));
                None
            }
        };
        if let Some(callback) = immediate {
            callback();
        }
    }

    pub fn control_complete(&self) -> bool {
        self.inner.state.lock().unwrap().control.is_some()
    }

    pub fn audio_complete(&self) -> bool {
        self.inner.state.lock().unwrap().audio_complete
    }

    /// Fail with the captured control outcome, when it was a failure.
    ///
    /// No-op while the transaction is still running or when it succeeded.
    pub fn assert_success(&self) -> Result<(), ControlError> {
        let state = self.inner.state.lock().unwrap();
        match &state.control {
            Some(Err(cause)) => Err(ControlError::TransactionFailed(Box::new(cause.clone()))),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock().unwrap();
        f.debug_struct("Transaction")
            .field("command", &self.inner.request.command().name())
            .field("driver", &self.inner.driver.name())
            .field("started", &state.started)
            .field("control_complete", &state.control.is_some())
            .field("audio_complete", &state.audio_complete)
            .finish()
    }
}
