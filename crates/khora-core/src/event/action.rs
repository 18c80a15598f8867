// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    any::Any,
    fmt,
    ops::AddAssign,
    panic::{self, AssertUnwindSafe},
};

type Handler = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Identifies a handler registered on an [`Action`], for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionToken(u64);

/// A single handler failure captured during [`Action::invoke`].
#[derive(Debug)]
pub struct HandlerFailure {
    /// The token of the handler that failed.
    pub token: ActionToken,
    /// The position of the handler in the invocation order.
    pub index: usize,
    /// What went wrong: the returned error or the panic message.
    pub message: String,
}

/// Every handler failure from one [`Action::invoke`] call.
#[derive(Debug)]
pub struct ActionError {
    /// The failures, in invocation order.
    pub failures: Vec<HandlerFailure>,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} action handler(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; #{}: {}", failure.index, failure.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ActionError {}

/// A multi-subscriber notification point.
///
/// Handlers take no arguments and are invoked synchronously, on the calling
/// thread, in registration order. A handler that returns an error or panics
/// does not stop the remaining handlers: failures are collected and reported
/// together once every handler has run.
///
/// # Examples
///
/// ```
/// use khora_core::event::Action;
/// use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let mut on_changed = Action::new();
///
/// let counter = hits.clone();
/// let token = on_changed.subscribe(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// });
///
/// on_changed.invoke().unwrap();
/// assert!(on_changed.unsubscribe(token));
/// on_changed.invoke().unwrap();
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct Action {
    next_token: u64,
    handlers: Vec<(ActionToken, Handler)>,
}

impl Action {
    /// Creates an action with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns the token that removes it.
    pub fn subscribe<F>(&mut self, handler: F) -> ActionToken
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let token = ActionToken(self.next_token);
        self.next_token += 1;
        self.handlers.push((token, Box::new(handler)));
        token
    }

    /// Removes a handler. Returns `false` if the token is not registered.
    pub fn unsubscribe(&mut self, token: ActionToken) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(t, _)| *t != token);
        self.handlers.len() != before
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Removes every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Invokes every handler exactly once, in registration order.
    ///
    /// # Errors
    /// Returns an [`ActionError`] listing every handler that returned an error
    /// or panicked. All handlers have run by the time this returns.
    pub fn invoke(&self) -> Result<(), ActionError> {
        let mut failures = Vec::new();

        for (index, (token, handler)) in self.handlers.iter().enumerate() {
            let message = match panic::catch_unwind(AssertUnwindSafe(|| handler())) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => format!("{e:#}"),
                Err(payload) => format!("handler panicked: {}", panic_message(&*payload)),
            };
            log::warn!("Action handler #{index} failed: {message}");
            failures.push(HandlerFailure {
                token: *token,
                index,
                message,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ActionError { failures })
        }
    }
}

impl<F> AddAssign<F> for Action
where
    F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
{
    /// Registers a handler without keeping its token.
    fn add_assign(&mut self, handler: F) {
        self.subscribe(handler);
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
