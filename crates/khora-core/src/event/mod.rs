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

//! Provides foundational primitives for notification.
//!
//! The primary component is the [`Action`], an ordered list of zero-argument
//! handlers fired after a state change. The emitter never needs to know who is
//! listening: the editor, the inspector and background tools each subscribe
//! their own handler and keep the returned [`ActionToken`] to unsubscribe.

mod action;

pub use self::action::{Action, ActionError, ActionToken, HandlerFailure};
