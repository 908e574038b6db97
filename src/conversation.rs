//! The scripted news conversation.
//!
//! The [`Controller`] owns the transcript and walks the user through a fixed
//! loop:
//!
//! ```text
//! Idle ──start──▶ AwaitingCategory ──pick──▶ AwaitingRegion ──pick──▶ Fetching
//!                        ▲                                               │
//!                        └──────────── results + "search again" ◀────────┘
//! ```
//!
//! A turn is split in two. [`Controller::select`] validates the pick, echoes
//! it as a user message and marks the controller busy; it never suspends.
//! [`Controller::complete`] then runs the delays and the fetch and emits the
//! bot's reply. Any pick made in between is rejected with
//! [`SelectError::Busy`], so a double-click cannot start a second fetch or
//! overwrite the pending category.
//!
//! Only the options on the newest message can be picked. Older prompts stay
//! in the transcript but are inert.

use crate::api::{NewsProvider, NewsSource, WORLD_REGION};
use crate::models::{ChatOption, Message, MessageId, Sender};
use crate::outputs::results::format_results;
use crate::usage::UsageStore;
use chrono::Local;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub const WELCOME_MESSAGE: &str = "👋 Hi there! I'm your personal news assistant.\n\
What do you want to read today?\n\
Please choose a category:";

pub const REGION_MESSAGE: &str = "Great choice!\n\
Do you want news from India or across the globe?";

pub const SEARCH_AGAIN_MESSAGE: &str = "Would you like to search for news in another category?\n\
Please choose one:";

/// Categories offered by every category prompt. Label and value are the same.
pub const CATEGORIES: [&str; 6] = [
    "business",
    "sports",
    "technology",
    "politics",
    "entertainment",
    "health",
];

pub fn category_options() -> Vec<ChatOption> {
    CATEGORIES.iter().map(|c| ChatOption::new(c, c)).collect()
}

pub fn region_options() -> Vec<ChatOption> {
    vec![
        ChatOption::new("india", "in"),
        ChatOption::new("global", WORLD_REGION),
    ]
}

/// Delays between the user's pick and the bot's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Before the first welcome message.
    pub welcome: Duration,
    /// Between a pick and the bot's answer to it.
    pub reply: Duration,
    /// Between a results message and the "search again" prompt.
    pub reprompt: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            welcome: Duration::from_millis(1000),
            reply: Duration::from_millis(800),
            reprompt: Duration::from_millis(1500),
        }
    }
}

impl Pacing {
    pub fn instant() -> Self {
        Self {
            welcome: Duration::ZERO,
            reply: Duration::ZERO,
            reprompt: Duration::ZERO,
        }
    }
}

/// Where the script currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingCategory,
    AwaitingRegion,
    Fetching,
}

/// Conversation memory between turns.
///
/// `pending_category` unset means a category is expected next; set means a
/// region is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub pending_category: Option<String>,
}

/// Why a pick was ignored. The controller is unchanged in every case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("the conversation has not started yet")]
    NotStarted,

    #[error("still working on the previous choice")]
    Busy,

    #[error("message {0} is not the latest prompt")]
    StaleOption(MessageId),

    #[error("'{0}' is not one of the offered options")]
    UnknownOption(String),
}

/// Append-only message log.
#[derive(Debug)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, sender: Sender, text: String, options: Vec<ChatOption>) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text,
            sender,
            options,
            sent_at: Local::now(),
        });
        id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
enum Turn {
    RegionPrompt,
    Search { category: String, region: String },
}

/// Work left over from a successful [`Controller::select`].
///
/// Hand it to [`Controller::complete`]; until then the controller stays
/// busy.
#[must_use = "the controller stays busy until the turn is completed"]
#[derive(Debug)]
pub struct PendingTurn(Turn);

/// The Conversation Controller.
pub struct Controller<N, U> {
    transcript: Transcript,
    state: ConversationState,
    phase: Phase,
    busy: bool,
    provider: NewsProvider<N, U>,
    pacing: Pacing,
}

impl<N, U> Controller<N, U>
where
    N: NewsSource,
    U: UsageStore,
{
    /// A controller in [`Phase::Idle`]. It is busy until [`Self::start`]
    /// has emitted the welcome message.
    pub fn new(provider: NewsProvider<N, U>, pacing: Pacing) -> Self {
        Self {
            transcript: Transcript::new(),
            state: ConversationState::default(),
            phase: Phase::Idle,
            busy: true,
            provider,
            pacing,
        }
    }

    /// Emit the welcome message after the welcome delay.
    ///
    /// Does nothing unless the controller is idle.
    #[instrument(level = "debug", skip_all)]
    pub async fn start(&mut self) {
        if self.phase != Phase::Idle {
            warn!(phase = ?self.phase, "start() called twice; ignoring");
            return;
        }
        sleep(self.pacing.welcome).await;
        self.bot_says(WELCOME_MESSAGE, category_options());
        self.phase = Phase::AwaitingCategory;
        self.busy = false;
        info!("Conversation started");
    }

    /// Validate and record a pick of `value` on message `message_id`.
    ///
    /// On success the user's choice is in the transcript, the controller is
    /// busy, and the returned turn must be passed to [`Self::complete`].
    pub fn select(
        &mut self,
        message_id: MessageId,
        value: &str,
    ) -> Result<PendingTurn, SelectError> {
        if self.phase == Phase::Idle {
            return Err(SelectError::NotStarted);
        }
        if self.busy {
            debug!(message_id, value, "Pick rejected while busy");
            return Err(SelectError::Busy);
        }

        let label = match self.transcript.last() {
            Some(last)
                if last.id == message_id && last.sender == Sender::Bot && last.has_options() =>
            {
                match last.option(value) {
                    Some(option) => option.label.clone(),
                    None => return Err(SelectError::UnknownOption(value.to_string())),
                }
            }
            _ => return Err(SelectError::StaleOption(message_id)),
        };

        let turn = match (self.phase, self.state.pending_category.clone()) {
            (Phase::AwaitingCategory, _) => {
                self.state.pending_category = Some(value.to_string());
                Turn::RegionPrompt
            }
            (Phase::AwaitingRegion, Some(category)) => {
                self.phase = Phase::Fetching;
                Turn::Search {
                    category,
                    region: value.to_string(),
                }
            }
            // Fetching is always busy and AwaitingRegion always has a category.
            (phase, _) => {
                warn!(?phase, "Pick arrived in an unexpected phase");
                return Err(SelectError::StaleOption(message_id));
            }
        };

        self.transcript.push(Sender::User, label, Vec::new());
        self.busy = true;
        debug!(message_id, value, ?turn, "Pick accepted");
        Ok(PendingTurn(turn))
    }

    /// Finish a turn started by [`Self::select`].
    #[instrument(level = "debug", skip_all)]
    pub async fn complete(&mut self, pending: PendingTurn) {
        match pending.0 {
            Turn::RegionPrompt => {
                sleep(self.pacing.reply).await;
                self.bot_says(REGION_MESSAGE, region_options());
                self.phase = Phase::AwaitingRegion;
            }
            Turn::Search { category, region } => {
                sleep(self.pacing.reply).await;
                info!(%category, %region, "Searching news");
                let articles = self.provider.fetch_articles(&category, &region).await;
                self.bot_says(&format_results(&articles), Vec::new());
                self.state.pending_category = None;

                sleep(self.pacing.reprompt).await;
                self.bot_says(SEARCH_AGAIN_MESSAGE, category_options());
                self.phase = Phase::AwaitingCategory;
            }
        }
        self.busy = false;
    }

    /// [`Self::select`] followed by [`Self::complete`].
    #[cfg(test)]
    pub async fn choose(&mut self, message_id: MessageId, value: &str) -> Result<(), SelectError> {
        let pending = self.select(message_id, value)?;
        self.complete(pending).await;
        Ok(())
    }

    fn bot_says(&mut self, text: &str, options: Vec<ChatOption>) -> MessageId {
        self.transcript.push(Sender::Bot, text.to_string(), options)
    }

    /// The newest message and its options, if they can be picked right now.
    pub fn active_prompt(&self) -> Option<&Message> {
        if self.busy {
            return None;
        }
        self.transcript
            .last()
            .filter(|m| m.sender == Sender::Bot && m.has_options())
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn usage_count(&self) -> u64 {
        self.provider.usage_count()
    }

    #[cfg(test)]
    pub fn provider(&self) -> &NewsProvider<N, U> {
        &self.provider
    }
}
