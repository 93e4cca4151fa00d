use crate::menu::PropertyAction;
use crate::resolver::InvalidInput;
use crate::tweet::{Tweet, TweetId};

pub const INVALID_INPUT_TOAST: &str = "⚠️ Invalid tweet input";
pub const FETCH_FAILED_TOAST: &str = "⚠️ Couldn't load tweet";

/// What the widget is showing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No tweet loaded; the identifier input form is visible.
    Input,
    /// A bridge request is outstanding; the loading view is visible.
    Awaiting,
    /// A tweet is loaded and the card is rendered.
    Display,
}

/// Inputs that can move the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user triggered the embed action; carries the resolver's verdict
    /// on whatever was in the input field.
    Embed(Result<TweetId, InvalidInput>),
    /// The bridge resolved, with a tweet or with nothing.
    BridgeResolved(Option<Tweet>),
    /// A property-menu action fired.
    Menu(PropertyAction),
}

/// What the host must do alongside a transition. Applying the effect is the
/// caller's job; the machine itself never touches the store or the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Fire a transient notification.
    Toast(&'static str),
    /// Send the bridge request for this id.
    BeginFetch(TweetId),
    /// Write the tweet into the synchronized slot.
    StoreTweet(Tweet),
    /// Reset the tweet slot to empty.
    ClearTweet,
}

/// The render state machine. Long-lived, no terminal phase; it cycles
/// Input -> Awaiting -> Display -> Input indefinitely.
#[derive(Debug)]
pub struct Machine {
    phase: Phase,
}

impl Machine {
    /// A restored session that still holds a tweet starts on the card.
    pub fn new(has_tweet: bool) -> Self {
        Self {
            phase: if has_tweet { Phase::Display } else { Phase::Input },
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance the machine. Events that make no sense in the current phase
    /// (a stale bridge reply after an edit, an embed while one is already
    /// outstanding) are dropped without effect.
    pub fn apply(&mut self, event: Event) -> Effect {
        match (self.phase, event) {
            (Phase::Input, Event::Embed(Ok(id))) => {
                self.phase = Phase::Awaiting;
                Effect::BeginFetch(id)
            }
            (Phase::Input, Event::Embed(Err(InvalidInput))) => Effect::Toast(INVALID_INPUT_TOAST),
            (Phase::Awaiting, Event::BridgeResolved(Some(tweet))) => {
                self.phase = Phase::Display;
                Effect::StoreTweet(tweet)
            }
            (Phase::Awaiting, Event::BridgeResolved(None)) => {
                self.phase = Phase::Input;
                Effect::Toast(FETCH_FAILED_TOAST)
            }
            (Phase::Display, Event::Menu(PropertyAction::Edit)) => {
                self.phase = Phase::Input;
                Effect::ClearTweet
            }
            // Open and refresh are reserved: the card stays up, nothing moves.
            (Phase::Display, Event::Menu(_)) => Effect::None,
            _ => Effect::None,
        }
    }
}
