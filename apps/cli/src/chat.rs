//! Simulated global trade chat.
//!
//! Purely cosmetic: the conversion engine never reads from it. Bot chatter
//! runs on a background timer task that is aborted when its [`BotTimer`]
//! is dropped.

use chrono::Local;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Messages kept in the feed; older ones scroll away.
pub const HISTORY_LIMIT: usize = 50;

const BOT_NAMES: &[&str] = &[
    "GralatGal",
    "DiggerDave",
    "StarfishSally",
    "PixelPro",
    "EraVibes",
];

const BOT_LINES: &[&str] = &[
    "Nice tool! Ratios are looking correct for today.",
    "Who wants to mine rocks together?",
    "Selling 100 Emeralds, DM me!",
    "Just used the converter, saved me so much math.",
    "Prices are rising in the market today...",
    "Discord link for the guild is in my bio!",
    "Looking for a trade partner for 1k Tro.",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
    /// Local "HH:MM".
    pub time: String,
    pub is_me: bool,
}

impl ChatMessage {
    fn now(user: &str, text: &str, is_me: bool) -> Self {
        Self {
            user: user.to_string(),
            text: text.to_string(),
            time: Local::now().format("%H:%M").to_string(),
            is_me,
        }
    }
}

/// What the bot task reports to the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatNotice {
    Typing(String),
    Message(ChatMessage),
}

/// Rolling message history.
#[derive(Debug)]
pub struct ChatFeed {
    messages: VecDeque<ChatMessage>,
}

impl ChatFeed {
    /// A feed holding the channel's opening messages.
    pub fn new() -> Self {
        let opening = [
            ("EraLegend", "Anyone selling Tro at 2.1? Need 500 fast.", "14:02"),
            ("MushroomKing", "Just hit 10k mushrooms today! 🚀", "14:05"),
            ("TroBroker", "Selling Tro 2.0. Catch me at Era Square.", "14:08"),
        ];
        let messages = opening
            .iter()
            .map(|(user, text, time)| ChatMessage {
                user: user.to_string(),
                text: text.to_string(),
                time: time.to_string(),
                is_me: false,
            })
            .collect();
        Self { messages }
    }

    pub fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        if self.messages.len() == HISTORY_LIMIT {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Post as the local user. Blank text is ignored.
    pub fn post(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(self.push(ChatMessage::now("You", text, true)))
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> + '_ {
        self.messages.iter()
    }
}

/// Timing and odds of bot chatter.
#[derive(Clone, Copy, Debug)]
pub struct BotSettings {
    pub period: Duration,
    pub typing_delay: Duration,
    /// Chance that a bot speaks up on a given tick.
    pub post_probability: f64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(8),
            typing_delay: Duration::from_secs(2),
            post_probability: 0.3,
        }
    }
}

/// Owner of the bot task. Dropping it stops the chatter.
#[derive(Debug)]
pub struct BotTimer {
    task: JoinHandle<()>,
}

impl Drop for BotTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start bot chatter; notices arrive on the returned receiver.
pub fn start_bots(seed: u64, settings: BotSettings) -> (BotTimer, mpsc::Receiver<ChatNotice>) {
    let (tx, rx) = mpsc::channel(16);
    let task = tokio::spawn(async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ticker = tokio::time::interval(settings.period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if !rng.gen_bool(settings.post_probability) {
                continue;
            }
            let user = BOT_NAMES[rng.gen_range(0..BOT_NAMES.len())];
            let line = BOT_LINES[rng.gen_range(0..BOT_LINES.len())];
            if tx.send(ChatNotice::Typing(user.to_string())).await.is_err() {
                break;
            }
            tokio::time::sleep(settings.typing_delay).await;
            let message = ChatMessage::now(user, line, false);
            if tx.send(ChatNotice::Message(message)).await.is_err() {
                break;
            }
        }
        debug!("chat bots stopped");
    });
    (BotTimer { task }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_keeps_the_last_fifty() {
        let mut feed = ChatFeed::new();
        assert_eq!(feed.messages().count(), 3);
        for i in 0..60 {
            feed.post(&format!("msg {i}"));
        }
        let all: Vec<_> = feed.messages().collect();
        assert_eq!(all.len(), HISTORY_LIMIT);
        assert_eq!(all[HISTORY_LIMIT - 1].text, "msg 59");
        assert!(all[HISTORY_LIMIT - 1].is_me);
        assert_eq!(all[0].text, "msg 10");
    }

    #[test]
    fn blank_posts_are_ignored() {
        let mut feed = ChatFeed::new();
        assert!(feed.post("   ").is_none());
        assert_eq!(feed.messages().count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn bots_type_then_post_and_stop_when_dropped() {
        let settings = BotSettings {
            post_probability: 1.0,
            ..BotSettings::default()
        };
        let (timer, mut rx) = start_bots(7, settings);
        let typing = rx.recv().await.unwrap();
        let ChatNotice::Typing(user) = typing else {
            panic!("expected typing notice, got {typing:?}");
        };
        match rx.recv().await.unwrap() {
            ChatNotice::Message(m) => {
                assert_eq!(m.user, user);
                assert!(BOT_LINES.contains(&m.text.as_str()));
                assert!(!m.is_me);
            }
            other => panic!("expected message, got {other:?}"),
        }
        drop(timer);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_bots_never_post() {
        let settings = BotSettings {
            post_probability: 0.0,
            ..BotSettings::default()
        };
        let (_timer, mut rx) = start_bots(1, settings);
        let waited = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
        assert!(waited.is_err());
    }
}
