//! Telegram bot handlers.

use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use trustpool_core::Coin;
use trustpool_engine::{PayoutScope, Reporter};

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
}

/// Something that can deliver plain text to a chat.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

/// Send `text` to every chat in turn.
///
/// A failed recipient is logged and skipped. Returns the number of chats
/// the message reached.
pub async fn broadcast(sink: &dyn MessageSink, chat_ids: &[i64], text: &str) -> usize {
    let mut delivered = 0;
    for &chat_id in chat_ids {
        match sink.send_text(chat_id, text).await {
            Ok(()) => delivered += 1,
            Err(e) => error!(chat_id = chat_id, error = %e, "Failed to deliver message"),
        }
    }
    delivered
}

/// Bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show the main menu")]
    Start,
    #[command(description = "Earnings since local midnight")]
    Today,
    #[command(description = "Earnings since the last payout")]
    Since,
    #[command(description = "Worker status and hashrate")]
    Hashrate,
    #[command(description = "Latest payouts. Usage: /payouts BTC (or LTC, DOGE, ALL)")]
    Payouts(String),
    #[command(description = "Pool revenue over the last 24 hours")]
    Revenue,
    #[command(description = "Show help")]
    Help,
}

/// Report selected by an inline keyboard button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Today,
    SinceLastPayout,
    Hashrate,
    Revenue,
    Payouts(PayoutScope),
}

impl Action {
    /// Parse callback data. `payouts_<X>` with an unknown `X` covers all coins.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "today_msk" => Some(Action::Today),
            "today_since" => Some(Action::SinceLastPayout),
            "hashrate" => Some(Action::Hashrate),
            "revenue" => Some(Action::Revenue),
            _ => data
                .strip_prefix("payouts_")
                .map(|scope| Action::Payouts(PayoutScope::parse(scope))),
        }
    }

    pub fn callback_data(&self) -> String {
        match self {
            Action::Today => "today_msk".to_string(),
            Action::SinceLastPayout => "today_since".to_string(),
            Action::Hashrate => "hashrate".to_string(),
            Action::Revenue => "revenue".to_string(),
            Action::Payouts(PayoutScope::Single(coin)) => format!("payouts_{}", coin),
            Action::Payouts(PayoutScope::All) => "payouts_ALL".to_string(),
        }
    }
}

fn button(label: &str, action: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.to_string(), action.callback_data())
}

/// Keyboard attached to every report message.
pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("📅 Today", Action::Today),
            button("💸 Since last payout", Action::SinceLastPayout),
        ],
        vec![
            button("⚙️ Hashrate", Action::Hashrate),
            button("📈 Revenue 24h", Action::Revenue),
        ],
        vec![
            button("🧾 Payouts: BTC", Action::Payouts(PayoutScope::Single(Coin::BTC))),
            button("🧾 Payouts: LTC", Action::Payouts(PayoutScope::Single(Coin::LTC))),
            button("🧾 Payouts: ALL", Action::Payouts(PayoutScope::All)),
        ],
    ])
}

const UNKNOWN_ACTION: &str = "Unknown action";
const DETACHED_PRESS: &str = "This button only works in a chat with the bot. Send /start there.";

/// What to do with a keyboard press.
#[derive(Debug, PartialEq)]
pub enum CallbackRoute<'a, M> {
    /// Render `Action` into the pressed message
    Render(Action, &'a M),
    Unknown,
    /// Known action, but no message to edit (inline-mode press)
    Detached,
}

/// Classify a press by its callback data and the message it came from.
pub fn route_callback<'a, M>(data: &str, message: Option<&'a M>) -> CallbackRoute<'a, M> {
    match (Action::parse(data), message) {
        (None, _) => CallbackRoute::Unknown,
        (Some(_), None) => CallbackRoute::Detached,
        (Some(action), Some(message)) => CallbackRoute::Render(action, message),
    }
}

const WELCOME: &str = "Hi! I am the Trustpool bot. Pick a report below.\n\n\
    • Today: earnings from local midnight until now\n\
    • Since last payout: earnings since each coin's latest payout\n\
    • Hashrate: worker status\n\
    • Revenue 24h: pool-reported revenue of the last day\n\
    • Payouts: latest transactions for BTC, LTC or all coins";

/// Telegram bot wrapper.
pub struct TelegramBot {
    bot: Bot,
    reporter: Arc<Reporter>,
}

impl TelegramBot {
    /// Create a new bot with the given token.
    pub fn new(token: &str, reporter: Arc<Reporter>) -> Self {
        let bot = Bot::new(token);
        Self { bot, reporter }
    }

    /// Render the report behind `action`.
    pub async fn render(&self, action: Action, now: i64) -> String {
        match action {
            Action::Today => self.reporter.today(now).await,
            Action::SinceLastPayout => self.reporter.since_last_payout(now).await,
            Action::Hashrate => self.reporter.hashrate().await,
            Action::Revenue => self.reporter.revenue_24h().await,
            Action::Payouts(scope) => self.reporter.payouts(scope).await,
        }
    }

    /// Run the command and callback handlers until Ctrl-C.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();

        if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
            warn!(error = %e, "Failed to register bot commands");
        }

        let commands = Arc::clone(&self);
        let callbacks = Arc::clone(&self);
        let handler = teloxide::dptree::entry()
            .branch(Update::filter_message().filter_command::<Command>().endpoint(
                move |bot: Bot, msg: Message, cmd: Command| {
                    let this = Arc::clone(&commands);
                    async move { this.handle_command(bot, msg, cmd).await }
                },
            ))
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery| {
                    let this = Arc::clone(&callbacks);
                    async move { this.handle_callback(bot, q).await }
                },
            ));

        info!("Telegram bot started");
        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_command(
        &self,
        bot: Bot,
        msg: Message,
        cmd: Command,
    ) -> Result<(), TelegramError> {
        debug!(chat_id = msg.chat.id.0, command = ?cmd, "Command received");
        let now = chrono::Utc::now().timestamp();

        let action = match cmd {
            Command::Start => {
                bot.send_message(msg.chat.id, WELCOME)
                    .reply_markup(main_menu_keyboard())
                    .await?;
                return Ok(());
            }
            Command::Help => {
                bot.send_message(msg.chat.id, Command::descriptions().to_string())
                    .await?;
                return Ok(());
            }
            Command::Today => Action::Today,
            Command::Since => Action::SinceLastPayout,
            Command::Hashrate => Action::Hashrate,
            Command::Revenue => Action::Revenue,
            Command::Payouts(arg) => Action::Payouts(PayoutScope::parse(arg.trim())),
        };

        let text = self.render(action, now).await;
        bot.send_message(msg.chat.id, text)
            .reply_markup(main_menu_keyboard())
            .await?;
        Ok(())
    }

    /// Answer a keyboard press by editing the pressed message in place.
    ///
    /// Failures are shown only to the user who pressed the button.
    async fn handle_callback(&self, bot: Bot, q: CallbackQuery) -> Result<(), TelegramError> {
        let Some(data) = q.data.as_deref() else {
            return Ok(());
        };

        let (action, message) = match route_callback(data, q.message.as_ref()) {
            CallbackRoute::Render(action, message) => (action, message),
            CallbackRoute::Unknown => {
                debug!(data = data, "Unknown callback action");
                bot.answer_callback_query(q.id.clone())
                    .text(UNKNOWN_ACTION)
                    .await?;
                return Ok(());
            }
            CallbackRoute::Detached => {
                debug!(data = data, "Callback without a message to edit");
                bot.answer_callback_query(q.id.clone())
                    .text(DETACHED_PRESS)
                    .show_alert(true)
                    .await?;
                return Ok(());
            }
        };

        let now = chrono::Utc::now().timestamp();
        let text = self.render(action, now).await;

        let edited = bot
            .edit_message_text(message.chat().id, message.id(), text)
            .reply_markup(main_menu_keyboard())
            .await
            .map(|_| ());

        match edited {
            Ok(()) => {
                bot.answer_callback_query(q.id.clone()).await?;
            }
            Err(e) => {
                warn!(data = data, error = %e, "Failed to update report message");
                bot.answer_callback_query(q.id.clone())
                    .text(format!("Error: {}", e))
                    .show_alert(true)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSink for TelegramBot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}
