mod config;
mod quiz;
mod study;

use std::sync::Arc;

use chatgpt::client::ChatGPT;
use dotenv::dotenv;
use quiz::{
    driver::{Screen, SessionDriver},
    source::QuestionSource,
    view::View,
};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, KeyboardRemove},
    utils::command::BotCommands,
};

type QuizDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type Source = Arc<QuestionSource<ChatGPT>>;
type Driver = SessionDriver<ChatGPT, TelegramScreen>;

/// Per-chat state. A chat only holds a driver while a round is in progress or
/// its results are on screen.
#[derive(Clone, Default)]
enum State {
    #[default]
    Start,
    Playing(Driver),
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
enum Command {
    #[command(description = "show the quiz start screen.")]
    Start,
    #[command(description = "study resources, optionally for one topic (e.g. /study css).")]
    Study(String),
    #[command(description = "about this quiz.")]
    About,
    #[command(description = "abandon the current quiz.")]
    Quit,
    #[command(description = "display this text.")]
    Help,
}

/// Sends rendered screens to one chat, with the buttons as a reply keyboard.
#[derive(Clone)]
struct TelegramScreen {
    bot: Bot,
    chat_id: ChatId,
}

impl Screen for TelegramScreen {
    async fn show(&self, view: View) {
        let request = self.bot.send_message(self.chat_id, view.text);
        let sent = if view.buttons.is_empty() {
            request.reply_markup(KeyboardRemove::new()).await
        } else {
            let keyboard = KeyboardMarkup::new(
                view.buttons
                    .into_iter()
                    .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
            );
            request.reply_markup(keyboard).await
        };
        if let Err(err) = sent {
            log::error!("Failed to send message to {}: {}", self.chat_id, err);
        }
    }
}

fn new_driver(bot: &Bot, chat_id: ChatId, source: &Source) -> Driver {
    log::debug!("New quiz session for chat {}", chat_id);
    let screen = TelegramScreen {
        bot: bot.clone(),
        chat_id,
    };
    SessionDriver::new(source.clone(), screen)
}

/// Keeps the driver in the dialogue while it has a round to run, and drops it
/// once the chat is back at the start screen.
async fn store(dialogue: &QuizDialogue, driver: Driver) -> HandlerResult {
    if driver.is_idle().await {
        dialogue.exit().await?;
    } else {
        dialogue.update(State::Playing(driver)).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if dotenv().is_err() {
        println!("No .env file found, reading configuration from the environment");
    }

    pretty_env_logger::init();
    log::info!("Starting quiz bot...");

    let config = config::Config::from_env();
    let source: Source = Arc::new(QuestionSource::new(quiz::ai_helper::connect(&config)));

    let bot = Bot::from_env();

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<State>, State>()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::case![State::Playing(driver)].endpoint(play))
        .branch(dptree::case![State::Start].endpoint(start));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<State>::new(), source])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(
    bot: Bot,
    dialogue: QuizDialogue,
    state: State,
    msg: Message,
    cmd: Command,
    source: Source,
) -> HandlerResult {
    match cmd {
        Command::Start => {
            let driver = match state {
                State::Playing(driver) => driver,
                State::Start => new_driver(&bot, msg.chat.id, &source),
            };
            driver.show_current().await;
        }
        Command::Study(topic) => {
            let text = if topic.trim().is_empty() {
                study::render_index()
            } else {
                study::render_topic(&topic)
            };
            bot.send_message(msg.chat.id, text)
                .disable_web_page_preview(true)
                .await?;
        }
        Command::About => {
            bot.send_message(msg.chat.id, study::ABOUT_TEXT).await?;
        }
        Command::Quit => {
            let text = match state {
                State::Playing(driver) => {
                    driver.close().await;
                    dialogue.exit().await?;
                    "Quiz abandoned. Send /start to play again."
                }
                State::Start => "There is no quiz running. Send /start to play.",
            };
            bot.send_message(msg.chat.id, text)
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
    }
    Ok(())
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message, source: Source) -> HandlerResult {
    let driver = new_driver(&bot, msg.chat.id, &source);
    play(bot, dialogue, driver, msg).await
}

async fn play(bot: Bot, dialogue: QuizDialogue, driver: Driver, msg: Message) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please use the buttons (text only).")
            .await?;
        return Ok(());
    };

    driver.handle_text(text).await;
    store(&dialogue, driver).await
}
