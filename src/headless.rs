use std::error::Error;

use parley::api::ApiClient;
use parley::common::Credentials;
use parley::session::user_id_from_token;
use parley::storage::SessionDatabase;

use crate::Mode;

pub async fn run(
    mode: Mode,
    api: &ApiClient,
    sessions: &SessionDatabase,
) -> Result<(), Box<dyn Error>> {
    match mode {
        Mode::Login { email, password } => {
            let token = api.authenticate(&Credentials { email, password }).await?;
            sessions.save_token(&token.access)?;
            match user_id_from_token(Some(&token.access)) {
                Some(user_id) => println!("Logged in as user {user_id}"),
                None => println!("Logged in"),
            }
        }
        Mode::Rooms => {
            let token = require_token(sessions)?;
            for room in api.user_chats(&token).await? {
                println!("{}\t{}", room.oid, room.title);
            }
        }
        Mode::History { room } => {
            let token = require_token(sessions)?;
            for message in api.room_messages(&token, &room).await? {
                let time = message.display_time().unwrap_or_default();
                println!("[{time}] {}: {}", message.display_name(), message.content);
            }
        }
        Mode::Send { room, content } => {
            let token = require_token(sessions)?;
            let posted = api.post_message(&token, &room, &content).await?;
            println!("{}", posted.message_id.as_deref().unwrap_or("sent"));
        }
        Mode::Whoami => match user_id_from_token(sessions.token().as_deref()) {
            Some(user_id) => println!("{user_id}"),
            None => println!("unknown"),
        },
    }
    Ok(())
}

fn require_token(sessions: &SessionDatabase) -> Result<String, Box<dyn Error>> {
    sessions
        .token()
        .ok_or_else(|| "Not logged in; run `parley login` first".into())
}
