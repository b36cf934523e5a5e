//! General commands available outside specific integrations

use crate::application::errors::CommandError;
use crate::application::messaging::Router;
use crate::domain::entities::{Command, Reply};

pub fn register(router: &mut Router) -> Result<(), CommandError> {
    router.register(
        Command::new("ping")
            .with_description("Check that the bot is reachable")
            .with_handler(|_ctx| Box::pin(async { Ok(Reply::channel_text("pong")) })),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DisplayUnit, User};

    #[tokio::test]
    async fn ping_replies_pong() {
        let mut router = Router::new("!");
        register(&mut router).unwrap();
        let reply = router
            .dispatch(User::new("1"), "chat", "!ping")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.units, vec![DisplayUnit::text("pong")]);
    }
}
