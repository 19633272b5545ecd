use super::{Command, Resolution};
use crate::dispatch::Executor;
use crate::error::CommandError;
use crate::output::{Details, Output};
use async_trait::async_trait;

/// `account show`
pub struct AccountShow;

#[async_trait]
impl Command for AccountShow {
    fn name(&self) -> &'static str {
        "account show"
    }

    fn resolution(&self) -> Resolution<'_> {
        Resolution::None
    }

    async fn execute(&self, exec: &Executor, _arg: &str) -> Result<Output, CommandError> {
        let account = exec.service().account().await?;
        Ok(Output::Details(
            Details::new("Account")
                .row("username", "Username", &account.username)
                .row("credits", "Credits", format!("{:.2}", account.credits)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testsupport::MockService;
    use std::sync::Arc;
    use tokio::sync::watch;

    #[tokio::test]
    async fn shows_username_and_credits() {
        let (_tx, rx) = watch::channel(false);
        let exec = Executor::new(Config::default(), Arc::new(MockService::default()), rx);
        let output = AccountShow.execute(&exec, "").await.expect("account");
        match output {
            Output::Details(details) => {
                assert_eq!(details.rows[0].value, "tester");
                assert_eq!(details.rows[1].value, "42.50");
            }
            other => panic!("unexpected output {other:?}"),
        }
    }
}
