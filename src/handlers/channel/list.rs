//! LIST handler.

use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use anonirc_proto::{Command, Message, Response};
use async_trait::async_trait;

/// Handler for LIST command.
pub struct ListHandler;

#[async_trait]
impl Handler for ListHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::LIST(filter) = &msg.command else {
            return Ok(());
        };

        ctx.send_reply(
            Response::RPL_LISTSTART,
            vec!["Channel".to_string(), "Users  Name".to_string()],
        )
        .await?;

        for entry in ctx.matrix.list(filter.as_deref()) {
            ctx.send_reply(
                Response::RPL_LIST,
                vec![
                    entry.name,
                    entry.members.to_string(),
                    entry.topic.unwrap_or_default(),
                ],
            )
            .await?;
        }

        ctx.send_reply(Response::RPL_LISTEND, vec!["End of /LIST".to_string()])
            .await
    }
}
